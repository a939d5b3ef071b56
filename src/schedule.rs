/// Identifies one requested display-synchronized callback.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// Callbacks waiting for the next display refresh.
///
/// Everything requested before a refresh fires on that refresh; anything requested
/// while those callbacks run waits for the one after, so frames never overlap.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next: u64,
    pending: Vec<FrameToken>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) -> FrameToken {
        let token = FrameToken(self.next);
        self.next += 1;
        self.pending.push(token);
        token
    }

    /// Withdraws a request. Returns whether it was still pending.
    pub fn cancel(&mut self, token: FrameToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|&t| t != token);
        self.pending.len() != before
    }

    /// Takes every callback that is due on this refresh.
    pub fn take_due(&mut self) -> Vec<FrameToken> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
