use crate::error::{BackendError, Result};
use crate::input::Key;
use crate::memory::{acquire_view, FrameView, LinearMemory};

/// The capability set every backend module offers, whichever way it executes.
///
/// Calls are strictly sequenced by the [`Session`](crate::Session): `initialize` first,
/// then `load_program`, and only then is the backend run or stepped.
pub trait Backend {
    /// Instantiates the backend module. This is the only point where a backend may
    /// have to wait on the host; it completes before anything else is called.
    fn initialize(&mut self) -> Result<(), BackendError>;

    /// Loads a program image into the emulator instance, creating the instance the
    /// first time and reusing it afterwards.
    fn load_program(&mut self, image: &[u8]) -> Result<(), BackendError>;

    /// Marks a key as held. Keys are level triggered: pressing a held key again
    /// changes nothing.
    fn key_down(&mut self, key: Key);

    fn key_up(&mut self, key: Key);

    /// The linear memory of the emulator instance.
    fn memory(&self) -> &dyn LinearMemory;

    /// Offset of the frame buffer in [`Backend::memory`]. Only valid until the next
    /// call that may allocate.
    fn frame_buffer_pointer(&self) -> usize;

    /// Number of samples in the frame buffer.
    fn frame_buffer_length(&self) -> usize;
}

/// A backend that keeps itself running once started.
pub trait ContinuousBackend: Backend {
    /// Starts execution. From here on the backend drives itself through
    /// [`ContinuousBackend::refresh`].
    fn run(&mut self);

    /// The display-synchronized callback the backend arranged for itself in `run`.
    /// The host's display clock invokes it once per refresh; the run loop has no say
    /// in whether it happens.
    fn refresh(&mut self);
}

/// A backend that only advances when it is told to.
pub trait SteppedBackend: Backend {
    /// Emulates one logical frame.
    fn step(&mut self) -> Result<(), BackendError>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Policy {
    Continuous,
    Stepped,
}

/// A backend wrapped in its execution model. Which of the two a backend follows is
/// decided when it's constructed, so a backend without `run` or `step` can't be
/// registered at all.
pub enum BackendAdapter {
    Continuous(Box<dyn ContinuousBackend>),
    Stepped(Box<dyn SteppedBackend>),
}

impl BackendAdapter {
    pub fn continuous(backend: impl ContinuousBackend + 'static) -> Self {
        Self::Continuous(Box::new(backend))
    }

    pub fn stepped(backend: impl SteppedBackend + 'static) -> Self {
        Self::Stepped(Box::new(backend))
    }

    pub fn policy(&self) -> Policy {
        match self {
            Self::Continuous(_) => Policy::Continuous,
            Self::Stepped(_) => Policy::Stepped,
        }
    }

    pub fn initialize(&mut self) -> Result<(), BackendError> {
        match self {
            Self::Continuous(b) => b.initialize(),
            Self::Stepped(b) => b.initialize(),
        }
    }

    pub fn load_program(&mut self, image: &[u8]) -> Result<(), BackendError> {
        match self {
            Self::Continuous(b) => b.load_program(image),
            Self::Stepped(b) => b.load_program(image),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        match self {
            Self::Continuous(b) => b.key_down(key),
            Self::Stepped(b) => b.key_down(key),
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match self {
            Self::Continuous(b) => b.key_up(key),
            Self::Stepped(b) => b.key_up(key),
        }
    }

    pub fn frame_buffer_length(&self) -> usize {
        match self {
            Self::Continuous(b) => b.frame_buffer_length(),
            Self::Stepped(b) => b.frame_buffer_length(),
        }
    }

    /// Looks up where the frame buffer lives right now and returns a view of it.
    pub fn frame_view(&self) -> Result<FrameView<'_>> {
        match self {
            Self::Continuous(b) => acquire_view(
                b.memory(),
                b.frame_buffer_pointer(),
                b.frame_buffer_length(),
            ),
            Self::Stepped(b) => acquire_view(
                b.memory(),
                b.frame_buffer_pointer(),
                b.frame_buffer_length(),
            ),
        }
    }
}

impl std::fmt::Debug for BackendAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BackendAdapter").field(&self.policy()).finish()
    }
}
