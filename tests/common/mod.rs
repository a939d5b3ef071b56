#![allow(dead_code)]

use rom_harness::{
    Backend, BackendAdapter, BackendDescriptor, BackendError, ContinuousBackend, GrowableMemory,
    Key, LinearMemory, Registry, SteppedBackend, CHIP8_DISPLAY, GAMEBOY_DISPLAY, PAGE_SIZE,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Everything a test wants to see of, or change in, a mock backend that is owned by
/// a session.
#[derive(Debug, Default)]
pub struct MockState {
    pub alive: usize,
    pub created: usize,

    pub init_failure: Option<String>,
    pub load_failure: Option<String>,
    pub initialized: bool,
    pub program: Option<Vec<u8>>,
    pub loads: usize,

    pub runs: usize,
    pub refreshes: usize,
    pub steps: usize,
    /// The step with this number (counting from 1) fails.
    pub fail_step: Option<usize>,

    pub keys: [bool; Key::COUNT],
    pub key_events: Vec<(u8, bool)>,

    /// Frames to show on the next steps or refreshes, each at its own offset. Showing
    /// one grows (and so moves) the memory.
    pub frames: VecDeque<(usize, Vec<u8>)>,
    /// Overrides the reported frame buffer length.
    pub reported_length: Option<usize>,
}

pub type Shared = Rc<RefCell<MockState>>;

pub struct MockBackend {
    state: Shared,
    memory: GrowableMemory,
    frame_offset: usize,
    frame_length: usize,
}

impl MockBackend {
    pub fn new(state: Shared, frame_length: usize) -> Self {
        {
            let mut s = state.borrow_mut();
            s.alive += 1;
            s.created += 1;
        }

        Self {
            state,
            memory: GrowableMemory::new(1),
            frame_offset: 0,
            frame_length,
        }
    }

    fn advance(&mut self) {
        let next = self.state.borrow_mut().frames.pop_front();
        if let Some((offset, samples)) = next {
            let needed = (offset + samples.len()).saturating_sub(self.memory.len());
            self.memory.grow(needed / PAGE_SIZE + 1);
            self.memory.write(offset, &samples).unwrap();
            self.frame_offset = offset;
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.state.borrow_mut().alive -= 1;
    }
}

impl Backend for MockBackend {
    fn initialize(&mut self) -> Result<(), BackendError> {
        let mut s = self.state.borrow_mut();
        if let Some(msg) = &s.init_failure {
            return Err(BackendError::new(msg.clone()));
        }
        s.initialized = true;
        Ok(())
    }

    fn load_program(&mut self, image: &[u8]) -> Result<(), BackendError> {
        let mut s = self.state.borrow_mut();
        if let Some(msg) = &s.load_failure {
            return Err(BackendError::new(msg.clone()));
        }
        s.program = Some(image.to_vec());
        s.loads += 1;
        Ok(())
    }

    fn key_down(&mut self, key: Key) {
        let mut s = self.state.borrow_mut();
        s.keys[key.index()] = true;
        s.key_events.push((key.code(), true));
    }

    fn key_up(&mut self, key: Key) {
        let mut s = self.state.borrow_mut();
        s.keys[key.index()] = false;
        s.key_events.push((key.code(), false));
    }

    fn memory(&self) -> &dyn LinearMemory {
        &self.memory
    }

    fn frame_buffer_pointer(&self) -> usize {
        self.frame_offset
    }

    fn frame_buffer_length(&self) -> usize {
        self.state
            .borrow()
            .reported_length
            .unwrap_or(self.frame_length)
    }
}

impl ContinuousBackend for MockBackend {
    fn run(&mut self) {
        self.state.borrow_mut().runs += 1;
    }

    fn refresh(&mut self) {
        self.state.borrow_mut().refreshes += 1;
        self.advance();
    }
}

impl SteppedBackend for MockBackend {
    fn step(&mut self) -> Result<(), BackendError> {
        let steps = {
            let mut s = self.state.borrow_mut();
            s.steps += 1;
            s.steps
        };

        if self.state.borrow().fail_step == Some(steps) {
            return Err(BackendError::new(format!("bad opcode in step {steps}")));
        }

        self.advance();
        Ok(())
    }
}

/// A registry with a continuous monochrome backend called `chip8` and a stepped
/// grayscale backend called `gameboy`, both backed by mocks sharing the returned states.
pub fn registry() -> (Registry, Shared, Shared) {
    let chip8 = Shared::default();
    let gameboy = Shared::default();

    let c = chip8.clone();
    let g = gameboy.clone();
    let registry = Registry::new()
        .with(BackendDescriptor::new("chip8", CHIP8_DISPLAY, move || {
            BackendAdapter::continuous(MockBackend::new(c.clone(), CHIP8_DISPLAY.samples()))
        }))
        .with(BackendDescriptor::new("gameboy", GAMEBOY_DISPLAY, move || {
            BackendAdapter::stepped(MockBackend::new(g.clone(), GAMEBOY_DISPLAY.samples()))
        }));

    (registry, chip8, gameboy)
}
