use thiserror::Error;

/// Error reported by a backend module itself. The harness decides which
/// class of [`HarnessError`] it belongs to based on the call that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// The backend module failed to load or instantiate. Nothing can be loaded
    /// or started until a new initialization succeeds.
    #[error("backend failed to initialize: {0}")]
    Initialization(BackendError),

    /// The backend rejected the program image.
    #[error("backend rejected the program image: {0}")]
    Load(BackendError),

    /// A stepped backend failed during `step`. The run loop is halted.
    #[error("backend step failed: {0}")]
    Step(BackendError),

    /// `start` was called before a program was loaded.
    #[error("run loop can't start: no program loaded")]
    NotReady,

    /// A program was loaded (or the loop started) before `initialize` completed.
    #[error("backend is not initialized")]
    NotInitialized,

    #[error("view of {length} bytes at offset {offset} exceeds memory of {size} bytes")]
    OutOfBounds {
        offset: usize,
        length: usize,
        size: usize,
    },

    #[error("frame buffer holds {actual} samples, but the display needs {expected}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("surface is {actual:?} pixels, but the display needs {expected:?}")]
    SurfaceMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("no backend named {0:?}")]
    UnknownBackend(String),

    #[error("no backend selected")]
    NoBackend,

    /// Continuous backends schedule themselves. The only way to stop one is to tear
    /// down its instance by selecting a backend again.
    #[error("a continuously running backend can't be stopped")]
    Unstoppable,

    #[error("couldn't read program image {path}: {message}")]
    ReadImage { path: String, message: String },
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
