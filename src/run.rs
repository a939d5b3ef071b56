use crate::backend::{BackendAdapter, Policy};
use crate::decode::{decode, Surface};
use crate::error::{HarnessError, Result};
use crate::input::{map_key, Key};
use crate::registry::{BackendDescriptor, Registry};
use crate::schedule::{FrameScheduler, FrameToken};
use std::path::Path;

/// Where the run loop is at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    /// A stepped backend failed. Nothing runs until the loop is started again.
    Halted,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Readiness {
    Uninitialized,
    Initialized,
    Loaded,
}

/// Exists while a stepped loop is scheduled.
#[derive(Debug)]
struct RunLoopHandle {
    running: bool,
    pending: Option<FrameToken>,
}

struct Active {
    descriptor: BackendDescriptor,
    adapter: BackendAdapter,
    readiness: Readiness,
    /// Whether `run` was already called on a continuous instance.
    ran: bool,
}

/// One emulation session: the selected backend, its run loop and the surface it
/// renders to.
///
/// The host calls [`Session::tick`] once per display refresh. All work happens inside
/// these calls, one frame at a time.
pub struct Session {
    registry: Registry,
    active: Option<Active>,
    state: LoopState,
    handle: Option<RunLoopHandle>,
    frames: FrameScheduler,
    surface: Surface,
    last_failure: Option<HarnessError>,
}

impl Session {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            active: None,
            state: LoopState::Idle,
            handle: None,
            frames: FrameScheduler::new(),
            surface: Surface::default(),
            last_failure: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Switches to the backend called `name`. The current instance and its run loop
    /// are torn down first. The new backend still has to be initialized and given a
    /// program before it can start.
    pub fn select(&mut self, name: &str) -> Result<()> {
        let descriptor = self.registry.get(name)?.clone();

        self.teardown();

        log::info!("selecting backend {}", descriptor.name);
        let adapter = descriptor.instantiate();
        self.surface = Surface::for_geometry(&descriptor.geometry);
        self.active = Some(Active {
            descriptor,
            adapter,
            readiness: Readiness::Uninitialized,
            ran: false,
        });

        Ok(())
    }

    fn teardown(&mut self) {
        self.cancel_loop();
        self.state = LoopState::Idle;
        self.last_failure = None;

        if let Some(active) = self.active.take() {
            log::info!("tearing down backend {}", active.descriptor.name);
        }
    }

    fn cancel_loop(&mut self) {
        if let Some(RunLoopHandle {
            pending: Some(token),
            ..
        }) = self.handle.take()
        {
            self.frames.cancel(token);
        }
    }

    /// Initializes the selected backend. Until this succeeds no program can be loaded.
    ///
    /// A running continuous backend can't be initialized again, since that would
    /// stop it; select the backend again instead.
    pub fn initialize(&mut self) -> Result<()> {
        let Some(active) = &self.active else {
            return Err(HarnessError::NoBackend);
        };
        if active.ran {
            log::warn!("continuous backend is running, select a backend to reset it");
            return Err(HarnessError::Unstoppable);
        }

        // a fresh initialization starts from scratch
        self.cancel_loop();
        self.state = LoopState::Idle;

        let active = self.active.as_mut().ok_or(HarnessError::NoBackend)?;
        active.readiness = Readiness::Uninitialized;

        active.adapter.initialize().map_err(|e| {
            log::error!("backend {} failed to initialize: {e}", active.descriptor.name);
            HarnessError::Initialization(e)
        })?;

        log::info!("backend {} initialized", active.descriptor.name);
        active.readiness = Readiness::Initialized;
        Ok(())
    }

    /// Hands a program image to the backend and renders the first frame. If that frame
    /// can't be rendered the session is left unloaded.
    ///
    /// Loading again on the same backend reuses its instance and leaves the run loop
    /// alone.
    pub fn load_program(&mut self, image: &[u8]) -> Result<()> {
        let active = self.active.as_mut().ok_or(HarnessError::NoBackend)?;
        if active.readiness == Readiness::Uninitialized {
            return Err(HarnessError::NotInitialized);
        }

        active.adapter.load_program(image).map_err(|e| {
            log::error!("backend {} rejected program: {e}", active.descriptor.name);
            HarnessError::Load(e)
        })?;

        log::info!(
            "loaded {} byte program into {}",
            image.len(),
            active.descriptor.name
        );

        // a program that can't be shown can't be started either
        if let Err(e) = self.render() {
            log::error!("failed to render loaded program: {e}");
            if let Some(active) = &mut self.active {
                active.readiness = Readiness::Initialized;
            }
            return Err(e);
        }

        if let Some(active) = &mut self.active {
            active.readiness = Readiness::Loaded;
        }
        Ok(())
    }

    /// Reads the whole file at `path` and loads it. Nothing reaches the backend if
    /// reading fails.
    pub fn load_program_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = std::fs::read(path).map_err(|e| HarnessError::ReadImage {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        self.load_program(&image)
    }

    /// Starts the run loop. Starting a loop that is already running does nothing.
    pub fn start(&mut self) -> Result<()> {
        let active = self.active.as_mut().ok_or(HarnessError::NoBackend)?;
        match active.readiness {
            Readiness::Uninitialized => return Err(HarnessError::NotInitialized),
            Readiness::Initialized => return Err(HarnessError::NotReady),
            Readiness::Loaded => {}
        }

        if self.state == LoopState::Running {
            log::debug!("run loop already running");
            return Ok(());
        }

        match &mut active.adapter {
            // the instance keeps scheduling itself from its first run on
            BackendAdapter::Continuous(_) if active.ran => {}
            BackendAdapter::Continuous(backend) => {
                backend.run();
                active.ran = true;
            }
            BackendAdapter::Stepped(_) => {
                // a stopped loop may still have its last callback queued
                if let Some(RunLoopHandle {
                    pending: Some(token),
                    ..
                }) = self.handle.take()
                {
                    self.frames.cancel(token);
                }
                self.handle = Some(RunLoopHandle {
                    running: true,
                    pending: Some(self.frames.request()),
                });
            }
        }

        log::info!("started {}", active.descriptor.name);
        self.state = LoopState::Running;
        self.last_failure = None;
        Ok(())
    }

    /// Stops a running stepped loop. The frame that is already scheduled still fires,
    /// but does nothing.
    ///
    /// A continuous backend can't be stopped short of selecting a backend again, so
    /// this fails with [`HarnessError::Unstoppable`] and the backend keeps running.
    pub fn stop(&mut self) -> Result<()> {
        if self.state != LoopState::Running {
            return Ok(());
        }

        if self.policy() == Some(Policy::Continuous) {
            log::warn!("continuous backend keeps running, select a backend to stop it");
            return Err(HarnessError::Unstoppable);
        }

        if let Some(handle) = &mut self.handle {
            handle.running = false;
        }
        self.state = LoopState::Idle;
        log::info!("stopped run loop");
        Ok(())
    }

    /// Runs everything that is due on this display refresh.
    ///
    /// A failure in a stepped frame halts the loop and is returned here, and kept in
    /// [`Session::last_failure`].
    pub fn tick(&mut self) -> Result<()> {
        for token in self.frames.take_due() {
            self.on_frame(token)?;
        }

        if self.state == LoopState::Running {
            if let Some(Active {
                adapter: BackendAdapter::Continuous(backend),
                ..
            }) = &mut self.active
            {
                backend.refresh();
                if let Err(e) = self.render() {
                    log::error!("failed to render frame: {e}");
                    self.last_failure = Some(e.clone());
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    fn on_frame(&mut self, token: FrameToken) -> Result<()> {
        let Some(handle) = &mut self.handle else {
            return Ok(());
        };
        if handle.pending != Some(token) {
            return Ok(());
        }
        handle.pending = None;
        if !handle.running {
            self.handle = None;
            return Ok(());
        }

        let Some(Active {
            adapter: BackendAdapter::Stepped(backend),
            ..
        }) = &mut self.active
        else {
            self.handle = None;
            return Ok(());
        };

        let result = match backend.step() {
            Ok(()) => self.render(),
            Err(e) => Err(HarnessError::Step(e)),
        };

        match result {
            Ok(()) => {
                if let Some(handle) = &mut self.handle {
                    handle.pending = Some(self.frames.request());
                }
                Ok(())
            }
            Err(e) => {
                log::error!("halting run loop: {e}");
                self.handle = None;
                self.state = LoopState::Halted;
                self.last_failure = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Decodes the backend's current frame buffer into the surface. The view is taken
    /// anew and dropped before returning.
    fn render(&mut self) -> Result<()> {
        let active = self.active.as_ref().ok_or(HarnessError::NoBackend)?;
        let view = active.adapter.frame_view()?;
        decode(&view, &active.descriptor.geometry, &mut self.surface)
    }

    /// Forwards a host key press. Returns the key it was mapped to, or `None` when the
    /// identifier isn't mapped or no initialized backend is there to receive it.
    pub fn key_down(&mut self, identifier: &str) -> Option<Key> {
        let (active, key) = self.key_target(identifier)?;
        log::debug!("key down: {identifier:?} -> {:#x}", key.code());
        active.adapter.key_down(key);
        Some(key)
    }

    /// Forwards a host key release. See [`Session::key_down`].
    pub fn key_up(&mut self, identifier: &str) -> Option<Key> {
        let (active, key) = self.key_target(identifier)?;
        log::debug!("key up: {identifier:?} -> {:#x}", key.code());
        active.adapter.key_up(key);
        Some(key)
    }

    fn key_target(&mut self, identifier: &str) -> Option<(&mut Active, Key)> {
        let Some(key) = map_key(identifier) else {
            log::debug!("ignoring unmapped key {identifier:?}");
            return None;
        };

        let active = self
            .active
            .as_mut()
            .filter(|a| a.readiness != Readiness::Uninitialized)?;
        Some((active, key))
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn policy(&self) -> Option<Policy> {
        self.active.as_ref().map(|a| a.adapter.policy())
    }

    pub fn selected(&self) -> Option<&BackendDescriptor> {
        self.active.as_ref().map(|a| &a.descriptor)
    }

    /// The most recently rendered frame.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The failure that last stopped or disturbed the run loop. Cleared by a
    /// successful [`Session::start`] and by selecting a backend.
    pub fn last_failure(&self) -> Option<&HarnessError> {
        self.last_failure.as_ref()
    }

    /// Number of scheduled frame callbacks waiting for the next refresh.
    pub fn pending_frames(&self) -> usize {
        self.frames.pending()
    }
}
