//! A host-side harness for emulator backends.
//!
//! A [`Session`] owns one backend, picked by name from a [`Registry`]. The host
//! initializes it, hands it a program image, starts it and then calls
//! [`Session::tick`] on every display refresh; each tick drives the backend and
//! decodes its frame buffer into a [`Surface`]. [`run_window`] does all of the host
//! side in a desktop window.

pub use crate::decode::Color;

/// Size of a monochrome cell on screen, in pixels.
pub const DEFAULT_SCALE: usize = 10;
/// Display refreshes per second.
pub const FRAME_RATE: f64 = 60.0;

pub const FOREGROUND: Color = Color(0xff, 0xff, 0xff);
pub const BACKGROUND: Color = Color(0x00, 0x00, 0x00);

/// 64×32 cells, one byte per cell.
pub const CHIP8_DISPLAY: Geometry = Geometry::monochrome(64, 32, DEFAULT_SCALE);
/// 160×144 pixels, one gray level per pixel.
pub const GAMEBOY_DISPLAY: Geometry = Geometry::grayscale(160, 144);

mod backend;
mod decode;
mod error;
mod input;
mod memory;
mod registry;
mod run;
mod schedule;
mod window;

pub use backend::{Backend, BackendAdapter, ContinuousBackend, Policy, SteppedBackend};
pub use decode::{decode, Geometry, PixelFormat, Surface};
pub use error::{BackendError, HarnessError, Result};
pub use input::{map_key, Key};
pub use memory::{acquire_view, FrameView, GrowableMemory, LinearMemory, PAGE_SIZE};
pub use registry::{BackendDescriptor, Factory, Registry};
pub use run::{LoopState, Session};
pub use schedule::{FrameScheduler, FrameToken};
pub use window::{run_window, WindowConfig};
