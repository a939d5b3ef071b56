use crate::error::{HarnessError, Result};
use crate::run::Session;
use crate::FRAME_RATE;
use pixels::{Pixels, SurfaceTexture};
use std::time::{Duration, Instant};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Display refreshes per second. Every refresh runs [`Session::tick`] once.
    pub frame_rate: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "rom-harness".to_string(),
            frame_rate: FRAME_RATE,
        }
    }
}

/// The textual identifier a host would report for a key. Only digits and letters
/// are reported, in lower case.
fn key_identifier(code: VirtualKeyCode) -> Option<&'static str> {
    use VirtualKeyCode::*;

    Some(match code {
        Key0 => "0",
        Key1 => "1",
        Key2 => "2",
        Key3 => "3",
        Key4 => "4",
        Key5 => "5",
        Key6 => "6",
        Key7 => "7",
        Key8 => "8",
        Key9 => "9",
        A => "a",
        B => "b",
        C => "c",
        D => "d",
        E => "e",
        F => "f",
        G => "g",
        H => "h",
        I => "i",
        J => "j",
        K => "k",
        L => "l",
        M => "m",
        N => "n",
        O => "o",
        P => "p",
        Q => "q",
        R => "r",
        S => "s",
        T => "t",
        U => "u",
        V => "v",
        W => "w",
        X => "x",
        Y => "y",
        Z => "z",
        _ => return None,
    })
}

/// Opens a window showing the session's surface and drives the session from the
/// window's event loop: one [`Session::tick`] per refresh, keyboard input forwarded
/// through the keypad mapping.
///
/// The session needs a selected backend. Whether it's already initialized, loaded or
/// started is up to the caller.
///
/// This function *has to be called from the main thread*, and only returns if no
/// backend is selected.
pub fn run_window(mut session: Session, config: WindowConfig) -> Result<()> {
    if session.selected().is_none() {
        return Err(HarnessError::NoBackend);
    }

    let width = session.surface().width() as u32;
    let height = session.surface().height() as u32;

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(width, height))
        .build(&event_loop)
        .expect("failed to create window");

    let window_size = window.inner_size();
    let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
    let mut pixels = Pixels::new(width, height, surface_texture).expect("failed to create surface");

    let mut last = Instant::now();
    let wait_time = Duration::from_secs_f64(1.0 / config.frame_rate);

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                *control_flow = ControlFlow::Exit;
                return;
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => {
                if let Err(e) = pixels.resize_surface(size.width, size.height) {
                    log::error!("failed to resize surface: {e}");
                }
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { input, .. },
                ..
            } => {
                if let Some(identifier) = input.virtual_keycode.and_then(key_identifier) {
                    match input.state {
                        ElementState::Pressed => session.key_down(identifier),
                        ElementState::Released => session.key_up(identifier),
                    };
                }
            }
            _ => {}
        }

        *control_flow = ControlFlow::WaitUntil(Instant::now() + wait_time);

        if Instant::now().duration_since(last) >= wait_time {
            // the window stays up on failure to show the last frame
            if let Err(e) = session.tick() {
                log::error!("{e}");
                window.set_title(&format!("{} - {e}", config.title));
            }

            let frame = session.surface().pixels();
            if pixels.get_frame_mut().len() == frame.len() {
                pixels.get_frame_mut().copy_from_slice(frame);
            }
            if let Err(e) = pixels.render() {
                log::error!("failed to render using pixels library: {e}");
                *control_flow = ControlFlow::Exit;
            }

            last = Instant::now();
        }
    })
}
