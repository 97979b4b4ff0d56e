//! Host backends: where draw lists are painted and input comes from.

use titan_core::DrawCommand;
use titan_core::config::WindowConfig;
use titan_core::error::Result;
use titan_core::input::InputEvent;

/// A window or terminal that can show a frame and report input.
pub trait ShellBackend {
    /// Drain pending input without blocking.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Paint one frame.
    fn present(&mut self, frame: &[DrawCommand]) -> Result<()>;

    /// Release the host. Called once, after the loop exits.
    fn shutdown(&mut self) -> Result<()>;
}

/// The backend this build was compiled for.
#[cfg(feature = "sdl")]
pub fn create(window: &WindowConfig) -> Result<Box<dyn ShellBackend>> {
    Ok(Box::new(crate::sdl::SdlBackend::new(window)?))
}

/// The backend this build was compiled for.
#[cfg(not(feature = "sdl"))]
pub fn create(window: &WindowConfig) -> Result<Box<dyn ShellBackend>> {
    Ok(Box::new(crate::terminal::TerminalBackend::new(window)?))
}
