//! Toolkit-agnostic input event types.
//!
//! Every backend maps its native input to these enums. The shell core
//! never sees raw terminal or window-system input.

use serde::{Deserialize, Serialize};

/// A toolkit-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A chrome shortcut key was pressed.
    Shortcut(Shortcut),
    /// Pointer click at an absolute window position (mouse or touch).
    PointerClick { x: i32, y: i32 },
    /// The window was resized by the host (Titan windows are fixed-size;
    /// backends report this only so it can be logged).
    Resized { width: u32, height: u32 },
    /// User requested quit (window close, `q`, etc.).
    Quit,
}

/// Keyboard shortcuts that mirror the chrome buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shortcut {
    /// Switch to the previous app.
    Previous,
    /// Switch to the next app.
    Next,
    /// Send the back signal.
    Back,
    /// Go to the first app.
    Home,
    /// Toggle the running-apps popup.
    RunningApps,
    /// Toggle the full app list popup.
    AppList,
}
