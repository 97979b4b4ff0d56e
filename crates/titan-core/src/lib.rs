//! Titan shell core.
//!
//! Toolkit-agnostic launcher framework: a deferred-callback scheduler, page
//! surfaces, the app plugin contract and registry, the slide transition
//! engine, the navigation controller, and the popup/notification overlay.
//! Backends only ever see the flattened draw list produced by [`scene`].

// Re-exports from titan-types (foundation types).
pub use titan_types::color;
pub use titan_types::config;
pub use titan_types::error;
pub use titan_types::geometry;
pub use titan_types::input;

pub mod app;
pub mod chrome;
pub mod nav;
pub mod overlay;
pub mod registry;
pub mod scene;
pub mod shell;
pub mod surface;
pub mod timer;
pub mod transition;

#[cfg(test)]
pub(crate) mod test_utils;

pub use app::{App, AppInstanceHandle, AppModule, StatelessModule};
pub use nav::{BackOutcome, Phase};
pub use overlay::{NotificationKind, PopupEntry};
pub use registry::{AppCatalog, AppRegistry};
pub use scene::DrawCommand;
pub use shell::{Action, InputOutcome, Shell};
pub use surface::{SurfaceId, Widget};
pub use transition::Direction;
