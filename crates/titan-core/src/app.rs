//! The app plugin contract.
//!
//! An app code maps to one [`AppModule`], created once by the registry and
//! kept for the life of the shell. Each time navigation enters a page the
//! module produces a fresh [`App`] instance, which the resulting
//! [`AppInstanceHandle`] owns until the page is retired. State that has to
//! outlive a page (a stopwatch that keeps counting off-screen) belongs in the
//! module, never in globals.
//!
//! Every hook call goes through the handle, which turns both returned errors
//! and panics into [`TitanError::Plugin`] so one misbehaving app cannot take
//! the shell down.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use crate::error::{Result, TitanError};
use crate::shell::Shell;
use crate::surface::SurfaceId;

/// One live instance of an app, bound to a single surface.
pub trait App {
    /// Build the page into `surface`.
    fn create(&mut self, surface: SurfaceId, shell: &mut Shell) -> Result<()>;

    /// Release anything the page holds (timers, module flags). After this
    /// returns, callbacks the app scheduled must no longer act.
    fn destroy(&mut self, _surface: SurfaceId, _shell: &mut Shell) -> Result<()> {
        Ok(())
    }

    /// Handle the back signal. `true` means the app consumed it.
    fn on_back(&mut self, _surface: SurfaceId, _shell: &mut Shell) -> Result<bool> {
        Ok(false)
    }
}

/// The long-lived, per-code half of a plugin.
pub trait AppModule {
    /// Produce a fresh instance for a new page.
    fn instantiate(&self) -> Box<dyn App>;

    /// Whether the app has activity that continues off-page.
    fn is_running(&self) -> bool {
        false
    }
}

/// A module with no state of its own.
pub struct StatelessModule<F> {
    factory: F,
}

impl<F> StatelessModule<F>
where
    F: Fn() -> Box<dyn App>,
{
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F> AppModule for StatelessModule<F>
where
    F: Fn() -> Box<dyn App>,
{
    fn instantiate(&self) -> Box<dyn App> {
        (self.factory)()
    }
}

/// A page's app instance together with the code, module and surface it
/// belongs to.
pub struct AppInstanceHandle {
    code: String,
    module: Weak<dyn AppModule>,
    surface: SurfaceId,
    app: Box<dyn App>,
}

impl fmt::Debug for AppInstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppInstanceHandle")
            .field("code", &self.code)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl AppInstanceHandle {
    /// Instantiate `module` for `surface`. A panicking `instantiate` comes
    /// back as a plugin error.
    pub fn new(code: &str, module: &Rc<dyn AppModule>, surface: SurfaceId) -> Result<Self> {
        let app = guarded(code, "instantiate", || Ok(module.instantiate()))?;
        Ok(Self {
            code: code.to_string(),
            module: Rc::downgrade(module),
            surface,
            app,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// The owning module, if the registry still holds it.
    pub fn module(&self) -> Option<Rc<dyn AppModule>> {
        self.module.upgrade()
    }

    pub fn create(&mut self, shell: &mut Shell) -> Result<()> {
        let surface = self.surface;
        let app = &mut self.app;
        guarded(&self.code, "create", || app.create(surface, shell))
    }

    pub fn destroy(&mut self, shell: &mut Shell) -> Result<()> {
        let surface = self.surface;
        let app = &mut self.app;
        guarded(&self.code, "destroy", || app.destroy(surface, shell))
    }

    pub fn on_back(&mut self, shell: &mut Shell) -> Result<bool> {
        let surface = self.surface;
        let app = &mut self.app;
        guarded(&self.code, "on_back", || app.on_back(surface, shell))
    }
}

/// Ask `module` whether it is running. A panic counts as not running.
pub(crate) fn query_running(code: &str, module: &dyn AppModule) -> bool {
    match guarded(code, "is_running", || Ok(module.is_running())) {
        Ok(running) => running,
        Err(e) => {
            log::error!("{e}");
            false
        },
    }
}

/// Run a plugin hook, converting errors and panics into plugin errors.
pub(crate) fn guarded<T>(code: &str, hook: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e @ TitanError::Plugin { .. })) => Err(e),
        Ok(Err(e)) => Err(TitanError::plugin(code, format!("{hook}: {e}"))),
        Err(payload) => Err(TitanError::plugin(
            code,
            format!("{hook} panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
