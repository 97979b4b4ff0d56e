//! Built-in Titan apps.
//!
//! Each app is a plugin behind the [`titan_core::AppModule`] contract and
//! builds its page from labels and buttons on the surface it is given.
//! [`register_builtins`] adds all of them to a catalog in their default
//! order.

use std::rc::Rc;

use titan_core::error::{Result, TitanError};
use titan_core::surface::Surface;
use titan_core::{AppCatalog, AppModule, Shell, SurfaceId};

pub mod calculator;
pub mod clock;
pub mod music_player;
pub mod navigation;
pub mod stopwatch;

#[cfg(test)]
mod test_utils;

/// Register every built-in app into `catalog`.
pub fn register_builtins(catalog: &mut AppCatalog) {
    catalog
        .register("clock", || Rc::new(clock::ClockModule::new()) as Rc<dyn AppModule>)
        .register("stopwatch", || {
            Rc::new(stopwatch::StopwatchModule::new()) as Rc<dyn AppModule>
        })
        .register("calculator", || {
            Rc::new(calculator::CalculatorModule) as Rc<dyn AppModule>
        })
        .register("music_player", || {
            Rc::new(music_player::MusicPlayerModule::new()) as Rc<dyn AppModule>
        })
        .register("navigation", || {
            Rc::new(navigation::NavigationModule::new()) as Rc<dyn AppModule>
        });
}

/// A catalog holding every built-in app.
pub fn builtin_catalog() -> AppCatalog {
    let mut catalog = AppCatalog::new();
    register_builtins(&mut catalog);
    catalog
}

/// The surface an app was given, or a surface error if it is gone.
pub(crate) fn page(shell: &mut Shell, id: SurfaceId) -> Result<&mut Surface> {
    shell
        .surfaces
        .get_mut(id)
        .ok_or_else(|| TitanError::Surface(format!("{id} is gone")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_in_default_order() {
        let codes: Vec<_> = builtin_catalog().codes().map(str::to_string).collect();
        assert_eq!(
            codes,
            vec!["clock", "stopwatch", "calculator", "music_player", "navigation"]
        );
    }

    #[test]
    fn every_builtin_starts() {
        for code in builtin_catalog().codes() {
            let shell = test_utils::shell_on(code);
            assert_eq!(shell.current_code(), Some(code));
            let surface = shell.surfaces.get(shell.current_surface().unwrap()).unwrap();
            assert!(!surface.widgets().is_empty(), "{code} built no widgets");
        }
    }
}
