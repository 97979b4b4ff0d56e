//! Shell fixtures for app tests.

use titan_core::config::{AppsConfig, TitanConfig};
use titan_core::{AppRegistry, Shell, SurfaceId};

use crate::builtin_catalog;

/// A shell over the built-in catalog, started on `code`.
pub fn shell_on(code: &str) -> Shell {
    let config = TitanConfig {
        apps: AppsConfig {
            priority: vec![code.to_string()],
            ..AppsConfig::default()
        },
        ..TitanConfig::default()
    };
    let registry = AppRegistry::from_catalog(&builtin_catalog(), &config.apps)
        .unwrap_or_else(|e| panic!("builtin registry: {e}"));
    let mut shell = Shell::new(config, registry);
    shell
        .start(0)
        .unwrap_or_else(|e| panic!("start {code}: {e}"));
    shell
}

pub fn current(shell: &Shell) -> SurfaceId {
    shell.current_surface().expect("a page is loaded")
}

pub fn text(shell: &Shell, widget: &str) -> String {
    shell
        .surfaces
        .get(current(shell))
        .and_then(|s| s.widget(widget))
        .map(|w| w.text.clone())
        .unwrap_or_else(|| panic!("no widget '{widget}'"))
}

/// Press the named button on the current page.
pub fn press(shell: &mut Shell, widget: &str) {
    let action = shell
        .surfaces
        .get(current(shell))
        .and_then(|s| s.widget(widget))
        .and_then(|w| w.action())
        .unwrap_or_else(|| panic!("no enabled button '{widget}'"));
    action(shell);
}

/// Step virtual time forward by `ms`.
pub fn advance(shell: &mut Shell, ms: u64) {
    let target = shell.now_ms() + ms;
    shell.run_until(target);
}
