//! App registry: which apps exist, in what order, and their modules.
//!
//! Plugins are compiled in and registered into an [`AppCatalog`]. At startup
//! the registry decides the scan order (the configured apps directory, or the
//! catalog's registration order), applies the priority list, and builds each
//! module exactly once. Modules are never rebuilt afterwards.

mod discovery;

pub use discovery::{order_codes, scan_directory};

use std::fmt;
use std::rc::Rc;

use crate::app::{self, AppInstanceHandle, AppModule};
use crate::config::AppsConfig;
use crate::error::{Result, TitanError};
use crate::shell::Shell;
use crate::surface::SurfaceId;

/// Builds the module for one app code.
pub type ModuleFactory = Box<dyn Fn() -> Rc<dyn AppModule>>;

/// Every plugin compiled into the binary, in registration order.
#[derive(Default)]
pub struct AppCatalog {
    entries: Vec<(String, ModuleFactory)>,
}

impl fmt::Debug for AppCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.codes()).finish()
    }
}

impl AppCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `code`. A second registration of the same code replaces the
    /// factory but keeps the original position.
    pub fn register(
        &mut self,
        code: &str,
        factory: impl Fn() -> Rc<dyn AppModule> + 'static,
    ) -> &mut Self {
        match self.entries.iter_mut().find(|(c, _)| c == code) {
            Some(entry) => {
                log::warn!("App '{code}' registered twice, keeping the last factory");
                entry.1 = Box::new(factory);
            },
            None => self.entries.push((code.to_string(), Box::new(factory))),
        }
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, code: &str, factory: impl Fn() -> Rc<dyn AppModule> + 'static) -> Self {
        self.register(code, factory);
        self
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|(c, _)| c == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn build(&self, code: &str) -> Option<Rc<dyn AppModule>> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, factory)| factory())
    }
}

/// A discovered app. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDescriptor {
    pub code: String,
    /// Position in the final order; lower sorts first.
    pub priority_rank: usize,
}

/// The discovered apps and their cached modules.
pub struct AppRegistry {
    apps: Vec<(AppDescriptor, Rc<dyn AppModule>)>,
}

impl fmt::Debug for AppRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppRegistry")
            .field("apps", &self.list())
            .finish()
    }
}

impl AppRegistry {
    /// Discover apps and build their modules.
    ///
    /// Unreadable directories, unknown codes and undiscovered priority
    /// entries are logged and skipped. Only an empty result is fatal.
    pub fn from_catalog(catalog: &AppCatalog, config: &AppsConfig) -> Result<Self> {
        let scanned: Vec<String> = match &config.directory {
            Some(dir) => match scan_directory(dir, &config.reserved) {
                Ok(codes) => codes,
                Err(e) => {
                    log::error!("Cannot read apps directory {}: {e}", dir.display());
                    Vec::new()
                },
            },
            None => catalog.codes().map(str::to_string).collect(),
        };

        let known: Vec<String> = scanned
            .into_iter()
            .filter(|code| {
                let ok = catalog.contains(code);
                if !ok {
                    log::warn!("No plugin compiled in for app '{code}', skipping");
                }
                ok
            })
            .collect();

        let ordered = order_codes(&config.priority, &known, &config.reserved);
        if ordered.is_empty() {
            return Err(TitanError::Config("no apps discovered".into()));
        }

        let mut apps = Vec::with_capacity(ordered.len());
        for (rank, code) in ordered.into_iter().enumerate() {
            let Some(module) = catalog.build(&code) else {
                continue;
            };
            apps.push((
                AppDescriptor {
                    code,
                    priority_rank: rank,
                },
                module,
            ));
        }

        let registry = Self { apps };
        log::info!("Registered apps: {}", registry.list().join(", "));
        Ok(registry)
    }

    /// Every app code in order.
    pub fn list(&self) -> Vec<&str> {
        self.apps.iter().map(|(d, _)| d.code.as_str()).collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &AppDescriptor> {
        self.apps.iter().map(|(d, _)| d)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.apps.iter().position(|(d, _)| d.code == code)
    }

    pub fn code_at(&self, index: usize) -> Option<&str> {
        self.apps.get(index).map(|(d, _)| d.code.as_str())
    }

    /// The cached module for `code`.
    pub fn get_module(&self, code: &str) -> Option<Rc<dyn AppModule>> {
        self.apps
            .iter()
            .find(|(d, _)| d.code == code)
            .map(|(_, m)| Rc::clone(m))
    }

    /// Codes whose module reports activity, in registry order. A module whose
    /// `is_running` panics is left out.
    pub fn running(&self) -> Vec<String> {
        self.apps
            .iter()
            .filter(|(d, m)| app::query_running(&d.code, m.as_ref()))
            .map(|(d, _)| d.code.clone())
            .collect()
    }

    /// Create an instance of `code` and build it into `surface`.
    ///
    /// Takes the shell rather than `&self` because the app's `create` hook
    /// needs the whole shell, registry included.
    pub fn instantiate(
        shell: &mut Shell,
        surface: SurfaceId,
        code: &str,
    ) -> Result<AppInstanceHandle> {
        let module = shell
            .registry
            .get_module(code)
            .ok_or_else(|| TitanError::Lookup(code.to_string()))?;
        let mut handle = AppInstanceHandle::new(code, &module, surface)?;
        handle.create(shell)?;
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockModule;
    use std::fs;
    use std::path::PathBuf;

    fn catalog(codes: &[&str]) -> AppCatalog {
        let mut catalog = AppCatalog::new();
        for code in codes {
            let code = code.to_string();
            catalog.register(&code.clone(), move || {
                Rc::new(MockModule::new(&code)) as Rc<dyn AppModule>
            });
        }
        catalog
    }

    fn config(priority: &[&str], directory: Option<PathBuf>) -> AppsConfig {
        AppsConfig {
            directory,
            priority: priority.iter().map(|s| s.to_string()).collect(),
            ..AppsConfig::default()
        }
    }

    #[test]
    fn catalog_order_when_no_directory() {
        let reg = AppRegistry::from_catalog(
            &catalog(&["calculator", "stopwatch", "clock"]),
            &config(&["clock", "stopwatch"], None),
        )
        .unwrap();
        assert_eq!(reg.list(), vec!["clock", "stopwatch", "calculator"]);
        assert_eq!(reg.index_of("calculator"), Some(2));
        assert_eq!(reg.code_at(0), Some("clock"));
        assert_eq!(reg.code_at(3), None);
    }

    #[test]
    fn descriptors_carry_rank() {
        let reg =
            AppRegistry::from_catalog(&catalog(&["a", "b"]), &config(&["b"], None)).unwrap();
        let ranks: Vec<_> = reg
            .descriptors()
            .map(|d| (d.code.as_str(), d.priority_rank))
            .collect();
        assert_eq!(ranks, vec![("b", 0), ("a", 1)]);
    }

    #[test]
    fn directory_scan_filters_unknown_codes() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["weather.py", "clock.py", "calculator.py", "__init__.py"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let reg = AppRegistry::from_catalog(
            &catalog(&["clock", "calculator", "stopwatch"]),
            &config(&["stopwatch", "clock"], Some(dir.path().to_path_buf())),
        )
        .unwrap();
        assert_eq!(reg.list(), vec!["clock", "calculator"]);
    }

    #[test]
    fn missing_directory_is_fatal_when_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppRegistry::from_catalog(
            &catalog(&["clock"]),
            &config(&[], Some(dir.path().join("missing"))),
        )
        .unwrap_err();
        assert!(matches!(err, TitanError::Config(_)));
    }

    #[test]
    fn empty_catalog_is_config_error() {
        let err = AppRegistry::from_catalog(&AppCatalog::new(), &AppsConfig::default())
            .unwrap_err();
        assert!(matches!(err, TitanError::Config(_)));
    }

    #[test]
    fn modules_are_cached() {
        let reg = AppRegistry::from_catalog(&catalog(&["clock"]), &config(&[], None)).unwrap();
        let a = reg.get_module("clock").unwrap();
        let b = reg.get_module("clock").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(reg.get_module("nonexistent").is_none());
    }

    #[test]
    fn duplicate_registration_keeps_position() {
        let mut c = catalog(&["a", "b"]);
        c.register("a", || Rc::new(MockModule::new("a2")) as Rc<dyn AppModule>);
        assert_eq!(c.codes().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(c.len(), 2);
    }
}
