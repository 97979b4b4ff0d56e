//! Recording mock apps and shell helpers for tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::app::{App, AppModule};
use crate::config::{AppsConfig, TitanConfig};
use crate::error::{Result, TitanError};
use crate::geometry::Rect;
use crate::registry::{AppCatalog, AppRegistry};
use crate::shell::Shell;
use crate::surface::{SurfaceId, Widget};

/// Shared, ordered record of hook calls, e.g. `"create:clock"`.
pub type Journal = Rc<RefCell<Vec<String>>>;

/// Module whose instances record every hook call into a journal.
pub struct MockModule {
    code: String,
    journal: Journal,
    fail_create: bool,
    panic_create: bool,
    panic_instantiate: bool,
    panic_running: bool,
    panic_press: bool,
    fail_destroy: bool,
    consume_back: bool,
    running: Rc<Cell<bool>>,
}

impl MockModule {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            journal: Journal::default(),
            fail_create: false,
            panic_create: false,
            panic_instantiate: false,
            panic_running: false,
            panic_press: false,
            fail_destroy: false,
            consume_back: false,
            running: Rc::new(Cell::new(false)),
        }
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Rc::clone(journal);
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn panicking_create(mut self) -> Self {
        self.panic_create = true;
        self
    }

    pub fn panicking_instantiate(mut self) -> Self {
        self.panic_instantiate = true;
        self
    }

    pub fn panicking_running(mut self) -> Self {
        self.panic_running = true;
        self
    }

    /// The page's "press" button panics when clicked.
    pub fn panicking_press(mut self) -> Self {
        self.panic_press = true;
        self
    }

    pub fn failing_destroy(mut self) -> Self {
        self.fail_destroy = true;
        self
    }

    pub fn consuming_back(mut self) -> Self {
        self.consume_back = true;
        self
    }

    pub fn running(self) -> Self {
        self.running.set(true);
        self
    }
}

impl AppModule for MockModule {
    fn instantiate(&self) -> Box<dyn App> {
        if self.panic_instantiate {
            panic!("mock instantiate panicked");
        }
        Box::new(MockApp {
            code: self.code.clone(),
            journal: Rc::clone(&self.journal),
            fail_create: self.fail_create,
            panic_create: self.panic_create,
            panic_press: self.panic_press,
            fail_destroy: self.fail_destroy,
            consume_back: self.consume_back,
        })
    }

    fn is_running(&self) -> bool {
        if self.panic_running {
            panic!("mock is_running panicked");
        }
        self.running.get()
    }
}

struct MockApp {
    code: String,
    journal: Journal,
    fail_create: bool,
    panic_create: bool,
    panic_press: bool,
    fail_destroy: bool,
    consume_back: bool,
}

impl MockApp {
    fn record(&self, event: &str) {
        self.journal.borrow_mut().push(format!("{event}:{}", self.code));
    }
}

impl App for MockApp {
    fn create(&mut self, surface: SurfaceId, shell: &mut Shell) -> Result<()> {
        self.record("create");
        if self.panic_create {
            panic!("mock create panicked");
        }
        if self.fail_create {
            return Err(TitanError::Surface("mock create failed".into()));
        }
        let journal = Rc::clone(&self.journal);
        let pressed = format!("pressed:{}", self.code);
        let panic_press = self.panic_press;
        if let Some(s) = shell.surfaces.get_mut(surface) {
            s.add(Widget::label("title", Rect::new(0, 50, 300, 40), &self.code));
            s.add(Widget::button(
                "press",
                Rect::new(10, 10, 50, 30),
                "press",
                move |_| {
                    if panic_press {
                        panic!("mock press panicked");
                    }
                    journal.borrow_mut().push(pressed.clone());
                },
            ));
        }
        Ok(())
    }

    fn destroy(&mut self, _surface: SurfaceId, _shell: &mut Shell) -> Result<()> {
        self.record("destroy");
        if self.fail_destroy {
            return Err(TitanError::Surface("mock destroy failed".into()));
        }
        Ok(())
    }

    fn on_back(&mut self, _surface: SurfaceId, _shell: &mut Shell) -> Result<bool> {
        self.record("on_back");
        Ok(self.consume_back)
    }
}

/// A shell whose registry holds `modules` in the given order.
pub fn shell_with(modules: Vec<MockModule>) -> Shell {
    let mut catalog = AppCatalog::new();
    for module in modules {
        let code = module.code.clone();
        let module: Rc<dyn AppModule> = Rc::new(module);
        catalog.register(&code, move || Rc::clone(&module));
    }
    shell_from(&catalog)
}

/// A default-configured shell over `catalog`, in registration order.
pub fn shell_from(catalog: &AppCatalog) -> Shell {
    let config = TitanConfig {
        apps: AppsConfig {
            priority: Vec::new(),
            ..AppsConfig::default()
        },
        ..TitanConfig::default()
    };
    let registry = AppRegistry::from_catalog(catalog, &config.apps)
        .unwrap_or_else(|e| panic!("mock registry: {e}"));
    Shell::new(config, registry)
}

/// A shell with one plain mock per code, all recording into one journal.
pub fn mock_shell(codes: &[&str]) -> (Shell, Journal) {
    let journal = Journal::default();
    let modules = codes
        .iter()
        .map(|code| MockModule::new(code).with_journal(&journal))
        .collect();
    (shell_with(modules), journal)
}

/// Let any running transition finish and complete.
pub fn settle(shell: &mut Shell) {
    let target = shell.now_ms() + 2_000;
    shell.run_until(target);
}
