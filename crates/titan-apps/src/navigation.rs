//! In-app navigation demo.
//!
//! Keeps a stack of sub-pages so the shell's Back button has something to
//! unwind: `on_back` pops the stack and reports whether it did. A toggle
//! marks the module as running for the running-apps list; leaving the page
//! clears it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use titan_core::error::Result;
use titan_core::geometry::Rect;
use titan_core::{App, AppModule, Shell, SurfaceId, Widget};

use crate::page;

const MAIN_PAGE: &str = "Main Page";

fn running_text(running: bool) -> &'static str {
    if running {
        "Running: Yes"
    } else {
        "Running: No"
    }
}

pub struct NavigationModule {
    running: Rc<Cell<bool>>,
}

impl NavigationModule {
    pub fn new() -> Self {
        Self {
            running: Rc::new(Cell::new(false)),
        }
    }
}

impl Default for NavigationModule {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModule for NavigationModule {
    fn instantiate(&self) -> Box<dyn App> {
        Box::new(NavigationApp {
            stack: Rc::new(RefCell::new(SubPages::default())),
            running: Rc::clone(&self.running),
        })
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}

/// The visible sub-page and the ones under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPages {
    current: String,
    below: Vec<String>,
}

impl Default for SubPages {
    fn default() -> Self {
        Self {
            current: MAIN_PAGE.to_string(),
            below: Vec::new(),
        }
    }
}

impl SubPages {
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.below.len()
    }

    pub fn push(&mut self, name: &str) {
        let previous = std::mem::replace(&mut self.current, name.to_string());
        self.below.push(previous);
    }

    /// Return to the previous sub-page. False when already at the bottom.
    pub fn pop(&mut self) -> bool {
        match self.below.pop() {
            Some(previous) => {
                self.current = previous;
                true
            },
            None => false,
        }
    }
}

struct NavigationApp {
    stack: Rc<RefCell<SubPages>>,
    running: Rc<Cell<bool>>,
}

impl App for NavigationApp {
    fn create(&mut self, surface: SurfaceId, shell: &mut Shell) -> Result<()> {
        let ui = shell.config.ui.clone();
        let s = page(shell, surface)?;
        s.configure_background(ui.background);

        s.add(
            Widget::label("title", Rect::new(0, 5, 300, 30), "Navigation Test App")
                .with_fg(ui.primary)
                .with_font_size(16),
        );
        s.add(
            Widget::label("page", Rect::new(0, 35, 300, 25), self.stack.borrow().current())
                .with_fg(ui.primary)
                .with_font_size(14),
        );
        for n in 1..=3 {
            let stack = Rc::clone(&self.stack);
            let name = format!("Page {n}");
            s.add(
                Widget::button(
                    &format!("goto_{n}"),
                    Rect::new(90, 35 + 30 * n, 120, 25),
                    &format!("Go to {name}"),
                    move |shell: &mut Shell| {
                        stack.borrow_mut().push(&name);
                        show(shell, surface, &stack.borrow());
                    },
                )
                .with_fg(ui.background)
                .with_bg(ui.primary)
                .with_font_size(12),
            );
        }
        let stack = Rc::clone(&self.stack);
        s.add(
            Widget::button(
                "back",
                Rect::new(90, 160, 120, 25),
                "Back (Internal)",
                move |shell: &mut Shell| {
                    if stack.borrow_mut().pop() {
                        show(shell, surface, &stack.borrow());
                    }
                },
            )
            .with_fg(ui.background)
            .with_bg(ui.secondary)
            .with_font_size(12),
        );
        s.set_enabled("back", self.stack.borrow().depth() > 0);

        s.add(
            Widget::label("running", Rect::new(0, 190, 300, 20), running_text(self.running.get()))
                .with_fg(ui.primary)
                .with_font_size(14),
        );
        let running = Rc::clone(&self.running);
        s.add(
            Widget::button(
                "toggle_running",
                Rect::new(70, 215, 160, 25),
                "Toggle Running State",
                move |shell: &mut Shell| {
                    running.set(!running.get());
                    if let Some(s) = shell.surfaces.get_mut(surface) {
                        s.set_text("running", running_text(running.get()));
                    }
                },
            )
            .with_fg(ui.background)
            .with_bg(ui.primary)
            .with_font_size(12),
        );
        Ok(())
    }

    fn on_back(&mut self, surface: SurfaceId, shell: &mut Shell) -> Result<bool> {
        let popped = self.stack.borrow_mut().pop();
        if popped {
            show(shell, surface, &self.stack.borrow());
        }
        Ok(popped)
    }

    fn destroy(&mut self, _surface: SurfaceId, _shell: &mut Shell) -> Result<()> {
        self.running.set(false);
        Ok(())
    }
}

fn show(shell: &mut Shell, surface: SurfaceId, stack: &SubPages) {
    if let Some(s) = shell.surfaces.get_mut(surface) {
        s.set_text("page", stack.current());
        s.set_enabled("back", stack.depth() > 0);
    }
}
