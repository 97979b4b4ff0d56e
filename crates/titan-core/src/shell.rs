//! The shell context: one value that owns every piece of runtime state.
//!
//! Scheduled callbacks, widget actions and app hooks all receive
//! `&mut Shell`, so there is no shared mutable state anywhere else. The host
//! feeds input through [`Shell::handle_input`] and its clock through
//! [`Shell::run_due`], then renders [`crate::scene::build`].

use std::fmt;
use std::rc::Rc;

use crate::app::guarded;
use crate::chrome::{Chrome, ChromeButton};
use crate::config::TitanConfig;
use crate::error::TitanError;
use crate::geometry::Point;
use crate::input::{InputEvent, Shortcut};
use crate::nav::NavigationState;
use crate::overlay::{Overlay, PopupHit};
use crate::registry::AppRegistry;
use crate::surface::SurfaceArena;
use crate::timer::{self, TimerHost, TimerId, TimerQueue};
use crate::transition::{Direction, TransitionEngine};

/// A widget or popup action.
pub type Action = Rc<dyn Fn(&mut Shell)>;

/// What the shell did with an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Handled,
    Ignored,
    Quit,
}

pub struct Shell {
    pub config: TitanConfig,
    pub timers: TimerQueue<Shell>,
    pub surfaces: SurfaceArena,
    pub registry: AppRegistry,
    pub transitions: TransitionEngine,
    pub overlay: Overlay,
    pub chrome: Chrome,
    pub(crate) nav: NavigationState,
    quit_requested: bool,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("registry", &self.registry)
            .field("nav", &self.nav)
            .field("timers", &self.timers)
            .field("surfaces", &self.surfaces)
            .finish_non_exhaustive()
    }
}

impl TimerHost for Shell {
    fn timers(&mut self) -> &mut TimerQueue<Self> {
        &mut self.timers
    }
}

impl Shell {
    /// Build a shell. No page is loaded until [`Shell::start`].
    pub fn new(config: TitanConfig, registry: AppRegistry) -> Self {
        let chrome = Chrome::new(&config.window);
        let overlay = Overlay::new(config.window.content_rect());
        Self {
            config,
            timers: TimerQueue::new(),
            surfaces: SurfaceArena::new(),
            registry,
            transitions: TransitionEngine::new(),
            overlay,
            chrome,
            nav: NavigationState::default(),
            quit_requested: false,
        }
    }

    /// Scheduler time of the most recent pass.
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Run `f` after `delay_ms`. A panic inside `f` is reported as an error
    /// banner instead of unwinding through the scheduler.
    pub fn after(&mut self, delay_ms: u64, f: impl FnOnce(&mut Shell) + 'static) -> TimerId {
        self.timers.schedule(delay_ms, move |shell: &mut Shell| {
            let result = guarded("timer", "callback", || {
                f(shell);
                Ok(())
            });
            if let Err(e) = result {
                shell.report_error(&e);
            }
        })
    }

    /// Cancel a scheduled callback; a no-op if it already ran.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    /// Run everything due at `now_ms` (the host's monotonic clock).
    pub fn run_due(&mut self, now_ms: u64) -> usize {
        timer::run_due(self, now_ms)
    }

    /// Step virtual time up to `target_ms`, firing callbacks in order.
    pub fn run_until(&mut self, target_ms: u64) -> usize {
        timer::run_until(self, target_ms)
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Run a widget or popup action on behalf of `code`, reporting a panic
    /// instead of letting it reach the host.
    pub(crate) fn run_action(&mut self, code: &str, action: &Action) {
        let result = guarded(code, "action", || {
            action(self);
            Ok(())
        });
        if let Err(e) = result {
            self.report_error(&e);
        }
    }

    /// Log a failure and show it as an error banner.
    pub fn report_error(&mut self, err: &TitanError) {
        log::error!("{err}");
        self.error(&err.to_string());
    }

    /// Route one input event.
    ///
    /// Pointer clicks go to the popup first (a click anywhere inside it is
    /// consumed), then the chrome, then the current page's buttons. Page
    /// buttons are inert while a transition runs.
    pub fn handle_input(&mut self, event: &InputEvent) -> InputOutcome {
        match *event {
            InputEvent::Quit => {
                self.request_quit();
                InputOutcome::Quit
            },
            InputEvent::Resized { width, height } => {
                log::debug!("Host resized to {width}x{height}, layout is fixed");
                InputOutcome::Ignored
            },
            InputEvent::Shortcut(shortcut) => self.handle_shortcut(shortcut),
            InputEvent::PointerClick { x, y } => self.handle_click(Point::new(x, y)),
        }
    }

    fn handle_shortcut(&mut self, shortcut: Shortcut) -> InputOutcome {
        let button = match shortcut {
            Shortcut::Previous => ChromeButton::SwitchLeft,
            Shortcut::Next => ChromeButton::SwitchRight,
            Shortcut::Back => ChromeButton::Back,
            Shortcut::Home => ChromeButton::Home,
            Shortcut::RunningApps => ChromeButton::Apps,
            Shortcut::AppList => {
                if !self.chrome.is_enabled() {
                    return InputOutcome::Ignored;
                }
                self.show_app_list();
                return InputOutcome::Handled;
            },
        };
        self.press_chrome(button)
    }

    fn handle_click(&mut self, p: Point) -> InputOutcome {
        if let Some(hit) = self.overlay.popup().and_then(|popup| popup.hit_test(p)) {
            match hit {
                PopupHit::Close => {
                    self.close_active_popup();
                },
                PopupHit::Entry(index) => {
                    self.activate_popup_entry(index);
                },
                PopupHit::Background => {},
            }
            return InputOutcome::Handled;
        }

        if let Some(button) = self.chrome.hit_test(p) {
            return self.press_chrome(button);
        }

        if self.is_transitioning() {
            return InputOutcome::Ignored;
        }
        let content = self.config.window.content_rect().origin();
        let action = self.current_surface().and_then(|id| {
            let surface = self.surfaces.get(id)?;
            let origin = surface.position()?;
            let local = Point::new(p.x - content.x - origin.x, p.y - content.y - origin.y);
            surface.button_at(local)?.action()
        });
        match action {
            Some(action) => {
                let code = self.current_code().unwrap_or("?").to_string();
                self.run_action(&code, &action);
                InputOutcome::Handled
            },
            None => InputOutcome::Ignored,
        }
    }

    /// Act on a chrome button. Ignored while the chrome is disabled.
    pub fn press_chrome(&mut self, button: ChromeButton) -> InputOutcome {
        if !self.chrome.is_enabled() {
            log::debug!("Chrome disabled, ignoring {button:?}");
            return InputOutcome::Ignored;
        }
        let result = match button {
            ChromeButton::SwitchLeft => self.switch(Direction::Backward),
            ChromeButton::SwitchRight => self.switch(Direction::Forward),
            ChromeButton::Home => self.go_home(),
            ChromeButton::Back => {
                self.send_back_signal();
                Ok(())
            },
            ChromeButton::Apps => {
                self.show_running_apps();
                Ok(())
            },
        };
        if let Err(e) = result {
            log::debug!("{button:?} did not navigate: {e}");
        }
        InputOutcome::Handled
    }
}
