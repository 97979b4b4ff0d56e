//! Navigation controller: which app is on screen and how it gets replaced.
//!
//! The controller is either idle with one page at the origin, or
//! transitioning with a second, incoming page sliding in. A switch builds the
//! incoming page first, starts the slide, then polls the transition engine;
//! once the slide has finished the outgoing app's `destroy` hook runs, its
//! surface is destroyed and only then does the incoming page become current.
//! The chrome is disabled for the whole transition.


use crate::app::AppInstanceHandle;
use crate::error::{Result, TitanError};
use crate::overlay::{PopupEntry, PopupHandle};
use crate::registry::AppRegistry;
use crate::shell::Shell;
use crate::surface::{Surface, SurfaceId};
use crate::timer::TimerId;
use crate::transition::{self, Direction, TransitionToken};

/// Controller phase as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Transitioning,
}

/// Result of [`Shell::send_back_signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// A popup was open and has been closed; the app was not asked.
    PopupClosed,
    /// The app's `on_back` returned this.
    App(bool),
}

#[derive(Debug)]
struct PendingSwitch {
    incoming: AppInstanceHandle,
    next_index: usize,
    token: TransitionToken,
    direction: Direction,
}

/// State owned by the controller. Only the controller mutates it.
#[derive(Debug, Default)]
pub(crate) struct NavigationState {
    current_index: usize,
    /// `None` before `start`, and while one of its hooks runs.
    current: Option<AppInstanceHandle>,
    pending: Option<PendingSwitch>,
    poll: Option<TimerId>,
}

impl Shell {
    /// Load the first page at rest.
    ///
    /// Tries `index` first and then each following app until one builds.
    pub fn start(&mut self, index: usize) -> Result<()> {
        if self.is_transitioning() {
            return Err(TitanError::TransitionInProgress);
        }
        if let Some(mut old) = self.nav.current.take() {
            self.retire(&mut old);
        }

        let count = self.registry.len();
        let mut last_err = TitanError::Config("no apps registered".into());
        for offset in 0..count {
            let i = (index + offset) % count;
            let Some(code) = self.registry.code_at(i).map(str::to_string) else {
                continue;
            };
            let surface = self.new_page();
            match AppRegistry::instantiate(self, surface, &code) {
                Ok(handle) => {
                    if let Some(s) = self.surfaces.get_mut(surface) {
                        s.place(0, 0);
                    }
                    self.nav.current = Some(handle);
                    self.nav.current_index = i;
                    log::info!("Started on '{code}'");
                    return Ok(());
                },
                Err(e) => {
                    self.surfaces.destroy(surface);
                    self.report_error(&e);
                    last_err = e;
                },
            }
        }
        Err(last_err)
    }

    /// Slide to the neighbouring app, wrapping at either end.
    pub fn switch(&mut self, direction: Direction) -> Result<()> {
        self.reject_if_transitioning()?;
        self.close_active_popup();
        let count = self.registry.len() as i64;
        let next = (self.nav.current_index as i64 + i64::from(direction.sign())).rem_euclid(count);
        self.begin_switch(next as usize, direction)
    }

    /// Go to the first app.
    pub fn go_home(&mut self) -> Result<()> {
        self.reject_if_transitioning()?;
        self.close_active_popup();
        let current = self.nav.current_index;
        if current == 0 {
            return Ok(());
        }
        let direction = if current + 1 == self.registry.len() {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.begin_switch(0, direction)
    }

    /// Go to the app named `code`.
    pub fn switch_to_app(&mut self, code: &str) -> Result<()> {
        self.reject_if_transitioning()?;
        self.close_active_popup();
        let Some(target) = self.registry.index_of(code) else {
            let err = TitanError::Lookup(code.to_string());
            self.report_error(&err);
            return Err(err);
        };
        let current = self.nav.current_index;
        if target == current {
            return Ok(());
        }
        let wraps = current + 1 == self.registry.len() && target == 0;
        let direction = if target > current || wraps {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.begin_switch(target, direction)
    }

    /// Close the popup if one is open, otherwise ask the current app.
    pub fn send_back_signal(&mut self) -> BackOutcome {
        if self.close_active_popup() {
            return BackOutcome::PopupClosed;
        }
        let Some(mut handle) = self.nav.current.take() else {
            return BackOutcome::App(false);
        };
        let consumed = match handle.on_back(self) {
            Ok(consumed) => consumed,
            Err(e) => {
                self.report_error(&e);
                false
            },
        };
        self.nav.current = Some(handle);
        BackOutcome::App(consumed)
    }

    /// Toggle the "Running Apps" popup.
    ///
    /// Returns the handle when a popup was opened, `None` when one was closed.
    pub fn show_running_apps(&mut self) -> Option<PopupHandle> {
        if self.close_active_popup() {
            return None;
        }
        let running = self.registry.running();
        let entries = if running.is_empty() {
            vec![PopupEntry::label("No running apps")]
        } else {
            running.iter().map(|code| app_entry(code)).collect()
        };
        Some(self.open_popup("Running Apps", entries))
    }

    /// Toggle the "Apps" popup listing every registered app.
    pub fn show_app_list(&mut self) -> Option<PopupHandle> {
        if self.close_active_popup() {
            return None;
        }
        let entries = self.registry.list().into_iter().map(app_entry).collect();
        Some(self.open_popup("Apps", entries))
    }

    pub fn current_index(&self) -> usize {
        self.nav.current_index
    }

    pub fn current_code(&self) -> Option<&str> {
        self.registry.code_at(self.nav.current_index)
    }

    pub fn current_surface(&self) -> Option<SurfaceId> {
        self.nav.current.as_ref().map(AppInstanceHandle::surface)
    }

    pub fn phase(&self) -> Phase {
        if self.nav.pending.is_some() {
            Phase::Transitioning
        } else {
            Phase::Idle
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase() == Phase::Transitioning
    }

    /// Direction of the running transition.
    pub fn transition_direction(&self) -> Option<Direction> {
        self.nav.pending.as_ref().map(|p| p.direction)
    }

    /// Code of the page sliding in.
    pub fn incoming_code(&self) -> Option<&str> {
        self.nav.pending.as_ref().map(|p| p.incoming.code())
    }

    fn reject_if_transitioning(&self) -> Result<()> {
        if self.is_transitioning() {
            log::warn!("Switch requested during a transition, ignoring");
            return Err(TitanError::TransitionInProgress);
        }
        Ok(())
    }

    fn new_page(&mut self) -> SurfaceId {
        let w = &self.config.window;
        let page = Surface::new(w.content_width, w.content_height, self.config.ui.background);
        self.surfaces.create(page)
    }

    fn begin_switch(&mut self, next_index: usize, direction: Direction) -> Result<()> {
        let Some(outgoing) = self.current_surface() else {
            return Err(TitanError::Surface("no page loaded".into()));
        };
        let code = self
            .registry
            .code_at(next_index)
            .map(str::to_string)
            .ok_or_else(|| TitanError::Lookup(format!("#{next_index}")))?;

        self.chrome.set_enabled(false);
        let incoming_surface = self.new_page();
        let mut incoming = match AppRegistry::instantiate(self, incoming_surface, &code) {
            Ok(handle) => handle,
            Err(e) => {
                self.surfaces.destroy(incoming_surface);
                self.chrome.set_enabled(true);
                self.report_error(&e);
                return Err(e);
            },
        };

        let duration = self.config.animation.duration_ms;
        let token = match transition::begin(self, outgoing, incoming_surface, duration, direction) {
            Ok(token) => token,
            Err(e) => {
                self.retire(&mut incoming);
                self.chrome.set_enabled(true);
                self.report_error(&e);
                return Err(e);
            },
        };

        log::info!(
            "Switching {} -> {code} ({direction:?})",
            self.current_code().unwrap_or("?")
        );
        self.nav.pending = Some(PendingSwitch {
            incoming,
            next_index,
            token,
            direction,
        });
        self.schedule_poll();
        Ok(())
    }

    fn schedule_poll(&mut self) {
        let interval = self.config.animation.poll_interval_ms;
        let id = self.after(interval, |shell: &mut Shell| shell.poll_transition());
        self.nav.poll = Some(id);
    }

    fn poll_transition(&mut self) {
        self.nav.poll = None;
        let Some(pending) = &self.nav.pending else {
            return;
        };
        match self.transitions.is_finished(pending.token) {
            Some(false) => {
                log::debug!("Transition still running");
                self.schedule_poll();
            },
            Some(true) => self.complete_transition(),
            None => {
                log::warn!("Transition vanished before finishing, completing anyway");
                self.complete_transition();
            },
        }
    }

    fn complete_transition(&mut self) {
        let Some(pending) = self.nav.pending.take() else {
            return;
        };
        if let Some(mut outgoing) = self.nav.current.take() {
            self.retire(&mut outgoing);
        }
        self.transitions.take_finished(pending.token);

        if let Some(s) = self.surfaces.get_mut(pending.incoming.surface()) {
            s.place(0, 0);
        }
        self.nav.current = Some(pending.incoming);
        self.nav.current_index = pending.next_index;
        self.chrome.set_enabled(true);
        log::info!("Now showing '{}'", self.current_code().unwrap_or("?"));
    }

    /// Run a page's `destroy` hook, then drop its surface.
    fn retire(&mut self, handle: &mut AppInstanceHandle) {
        if let Err(e) = handle.destroy(self) {
            self.report_error(&e);
        }
        self.surfaces.destroy(handle.surface());
    }
}

fn app_entry(code: &str) -> PopupEntry {
    let target = code.to_string();
    PopupEntry::button(code, move |shell: &mut Shell| {
        if let Err(e) = shell.switch_to_app(&target) {
            log::debug!("Popup switch to '{target}' failed: {e}");
        }
    })
}
