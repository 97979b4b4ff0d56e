//! Stopwatch with start/stop and reset.
//!
//! Elapsed time is measured against the shell clock rather than counted in
//! ticks, so a late refresh never loses time. The stopwatch lives in the
//! module, which keeps it running while the user is on another page; the
//! running-apps list reports it through [`AppModule::is_running`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use titan_core::error::Result;
use titan_core::geometry::Rect;
use titan_core::timer::TimerId;
use titan_core::{App, AppModule, Shell, SurfaceId, Widget};

use crate::page;

const REFRESH_MS: u64 = 50;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stopwatch {
    running_since: Option<u64>,
    accumulated_ms: u64,
}

impl Stopwatch {
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let live = self
            .running_since
            .map_or(0, |since| now_ms.saturating_sub(since));
        self.accumulated_ms + live
    }

    /// Start if stopped, stop if running. Returns the new running state.
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        match self.running_since.take() {
            Some(since) => {
                self.accumulated_ms += now_ms.saturating_sub(since);
                false
            },
            None => {
                self.running_since = Some(now_ms);
                true
            },
        }
    }

    /// Zero the reading. A running stopwatch keeps running from `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.accumulated_ms = 0;
        if self.running_since.is_some() {
            self.running_since = Some(now_ms);
        }
    }
}

/// `("MM:SS", ".hh")` for an elapsed time.
pub fn format_elapsed(elapsed_ms: u64) -> (String, String) {
    let hundredths = (elapsed_ms / 10) % 100;
    let seconds = (elapsed_ms / 1_000) % 60;
    let minutes = elapsed_ms / 60_000;
    (
        format!("{minutes:02}:{seconds:02}"),
        format!(".{hundredths:02}"),
    )
}

pub struct StopwatchModule {
    watch: Rc<RefCell<Stopwatch>>,
}

impl StopwatchModule {
    pub fn new() -> Self {
        Self {
            watch: Rc::new(RefCell::new(Stopwatch::default())),
        }
    }
}

impl Default for StopwatchModule {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModule for StopwatchModule {
    fn instantiate(&self) -> Box<dyn App> {
        Box::new(StopwatchApp {
            page: Rc::new(StopwatchPage {
                watch: Rc::clone(&self.watch),
                stopped: Cell::new(false),
                timer: Cell::new(None),
            }),
        })
    }

    fn is_running(&self) -> bool {
        self.watch.borrow().is_running()
    }
}

struct StopwatchPage {
    watch: Rc<RefCell<Stopwatch>>,
    stopped: Cell<bool>,
    timer: Cell<Option<TimerId>>,
}

struct StopwatchApp {
    page: Rc<StopwatchPage>,
}

impl App for StopwatchApp {
    fn create(&mut self, surface: SurfaceId, shell: &mut Shell) -> Result<()> {
        let ui = shell.config.ui.clone();
        let running = self.page.watch.borrow().is_running();
        let toggle_page = Rc::clone(&self.page);
        let reset_page = Rc::clone(&self.page);
        let s = page(shell, surface)?;
        s.configure_background(ui.background);

        s.add(
            Widget::label("time", Rect::new(10, 67, 225, 100), "00:00")
                .with_fg(ui.primary)
                .with_font_size(60),
        );
        s.add(
            Widget::label("hundredths", Rect::new(234, 106, 45, 50), ".00")
                .with_fg(ui.primary)
                .with_font_size(20),
        );
        s.add(
            Widget::button(
                "start",
                Rect::new(180, 200, 90, 50),
                if running { "Stop" } else { "Start" },
                move |shell: &mut Shell| toggle(shell, surface, &toggle_page),
            )
            .with_fg(ui.primary)
            .with_bg(ui.background)
            .with_font_size(20),
        );
        s.add(
            Widget::button(
                "reset",
                Rect::new(30, 200, 90, 50),
                "Reset",
                move |shell: &mut Shell| {
                    reset_page.watch.borrow_mut().reset(shell.now_ms());
                    render(shell, surface, &reset_page);
                },
            )
            .with_fg(ui.primary)
            .with_bg(ui.background)
            .with_font_size(20),
        );

        render(shell, surface, &self.page);
        if running {
            schedule_refresh(shell, surface, &self.page);
        }
        Ok(())
    }

    fn destroy(&mut self, _surface: SurfaceId, shell: &mut Shell) -> Result<()> {
        self.page.stopped.set(true);
        if let Some(id) = self.page.timer.take() {
            shell.cancel(id);
        }
        Ok(())
    }
}

fn toggle(shell: &mut Shell, surface: SurfaceId, page: &Rc<StopwatchPage>) {
    let running = page.watch.borrow_mut().toggle(shell.now_ms());
    log::debug!("Stopwatch {}", if running { "started" } else { "stopped" });
    if let Some(s) = shell.surfaces.get_mut(surface) {
        s.set_text("start", if running { "Stop" } else { "Start" });
    }
    render(shell, surface, page);
    if running && page.timer.get().is_none() {
        schedule_refresh(shell, surface, page);
    }
}

fn schedule_refresh(shell: &mut Shell, surface: SurfaceId, page: &Rc<StopwatchPage>) {
    let page_ref = Rc::clone(page);
    let id = shell.after(REFRESH_MS, move |shell: &mut Shell| {
        page_ref.timer.set(None);
        if page_ref.stopped.get() || !shell.surfaces.contains(surface) {
            return;
        }
        render(shell, surface, &page_ref);
        if page_ref.watch.borrow().is_running() {
            schedule_refresh(shell, surface, &page_ref);
        }
    });
    page.timer.set(Some(id));
}

fn render(shell: &mut Shell, surface: SurfaceId, page: &StopwatchPage) {
    let elapsed = page.watch.borrow().elapsed_ms(shell.now_ms());
    let (time, hundredths) = format_elapsed(elapsed);
    if let Some(s) = shell.surfaces.get_mut(surface) {
        s.set_text("time", &time);
        s.set_text("hundredths", &hundredths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{advance, press, shell_on, text};
    use titan_core::Direction;

    #[test]
    fn formats_minutes_seconds_hundredths() {
        assert_eq!(format_elapsed(0), ("00:00".into(), ".00".into()));
        assert_eq!(format_elapsed(61_230), ("01:01".into(), ".23".into()));
        assert_eq!(format_elapsed(3_599_990), ("59:59".into(), ".99".into()));
        assert_eq!(format_elapsed(6_000_000), ("100:00".into(), ".00".into()));
    }

    #[test]
    fn toggle_accumulates_across_runs() {
        let mut w = Stopwatch::default();
        assert!(w.toggle(100));
        assert!(!w.toggle(600));
        assert_eq!(w.elapsed_ms(10_000), 500);
        assert!(w.toggle(1_000));
        assert_eq!(w.elapsed_ms(1_250), 750);
    }

    #[test]
    fn reset_while_running_restarts() {
        let mut w = Stopwatch::default();
        w.toggle(0);
        w.reset(400);
        assert!(w.is_running());
        assert_eq!(w.elapsed_ms(500), 100);

        w.toggle(500);
        w.reset(900);
        assert!(!w.is_running());
        assert_eq!(w.elapsed_ms(2_000), 0);
    }

    #[test]
    fn start_stop_updates_display() {
        let mut shell = shell_on("stopwatch");
        assert_eq!(text(&shell, "start"), "Start");
        press(&mut shell, "start");
        assert_eq!(text(&shell, "start"), "Stop");
        advance(&mut shell, 1_500);
        assert_eq!(text(&shell, "time"), "00:01");
        press(&mut shell, "start");
        assert_eq!(text(&shell, "start"), "Start");
        let frozen = text(&shell, "hundredths");
        advance(&mut shell, 1_000);
        assert_eq!(text(&shell, "hundredths"), frozen);
    }

    #[test]
    fn reset_clears_display() {
        let mut shell = shell_on("stopwatch");
        press(&mut shell, "start");
        advance(&mut shell, 2_000);
        press(&mut shell, "start");
        press(&mut shell, "reset");
        assert_eq!(text(&shell, "time"), "00:00");
        assert_eq!(text(&shell, "hundredths"), ".00");
    }

    #[test]
    fn keeps_running_off_page_and_is_listed() {
        let mut shell = shell_on("stopwatch");
        press(&mut shell, "start");
        shell.switch(Direction::Forward).unwrap();
        advance(&mut shell, 2_000);
        assert_ne!(shell.current_code(), Some("stopwatch"));
        assert_eq!(shell.registry.running(), vec!["stopwatch".to_string()]);

        shell.switch_to_app("stopwatch").unwrap();
        advance(&mut shell, 1_200);
        assert_eq!(text(&shell, "start"), "Stop");
        assert_eq!(text(&shell, "time"), "00:03");
    }

    #[test]
    fn idle_page_schedules_nothing() {
        let shell = shell_on("stopwatch");
        assert!(shell.timers.is_empty());
    }
}
