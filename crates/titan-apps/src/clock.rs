//! Wall clock: large HH:MM, seconds, date, and a 12h/24h toggle.
//!
//! The page refreshes itself every 250ms through a self-rescheduling
//! callback. `destroy` sets the page's stopped flag and cancels the pending
//! refresh, so nothing touches the surface after the page is retired. The
//! hour format lives in the module and survives page changes.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Local, NaiveDateTime};
use titan_core::error::Result;
use titan_core::geometry::Rect;
use titan_core::surface::Surface;
use titan_core::timer::TimerId;
use titan_core::{App, AppModule, Shell, SurfaceId, Widget};

use crate::page;

const FIRST_REFRESH_MS: u64 = 50;
const REFRESH_MS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourFormat {
    H12,
    H24,
}

impl HourFormat {
    pub fn toggled(self) -> Self {
        match self {
            Self::H12 => Self::H24,
            Self::H24 => Self::H12,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::H12 => "12h",
            Self::H24 => "24h",
        }
    }
}

/// Text of the clock labels for one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    pub time: String,
    pub seconds: String,
    pub date: String,
    pub am_pm: String,
}

impl ClockFace {
    pub fn at(now: NaiveDateTime, format: HourFormat) -> Self {
        let (time, am_pm) = match format {
            HourFormat::H12 => (now.format("%I:%M"), now.format("%p").to_string()),
            HourFormat::H24 => (now.format("%H:%M"), String::new()),
        };
        Self {
            time: time.to_string(),
            seconds: now.format("%S").to_string(),
            date: now.format("%A, %B %d, %Y").to_string(),
            am_pm,
        }
    }
}

pub struct ClockModule {
    format: Rc<Cell<HourFormat>>,
}

impl ClockModule {
    pub fn new() -> Self {
        Self {
            format: Rc::new(Cell::new(HourFormat::H12)),
        }
    }
}

impl Default for ClockModule {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModule for ClockModule {
    fn instantiate(&self) -> Box<dyn App> {
        Box::new(ClockApp {
            page: Rc::new(ClockPage {
                format: Rc::clone(&self.format),
                stopped: Cell::new(false),
                timer: Cell::new(None),
            }),
        })
    }
}

/// State shared between the app and its refresh chain.
struct ClockPage {
    format: Rc<Cell<HourFormat>>,
    stopped: Cell<bool>,
    timer: Cell<Option<TimerId>>,
}

struct ClockApp {
    page: Rc<ClockPage>,
}

impl App for ClockApp {
    fn create(&mut self, surface: SurfaceId, shell: &mut Shell) -> Result<()> {
        let ui = shell.config.ui.clone();
        let format = self.page.format.get();
        let state = Rc::clone(&self.page);
        let s = page(shell, surface)?;
        s.configure_background(ui.background);

        s.add(
            Widget::label("time", Rect::new(10, 67, 225, 100), "00:00")
                .with_fg(ui.primary)
                .with_font_size(60),
        );
        s.add(
            Widget::label("seconds", Rect::new(234, 106, 45, 50), "00")
                .with_fg(ui.primary)
                .with_font_size(20),
        );
        s.add(
            Widget::label("date", Rect::new(15, 140, 270, 25), "")
                .with_fg(ui.primary)
                .with_font_size(12),
        );
        s.add(
            Widget::label("am_pm", Rect::new(240, 200, 45, 50), "")
                .with_fg(ui.primary)
                .with_font_size(20),
        );
        s.add(
            Widget::button(
                "format",
                Rect::new(0, 205, 63, 45),
                format.label(),
                move |shell: &mut Shell| toggle_format(shell, surface, &state),
            )
            .with_fg(ui.secondary)
            .with_bg(ui.background)
            .with_font_size(20),
        );

        schedule_refresh(shell, surface, &self.page, FIRST_REFRESH_MS);
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

fn toggle_format(shell: &mut Shell, surface: SurfaceId, page: &ClockPage) {
    let format = page.format.get().toggled();
    page.format.set(format);
    if let Some(s) = shell.surfaces.get_mut(surface) {
        s.set_text("format", format.label());
    }
}

fn schedule_refresh(shell: &mut Shell, surface: SurfaceId, page: &Rc<ClockPage>, delay: u64) {
    let page_ref = Rc::clone(page);
    let id = shell.after(delay, move |shell: &mut Shell| {
        refresh(shell, surface, &page_ref);
    });
    page.timer.set(Some(id));
}

fn refresh(shell: &mut Shell, surface: SurfaceId, page: &Rc<ClockPage>) {
    page.timer.set(None);
    if page.stopped.get() {
        return;
    }
    let Some(s) = shell.surfaces.get_mut(surface) else {
        log::debug!("Clock surface gone, stopping refresh");
        return;
    };
    render(s, &ClockFace::at(Local::now().naive_local(), page.format.get()));
    schedule_refresh(shell, surface, page, REFRESH_MS);
}

fn render(s: &mut Surface, face: &ClockFace) {
    s.set_text("time", &face.time);
    s.set_text("seconds", &face.seconds);
    s.set_text("date", &face.date);
    s.set_text("am_pm", &face.am_pm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{advance, press, shell_on, text};
    use chrono::NaiveDate;
    use titan_core::Direction;

    fn instant(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn twelve_hour_face() {
        let face = ClockFace::at(instant(15, 7, 9), HourFormat::H12);
        assert_eq!(face.time, "03:07");
        assert_eq!(face.seconds, "09");
        assert_eq!(face.am_pm, "PM");
        assert_eq!(face.date, "Tuesday, March 05, 2024");
    }

    #[test]
    fn twenty_four_hour_face_has_no_suffix() {
        let face = ClockFace::at(instant(15, 7, 9), HourFormat::H24);
        assert_eq!(face.time, "15:07");
        assert_eq!(face.am_pm, "");
    }

    #[test]
    fn refresh_fills_labels() {
        let mut shell = shell_on("clock");
        assert_eq!(text(&shell, "time"), "00:00");
        advance(&mut shell, 50);
        assert_ne!(text(&shell, "date"), "");
        assert_eq!(text(&shell, "seconds").len(), 2);
    }

    #[test]
    fn format_toggle_persists_across_pages() {
        let mut shell = shell_on("clock");
        assert_eq!(text(&shell, "format"), "12h");
        press(&mut shell, "format");
        assert_eq!(text(&shell, "format"), "24h");

        shell.switch(Direction::Forward).unwrap();
        advance(&mut shell, 2_000);
        shell.switch_to_app("clock").unwrap();
        advance(&mut shell, 2_000);
        assert_eq!(shell.current_code(), Some("clock"));
        assert_eq!(text(&shell, "format"), "24h");
    }

    #[test]
    fn destroy_stops_refresh_chain() {
        let mut shell = shell_on("clock");
        advance(&mut shell, 300);
        shell.switch(Direction::Forward).unwrap();
        advance(&mut shell, 2_000);
        assert_eq!(shell.current_code(), Some("stopwatch"));
        assert!(shell.timers.is_empty());
    }

    #[test]
    fn stopped_page_ignores_late_refresh() {
        let mut shell = shell_on("clock");
        let surface = shell.current_surface().unwrap();
        let module = ClockModule::new();
        let mut app = ClockApp {
            page: Rc::new(ClockPage {
                format: Rc::clone(&module.format),
                stopped: Cell::new(false),
                timer: Cell::new(None),
            }),
        };
        app.destroy(surface, &mut shell).unwrap();
        assert!(app.page.stopped.get());
        refresh(&mut shell, surface, &app.page);
        assert!(app.page.timer.get().is_none());
    }
}
