//! The persistent navigation buttons around the content area.
//!
//! Two full-height switch buttons flank the content; a bottom bar below it holds
//! back, home and the running-apps toggle. While a page transition runs the
//! chrome is disabled and ignores input.

use crate::config::WindowConfig;
use crate::geometry::{Point, Rect};

/// Size of the bottom-bar buttons.
const BOTTOM_BUTTON_SIZE: u32 = 40;

/// Horizontal centres of back, home and apps, as fractions of the bar width.
const BOTTOM_BUTTON_CENTRES: [f32; 3] = [0.2, 0.5, 0.8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromeButton {
    SwitchLeft,
    SwitchRight,
    Back,
    Home,
    Apps,
}

impl ChromeButton {
    pub const ALL: [ChromeButton; 5] = [
        Self::SwitchLeft,
        Self::SwitchRight,
        Self::Back,
        Self::Home,
        Self::Apps,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            Self::SwitchLeft => "<",
            Self::SwitchRight => ">",
            Self::Back => "\u{2190}",
            Self::Home => "\u{2302}",
            Self::Apps => "\u{2630}",
        }
    }
}

/// Chrome layout and enabled state.
#[derive(Debug, Clone)]
pub struct Chrome {
    enabled: bool,
    bottom_bar: Rect,
    buttons: [(ChromeButton, Rect); 5],
}

impl Chrome {
    pub fn new(window: &WindowConfig) -> Self {
        let content = window.content_rect();
        // The switch buttons run the full window height, beside the bar too.
        let left = Rect::new(0, 0, window.button_width, window.height);
        let right = Rect::new(
            window.width as i32 - window.button_width as i32,
            0,
            window.button_width,
            window.height,
        );

        let bar = Rect::new(content.x, content.bottom(), content.w, window.bottom_nav_height);
        let cy = bar.y + (bar.h / 2) as i32;
        let at = |frac: f32| {
            let cx = bar.x + (bar.w as f32 * frac) as i32;
            Rect::centered(cx, cy, BOTTOM_BUTTON_SIZE, BOTTOM_BUTTON_SIZE)
        };
        let [back, home, apps] = BOTTOM_BUTTON_CENTRES.map(at);

        Self {
            enabled: true,
            bottom_bar: bar,
            buttons: [
                (ChromeButton::SwitchLeft, left),
                (ChromeButton::SwitchRight, right),
                (ChromeButton::Back, back),
                (ChromeButton::Home, home),
                (ChromeButton::Apps, apps),
            ],
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::debug!("Chrome {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    pub fn bottom_bar(&self) -> Rect {
        self.bottom_bar
    }

    pub fn buttons(&self) -> impl Iterator<Item = (ChromeButton, Rect)> + '_ {
        self.buttons.iter().copied()
    }

    pub fn rect(&self, button: ChromeButton) -> Rect {
        self.buttons
            .iter()
            .find(|(b, _)| *b == button)
            .map(|(_, r)| *r)
            .unwrap_or_default()
    }

    /// The button under `p`, or `None` when nothing is hit or the chrome is
    /// disabled.
    pub fn hit_test(&self, p: Point) -> Option<ChromeButton> {
        if !self.enabled {
            return None;
        }
        self.buttons
            .iter()
            .find(|(_, r)| r.contains(p))
            .map(|(b, _)| *b)
    }
}
