//! Popups and notification banners stacked above the current page.
//!
//! At most one popup is open at a time; opening another closes the first.
//! A popup covers the content area (never the chrome) with a title bar, a
//! close button and a column of entries. Activating an entry closes the
//! popup before its action runs.
//!
//! Notifications are independent of the popup: any number may be visible,
//! each dismissing itself after its duration unless closed first.

use std::fmt;
use std::rc::Rc;

use crate::color::Color;
use crate::geometry::{Point, Rect};
use crate::shell::{Action, Shell};
use crate::timer::TimerId;

/// Height of the popup title bar.
pub const TITLE_BAR_HEIGHT: u32 = 30;
/// Offset of the first entry below the title bar.
const FIRST_ENTRY_Y: i32 = 10;
const BUTTON_HEIGHT: u32 = 30;
const BUTTON_ADVANCE: i32 = 40;
const BUTTON_MARGIN: u32 = 20;
const LABEL_WIDTH: u32 = 160;
const LABEL_HEIGHT: u32 = 20;
const LABEL_ADVANCE: i32 = 30;
const CLOSE_SIZE: u32 = 25;

const BANNER_HEIGHT: u32 = 30;
const BANNER_GAP: i32 = 5;
/// Approximate glyph width used to size banners.
const BANNER_CHAR_WIDTH: u32 = 8;

/// Identifies one opened popup. Stale handles are harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupHandle(u64);

/// One row of a popup.
#[derive(Clone)]
pub enum PopupEntry {
    Button { label: String, action: Action },
    Label(String),
}

impl fmt::Debug for PopupEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Button { label, .. } => f.debug_tuple("Button").field(label).finish(),
            Self::Label(text) => f.debug_tuple("Label").field(text).finish(),
        }
    }
}

impl PopupEntry {
    pub fn button(label: &str, action: impl Fn(&mut Shell) + 'static) -> Self {
        Self::Button {
            label: label.to_string(),
            action: Rc::new(action),
        }
    }

    pub fn label(text: &str) -> Self {
        Self::Label(text.to_string())
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Button { label, .. } => label,
            Self::Label(text) => text,
        }
    }
}

/// What a pointer position inside a popup resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupHit {
    Close,
    Entry(usize),
    /// Inside the popup but on nothing pressable.
    Background,
}

/// An open popup. All rectangles are in window coordinates.
#[derive(Debug)]
pub struct Popup {
    handle: PopupHandle,
    title: String,
    region: Rect,
    entries: Vec<(PopupEntry, Rect)>,
}

impl Popup {
    fn new(handle: PopupHandle, title: &str, region: Rect, entries: Vec<PopupEntry>) -> Self {
        let left = region.x;
        let top = region.y + TITLE_BAR_HEIGHT as i32;
        let mut y = FIRST_ENTRY_Y;
        let entries = entries
            .into_iter()
            .map(|entry| {
                let rect = match entry {
                    PopupEntry::Button { .. } => {
                        let w = region.w.saturating_sub(2 * BUTTON_MARGIN);
                        let r = Rect::new(left + BUTTON_MARGIN as i32, top + y, w, BUTTON_HEIGHT);
                        y += BUTTON_ADVANCE;
                        r
                    },
                    PopupEntry::Label(_) => {
                        let x = left + (region.w.saturating_sub(LABEL_WIDTH) / 2) as i32;
                        let r = Rect::new(x, top + y, LABEL_WIDTH, LABEL_HEIGHT);
                        y += LABEL_ADVANCE;
                        r
                    },
                };
                (entry, rect)
            })
            .collect();
        Self {
            handle,
            title: title.to_string(),
            region,
            entries,
        }
    }

    pub fn handle(&self) -> PopupHandle {
        self.handle
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn title_bar(&self) -> Rect {
        Rect::new(self.region.x, self.region.y, self.region.w, TITLE_BAR_HEIGHT)
    }

    pub fn close_rect(&self) -> Rect {
        Rect::new(
            self.region.right() - 30,
            self.region.y + 5,
            CLOSE_SIZE,
            CLOSE_SIZE,
        )
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PopupEntry, Rect)> {
        self.entries.iter().map(|(e, r)| (e, *r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `p`. `None` means outside the popup.
    pub fn hit_test(&self, p: Point) -> Option<PopupHit> {
        if !self.region.contains(p) {
            return None;
        }
        if self.close_rect().contains(p) {
            return Some(PopupHit::Close);
        }
        let hit = self
            .entries
            .iter()
            .position(|(e, r)| matches!(e, PopupEntry::Button { .. }) && r.contains(p));
        Some(hit.map_or(PopupHit::Background, PopupHit::Entry))
    }
}

/// Severity of a notification banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    /// Case-insensitive; anything unrecognised is `Info`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" => Self::Warning,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    /// `(foreground, background)`.
    pub fn colors(self) -> (Color, Color) {
        match self {
            Self::Info => (Color::WHITE, Color::rgb(30, 100, 200)),
            Self::Success => (Color::BLACK, Color::LIME_GREEN),
            Self::Warning => (Color::BLACK, Color::rgb(255, 165, 0)),
            Self::Error => (Color::WHITE, Color::RED),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

/// A visible banner.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub text: String,
    pub kind: NotificationKind,
    pub duration_ms: u64,
    timer: Option<TimerId>,
}

/// Popup and notification state.
#[derive(Debug)]
pub struct Overlay {
    region: Rect,
    popup: Option<Popup>,
    notifications: Vec<Notification>,
    next_id: u64,
}

impl Overlay {
    /// `region` is the content area in window coordinates.
    pub fn new(region: Rect) -> Self {
        Self {
            region,
            popup: None,
            notifications: Vec::new(),
            next_id: 0,
        }
    }

    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn is_popup_open(&self) -> bool {
        self.popup.is_some()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn is_visible(&self, id: NotificationId) -> bool {
        self.notifications.iter().any(|n| n.id == id)
    }

    /// Banner rectangles, oldest centred in the content area and newer ones
    /// stacked above it.
    pub fn banners(&self) -> impl Iterator<Item = (&Notification, Rect)> {
        let region = self.region;
        let cx = region.x + (region.w / 2) as i32;
        let cy = region.y + (region.h / 2) as i32;
        self.notifications.iter().enumerate().map(move |(i, n)| {
            let text_w = n.text.chars().count() as u32 * BANNER_CHAR_WIDTH + 20;
            let w = text_w.min(region.w.saturating_sub(20));
            let dy = i as i32 * (BANNER_HEIGHT as i32 + BANNER_GAP);
            (n, Rect::centered(cx, cy - dy, w, BANNER_HEIGHT))
        })
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Shell {
    /// Open a popup over the content area, closing any open one first.
    pub fn open_popup(&mut self, title: &str, entries: Vec<PopupEntry>) -> PopupHandle {
        self.close_active_popup();
        let handle = PopupHandle(self.overlay.next_id());
        log::debug!("Opening popup '{title}' with {} entries", entries.len());
        self.overlay.popup = Some(Popup::new(handle, title, self.overlay.region, entries));
        handle
    }

    /// Close the popup if `handle` is the open one. Returns whether anything
    /// closed; stale handles are a no-op.
    pub fn close_popup(&mut self, handle: PopupHandle) -> bool {
        if self.overlay.popup.as_ref().map(Popup::handle) == Some(handle) {
            self.close_active_popup()
        } else {
            false
        }
    }

    /// Close whatever popup is open.
    pub fn close_active_popup(&mut self) -> bool {
        match self.overlay.popup.take() {
            Some(popup) => {
                log::debug!("Closed popup '{}'", popup.title);
                true
            },
            None => false,
        }
    }

    /// Close the popup, then run entry `index`'s action. Labels and out of
    /// range indices do nothing.
    pub fn activate_popup_entry(&mut self, index: usize) -> bool {
        let action = match self.overlay.popup.as_ref().and_then(|p| p.entries.get(index)) {
            Some((PopupEntry::Button { action, .. }, _)) => Rc::clone(action),
            _ => return false,
        };
        self.close_active_popup();
        self.run_action("popup", &action);
        true
    }

    /// Show a banner that dismisses itself after `duration_ms`.
    pub fn notify(&mut self, text: &str, kind: NotificationKind, duration_ms: u64) -> NotificationId {
        let id = NotificationId(self.overlay.next_id());
        let timer = self.after(duration_ms, move |shell: &mut Shell| {
            shell.expire_notification(id);
        });
        log::debug!("Notification {kind:?}: {text}");
        self.overlay.notifications.push(Notification {
            id,
            text: text.to_string(),
            kind,
            duration_ms,
            timer: Some(timer),
        });
        id
    }

    /// Dismiss a banner early, cancelling its auto-dismiss. Idempotent.
    pub fn close_notification(&mut self, id: NotificationId) -> bool {
        let Some(pos) = self.overlay.notifications.iter().position(|n| n.id == id) else {
            return false;
        };
        let n = self.overlay.notifications.remove(pos);
        if let Some(timer) = n.timer {
            self.timers.cancel(timer);
        }
        true
    }

    fn expire_notification(&mut self, id: NotificationId) {
        if let Some(n) = self.overlay.notifications.iter_mut().find(|n| n.id == id) {
            n.timer = None;
        }
        self.close_notification(id);
    }

    pub fn info(&mut self, text: &str) -> NotificationId {
        let ms = self.config.animation.notification_ms;
        self.notify(text, NotificationKind::Info, ms)
    }

    pub fn success(&mut self, text: &str) -> NotificationId {
        let ms = self.config.animation.notification_ms;
        self.notify(text, NotificationKind::Success, ms)
    }

    pub fn warning(&mut self, text: &str) -> NotificationId {
        let ms = self.config.animation.notification_ms;
        self.notify(text, NotificationKind::Warning, ms)
    }

    pub fn error(&mut self, text: &str) -> NotificationId {
        let ms = self.config.animation.notification_ms;
        self.notify(text, NotificationKind::Error, ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::test_utils::mock_shell;

    fn region() -> Rect {
        Rect::new(25, 0, 300, 250)
    }

    #[test]
    fn kind_parse_is_case_insensitive() {
        assert_eq!(NotificationKind::parse("SUCCESS"), NotificationKind::Success);
        assert_eq!(NotificationKind::parse("Warning"), NotificationKind::Warning);
        assert_eq!(NotificationKind::parse("error"), NotificationKind::Error);
        assert_eq!(NotificationKind::parse("info"), NotificationKind::Info);
        assert_eq!(NotificationKind::parse("bogus"), NotificationKind::Info);
        assert_eq!(NotificationKind::parse(""), NotificationKind::Info);
    }

    #[test]
    fn kinds_have_distinct_colors() {
        let kinds = [
            NotificationKind::Info,
            NotificationKind::Success,
            NotificationKind::Warning,
            NotificationKind::Error,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.colors(), b.colors());
            }
        }
    }

    #[test]
    fn entry_layout_follows_column() {
        let p = Popup::new(
            PopupHandle(0),
            "Apps",
            region(),
            vec![
                PopupEntry::button("clock", |_| {}),
                PopupEntry::label("none"),
                PopupEntry::button("stopwatch", |_| {}),
            ],
        );
        let rects: Vec<Rect> = p.entries().map(|(_, r)| r).collect();
        assert_eq!(rects[0], Rect::new(45, 40, 260, 30));
        assert_eq!(rects[1], Rect::new(95, 80, 160, 20));
        assert_eq!(rects[2], Rect::new(45, 110, 260, 30));
        assert_eq!(p.close_rect(), Rect::new(295, 5, 25, 25));
    }

    #[test]
    fn hit_test_resolves_close_entries_and_background() {
        let p = Popup::new(
            PopupHandle(0),
            "Apps",
            region(),
            vec![PopupEntry::button("clock", |_| {}), PopupEntry::label("x")],
        );
        assert_eq!(p.hit_test(Point::new(300, 10)), Some(PopupHit::Close));
        assert_eq!(p.hit_test(Point::new(100, 50)), Some(PopupHit::Entry(0)));
        assert_eq!(p.hit_test(Point::new(100, 85)), Some(PopupHit::Background));
        assert_eq!(p.hit_test(Point::new(5, 50)), None);
    }

    #[test]
    fn opening_replaces_existing_popup() {
        let (mut shell, _) = mock_shell(&["a"]);
        let first = shell.open_popup("One", vec![]);
        let second = shell.open_popup("Two", vec![]);
        assert_ne!(first, second);
        assert_eq!(shell.overlay.popup().unwrap().title(), "Two");
        assert!(!shell.close_popup(first));
        assert!(shell.overlay.is_popup_open());
    }

    #[test]
    fn close_popup_is_idempotent() {
        let (mut shell, _) = mock_shell(&["a"]);
        let h = shell.open_popup("One", vec![PopupEntry::label("x")]);
        assert!(shell.close_popup(h));
        assert!(!shell.close_popup(h));
        assert!(!shell.close_active_popup());
    }

    #[test]
    fn activating_entry_closes_before_action() {
        let (mut shell, _) = mock_shell(&["a"]);
        let saw_open = Rc::new(Cell::new(None));
        let probe = Rc::clone(&saw_open);
        shell.open_popup(
            "Apps",
            vec![PopupEntry::button("go", move |s: &mut Shell| {
                probe.set(Some(s.overlay.is_popup_open()));
            })],
        );
        assert!(shell.activate_popup_entry(0));
        assert_eq!(saw_open.get(), Some(false));
        assert!(!shell.overlay.is_popup_open());
    }

    #[test]
    fn activating_label_does_nothing() {
        let (mut shell, _) = mock_shell(&["a"]);
        shell.open_popup("Apps", vec![PopupEntry::label("none")]);
        assert!(!shell.activate_popup_entry(0));
        assert!(!shell.activate_popup_entry(5));
        assert!(shell.overlay.is_popup_open());
    }

    #[test]
    fn notification_auto_dismisses_once() {
        let (mut shell, _) = mock_shell(&["a"]);
        let id = shell.info("hello");
        assert!(shell.overlay.is_visible(id));
        shell.run_until(499);
        assert!(shell.overlay.is_visible(id));
        shell.run_until(500);
        assert!(!shell.overlay.is_visible(id));
        assert!(!shell.close_notification(id));
    }

    #[test]
    fn close_cancels_pending_dismiss() {
        let (mut shell, _) = mock_shell(&["a"]);
        let id = shell.notify("saved", NotificationKind::Success, 1_000);
        assert_eq!(shell.timers.len(), 1);
        assert!(shell.close_notification(id));
        assert!(shell.timers.is_empty());
        assert!(!shell.close_notification(id));
    }

    #[test]
    fn notifications_stack_upwards() {
        let (mut shell, _) = mock_shell(&["a"]);
        shell.warning("one");
        shell.error("two");
        let rects: Vec<Rect> = shell.overlay.banners().map(|(_, r)| r).collect();
        assert_eq!(rects.len(), 2);
        assert!(rects[1].y < rects[0].y);
        assert_eq!(rects[0].y + rects[0].h as i32 / 2, 125);
    }
}
