//! Page surfaces: fixed-size rectangles that apps render into.
//!
//! A [`Surface`] knows its size, where (if anywhere) it is placed relative to
//! the content-area origin, its background, and the named widgets an app
//! added to it. Surfaces live in a generational [`SurfaceArena`]; an id whose
//! surface was destroyed resolves to `None`, which is how late callbacks
//! notice that their page is gone.

use std::fmt;
use std::rc::Rc;

use crate::color::Color;
use crate::geometry::{Point, Rect};
use crate::shell::{Action, Shell};

/// Generational handle to a surface in a [`SurfaceArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId {
    index: u32,
    generation: u32,
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}.{}", self.index, self.generation)
    }
}

/// What a widget does when pressed.
#[derive(Clone)]
pub enum WidgetKind {
    /// Static or app-updated text.
    Label,
    /// Pressable; runs `action` with the shell when clicked while enabled.
    Button { action: Action, enabled: bool },
}

impl fmt::Debug for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label => write!(f, "Label"),
            Self::Button { enabled, .. } => f
                .debug_struct("Button")
                .field("enabled", enabled)
                .finish_non_exhaustive(),
        }
    }
}

/// A named element inside a surface. `rect` is relative to the surface.
#[derive(Debug, Clone)]
pub struct Widget {
    pub name: String,
    pub rect: Rect,
    pub text: String,
    pub fg: Color,
    pub bg: Option<Color>,
    pub font_size: u16,
    pub kind: WidgetKind,
}

impl Widget {
    /// A text label with the default palette.
    pub fn label(name: &str, rect: Rect, text: &str) -> Self {
        Self {
            name: name.to_string(),
            rect,
            text: text.to_string(),
            fg: Color::LIME_GREEN,
            bg: None,
            font_size: 12,
            kind: WidgetKind::Label,
        }
    }

    /// A button that runs `action` when pressed.
    pub fn button(name: &str, rect: Rect, text: &str, action: impl Fn(&mut Shell) + 'static) -> Self {
        Self {
            name: name.to_string(),
            rect,
            text: text.to_string(),
            fg: Color::BLACK,
            bg: Some(Color::LIME_GREEN),
            font_size: 12,
            kind: WidgetKind::Button {
                action: Rc::new(action),
                enabled: true,
            },
        }
    }

    pub fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    pub fn with_font_size(mut self, size: u16) -> Self {
        self.font_size = size;
        self
    }

    pub fn is_button(&self) -> bool {
        matches!(self.kind, WidgetKind::Button { .. })
    }

    /// The bound action, if this is an enabled button.
    pub fn action(&self) -> Option<Action> {
        match &self.kind {
            WidgetKind::Button {
                action,
                enabled: true,
            } => Some(Rc::clone(action)),
            _ => None,
        }
    }
}

/// One page of content.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    position: Option<Point>,
    background: Color,
    widgets: Vec<Widget>,
}

impl Surface {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            position: None,
            background,
            widgets: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Lay the surface out at `(x, y)` relative to the content origin.
    pub fn place(&mut self, x: i32, y: i32) {
        self.position = Some(Point::new(x, y));
    }

    /// Remove the surface from the layout without destroying it.
    pub fn forget(&mut self) {
        self.position = None;
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    /// Placed bounds relative to the content origin.
    pub fn bounds(&self) -> Option<Rect> {
        self.position
            .map(|p| Rect::new(p.x, p.y, self.width, self.height))
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn configure_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Add a widget, replacing any existing widget with the same name.
    pub fn add(&mut self, widget: Widget) {
        match self.widgets.iter_mut().find(|w| w.name == widget.name) {
            Some(existing) => *existing = widget,
            None => self.widgets.push(widget),
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.widgets.len();
        self.widgets.retain(|w| w.name != name);
        self.widgets.len() != before
    }

    pub fn clear(&mut self) {
        self.widgets.clear();
    }

    pub fn widget(&self, name: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.name == name)
    }

    pub fn widget_mut(&mut self, name: &str) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.name == name)
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Update a widget's text. Returns `false` if no widget has that name.
    pub fn set_text(&mut self, name: &str, text: &str) -> bool {
        match self.widget_mut(name) {
            Some(w) => {
                if w.text != text {
                    w.text = text.to_string();
                }
                true
            },
            None => false,
        }
    }

    /// Enable or disable a button. Returns `false` if `name` is not a button.
    pub fn set_enabled(&mut self, name: &str, on: bool) -> bool {
        match self.widget_mut(name).map(|w| &mut w.kind) {
            Some(WidgetKind::Button { enabled, .. }) => {
                *enabled = on;
                true
            },
            _ => false,
        }
    }

    /// Topmost button under `local` (surface coordinates).
    pub fn button_at(&self, local: Point) -> Option<&Widget> {
        self.widgets
            .iter()
            .rev()
            .find(|w| w.is_button() && w.rect.contains(local))
    }
}

struct Slot {
    generation: u32,
    surface: Option<Surface>,
}

/// Owner of every live surface.
#[derive(Default)]
pub struct SurfaceArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl fmt::Debug for SurfaceArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceArena")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl SurfaceArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new surface and return its id. Freed slots are reused with a
    /// bumped generation so stale ids never alias the new surface.
    pub fn create(&mut self, surface: Surface) -> SurfaceId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.surface = Some(surface);
            return SurfaceId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            surface: Some(surface),
        });
        SurfaceId {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.surface.as_ref())
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.surface.as_mut())
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.get(id).is_some()
    }

    /// Destroy a surface. Returns `false` for unknown or already destroyed ids.
    pub fn destroy(&mut self, id: SurfaceId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return false;
        };
        if slot.generation != id.generation || slot.surface.is_none() {
            return false;
        }
        slot.surface = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        true
    }

    /// Number of live surfaces.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live surfaces that are currently placed.
    pub fn placed(&self) -> impl Iterator<Item = (SurfaceId, &Surface)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.surface
                .as_ref()
                .filter(|s| s.is_placed())
                .map(|s| {
                    (
                        SurfaceId {
                            index: i as u32,
                            generation: slot.generation,
                        },
                        s,
                    )
                })
        })
    }
}
