//! Flattening shell state into an ordered draw list.
//!
//! Backends never inspect the shell; they paint [`DrawCommand`]s in order.
//! Rectangles are in window pixels. Page content is bracketed by a clip to
//! the content area so sliding pages never paint over the chrome.

use crate::color::Color;
use crate::geometry::Rect;
use crate::overlay::PopupEntry;
use crate::shell::Shell;
use crate::surface::Surface;

/// One primitive for a backend to paint.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Color },
    /// Text centred in `rect`.
    Text {
        rect: Rect,
        text: String,
        font_size: u16,
        color: Color,
    },
    /// Restrict drawing to `rect` until the matching `PopClip`.
    PushClip(Rect),
    PopClip,
}

/// Build the frame for the current shell state.
pub fn build(shell: &Shell) -> Vec<DrawCommand> {
    let window = &shell.config.window;
    let ui = &shell.config.ui;
    let content = window.content_rect();
    let mut out = vec![DrawCommand::FillRect {
        rect: Rect::new(0, 0, window.width, window.height),
        color: ui.background,
    }];

    out.push(DrawCommand::PushClip(content));
    for (_, surface) in shell.surfaces.placed() {
        draw_surface(&mut out, surface, content);
    }
    out.push(DrawCommand::PopClip);

    draw_chrome(&mut out, shell);
    draw_popup(&mut out, shell);

    for (note, rect) in shell.overlay.banners() {
        let (fg, bg) = note.kind.colors();
        out.push(DrawCommand::FillRect { rect, color: bg });
        out.push(text(rect, &note.text, ui.button_font_size.min(14), fg));
    }
    out
}

fn text(rect: Rect, text: &str, font_size: u16, color: Color) -> DrawCommand {
    DrawCommand::Text {
        rect,
        text: text.to_string(),
        font_size,
        color,
    }
}

fn draw_surface(out: &mut Vec<DrawCommand>, surface: &Surface, content: Rect) {
    let Some(bounds) = surface.bounds() else {
        return;
    };
    let page = bounds.translated(content.x, content.y);
    if page.intersect(&content).is_none() {
        return;
    }
    out.push(DrawCommand::FillRect {
        rect: page,
        color: surface.background(),
    });
    for w in surface.widgets() {
        let rect = w.rect.translated(page.x, page.y);
        if let Some(bg) = w.bg {
            out.push(DrawCommand::FillRect { rect, color: bg });
        }
        if !w.text.is_empty() {
            out.push(text(rect, &w.text, w.font_size, w.fg));
        }
    }
}

fn draw_chrome(out: &mut Vec<DrawCommand>, shell: &Shell) {
    let ui = &shell.config.ui;
    let enabled = shell.chrome.is_enabled();
    let fg = if enabled {
        ui.primary
    } else {
        ui.primary.dimmed(0.4)
    };
    out.push(DrawCommand::FillRect {
        rect: shell.chrome.bottom_bar(),
        color: ui.background,
    });
    for (button, rect) in shell.chrome.buttons() {
        if !enabled {
            out.push(DrawCommand::FillRect {
                rect,
                color: ui.active_background,
            });
        }
        out.push(text(rect, button.glyph(), ui.button_font_size, fg));
    }
}

fn draw_popup(out: &mut Vec<DrawCommand>, shell: &Shell) {
    let Some(popup) = shell.overlay.popup() else {
        return;
    };
    let ui = &shell.config.ui;
    out.push(DrawCommand::FillRect {
        rect: popup.region(),
        color: ui.background,
    });
    out.push(DrawCommand::FillRect {
        rect: popup.title_bar(),
        color: ui.primary,
    });
    out.push(text(popup.title_bar(), popup.title(), 14, ui.background));
    out.push(text(popup.close_rect(), "x", 14, ui.secondary));

    out.push(DrawCommand::PushClip(popup.region()));
    for (entry, rect) in popup.entries() {
        match entry {
            PopupEntry::Button { label, .. } => {
                out.push(DrawCommand::FillRect {
                    rect,
                    color: ui.primary,
                });
                out.push(text(rect, label, 12, ui.background));
            },
            PopupEntry::Label(label) => {
                out.push(text(rect, label, 12, ui.primary));
            },
        }
    }
    out.push(DrawCommand::PopClip);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrome::ChromeButton;
    use crate::test_utils::{mock_shell, settle};
    use crate::transition::Direction;

    fn texts(cmds: &[DrawCommand]) -> Vec<&str> {
        cmds.iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn clips_balance() {
        let (mut shell, _) = mock_shell(&["a", "b"]);
        shell.start(0).unwrap();
        shell.open_popup("Apps", vec![PopupEntry::label("x")]);
        let cmds = build(&shell);
        let pushes = cmds
            .iter()
            .filter(|c| matches!(c, DrawCommand::PushClip(_)))
            .count();
        let pops = cmds
            .iter()
            .filter(|c| matches!(c, DrawCommand::PopClip))
            .count();
        assert_eq!(pushes, pops);
        assert_eq!(pushes, 2);
    }

    #[test]
    fn frame_starts_with_window_background() {
        let (shell, _) = mock_shell(&["a"]);
        let cmds = build(&shell);
        assert_eq!(
            cmds[0],
            DrawCommand::FillRect {
                rect: Rect::new(0, 0, 350, 300),
                color: Color::BLACK,
            }
        );
    }

    #[test]
    fn current_page_widgets_are_offset_into_content() {
        let (mut shell, _) = mock_shell(&["clock"]);
        shell.start(0).unwrap();
        let cmds = build(&shell);
        // The mock page puts its title label at (0, 50) inside the page.
        assert!(cmds.contains(&DrawCommand::Text {
            rect: Rect::new(25, 50, 300, 40),
            text: "clock".into(),
            font_size: 12,
            color: Color::LIME_GREEN,
        }));
    }

    #[test]
    fn both_pages_drawn_mid_transition() {
        let (mut shell, _) = mock_shell(&["a", "b"]);
        shell.start(0).unwrap();
        shell.switch(Direction::Forward).unwrap();
        shell.run_until(150);
        let cmds = build(&shell);
        let t = texts(&cmds);
        assert!(t.contains(&"a"));
        assert!(t.contains(&"b"));
        settle(&mut shell);
        let t_after = build(&shell);
        assert!(!texts(&t_after).contains(&"a"));
    }

    #[test]
    fn chrome_dims_while_disabled() {
        let (mut shell, _) = mock_shell(&["a", "b"]);
        shell.start(0).unwrap();
        let glyph_color = |cmds: &[DrawCommand]| {
            cmds.iter()
                .find_map(|c| match c {
                    DrawCommand::Text { text, color, .. } if text == "<" => Some(*color),
                    _ => None,
                })
                .unwrap()
        };
        let idle = glyph_color(&build(&shell));
        shell.switch(Direction::Forward).unwrap();
        let busy = glyph_color(&build(&shell));
        assert_ne!(idle, busy);
        settle(&mut shell);
    }

    #[test]
    fn disabled_chrome_buttons_get_active_fill() {
        let (mut shell, _) = mock_shell(&["a", "b"]);
        shell.config.ui.active_background = Color::rgb(1, 2, 3);
        shell.start(0).unwrap();
        let left = shell.chrome.rect(ChromeButton::SwitchLeft);
        let filled = |cmds: &[DrawCommand]| {
            cmds.iter().any(|c| {
                matches!(c, DrawCommand::FillRect { rect, color }
                    if *rect == left && *color == Color::rgb(1, 2, 3))
            })
        };
        assert!(!filled(&build(&shell)));
        shell.switch(Direction::Forward).unwrap();
        assert!(filled(&build(&shell)));
        settle(&mut shell);
        assert!(!filled(&build(&shell)));
    }

    #[test]
    fn popup_and_banners_drawn_last() {
        let (mut shell, _) = mock_shell(&["a"]);
        shell.start(0).unwrap();
        shell.open_popup("Running Apps", vec![PopupEntry::label("No running apps")]);
        shell.info("hello");
        let cmds = build(&shell);
        let t = texts(&cmds);
        let title = t.iter().position(|s| *s == "Running Apps").unwrap();
        let banner = t.iter().position(|s| *s == "hello").unwrap();
        let page = t.iter().position(|s| *s == "a").unwrap();
        assert!(page < title);
        assert!(title < banner);
    }
}
