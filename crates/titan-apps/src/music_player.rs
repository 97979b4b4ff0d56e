//! Play/pause toggle.
//!
//! There is no audio; the app exists to exercise background state. While
//! "playing" the module reports itself as running, and the state outlives
//! the page.

use std::cell::Cell;
use std::rc::Rc;

use titan_core::error::Result;
use titan_core::geometry::Rect;
use titan_core::{App, AppModule, Shell, SurfaceId, Widget};

use crate::page;

const PLAY: &str = "\u{23f5}";
const PAUSE: &str = "\u{23f8}";

fn glyph(playing: bool) -> &'static str {
    if playing {
        PAUSE
    } else {
        PLAY
    }
}

pub struct MusicPlayerModule {
    playing: Rc<Cell<bool>>,
}

impl MusicPlayerModule {
    pub fn new() -> Self {
        Self {
            playing: Rc::new(Cell::new(false)),
        }
    }
}

impl Default for MusicPlayerModule {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModule for MusicPlayerModule {
    fn instantiate(&self) -> Box<dyn App> {
        Box::new(MusicPlayerApp {
            playing: Rc::clone(&self.playing),
        })
    }

    fn is_running(&self) -> bool {
        self.playing.get()
    }
}

struct MusicPlayerApp {
    playing: Rc<Cell<bool>>,
}

impl App for MusicPlayerApp {
    fn create(&mut self, surface: SurfaceId, shell: &mut Shell) -> Result<()> {
        let ui = shell.config.ui.clone();
        let playing = Rc::clone(&self.playing);
        let s = page(shell, surface)?;
        s.configure_background(ui.background);
        s.add(
            Widget::button(
                "play_pause",
                Rect::centered(150, 200, 60, 50),
                glyph(self.playing.get()),
                move |shell: &mut Shell| {
                    let now = !playing.get();
                    playing.set(now);
                    log::debug!("Music player {}", if now { "playing" } else { "paused" });
                    if let Some(s) = shell.surfaces.get_mut(surface) {
                        s.set_text("play_pause", glyph(now));
                    }
                },
            )
            .with_fg(ui.primary)
            .with_bg(ui.background)
            .with_font_size(60),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{advance, press, shell_on, text};
    use titan_core::Direction;

    #[test]
    fn toggles_glyph() {
        let mut shell = shell_on("music_player");
        assert_eq!(text(&shell, "play_pause"), PLAY);
        press(&mut shell, "play_pause");
        assert_eq!(text(&shell, "play_pause"), PAUSE);
        press(&mut shell, "play_pause");
        assert_eq!(text(&shell, "play_pause"), PLAY);
    }

    #[test]
    fn playing_survives_page_change() {
        let mut shell = shell_on("music_player");
        press(&mut shell, "play_pause");
        shell.switch(Direction::Forward).unwrap();
        advance(&mut shell, 1_000);
        assert_eq!(shell.registry.running(), vec!["music_player".to_string()]);

        shell.switch(Direction::Backward).unwrap();
        advance(&mut shell, 1_000);
        assert_eq!(shell.current_code(), Some("music_player"));
        assert_eq!(text(&shell, "play_pause"), PAUSE);
    }

    #[test]
    fn paused_player_is_not_running() {
        let module = MusicPlayerModule::new();
        assert!(!module.is_running());
        module.playing.set(true);
        assert!(module.is_running());
    }
}
