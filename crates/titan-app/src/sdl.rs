//! SDL2 window backend.
//!
//! Paints filled rectangles with a clip stack. Text commands are skipped;
//! this backend is for checking layout and slide motion at real pixel size.

use sdl2::EventPump;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::render::Canvas;
use sdl2::video::Window;

use titan_core::DrawCommand;
use titan_core::color::Color;
use titan_core::config::WindowConfig;
use titan_core::error::{Result, TitanError};
use titan_core::geometry::Rect;
use titan_core::input::{InputEvent, Shortcut};

use crate::backend::ShellBackend;

fn backend_err(e: impl std::fmt::Display) -> TitanError {
    TitanError::Backend(e.to_string())
}

fn sdl_rect(r: Rect) -> sdl2::rect::Rect {
    sdl2::rect::Rect::new(r.x, r.y, r.w, r.h)
}

pub struct SdlBackend {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    viewport: Rect,
    clip_stack: Vec<Rect>,
}

impl SdlBackend {
    pub fn new(window: &WindowConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(backend_err)?;
        let video = sdl.video().map_err(backend_err)?;
        let win = video
            .window(&window.title, window.width, window.height)
            .position_centered()
            .build()
            .map_err(backend_err)?;
        let canvas = win
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(backend_err)?;
        let event_pump = sdl.event_pump().map_err(backend_err)?;

        log::info!("SDL2 backend initialized: {}x{}", window.width, window.height);

        Ok(Self {
            canvas,
            event_pump,
            viewport: Rect::new(0, 0, window.width, window.height),
            clip_stack: Vec::new(),
        })
    }

    fn set_color(&mut self, color: Color) {
        if color.a < 255 {
            self.canvas.set_blend_mode(sdl2::render::BlendMode::Blend);
        } else {
            self.canvas.set_blend_mode(sdl2::render::BlendMode::None);
        }
        self.canvas
            .set_draw_color(sdl2::pixels::Color::RGBA(color.r, color.g, color.b, color.a));
    }

    fn apply_clip(&mut self) {
        match self.clip_stack.last() {
            Some(clip) if clip.w > 0 && clip.h > 0 => {
                self.canvas.set_clip_rect(sdl_rect(*clip));
            },
            // Empty intersection: clip everything.
            Some(_) => self.canvas.set_clip_rect(sdl2::rect::Rect::new(-1, -1, 1, 1)),
            None => self.canvas.set_clip_rect(None),
        }
    }
}

impl ShellBackend for SdlBackend {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.event_pump.poll_iter().filter_map(map_sdl_event).collect()
    }

    fn present(&mut self, frame: &[DrawCommand]) -> Result<()> {
        self.clip_stack.clear();
        self.apply_clip();
        for cmd in frame {
            match cmd {
                DrawCommand::FillRect { rect, color } => {
                    self.set_color(*color);
                    self.canvas.fill_rect(sdl_rect(*rect)).map_err(backend_err)?;
                },
                DrawCommand::Text { .. } => {},
                DrawCommand::PushClip(rect) => {
                    let current = self.clip_stack.last().copied().unwrap_or(self.viewport);
                    self.clip_stack
                        .push(current.intersect(rect).unwrap_or_default());
                    self.apply_clip();
                },
                DrawCommand::PopClip => {
                    self.clip_stack.pop();
                    self.apply_clip();
                },
            }
        }
        self.canvas.present();
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        log::info!("SDL2 backend shut down");
        Ok(())
    }
}

fn map_sdl_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Quit { .. } => Some(InputEvent::Quit),
        Event::KeyDown {
            keycode: Some(key), ..
        } => map_key_down(key),
        Event::MouseButtonDown {
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } => Some(InputEvent::PointerClick { x, y }),
        Event::Window {
            win_event: sdl2::event::WindowEvent::Resized(w, h),
            ..
        } => Some(InputEvent::Resized {
            width: w.max(0) as u32,
            height: h.max(0) as u32,
        }),
        _ => None,
    }
}

fn map_key_down(key: Keycode) -> Option<InputEvent> {
    let shortcut = match key {
        Keycode::Left => Shortcut::Previous,
        Keycode::Right => Shortcut::Next,
        Keycode::Backspace | Keycode::Escape => Shortcut::Back,
        Keycode::Home | Keycode::H => Shortcut::Home,
        Keycode::Tab => Shortcut::RunningApps,
        Keycode::A => Shortcut::AppList,
        Keycode::Q => return Some(InputEvent::Quit),
        _ => return None,
    };
    Some(InputEvent::Shortcut(shortcut))
}
