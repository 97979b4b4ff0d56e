//! Shell configuration.
//!
//! Every value has a default matching the classic 350x300 Titan window, so
//! an empty (or absent) TOML file yields a working configuration. Sections
//! mirror the TOML layout: `[window]`, `[animation]`, `[apps]`, `[ui]`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::Result;
use crate::geometry::Rect;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TITAN_CONFIG";

/// File looked up in the working directory when `TITAN_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "titan.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TitanConfig {
    pub window: WindowConfig,
    pub animation: AnimationConfig,
    pub apps: AppsConfig,
    pub ui: UiConfig,
}

/// Window geometry and layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Size of one page (Surface).
    pub content_width: u32,
    pub content_height: u32,
    /// Offset of the content area inside the window.
    pub content_x: i32,
    pub content_y: i32,
    /// Width of the left/right switch buttons.
    pub button_width: u32,
    pub bottom_nav_height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Titan".to_string(),
            width: 350,
            height: 300,
            content_width: 300,
            content_height: 250,
            content_x: 25,
            content_y: 0,
            button_width: 25,
            bottom_nav_height: 50,
        }
    }
}

impl WindowConfig {
    /// The content area in window coordinates.
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.content_x,
            self.content_y,
            self.content_width,
            self.content_height,
        )
    }
}

/// How the delay between transition ticks is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickTiming {
    /// `duration / tick_count`: the slide lasts the configured duration.
    #[default]
    PerTick,
    /// `duration / distance` (integer division), the legacy formula.
    PerPixel,
}

/// Animation timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub duration_ms: u64,
    pub step_px: u32,
    pub poll_interval_ms: u64,
    /// Default lifetime of a notification banner.
    pub notification_ms: u64,
    pub tick_timing: TickTiming,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            step_px: 15,
            poll_interval_ms: 20,
            notification_ms: 500,
            tick_timing: TickTiming::PerTick,
        }
    }
}

/// App discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppsConfig {
    /// Directory whose file entries name the installed apps. When `None`,
    /// the built-in catalog order is used as the scan order.
    pub directory: Option<PathBuf>,
    /// Codes that sort first, in this order.
    pub priority: Vec<String>,
    /// File names never treated as apps.
    pub reserved: Vec<String>,
}

impl Default for AppsConfig {
    fn default() -> Self {
        Self {
            directory: None,
            priority: vec!["clock".to_string(), "stopwatch".to_string()],
            reserved: vec![
                "__init__.py".to_string(),
                "__pycache__".to_string(),
                "mod.rs".to_string(),
            ],
        }
    }
}

/// Palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
    /// Fill behind the chrome buttons while they are disabled.
    pub active_background: Color,
    pub button_font_size: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            primary: Color::LIME_GREEN,
            secondary: Color::RED,
            background: Color::BLACK,
            active_background: Color::DARK_GREY,
            button_font_size: 20,
        }
    }
}

impl TitanConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the configuration the way the desktop binary does:
    /// `$TITAN_CONFIG` if set, else `titan.toml` in the working directory if
    /// it exists, else defaults.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }
}
