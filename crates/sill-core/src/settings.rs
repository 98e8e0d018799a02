use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::theme::{DEFAULT_THEME, ThemeSet};

pub const DEFAULT_OPACITY: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBounds {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Todo,
    Calendar,
}

impl WidgetKind {
    pub fn settings_file(self) -> &'static str {
        match self {
            Self::Todo => "todo.settings.json",
            Self::Calendar => "calendar.settings.json",
        }
    }

    pub fn default_size(self) -> (u32, u32) {
        match self {
            Self::Todo => (320, 480),
            Self::Calendar => (380, 400),
        }
    }

    pub fn min_size(self) -> (u32, u32) {
        match self {
            Self::Todo => (240, 200),
            Self::Calendar => (300, 300),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub opacity: f64,
    pub theme: String,
    pub startup_enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    x: Option<i32>,
    y: Option<i32>,
    width: Option<u32>,
    height: Option<u32>,
    opacity: Option<f64>,
    theme: Option<String>,
    startup_enabled: Option<bool>,
}

impl WidgetSettings {
    pub fn defaults(kind: WidgetKind, screen: ScreenBounds) -> Self {
        let (width, height) = kind.default_size();
        Self {
            x: centered(screen.width, width),
            y: centered(screen.height, height),
            width,
            height,
            opacity: DEFAULT_OPACITY,
            theme: DEFAULT_THEME.to_string(),
            startup_enabled: false,
        }
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn resize_to(&mut self, kind: WidgetKind, width: u32, height: u32) {
        let (min_width, min_height) = kind.min_size();
        self.width = width.max(min_width);
        self.height = height.max(min_height);
    }

    pub fn clamp_opacity(&mut self) {
        self.opacity = self.opacity.clamp(0.0, 1.0);
    }

    fn merge(mut self, raw: RawSettings, kind: WidgetKind, themes: &ThemeSet) -> Self {
        if let Some(x) = raw.x {
            self.x = x;
        }
        if let Some(y) = raw.y {
            self.y = y;
        }
        if let Some(width) = raw.width {
            self.width = width;
        }
        if let Some(height) = raw.height {
            self.height = height;
        }
        if let Some(opacity) = raw.opacity {
            self.opacity = opacity;
        }
        if let Some(theme) = raw.theme {
            self.theme = theme;
        }
        if let Some(startup_enabled) = raw.startup_enabled {
            self.startup_enabled = startup_enabled;
        }

        self.clamp_opacity();
        let (min_width, min_height) = kind.min_size();
        self.width = self.width.max(min_width);
        self.height = self.height.max(min_height);
        if !themes.contains(&self.theme) {
            warn!(theme = %self.theme, "unknown theme name; using default");
            self.theme = DEFAULT_THEME.to_string();
        }
        self
    }
}

fn centered(screen: u32, size: u32) -> i32 {
    (screen.saturating_sub(size) / 2) as i32
}

#[derive(Debug)]
pub struct SettingsStore {
    data_dir: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    #[tracing::instrument(skip(self, themes))]
    pub fn load(
        &self,
        kind: WidgetKind,
        screen: ScreenBounds,
        themes: &ThemeSet,
    ) -> anyhow::Result<WidgetSettings> {
        let path = self.data_dir.join(kind.settings_file());
        let defaults = WidgetSettings::defaults(kind, screen);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = %path.display(), "settings file not found; using defaults");
                return Ok(defaults);
            }
            Err(err) => {
                return Err(anyhow!("failed reading {}: {}", path.display(), err));
            }
        };

        match serde_json::from_str::<RawSettings>(&raw) {
            Ok(parsed) => Ok(defaults.merge(parsed, kind, themes)),
            Err(err) => {
                warn!(file = %path.display(), error = %err, "malformed settings file; using defaults");
                Ok(defaults)
            }
        }
    }

    #[tracing::instrument(skip(self, settings))]
    pub fn save(&self, kind: WidgetKind, settings: &WidgetSettings) -> anyhow::Result<()> {
        let mut settings = settings.clone();
        settings.clamp_opacity();

        let path = self.data_dir.join(kind.settings_file());
        debug!(file = %path.display(), "saving settings");

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        let serialized = serde_json::to_string_pretty(&settings)?;
        writeln!(temp, "{serialized}")?;
        temp.flush()?;

        temp.persist(&path)
            .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

        Ok(())
    }
}
