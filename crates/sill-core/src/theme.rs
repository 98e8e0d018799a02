use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, error, info, warn};

pub const DEFAULT_THEME: &str = "dark";
pub const THEME_CONFIG_ENV: &str = "SILL_THEME_CONFIG";
pub const THEME_CONFIG_FILE: &str = "themes.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub font_family: String,
    pub font_size: u32,
    pub card_bg: String,
    pub card_border: String,
    pub text: String,
    pub text_muted: String,
    pub input_bg: String,
    pub accent: String,
    pub accent_hover: String,
    pub task_bg: String,
    pub task_border: String,
    pub overdue: String,
    pub due_label: String,
    pub scroll_track: String,
    pub scroll_thumb: String,
    pub day_bg: String,
    pub today_bg: String,
    pub past_day_bg: String,
    pub past_day_text: String,
    pub due_dot: String,
    pub weekday_header: String,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            font_family: "Segoe UI".to_string(),
            font_size: 13,
            card_bg: "rgba(28, 28, 32, 0.97)".to_string(),
            card_border: "#1f1f21".to_string(),
            text: "#e8e8f0".to_string(),
            text_muted: "#F4EEEE".to_string(),
            input_bg: "#2a2a35".to_string(),
            accent: "#2dab29".to_string(),
            accent_hover: "#3b3bc2".to_string(),
            task_bg: "#2a2a2e".to_string(),
            task_border: "#3a3a3f".to_string(),
            overdue: "#ff5555".to_string(),
            due_label: "#888888".to_string(),
            scroll_track: "#2a2a35".to_string(),
            scroll_thumb: "#555555".to_string(),
            day_bg: "#1e1e22".to_string(),
            today_bg: "#27ae60".to_string(),
            past_day_bg: "#4a1a1a".to_string(),
            past_day_text: "#cc4444".to_string(),
            due_dot: "#5b9cf6".to_string(),
            weekday_header: "#8888aa".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Segoe UI".to_string(),
            font_size: 13,
            card_bg: "rgba(245, 245, 255, 0.97)".to_string(),
            card_border: "#c8c8d8".to_string(),
            text: "#1a1a2e".to_string(),
            text_muted: "#999999".to_string(),
            input_bg: "#ffffff".to_string(),
            accent: "#4a80d9".to_string(),
            accent_hover: "#2a60b9".to_string(),
            task_bg: "#f0f0f5".to_string(),
            task_border: "#dddddd".to_string(),
            overdue: "#cc2222".to_string(),
            due_label: "#777777".to_string(),
            scroll_track: "#eeeeee".to_string(),
            scroll_thumb: "#bbbbbb".to_string(),
            day_bg: "#f8f8ff".to_string(),
            today_bg: "#27ae60".to_string(),
            past_day_bg: "#fde8e8".to_string(),
            past_day_text: "#cc2222".to_string(),
            due_dot: "#2a70d9".to_string(),
            weekday_header: "#8888aa".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThemeOverride {
    font_family: Option<String>,
    font_size: Option<u32>,
    card_bg: Option<String>,
    card_border: Option<String>,
    text: Option<String>,
    text_muted: Option<String>,
    input_bg: Option<String>,
    accent: Option<String>,
    accent_hover: Option<String>,
    task_bg: Option<String>,
    task_border: Option<String>,
    overdue: Option<String>,
    due_label: Option<String>,
    scroll_track: Option<String>,
    scroll_thumb: Option<String>,
    day_bg: Option<String>,
    today_bg: Option<String>,
    past_day_bg: Option<String>,
    past_day_text: Option<String>,
    due_dot: Option<String>,
    weekday_header: Option<String>,
}

impl ThemeOverride {
    fn apply(self, mut base: Theme) -> Theme {
        if let Some(font_family) = self.font_family {
            base.font_family = font_family;
        }
        if let Some(font_size) = self.font_size {
            base.font_size = font_size;
        }
        if let Some(card_bg) = self.card_bg {
            base.card_bg = card_bg;
        }
        if let Some(card_border) = self.card_border {
            base.card_border = card_border;
        }
        if let Some(text) = self.text {
            base.text = text;
        }
        if let Some(text_muted) = self.text_muted {
            base.text_muted = text_muted;
        }
        if let Some(input_bg) = self.input_bg {
            base.input_bg = input_bg;
        }
        if let Some(accent) = self.accent {
            base.accent = accent;
        }
        if let Some(accent_hover) = self.accent_hover {
            base.accent_hover = accent_hover;
        }
        if let Some(task_bg) = self.task_bg {
            base.task_bg = task_bg;
        }
        if let Some(task_border) = self.task_border {
            base.task_border = task_border;
        }
        if let Some(overdue) = self.overdue {
            base.overdue = overdue;
        }
        if let Some(due_label) = self.due_label {
            base.due_label = due_label;
        }
        if let Some(scroll_track) = self.scroll_track {
            base.scroll_track = scroll_track;
        }
        if let Some(scroll_thumb) = self.scroll_thumb {
            base.scroll_thumb = scroll_thumb;
        }
        if let Some(day_bg) = self.day_bg {
            base.day_bg = day_bg;
        }
        if let Some(today_bg) = self.today_bg {
            base.today_bg = today_bg;
        }
        if let Some(past_day_bg) = self.past_day_bg {
            base.past_day_bg = past_day_bg;
        }
        if let Some(past_day_text) = self.past_day_text {
            base.past_day_text = past_day_text;
        }
        if let Some(due_dot) = self.due_dot {
            base.due_dot = due_dot;
        }
        if let Some(weekday_header) = self.weekday_header {
            base.weekday_header = weekday_header;
        }
        base
    }
}

#[derive(Debug, Clone)]
pub struct ThemeSet {
    themes: BTreeMap<String, Theme>,
    default: Theme,
}

impl ThemeSet {
    pub fn builtin() -> Self {
        let mut themes = BTreeMap::new();
        themes.insert("dark".to_string(), Theme::dark());
        themes.insert("light".to_string(), Theme::light());
        Self {
            themes,
            default: Theme::dark(),
        }
    }

    pub fn load(data_dir: &Path, override_path: Option<&Path>) -> Self {
        let mut themes = Self::builtin();

        let path = match override_path {
            Some(path) => path.to_path_buf(),
            None => match env_theme_config() {
                Some(path) => path,
                None => data_dir.join(THEME_CONFIG_FILE),
            },
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = %path.display(), "no theme config; using built-in themes");
                return themes;
            }
            Err(err) => {
                error!(file = %path.display(), error = %err, "failed reading theme config; using built-in themes");
                return themes;
            }
        };

        let overrides: BTreeMap<String, ThemeOverride> = match toml::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "malformed theme config; using built-in themes");
                return themes;
            }
        };

        for (name, patch) in overrides {
            let base = themes
                .themes
                .get(&name)
                .cloned()
                .unwrap_or_else(Theme::dark);
            themes.themes.insert(name, patch.apply(base));
        }
        themes.default = themes
            .themes
            .get(DEFAULT_THEME)
            .cloned()
            .unwrap_or_else(Theme::dark);

        info!(file = %path.display(), themes = themes.themes.len(), "loaded theme config");
        themes
    }

    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> &Theme {
        self.themes.get(name).unwrap_or(&self.default)
    }

    pub fn names(&self) -> Vec<&str> {
        self.themes.keys().map(String::as_str).collect()
    }
}

fn env_theme_config() -> Option<PathBuf> {
    let raw = std::env::var(THEME_CONFIG_ENV).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::{DEFAULT_THEME, Theme, ThemeSet};

    #[test]
    fn builtin_set_resolves_both_named_themes() {
        let themes = ThemeSet::builtin();
        assert_eq!(themes.resolve("dark"), &Theme::dark());
        assert_eq!(themes.resolve("light"), &Theme::light());
        assert_eq!(themes.names(), vec!["dark", "light"]);
    }

    #[test]
    fn unknown_name_resolves_to_default() {
        let themes = ThemeSet::builtin();
        assert_eq!(themes.resolve("solarized"), &Theme::dark());
        assert!(!themes.contains("solarized"));
    }

    #[test]
    fn config_file_patches_builtin_theme() {
        let temp = tempdir().expect("tempdir");
        let config = temp.path().join("custom.toml");
        std::fs::write(
            &config,
            "[dark]\naccent = \"#ff00ff\"\n\n[midnight]\ncard_bg = \"#000000\"\n",
        )
        .expect("write config");

        let themes = ThemeSet::load(temp.path(), Some(&config));

        let dark = themes.resolve("dark");
        assert_eq!(dark.accent, "#ff00ff");
        assert_eq!(dark.text, Theme::dark().text);

        let midnight = themes.resolve("midnight");
        assert_eq!(midnight.card_bg, "#000000");
        assert_eq!(midnight.due_dot, Theme::dark().due_dot);

        assert_eq!(themes.resolve("nope"), themes.resolve(DEFAULT_THEME));
    }

    #[test]
    fn malformed_config_keeps_builtins() {
        let temp = tempdir().expect("tempdir");
        let config = temp.path().join("broken.toml");
        std::fs::write(&config, "not really toml [").expect("write config");

        let themes = ThemeSet::load(temp.path(), Some(&config));
        assert_eq!(themes.resolve("dark"), &Theme::dark());
    }

    #[test]
    fn missing_config_keeps_builtins() {
        let temp = tempdir().expect("tempdir");
        let config = temp.path().join("absent.toml");
        let themes = ThemeSet::load(temp.path(), Some(&config));
        assert_eq!(themes.names(), vec!["dark", "light"]);
    }
}
