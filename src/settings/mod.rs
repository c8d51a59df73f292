pub mod schema;

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use serde_json::Value;

use crate::error::{Error, Result};

use schema::{Settings, SettingsCategory};

const SAVE_DEBOUNCE_MS: u64 = 500;

/// Named access to configuration values, keyed by dotted path
/// (`files.auto_save_interval`).
pub trait SettingsSource {
    fn settings(&self) -> &Settings;
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SettingSearchHit {
    pub category: SettingsCategory,
    pub setting_key: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
}

pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
    pending_write: bool,
    last_change_at: Option<Instant>,
    debounce: Duration,
}

impl SettingsStore {
    pub fn load() -> Self {
        Self::with_path(settings_path())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = load_settings_from(path.as_path());
        Self {
            path,
            settings,
            pending_write: false,
            last_change_at: None,
            debounce: Duration::from_millis(SAVE_DEBOUNCE_MS),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending_write
    }

    pub fn update<F>(&mut self, mutator: F)
    where
        F: FnOnce(&mut Settings),
    {
        mutator(&mut self.settings);
        self.mark_changed();
    }

    pub fn flush_if_due(&mut self) -> Result<bool> {
        let Some(last_change) = self.last_change_at else {
            return Ok(false);
        };
        if !self.pending_write || last_change.elapsed() < self.debounce {
            return Ok(false);
        }

        self.write()?;
        Ok(true)
    }

    pub fn force_flush(&mut self) -> Result<()> {
        if self.pending_write {
            self.write()?;
        }
        Ok(())
    }

    fn write(&mut self) -> Result<()> {
        save_settings_to(self.path.as_path(), &self.settings)?;
        self.pending_write = false;
        self.last_change_at = None;
        Ok(())
    }

    fn mark_changed(&mut self) {
        self.pending_write = true;
        self.last_change_at = Some(Instant::now());
    }
}

impl SettingsSource for SettingsStore {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn get(&self, key: &str) -> Option<Value> {
        get_value(&self.settings, key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.settings = with_value(&self.settings, key, value)?;
        self.mark_changed();
        Ok(())
    }
}

impl SettingsSource for Settings {
    fn settings(&self) -> &Settings {
        self
    }

    fn get(&self, key: &str) -> Option<Value> {
        get_value(self, key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        *self = with_value(self, key, value)?;
        Ok(())
    }
}

fn pointer(key: &str) -> String {
    format!("/{}", key.trim().replace('.', "/"))
}

fn get_value(settings: &Settings, key: &str) -> Option<Value> {
    let tree = serde_json::to_value(settings).ok()?;
    tree.pointer(pointer(key).as_str()).cloned()
}

/// Copy of `settings` with `key` replaced, validated against the schema.
fn with_value(settings: &Settings, key: &str, value: Value) -> Result<Settings> {
    let mut tree = serde_json::to_value(settings)?;
    let slot = tree
        .pointer_mut(pointer(key).as_str())
        .ok_or_else(|| Error::UnknownSetting(key.to_string()))?;
    *slot = value;

    serde_json::from_value::<Settings>(tree).map_err(|e| Error::InvalidSetting {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

pub fn settings_path() -> PathBuf {
    if let Some(root) = portable_root() {
        return root.join("settings.json");
    }

    if let Some(base) = dirs::config_dir() {
        base.join("Tabital").join("settings.json")
    } else {
        PathBuf::from("settings.json")
    }
}

pub fn portable_root() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.to_path_buf();
    let marker = dir.join("tabital.ini");
    if marker.exists() {
        Some(dir)
    } else {
        None
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(settings_path().as_path())
}

/// Unreadable or malformed files yield defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    let Ok(data) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&data) {
        Ok(settings) => settings.migrate(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring malformed settings file");
            Settings::default()
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(&settings.clone().migrate())?;
    fs::write(path, data)?;
    Ok(())
}

pub fn search_settings(query: &str) -> Vec<SettingSearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return settings_catalog().to_vec();
    }

    settings_catalog()
        .iter()
        .filter(|item| {
            item.title.to_lowercase().contains(needle.as_str())
                || item.summary.to_lowercase().contains(needle.as_str())
                || item.setting_key.contains(needle.as_str())
                || item.category.title().to_lowercase().contains(needle.as_str())
        })
        .cloned()
        .collect()
}

fn settings_catalog() -> &'static [SettingSearchHit] {
    &[
        SettingSearchHit {
            category: SettingsCategory::Appearance,
            setting_key: "appearance.theme",
            title: "Theme",
            summary: "Light, dark, or follow the system.",
        },
        SettingSearchHit {
            category: SettingsCategory::Appearance,
            setting_key: "appearance.font_size_px",
            title: "Font Size",
            summary: "Editor text size in pixels.",
        },
        SettingSearchHit {
            category: SettingsCategory::Editor,
            setting_key: "editor.show_line_numbers",
            title: "Line Numbers",
            summary: "Show the line number gutter.",
        },
        SettingSearchHit {
            category: SettingsCategory::Editor,
            setting_key: "editor.tab_width",
            title: "Tab Width",
            summary: "Spaces inserted by the Tab key.",
        },
        SettingSearchHit {
            category: SettingsCategory::Files,
            setting_key: "files.auto_save_interval",
            title: "Auto-save Delay",
            summary: "Quiet period before edits are saved, or off.",
        },
        SettingSearchHit {
            category: SettingsCategory::Files,
            setting_key: "files.recent_files_count",
            title: "Recent Files",
            summary: "How many recently opened documents to remember.",
        },
        SettingSearchHit {
            category: SettingsCategory::Lexicon,
            setting_key: "lexicon.spelling_check",
            title: "Unknown Word Highlighting",
            summary: "Flag words missing from the Fulfulde dictionary.",
        },
        SettingSearchHit {
            category: SettingsCategory::Lexicon,
            setting_key: "lexicon.max_suggestions",
            title: "Suggestion Count",
            summary: "Maximum autocomplete entries shown.",
        },
    ]
}
