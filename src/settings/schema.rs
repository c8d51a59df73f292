use serde::{Deserialize, Serialize};

pub const SETTINGS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingsCategory {
    Appearance,
    Editor,
    Files,
    Lexicon,
}

impl SettingsCategory {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Appearance => "Appearance",
            Self::Editor => "Editor",
            Self::Files => "Files",
            Self::Lexicon => "Dictionary & Spelling",
        }
    }

    pub const fn all() -> [Self; 4] {
        [Self::Appearance, Self::Editor, Self::Files, Self::Lexicon]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub schema_version: u32,
    pub appearance: AppearanceSettings,
    pub editor: EditorSettings,
    pub files: FileSettings,
    pub lexicon: LexiconSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION,
            appearance: AppearanceSettings::default(),
            editor: EditorSettings::default(),
            files: FileSettings::default(),
            lexicon: LexiconSettings::default(),
        }
    }
}

impl Settings {
    pub fn migrate(mut self) -> Self {
        if self.schema_version > SETTINGS_SCHEMA_VERSION {
            return self;
        }

        self.schema_version = SETTINGS_SCHEMA_VERSION;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    pub theme: ThemePreference,
    pub font_size_px: u16,
    pub font_family: String,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: ThemePreference::Dark,
            font_size_px: 16,
            font_family: "Plus Jakarta Sans".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreference {
    Light,
    #[default]
    Dark,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub show_line_numbers: bool,
    pub tab_inserts_spaces: bool,
    pub tab_width: u8,
    pub paste_as_plain_text: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            show_line_numbers: true,
            tab_inserts_spaces: true,
            tab_width: 4,
            paste_as_plain_text: true,
        }
    }
}

impl EditorSettings {
    /// Text the Tab key inserts.
    pub fn indent_unit(&self) -> String {
        if self.tab_inserts_spaces {
            " ".repeat(self.tab_width.max(1) as usize)
        } else {
            "\t".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub auto_save_interval: AutoSaveInterval,
    pub recent_files_count: u16,
    pub default_save_format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            auto_save_interval: AutoSaveInterval::Seconds(10),
            recent_files_count: 10,
            default_save_format: ".tab".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AutoSaveInterval {
    Off,
    Seconds(u64),
}

impl AutoSaveInterval {
    pub fn as_seconds(self) -> Option<u64> {
        match self {
            Self::Off => None,
            Self::Seconds(v) => Some(v),
        }
    }
}

impl Default for AutoSaveInterval {
    fn default() -> Self {
        Self::Seconds(10)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconSettings {
    pub spelling_check: bool,
    pub min_suggest_len: usize,
    pub min_unknown_len: usize,
    pub max_suggestions: usize,
}

impl Default for LexiconSettings {
    fn default() -> Self {
        Self {
            spelling_check: true,
            min_suggest_len: crate::lexicon::MIN_SUGGEST_LEN,
            min_unknown_len: crate::lexicon::MIN_UNKNOWN_LEN,
            max_suggestions: crate::lexicon::MAX_SUGGESTIONS,
        }
    }
}
