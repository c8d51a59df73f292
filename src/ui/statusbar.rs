#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Saved,
    Unsaved,
    Saving,
    Failed,
}

impl SaveState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Saved => "Saved",
            Self::Unsaved => "Unsaved changes",
            Self::Saving => "Saving…",
            Self::Failed => "Save failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBarInfo {
    pub document_name: String,
    pub word_count: usize,
    pub character_count: usize,
    pub unknown_word_count: usize,
    pub line: usize,
    pub column: usize,
    pub save_state: SaveState,
    pub file_format: String,
    pub encoding: String,
}

impl Default for StatusBarInfo {
    fn default() -> Self {
        Self {
            document_name: "Untitled".to_string(),
            word_count: 0,
            character_count: 0,
            unknown_word_count: 0,
            line: 1,
            column: 1,
            save_state: SaveState::Saved,
            file_format: "TAB".to_string(),
            encoding: "UTF-8".to_string(),
        }
    }
}

impl StatusBarInfo {
    pub fn left_text(&self) -> String {
        let mut text = format!(
            "{} | Words: {} | Chars: {}",
            self.document_name, self.word_count, self.character_count
        );
        if self.unknown_word_count > 0 {
            text.push_str(&format!(" | Unknown: {}", self.unknown_word_count));
        }
        text
    }

    pub fn right_text(&self) -> String {
        format!(
            "{} | Ln {}, Col {} | {} | {}",
            self.save_state.label(),
            self.line,
            self.column,
            self.file_format,
            self.encoding
        )
    }
}
