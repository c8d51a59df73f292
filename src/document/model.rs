use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStatus {
    #[default]
    NotReviewed,
    Default,
    InProgress,
    Complete,
    NeedsAttention,
    Custom,
}

impl ReviewStatus {
    pub const fn all() -> [Self; 6] {
        [
            Self::NotReviewed,
            Self::Default,
            Self::InProgress,
            Self::Complete,
            Self::NeedsAttention,
            Self::Custom,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotReviewed => "Not reviewed",
            Self::Default => "Default",
            Self::InProgress => "In progress",
            Self::Complete => "Complete",
            Self::NeedsAttention => "Needs attention",
            Self::Custom => "Custom",
        }
    }

    pub const fn color_hex(self) -> &'static str {
        match self {
            Self::NotReviewed => "#ef4444",
            Self::Default => "#1f2937",
            Self::InProgress => "#f97316",
            Self::Complete => "#22c55e",
            Self::NeedsAttention => "#3b82f6",
            Self::Custom => "#8b5cf6",
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::NotReviewed => "not-reviewed",
            Self::Default => "default",
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
            Self::NeedsAttention => "needs-attention",
            Self::Custom => "custom",
        }
    }

    /// Colour span marking `text` with this status.
    pub fn wrap(self, text: &str) -> String {
        format!(
            "<span style=\"color:{}\" data-review=\"{}\">{}</span>",
            self.color_hex(),
            self.tag(),
            text
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub review_status: ReviewStatus,
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

impl Document {
    /// Blank titles are rejected before a document exists.
    pub fn new(title: &str) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        Ok(Self::untitled_with(title, String::new()))
    }

    pub fn untitled() -> Self {
        Self::untitled_with("Untitled Document", String::new())
    }

    /// Document for content read from `path`, titled after the file stem.
    pub fn from_file(path: PathBuf, content: String) -> Self {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Untitled Document")
            .to_string();
        let mut doc = Self::untitled_with(&title, content);
        doc.file_path = Some(path);
        doc
    }

    fn untitled_with(title: &str, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content,
            last_updated: Utc::now(),
            review_status: ReviewStatus::default(),
            file_path: None,
        }
    }

    pub fn display_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.title.clone())
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.last_updated = Utc::now();
    }

    pub fn word_count(&self) -> usize {
        super::word_count(&self.content)
    }

    pub fn character_count(&self) -> usize {
        super::character_count(&self.content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(data: &str, path: Option<PathBuf>) -> Result<Self> {
        let mut doc: Self = serde_json::from_str(data)?;
        doc.file_path = path;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_titles() {
        assert!(matches!(Document::new("   "), Err(Error::EmptyTitle)));
        assert!(matches!(Document::new(""), Err(Error::EmptyTitle)));
        let doc = Document::new("  Deftere  ").expect("valid title");
        assert_eq!(doc.title, "Deftere");
        assert!(doc.content.is_empty());
    }

    #[test]
    fn titles_opened_files_after_stem() {
        let doc = Document::from_file(PathBuf::from("/tmp/jaŋde.txt"), "mi".to_string());
        assert_eq!(doc.title, "jaŋde");
        assert_eq!(doc.display_name(), "jaŋde.txt");
    }

    #[test]
    fn json_keeps_review_status_but_not_path() {
        let mut doc = Document::new("Deftere").expect("valid title");
        doc.review_status = ReviewStatus::NeedsAttention;
        doc.set_content("salaam");
        doc.file_path = Some(PathBuf::from("a.tab"));

        let json = doc.to_json().expect("serialize");
        assert!(json.contains("\"needs-attention\""));

        let back = Document::from_json(&json, None).expect("deserialize");
        assert_eq!(back.review_status, ReviewStatus::NeedsAttention);
        assert_eq!(back.content, "salaam");
        assert_eq!(back.file_path, None);
    }

    #[test]
    fn wraps_text_in_status_colour() {
        assert_eq!(
            ReviewStatus::Complete.wrap("jam"),
            "<span style=\"color:#22c55e\" data-review=\"complete\">jam</span>"
        );
    }
}
