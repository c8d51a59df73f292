pub mod export;
pub mod model;
pub mod txt;

use std::{path::Path, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use model::{Document, ReviewStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Native JSON document carrying title and review status.
    Tabital,
    Text,
    Html,
    Unknown,
}

impl DocumentFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Tabital => "tab",
            Self::Text | Self::Unknown => "txt",
            Self::Html => "html",
        }
    }
}

pub fn detect_format(path: &Path) -> DocumentFormat {
    match path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase()) {
        Some(ext) if ext == "tab" => DocumentFormat::Tabital,
        Some(ext) if ext == "txt" => DocumentFormat::Text,
        Some(ext) if ext == "html" || ext == "htm" => DocumentFormat::Html,
        _ => DocumentFormat::Unknown,
    }
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    // A tag name must follow `<`, so prose like "x < y and z > w" survives.
    TAG.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][A-Za-z0-9]*(?:\s[^<>]*)?/?>")
            .expect("tag pattern is valid")
    })
}

fn line_break_regex() -> &'static Regex {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    BREAK.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</(div|p|li|h[1-6])>").expect("break pattern is valid")
    })
}

pub fn has_markup(content: &str) -> bool {
    tag_regex().is_match(content)
}

/// Visible text of marked-up content: block ends become line breaks, other
/// tags are dropped and common entities decoded.
pub fn strip_markup(content: &str) -> String {
    if !content.contains('<') && !content.contains('&') {
        return content.to_string();
    }

    let with_breaks = line_break_regex().replace_all(content, "\n");
    let text = tag_regex().replace_all(&with_breaks, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Whitespace-separated words of the visible text.
pub fn word_count(content: &str) -> usize {
    strip_markup(content).split_whitespace().count()
}

pub fn character_count(content: &str) -> usize {
    strip_markup(content).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_formats_by_extension() {
        assert_eq!(detect_format(Path::new("a/b/notes.TAB")), DocumentFormat::Tabital);
        assert_eq!(detect_format(Path::new("notes.txt")), DocumentFormat::Text);
        assert_eq!(detect_format(Path::new("notes.htm")), DocumentFormat::Html);
        assert_eq!(detect_format(Path::new("notes")), DocumentFormat::Unknown);
    }

    #[test]
    fn strips_markup_and_entities() {
        let html = "<div>Salaam&nbsp;<b>aleekum</b></div><div>kitaab &amp; ɗerewol<br></div>";
        assert_eq!(strip_markup(html), "Salaam aleekum\nkitaab & ɗerewol\n\n");
        assert_eq!(strip_markup("plain text"), "plain text");
        assert!(has_markup(html));
        assert!(!has_markup("a < b"));
    }

    #[test]
    fn angle_brackets_in_prose_are_not_tags() {
        let prose = "x < y and z > w";
        assert!(!has_markup(prose));
        assert_eq!(strip_markup(prose), prose);
        assert_eq!(word_count(prose), 7);
        assert_eq!(strip_markup("1<2 & 3>2"), "1<2 & 3>2");
        assert_eq!(strip_markup("<span style=\"color: red\">jam</span><!-- note -->"), "jam");
    }

    #[test]
    fn counts_visible_words_and_characters() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  mi   yiɗi\nma  "), 3);
        assert_eq!(word_count("<span style=\"color:#22c55e\">jam</span> tan"), 2);
        assert_eq!(character_count("<b>ɓe</b>"), 2);
    }
}
