use crate::lexicon::{self, char_to_byte, is_word_char};

/// Selection endpoints as character offsets into the content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CaretState {
    pub anchor: usize,
    pub focus: usize,
}

impl CaretState {
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            focus: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Where typing happens.
    pub fn position(&self) -> usize {
        self.focus
    }

    /// `(start, end)` with `start <= end`.
    pub fn range(&self) -> (usize, usize) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }

    pub fn clamped(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            focus: self.focus.min(len),
        }
    }
}

/// Text plus an insertion point, edited by value.
///
/// Each edit consumes the cursor and returns the edited one, with the offset
/// placed right after whatever was inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCursor {
    text: String,
    offset: usize,
}

impl TextCursor {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        let offset = offset.min(text.chars().count());
        Self { text, offset }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn into_parts(self) -> (String, usize) {
        (self.text, self.offset)
    }

    pub fn current_word(&self) -> String {
        lexicon::extract_current_word(&self.text, self.offset)
    }

    pub fn insert(self, inserted: &str) -> Self {
        let offset = self.offset;
        self.replace_range(offset, offset, inserted)
    }

    /// Swaps the word ending at the caret for `replacement`; plain insert when
    /// the caret is not at the end of a word.
    pub fn replace_current_word(self, replacement: &str) -> Self {
        let word_len = self.current_word().chars().count();
        let start = self.offset - word_len;
        let end = self.offset;
        self.replace_range(start, end, replacement)
    }

    /// Replaces characters `start..end` (clamped, either order).
    pub fn replace_range(self, start: usize, end: usize, replacement: &str) -> Self {
        let len = self.text.chars().count();
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let (start, end) = (start.min(len), end.min(len));

        let start_byte = char_to_byte(&self.text, start);
        let end_byte = char_to_byte(&self.text, end);

        let mut text = String::with_capacity(self.text.len() + replacement.len());
        text.push_str(&self.text[..start_byte]);
        text.push_str(replacement);
        text.push_str(&self.text[end_byte..]);

        Self {
            text,
            offset: start + replacement.chars().count(),
        }
    }
}

/// True when `text` is a single run of word characters.
pub fn is_whole_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_word_char)
}
