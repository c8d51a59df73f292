//! Content model behind the editing surface.
//!
//! Holds the content string and caret, and re-derives line numbers, the
//! unknown-word set and the suggestion list after every edit. It never
//! performs I/O: saving is requested through the autosave timer and carried
//! out by whoever owns the document store.

use std::{collections::BTreeSet, time::Instant};

use ropey::Rope;

use crate::{
    document::{self, ReviewStatus},
    lexicon::{LexicalAssistant, Suggestion, dictionary::Dictionary},
    settings::schema::Settings,
};

pub mod autosave;
pub mod cursor;
pub mod search;

use autosave::{AutosaveTimer, SaveTicket};
use cursor::{CaretState, TextCursor, is_whole_word};

#[derive(Debug, Clone)]
pub struct ContentModel {
    content: String,
    rope: Rope,
    caret: CaretState,
    line_numbers: Vec<usize>,
    unknown_words: BTreeSet<String>,
    current_word: String,
    suggestions: Vec<Suggestion>,
    selected_suggestion: usize,
    dictionary: Dictionary,
    assistant: LexicalAssistant,
    spelling_check: bool,
    autosave: AutosaveTimer,
    dirty: bool,
    revision: u64,
    saving_revision: Option<(SaveTicket, u64)>,
}

impl Default for ContentModel {
    fn default() -> Self {
        Self::new(Dictionary::default(), LexicalAssistant::default(), AutosaveTimer::default())
    }
}

impl ContentModel {
    pub fn new(dictionary: Dictionary, assistant: LexicalAssistant, autosave: AutosaveTimer) -> Self {
        let mut model = Self {
            content: String::new(),
            rope: Rope::new(),
            caret: CaretState::default(),
            line_numbers: vec![1],
            unknown_words: BTreeSet::new(),
            current_word: String::new(),
            suggestions: Vec::new(),
            selected_suggestion: 0,
            dictionary,
            assistant,
            spelling_check: true,
            autosave,
            dirty: false,
            revision: 0,
            saving_revision: None,
        };
        model.derive();
        model
    }

    pub fn with_settings(settings: &Settings, dictionary: Dictionary) -> Self {
        let mut model = Self::new(
            dictionary,
            LexicalAssistant::from(&settings.lexicon),
            AutosaveTimer::from_interval(settings.files.auto_save_interval),
        );
        model.spelling_check = settings.lexicon.spelling_check;
        model.derive();
        model
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.assistant = LexicalAssistant::from(&settings.lexicon);
        self.spelling_check = settings.lexicon.spelling_check;
        if self.autosave.delay() != AutosaveTimer::from_interval(settings.files.auto_save_interval).delay() {
            self.autosave.set_interval(settings.files.auto_save_interval);
        }
        self.derive();
    }

    /// Swaps in a fresh dictionary snapshot and re-derives the word state.
    pub fn set_dictionary(&mut self, dictionary: Dictionary) {
        self.dictionary = dictionary;
        self.derive();
        self.refresh_suggestions();
    }

    /// Content for a newly opened document: clean, caret at the start, and
    /// no autosave left over from the previous document.
    pub fn load(&mut self, content: impl Into<String>) {
        self.autosave.cancel();
        self.saving_revision = None;
        self.content = content.into();
        self.caret = CaretState::default();
        self.dirty = false;
        self.revision += 1;
        self.derive();
        self.current_word.clear();
        self.dismiss_suggestions();
    }

    /// One keystroke: the new text together with the caret it left behind.
    /// Suggestions are computed from this pair, never from an older caret.
    pub fn on_input(
        &mut self,
        raw_text: impl Into<String>,
        anchor: usize,
        focus: usize,
        now: Instant,
    ) {
        self.caret = CaretState { anchor, focus };
        self.on_content_changed(raw_text, now);
    }

    /// Every edit lands here. Re-derives all display state and restarts the
    /// autosave delay. The caret is kept, clamped to the new text.
    pub fn on_content_changed(&mut self, raw_text: impl Into<String>, now: Instant) {
        self.content = raw_text.into();
        self.dirty = true;
        self.revision += 1;
        self.derive();
        self.refresh_suggestions();
        self.autosave.schedule(now);
    }

    /// Marks the document changed without touching the text, for metadata
    /// edits that still need saving.
    pub fn touch(&mut self, now: Instant) {
        self.dirty = true;
        self.revision += 1;
        self.autosave.schedule(now);
    }

    /// Moves the caret and re-derives the word under it. Content, dirty
    /// state and autosave are untouched.
    pub fn on_caret_moved(&mut self, anchor: usize, focus: usize) {
        self.caret = CaretState { anchor, focus }.clamped(self.char_len());
        self.refresh_suggestions();
    }

    /// Recomputes the word at the caret and its completions.
    pub fn refresh_suggestions(&mut self) {
        let (word, suggestions) =
            self.assistant
                .suggest_at(&self.content, self.caret.position(), &self.dictionary);
        self.current_word = word;
        self.suggestions = suggestions;
        self.selected_suggestion = 0;
    }

    /// Completes the word being typed with `text`, or inserts it literally
    /// when it is not a single word or the caret is not on a word. A
    /// selection is always replaced. Returns the new caret offset.
    pub fn insert_text_at_caret(&mut self, text: &str, now: Instant) -> usize {
        let cursor = self.cursor();
        let cursor = if !self.caret.is_collapsed() {
            let (start, end) = self.caret.range();
            cursor.replace_range(start, end, text)
        } else if is_whole_word(text) {
            cursor.replace_current_word(text)
        } else {
            cursor.insert(text)
        };
        self.commit(cursor, now)
    }

    /// Typing or plain-text paste: never touches the word before the caret.
    pub fn insert_literal(&mut self, text: &str, now: Instant) -> usize {
        let cursor = self.cursor();
        let (start, end) = self.caret.range();
        self.commit(cursor.replace_range(start, end, text), now)
    }

    /// Inserts the highlighted suggestion and closes the list.
    pub fn accept_suggestion(&mut self, now: Instant) -> Option<String> {
        let word = self.suggestions.get(self.selected_suggestion)?.word.clone();
        self.insert_text_at_caret(&word, now);
        self.dismiss_suggestions();
        Some(word)
    }

    pub fn select_next_suggestion(&mut self) {
        if !self.suggestions.is_empty() {
            self.selected_suggestion = (self.selected_suggestion + 1) % self.suggestions.len();
        }
    }

    pub fn select_previous_suggestion(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.selected_suggestion = if self.selected_suggestion == 0 {
            self.suggestions.len() - 1
        } else {
            self.selected_suggestion - 1
        };
    }

    pub fn dismiss_suggestions(&mut self) {
        self.suggestions.clear();
        self.selected_suggestion = 0;
    }

    /// Colours the selected text with the status; no-op without a selection.
    pub fn apply_review_status(&mut self, status: ReviewStatus, now: Instant) -> bool {
        if self.caret.is_collapsed() {
            return false;
        }
        let (start, end) = self.caret.range();
        let selected: String = self.content.chars().skip(start).take(end - start).collect();
        let cursor = self.cursor().replace_range(start, end, &status.wrap(&selected));
        self.commit(cursor, now);
        true
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn line_numbers(&self) -> &[usize] {
        &self.line_numbers
    }

    pub fn unknown_words(&self) -> &BTreeSet<String> {
        &self.unknown_words
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn selected_suggestion(&self) -> Option<&Suggestion> {
        self.suggestions.get(self.selected_suggestion)
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn caret(&self) -> CaretState {
        self.caret
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn word_count(&self) -> usize {
        document::word_count(&self.content)
    }

    pub fn character_count(&self) -> usize {
        document::character_count(&self.content)
    }

    /// One-based line and column of the caret.
    pub fn caret_line_column(&self) -> (usize, usize) {
        let pos = self.caret.position().min(self.rope.len_chars());
        let line = self.rope.char_to_line(pos);
        let column = pos - self.rope.line_to_char(line);
        (line + 1, column + 1)
    }

    pub fn autosave(&self) -> &AutosaveTimer {
        &self.autosave
    }

    pub fn cancel_autosave(&mut self) {
        self.autosave.cancel();
    }

    /// Ticket for a save that is now due, remembering which revision it
    /// covers.
    pub fn poll_autosave(&mut self, now: Instant) -> Option<SaveTicket> {
        if !self.dirty {
            return None;
        }
        let ticket = self.autosave.poll(now)?;
        self.saving_revision = Some((ticket, self.revision));
        Some(ticket)
    }

    /// Ends a save. The model only becomes clean when the save succeeded and
    /// nothing was edited while it ran.
    pub fn complete_save(&mut self, ticket: SaveTicket, succeeded: bool) -> bool {
        let matched = self.autosave.complete(ticket);
        if let Some((pending, revision)) = self.saving_revision {
            if pending == ticket {
                self.saving_revision = None;
                if succeeded && revision == self.revision {
                    self.dirty = false;
                }
            }
        }
        matched
    }

    /// Marks the current content as persisted by an explicit save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.autosave.cancel();
    }

    fn cursor(&self) -> TextCursor {
        TextCursor::new(self.content.clone(), self.caret.position())
    }

    fn commit(&mut self, cursor: TextCursor, now: Instant) -> usize {
        let (text, offset) = cursor.into_parts();
        self.caret = CaretState::collapsed(offset);
        self.on_content_changed(text, now);
        offset
    }

    fn char_len(&self) -> usize {
        self.rope.len_chars()
    }

    fn derive(&mut self) {
        self.rope = Rope::from_str(&self.content);
        self.caret = self.caret.clamped(self.rope.len_chars());
        self.line_numbers = (1..=self.rope.len_lines().max(1)).collect();
        self.unknown_words = if self.spelling_check {
            self.assistant
                .unknown_words(&document::strip_markup(&self.content), &self.dictionary)
        } else {
            BTreeSet::new()
        };
    }
}
