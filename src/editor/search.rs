use std::time::{Duration, Instant};

use regex::{Regex, RegexBuilder};

use crate::lexicon::is_word_char;

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub regex: bool,
}

/// A hit in the content. `start`/`end` are character offsets so they can be
/// fed straight back as caret positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub snippet: String,
    byte_start: usize,
    byte_end: usize,
}

#[derive(Debug, Clone)]
pub struct FindReplaceState {
    pub visible: bool,
    pub replace_visible: bool,
    pub query: String,
    pub replacement: String,
    pub options: SearchOptions,
    pub results: Vec<SearchMatch>,
    pub current_index: usize,
    pub result_count_text: String,
    pub last_replaced_count: usize,
    pub debounce_ms: u64,
    pub last_input_at: Instant,
    pub pending_live_update: bool,
}

impl Default for FindReplaceState {
    fn default() -> Self {
        Self {
            visible: false,
            replace_visible: false,
            query: String::new(),
            replacement: String::new(),
            options: SearchOptions::default(),
            results: Vec::new(),
            current_index: 0,
            result_count_text: "0 results".to_string(),
            last_replaced_count: 0,
            debounce_ms: 100,
            last_input_at: Instant::now(),
            pending_live_update: false,
        }
    }
}

impl FindReplaceState {
    pub fn open_find(&mut self) {
        self.visible = true;
        self.replace_visible = false;
    }

    pub fn open_replace(&mut self) {
        self.visible = true;
        self.replace_visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.replace_visible = false;
        self.results.clear();
    }

    pub fn set_query(&mut self, query: String, now: Instant) {
        self.query = query;
        self.pending_live_update = true;
        self.last_input_at = now;
    }

    pub fn set_replacement(&mut self, replacement: String) {
        self.replacement = replacement;
    }

    pub fn should_live_update(&self, now: Instant) -> bool {
        self.pending_live_update
            && now.duration_since(self.last_input_at) >= Duration::from_millis(self.debounce_ms)
    }

    pub fn refresh_results(&mut self, text: &str) -> usize {
        let results = search_text(text, self.query.as_str(), self.options);
        self.current_index = self.current_index.min(results.len().saturating_sub(1));
        self.result_count_text = format!("{} results for '{}'", results.len(), self.query);
        self.pending_live_update = false;
        self.results = results;
        self.results.len()
    }

    pub fn current_result(&self) -> Option<&SearchMatch> {
        self.results.get(self.current_index)
    }

    pub fn next(&mut self) -> Option<&SearchMatch> {
        if self.results.is_empty() {
            return None;
        }
        self.current_index = (self.current_index + 1) % self.results.len();
        self.current_result()
    }

    pub fn previous(&mut self) -> Option<&SearchMatch> {
        if self.results.is_empty() {
            return None;
        }
        if self.current_index == 0 {
            self.current_index = self.results.len() - 1;
        } else {
            self.current_index -= 1;
        }
        self.current_result()
    }

    /// Replaces the current hit; returns the new text when something changed.
    /// Results found in an older version of `text` are refreshed instead, and
    /// nothing is replaced until the caller asks again.
    pub fn replace_current(&mut self, text: &str) -> Option<String> {
        if search_text(text, self.query.as_str(), self.options) != self.results {
            self.refresh_results(text);
            return None;
        }
        let current = self.current_result()?.clone();
        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..current.byte_start]);
        out.push_str(&self.replacement);
        out.push_str(&text[current.byte_end..]);

        self.last_replaced_count = 1;
        self.refresh_results(&out);
        Some(out)
    }

    pub fn replace_all(&mut self, text: &str) -> Option<String> {
        let (out, replaced) = replace_all(text, &self.query, &self.replacement, self.options);
        self.last_replaced_count = replaced;
        if replaced == 0 {
            return None;
        }
        self.refresh_results(&out);
        Some(out)
    }
}

pub fn search_text(text: &str, query: &str, options: SearchOptions) -> Vec<SearchMatch> {
    if query.is_empty() {
        return Vec::new();
    }
    let Ok(regex) = build_regex(query, options) else {
        return Vec::new();
    };

    regex
        .find_iter(text)
        .filter(|m| !m.is_empty())
        .filter(|m| !options.whole_word || is_whole_word(text, m.start(), m.end()))
        .map(|m| SearchMatch {
            start: text[..m.start()].chars().count(),
            end: text[..m.end()].chars().count(),
            line: text[..m.start()].matches('\n').count() + 1,
            snippet: snippet(text, m.start(), m.end()),
            byte_start: m.start(),
            byte_end: m.end(),
        })
        .collect()
}

/// Returns the rewritten text and the number of replacements.
pub fn replace_all(
    text: &str,
    query: &str,
    replacement: &str,
    options: SearchOptions,
) -> (String, usize) {
    let hits = search_text(text, query, options);
    if hits.is_empty() {
        return (text.to_string(), 0);
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for hit in &hits {
        out.push_str(&text[cursor..hit.byte_start]);
        out.push_str(replacement);
        cursor = hit.byte_end;
    }
    out.push_str(&text[cursor..]);
    (out, hits.len())
}

fn build_regex(query: &str, options: SearchOptions) -> Result<Regex, regex::Error> {
    let pattern = if options.regex {
        query.to_string()
    } else {
        regex::escape(query)
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .build()
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !is_word_char(c));
    let after_ok = text[end..].chars().next().is_none_or(|c| !is_word_char(c));
    before_ok && after_ok
}

fn snippet(text: &str, start: usize, end: usize) -> String {
    let mut begin = start.saturating_sub(24);
    while !text.is_char_boundary(begin) {
        begin -= 1;
    }
    let mut finish = (end + 24).min(text.len());
    while !text.is_char_boundary(finish) {
        finish += 1;
    }
    text[begin..finish].replace('\n', " ")
}
