//! Word-level assistance for the editing surface.
//!
//! Extracts the word under the caret, flags words the dictionary does not
//! know, and completes partial words against the dictionary. Everything here
//! is pure: offsets are character offsets, clamped to the text, and no input
//! string can make these functions panic.

use std::collections::BTreeSet;

pub mod dictionary;

use dictionary::Dictionary;

use crate::settings::schema::LexiconSettings;

pub const MIN_SUGGEST_LEN: usize = 2;
pub const MIN_UNKNOWN_LEN: usize = 3;
pub const MAX_SUGGESTIONS: usize = 8;

/// Letters (any script), digits and underscore.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Byte index of the `offset`-th character, clamped to the end of `text`.
pub fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Iterates over contiguous word-character runs.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c)).filter(|w| !w.is_empty())
}

/// The run of word characters ending exactly at `caret_offset`.
///
/// Text after the caret is never consulted, so a caret in the middle of a
/// word yields only the part before it.
pub fn extract_current_word(text: &str, caret_offset: usize) -> String {
    let caret_byte = char_to_byte(text, caret_offset);
    let before = &text[..caret_byte];

    let word_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(caret_byte);

    before[word_start..].to_string()
}

pub fn find_unknown_words(text: &str, dictionary: &Dictionary) -> BTreeSet<String> {
    find_unknown_words_with(text, dictionary, MIN_UNKNOWN_LEN)
}

/// Lowercased words of at least `min_len` characters that are not in the
/// dictionary. Length is measured on the word as written, since lowercasing
/// can add characters.
pub fn find_unknown_words_with(
    text: &str,
    dictionary: &Dictionary,
    min_len: usize,
) -> BTreeSet<String> {
    words(text)
        .filter(|word| word.chars().count() >= min_len)
        .map(str::to_lowercase)
        .filter(|word| !dictionary.contains(word))
        .collect()
}

/// Dictionary words sharing `current_word` as a case-insensitive prefix, in
/// dictionary order.
pub fn suggest_completions(
    current_word: &str,
    dictionary: &Dictionary,
    max_results: usize,
) -> Vec<String> {
    dictionary
        .query(current_word, max_results)
        .map(|entry| entry.word.clone())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub word: String,
    pub translation: Option<String>,
}

/// Thresholds shared by every editing surface that wants completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalAssistant {
    pub min_suggest_len: usize,
    pub min_unknown_len: usize,
    pub max_suggestions: usize,
}

impl Default for LexicalAssistant {
    fn default() -> Self {
        Self {
            min_suggest_len: MIN_SUGGEST_LEN,
            min_unknown_len: MIN_UNKNOWN_LEN,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }
}

/// User values can raise the thresholds but never lower them below the
/// defaults, and can only shorten the suggestion list.
impl From<&LexiconSettings> for LexicalAssistant {
    fn from(settings: &LexiconSettings) -> Self {
        Self {
            min_suggest_len: settings.min_suggest_len.max(MIN_SUGGEST_LEN),
            min_unknown_len: settings.min_unknown_len.max(MIN_UNKNOWN_LEN),
            max_suggestions: settings.max_suggestions.clamp(1, MAX_SUGGESTIONS),
        }
    }
}

impl LexicalAssistant {
    pub fn unknown_words(&self, text: &str, dictionary: &Dictionary) -> BTreeSet<String> {
        find_unknown_words_with(text, dictionary, self.min_unknown_len)
    }

    /// Completions for `word`, empty below the minimum length.
    pub fn suggest(&self, word: &str, dictionary: &Dictionary) -> Vec<Suggestion> {
        if word.chars().count() < self.min_suggest_len {
            return Vec::new();
        }

        dictionary
            .query(word, self.max_suggestions)
            .map(|entry| Suggestion {
                word: entry.word.clone(),
                translation: entry.translation.clone(),
            })
            .collect()
    }

    /// Current word at the caret plus its completions.
    pub fn suggest_at(
        &self,
        text: &str,
        caret_offset: usize,
        dictionary: &Dictionary,
    ) -> (String, Vec<Suggestion>) {
        let word = extract_current_word(text, caret_offset);
        let suggestions = self.suggest(&word, dictionary);
        (word, suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(words: &[&str]) -> Dictionary {
        let mut dictionary = Dictionary::default();
        for word in words {
            dictionary.insert(word, None);
        }
        dictionary
    }

    #[test]
    fn extracts_word_before_caret() {
        assert_eq!(extract_current_word("hello wor", 9), "wor");
        assert_eq!(extract_current_word("hello world", 8), "wo");
        assert_eq!(extract_current_word("hello ", 6), "");
        assert_eq!(extract_current_word("", 0), "");
        assert_eq!(extract_current_word("abc", 0), "");
    }

    #[test]
    fn clamps_out_of_range_caret() {
        assert_eq!(extract_current_word("salaam", 400), "salaam");
        assert_eq!(extract_current_word("a b", usize::MAX), "b");
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "mi yiɗi ɓeyngu";
        let caret = text.chars().count();
        let first = extract_current_word(text, caret);
        assert_eq!(first, "ɓeyngu");
        assert_eq!(extract_current_word(text, caret), first);
        assert_eq!(extract_current_word(&first, first.chars().count()), first);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // "ŋ" and "ɗ" are two bytes each.
        let text = "ŋaari ɗum";
        assert_eq!(extract_current_word(text, 5), "ŋaari");
        assert_eq!(extract_current_word(text, 8), "ɗu");
    }

    #[test]
    fn stops_at_punctuation() {
        assert_eq!(extract_current_word("(kitaab", 7), "kitaab");
        assert_eq!(extract_current_word("a-b_c", 5), "b_c");
    }

    #[test]
    fn unknown_words_exclude_dictionary_and_short_words() {
        let dictionary = dict(&["world"]);
        let unknown = find_unknown_words("hello wrld", &dictionary);
        let expected: BTreeSet<String> = ["hello", "wrld"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unknown, expected);

        let dictionary = dict(&["world", "hello"]);
        let unknown = find_unknown_words("hello wrld", &dictionary);
        assert_eq!(unknown.into_iter().collect::<Vec<_>>(), vec!["wrld".to_string()]);
    }

    #[test]
    fn unknown_words_are_case_insensitive() {
        let dictionary = dict(&["Salaam"]);
        let unknown = find_unknown_words("SALAAM salaam Kitaab mi e", &dictionary);
        assert_eq!(unknown.into_iter().collect::<Vec<_>>(), vec!["kitaab".to_string()]);
    }

    #[test]
    fn unknown_words_never_intersect_dictionary() {
        let dictionary = dict(&["hakkil", "hakkilo", "hadith"]);
        let text = "Hakkil hakkilo HADITH hakkunde, hakkiilo! 42 ab";
        let unknown = find_unknown_words(text, &dictionary);
        assert!(unknown.iter().all(|w| !dictionary.contains(w)));
        assert!(unknown.contains("hakkunde"));
        assert!(!unknown.contains("ab"));
    }

    #[test]
    fn completes_by_prefix_in_dictionary_order() {
        let dictionary = dict(&["salaam", "kitaab"]);
        assert_eq!(suggest_completions("sal", &dictionary, 8), vec!["salaam".to_string()]);

        let dictionary = dict(&["hakkunde", "hakkil", "Hakkilo", "hadith"]);
        assert_eq!(
            suggest_completions("HAKK", &dictionary, 8),
            vec!["hakkunde".to_string(), "hakkil".to_string(), "Hakkilo".to_string()]
        );
        assert_eq!(suggest_completions("hakk", &dictionary, 2).len(), 2);
    }

    #[test]
    fn empty_word_has_no_completions() {
        let dictionary = dict(&["salaam", "kitaab"]);
        assert!(suggest_completions("", &dictionary, 8).is_empty());
        assert!(suggest_completions("", &Dictionary::default(), 0).is_empty());
    }

    #[test]
    fn assistant_respects_minimum_length() {
        let dictionary = dict(&["salaam"]);
        let assistant = LexicalAssistant::default();
        assert!(assistant.suggest("s", &dictionary).is_empty());
        assert_eq!(assistant.suggest("sa", &dictionary).len(), 1);

        let (word, suggestions) = assistant.suggest_at("mi sal", 6, &dictionary);
        assert_eq!(word, "sal");
        assert_eq!(suggestions[0].word, "salaam");
    }

    #[test]
    fn short_words_stay_unflagged_when_lowercasing_grows_them() {
        // "İ" lowercases to two characters.
        let unknown = find_unknown_words("İİ ab Ŋaari", &Dictionary::default());
        assert_eq!(unknown.into_iter().collect::<Vec<_>>(), vec!["ŋaari".to_string()]);
    }

    #[test]
    fn settings_cannot_lower_thresholds() {
        let settings = LexiconSettings {
            min_suggest_len: 0,
            min_unknown_len: 1,
            max_suggestions: 500,
            ..LexiconSettings::default()
        };
        let assistant = LexicalAssistant::from(&settings);
        assert_eq!(assistant, LexicalAssistant::default());

        let dictionary = dict(&["salaam"]);
        assert!(assistant.suggest("s", &dictionary).is_empty());
        assert!(assistant.unknown_words("ab e", &dictionary).is_empty());

        let stricter = LexicalAssistant::from(&LexiconSettings {
            min_suggest_len: 3,
            min_unknown_len: 5,
            max_suggestions: 2,
            ..LexiconSettings::default()
        });
        assert!(stricter.suggest("sa", &dictionary).is_empty());
        assert_eq!(stricter.max_suggestions, 2);
        assert!(stricter.unknown_words("kitab", &dictionary).contains("kitab"));
        assert!(stricter.unknown_words("kita", &dictionary).is_empty());
    }
}
