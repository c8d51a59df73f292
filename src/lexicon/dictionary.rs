use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

pub const DICTIONARY_FILE_VERSION: u32 = 1;
pub const QUERY_LIMIT: usize = 10;

/// Seed vocabulary for a fresh install.
const BUILTIN_WORDS: &[(&str, Option<&str>)] = &[
    ("salaam", Some("peace")),
    ("kitaab", Some("book")),
    ("hadith", Some("saying/tradition")),
    ("hakkiilo", None),
    ("hakkunde", None),
    ("hakkil", None),
    ("hakkilo", None),
    ("hakkiloo", None),
    ("hakkilol", None),
    ("hakkilorde", None),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub id: Uuid,
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default)]
    pub frequency: u32,
    pub date_added: DateTime<Utc>,
}

impl DictionaryEntry {
    pub fn new(word: impl Into<String>, translation: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            word: word.into(),
            translation,
            frequency: 1,
            date_added: Utc::now(),
        }
    }
}

/// Known word forms in insertion order, looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    index: HashMap<String, usize>,
}

impl Dictionary {
    pub fn builtin() -> Self {
        let mut dictionary = Self::default();
        for (word, translation) in BUILTIN_WORDS {
            dictionary.insert(word, translation.map(str::to_string));
        }
        dictionary
    }

    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Self {
        let mut dictionary = Self::default();
        for entry in entries {
            let key = entry.word.to_lowercase();
            if dictionary.index.contains_key(&key) {
                continue;
            }
            dictionary.index.insert(key, dictionary.entries.len());
            dictionary.entries.push(entry);
        }
        dictionary
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.iter()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(&word.to_lowercase())
    }

    pub fn get(&self, word: &str) -> Option<&DictionaryEntry> {
        self.index
            .get(&word.to_lowercase())
            .and_then(|&i| self.entries.get(i))
    }

    /// Adds `word` unless a case-insensitive match exists; either way the
    /// stored entry is returned.
    pub fn insert(&mut self, word: &str, translation: Option<String>) -> &DictionaryEntry {
        let key = word.to_lowercase();
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(DictionaryEntry::new(word, translation));
                self.index.insert(key, idx);
                idx
            }
        };
        &self.entries[idx]
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<DictionaryEntry> {
        let pos = self.entries.iter().position(|e| e.id == *id)?;
        let removed = self.entries.remove(pos);
        self.reindex();
        Some(removed)
    }

    /// Bumps the usage counter; returns the new count.
    pub fn record_use(&mut self, word: &str) -> Option<u32> {
        let idx = *self.index.get(&word.to_lowercase())?;
        let entry = &mut self.entries[idx];
        entry.frequency = entry.frequency.saturating_add(1);
        Some(entry.frequency)
    }

    /// Entries whose lowercase form starts with the lowercase `prefix`.
    pub fn query<'a>(
        &'a self,
        prefix: &str,
        limit: usize,
    ) -> impl Iterator<Item = &'a DictionaryEntry> + use<'a> {
        let needle = prefix.to_lowercase();
        let limit = if needle.is_empty() { 0 } else { limit };
        self.entries
            .iter()
            .filter(move |e| e.word.to_lowercase().starts_with(needle.as_str()))
            .take(limit)
    }

    /// Word or translation containing `text`, for the dictionary manager view.
    pub fn search(&self, text: &str) -> Vec<&DictionaryEntry> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| {
                e.word.to_lowercase().contains(needle.as_str())
                    || e
                        .translation
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(needle.as_str()))
            })
            .collect()
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.word.to_lowercase(), i))
            .collect();
    }
}

/// Dictionary source consulted by the editing core.
pub trait DictionaryStore {
    /// At most [`QUERY_LIMIT`] words starting with `prefix`.
    fn query(&self, prefix: &str) -> Result<Vec<String>>;
    fn add(&mut self, word: &str, definition: Option<&str>) -> Result<DictionaryEntry>;
    fn all_words(&self) -> Result<Dictionary>;
    fn remove(&mut self, id: &Uuid) -> Result<()>;
    fn record_use(&mut self, word: &str) -> Result<()>;
}

fn normalize_word(word: &str) -> Result<String> {
    let word = word.trim();
    if !word.chars().any(super::is_word_char) {
        return Err(Error::EmptyWord);
    }
    Ok(word.to_lowercase())
}

fn normalize_definition(definition: Option<&str>) -> Option<String> {
    definition
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

impl DictionaryStore for Dictionary {
    fn query(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(Dictionary::query(self, prefix, QUERY_LIMIT)
            .map(|e| e.word.clone())
            .collect())
    }

    fn add(&mut self, word: &str, definition: Option<&str>) -> Result<DictionaryEntry> {
        let word = normalize_word(word)?;
        Ok(self.insert(&word, normalize_definition(definition)).clone())
    }

    fn all_words(&self) -> Result<Dictionary> {
        Ok(self.clone())
    }

    fn remove(&mut self, id: &Uuid) -> Result<()> {
        Dictionary::remove(self, id)
            .map(|_| ())
            .ok_or_else(|| Error::UnknownEntry(id.to_string()))
    }

    fn record_use(&mut self, word: &str) -> Result<()> {
        Dictionary::record_use(self, word);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DictionaryFile {
    version: u32,
    words: Vec<DictionaryEntry>,
}

/// Dictionary persisted as `dictionary.json`, rewritten after every change.
#[derive(Debug)]
pub struct JsonDictionaryStore {
    path: PathBuf,
    dictionary: Dictionary,
}

impl JsonDictionaryStore {
    pub fn open_default() -> Result<Self> {
        Self::open(dictionary_path())
    }

    /// Missing files start from the built-in vocabulary; unreadable ones are
    /// an error so a corrupt file is never silently replaced.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let dictionary = if path.exists() {
            load_dictionary_from(&path)?
        } else {
            tracing::info!(path = %path.display(), "no dictionary file, seeding built-in words");
            Dictionary::builtin()
        };
        Ok(Self { path, dictionary })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn persist(&self) -> Result<()> {
        save_dictionary_to(&self.path, &self.dictionary)
    }
}

impl DictionaryStore for JsonDictionaryStore {
    fn query(&self, prefix: &str) -> Result<Vec<String>> {
        DictionaryStore::query(&self.dictionary, prefix)
    }

    fn add(&mut self, word: &str, definition: Option<&str>) -> Result<DictionaryEntry> {
        let before = self.dictionary.len();
        let entry = DictionaryStore::add(&mut self.dictionary, word, definition)?;
        if self.dictionary.len() != before {
            self.persist()?;
            tracing::debug!(word = %entry.word, "added dictionary word");
        }
        Ok(entry)
    }

    fn all_words(&self) -> Result<Dictionary> {
        Ok(self.dictionary.clone())
    }

    fn remove(&mut self, id: &Uuid) -> Result<()> {
        DictionaryStore::remove(&mut self.dictionary, id)?;
        self.persist()
    }

    fn record_use(&mut self, word: &str) -> Result<()> {
        if self.dictionary.record_use(word).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

pub fn dictionary_path() -> PathBuf {
    if let Some(root) = crate::settings::portable_root() {
        return root.join("dictionary.json");
    }

    if let Some(base) = dirs::data_dir() {
        base.join("Tabital").join("dictionary.json")
    } else {
        PathBuf::from("dictionary.json")
    }
}

pub fn load_dictionary_from(path: &Path) -> Result<Dictionary> {
    let data = fs::read_to_string(path)?;
    let file: DictionaryFile = serde_json::from_str(&data)?;
    if file.version > DICTIONARY_FILE_VERSION {
        tracing::warn!(version = file.version, "dictionary written by a newer version");
    }
    Ok(Dictionary::from_entries(file.words))
}

pub fn save_dictionary_to(path: &Path, dictionary: &Dictionary) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = DictionaryFile {
        version: DICTIONARY_FILE_VERSION,
        words: dictionary.entries.clone(),
    };
    fs::write(path, serde_json::to_string_pretty(&file)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_case_insensitive_and_ordered() {
        let mut dictionary = Dictionary::default();
        dictionary.insert("Salaam", Some("peace".to_string()));
        dictionary.insert("kitaab", None);
        let again = dictionary.insert("SALAAM", None).clone();

        assert_eq!(dictionary.len(), 2);
        assert_eq!(again.word, "Salaam");
        assert_eq!(again.translation.as_deref(), Some("peace"));
        assert!(dictionary.contains("salaam"));
        let order: Vec<_> = dictionary.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(order, vec!["Salaam", "kitaab"]);
    }

    #[test]
    fn remove_keeps_lookup_consistent() {
        let mut dictionary = Dictionary::builtin();
        let id = dictionary.get("kitaab").map(|e| e.id).expect("seeded");
        assert!(dictionary.remove(&id).is_some());
        assert!(!dictionary.contains("kitaab"));
        assert!(dictionary.contains("hadith"));
        assert_eq!(dictionary.get("hadith").map(|e| e.word.as_str()), Some("hadith"));
        assert!(dictionary.remove(&id).is_none());
    }

    #[test]
    fn record_use_increments_frequency() {
        let mut dictionary = Dictionary::builtin();
        assert_eq!(dictionary.record_use("Salaam"), Some(2));
        assert_eq!(dictionary.record_use("salaam"), Some(3));
        assert_eq!(dictionary.record_use("nowhere"), None);
    }

    #[test]
    fn store_query_is_capped() {
        let mut dictionary = Dictionary::default();
        for i in 0..20 {
            dictionary.insert(&format!("hakk{i:02}"), None);
        }
        let hits = DictionaryStore::query(&dictionary, "hakk").expect("query");
        assert_eq!(hits.len(), QUERY_LIMIT);
        assert_eq!(hits[0], "hakk00");
    }

    #[test]
    fn store_add_normalizes_and_rejects_blank() {
        let mut dictionary = Dictionary::default();
        let entry = DictionaryStore::add(&mut dictionary, "  Ɓesngu ", Some(" family ")).expect("add");
        assert_eq!(entry.word, "ɓesngu");
        assert_eq!(entry.translation.as_deref(), Some("family"));
        assert!(matches!(
            DictionaryStore::add(&mut dictionary, "  ", None),
            Err(Error::EmptyWord)
        ));
    }

    #[test]
    fn search_matches_word_or_translation() {
        let dictionary = Dictionary::builtin();
        let hits: Vec<_> = dictionary.search("book").iter().map(|e| e.word.clone()).collect();
        assert_eq!(hits, vec!["kitaab".to_string()]);
        assert_eq!(dictionary.search("").len(), dictionary.len());
    }

    #[test]
    fn json_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("dictionary.json");

        let mut store = JsonDictionaryStore::open(&path).expect("open");
        assert_eq!(store.dictionary().len(), BUILTIN_WORDS.len());
        assert!(!path.exists());

        store.add("jaaɓi", Some("answer")).expect("add");
        assert!(path.exists());

        let reopened = JsonDictionaryStore::open(&path).expect("reopen");
        let words = reopened.all_words().expect("snapshot");
        assert!(words.contains("JAAƁI"));
        assert_eq!(words.len(), BUILTIN_WORDS.len() + 1);
        assert_eq!(words.iter().last().map(|e| e.word.as_str()), Some("jaaɓi"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dictionary.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(JsonDictionaryStore::open(&path), Err(Error::Json(_))));
    }
}
