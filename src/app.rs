//! Editor session: one open document wired to its collaborators.
//!
//! The session owns the content model plus the document, dictionary and
//! settings collaborators. Collaborator failures never take the editor down;
//! they are logged, shown as a toast, and returned to the caller.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use serde_json::Value;
use uuid::Uuid;

use crate::{
    document::{self, Document, DocumentFormat, ReviewStatus, detect_format, export},
    editor::{ContentModel, autosave::SaveTicket, search::FindReplaceState},
    error::{Error, Result},
    lexicon::dictionary::{Dictionary, DictionaryEntry, DictionaryStore},
    settings::{SettingsSource, schema::Settings},
    storage::{DocumentStore, UTF_8_NAME},
    ui::{SaveState, StatusBarInfo, Toast},
};

/// A save the host should perform, then report back through
/// [`EditorSession::complete_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub ticket: SaveTicket,
    pub document_id: Uuid,
    pub path: PathBuf,
    pub content: String,
}

pub struct EditorSession<D, L, S>
where
    D: DocumentStore,
    L: DictionaryStore,
    S: SettingsSource,
{
    documents: D,
    dictionary: L,
    settings: S,
    model: ContentModel,
    document: Document,
    toasts: Toast,
    find: FindReplaceState,
    encoding: String,
    last_save_failed: bool,
}

impl<D, L, S> EditorSession<D, L, S>
where
    D: DocumentStore,
    L: DictionaryStore,
    S: SettingsSource,
{
    pub fn new(mut documents: D, dictionary: L, settings: S) -> Self {
        documents.set_recent_limit(usize::from(settings.settings().files.recent_files_count));
        let snapshot = dictionary.all_words().unwrap_or_else(|err| {
            tracing::warn!(%err, "dictionary unavailable, starting without known words");
            Dictionary::default()
        });
        let model = ContentModel::with_settings(settings.settings(), snapshot);

        Self {
            documents,
            dictionary,
            settings,
            model,
            document: Document::untitled(),
            toasts: Toast::default(),
            find: FindReplaceState::default(),
            encoding: UTF_8_NAME.to_string(),
            last_save_failed: false,
        }
    }

    pub fn model(&self) -> &ContentModel {
        &self.model
    }

    /// Entry point for edits coming from the host surface.
    pub fn model_mut(&mut self) -> &mut ContentModel {
        &mut self.model
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut D {
        &mut self.documents
    }

    pub fn dictionary(&self) -> &L {
        &self.dictionary
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn toasts(&self) -> &Toast {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut Toast {
        &mut self.toasts
    }

    pub fn find(&self) -> &FindReplaceState {
        &self.find
    }

    pub fn find_mut(&mut self) -> &mut FindReplaceState {
        &mut self.find
    }

    pub fn new_document(&mut self, title: &str) -> Result<()> {
        let document = Document::new(title)?;
        tracing::info!(title = %document.title, "new document");
        self.switch_to(document, UTF_8_NAME.to_string());
        Ok(())
    }

    /// Replaces the open document with `path`. On failure the current
    /// document stays open and untouched.
    pub fn open(&mut self, path: &Path, now: Instant) -> Result<()> {
        let (document, encoding) = match self.read_document(path) {
            Ok(read) => read,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "open failed");
                self.toasts
                    .push_open_failed(&path.display().to_string(), &err.to_string(), now);
                return Err(err);
            }
        };

        tracing::info!(path = %path.display(), words = document.word_count(), %encoding, "opened document");
        self.switch_to(document, encoding);
        self.remember_recent(path);
        Ok(())
    }

    pub fn save(&mut self, now: Instant) -> Result<()> {
        let path = self.document.file_path.clone().ok_or(Error::NoFilePath)?;
        self.save_to(&path, now)
    }

    /// Saves under a new path. The old path is kept if the write fails.
    pub fn save_as(&mut self, path: &Path, now: Instant) -> Result<()> {
        let previous = self.document.file_path.replace(path.to_path_buf());
        let result = self.save_to(path, now);
        if result.is_err() {
            self.document.file_path = previous;
        }
        result
    }

    /// Hands out the autosave that is due, if any. Documents without a path
    /// wait for an explicit save-as.
    pub fn poll_autosave(&mut self, now: Instant) -> Option<SaveRequest> {
        let path = self.document.file_path.clone()?;
        let ticket = self.model.poll_autosave(now)?;

        match self.serialize_for(&path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), ticket = ticket.0, "autosave due");
                Some(SaveRequest {
                    ticket,
                    document_id: self.document.id,
                    path,
                    content,
                })
            }
            Err(err) => {
                tracing::warn!(%err, "could not serialize document for autosave");
                self.model.complete_save(ticket, false);
                None
            }
        }
    }

    /// Reports the outcome of a [`SaveRequest`]. Results for a document that
    /// is no longer open only release the timer.
    pub fn complete_save(&mut self, request: SaveRequest, result: Result<()>, now: Instant) {
        let current = request.document_id == self.document.id;
        match result {
            Ok(()) => {
                self.model.complete_save(request.ticket, true);
                if current {
                    self.last_save_failed = false;
                    self.encoding = UTF_8_NAME.to_string();
                    tracing::debug!(path = %request.path.display(), "autosaved");
                }
            }
            Err(err) => {
                self.model.complete_save(request.ticket, false);
                tracing::warn!(path = %request.path.display(), %err, "autosave failed");
                if current {
                    self.last_save_failed = true;
                    self.toasts
                        .push_save_failed(&self.document.display_name(), &err.to_string(), now);
                }
            }
        }
    }

    /// Polls and performs the autosave against the document store in one go.
    /// Returns whether a save ran and how it went.
    pub fn run_autosave(&mut self, now: Instant) -> Option<bool> {
        let request = self.poll_autosave(now)?;
        let result = self.documents.save(&request.path, &request.content);
        let succeeded = result.is_ok();
        self.complete_save(request, result, now);
        Some(succeeded)
    }

    /// Adds a word and re-derives unknown words and suggestions against the
    /// refreshed dictionary.
    pub fn add_word(
        &mut self,
        word: &str,
        translation: Option<&str>,
        now: Instant,
    ) -> Result<DictionaryEntry> {
        let entry = self.dictionary.add(word, translation)?;
        tracing::info!(word = %entry.word, "dictionary word added");
        self.refresh_dictionary()?;
        self.toasts.push_word_added(&entry.word, now);
        Ok(entry)
    }

    pub fn remove_word(&mut self, id: &Uuid) -> Result<()> {
        self.dictionary.remove(id)?;
        self.refresh_dictionary()
    }

    /// Accepts the highlighted suggestion and counts the use.
    pub fn accept_suggestion(&mut self, now: Instant) -> Option<String> {
        let word = self.model.accept_suggestion(now)?;
        if let Err(err) = self.dictionary.record_use(&word) {
            tracing::warn!(%word, %err, "could not record dictionary use");
        }
        Some(word)
    }

    /// Tab key: inserts the configured indent.
    pub fn insert_tab(&mut self, now: Instant) -> usize {
        let indent = self.settings.settings().editor.indent_unit();
        self.model.insert_literal(&indent, now)
    }

    pub fn set_document_status(&mut self, status: ReviewStatus, now: Instant) {
        if self.document.review_status != status {
            self.document.review_status = status;
            self.model.touch(now);
        }
    }

    pub fn close(&mut self) {
        self.model.cancel_autosave();
        self.find.close();
        tracing::debug!(id = %self.document.id, "closed document");
    }

    pub fn export(&mut self, path: &Path, now: Instant) -> Result<DocumentFormat> {
        self.sync_document();
        match export::save_with_format(path, &self.document) {
            Ok(format) => {
                tracing::info!(path = %path.display(), ?format, "exported document");
                self.toasts
                    .push_export_complete(&path.display().to_string(), now);
                Ok(format)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "export failed");
                self.toasts
                    .push_save_failed(&path.display().to_string(), &err.to_string(), now);
                Err(err)
            }
        }
    }

    pub fn recent_files(&self) -> Vec<PathBuf> {
        self.documents.list_recent().unwrap_or_else(|err| {
            tracing::warn!(%err, "recent files unavailable");
            Vec::new()
        })
    }

    pub fn status_bar(&self) -> StatusBarInfo {
        let (line, column) = self.model.caret_line_column();
        let save_state = if self.model.autosave().is_saving() {
            SaveState::Saving
        } else if self.last_save_failed {
            SaveState::Failed
        } else if self.model.is_dirty() {
            SaveState::Unsaved
        } else {
            SaveState::Saved
        };
        let format = self
            .document
            .file_path
            .as_deref()
            .map(detect_format)
            .unwrap_or(DocumentFormat::Tabital);

        StatusBarInfo {
            document_name: self.document.display_name(),
            word_count: self.model.word_count(),
            character_count: self.model.character_count(),
            unknown_word_count: self.model.unknown_words().len(),
            line,
            column,
            save_state,
            file_format: format.extension().to_ascii_uppercase(),
            encoding: self.encoding.clone(),
        }
    }

    /// Re-runs the search after the query debounce has settled.
    pub fn refresh_find(&mut self, now: Instant) -> bool {
        if !self.find.should_live_update(now) {
            return false;
        }
        self.find.refresh_results(self.model.content());
        true
    }

    pub fn replace_current(&mut self, now: Instant) -> bool {
        match self.find.replace_current(self.model.content()) {
            Some(text) => {
                self.model.on_content_changed(text, now);
                true
            }
            None => false,
        }
    }

    pub fn replace_all(&mut self, now: Instant) -> usize {
        match self.find.replace_all(self.model.content()) {
            Some(text) => {
                self.model.on_content_changed(text, now);
                self.find.last_replaced_count
            }
            None => 0,
        }
    }

    /// Changes one setting by dotted key and applies it to the open document.
    pub fn update_setting(&mut self, key: &str, value: Value) -> Result<()> {
        self.settings.set(key, value)?;
        self.apply_settings();
        Ok(())
    }

    pub fn apply_settings(&mut self) {
        let settings = self.settings.settings();
        self.documents
            .set_recent_limit(usize::from(settings.files.recent_files_count));
        self.model.apply_settings(settings);
    }

    /// Encoding the open document was read as; UTF-8 once it has been saved.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    fn read_document(&self, path: &Path) -> Result<(Document, String)> {
        let decoded = self.documents.load(path)?;
        let document = match detect_format(path) {
            DocumentFormat::Tabital => Document::from_json(&decoded.text, Some(path.to_path_buf()))?,
            _ => Document::from_file(path.to_path_buf(), decoded.text),
        };
        Ok((document, decoded.encoding_name))
    }

    fn switch_to(&mut self, document: Document, encoding: String) {
        self.model.load(document.content.clone());
        self.document = document;
        self.encoding = encoding;
        self.find.close();
        self.last_save_failed = false;
    }

    fn save_to(&mut self, path: &Path, now: Instant) -> Result<()> {
        let result = self
            .serialize_for(path)
            .and_then(|content| self.documents.save(path, &content));

        match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "saved document");
                self.model.mark_saved();
                self.last_save_failed = false;
                self.encoding = UTF_8_NAME.to_string();
                self.remember_recent(path);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "save failed");
                self.last_save_failed = true;
                self.toasts
                    .push_save_failed(&self.document.display_name(), &err.to_string(), now);
                Err(err)
            }
        }
    }

    fn serialize_for(&mut self, path: &Path) -> Result<String> {
        self.sync_document();
        match detect_format(path) {
            DocumentFormat::Tabital => self.document.to_json(),
            DocumentFormat::Html => Ok(export::to_html(&self.document)),
            DocumentFormat::Text | DocumentFormat::Unknown => Ok(self.document.content.clone()),
        }
    }

    fn sync_document(&mut self) {
        if self.document.content != self.model.content() {
            self.document.set_content(self.model.content());
        }
    }

    fn refresh_dictionary(&mut self) -> Result<()> {
        let snapshot = self.dictionary.all_words()?;
        self.model.set_dictionary(snapshot);
        Ok(())
    }

    fn remember_recent(&mut self, path: &Path) {
        if let Err(err) = self.documents.add_recent(path) {
            tracing::warn!(path = %path.display(), %err, "could not update recent files");
        }
    }
}

/// Plain-text statistics for a document body, as shown by `tabital check`.
pub fn describe(
    content: &str,
    dictionary: &Dictionary,
    settings: &Settings,
) -> (usize, usize, Vec<String>) {
    let mut model = ContentModel::with_settings(settings, dictionary.clone());
    model.load(content);
    (
        model.line_numbers().len(),
        document::word_count(content),
        model.unknown_words().iter().cloned().collect(),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::storage::{FileDocumentStore, MemoryDocumentStore};

    type Session = EditorSession<MemoryDocumentStore, Dictionary, Settings>;

    fn session(store: MemoryDocumentStore) -> Session {
        EditorSession::new(store, Dictionary::builtin(), Settings::default())
    }

    #[test]
    fn opens_plain_and_native_documents() {
        let mut doc = Document::new("Deftere").expect("title");
        doc.set_content("salaam kitaab");
        doc.review_status = ReviewStatus::InProgress;
        let json = doc.to_json().expect("json");

        let store = MemoryDocumentStore::new()
            .with_file("notes.txt", "mi yiɗi")
            .with_file("deftere.tab", json);
        let mut s = session(store);
        let now = Instant::now();

        s.open(Path::new("notes.txt"), now).expect("open txt");
        assert_eq!(s.model().content(), "mi yiɗi");
        assert_eq!(s.document().title, "notes");

        s.open(Path::new("deftere.tab"), now).expect("open tab");
        assert_eq!(s.document().review_status, ReviewStatus::InProgress);
        assert_eq!(s.document().id, doc.id);
        assert!(s.model().unknown_words().is_empty());
        assert_eq!(
            s.recent_files(),
            vec![PathBuf::from("deftere.tab"), PathBuf::from("notes.txt")]
        );
    }

    #[test]
    fn save_requires_a_path_and_save_as_sets_one() {
        let mut s = session(MemoryDocumentStore::new());
        let now = Instant::now();
        s.model_mut().on_content_changed("jam", now);

        assert!(matches!(s.save(now), Err(Error::NoFilePath)));
        s.save_as(Path::new("jam.txt"), now).expect("save as");
        assert_eq!(s.documents().get(Path::new("jam.txt")), Some("jam"));
        assert!(!s.model().is_dirty());
        assert_eq!(s.status_bar().save_state, SaveState::Saved);
    }

    #[test]
    fn failed_save_as_keeps_previous_path() {
        let mut s = session(MemoryDocumentStore::new().with_file("a.txt", "a"));
        let now = Instant::now();
        s.open(Path::new("a.txt"), now).expect("open");
        s.documents_mut().set_fail_saves(true);

        assert!(s.save_as(Path::new("b.txt"), now).is_err());
        assert_eq!(s.document().file_path.as_deref(), Some(Path::new("a.txt")));
        assert_eq!(s.status_bar().save_state, SaveState::Failed);
    }

    #[test]
    fn autosave_waits_for_quiet_period() {
        let mut s = session(MemoryDocumentStore::new().with_file("a.txt", ""));
        let t0 = Instant::now();
        s.open(Path::new("a.txt"), t0).expect("open");

        s.model_mut().on_content_changed("j", t0);
        s.model_mut().on_content_changed("ja", t0 + Duration::from_secs(5));
        assert_eq!(s.run_autosave(t0 + Duration::from_secs(10)), None);
        assert_eq!(s.run_autosave(t0 + Duration::from_secs(15)), Some(true));
        assert_eq!(s.documents().save_count(), 1);
        assert_eq!(s.documents().get(Path::new("a.txt")), Some("ja"));
    }

    #[test]
    fn stale_autosave_result_only_releases_timer() {
        let store = MemoryDocumentStore::new()
            .with_file("a.txt", "")
            .with_file("b.txt", "ɓe");
        let mut s = session(store);
        let t0 = Instant::now();
        s.open(Path::new("a.txt"), t0).expect("open");
        s.model_mut().on_content_changed("a", t0);
        let request = s.poll_autosave(t0 + Duration::from_secs(10)).expect("due");

        s.open(Path::new("b.txt"), t0 + Duration::from_secs(11)).expect("open b");
        s.complete_save(request, Err(Error::NoFilePath), t0 + Duration::from_secs(12));
        assert!(s.toasts().entries.is_empty());
        assert!(!s.model().autosave().is_saving());
        assert_eq!(s.status_bar().save_state, SaveState::Saved);
    }

    #[test]
    fn adding_a_word_clears_it_from_unknown_words() {
        let mut s = session(MemoryDocumentStore::new());
        let now = Instant::now();
        s.model_mut().on_content_changed("jaaɓi salaam", now);
        assert!(s.model().unknown_words().contains("jaaɓi"));

        let entry = s.add_word("Jaaɓi", Some("answer"), now).expect("add");
        assert_eq!(entry.word, "jaaɓi");
        assert!(s.model().unknown_words().is_empty());
        assert!(s.add_word("  ", None, now).is_err());

        s.remove_word(&entry.id).expect("remove");
        assert!(s.model().unknown_words().contains("jaaɓi"));
    }

    #[test]
    fn accepting_records_a_use() {
        let mut s = session(MemoryDocumentStore::new());
        let now = Instant::now();
        s.model_mut().on_input("kit", 3, 3, now);

        assert_eq!(s.accept_suggestion(now).as_deref(), Some("kitaab"));
        assert_eq!(s.model().content(), "kitaab");
        assert_eq!(s.dictionary().get("kitaab").map(|e| e.frequency), Some(2));
    }

    #[test]
    fn settings_changes_reach_the_model() {
        let mut s = session(MemoryDocumentStore::new());
        let now = Instant::now();
        s.update_setting("lexicon.spelling_check", Value::Bool(false))
            .expect("set");
        s.model_mut().on_content_changed("unknownword", now);
        assert!(s.model().unknown_words().is_empty());

        s.update_setting("editor.tab_width", Value::from(2)).expect("set");
        s.model_mut().on_caret_moved(11, 11);
        assert_eq!(s.insert_tab(now), 13);
        assert_eq!(s.model().content(), "unknownword  ");
        assert!(s.update_setting("editor.nope", Value::Bool(true)).is_err());
    }

    #[test]
    fn find_and_replace_edits_through_the_model() {
        let mut s = session(MemoryDocumentStore::new());
        let t0 = Instant::now();
        s.model_mut().on_content_changed("salam e salam", t0);
        s.find_mut().open_replace();
        s.find_mut().set_query("salam".to_string(), t0);
        s.find_mut().set_replacement("salaam".to_string());

        assert!(!s.refresh_find(t0));
        assert!(s.refresh_find(t0 + Duration::from_millis(200)));
        assert_eq!(s.find().results.len(), 2);
        assert_eq!(s.replace_all(t0), 2);
        assert_eq!(s.model().content(), "salaam e salaam");
        assert!(s.model().is_dirty());
    }

    #[test]
    fn describe_counts_lines_words_and_unknowns() {
        let (lines, words, unknown) = describe(
            "salaam jaaɓi\nkitaab\n",
            &Dictionary::builtin(),
            &Settings::default(),
        );
        assert_eq!(lines, 3);
        assert_eq!(words, 3);
        assert_eq!(unknown, vec!["jaaɓi".to_string()]);
    }

    #[test]
    fn replace_after_an_edit_uses_the_current_text() {
        let mut s = session(MemoryDocumentStore::new());
        let t0 = Instant::now();
        s.model_mut().on_content_changed("xx ɓɓ salam", t0);
        s.find_mut().open_replace();
        s.find_mut().set_query("salam".to_string(), t0);
        s.find_mut().set_replacement("salaam".to_string());
        assert!(s.refresh_find(t0 + Duration::from_millis(200)));

        s.model_mut().on_content_changed("ɓ", t0 + Duration::from_secs(1));
        assert!(!s.replace_current(t0 + Duration::from_secs(1)));
        assert_eq!(s.model().content(), "ɓ");
        assert!(s.find().results.is_empty());
    }

    #[test]
    fn lexicon_settings_cannot_go_below_minimums() {
        let mut s = session(MemoryDocumentStore::new());
        let now = Instant::now();
        s.update_setting("lexicon.min_unknown_len", Value::from(1))
            .expect("set");
        s.update_setting("lexicon.min_suggest_len", Value::from(1))
            .expect("set");

        s.model_mut().on_input("ab e", 4, 4, now);
        assert!(s.model().unknown_words().is_empty());
        s.model_mut().on_input("s", 1, 1, now);
        assert!(s.model().suggestions().is_empty());
    }

    #[test]
    fn status_bar_reports_the_encoding_a_file_was_read_as() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("legacy.txt");
        std::fs::write(&path, [b'c', b'a', b'f', 0xE9]).expect("write");

        let store = FileDocumentStore::open(dir.path().join("recent.json"), 10);
        let mut s = EditorSession::new(store, Dictionary::builtin(), Settings::default());
        let now = Instant::now();
        assert_eq!(s.status_bar().encoding, "UTF-8");

        s.open(&path, now).expect("open");
        assert_eq!(s.model().content(), "café");
        assert_eq!(s.status_bar().encoding, "windows-1252");

        s.save(now).expect("save");
        assert_eq!(s.encoding(), "UTF-8");
        assert_eq!(std::fs::read(&path).expect("read"), "café".as_bytes());
    }

    #[test]
    fn recent_files_follow_the_configured_count() {
        let mut settings = Settings::default();
        settings.files.recent_files_count = 2;
        let store = MemoryDocumentStore::new()
            .with_file("a.txt", "a")
            .with_file("b.txt", "b")
            .with_file("c.txt", "c");
        let mut s = EditorSession::new(store, Dictionary::builtin(), settings);
        let now = Instant::now();

        for name in ["a.txt", "b.txt", "c.txt"] {
            s.open(Path::new(name), now).expect("open");
        }
        assert_eq!(
            s.recent_files(),
            vec![PathBuf::from("c.txt"), PathBuf::from("b.txt")]
        );

        s.update_setting("files.recent_files_count", Value::from(1))
            .expect("set");
        assert_eq!(s.recent_files(), vec![PathBuf::from("c.txt")]);
    }
}
