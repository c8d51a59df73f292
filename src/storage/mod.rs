//! Where document text lives between sessions.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{
    document::txt::{DecodedText, read_text},
    error::{Error, Result},
};

pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Encoding every store writes, and what in-memory documents report.
pub const UTF_8_NAME: &str = "UTF-8";

/// Persistence collaborator. Paths are opaque keys to the editor core.
pub trait DocumentStore {
    /// Text of the document and the encoding it was read as.
    fn load(&self, path: &Path) -> Result<DecodedText>;
    /// Always writes UTF-8.
    fn save(&mut self, path: &Path, content: &str) -> Result<()>;
    /// Most recent first.
    fn list_recent(&self) -> Result<Vec<PathBuf>>;
    fn add_recent(&mut self, path: &Path) -> Result<()>;
    /// Caps the recent list, dropping the oldest entries.
    fn set_recent_limit(&mut self, limit: usize);
}

fn push_recent(recent: &mut Vec<PathBuf>, path: &Path, limit: usize) {
    recent.retain(|existing| existing != path);
    recent.insert(0, path.to_path_buf());
    recent.truncate(limit);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecentFile {
    #[serde(default)]
    files: Vec<PathBuf>,
}

/// Documents on disk. Reads detect the encoding, writes are UTF-8 and go
/// through a temp file in the same directory so a crash never leaves a
/// half-written document behind.
#[derive(Debug)]
pub struct FileDocumentStore {
    recent_path: PathBuf,
    recent: Vec<PathBuf>,
    recent_limit: usize,
}

impl FileDocumentStore {
    pub fn open_default(recent_limit: usize) -> Self {
        Self::open(recent_path(), recent_limit)
    }

    /// A missing or unreadable recent list starts empty.
    pub fn open(recent_path: impl Into<PathBuf>, recent_limit: usize) -> Self {
        let recent_path = recent_path.into();
        let mut recent = match fs::read_to_string(&recent_path) {
            Ok(data) => match serde_json::from_str::<RecentFile>(&data) {
                Ok(file) => file.files,
                Err(err) => {
                    tracing::warn!(path = %recent_path.display(), %err, "ignoring malformed recent list");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        let recent_limit = recent_limit.max(1);
        recent.truncate(recent_limit);

        Self {
            recent_path,
            recent,
            recent_limit,
        }
    }

    fn persist_recent(&self) -> Result<()> {
        let file = RecentFile {
            files: self.recent.clone(),
        };
        write_atomic(&self.recent_path, &serde_json::to_string_pretty(&file)?)
    }
}

impl DocumentStore for FileDocumentStore {
    fn load(&self, path: &Path) -> Result<DecodedText> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let decoded = read_text(path)?;
        tracing::debug!(path = %path.display(), encoding = %decoded.encoding_name, "loaded document");
        Ok(decoded)
    }

    fn save(&mut self, path: &Path, content: &str) -> Result<()> {
        write_atomic(path, content)
    }

    fn list_recent(&self) -> Result<Vec<PathBuf>> {
        Ok(self.recent.clone())
    }

    fn add_recent(&mut self, path: &Path) -> Result<()> {
        push_recent(&mut self.recent, path, self.recent_limit);
        self.persist_recent()
    }

    fn set_recent_limit(&mut self, limit: usize) {
        self.recent_limit = limit.max(1);
        self.recent.truncate(self.recent_limit);
    }
}

/// Writes `content` next to `path` and renames it into place.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

pub fn recent_path() -> PathBuf {
    if let Some(root) = crate::settings::portable_root() {
        return root.join("recent.json");
    }

    if let Some(base) = dirs::data_dir() {
        base.join("Tabital").join("recent.json")
    } else {
        PathBuf::from("recent.json")
    }
}

/// Documents kept in memory, for hosts without a filesystem and for tests.
/// Everything reads back as UTF-8.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    files: HashMap<PathBuf, String>,
    recent: Vec<PathBuf>,
    recent_limit: usize,
    fail_saves: bool,
    save_count: usize,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self {
            files: HashMap::new(),
            recent: Vec::new(),
            recent_limit: DEFAULT_RECENT_LIMIT,
            fail_saves: false,
            save_count: 0,
        }
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// While set, every `save` fails with an I/O error.
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn load(&self, path: &Path) -> Result<DecodedText> {
        let text = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_path_buf()))?;
        Ok(DecodedText {
            text,
            encoding_name: UTF_8_NAME.to_string(),
        })
    }

    fn save(&mut self, path: &Path, content: &str) -> Result<()> {
        if self.fail_saves {
            return Err(Error::Io(std::io::Error::other("save rejected")));
        }
        self.files.insert(path.to_path_buf(), content.to_string());
        self.save_count += 1;
        Ok(())
    }

    fn list_recent(&self) -> Result<Vec<PathBuf>> {
        Ok(self.recent.clone())
    }

    fn add_recent(&mut self, path: &Path) -> Result<()> {
        push_recent(&mut self.recent, path, self.recent_limit);
        Ok(())
    }

    fn set_recent_limit(&mut self, limit: usize) {
        self.recent_limit = limit.max(1);
        self.recent.truncate(self.recent_limit);
    }
}
