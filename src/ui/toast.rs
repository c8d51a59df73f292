use std::time::{Duration, Instant};

const MAX_VISIBLE: usize = 4;
const DEFAULT_TTL: Duration = Duration::from_secs(4);
const ERROR_TTL: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastEntry {
    pub id: u64,
    pub level: ToastLevel,
    pub title: String,
    pub body: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl ToastEntry {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

/// Notification stack, newest first. The host draws it; this only tracks
/// what is showing and for how long.
#[derive(Debug, Default)]
pub struct Toast {
    next_id: u64,
    pub entries: Vec<ToastEntry>,
}

impl Toast {
    pub fn push(
        &mut self,
        level: ToastLevel,
        title: impl Into<String>,
        body: impl Into<String>,
        now: Instant,
    ) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;

        let entry = ToastEntry {
            id,
            level,
            title: title.into(),
            body: body.into(),
            created_at: now,
            ttl: if level == ToastLevel::Error {
                ERROR_TTL
            } else {
                DEFAULT_TTL
            },
        };

        self.entries.insert(0, entry);
        self.entries.truncate(MAX_VISIBLE);
        id
    }

    pub fn push_export_complete(&mut self, path: &str, now: Instant) {
        self.push(
            ToastLevel::Success,
            "Export completed",
            format!("Saved to {}", path),
            now,
        );
    }

    pub fn push_save_failed(&mut self, name: &str, reason: &str, now: Instant) {
        self.push(
            ToastLevel::Error,
            "Save failed",
            format!("{}: {}", name, reason),
            now,
        );
    }

    pub fn push_open_failed(&mut self, path: &str, reason: &str, now: Instant) {
        self.push(
            ToastLevel::Error,
            "Could not open file",
            format!("{}: {}", path, reason),
            now,
        );
    }

    pub fn push_word_added(&mut self, word: &str, now: Instant) {
        self.push(
            ToastLevel::Success,
            "Word added",
            format!("\"{}\" is now in the dictionary", word),
            now,
        );
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn tick(&mut self, now: Instant) {
        self.entries.retain(|entry| !entry.is_expired(now));
    }

    pub fn latest(&self) -> Option<&ToastEntry> {
        self.entries.first()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == ToastLevel::Error)
    }
}
