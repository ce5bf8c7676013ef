use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Outcome category of a processed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteKind {
    Success,
    ValidationError,
    /// Subscriber created, but custom field or tag metadata was unavailable
    PartialError,
    RemoteError,
}

/// Severity understood by the entry notes sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteSeverity {
    Success,
    Error,
}

impl NoteKind {
    pub fn severity(&self) -> NoteSeverity {
        match self {
            NoteKind::Success | NoteKind::PartialError => NoteSeverity::Success,
            NoteKind::ValidationError | NoteKind::RemoteError => NoteSeverity::Error,
        }
    }
}

/// Terminal record attached to a processed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeNote {
    pub id: Uuid,
    pub entry_id: u64,
    pub feed_id: u64,
    pub kind: NoteKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl OutcomeNote {
    pub fn new(entry_id: u64, feed_id: u64, kind: NoteKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            entry_id,
            feed_id,
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn severity(&self) -> NoteSeverity {
        self.kind.severity()
    }
}

/// Receives outcome notes keyed by entry id. Write-only and fire-and-forget.
pub trait NoteSink: Send + Sync {
    fn add_note(&self, note: &OutcomeNote);
}

/// Sink keeping notes in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemoryNoteSink {
    notes: Mutex<Vec<OutcomeNote>>,
}

impl MemoryNoteSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> Vec<OutcomeNote> {
        self.lock().clone()
    }

    pub fn notes_for(&self, entry_id: u64) -> Vec<OutcomeNote> {
        self.notes()
            .into_iter()
            .filter(|note| note.entry_id == entry_id)
            .collect()
    }

    // Poisoning never drops notes
    fn lock(&self) -> MutexGuard<'_, Vec<OutcomeNote>> {
        self.notes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NoteSink for MemoryNoteSink {
    fn add_note(&self, note: &OutcomeNote) {
        self.lock().push(note.clone());
    }
}

/// Signalled after a subscriber was created, for the review-prompt feature
pub trait ReviewRequest: Send + Sync {
    fn request_review(&self);
}

/// Review hook that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReviewRequest;

impl ReviewRequest for NoReviewRequest {
    fn request_review(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_severity() {
        assert_eq!(NoteKind::Success.severity(), NoteSeverity::Success);
        assert_eq!(NoteKind::PartialError.severity(), NoteSeverity::Success);
        assert_eq!(NoteKind::ValidationError.severity(), NoteSeverity::Error);
        assert_eq!(NoteKind::RemoteError.severity(), NoteSeverity::Error);
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemoryNoteSink::new();
        sink.add_note(&OutcomeNote::new(1, 9, NoteKind::Success, "ok"));
        sink.add_note(&OutcomeNote::new(2, 9, NoteKind::RemoteError, "failed"));

        assert_eq!(sink.notes().len(), 2);
        let notes = sink.notes_for(2);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, "failed");
    }

    #[test]
    fn test_memory_sink_survives_poisoned_lock() {
        let sink = Arc::new(MemoryNoteSink::new());
        sink.add_note(&OutcomeNote::new(1, 9, NoteKind::Success, "before"));

        let poisoner = Arc::clone(&sink);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.notes.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(sink.notes.is_poisoned());

        sink.add_note(&OutcomeNote::new(2, 9, NoteKind::RemoteError, "after"));

        let messages: Vec<String> = sink.notes().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["before", "after"]);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&NoteKind::ValidationError).unwrap();
        assert_eq!(json, "\"validation-error\"");
    }
}
