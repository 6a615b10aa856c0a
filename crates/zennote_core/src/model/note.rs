//! Note domain model.
//!
//! # Responsibility
//! - Define the single record type persisted by the note store.
//! - Normalize raw user input into a valid note draft.
//!
//! # Invariants
//! - `title` is never empty; blank titles become `"Untitled"`.
//! - A draft must carry a non-empty title or non-empty content after trimming.
//! - `date` is an ISO-8601 UTC timestamp with millisecond precision.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque note identifier, derived from the creation timestamp.
pub type NoteId = String;

/// Title substituted when the user leaves the title blank.
pub const UNTITLED: &str = "Untitled";

/// User-authored note record.
///
/// Field names match the persisted JSON shape `{id, title, content, date}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique within one store. Never changes after creation.
    pub id: NoteId,
    /// Display title, never empty.
    pub title: String,
    /// Free-form body text. May be empty.
    pub content: String,
    /// Creation or last-edit timestamp as stored.
    pub date: String,
}

impl Note {
    /// Builds a note from a validated draft.
    pub fn from_draft(id: NoteId, draft: NoteDraft, at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            date: format_timestamp(at),
        }
    }

    /// Overwrites title/content/date, keeping the id.
    pub fn apply_draft(&mut self, draft: NoteDraft, at: DateTime<Utc>) {
        self.title = draft.title;
        self.content = draft.content;
        self.date = format_timestamp(at);
    }

    /// Case-insensitive substring match on title or content.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.content.to_lowercase().contains(needle_lower)
    }

    /// Parses `date` back into a UTC timestamp, if well-formed.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date)
    }
}

/// Validated create/update input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    /// Trims both fields and applies the title fallback.
    ///
    /// # Errors
    /// - `NoteValidationError::Empty` when title and content are both blank.
    pub fn new(title: &str, content: &str) -> Result<Self, NoteValidationError> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() && content.is_empty() {
            return Err(NoteValidationError::Empty);
        }

        Ok(Self {
            title: if title.is_empty() {
                UNTITLED.to_string()
            } else {
                title.to_string()
            },
            content: content.to_string(),
        })
    }
}

/// Rejected note input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Both title and content are blank after trimming.
    Empty,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "please add a title or content to your note"),
        }
    }
}

impl Error for NoteValidationError {}

/// Formats a timestamp the way notes persist it (`2024-05-01T09:30:00.000Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a persisted note timestamp.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
