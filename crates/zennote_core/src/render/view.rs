//! List and detail projections consumed by UI adapters.

use super::dates::{format_card_date, format_detail_date};
use super::html::{escape_html, format_detail, format_summary};
use crate::kv::KeyValueStore;
use crate::model::note::{Note, NoteId};
use crate::store::note_store::NoteStore;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Why a list rendered no cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The store holds no notes at all.
    NoNotes,
    /// A non-empty filter matched nothing.
    NoMatches,
}

impl EmptyState {
    pub fn heading(self) -> &'static str {
        match self {
            Self::NoNotes => "No notes yet",
            Self::NoMatches => "No notes found",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::NoNotes => "Create your first note to get started!",
            Self::NoMatches => "Try a different search term",
        }
    }
}

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: NoteId,
    pub title_html: String,
    pub date_label: String,
    pub summary_html: String,
}

/// Rendered list for one filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesView {
    pub cards: Vec<NoteCard>,
    /// Set exactly when `cards` is empty.
    pub empty_state: Option<EmptyState>,
}

/// Rendered single-note detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDetail {
    pub id: NoteId,
    pub title_html: String,
    pub date_label: String,
    pub body_html: String,
}

/// Builds the card list for `filter`, with labels relative to `now`.
pub fn notes_view<S, Tz>(store: &NoteStore<S>, filter: Option<&str>, now: &DateTime<Tz>) -> NotesView
where
    S: KeyValueStore,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let cards = store
        .iter(filter)
        .map(|note| NoteCard {
            id: note.id.clone(),
            title_html: escape_html(&note.title),
            date_label: format_card_date(&note.date, now),
            summary_html: format_summary(&note.content),
        })
        .collect::<Vec<_>>();

    let empty_state = if !cards.is_empty() {
        None
    } else if filter.is_some_and(|value| !value.is_empty()) {
        Some(EmptyState::NoMatches)
    } else {
        Some(EmptyState::NoNotes)
    };

    NotesView { cards, empty_state }
}

/// Builds the detail view of one note, with the date rendered in `tz`.
pub fn note_detail<Tz>(note: &Note, tz: &Tz) -> NoteDetail
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    NoteDetail {
        id: note.id.clone(),
        title_html: escape_html(&note.title),
        date_label: format_detail_date(&note.date, tz),
        body_html: format_detail(&note.content),
    }
}

#[cfg(test)]
mod tests {
    use super::{note_detail, notes_view, EmptyState};
    use crate::kv::MemoryKvStore;
    use crate::store::note_store::NoteStore;
    use chrono::{TimeZone, Utc};

    #[test]
    fn empty_store_reports_no_notes() {
        let store = NoteStore::load(MemoryKvStore::new());
        let view = notes_view(&store, None, &Utc::now());
        assert!(view.cards.is_empty());
        assert_eq!(view.empty_state, Some(EmptyState::NoNotes));
        assert_eq!(EmptyState::NoNotes.heading(), "No notes yet");
    }

    #[test]
    fn unmatched_filter_reports_no_matches() {
        let mut store = NoteStore::load(MemoryKvStore::new());
        store.create("groceries", "milk").unwrap();

        let view = notes_view(&store, Some("zzz"), &Utc::now());
        assert_eq!(view.empty_state, Some(EmptyState::NoMatches));

        let all = notes_view(&store, Some(""), &Utc::now());
        assert_eq!(all.cards.len(), 1);
        assert_eq!(all.empty_state, None);
    }

    #[test]
    fn cards_escape_titles() {
        let mut store = NoteStore::load(MemoryKvStore::new());
        store.create("<script>", "a\nb").unwrap();

        let view = notes_view(&store, None, &Utc::now());
        assert_eq!(view.cards[0].title_html, "&lt;script&gt;");
        assert_eq!(view.cards[0].summary_html, "a<br>b");
        assert!(view.cards[0].date_label.starts_with("Today, "));
    }

    #[test]
    fn detail_renders_markdown_body() {
        let mut store = NoteStore::load(MemoryKvStore::new())
            .with_clock(|| Utc.with_ymd_and_hms(2024, 5, 1, 9, 5, 0).unwrap());
        let note = store.create("Plan", "# Hi\n\n- one").unwrap();

        let detail = note_detail(&note, &Utc);
        assert_eq!(detail.body_html, "<p><h1>Hi</h1></p><p><ul><li>one</li></ul></p>");
        assert_eq!(detail.date_label, "Wednesday, May 1, 2024 at 09:05 AM");
    }
}
