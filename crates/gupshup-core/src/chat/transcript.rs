//! Append-only display log of a session.

use gupshup_types::chat::TranscriptEntry;

/// Everything a front end shows for a session, in order.
///
/// Entries are never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Entries appended at or after `index`. Out-of-range yields an empty slice.
    pub fn since(&self, index: usize) -> &[TranscriptEntry] {
        self.entries.get(index..).unwrap_or_default()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }
}
