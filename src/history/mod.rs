//! In-memory download history
//!
//! The history lives for the lifetime of the process and keeps only the
//! most recent [`HISTORY_LIMIT`] records, newest first.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

use crate::utils::format::truncate_label;

/// Maximum number of records kept
pub const HISTORY_LIMIT: usize = 50;

/// Titles longer than this are shortened with `...`
pub const TITLE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryKind {
    Video,
    Audio,
    Image,
    Thumbnail,
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HistoryKind::Video => "Video",
            HistoryKind::Audio => "Audio",
            HistoryKind::Image => "Image",
            HistoryKind::Thumbnail => "Thumbnail",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub kind: HistoryKind,
    pub title: String,
    pub file_name: String,
    pub downloaded_at: DateTime<Local>,
}

impl HistoryRecord {
    pub fn new(kind: HistoryKind, title: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: truncate_label(&title.into(), TITLE_LIMIT),
            file_name: file_name.into(),
            downloaded_at: Local::now(),
        }
    }
}

/// Bounded, newest-first list of past downloads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    records: VecDeque<HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure bounded insertion: returns the history with `record` at the
    /// front and the oldest entries dropped past the limit.
    #[must_use]
    pub fn inserted(mut self, record: HistoryRecord) -> Self {
        self.records.push_front(record);
        self.records.truncate(HISTORY_LIMIT);
        self
    }

    pub fn push(&mut self, record: HistoryRecord) {
        *self = std::mem::take(self).inserted(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records, newest first
    pub fn records(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> HistoryStats {
        let mut by_kind: Vec<KindCount> = Vec::new();
        for record in &self.records {
            match by_kind.iter_mut().find(|c| c.kind == record.kind) {
                Some(entry) => entry.count += 1,
                None => by_kind.push(KindCount {
                    kind: record.kind,
                    count: 1,
                }),
            }
        }

        let most_common = by_kind
            .iter()
            .copied()
            .reduce(|best, c| if c.count > best.count { c } else { best })
            .map(|c| c.kind);

        HistoryStats {
            total: self.records.len(),
            by_kind,
            most_common,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub kind: HistoryKind,
    pub count: usize,
}

/// Aggregates for the statistics view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    /// Counts in order of first appearance, newest first
    pub by_kind: Vec<KindCount>,
    pub most_common: Option<HistoryKind>,
}
