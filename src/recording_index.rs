//! Recording status lookup for program cells.
//!
//! Recordings are correlated with programs by exact (channel, start instant)
//! equality. Start times arrive as strings from the recordings source; they
//! are normalized to millisecond instants before keying so that formatting
//! differences ("Z" vs "+00:00", trailing ".000") do not break the match.
//! Unparseable timestamps are treated as "no recording".

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::model::{ChannelId, Recording, RecordingId, RecordingStatus};

/// Status of an active recording as shown on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingEntry {
    pub channel_id: ChannelId,
    pub program_start: DateTime<Utc>,
    /// Always `Scheduled` or `Recording`
    pub status: RecordingStatus,
    pub recording_id: RecordingId,
    pub series: bool,
}

type IndexKey = (ChannelId, i64);

/// O(1) lookup from (channel, program start) to the active recording.
///
/// Rebuilt wholesale whenever the recordings list changes.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatusIndex {
    entries: HashMap<IndexKey, RecordingEntry>,
}

impl RecordingStatusIndex {
    /// Indexes the scheduled and in-progress recordings of `recordings`.
    pub fn build<'a>(recordings: impl IntoIterator<Item = &'a Recording>) -> Self {
        let mut entries = HashMap::new();

        for recording in recordings {
            if !recording.status.is_active() {
                continue;
            }
            let Some(start) = parse_instant(&recording.start_time) else {
                tracing::warn!(
                    recording_id = recording.id,
                    start_time = %recording.start_time,
                    "ignoring recording with unparseable start time"
                );
                continue;
            };

            let entry = RecordingEntry {
                channel_id: recording.channel_id,
                program_start: start,
                status: recording.status,
                recording_id: recording.id,
                series: recording.series,
            };

            // An in-progress recording wins over a stale scheduled duplicate.
            entries
                .entry((recording.channel_id, start.timestamp_millis()))
                .and_modify(|existing: &mut RecordingEntry| {
                    if existing.status != RecordingStatus::Recording {
                        *existing = entry;
                    }
                })
                .or_insert(entry);
        }

        Self { entries }
    }

    /// Active recording for the program starting at `program_start`.
    pub fn status_of(
        &self,
        channel_id: ChannelId,
        program_start: DateTime<Utc>,
    ) -> Option<&RecordingEntry> {
        self.entries.get(&(channel_id, program_start.timestamp_millis()))
    }

    /// Like [`status_of`](Self::status_of) but takes the raw timestamp text.
    pub fn status_of_str(
        &self,
        channel_id: ChannelId,
        program_start: &str,
    ) -> Option<&RecordingEntry> {
        self.status_of(channel_id, parse_instant(program_start)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses an RFC 3339 instant into canonical UTC.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
