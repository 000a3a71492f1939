//! Guide data model: channels, programs, recordings.
//!
//! These are the value types handed to the grid engine by the external
//! channel, guide and recordings sources. All instants are UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Numeric channel identity used by the recordings and mapping APIs.
pub type ChannelId = i64;

/// Numeric program identity.
pub type ProgramId = i64;

/// Numeric recording identity.
pub type RecordingId = i64;

/// A channel as returned by the channel source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    /// EPG key that programs are filed under
    #[serde(rename = "channelId")]
    pub channel_id: String,
    /// Display number, kept as text ("5", "7.1")
    #[serde(deserialize_with = "deserialize_display_number")]
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub group: String,
    #[serde(default, rename = "sourceName")]
    pub source_name: String,
    #[serde(default, rename = "streamUrl")]
    pub stream_url: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, rename = "epgMapped")]
    pub epg_mapped: bool,
}

fn default_true() -> bool {
    true
}

// Servers send the display number either as a JSON number or a string.
fn deserialize_display_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Text(s) => s,
    })
}

/// Boolean markers shown as badges on a program cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramFlags {
    #[serde(rename = "isNew")]
    pub is_new: bool,
    #[serde(rename = "isLive")]
    pub is_live: bool,
    #[serde(rename = "isPremiere")]
    pub is_premiere: bool,
    #[serde(rename = "isFinale")]
    pub is_finale: bool,
}

/// A single guide entry on one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    #[serde(rename = "channelId")]
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub flags: ProgramFlags,
}

impl Program {
    /// A program is usable only when it ends strictly after it starts.
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// True when the program has not started yet at `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start > now
    }

    /// True when `now` falls inside [start, end).
    pub fn is_airing(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Server-side state of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Scheduled,
    Recording,
    Completed,
    Failed,
    Cancelled,
}

impl RecordingStatus {
    /// Only scheduled and in-progress recordings are shown on the grid.
    pub fn is_active(self) -> bool {
        matches!(self, RecordingStatus::Scheduled | RecordingStatus::Recording)
    }
}

/// A recording as returned by the recordings source.
///
/// `start_time` is kept as the raw string the server sent; the status index
/// normalizes it before keying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: RecordingId,
    #[serde(rename = "channelId")]
    pub channel_id: ChannelId,
    #[serde(rename = "startTime")]
    pub start_time: String,
    pub status: RecordingStatus,
    #[serde(default, rename = "programId")]
    pub program_id: Option<ProgramId>,
    #[serde(default)]
    pub series: bool,
}

/// An EPG channel a guide channel can be mapped to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpgCandidate {
    #[serde(rename = "epgSourceId")]
    pub epg_source_id: i64,
    #[serde(rename = "epgChannelId")]
    pub epg_channel_id: String,
    pub name: String,
}

/// Programs for one guide window, keyed by EPG channel key.
///
/// Lists are sorted by start time. Malformed programs never make it in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuideData {
    programs: HashMap<String, Vec<Program>>,
}

impl GuideData {
    /// Groups a flat program list by channel key, dropping malformed entries.
    pub fn from_programs(programs: impl IntoIterator<Item = Program>) -> Self {
        let mut by_channel: HashMap<String, Vec<Program>> = HashMap::new();
        let mut dropped = 0usize;

        for program in programs {
            if !program.is_well_formed() {
                dropped += 1;
                continue;
            }
            by_channel
                .entry(program.channel_id.clone())
                .or_default()
                .push(program);
        }

        for list in by_channel.values_mut() {
            list.sort_by_key(|p| p.start);
        }

        if dropped > 0 {
            tracing::debug!(dropped, "dropped malformed programs from guide data");
        }

        Self { programs: by_channel }
    }

    /// Builds guide data from an already-keyed map, applying the same rules.
    pub fn from_map(map: HashMap<String, Vec<Program>>) -> Self {
        Self::from_programs(map.into_values().flatten())
    }

    /// Programs filed under `channel_key`, or `None` when the guide has no
    /// data for that channel at all.
    pub fn programs_for(&self, channel_key: &str) -> Option<&[Program]> {
        self.programs
            .get(channel_key)
            .filter(|list| !list.is_empty())
            .map(|list| list.as_slice())
    }

    pub fn find_program(&self, channel_key: &str, program_id: ProgramId) -> Option<&Program> {
        self.programs_for(channel_key)?
            .iter()
            .find(|p| p.id == program_id)
    }

    pub fn channel_count(&self) -> usize {
        self.programs.len()
    }

    pub fn program_count(&self) -> usize {
        self.programs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.program_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn program(id: i64, channel: &str, start_h: u32, end_h: u32) -> Program {
        Program {
            id,
            channel_id: channel.to_string(),
            title: format!("Show {}", id),
            subtitle: None,
            description: None,
            start: Utc.with_ymd_and_hms(2024, 1, 1, start_h, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, end_h, 0, 0).unwrap(),
            category: None,
            flags: ProgramFlags::default(),
        }
    }

    #[test]
    fn test_from_programs_drops_malformed_and_sorts() {
        let data = GuideData::from_programs(vec![
            program(2, "a", 12, 13),
            program(1, "a", 10, 11),
            program(3, "a", 14, 14),
            program(4, "b", 9, 8),
        ]);

        let list = data.programs_for("a").unwrap();
        assert_eq!(list.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(data.programs_for("b").is_none());
        assert_eq!(data.program_count(), 2);
    }

    #[test]
    fn test_channel_number_accepts_number_or_string() {
        let json = r#"[
            {"id": 1, "channelId": "one", "number": 5, "name": "Five"},
            {"id": 2, "channelId": "two", "number": "7.1", "name": "Seven"}
        ]"#;
        let channels: Vec<Channel> = serde_json::from_str(json).unwrap();
        assert_eq!(channels[0].number, "5");
        assert_eq!(channels[1].number, "7.1");
        assert!(channels[0].enabled);
        assert!(!channels[0].epg_mapped);
    }

    #[test]
    fn test_program_flags_flatten() {
        let json = r#"{
            "id": 9, "channelId": "c", "title": "News",
            "start": "2024-01-01T10:00:00Z", "end": "2024-01-01T10:30:00Z",
            "isLive": true
        }"#;
        let p: Program = serde_json::from_str(json).unwrap();
        assert!(p.flags.is_live);
        assert!(!p.flags.is_new);
        assert_eq!(p.duration_minutes(), 30);
    }

    #[test]
    fn test_recording_status_active() {
        assert!(RecordingStatus::Scheduled.is_active());
        assert!(RecordingStatus::Recording.is_active());
        assert!(!RecordingStatus::Completed.is_active());
        assert!(!RecordingStatus::Cancelled.is_active());
    }
}
