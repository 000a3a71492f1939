//! Thread-safe in-memory backend.
//!
//! Stands in for the guide server: serves channel, guide and recording
//! fetches from owned data and applies recording and mapping mutations.

use anyhow::{anyhow, bail, Result};
use chrono::{Duration, SecondsFormat};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::{
    Channel, ChannelId, EpgCandidate, Program, ProgramId, Recording, RecordingId, RecordingStatus,
};
use crate::time_axis::TimeWindow;
use crate::traits::{
    ChannelSource, GuideResponse, GuideSource, MappingApi, RecordingApi, RecordingSource,
};

/// Longest guide span served by one fetch.
pub const MAX_GUIDE_SPAN_HOURS: i64 = 24;

#[derive(Debug, Default)]
struct BackendState {
    channels: Vec<Channel>,
    programs: Vec<Program>,
    recordings: Vec<Recording>,
    candidates: Vec<EpgCandidate>,
    next_recording_id: RecordingId,
}

impl BackendState {
    fn channel(&self, channel_id: ChannelId) -> Result<&Channel> {
        self.channels
            .iter()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| anyhow!("Unknown channel: {}", channel_id))
    }

    fn channel_mut(&mut self, channel_id: ChannelId) -> Result<&mut Channel> {
        self.channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| anyhow!("Unknown channel: {}", channel_id))
    }

    /// Adds a scheduled recording unless an active one already covers the slot.
    fn schedule(&mut self, channel_id: ChannelId, program: &Program, series: bool) -> RecordingId {
        let start_time = program.start.to_rfc3339_opts(SecondsFormat::Secs, true);
        if let Some(existing) = self.recordings.iter().find(|r| {
            r.channel_id == channel_id && r.status.is_active() && r.start_time == start_time
        }) {
            return existing.id;
        }

        self.next_recording_id += 1;
        let id = self.next_recording_id;
        self.recordings.push(Recording {
            id,
            channel_id,
            start_time,
            status: RecordingStatus::Scheduled,
            program_id: Some(program.id),
            series,
        });
        id
    }
}

pub struct MemoryBackend {
    state: RwLock<BackendState>,
}

impl MemoryBackend {
    pub fn new(
        channels: Vec<Channel>,
        programs: Vec<Program>,
        recordings: Vec<Recording>,
        candidates: Vec<EpgCandidate>,
    ) -> Self {
        let next_recording_id = recordings.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            state: RwLock::new(BackendState {
                channels,
                programs,
                recordings,
                candidates,
                next_recording_id,
            }),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BackendState>> {
        self.state.read().map_err(|_| anyhow!("Backend state lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BackendState>> {
        self.state.write().map_err(|_| anyhow!("Backend state lock poisoned"))
    }

    pub fn channel_count(&self) -> usize {
        self.read().map(|s| s.channels.len()).unwrap_or(0)
    }

    pub fn program_count(&self) -> usize {
        self.read().map(|s| s.programs.len()).unwrap_or(0)
    }
}

impl ChannelSource for MemoryBackend {
    fn fetch_channels(&self) -> Result<Vec<Channel>> {
        let state = self.read()?;
        Ok(state.channels.iter().filter(|c| c.enabled).cloned().collect())
    }
}

impl GuideSource for MemoryBackend {
    fn fetch_guide(&self, window: TimeWindow) -> Result<GuideResponse> {
        let state = self.read()?;

        let end = match window.start().checked_add_signed(Duration::hours(MAX_GUIDE_SPAN_HOURS)) {
            Some(cap) => window.end().min(cap),
            None => window.end(),
        };
        if end < window.end() {
            tracing::debug!(requested_end = %window.end(), served_end = %end, "guide span capped");
        }

        let mut response = GuideResponse::new();
        for program in &state.programs {
            if program.end > window.start() && program.start < end {
                response
                    .entry(program.channel_id.clone())
                    .or_default()
                    .push(program.clone());
            }
        }
        Ok(response)
    }
}

impl RecordingSource for MemoryBackend {
    fn fetch_recordings(&self) -> Result<Vec<Recording>> {
        Ok(self.read()?.recordings.clone())
    }
}

impl RecordingApi for MemoryBackend {
    fn create_recording(
        &self,
        channel_id: ChannelId,
        program_id: ProgramId,
        series: bool,
    ) -> Result<RecordingId> {
        let mut state = self.write()?;

        let key = state.channel(channel_id)?.channel_id.clone();
        let Some(program) = state
            .programs
            .iter()
            .find(|p| p.channel_id == key && p.id == program_id)
            .cloned()
        else {
            bail!("Program {} not found on channel {}", program_id, channel_id);
        };

        let id = state.schedule(channel_id, &program, series);

        if series {
            let episodes: Vec<Program> = state
                .programs
                .iter()
                .filter(|p| {
                    p.channel_id == key && p.title == program.title && p.start > program.start
                })
                .cloned()
                .collect();
            for episode in &episodes {
                state.schedule(channel_id, episode, true);
            }
            tracing::info!(
                channel_id,
                program_id,
                episodes = episodes.len() + 1,
                "scheduled series recording"
            );
        } else {
            tracing::info!(channel_id, program_id, recording_id = id, "scheduled recording");
        }

        Ok(id)
    }

    fn cancel_recording(&self, recording_id: RecordingId) -> Result<()> {
        let mut state = self.write()?;
        let before = state.recordings.len();
        state.recordings.retain(|r| r.id != recording_id);
        if state.recordings.len() == before {
            bail!("Recording {} not found", recording_id);
        }
        tracing::info!(recording_id, "cancelled recording");
        Ok(())
    }
}

impl MappingApi for MemoryBackend {
    fn mapping_candidates(&self, channel_id: ChannelId) -> Result<Vec<EpgCandidate>> {
        let state = self.read()?;
        let name = state.channel(channel_id)?.name.to_lowercase();

        // Candidates sharing a word with the channel name first
        let mut candidates = state.candidates.clone();
        candidates.sort_by_key(|c| {
            let candidate = c.name.to_lowercase();
            !name.split_whitespace().any(|word| candidate.contains(word))
        });
        Ok(candidates)
    }

    fn map_channel(
        &self,
        channel_id: ChannelId,
        epg_source_id: i64,
        epg_channel_id: &str,
    ) -> Result<()> {
        let mut state = self.write()?;
        if !state
            .candidates
            .iter()
            .any(|c| c.epg_source_id == epg_source_id && c.epg_channel_id == epg_channel_id)
        {
            bail!("No EPG channel {} in source {}", epg_channel_id, epg_source_id);
        }

        let channel = state.channel_mut(channel_id)?;
        channel.channel_id = epg_channel_id.to_string();
        channel.epg_mapped = true;
        tracing::info!(channel_id, epg_source_id, epg_channel_id, "mapped channel");
        Ok(())
    }

    fn unmap_channel(&self, channel_id: ChannelId) -> Result<()> {
        let mut state = self.write()?;
        let channel = state.channel_mut(channel_id)?;
        channel.channel_id.clear();
        channel.epg_mapped = false;
        tracing::info!(channel_id, "unmapped channel");
        Ok(())
    }
}
