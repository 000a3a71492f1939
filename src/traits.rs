//! Contracts for the external collaborators the guide consumes.
//!
//! The grid engine never talks to a server itself. Channel, guide and
//! recording fetches and the recording/mapping mutations are supplied through
//! these traits; the GUI runs them on a worker thread and posts the results
//! back to the controller.

use std::collections::HashMap;

use crate::model::{Channel, ChannelId, EpgCandidate, Program, ProgramId, Recording, RecordingId};
use crate::time_axis::TimeWindow;

/// Programs keyed by EPG channel key, as returned by a guide fetch.
pub type GuideResponse = HashMap<String, Vec<Program>>;

/// Source of the enabled channel list.
pub trait ChannelSource {
    /// Returns every enabled channel, already sorted by display number
    fn fetch_channels(&self) -> anyhow::Result<Vec<Channel>>;
}

/// Source of program data for a time window.
pub trait GuideSource {
    /// Returns programs intersecting `window`, keyed by channel key.
    ///
    /// Implementations may cap the span they serve; callers must not assume
    /// the response covers an arbitrarily long window.
    fn fetch_guide(&self, window: TimeWindow) -> anyhow::Result<GuideResponse>;
}

/// Source of the recording list.
pub trait RecordingSource {
    fn fetch_recordings(&self) -> anyhow::Result<Vec<Recording>>;
}

/// Recording mutations.
pub trait RecordingApi {
    /// Schedules a recording of `program_id`, or of every upcoming episode
    /// when `series` is set. Returns the id of the recording created for
    /// `program_id` itself.
    fn create_recording(
        &self,
        channel_id: ChannelId,
        program_id: ProgramId,
        series: bool,
    ) -> anyhow::Result<RecordingId>;

    fn cancel_recording(&self, recording_id: RecordingId) -> anyhow::Result<()>;
}

/// EPG mapping mutations.
pub trait MappingApi {
    /// EPG channels the given channel could be mapped to
    fn mapping_candidates(&self, channel_id: ChannelId) -> anyhow::Result<Vec<EpgCandidate>>;

    fn map_channel(
        &self,
        channel_id: ChannelId,
        epg_source_id: i64,
        epg_channel_id: &str,
    ) -> anyhow::Result<()>;

    fn unmap_channel(&self, channel_id: ChannelId) -> anyhow::Result<()>;
}

/// Everything the GUI needs from one backend.
///
/// Must be `Send + Sync` so fetches can run on a worker thread.
pub trait GuideBackend:
    ChannelSource + GuideSource + RecordingSource + RecordingApi + MappingApi + Send + Sync
{
}

impl<T> GuideBackend for T where
    T: ChannelSource + GuideSource + RecordingSource + RecordingApi + MappingApi + Send + Sync
{
}
