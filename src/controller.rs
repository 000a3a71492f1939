//! Guide orchestration.
//!
//! `GuideController` owns the current time window, the fetched channel,
//! guide and recording data, the filter criteria and the scroll state, and
//! composes them into a [`GuideFrame`] for rendering.
//!
//! Fetches are not performed here. Every change that needs data queues a
//! [`FetchRequest`]; the host executes it (usually on a worker thread) and
//! hands the [`FetchOutcome`] back through [`GuideController::apply`]. Guide
//! requests carry the window generation they were issued for and channel and
//! recording requests carry a token, so a completion that was superseded
//! while in flight is dropped instead of overwriting newer state.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use std::sync::Arc;

use crate::channel_filter::{self, FilterCriteria, Selection, UnmappedCounts};
use crate::config::GuideConfig;
use crate::error::GuideError;
use crate::layout::{self, ProgramCell, ProgramLayoutCalculator, RowContent};
use crate::model::{
    Channel, ChannelId, EpgCandidate, GuideData, Program, ProgramId, Recording, RecordingId,
};
use crate::now_indicator::{Clock, NowIndicator, NowIndicatorTracker};
use crate::recording_index::{RecordingEntry, RecordingStatusIndex};
use crate::scroll::{ScrollCoordinator, ScrollOffset, ScrollSurface};
use crate::time_axis::{Slot, TimeAxis, TimeWindow};
use crate::traits::{
    ChannelSource, GuideResponse, GuideSource, MappingApi, RecordingApi, RecordingSource,
};
use crate::virtualizer::{self, RowVirtualizer, VisibleRowRange};

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Fetch state of one remote resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Retryable failure with a human-readable message
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A fetch the host should run against its backend.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Channels { token: u64 },
    Guide { generation: u64, window: TimeWindow },
    Recordings { token: u64 },
}

impl FetchRequest {
    /// Runs the request. Blocking; call it off the UI thread.
    pub fn execute<B>(&self, backend: &B) -> FetchOutcome
    where
        B: ChannelSource + GuideSource + RecordingSource + ?Sized,
    {
        match *self {
            FetchRequest::Channels { token } => FetchOutcome::Channels {
                token,
                result: backend.fetch_channels(),
            },
            FetchRequest::Guide { generation, window } => FetchOutcome::Guide {
                generation,
                window,
                result: backend.fetch_guide(window),
            },
            FetchRequest::Recordings { token } => FetchOutcome::Recordings {
                token,
                result: backend.fetch_recordings(),
            },
        }
    }
}

/// Completion of a [`FetchRequest`].
#[derive(Debug)]
pub enum FetchOutcome {
    Channels {
        token: u64,
        result: anyhow::Result<Vec<Channel>>,
    },
    Guide {
        generation: u64,
        window: TimeWindow,
        result: anyhow::Result<GuideResponse>,
    },
    Recordings {
        token: u64,
        result: anyhow::Result<Vec<Recording>>,
    },
}

/// Action offered for a selected program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramAction {
    Schedule,
    ScheduleSeries,
    Cancel { recording_id: RecordingId },
}

/// Everything the details panel shows for the selected program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramDetail {
    pub channel: Channel,
    pub program: Program,
    pub recording: Option<RecordingEntry>,
    pub airing: bool,
    pub upcoming: bool,
    /// Empty unless the program is upcoming
    pub actions: Vec<ProgramAction>,
}

/// Overall state of the guide, for the body placeholder and status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideStatus {
    /// Nothing requested yet
    Idle,
    Loading,
    Error(String),
    /// Channels loaded, but none pass the filter
    NoChannels,
    Ready,
}

/// A program cell plus the per-program state it is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideCell<'a> {
    pub cell: ProgramCell<'a>,
    pub recording: Option<RecordingEntry>,
    pub airing: bool,
    pub selected: bool,
}

/// Content of one channel row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowCells<'a> {
    /// Guide data for the current window has not arrived
    Pending,
    Programs(Vec<GuideCell<'a>>),
    NoProgramsInWindow,
    NoGuideData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuideRow<'a> {
    /// Position in the filtered channel list
    pub index: usize,
    pub top_px: f32,
    pub channel: &'a Channel,
    pub cells: RowCells<'a>,
}

/// Everything needed to paint one frame of the guide.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideFrame<'a> {
    pub axis: TimeAxis,
    pub slots: Vec<Slot>,
    pub content_width: f32,
    pub content_height: f32,
    pub row_height: f32,
    pub total_rows: usize,
    pub visible: VisibleRowRange,
    pub top_padding: f32,
    pub bottom_padding: f32,
    pub rows: Vec<GuideRow<'a>>,
    pub now: NowIndicator,
    pub scroll: ScrollOffset,
    pub status: GuideStatus,
}

pub struct GuideController {
    config: GuideConfig,
    clock: Arc<dyn Clock>,
    utc_offset: FixedOffset,

    // ===== Window =====
    axis: TimeAxis,
    generation: u64,

    // ===== Fetched data =====
    channels: Vec<Channel>,
    channels_state: LoadState,
    channel_token: u64,
    guide: GuideData,
    guide_state: LoadState,
    /// Whether `guide` belongs to the current window
    guide_current: bool,
    recordings: Vec<Recording>,
    recording_index: RecordingStatusIndex,
    recordings_state: LoadState,
    recording_token: u64,

    // ===== Derived view state =====
    criteria: FilterCriteria,
    filtered: Vec<usize>,
    scroll: ScrollCoordinator,
    virtualizer: RowVirtualizer,
    calculator: ProgramLayoutCalculator,
    now: NowIndicatorTracker,
    selection: Option<(ChannelId, ProgramId)>,
    mutation_error: Option<GuideError>,

    pending: Vec<FetchRequest>,
}

impl GuideController {
    /// Creates a controller whose window starts at the current hour.
    ///
    /// Nothing is fetched until [`reload`](Self::reload) is called.
    pub fn new(config: GuideConfig, clock: Arc<dyn Clock>) -> Result<Self, GuideError> {
        config.validate()?;
        let utc_offset = config.utc_offset().unwrap_or_else(|| Utc.fix());

        let start = floor_to_hour(clock.now(), utc_offset);
        let window = TimeWindow::from_hours(start, config.window_hours)?;
        let axis = TimeAxis::new(window, config.pixels_per_minute, config.slot_minutes)
            .with_utc_offset(utc_offset);

        let mut controller = Self {
            virtualizer: RowVirtualizer::new(config.row_height_px, config.overscan_rows),
            calculator: ProgramLayoutCalculator::new(config.min_cell_width_px),
            now: NowIndicatorTracker::new(config.now_tick()),
            config,
            clock,
            utc_offset,
            axis,
            generation: 0,
            channels: Vec::new(),
            channels_state: LoadState::Idle,
            channel_token: 0,
            guide: GuideData::default(),
            guide_state: LoadState::Idle,
            guide_current: false,
            recordings: Vec::new(),
            recording_index: RecordingStatusIndex::default(),
            recordings_state: LoadState::Idle,
            recording_token: 0,
            criteria: FilterCriteria::default(),
            filtered: Vec::new(),
            scroll: ScrollCoordinator::new(),
            selection: None,
            mutation_error: None,
            pending: Vec::new(),
        };
        controller.update_extents();
        controller.tick();
        Ok(controller)
    }

    // ===== Queries =====

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    pub fn window(&self) -> TimeWindow {
        self.axis.window()
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channels passing the current filter, in display order.
    pub fn filtered_channels(&self) -> impl Iterator<Item = &Channel> + '_ {
        self.filtered.iter().filter_map(|&i| self.channels.get(i))
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn guide(&self) -> &GuideData {
        &self.guide
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    pub fn recording_index(&self) -> &RecordingStatusIndex {
        &self.recording_index
    }

    pub fn channels_state(&self) -> &LoadState {
        &self.channels_state
    }

    pub fn guide_state(&self) -> &LoadState {
        &self.guide_state
    }

    pub fn recordings_state(&self) -> &LoadState {
        &self.recordings_state
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn scroll(&self) -> &ScrollCoordinator {
        &self.scroll
    }

    pub fn mutation_error(&self) -> Option<&GuideError> {
        self.mutation_error.as_ref()
    }

    pub fn now_indicator(&self) -> NowIndicator {
        self.now.current()
    }

    pub fn groups(&self) -> Vec<String> {
        channel_filter::groups(&self.channels)
    }

    pub fn sources(&self) -> Vec<String> {
        channel_filter::sources(&self.channels)
    }

    pub fn unmapped_counts(&self) -> UnmappedCounts {
        channel_filter::unmapped_counts(&self.channels, |c| self.has_epg_data(c))
    }

    /// A channel has EPG data when it is mapped to an EPG channel, or when
    /// the current window's guide lists programs for it anyway. A mapped
    /// channel whose programs all fall outside the window still counts.
    pub fn has_epg_data(&self, channel: &Channel) -> bool {
        has_epg_data(channel, &self.guide, self.guide_current)
    }

    pub fn status(&self) -> GuideStatus {
        for (name, state) in [
            ("channels", &self.channels_state),
            ("guide", &self.guide_state),
            ("recordings", &self.recordings_state),
        ] {
            if let Some(message) = state.error() {
                return GuideStatus::Error(format!("Failed to load {}: {}", name, message));
            }
        }

        match self.channels_state {
            LoadState::Idle => GuideStatus::Idle,
            LoadState::Loading if self.channels.is_empty() => GuideStatus::Loading,
            _ if self.filtered.is_empty() => GuideStatus::NoChannels,
            _ => GuideStatus::Ready,
        }
    }

    /// True while any fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.channels_state.is_loading()
            || self.guide_state.is_loading()
            || self.recordings_state.is_loading()
    }

    // ===== Fetch lifecycle =====

    /// Discards everything and refetches channels, guide and recordings.
    pub fn reload(&mut self) {
        self.pending.clear();
        self.channels.clear();
        self.recordings.clear();
        self.recording_index = RecordingStatusIndex::default();
        self.selection = None;
        self.mutation_error = None;

        self.request_channels();
        self.request_recordings();
        self.begin_window(self.axis.window());
        self.refilter();
    }

    /// Hands over the requests queued since the last call.
    pub fn take_pending_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Applies a fetch completion. Returns `false` when it was superseded.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        match outcome {
            FetchOutcome::Channels { token, result } => self.apply_channels(token, result),
            FetchOutcome::Guide { generation, result, .. } => self.apply_guide(generation, result),
            FetchOutcome::Recordings { token, result } => self.apply_recordings(token, result),
        }
    }

    pub fn apply_channels(&mut self, token: u64, result: anyhow::Result<Vec<Channel>>) -> bool {
        if token != self.channel_token {
            tracing::debug!(
                token,
                current = self.channel_token,
                "discarding superseded channel fetch"
            );
            return false;
        }
        match result {
            Ok(channels) => {
                tracing::info!(count = channels.len(), "channels loaded");
                self.channels = channels;
                self.channels_state = LoadState::Ready;
                self.refilter();
            }
            Err(e) => {
                tracing::warn!("channel fetch failed: {:#}", e);
                self.channels_state = LoadState::Failed(format!("{:#}", e));
            }
        }
        true
    }

    pub fn apply_guide(&mut self, generation: u64, result: anyhow::Result<GuideResponse>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding guide fetch for superseded window"
            );
            return false;
        }
        match result {
            Ok(response) => {
                self.guide = GuideData::from_map(response);
                self.guide_current = true;
                self.guide_state = LoadState::Ready;
                tracing::info!(
                    generation,
                    channels = self.guide.channel_count(),
                    programs = self.guide.program_count(),
                    "guide loaded"
                );
                if self.criteria.unmapped_only {
                    self.refilter();
                }
            }
            Err(e) => {
                tracing::warn!(generation, "guide fetch failed: {:#}", e);
                self.guide_state = LoadState::Failed(format!("{:#}", e));
            }
        }
        true
    }

    pub fn apply_recordings(&mut self, token: u64, result: anyhow::Result<Vec<Recording>>) -> bool {
        if token != self.recording_token {
            tracing::debug!(
                token,
                current = self.recording_token,
                "discarding superseded recordings fetch"
            );
            return false;
        }
        match result {
            Ok(recordings) => {
                self.recording_index = RecordingStatusIndex::build(&recordings);
                self.recordings = recordings;
                self.recordings_state = LoadState::Ready;
            }
            Err(e) => {
                tracing::warn!("recordings fetch failed: {:#}", e);
                self.recordings_state = LoadState::Failed(format!("{:#}", e));
            }
        }
        true
    }

    /// Re-issues every failed fetch. Returns how many were queued.
    pub fn retry(&mut self) -> usize {
        let mut queued = 0;
        if self.channels_state.error().is_some() {
            self.request_channels();
            queued += 1;
        }
        if self.guide_state.error().is_some() {
            self.request_guide();
            queued += 1;
        }
        if self.recordings_state.error().is_some() {
            self.request_recordings();
            queued += 1;
        }
        if queued > 0 {
            tracing::info!(queued, "retrying failed fetches");
        }
        queued
    }

    fn request_channels(&mut self) {
        self.channel_token += 1;
        self.channels_state = LoadState::Loading;
        self.pending.push(FetchRequest::Channels {
            token: self.channel_token,
        });
    }

    fn request_recordings(&mut self) {
        self.recording_token += 1;
        self.recordings_state = LoadState::Loading;
        self.pending.push(FetchRequest::Recordings {
            token: self.recording_token,
        });
    }

    /// Bumps the generation and queues a guide fetch for the current window.
    fn request_guide(&mut self) {
        self.generation += 1;
        self.guide_state = LoadState::Loading;
        self.pending.push(FetchRequest::Guide {
            generation: self.generation,
            window: self.axis.window(),
        });
    }

    // ===== Window navigation =====

    /// Moves the window by `hours` (negative moves back). A shift past the
    /// representable calendar leaves the current window in place.
    pub fn shift_window(&mut self, hours: i64) -> Result<(), GuideError> {
        let window = self.axis.window().shifted_hours(hours)?;
        self.begin_window(window);
        self.scroll.set_x(0.0);
        Ok(())
    }

    pub fn previous_window(&mut self) -> Result<(), GuideError> {
        self.shift_window(-i64::from(self.config.window_hours))
    }

    pub fn next_window(&mut self) -> Result<(), GuideError> {
        self.shift_window(i64::from(self.config.window_hours))
    }

    /// Starts the window at the current hour and scrolls to now.
    pub fn jump_to_now(&mut self) -> Result<(), GuideError> {
        let now = self.clock.now();
        let start = floor_to_hour(now, self.utc_offset);
        let window = TimeWindow::from_hours(start, self.config.window_hours)?;
        self.begin_window(window);
        self.scroll.scroll_to_now(&self.axis, now);
        Ok(())
    }

    /// Starts the window at local midnight of `date`.
    pub fn jump_to_date(&mut self, date: NaiveDate) -> Result<(), GuideError> {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .and_then(|local| self.utc_offset.from_local_datetime(&local).single())
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                GuideError::InvalidConfig(format!("cannot place {} in the configured zone", date))
            })?;
        let window = TimeWindow::from_hours(midnight, self.config.window_hours)?;
        self.begin_window(window);
        self.scroll.set_x(0.0);
        Ok(())
    }

    /// Switches to `window`: old guide data is dropped so it is never drawn
    /// against the new axis, and a fetch for the new window is queued.
    fn begin_window(&mut self, window: TimeWindow) {
        tracing::info!(start = %window.start(), end = %window.end(), "guide window changed");

        self.axis = TimeAxis::new(window, self.config.pixels_per_minute, self.config.slot_minutes)
            .with_utc_offset(self.utc_offset);
        self.guide = GuideData::default();
        self.guide_current = false;
        self.selection = None;
        self.pending.retain(|r| !matches!(r, FetchRequest::Guide { .. }));
        self.request_guide();

        if self.criteria.unmapped_only {
            self.refilter();
        }
        self.update_extents();
        self.now.invalidate();
        self.tick();
    }

    // ===== Filtering =====

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.refilter();
        }
    }

    pub fn set_group(&mut self, group: Selection) {
        let criteria = FilterCriteria { group, ..self.criteria.clone() };
        self.set_criteria(criteria);
    }

    pub fn set_source(&mut self, source: Selection) {
        let criteria = FilterCriteria { source, ..self.criteria.clone() };
        self.set_criteria(criteria);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let criteria = FilterCriteria {
            search: search.into(),
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    pub fn set_unmapped_only(&mut self, unmapped_only: bool) {
        let criteria = FilterCriteria {
            unmapped_only,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    /// Recomputes the filtered list, then the extents so the vertical scroll
    /// never points past the new last row.
    fn refilter(&mut self) {
        let guide = &self.guide;
        let guide_current = self.guide_current;
        let filtered = channel_filter::filter_indices(&self.channels, &self.criteria, |c| {
            has_epg_data(c, guide, guide_current)
        });
        self.filtered = filtered;
        self.update_extents();
    }

    // ===== Scrolling =====

    /// Records the body viewport size.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let content_width = self.axis.total_width();
        let content_height = self.virtualizer.content_height(self.filtered.len());
        self.scroll.set_extents(content_width, content_height, width, height);
    }

    fn update_extents(&mut self) {
        let (width, height) = (self.scroll.viewport_width(), self.scroll.viewport_height());
        self.set_viewport(width, height);
    }

    pub fn on_scroll(&mut self, surface: ScrollSurface, offset: ScrollOffset) -> bool {
        self.scroll.on_scroll(surface, offset)
    }

    /// Feeds back the offsets the surfaces displayed at the end of a frame
    /// drawn at `shown`. See [`ScrollCoordinator::reconcile_frame`].
    pub fn reconcile_scroll(
        &mut self,
        shown: ScrollOffset,
        header_x: f32,
        sidebar_y: f32,
        body: ScrollOffset,
    ) -> bool {
        self.scroll.reconcile_frame(shown, header_x, sidebar_y, body)
    }

    pub fn scroll_to_now(&mut self) -> bool {
        let now = self.clock.now();
        self.scroll.scroll_to_now(&self.axis, now)
    }

    pub fn scroll_to_instant(&mut self, instant: DateTime<Utc>) -> bool {
        self.scroll.scroll_to_instant(&self.axis, instant)
    }

    /// Brings a channel's row into view. Returns `false` when it is filtered out.
    pub fn scroll_to_channel(&mut self, channel_id: ChannelId) -> bool {
        let Some(row) = self
            .filtered
            .iter()
            .position(|&i| self.channels.get(i).map(|c| c.id) == Some(channel_id))
        else {
            return false;
        };
        self.scroll.scroll_to_row(row, self.virtualizer.row_height);
        true
    }

    // ===== Now line =====

    /// Recomputes the now line when its cadence has elapsed.
    pub fn tick(&mut self) -> Option<NowIndicator> {
        let now = self.clock.now();
        self.now.tick(&self.axis, now)
    }

    /// Time until the now line next needs recomputing.
    pub fn next_tick_in(&self) -> std::time::Duration {
        self.now
            .next_tick_in(self.clock.now())
            .to_std()
            .unwrap_or_default()
    }

    // ===== Selection and actions =====

    fn channel(&self, channel_id: ChannelId) -> Result<&Channel, GuideError> {
        self.channels
            .iter()
            .find(|c| c.id == channel_id)
            .ok_or(GuideError::UnknownChannel(channel_id))
    }

    fn program(
        &self,
        channel_id: ChannelId,
        program_id: ProgramId,
    ) -> Result<(&Channel, &Program), GuideError> {
        let channel = self.channel(channel_id)?;
        let program = self
            .guide
            .find_program(&channel.channel_id, program_id)
            .ok_or(GuideError::UnknownProgram { channel_id, program_id })?;
        Ok((channel, program))
    }

    /// Builds the detail view of a program.
    pub fn program_detail(
        &self,
        channel_id: ChannelId,
        program_id: ProgramId,
    ) -> Result<ProgramDetail, GuideError> {
        let (channel, program) = self.program(channel_id, program_id)?;
        let now = self.clock.now();
        let recording = self.recording_index.status_of(channel.id, program.start).copied();
        let upcoming = program.is_upcoming(now);

        let actions = match (upcoming, recording) {
            (false, _) => Vec::new(),
            (true, Some(entry)) => vec![ProgramAction::Cancel {
                recording_id: entry.recording_id,
            }],
            (true, None) => vec![ProgramAction::Schedule, ProgramAction::ScheduleSeries],
        };

        Ok(ProgramDetail {
            channel: channel.clone(),
            program: program.clone(),
            recording,
            airing: program.is_airing(now),
            upcoming,
            actions,
        })
    }

    /// Selects a program and returns its detail.
    pub fn select_program(
        &mut self,
        channel_id: ChannelId,
        program_id: ProgramId,
    ) -> Result<ProgramDetail, GuideError> {
        let detail = self.program_detail(channel_id, program_id)?;
        self.selection = Some((channel_id, program_id));
        Ok(detail)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<(ChannelId, ProgramId)> {
        self.selection
    }

    /// Detail of the selected program, recomputed from current data.
    pub fn selected_detail(&self) -> Option<ProgramDetail> {
        let (channel_id, program_id) = self.selection?;
        self.program_detail(channel_id, program_id).ok()
    }

    /// Program under a point in body content coordinates.
    pub fn program_at(&self, x: f32, y: f32) -> Option<(ChannelId, ProgramId)> {
        let row = self.virtualizer.row_at(y, self.filtered.len())?;
        let channel = self.channels.get(*self.filtered.get(row)?)?;
        let programs = self
            .guide_current
            .then(|| self.guide.programs_for(&channel.channel_id))
            .flatten()?;
        let cells = self.calculator.layout(programs, &self.axis);
        layout::program_at(&cells, x).map(|cell| (channel.id, cell.program.id))
    }

    pub fn clear_mutation_error(&mut self) {
        self.mutation_error = None;
    }

    /// Schedules a recording of an upcoming program.
    ///
    /// Failures are kept in the mutation error slot; fetch state is untouched.
    pub fn schedule_recording(
        &mut self,
        api: &dyn RecordingApi,
        channel_id: ChannelId,
        program_id: ProgramId,
        series: bool,
    ) -> Result<RecordingId, GuideError> {
        let (_, program) = self.program(channel_id, program_id)?;
        if !program.is_upcoming(self.clock.now()) {
            return Err(GuideError::ProgramNotUpcoming(program_id));
        }

        let action = if series { "schedule series" } else { "schedule recording" };
        let result = api.create_recording(channel_id, program_id, series);
        let recording_id = self.finish_mutation(action, result)?;
        self.request_recordings();
        Ok(recording_id)
    }

    /// Cancels the active recording of a program.
    pub fn cancel_recording(
        &mut self,
        api: &dyn RecordingApi,
        channel_id: ChannelId,
        program_id: ProgramId,
    ) -> Result<(), GuideError> {
        let (channel, program) = self.program(channel_id, program_id)?;
        let entry = self
            .recording_index
            .status_of(channel.id, program.start)
            .ok_or(GuideError::NoRecording(program_id))?;

        let result = api.cancel_recording(entry.recording_id);
        self.finish_mutation("cancel recording", result)?;
        self.request_recordings();
        Ok(())
    }

    pub fn mapping_candidates(
        &self,
        api: &dyn MappingApi,
        channel_id: ChannelId,
    ) -> Result<Vec<EpgCandidate>, GuideError> {
        self.channel(channel_id)?;
        api.mapping_candidates(channel_id)
            .map_err(|e| GuideError::mutation("load mapping candidates", e))
    }

    /// Maps a channel to an EPG channel, then refetches channels and guide.
    pub fn map_channel(
        &mut self,
        api: &dyn MappingApi,
        channel_id: ChannelId,
        epg_source_id: i64,
        epg_channel_id: &str,
    ) -> Result<(), GuideError> {
        self.channel(channel_id)?;
        let result = api.map_channel(channel_id, epg_source_id, epg_channel_id);
        self.finish_mutation("map channel", result)?;
        self.refresh_mapping();
        Ok(())
    }

    pub fn unmap_channel(
        &mut self,
        api: &dyn MappingApi,
        channel_id: ChannelId,
    ) -> Result<(), GuideError> {
        self.channel(channel_id)?;
        let result = api.unmap_channel(channel_id);
        self.finish_mutation("unmap channel", result)?;
        self.refresh_mapping();
        Ok(())
    }

    fn finish_mutation<T>(
        &mut self,
        action: &'static str,
        result: anyhow::Result<T>,
    ) -> Result<T, GuideError> {
        match result {
            Ok(value) => {
                tracing::info!(action, "mutation succeeded");
                self.mutation_error = None;
                Ok(value)
            }
            Err(e) => {
                let error = GuideError::mutation(action, e);
                tracing::warn!("{}", error);
                self.mutation_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Mapping changes which programs a channel resolves to. The current
    /// guide stays on screen (same window) while both refetches run.
    fn refresh_mapping(&mut self) {
        self.pending
            .retain(|r| !matches!(r, FetchRequest::Channels { .. } | FetchRequest::Guide { .. }));
        self.request_channels();
        self.request_guide();
    }

    // ===== Frame =====

    /// Composes the frame for the current scroll position.
    pub fn frame(&self) -> GuideFrame<'_> {
        let total_rows = self.filtered.len();
        let row_height = self.virtualizer.row_height;
        let scroll = self.scroll.body();
        let visible = self.virtualizer.range(scroll.y, self.scroll.viewport_height(), total_rows);
        let now = self.clock.now();

        let rows = visible
            .iter()
            .filter_map(|index| {
                let channel = self.channels.get(*self.filtered.get(index)?)?;
                Some(GuideRow {
                    index,
                    top_px: self.virtualizer.row_top(index),
                    channel,
                    cells: self.row_cells(channel, now),
                })
            })
            .collect();

        GuideFrame {
            axis: self.axis,
            slots: self.axis.slots().collect(),
            content_width: self.axis.total_width(),
            content_height: self.virtualizer.content_height(total_rows),
            row_height,
            total_rows,
            visible,
            top_padding: virtualizer::top_padding(visible, row_height),
            bottom_padding: virtualizer::bottom_padding(visible, total_rows, row_height),
            rows,
            now: self.now.current(),
            scroll,
            status: self.status(),
        }
    }

    fn row_cells<'a>(&'a self, channel: &Channel, now: DateTime<Utc>) -> RowCells<'a> {
        if !self.guide_current {
            return RowCells::Pending;
        }

        let programs = self.guide.programs_for(&channel.channel_id);
        let has_epg = has_epg_data(channel, &self.guide, self.guide_current);
        match self.calculator.layout_row(programs, has_epg, &self.axis) {
            RowContent::NoGuideData => RowCells::NoGuideData,
            RowContent::NoProgramsInWindow => RowCells::NoProgramsInWindow,
            RowContent::Programs(cells) => RowCells::Programs(
                cells
                    .into_iter()
                    .map(|cell| GuideCell {
                        recording: self
                            .recording_index
                            .status_of(channel.id, cell.program.start)
                            .copied(),
                        airing: cell.program.is_airing(now),
                        selected: self.selection == Some((channel.id, cell.program.id)),
                        cell,
                    })
                    .collect(),
            ),
        }
    }
}

fn has_epg_data(channel: &Channel, guide: &GuideData, guide_current: bool) -> bool {
    channel.epg_mapped || (guide_current && guide.programs_for(&channel.channel_id).is_some())
}

/// Floors `instant` to the start of its hour in `offset`.
fn floor_to_hour(instant: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let offset_millis = i64::from(offset.local_minus_utc()) * 1000;
    let local = instant.timestamp_millis() + offset_millis;
    let floored = local - local.rem_euclid(MILLIS_PER_HOUR) - offset_millis;
    Utc.timestamp_millis_opt(floored).single().unwrap_or(instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::model::{ProgramFlags, RecordingStatus};
    use crate::now_indicator::FixedClock;
    use anyhow::anyhow;
    use chrono::Duration;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    fn channel(id: i64, group: &str, mapped: bool) -> Channel {
        Channel {
            id,
            channel_id: format!("k{}", id),
            number: id.to_string(),
            name: format!("Channel {}", id),
            logo: None,
            group: group.to_string(),
            source_name: "Cable".to_string(),
            stream_url: None,
            enabled: true,
            epg_mapped: mapped,
        }
    }

    fn program(id: i64, key: &str, start: DateTime<Utc>, minutes: i64) -> Program {
        Program {
            id,
            channel_id: key.to_string(),
            title: format!("Show {}", id),
            subtitle: None,
            description: None,
            start,
            end: start + Duration::minutes(minutes),
            category: None,
            flags: ProgramFlags::default(),
        }
    }

    fn backend() -> MemoryBackend {
        let channels: Vec<Channel> = (1..=50)
            .map(|id| channel(id, if id % 2 == 0 { "Even" } else { "Odd" }, id != 3))
            .collect();
        let mut programs = Vec::new();
        for c in channels.iter().filter(|c| c.epg_mapped) {
            for slot in 0..24 {
                let start = at(0, 0) + Duration::minutes(60 * slot);
                programs.push(program(c.id * 100 + slot, &c.channel_id, start, 60));
            }
        }
        let recordings = vec![Recording {
            id: 7,
            channel_id: 1,
            start_time: "2024-01-01T12:00:00Z".into(),
            status: RecordingStatus::Scheduled,
            program_id: Some(112),
            series: false,
        }];
        MemoryBackend::new(channels, programs, recordings, Vec::new())
    }

    fn controller(clock: &Arc<FixedClock>) -> GuideController {
        GuideController::new(GuideConfig::default(), clock.clone()).unwrap()
    }

    fn drive(c: &mut GuideController, backend: &MemoryBackend) {
        for request in c.take_pending_requests() {
            c.apply(request.execute(backend));
        }
    }

    #[test]
    fn test_new_window_starts_on_the_hour() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let c = controller(&clock);
        assert_eq!(c.window().start(), at(10, 0));
        assert_eq!(c.window().end(), at(14, 0));
        assert_eq!(c.status(), GuideStatus::Idle);
        assert!(c.now_indicator().visible);
    }

    #[test]
    fn test_floor_to_hour_respects_offset() {
        let half_hour_east = FixedOffset::east_opt(30 * 60).unwrap();
        assert_eq!(floor_to_hour(at(10, 17), half_hour_east), at(9, 30));
        assert_eq!(floor_to_hour(at(10, 45), half_hour_east), at(10, 30));
    }

    #[test]
    fn test_reload_loads_everything() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.reload();
        assert_eq!(c.status(), GuideStatus::Loading);
        drive(&mut c, &b);

        assert_eq!(c.status(), GuideStatus::Ready);
        assert_eq!(c.channels().len(), 50);
        assert_eq!(c.recording_index().len(), 1);
        assert!(!c.is_loading());
    }

    #[test]
    fn test_window_change_blanks_guide_until_refetch() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.set_viewport(800.0, 720.0);
        c.reload();
        drive(&mut c, &b);
        let generation = c.generation();

        c.next_window().unwrap();
        assert_eq!(c.generation(), generation + 1);
        assert_eq!(c.window().start(), at(14, 0));
        assert!(c.guide().is_empty());
        assert!(c.frame().rows.iter().all(|r| r.cells == RowCells::Pending));

        drive(&mut c, &b);
        assert!(matches!(c.frame().rows[0].cells, RowCells::Programs(_)));
    }

    #[test]
    fn test_superseded_guide_fetch_is_ignored() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.reload();
        drive(&mut c, &b);

        c.next_window().unwrap();
        let stale = c.take_pending_requests();
        c.next_window().unwrap();
        let fresh = c.take_pending_requests();

        for request in &fresh {
            assert!(c.apply(request.execute(&b)));
        }
        let guide_b = c.guide().clone();
        for request in &stale {
            assert!(!c.apply(request.execute(&b)));
        }
        assert_eq!(c.guide(), &guide_b);
        assert_eq!(c.window().start(), at(18, 0));
    }

    #[test]
    fn test_failures_are_retryable() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.reload();
        for request in c.take_pending_requests() {
            match request {
                FetchRequest::Guide { generation, .. } => {
                    c.apply_guide(generation, Err(anyhow!("server unavailable")));
                }
                other => {
                    c.apply(other.execute(&b));
                }
            }
        }
        assert!(matches!(
            c.status(),
            GuideStatus::Error(msg) if msg.contains("server unavailable")
        ));
        assert!(c.frame().rows.iter().all(|r| r.cells == RowCells::Pending));

        assert_eq!(c.retry(), 1);
        drive(&mut c, &b);
        assert_eq!(c.status(), GuideStatus::Ready);
        assert_eq!(c.retry(), 0);
    }

    #[test]
    fn test_empty_guide_response_is_not_an_error() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.reload();
        drive(&mut c, &b);
        c.jump_to_date(NaiveDate::from_ymd_opt(2030, 6, 1).unwrap()).unwrap();
        drive(&mut c, &b);

        assert_eq!(c.window().start(), Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(c.status(), GuideStatus::Ready);
        c.set_viewport(800.0, 720.0);
        assert_eq!(c.frame().rows[0].cells, RowCells::NoProgramsInWindow);
    }

    #[test]
    fn test_mapped_channel_with_quiet_window_is_not_unmapped() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = MemoryBackend::new(
            vec![channel(1, "Odd", true), channel(2, "Even", false)],
            vec![program(1, "k1", at(18, 0), 60)],
            Vec::new(),
            Vec::new(),
        );
        let mut c = controller(&clock);
        c.set_viewport(800.0, 720.0);
        c.reload();
        drive(&mut c, &b);

        let frame = c.frame();
        assert_eq!(frame.rows[0].cells, RowCells::NoProgramsInWindow);
        assert_eq!(frame.rows[1].cells, RowCells::NoGuideData);
        assert!(c.has_epg_data(&c.channels()[0]));
        assert!(!c.has_epg_data(&c.channels()[1]));

        let counts = c.unmapped_counts();
        assert_eq!(counts.total, 1);
        assert_eq!(counts.for_group("Odd"), 0);

        c.set_unmapped_only(true);
        let ids: Vec<i64> = c.filtered_channels().map(|ch| ch.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_filter_change_clamps_scroll_and_rows() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.set_viewport(800.0, 720.0);
        c.reload();
        drive(&mut c, &b);

        c.on_scroll(ScrollSurface::Body, ScrollOffset::new(0.0, 72.0 * 40.0));
        // 50 rows in a 720px viewport: at most 2880
        assert_eq!(c.scroll().sidebar_y(), 2880.0);

        c.set_search("Channel 4");
        // "Channel 4" and "Channel 40".."Channel 49"
        assert_eq!(c.filtered_len(), 11);
        assert_eq!(c.scroll().body().y, 72.0 * 11.0 - 720.0);
        let frame = c.frame();
        assert!(frame.visible.end <= 11);
        assert!(frame.rows.iter().all(|r| r.index < 11));
    }

    #[test]
    fn test_scroll_to_channel_brings_row_into_view() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.set_viewport(800.0, 720.0);
        c.reload();
        drive(&mut c, &b);

        assert!(c.scroll_to_channel(20));
        // Row 19 ends at 20 * 72; the viewport shows 10 rows
        assert_eq!(c.scroll().sidebar_y(), 72.0 * 20.0 - 720.0);
        assert_eq!(c.scroll().body().y, c.scroll().sidebar_y());

        c.set_group(Selection::Only("Even".into()));
        assert!(!c.scroll_to_channel(3));
    }

    #[test]
    fn test_sidebar_scroll_survives_frame_reconcile() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.set_viewport(800.0, 720.0);
        c.reload();
        drive(&mut c, &b);

        let shown = c.frame().scroll;
        // Wheel over the sidebar; header and body still show `shown`
        assert!(c.reconcile_scroll(shown, shown.x, 500.0, shown));
        assert_eq!(c.scroll().sidebar_y(), 500.0);
        assert_eq!(c.scroll().body().y, 500.0);

        // Next frame all three surfaces agree, nothing moves
        let shown = c.frame().scroll;
        assert!(!c.reconcile_scroll(shown, shown.x, shown.y, shown));
        assert_eq!(c.scroll().sidebar_y(), 500.0);
    }

    #[test]
    fn test_unmapped_filter_uses_guide_data() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.reload();
        drive(&mut c, &b);

        c.set_unmapped_only(true);
        assert_eq!(c.filtered_channels().map(|ch| ch.id).collect::<Vec<_>>(), vec![3]);
        assert_eq!(c.unmapped_counts().total, 1);
        assert_eq!(c.unmapped_counts().for_group("Odd"), 1);

        c.set_group(Selection::Only("Even".into()));
        assert_eq!(c.status(), GuideStatus::NoChannels);
    }

    #[test]
    fn test_program_detail_actions() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.reload();
        drive(&mut c, &b);

        // Airing now: no actions
        let detail = c.select_program(1, 110).unwrap();
        assert!(detail.airing);
        assert!(detail.actions.is_empty());

        // Upcoming with a scheduled recording: cancel
        let detail = c.select_program(1, 112).unwrap();
        assert_eq!(detail.actions, vec![ProgramAction::Cancel { recording_id: 7 }]);

        // Upcoming without a recording: schedule
        let detail = c.select_program(1, 111).unwrap();
        assert_eq!(detail.actions, vec![ProgramAction::Schedule, ProgramAction::ScheduleSeries]);
        assert_eq!(c.selection(), Some((1, 111)));

        assert_eq!(
            c.select_program(1, 9999),
            Err(GuideError::UnknownProgram { channel_id: 1, program_id: 9999 })
        );
        assert_eq!(c.select_program(999, 1), Err(GuideError::UnknownChannel(999)));
    }

    #[test]
    fn test_schedule_and_cancel_refresh_recordings() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.reload();
        drive(&mut c, &b);

        let id = c.schedule_recording(&b, 2, 211, false).unwrap();
        assert!(c.recordings_state().is_loading());
        drive(&mut c, &b);
        assert_eq!(c.recording_index().status_of(2, at(11, 0)).map(|e| e.recording_id), Some(id));

        c.cancel_recording(&b, 2, 211).unwrap();
        drive(&mut c, &b);
        assert!(c.recording_index().status_of(2, at(11, 0)).is_none());

        assert_eq!(
            c.schedule_recording(&b, 2, 210, false),
            Err(GuideError::ProgramNotUpcoming(210))
        );
        assert_eq!(c.cancel_recording(&b, 2, 211), Err(GuideError::NoRecording(211)));
    }

    struct FailingApi;

    impl RecordingApi for FailingApi {
        fn create_recording(
            &self,
            _: ChannelId,
            _: ProgramId,
            _: bool,
        ) -> anyhow::Result<RecordingId> {
            Err(anyhow!("tuner busy"))
        }

        fn cancel_recording(&self, _: RecordingId) -> anyhow::Result<()> {
            Err(anyhow!("tuner busy"))
        }
    }

    #[test]
    fn test_mutation_failure_is_local() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.reload();
        drive(&mut c, &b);
        let recordings_before = c.recordings().len();

        let err = c.schedule_recording(&FailingApi, 1, 111, false).unwrap_err();
        assert!(matches!(
            &err,
            GuideError::Mutation { action: "schedule recording", message }
                if message.contains("tuner busy")
        ));
        assert_eq!(c.mutation_error(), Some(&err));
        assert!(c.take_pending_requests().is_empty());
        assert_eq!(c.recordings().len(), recordings_before);
        assert_eq!(c.status(), GuideStatus::Ready);

        c.clear_mutation_error();
        assert!(c.mutation_error().is_none());
    }

    #[test]
    fn test_mapping_refetches_channels_and_guide() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = MemoryBackend::new(
            vec![channel(1, "Odd", false)],
            vec![program(1, "epg.one", at(10, 0), 60)],
            Vec::new(),
            vec![EpgCandidate {
                epg_source_id: 4,
                epg_channel_id: "epg.one".into(),
                name: "One".into(),
            }],
        );
        let mut c = controller(&clock);
        c.set_viewport(800.0, 720.0);
        c.reload();
        drive(&mut c, &b);
        assert_eq!(c.frame().rows[0].cells, RowCells::NoGuideData);

        assert_eq!(c.mapping_candidates(&b, 1).unwrap().len(), 1);
        let generation = c.generation();
        c.map_channel(&b, 1, 4, "epg.one").unwrap();
        assert_eq!(c.generation(), generation + 1);
        drive(&mut c, &b);
        assert!(matches!(
            c.frame().rows[0].cells,
            RowCells::Programs(ref cells) if cells.len() == 1
        ));

        c.unmap_channel(&b, 1).unwrap();
        drive(&mut c, &b);
        assert_eq!(c.frame().rows[0].cells, RowCells::NoGuideData);
    }

    #[test]
    fn test_frame_marks_recordings_and_airing() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.set_viewport(800.0, 720.0);
        c.reload();
        drive(&mut c, &b);

        let frame = c.frame();
        let RowCells::Programs(cells) = &frame.rows[0].cells else {
            panic!("expected programs");
        };
        assert_eq!(cells.len(), 4);
        assert!(cells[0].airing);
        assert_eq!(cells[2].recording.map(|r| r.recording_id), Some(7));
        assert!(frame.now.visible);
        assert_eq!(frame.now.offset_px, 68.0);
        assert_eq!(frame.slots.len(), 8);
    }

    #[test]
    fn test_jump_to_now_and_hit_test() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let b = backend();
        let mut c = controller(&clock);
        c.set_viewport(400.0, 720.0);
        c.reload();
        drive(&mut c, &b);

        clock.set(at(16, 40));
        c.jump_to_now().unwrap();
        assert_eq!(c.window().start(), at(16, 0));
        assert_eq!(c.scroll().header_x(), 160.0);
        drive(&mut c, &b);

        assert_eq!(c.program_at(10.0, 80.0), Some((2, 216)));
        assert_eq!(c.program_at(10.0, 72.0 * 60.0), None);
    }

    #[test]
    fn test_oversized_window_config_is_an_error() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at(10, 17)));
        let config = GuideConfig { window_hours: 4_000_000_000, ..Default::default() };
        let result = GuideController::new(config, clock);
        assert!(matches!(result, Err(GuideError::InvalidConfig(_))));
    }

    #[test]
    fn test_navigation_past_calendar_end_keeps_window() {
        let late = Arc::new(FixedClock::new(DateTime::<Utc>::MAX_UTC - Duration::hours(2)));
        let result = GuideController::new(GuideConfig::default(), late);
        assert!(matches!(result, Err(GuideError::WindowOutOfRange { .. })));

        let clock = Arc::new(FixedClock::new(DateTime::<Utc>::MAX_UTC - Duration::hours(6)));
        let mut c = controller(&clock);
        let window = c.window();
        let generation = c.generation();
        assert!(matches!(c.next_window(), Err(GuideError::WindowOutOfRange { .. })));
        assert_eq!(c.window(), window);
        assert_eq!(c.generation(), generation);
        assert!(c.previous_window().is_ok());
    }

    #[test]
    fn test_now_tick_cadence() {
        let clock = Arc::new(FixedClock::new(at(10, 17)));
        let mut c = controller(&clock);
        assert!(c.tick().is_none());
        clock.advance(Duration::seconds(61));
        assert!(c.tick().is_some());
        assert_eq!(c.next_tick_in(), std::time::Duration::from_secs(60));
    }
}
