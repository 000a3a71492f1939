pub mod model;
pub mod error;
pub mod config;
pub mod traits;
pub mod time_axis;
pub mod channel_filter;
pub mod recording_index;
pub mod virtualizer;
pub mod scroll;
pub mod layout;
pub mod now_indicator;
pub mod controller;
pub mod backend;
pub mod theme;

// Export data model
pub use model::{
    Channel, ChannelId, EpgCandidate, GuideData, Program, ProgramFlags,
    ProgramId, Recording, RecordingId, RecordingStatus
};

pub use error::GuideError;
pub use config::GuideConfig;

// Export collaborator contracts
pub use traits::{
    ChannelSource, GuideSource, RecordingSource, RecordingApi, MappingApi,
    GuideBackend, GuideResponse
};

// Export grid engine
pub use time_axis::{TimeWindow, TimeAxis, PixelDensity, Slot};
pub use channel_filter::{FilterCriteria, Selection, UnmappedCounts};
pub use recording_index::{RecordingStatusIndex, RecordingEntry};
pub use virtualizer::{RowVirtualizer, VisibleRowRange, compute_range};
pub use scroll::{ScrollCoordinator, ScrollOffset, ScrollSurface};
pub use layout::{ProgramLayoutCalculator, ProgramCell, RowContent};
pub use now_indicator::{Clock, SystemClock, FixedClock, NowIndicator, NowIndicatorTracker};

// Export orchestration
pub use controller::{
    GuideController, GuideFrame, GuideRow, GuideCell, RowCells, GuideStatus,
    LoadState, FetchRequest, FetchOutcome, ProgramAction, ProgramDetail
};

// Export backends
pub use backend::{MemoryBackend, GuideFile, SyntheticGuide};

// Export theme support
pub use theme::{Theme, ThemeColors, ThemeManager, hex_to_color32, adjust_brightness, with_alpha};
