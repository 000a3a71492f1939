//! Error types for the guide engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{ChannelId, ProgramId};

/// Domain errors raised by the guide controller and value constructors.
///
/// Collaborator failures (fetch, IO) travel as `anyhow::Error` and are folded
/// into load state or into [`GuideError::Mutation`] at the controller boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GuideError {
    #[error("invalid time window: end {end} is not after start {start}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("time window shifted by {hours}h from {start} is out of range")]
    WindowOutOfRange { start: DateTime<Utc>, hours: i64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown channel {0}")]
    UnknownChannel(ChannelId),

    #[error("program {program_id} not found on channel {channel_id}")]
    UnknownProgram {
        channel_id: ChannelId,
        program_id: ProgramId,
    },

    #[error("program {0} has already started")]
    ProgramNotUpcoming(ProgramId),

    #[error("program {0} has no active recording")]
    NoRecording(ProgramId),

    #[error("{action} failed: {message}")]
    Mutation {
        action: &'static str,
        message: String,
    },
}

impl GuideError {
    pub(crate) fn mutation(action: &'static str, err: anyhow::Error) -> Self {
        GuideError::Mutation {
            action,
            message: format!("{:#}", err),
        }
    }
}
