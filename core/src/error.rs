use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid sale amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Invalid sale type '{sale_type}': expected RETAIL or WHOLESALE")]
    InvalidSaleType { sale_type: String },

    #[error("Invalid credit delta: {delta} (must be finite and >= 0)")]
    InvalidDelta { delta: f64 },

    #[error("Rank '{rank_id}' not found in rank table")]
    MissingRankDefinition { rank_id: String },

    #[error("Invalid rank table: {reason}")]
    InvalidRankTable { reason: String },

    #[error("Invalid role mapping for rank '{rank_id}': {reason}")]
    InvalidRoleMapping { rank_id: String, reason: String },

    #[error("Invalid engine config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Participant '{participant_id}' not found")]
    ParticipantNotFound { participant_id: String },

    #[error("Participant '{participant_id}' already enrolled")]
    DuplicateParticipant { participant_id: String },

    #[error("Invalid stored record for participant '{participant_id}': {reason}")]
    InvalidRecord { participant_id: String, reason: String },
}

/// Stable, serialisable classification of an [`EngineError`], used by callers
/// to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidAmount,
    InvalidSaleType,
    InvalidDelta,
    MissingRankDefinition,
    InvalidRankTable,
    InvalidRoleMapping,
    InvalidConfig,
    ParticipantNotFound,
    DuplicateParticipant,
    InvalidRecord,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount         => "INVALID_AMOUNT",
            Self::InvalidSaleType       => "INVALID_SALE_TYPE",
            Self::InvalidDelta          => "INVALID_DELTA",
            Self::MissingRankDefinition => "MISSING_RANK_DEFINITION",
            Self::InvalidRankTable      => "INVALID_RANK_TABLE",
            Self::InvalidRoleMapping    => "INVALID_ROLE_MAPPING",
            Self::InvalidConfig         => "INVALID_CONFIG",
            Self::ParticipantNotFound   => "PARTICIPANT_NOT_FOUND",
            Self::DuplicateParticipant  => "DUPLICATE_PARTICIPANT",
            Self::InvalidRecord         => "INVALID_RECORD",
        }
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount { .. }         => ErrorKind::InvalidAmount,
            Self::InvalidSaleType { .. }       => ErrorKind::InvalidSaleType,
            Self::InvalidDelta { .. }          => ErrorKind::InvalidDelta,
            Self::MissingRankDefinition { .. } => ErrorKind::MissingRankDefinition,
            Self::InvalidRankTable { .. }      => ErrorKind::InvalidRankTable,
            Self::InvalidRoleMapping { .. }    => ErrorKind::InvalidRoleMapping,
            Self::InvalidConfig { .. }         => ErrorKind::InvalidConfig,
            Self::ParticipantNotFound { .. }   => ErrorKind::ParticipantNotFound,
            Self::DuplicateParticipant { .. }  => ErrorKind::DuplicateParticipant,
            Self::InvalidRecord { .. }         => ErrorKind::InvalidRecord,
        }
    }

    pub(crate) fn rank_table(reason: impl Into<String>) -> Self {
        Self::InvalidRankTable { reason: reason.into() }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
