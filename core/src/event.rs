//! Audit events: the record of everything a sale did to a participant.
//!
//! RULE: Every state change the engine makes is described by exactly one
//! event, in the order it happened. Callers persist or display them;
//! the engine never reads them back.

use crate::{
    error::ErrorKind,
    participant::Role,
    types::{Cc, ParticipantId, RankId, Timestamp},
    valuation::SaleType,
};
use serde::{Deserialize, Serialize};

/// Variants are appended only, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    SaleRecorded {
        at: Timestamp,
        participant_id: ParticipantId,
        transaction_id: String,
        sale_type: SaleType,
        amount: f64,
        cc_earned: Cc,
    },
    SaleRejected {
        at: Timestamp,
        participant_id: ParticipantId,
        kind: ErrorKind,
        reason: String,
    },
    CreditApplied {
        at: Timestamp,
        participant_id: ParticipantId,
        delta: Cc,
        lifetime_cc: Cc,
        cycle_cc: Cc,
    },
    RankPromoted {
        at: Timestamp,
        participant_id: ParticipantId,
        from_rank: RankId,
        to_rank: RankId,
        total_cc_at_time: Cc,
    },
    RoleChanged {
        at: Timestamp,
        participant_id: ParticipantId,
        from_role: Role,
        to_role: Role,
    },
    RankFallback {
        at: Timestamp,
        participant_id: ParticipantId,
        /// Always `MISSING_RANK_DEFINITION`; repaired, never returned.
        kind: ErrorKind,
        missing_rank: RankId,
        fallback_rank: RankId,
    },
}

impl EngineEvent {
    /// Stable string name of the variant, for log lines and dashboards.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SaleRecorded { .. }  => "sale_recorded",
            Self::SaleRejected { .. }  => "sale_rejected",
            Self::CreditApplied { .. } => "credit_applied",
            Self::RankPromoted { .. }  => "rank_promoted",
            Self::RoleChanged { .. }   => "role_changed",
            Self::RankFallback { .. }  => "rank_fallback",
        }
    }
}
