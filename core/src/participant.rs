use crate::{
    rank::RankTable,
    types::{Cc, ParticipantId, RankId, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declaration order is privilege order: Student < Sponsor < Admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Sponsor,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Student => "STUDENT",
            Self::Sponsor => "SPONSOR",
            Self::Admin   => "ADMIN",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionHistoryEntry {
    /// The rank that was cleared.
    pub rank_id:          RankId,
    pub date_achieved:    Timestamp,
    /// Lifetime CC at the moment of promotion.
    pub total_cc_at_time: Cc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankProgress {
    pub current_rank_id:  RankId,
    pub current_cycle_cc: Cc,
    pub target_cc:        Cc,
    pub cycle_start_date: Timestamp,
    #[serde(default)]
    history:              Vec<PromotionHistoryEntry>,
}

impl RankProgress {
    /// Fresh progress at the bottom of the ladder.
    ///
    /// This is the only place default progress is fabricated; stored records
    /// without progress go through `CreditEngine::load_participant`.
    pub fn initial(ranks: &RankTable, now: Timestamp) -> Self {
        let lowest = ranks.lowest();
        Self {
            current_rank_id:  lowest.id.clone(),
            current_cycle_cc: 0.0,
            target_cc:        lowest.target_cc,
            cycle_start_date: now,
            history:          Vec::new(),
        }
    }

    /// Oldest promotion first.
    pub fn history(&self) -> &[PromotionHistoryEntry] {
        &self.history
    }

    pub(crate) fn push_history(&mut self, entry: PromotionHistoryEntry) {
        self.history.push(entry);
    }

    /// CC still needed to clear the current target. Zero once met.
    pub fn remaining_cc(&self) -> Cc {
        (self.target_cc - self.current_cycle_cc).max(0.0)
    }

    /// Fraction of the cycle target reached, capped at 1.0.
    pub fn progress_ratio(&self) -> f64 {
        if self.target_cc <= 0.0 {
            return 1.0;
        }
        (self.current_cycle_cc / self.target_cc).clamp(0.0, 1.0)
    }
}

/// A participant as held by the caller's store. Records written before the
/// engine existed have no `rank_progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub participant_id: ParticipantId,
    pub role:           Role,
    #[serde(default)]
    pub case_credits:   Cc,
    #[serde(default)]
    pub rank_progress:  Option<RankProgress>,
}

/// A fully loaded participant. Always has progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub participant_id: ParticipantId,
    pub role:           Role,
    /// Lifetime CC.
    pub case_credits:   Cc,
    pub rank_progress:  RankProgress,
}

impl Participant {
    /// A brand-new participant at the bottom of the ladder.
    pub fn new(
        participant_id: impl Into<ParticipantId>,
        role: Role,
        ranks: &RankTable,
        now: Timestamp,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            role,
            case_credits:   0.0,
            rank_progress:  RankProgress::initial(ranks, now),
        }
    }

    /// The fields collaborators read back after a sale.
    pub fn update(&self) -> ParticipantUpdate {
        ParticipantUpdate {
            case_credits:  self.case_credits,
            role:          self.role,
            rank_progress: self.rank_progress.clone(),
        }
    }

    pub fn into_record(self) -> ParticipantRecord {
        ParticipantRecord {
            participant_id: self.participant_id,
            role:           self.role,
            case_credits:   self.case_credits,
            rank_progress:  Some(self.rank_progress),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantUpdate {
    pub case_credits:  Cc,
    pub role:          Role,
    pub rank_progress: RankProgress,
}
