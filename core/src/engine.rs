//! The credit engine: one sale in, one participant state out.
//!
//! PIPELINE (fixed, never reordered):
//!   1. Valuation   (sale type + amount -> CC)
//!   2. Ledger      (lifetime and cycle CC += delta)
//!   3. Promotion   (rank / cycle / history / role)
//!
//! RULES:
//!   - Inputs are validated in step 1 or 2, before any state is built.
//!   - The caller's participant is borrowed, never mutated; every success
//!     returns a new record and every failure leaves the old one as it was.
//!   - Rank tables and role mappings are validated once, in build().

use crate::{
    clock::{Clock, SystemClock},
    config::EngineConfig,
    error::{EngineError, EngineResult},
    event::EngineEvent,
    ledger,
    participant::{Participant, ParticipantRecord, RankProgress, Role},
    promotion::PromotionStateMachine,
    rank::RankTable,
    role::RoleMapper,
    types::{Cc, ParticipantId, Timestamp},
    valuation::{SaleRecord, SaleStatus, SaleSubmission, SaleType},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of a credit application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditOutcome {
    pub participant: Participant,
    pub events:      Vec<EngineEvent>,
}

impl CreditOutcome {
    pub fn promoted(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, EngineEvent::RankPromoted { .. }))
    }
}

/// Result of a processed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleOutcome {
    pub participant: Participant,
    pub sale:        SaleRecord,
    pub events:      Vec<EngineEvent>,
}

impl SaleOutcome {
    pub fn promoted(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, EngineEvent::RankPromoted { .. }))
    }
}

pub struct CreditEngine {
    config: EngineConfig,
    ranks:  RankTable,
    roles:  RoleMapper,
    clock:  Arc<dyn Clock>,
}

impl CreditEngine {
    /// Build an engine on the wall clock.
    pub fn build(config: EngineConfig) -> EngineResult<Self> {
        Self::build_with_clock(config, Arc::new(SystemClock))
    }

    pub fn build_with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        config.validate_valuation()?;
        let ranks = RankTable::new(config.ranks.clone())?;
        let roles = RoleMapper::new(&config.role_mappings, &ranks)?;

        log::info!(
            "engine: built with {} ranks (lowest={}), {} role mappings, cascade={:?} overshoot={:?}",
            ranks.len(),
            ranks.lowest().id,
            config.role_mappings.len(),
            config.promotion.cascade,
            config.promotion.overshoot
        );

        Ok(Self { config, ranks, roles, clock })
    }

    /// The standard ladder on the wall clock.
    pub fn standard() -> EngineResult<Self> {
        Self::build(EngineConfig::standard())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    pub fn roles(&self) -> &RoleMapper {
        &self.roles
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// A new participant at the bottom of the ladder.
    pub fn enroll(&self, participant_id: impl Into<ParticipantId>, role: Role) -> Participant {
        Participant::new(participant_id, role, &self.ranks, self.now())
    }

    /// Load boundary: the one place a stored record without progress gets
    /// default progress. Records with negative or non-finite CC totals are
    /// rejected here so nothing downstream sees them.
    pub fn load_participant(&self, record: ParticipantRecord) -> EngineResult<Participant> {
        Self::check_stored_cc(&record.participant_id, "case_credits", record.case_credits)?;

        let rank_progress = match record.rank_progress {
            Some(progress) => {
                Self::check_stored_cc(
                    &record.participant_id,
                    "current_cycle_cc",
                    progress.current_cycle_cc,
                )?;
                progress
            }
            None => {
                log::info!(
                    "participant={} load: no rank progress, starting at '{}'",
                    record.participant_id,
                    self.ranks.lowest().id
                );
                RankProgress::initial(&self.ranks, self.now())
            }
        };

        Ok(Participant {
            participant_id: record.participant_id,
            role:           record.role,
            case_credits:   record.case_credits,
            rank_progress,
        })
    }

    fn check_stored_cc(participant_id: &str, field: &str, value: Cc) -> EngineResult<()> {
        if value.is_finite() && value >= 0.0 {
            return Ok(());
        }
        log::warn!("participant={participant_id} load: rejected, {field}={value}");
        Err(EngineError::InvalidRecord {
            participant_id: participant_id.to_string(),
            reason:         format!("{field} must be finite and >= 0, got {value}"),
        })
    }

    pub fn calculate_cc(&self, amount: f64, sale_type: SaleType) -> EngineResult<Cc> {
        self.config.valuation.calculate_cc(amount, sale_type)
    }

    /// Validate and value a submission. Pure apart from reading the clock and
    /// minting a transaction id when none was given.
    pub fn value_sale(&self, submission: &SaleSubmission) -> EngineResult<SaleRecord> {
        // Amount first: a negative amount is INVALID_AMOUNT whatever the type.
        if !submission.amount.is_finite() || submission.amount < 0.0 {
            return Err(EngineError::InvalidAmount { amount: submission.amount });
        }
        let sale_type: SaleType = submission.sale_type.parse()?;
        let cc_earned = self.calculate_cc(submission.amount, sale_type)?;

        Ok(SaleRecord {
            transaction_id: submission
                .transaction_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            amount: submission.amount,
            sale_type,
            cc_earned,
            timestamp: submission.timestamp.unwrap_or_else(|| self.now()),
            status: SaleStatus::Completed,
        })
    }

    /// Ledger + promotion for an already valued delta.
    pub fn credit(&self, participant: &Participant, cc_delta: Cc) -> EngineResult<CreditOutcome> {
        let mut next = ledger::apply_credit(participant, cc_delta)?;
        let now = self.now();

        let mut events = vec![EngineEvent::CreditApplied {
            at:             now,
            participant_id: next.participant_id.clone(),
            delta:          cc_delta,
            lifetime_cc:    next.case_credits,
            cycle_cc:       next.rank_progress.current_cycle_cc,
        }];

        let machine = PromotionStateMachine::new(&self.ranks, &self.roles, &self.config.promotion);
        events.extend(machine.evaluate(&mut next, now));

        Ok(CreditOutcome { participant: next, events })
    }

    /// The full pipeline for one sale.
    pub fn process_sale(
        &self,
        participant: &Participant,
        submission: &SaleSubmission,
    ) -> EngineResult<SaleOutcome> {
        let sale = match self.value_sale(submission) {
            Ok(sale) => sale,
            Err(e) => {
                log::warn!(
                    "participant={} sale rejected: {} ({e})",
                    participant.participant_id,
                    e.kind().code()
                );
                return Err(e);
            }
        };

        let recorded = EngineEvent::SaleRecorded {
            at:             sale.timestamp,
            participant_id: participant.participant_id.clone(),
            transaction_id: sale.transaction_id.clone(),
            sale_type:      sale.sale_type,
            amount:         sale.amount,
            cc_earned:      sale.cc_earned,
        };

        let CreditOutcome { participant, events: credit_events } =
            self.credit(participant, sale.cc_earned)?;

        let mut events = Vec::with_capacity(credit_events.len() + 1);
        events.push(recorded);
        events.extend(credit_events);

        Ok(SaleOutcome { participant, sale, events })
    }

    /// Audit event for a rejected sale.
    pub fn rejection_event(&self, participant_id: &str, error: &EngineError) -> EngineEvent {
        EngineEvent::SaleRejected {
            at:             self.now(),
            participant_id: participant_id.to_string(),
            kind:           error.kind(),
            reason:         error.to_string(),
        }
    }
}
