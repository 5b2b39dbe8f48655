//! Promotion state machine.
//!
//! One state per rank id. Evaluated once after every ledger update:
//!   1. Terminal rank (no next)          -> stop.
//!   2. cycle CC below target            -> stop.
//!   3. Otherwise promote: append history, move to next rank, reset the
//!      cycle, take the next rank's target, restart the cycle clock,
//!      apply any role upgrade the next rank carries.
//!
//! Under CascadePolicy::SingleStep step 3 runs at most once per event.
//!
//! An unknown current rank is the one condition repaired here instead of
//! rejected: the participant drops to the lowest rank and evaluation goes on.

use crate::{
    config::{CascadePolicy, OvershootPolicy, PromotionConfig},
    error::EngineError,
    event::EngineEvent,
    participant::{Participant, PromotionHistoryEntry},
    rank::RankTable,
    role::RoleMapper,
    types::{round_cc, Timestamp},
};

pub struct PromotionStateMachine<'a> {
    ranks:  &'a RankTable,
    roles:  &'a RoleMapper,
    config: &'a PromotionConfig,
}

impl<'a> PromotionStateMachine<'a> {
    pub fn new(ranks: &'a RankTable, roles: &'a RoleMapper, config: &'a PromotionConfig) -> Self {
        Self { ranks, roles, config }
    }

    /// Advance `participant` in place. Returns the events describing what
    /// changed, in order; empty when nothing did.
    pub fn evaluate(&self, participant: &mut Participant, now: Timestamp) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        if let Some(fallback) = self.heal_missing_rank(participant, now) {
            events.push(fallback);
        }

        loop {
            let progress = &participant.rank_progress;
            let Some(next) = self.ranks.next_of(&progress.current_rank_id) else {
                break; // terminal ceiling
            };
            if progress.current_cycle_cc < progress.target_cc {
                break;
            }

            let from_rank = progress.current_rank_id.clone();
            let carried = match self.config.overshoot {
                OvershootPolicy::HardReset    => 0.0,
                OvershootPolicy::CarryForward => {
                    round_cc(progress.current_cycle_cc - progress.target_cc)
                }
            };

            let progress = &mut participant.rank_progress;
            progress.push_history(PromotionHistoryEntry {
                rank_id:          from_rank.clone(),
                date_achieved:    now,
                total_cc_at_time: participant.case_credits,
            });
            progress.current_rank_id  = next.id.clone();
            progress.current_cycle_cc = carried;
            progress.target_cc        = next.target_cc;
            progress.cycle_start_date = now;

            log::info!(
                "participant={} promotion: {} -> {} at lifetime={:.3} CC",
                participant.participant_id, from_rank, next.id, participant.case_credits
            );
            events.push(EngineEvent::RankPromoted {
                at:               now,
                participant_id:   participant.participant_id.clone(),
                from_rank,
                to_rank:          next.id.clone(),
                total_cc_at_time: participant.case_credits,
            });

            let new_role = self.roles.resolve(participant.role, &next.id);
            if new_role != participant.role {
                log::info!(
                    "participant={} promotion: role {} -> {}",
                    participant.participant_id, participant.role, new_role
                );
                events.push(EngineEvent::RoleChanged {
                    at:             now,
                    participant_id: participant.participant_id.clone(),
                    from_role:      participant.role,
                    to_role:        new_role,
                });
                participant.role = new_role;
            }

            if self.config.cascade == CascadePolicy::SingleStep {
                break;
            }
        }

        events
    }

    fn heal_missing_rank(&self, participant: &mut Participant, now: Timestamp) -> Option<EngineEvent> {
        let progress = &mut participant.rank_progress;
        if self.ranks.contains(&progress.current_rank_id) {
            return None;
        }

        let lowest = self.ranks.lowest();
        let missing = EngineError::MissingRankDefinition {
            rank_id: progress.current_rank_id.clone(),
        };
        log::warn!(
            "participant={} promotion: {} ({missing}), falling back to '{}'",
            participant.participant_id,
            missing.kind().code(),
            lowest.id
        );

        let missing_rank = std::mem::replace(&mut progress.current_rank_id, lowest.id.clone());
        progress.target_cc = lowest.target_cc;

        Some(EngineEvent::RankFallback {
            at:             now,
            participant_id: participant.participant_id.clone(),
            kind:           missing.kind(),
            missing_rank,
            fallback_rank:  lowest.id.clone(),
        })
    }
}
