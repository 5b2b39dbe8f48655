//! Credit ledger: forward-only accrual of CC.
//!
//! The ledger never decides promotion and never touches rank, target,
//! history or role. It returns a new participant; the input is left as is.
//!
//! Deltas must already sit on the three-decimal CC grid (every value the
//! calculator returns does). Totals then move by exactly the delta.

use crate::{
    error::{EngineError, EngineResult},
    participant::Participant,
    types::{is_cc_grid, round_cc, Cc},
};

pub fn apply_credit(participant: &Participant, cc_delta: Cc) -> EngineResult<Participant> {
    if !is_cc_grid(cc_delta) || cc_delta < 0.0 {
        return Err(EngineError::InvalidDelta { delta: cc_delta });
    }

    let lifetime = round_cc(participant.case_credits + cc_delta);
    let cycle = round_cc(participant.rank_progress.current_cycle_cc + cc_delta);
    if !lifetime.is_finite() || !cycle.is_finite() {
        return Err(EngineError::InvalidDelta { delta: cc_delta });
    }

    let mut next = participant.clone();
    next.case_credits = lifetime;
    next.rank_progress.current_cycle_cc = cycle;

    log::debug!(
        "participant={} ledger: +{:.3} CC -> lifetime={:.3} cycle={:.3}",
        next.participant_id,
        cc_delta,
        next.case_credits,
        next.rank_progress.current_cycle_cc
    );

    Ok(next)
}
