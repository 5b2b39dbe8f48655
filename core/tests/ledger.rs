//! Credit ledger: forward-only accrual.

use chrono::{TimeZone, Utc};
use credit_rank_core::{
    config::EngineConfig,
    error::ErrorKind,
    ledger::apply_credit,
    participant::{Participant, Role},
    rank::RankTable,
};

fn fresh_participant() -> Participant {
    let table = RankTable::new(EngineConfig::standard().ranks).unwrap();
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    Participant::new("fbo-ledger", Role::Student, &table, start)
}

#[test]
fn credit_adds_to_lifetime_and_cycle() {
    let mut p = fresh_participant();
    p.rank_progress.current_cycle_cc = 0.5;
    p.case_credits = 0.5;

    let next = apply_credit(&p, 1.0).unwrap();

    assert_eq!(next.case_credits, 1.5);
    assert_eq!(next.rank_progress.current_cycle_cc, 1.5);
}

#[test]
fn ledger_never_promotes_on_its_own() {
    let p = fresh_participant();
    let next = apply_credit(&p, 50.0).unwrap();

    assert_eq!(next.rank_progress.current_rank_id, "NOVUS");
    assert_eq!(next.rank_progress.current_cycle_cc, 50.0);
    assert!(next.rank_progress.history().is_empty());
    assert_eq!(next.role, Role::Student);
}

#[test]
fn input_record_is_left_untouched() {
    let p = fresh_participant();
    let before = p.clone();
    let _ = apply_credit(&p, 3.25).unwrap();
    assert_eq!(p, before);
}

#[test]
fn negative_delta_is_rejected_without_mutation() {
    let p = fresh_participant();
    let before = serde_json::to_string(&p).unwrap();

    let err = apply_credit(&p, -0.001).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidDelta);
    assert_eq!(serde_json::to_string(&p).unwrap(), before);
}

#[test]
fn non_finite_delta_is_rejected() {
    let p = fresh_participant();
    for delta in [f64::NAN, f64::INFINITY] {
        assert_eq!(apply_credit(&p, delta).unwrap_err().kind(), ErrorKind::InvalidDelta);
    }
}

#[test]
fn zero_delta_is_accepted() {
    let p = fresh_participant();
    let next = apply_credit(&p, 0.0).unwrap();
    assert_eq!(next, p);
}

#[test]
fn many_small_credits_sum_without_drift() {
    let mut p = fresh_participant();
    for _ in 0..1000 {
        p = apply_credit(&p, 0.001).unwrap();
    }
    assert_eq!(p.case_credits, 1.0);
    assert_eq!(p.rank_progress.current_cycle_cc, 1.0);
}

#[test]
fn delta_off_the_cc_grid_is_rejected() {
    let p = fresh_participant();
    for delta in [0.0004, 1.9996, 0.1234] {
        let err = apply_credit(&p, delta).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDelta, "delta {delta}");
    }
}

#[test]
fn cycle_moves_by_exactly_the_delta() {
    let mut p = fresh_participant();
    p.rank_progress.current_cycle_cc = 1.25;
    p.case_credits = 7.5;

    let next = apply_credit(&p, 0.289).unwrap();

    assert_eq!(next.rank_progress.current_cycle_cc, 1.539);
    assert_eq!(next.case_credits, 7.789);
}

#[test]
fn overflowing_totals_are_rejected() {
    let mut p = fresh_participant();
    p.case_credits = f64::MAX;

    let err = apply_credit(&p, 1e308).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDelta);
}
