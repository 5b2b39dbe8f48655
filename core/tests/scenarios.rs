//! End-to-end sale processing: valuation -> ledger -> promotion.

use chrono::{TimeZone, Utc};
use credit_rank_core::{
    clock::{Clock, FixedClock},
    config::EngineConfig,
    engine::CreditEngine,
    error::ErrorKind,
    event::EngineEvent,
    participant::{ParticipantRecord, Role},
    valuation::{SaleStatus, SaleSubmission, SaleType},
};
use std::sync::Arc;

fn build_engine() -> (CreditEngine, Arc<FixedClock>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()));
    let engine = CreditEngine::build_with_clock(EngineConfig::standard(), clock.clone()).unwrap();
    (engine, clock)
}

#[test]
fn scenario_a_retail_692_earns_two_cc() {
    let (engine, _) = build_engine();
    let sale = engine
        .value_sale(&SaleSubmission::new(692.0, SaleType::Retail))
        .unwrap();

    assert_eq!(sale.cc_earned, 2.0);
    assert_eq!(sale.sale_type, SaleType::Retail);
    assert_eq!(sale.status, SaleStatus::Completed);
}

#[test]
fn scenario_b_first_target_met_promotes() {
    let (engine, _) = build_engine();
    let p = engine.enroll("fbo-b", Role::Student);

    let out = engine
        .process_sale(&p, &SaleSubmission::new(692.0, SaleType::Retail))
        .unwrap();
    let progress = &out.participant.rank_progress;

    assert!(out.promoted());
    assert_eq!(progress.history().len(), 1);
    assert_eq!(progress.history()[0].rank_id, "NOVUS");
    assert_eq!(progress.history()[0].total_cc_at_time, 2.0);
    assert_eq!(progress.current_rank_id, "AS_SUP");
    assert_eq!(progress.current_cycle_cc, 0.0);
    assert_eq!(out.participant.case_credits, 2.0);
    assert_eq!(out.participant.role, Role::Sponsor);
}

#[test]
fn scenario_c_wholesale_sale_below_target() {
    let (engine, _) = build_engine();
    let mut p = engine.enroll("fbo-c", Role::Student);
    p.rank_progress.current_cycle_cc = 0.5;
    p.case_credits = 0.5;

    let out = engine
        .process_sale(&p, &SaleSubmission::new(242.0, SaleType::Wholesale))
        .unwrap();

    assert_eq!(out.sale.cc_earned, 1.0);
    assert_eq!(out.participant.rank_progress.current_cycle_cc, 1.5);
    assert_eq!(out.participant.rank_progress.current_rank_id, "NOVUS");
    assert!(out.participant.rank_progress.history().is_empty());
    assert!(!out.promoted());
}

#[test]
fn scenario_d_negative_amount_rejected_and_record_unchanged() {
    let (engine, _) = build_engine();
    let p = engine.enroll("fbo-d", Role::Student);
    let before = serde_json::to_vec(&p).unwrap();

    for sale_type in ["RETAIL", "WHOLESALE", "NOT_A_TYPE"] {
        let submission = SaleSubmission {
            amount: -50.0,
            sale_type: sale_type.into(),
            transaction_id: None,
            timestamp: None,
        };
        let err = engine.process_sale(&p, &submission).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount, "sale type {sale_type}");
    }

    assert_eq!(serde_json::to_vec(&p).unwrap(), before);
}

#[test]
fn unknown_sale_type_is_rejected() {
    let (engine, _) = build_engine();
    let p = engine.enroll("fbo-e", Role::Student);
    let submission = SaleSubmission {
        amount: 692.0,
        sale_type: "DROPSHIP".into(),
        transaction_id: None,
        timestamp: None,
    };

    let err = engine.process_sale(&p, &submission).unwrap_err();

    assert_eq!(err.kind().code(), "INVALID_SALE_TYPE");
    assert!(err.to_string().contains("DROPSHIP"));
}

#[test]
fn events_describe_the_sale_in_order() {
    let (engine, clock) = build_engine();
    let p = engine.enroll("fbo-f", Role::Student);
    let submission = SaleSubmission::new(692.0, SaleType::Retail).with_transaction_id("txn-0001");

    let out = engine.process_sale(&p, &submission).unwrap();

    let types: Vec<_> = out.events.iter().map(|e| e.type_name()).collect();
    assert_eq!(types, ["sale_recorded", "credit_applied", "rank_promoted", "role_changed"]);
    match &out.events[0] {
        EngineEvent::SaleRecorded { transaction_id, cc_earned, at, .. } => {
            assert_eq!(transaction_id, "txn-0001");
            assert_eq!(*cc_earned, 2.0);
            assert_eq!(*at, clock.now());
        }
        other => panic!("unexpected first event {other:?}"),
    }
}

#[test]
fn transaction_id_is_minted_when_missing() {
    let (engine, _) = build_engine();
    let a = engine.value_sale(&SaleSubmission::new(10.0, SaleType::Retail)).unwrap();
    let b = engine.value_sale(&SaleSubmission::new(10.0, SaleType::Retail)).unwrap();

    assert!(!a.transaction_id.is_empty());
    assert_ne!(a.transaction_id, b.transaction_id);
}

#[test]
fn submitted_timestamp_is_kept() {
    let (engine, _) = build_engine();
    let when = Utc.with_ymd_and_hms(2025, 12, 24, 18, 30, 0).unwrap();
    let submission = SaleSubmission {
        timestamp: Some(when),
        ..SaleSubmission::new(346.0, SaleType::Retail)
    };

    let sale = engine.value_sale(&submission).unwrap();

    assert_eq!(sale.timestamp, when);
    assert_eq!(sale.cc_earned, 1.0);
}

#[test]
fn submission_parses_from_ui_json() {
    let (engine, _) = build_engine();
    let submission: SaleSubmission = serde_json::from_str(
        r#"{ "amount": 484, "sale_type": "wholesale", "transaction_id": "ui-77" }"#,
    )
    .unwrap();

    let sale = engine.value_sale(&submission).unwrap();

    assert_eq!(sale.sale_type, SaleType::Wholesale);
    assert_eq!(sale.cc_earned, 2.0);
    assert_eq!(sale.transaction_id, "ui-77");
}

#[test]
fn legacy_record_gets_default_progress_on_load() {
    let (engine, clock) = build_engine();
    let record: ParticipantRecord = serde_json::from_str(
        r#"{ "participant_id": "legacy-fbo", "role": "STUDENT", "case_credits": 7.5 }"#,
    )
    .unwrap();
    assert!(record.rank_progress.is_none());

    let p = engine.load_participant(record).unwrap();

    assert_eq!(p.case_credits, 7.5);
    assert_eq!(p.rank_progress.current_rank_id, "NOVUS");
    assert_eq!(p.rank_progress.current_cycle_cc, 0.0);
    assert_eq!(p.rank_progress.target_cc, 2.0);
    assert_eq!(p.rank_progress.cycle_start_date, clock.now());
    assert!(p.rank_progress.history().is_empty());
}

#[test]
fn stored_record_with_negative_cc_is_rejected_on_load() {
    let (engine, _) = build_engine();
    let negative_lifetime: ParticipantRecord = serde_json::from_str(
        r#"{ "participant_id": "bad-1", "role": "STUDENT", "case_credits": -1.0 }"#,
    )
    .unwrap();
    let err = engine.load_participant(negative_lifetime).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRecord);
    assert_eq!(err.kind().code(), "INVALID_RECORD");

    let mut p = engine.enroll("bad-2", Role::Student);
    p.rank_progress.current_cycle_cc = -0.5;
    let err = engine.load_participant(p.into_record()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRecord);
}

#[test]
fn stored_progress_survives_a_round_trip_through_load() {
    let (engine, _) = build_engine();
    let p = engine.enroll("fbo-g", Role::Student);
    let p = engine
        .process_sale(&p, &SaleSubmission::new(692.0, SaleType::Retail))
        .unwrap()
        .participant;

    let json = serde_json::to_string(&p.clone().into_record()).unwrap();
    let reloaded = engine.load_participant(serde_json::from_str(&json).unwrap()).unwrap();

    assert_eq!(reloaded, p);
}

#[test]
fn participant_update_carries_display_fields() {
    let (engine, _) = build_engine();
    let p = engine.enroll("fbo-h", Role::Student);
    let out = engine
        .process_sale(&p, &SaleSubmission::new(692.0, SaleType::Retail))
        .unwrap();

    let update = out.participant.update();
    let json = serde_json::to_value(&update).unwrap();

    assert_eq!(json["case_credits"], 2.0);
    assert_eq!(json["role"], "SPONSOR");
    assert_eq!(json["rank_progress"]["current_rank_id"], "AS_SUP");
    assert_eq!(json["rank_progress"]["history"][0]["rank_id"], "NOVUS");
}
