//! Credit & rank progression engine for Forever Business Owner participants.
//!
//! A sale is valued in Case Credits, credited to the participant's lifetime
//! and cycle totals, and checked against the rank ladder. The caller gets a
//! new participant record and the audit events describing the change.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod participant;
pub mod promotion;
pub mod rank;
pub mod registry;
pub mod role;
pub mod types;
pub mod valuation;
