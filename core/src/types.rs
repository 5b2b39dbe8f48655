//! Shared primitive types used across the engine.

use chrono::{DateTime, Utc};

/// Case Credits. Always carried at three decimal places.
pub type Cc = f64;

/// A stable, unique identifier for a participant.
pub type ParticipantId = String;

/// Identifier of a rank on the ladder, e.g. `"AS_SUP"`.
pub type RankId = String;

/// Wall-clock instant used for sale timestamps and promotion dates.
pub type Timestamp = DateTime<Utc>;

/// Number of decimal places CC values are kept at.
pub const CC_DECIMALS: i32 = 3;

/// Above this magnitude every f64 is already an integer, so a scaled value
/// has no fractional thousandths left to round.
const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0; // 2^52

/// Round a CC value to three decimal places, half away from zero.
///
/// Every CC value that leaves the calculator or the ledger goes through here,
/// so repeated additions never accumulate binary float residue. Values too
/// large to scale come back unchanged.
pub fn round_cc(value: f64) -> Cc {
    let scale = 10f64.powi(CC_DECIMALS);
    let scaled = value * scale;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }
    // Absorb representation error just below a .5 boundary (e.g. 1.0005).
    let nudged = scaled + scaled.signum() * 1e-9;
    nudged.round() / scale
}

/// True when `value` already sits on the three-decimal CC grid.
pub fn is_cc_grid(value: f64) -> bool {
    value.is_finite() && round_cc(value) == value
}
