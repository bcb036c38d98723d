//! TAI timestamp conversion (spec §3, §4.9: "DS-clock-offset-corrected
//! current TAI").
//!
//! Grounded on the original `ska_epoch_to_tai` module, but simplified per
//! the decision recorded in DESIGN.md: rather than pulling the IERS leap
//! second table, the fixed `1999-12-31T23:59:28Z` SKA epoch and the leap
//! seconds accumulated between that epoch and the current era are both
//! folded into one constant offset.

/// Unix seconds for `1999-12-31T23:59:28Z`.
const SKA_EPOCH_UNIX_SECONDS: f64 = 946_684_768.0;

/// TAI-UTC grew from 32s (at the SKA epoch) to 37s (2017-present); folding
/// that delta in here keeps `tai_from_unix_seconds` a single subtraction.
const LEAP_SECOND_DELTA_SINCE_EPOCH: f64 = 5.0;

/// Convert a Unix timestamp (seconds) to a TAI timestamp relative to the
/// SKA epoch.
pub fn tai_from_unix_seconds(unix_s: f64) -> f64 {
    unix_s - SKA_EPOCH_UNIX_SECONDS + LEAP_SECOND_DELTA_SINCE_EPOCH
}

/// The current TAI timestamp, used to stamp LRC ids and track-table rows.
pub fn current_tai_timestamp() -> f64 {
    tai_from_unix_seconds(chrono::Utc::now().timestamp() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tai_at_the_ska_epoch_is_the_leap_second_delta() {
        assert_eq!(tai_from_unix_seconds(SKA_EPOCH_UNIX_SECONDS), LEAP_SECOND_DELTA_SINCE_EPOCH);
    }

    #[test]
    fn tai_advances_one_second_per_unix_second() {
        let a = tai_from_unix_seconds(1_000_000_000.0);
        let b = tai_from_unix_seconds(1_000_000_001.0);
        assert_eq!(b - a, 1.0);
    }
}
