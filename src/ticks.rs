//! Integer timestamp encoding for file modification times.
//!
//! A tick is 100 nanoseconds; tick zero is midnight 0001-01-01 UTC. The
//! only properties callers may rely on are that larger means later and
//! that equal means the same recorded instant.

use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Ticks per second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks between 0001-01-01 and the Unix epoch.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// Convert a `SystemTime` to ticks.
pub fn from_system_time(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => UNIX_EPOCH_TICKS.saturating_add((after.as_nanos() / 100) as i64),
        Err(before) => UNIX_EPOCH_TICKS.saturating_sub((before.duration().as_nanos() / 100) as i64),
    }
}

/// Ticks for the current instant.
pub fn now() -> i64 {
    from_system_time(SystemTime::now())
}

/// Convert ticks to a UTC datetime, if representable.
pub fn to_datetime(ticks: i64) -> Option<DateTime<Utc>> {
    let since_epoch = ticks - UNIX_EPOCH_TICKS;
    let secs = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = (since_epoch.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    #[test]
    fn test_unix_epoch_maps_to_offset() {
        assert_eq!(from_system_time(UNIX_EPOCH), UNIX_EPOCH_TICKS);
    }

    #[test]
    fn test_to_datetime_roundtrips_seconds() {
        let time = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let dt = to_datetime(from_system_time(time)).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_before_epoch_is_smaller() {
        let before = UNIX_EPOCH - Duration::from_secs(60);
        assert_eq!(
            from_system_time(before),
            UNIX_EPOCH_TICKS - 60 * TICKS_PER_SECOND
        );
    }

    proptest! {
        /// Later instants never produce fewer ticks
        #[test]
        fn ticks_preserve_ordering(a in 0u64..4_000_000_000, b in 0u64..4_000_000_000) {
            let ta = from_system_time(UNIX_EPOCH + Duration::from_millis(a));
            let tb = from_system_time(UNIX_EPOCH + Duration::from_millis(b));
            prop_assert_eq!(a.cmp(&b), ta.cmp(&tb));
        }
    }
}
