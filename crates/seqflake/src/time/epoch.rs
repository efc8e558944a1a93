use core::time::Duration;
use std::sync::OnceLock;

use chrono::{Local, TimeZone};

/// 2017-01-01 00:00:00.000 UTC, as a [`Duration`] since the Unix epoch.
///
/// Used when the local calendar cannot resolve midnight on that day (for
/// example, a time zone that skipped it).
pub const EPOCH_2017_UTC: Duration = Duration::from_millis(1_483_228_800_000);

/// 2017-01-01 00:00:00.000 in the process's local calendar.
///
/// Resolved once per process from the local time zone and cached, so every
/// generator in the process agrees on it. Generators on hosts in different
/// time zones disagree by their UTC offset; pin [`EPOCH_2017_UTC`] (or any
/// shared constant) through
/// [`SnowflakeUidGenerator::with_parts`](crate::SnowflakeUidGenerator::with_parts)
/// when ids are compared across such hosts.
pub fn local_epoch() -> Duration {
    static EPOCH: OnceLock<Duration> = OnceLock::new();
    *EPOCH.get_or_init(|| {
        Local
            .with_ymd_and_hms(2017, 1, 1, 0, 0, 0)
            .earliest()
            .and_then(|midnight| u64::try_from(midnight.timestamp_millis()).ok())
            .map_or(EPOCH_2017_UTC, Duration::from_millis)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_epoch_is_within_a_day_of_utc_midnight() {
        let local = local_epoch().as_millis() as i128;
        let utc = EPOCH_2017_UTC.as_millis() as i128;
        assert!((local - utc).abs() <= 26 * 60 * 60 * 1000);
    }

    #[test]
    fn local_epoch_is_stable() {
        assert_eq!(local_epoch(), local_epoch());
    }
}
