use core::fmt;

use chrono::{DateTime, Local, TimeZone};

/// The fields of a [`SnowflakeUid`](crate::SnowflakeUid) with the timestamp
/// resolved against an epoch.
///
/// Produced by [`SnowflakeUid::decode`](crate::SnowflakeUid::decode) and
/// [`SnowflakeUidGenerator::decode`](crate::SnowflakeUidGenerator::decode).
/// The [`Display`](fmt::Display) form is meant for logs:
///
/// ```text
/// TIME=[2017-01-01 00:00:01 000] ID=[9] SEQ=[10]
/// ```
///
/// with the time rendered in the local calendar.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodedUid {
    /// Milliseconds since 1970-01-01 UTC.
    pub timestamp_millis: u64,
    /// The worker ID field.
    pub worker_id: u64,
    /// The sequence field.
    pub sequence: u64,
}

impl DecodedUid {
    /// The timestamp as a local date-time, or `None` if it is outside
    /// chrono's representable range.
    pub fn datetime(&self) -> Option<DateTime<Local>> {
        let millis = i64::try_from(self.timestamp_millis).ok()?;
        Local.timestamp_millis_opt(millis).single()
    }
}

impl fmt::Display for DecodedUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.datetime() {
            Some(time) => write!(f, "TIME=[{}]", time.format("%Y-%m-%d %H:%M:%S %3f"))?,
            None => write!(f, "TIME=[{}ms]", self.timestamp_millis)?,
        }
        write!(f, " ID=[{}] SEQ=[{}]", self.worker_id, self.sequence)
    }
}
