use std::time::{SystemTime, UNIX_EPOCH};

use crate::TimeSource;

/// The system wall clock.
///
/// Reads [`SystemTime::now`] on every call. A system clock set before 1970 is
/// reported as `0` rather than panicking; the generator then treats every
/// reading as being at (or before) its epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_2017() {
        assert!(SystemClock.current_millis() > crate::EPOCH_2017_UTC.as_millis() as u64);
    }
}
