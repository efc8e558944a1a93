use std::sync::Arc;

/// A trait for wall-clock time sources.
///
/// Unlike a monotonic ticker, implementations are expected to follow the
/// system's wall clock, including adjustments in either direction. The
/// generator relies on observing those adjustments to detect regressions and
/// to catch up after idle periods.
///
/// The unit is **milliseconds since the Unix epoch**; the generator subtracts
/// its own epoch.
///
/// # Example
///
/// ```
/// use seqflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_483_228_800_000
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1_483_228_800_000);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 UTC.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
