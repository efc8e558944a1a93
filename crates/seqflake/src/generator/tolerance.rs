use portable_atomic::{AtomicU64, Ordering};

use crate::{ConcurrencyPressure, SnowflakeUid};

/// How far (in milliseconds) the generator's claimed time may run ahead of
/// the clock before [`next_id`] fails instead of waiting.
///
/// [`next_id`]: crate::SnowflakeUidGenerator::next_id
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaxTimeExceed {
    /// Derived from the current thread count on every check; see
    /// [`auto_tolerance_millis`].
    #[default]
    Auto,
    /// A fixed tolerance. `u64::MAX` is clamped to `u64::MAX - 1`.
    Fixed(u64),
}

impl MaxTimeExceed {
    const AUTO_RAW: u64 = u64::MAX;

    const fn to_raw(self) -> u64 {
        match self {
            Self::Auto => Self::AUTO_RAW,
            Self::Fixed(millis) if millis == Self::AUTO_RAW => Self::AUTO_RAW - 1,
            Self::Fixed(millis) => millis,
        }
    }

    const fn from_raw(raw: u64) -> Self {
        if raw == Self::AUTO_RAW {
            Self::Auto
        } else {
            Self::Fixed(raw)
        }
    }
}

/// Tolerance for a given number of live threads.
///
/// Fewer threads than the sequence space (4096) can never outrun the clock by
/// more than a millisecond, so the tolerance is `1`. Past that, every further
/// 4096 threads add two milliseconds: `(threads >> 12) << 1`.
pub const fn auto_tolerance_millis(thread_count: usize) -> u64 {
    let threads = thread_count as u64;
    if threads <= SnowflakeUid::SEQUENCE_MASK {
        1
    } else {
        (threads >> SnowflakeUid::SEQUENCE_BITS) << 1
    }
}

/// Shared, relaxed storage for a [`MaxTimeExceed`].
#[derive(Debug)]
pub(crate) struct ToleranceCell {
    raw: AtomicU64,
}

impl ToleranceCell {
    pub(crate) const fn new(value: MaxTimeExceed) -> Self {
        Self {
            raw: AtomicU64::new(value.to_raw()),
        }
    }

    pub(crate) fn get(&self) -> MaxTimeExceed {
        MaxTimeExceed::from_raw(self.raw.load(Ordering::Relaxed))
    }

    pub(crate) fn set(&self, value: MaxTimeExceed) {
        self.raw.store(value.to_raw(), Ordering::Relaxed);
    }

    pub(crate) fn resolve(&self, pressure: &impl ConcurrencyPressure) -> u64 {
        match self.get() {
            MaxTimeExceed::Fixed(millis) => millis,
            MaxTimeExceed::Auto => auto_tolerance_millis(pressure.thread_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedPressure;

    #[test]
    fn auto_tolerance_is_one_below_sequence_space() {
        assert_eq!(auto_tolerance_millis(0), 1);
        assert_eq!(auto_tolerance_millis(1), 1);
        assert_eq!(auto_tolerance_millis(4095), 1);
    }

    #[test]
    fn auto_tolerance_scales_with_threads() {
        assert_eq!(auto_tolerance_millis(4096), 2);
        assert_eq!(auto_tolerance_millis(8191), 2);
        assert_eq!(auto_tolerance_millis(8192), 4);
        assert_eq!(auto_tolerance_millis(40_960), 20);
    }

    #[test]
    fn cell_resolves_fixed_and_auto() {
        let cell = ToleranceCell::new(MaxTimeExceed::Auto);
        assert_eq!(cell.resolve(&FixedPressure(10_000)), 4);

        cell.set(MaxTimeExceed::Fixed(0));
        assert_eq!(cell.get(), MaxTimeExceed::Fixed(0));
        assert_eq!(cell.resolve(&FixedPressure(10_000)), 0);

        cell.set(MaxTimeExceed::Auto);
        assert_eq!(cell.resolve(&FixedPressure(3)), 1);
    }

    #[test]
    fn fixed_max_does_not_collide_with_auto() {
        let cell = ToleranceCell::new(MaxTimeExceed::Fixed(u64::MAX));
        assert_eq!(cell.get(), MaxTimeExceed::Fixed(u64::MAX - 1));
    }
}
