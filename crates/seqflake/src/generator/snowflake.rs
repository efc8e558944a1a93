use core::{cmp, time::Duration};

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ConcurrencyPressure, DecodedUid, Error, MaxTimeExceed, ProcessThreads, Result, SnowflakeUid,
    SystemClock, TimeSource, generator::tolerance::ToleranceCell, local_epoch,
};

/// A lock-free Snowflake ID generator built on one packed atomic counter.
///
/// The state is a single [`AtomicU64`] holding
/// `elapsed_millis << 12 | sequence`. Every call to [`next_id`] does one
/// `fetch_add(1)`, which hands out the sequence and, when the low 12 bits
/// wrap, carries into the millisecond field with no extra branch. The clock
/// is then compared against the millisecond the counter claims:
///
/// - clock ahead: the counter is stale (e.g. after an idle period) and is
///   reset to the current millisecond with a single compare-and-swap, then
///   the call retries;
/// - clock behind within tolerance: the counter outran the clock; the call
///   yields until the clock catches up;
/// - clock behind beyond tolerance: [`Error::ClockRegression`].
///
/// ## Features
/// - ✅ Thread-safe, no locks
/// - ✅ Multiple independent generators per process
/// - ❌ Not `no_std`: the tolerated wait yields to the OS scheduler
///
/// ## Example
/// ```
/// use seqflake::SnowflakeUidGenerator;
///
/// let generator = SnowflakeUidGenerator::new(7)?;
/// let id = generator.next_id()?;
///
/// assert_eq!(generator.decode(id).worker_id, 7);
/// # Ok::<(), seqflake::Error>(())
/// ```
///
/// [`next_id`]: Self::next_id
pub struct SnowflakeUidGenerator<T = SystemClock, P = ProcessThreads>
where
    T: TimeSource,
    P: ConcurrencyPressure,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    worker_id: u64,
    epoch_millis: u64,
    max_time_exceed: ToleranceCell,
    time: T,
    pressure: P,
}

impl SnowflakeUidGenerator {
    /// Creates a generator on the system clock, using the local-calendar
    /// 2017-01-01 epoch and the process thread count for automatic tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] unless `0 <= worker_id <= 1023`.
    pub fn new(worker_id: i64) -> Result<Self> {
        Self::with_parts(worker_id, local_epoch(), SystemClock, ProcessThreads)
    }
}

impl<T, P> SnowflakeUidGenerator<T, P>
where
    T: TimeSource,
    P: ConcurrencyPressure,
{
    /// Creates a generator from explicit parts.
    ///
    /// # Parameters
    ///
    /// - `worker_id`: encoded into every ID; must be in `0..=1023`.
    /// - `epoch`: the origin of the timestamp field, as a [`Duration`] since
    ///   1970-01-01 UTC. Generators whose IDs are compared must share it.
    /// - `time`: the wall clock.
    /// - `pressure`: the thread-count source for [`MaxTimeExceed::Auto`].
    ///
    /// The counter starts at the current millisecond with sequence zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] unless `0 <= worker_id <= 1023`.
    pub fn with_parts(worker_id: i64, epoch: Duration, time: T, pressure: P) -> Result<Self> {
        let worker_id = u64::try_from(worker_id)
            .ok()
            .filter(|&id| id <= SnowflakeUid::WORKER_ID_MASK)
            .ok_or(Error::InvalidWorkerId {
                worker_id,
                max: SnowflakeUid::WORKER_ID_MASK,
            })?;
        let epoch_millis = epoch.as_millis() as u64;
        let initial = time_sequence_at(time.current_millis(), epoch_millis);

        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial),
            worker_id,
            epoch_millis,
            max_time_exceed: ToleranceCell::new(MaxTimeExceed::Auto),
            time,
            pressure,
        })
    }

    /// Generates the next ID.
    ///
    /// Blocks (yielding the thread) only when the counter has run ahead of
    /// the clock by no more than the tolerance, which is normally a fraction
    /// of a millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockRegression`] if the clock reads further behind
    /// the counter than [`max_time_exceed_millis`] allows. Nothing is
    /// retried; the next call checks again.
    ///
    /// [`max_time_exceed_millis`]: Self::max_time_exceed_millis
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeUid> {
        loop {
            let current = self.state.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
            let last_millis = (current >> SnowflakeUid::SEQUENCE_BITS) + self.epoch_millis;
            let now = self.time.current_millis();

            match now.cmp(&last_millis) {
                cmp::Ordering::Equal => {}
                cmp::Ordering::Greater => {
                    self.catch_up(current, now);
                    continue;
                }
                cmp::Ordering::Less => self.cold_clock_behind(current, last_millis, now)?,
            }

            return Ok(SnowflakeUid::from_time_sequence(current, self.worker_id));
        }
    }

    /// Moves a stale counter forward to `now`. Only the caller whose observed
    /// value is still current wins; everyone else just retries.
    fn catch_up(&self, observed: u64, now: u64) {
        if self
            .state
            .compare_exchange(
                observed,
                time_sequence_at(now, self.epoch_millis),
                Ordering::Relaxed,
                Ordering::Relaxed,
            )
            .is_ok()
        {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                worker_id = self.worker_id,
                behind_millis = now - ((observed >> SnowflakeUid::SEQUENCE_BITS) + self.epoch_millis),
                "counter behind clock; reset to current millisecond"
            );
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, current: u64, last_millis: u64, now: u64) -> Result<()> {
        let tolerance_millis = self.max_time_exceed_millis();

        if last_millis - now <= tolerance_millis {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                worker_id = self.worker_id,
                ahead_millis = last_millis - now,
                "counter ahead of clock; waiting"
            );
            while self.time.current_millis() < last_millis {
                std::thread::yield_now();
            }
            return Ok(());
        }

        // Hand the slot back if nobody has advanced past it.
        let _ = self.state.compare_exchange(
            current,
            current.wrapping_sub(1),
            Ordering::Relaxed,
            Ordering::Relaxed,
        );

        #[cfg(feature = "tracing")]
        tracing::warn!(
            worker_id = self.worker_id,
            last_millis,
            now_millis = now,
            tolerance_millis,
            "clock moved backwards beyond tolerance"
        );

        Err(Error::ClockRegression {
            last_millis,
            now_millis: now,
            tolerance_millis,
        })
    }

    /// Splits `id` into its fields using this generator's epoch.
    pub const fn decode(&self, id: SnowflakeUid) -> DecodedUid {
        id.decode(self.epoch())
    }

    /// The worker ID encoded into every generated ID.
    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// The epoch the timestamp field counts from.
    pub const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }

    /// The configured tolerance policy.
    pub fn max_time_exceed(&self) -> MaxTimeExceed {
        self.max_time_exceed.get()
    }

    /// The tolerance in effect right now, in milliseconds. For
    /// [`MaxTimeExceed::Auto`] this samples the concurrency-pressure provider.
    pub fn max_time_exceed_millis(&self) -> u64 {
        self.max_time_exceed.resolve(&self.pressure)
    }

    /// Fixes the tolerance at `millis`. Any value is accepted, including `0`
    /// (fail on every clock lag).
    pub fn set_max_time_exceed_millis(&self, millis: u64) {
        self.set_max_time_exceed(MaxTimeExceed::Fixed(millis));
    }

    /// Replaces the tolerance policy. Visible to other threads eventually;
    /// no ordering is implied with respect to in-flight calls.
    pub fn set_max_time_exceed(&self, policy: MaxTimeExceed) {
        self.max_time_exceed.set(policy);
    }
}

impl<T, P> core::fmt::Debug for SnowflakeUidGenerator<T, P>
where
    T: TimeSource,
    P: ConcurrencyPressure,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SnowflakeUidGenerator")
            .field("worker_id", &self.worker_id)
            .field("epoch_millis", &self.epoch_millis)
            .field("time_sequence", &self.state.load(Ordering::Relaxed))
            .field("max_time_exceed", &self.max_time_exceed.get())
            .finish_non_exhaustive()
    }
}

/// `(now - epoch) << 12`, clamped to zero for clocks before the epoch.
const fn time_sequence_at(now_millis: u64, epoch_millis: u64) -> u64 {
    now_millis.saturating_sub(epoch_millis) << SnowflakeUid::SEQUENCE_BITS
}
