use thiserror::Error;

/// A result type defaulting to the crate's [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `seqflake` can emit.
///
/// Both variants are unrecoverable for the call that produced them. Neither is
/// retried automatically.
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The worker ID passed at construction does not fit in the 10-bit worker
    /// field.
    ///
    /// The generator is never created; construct a new one with an ID in
    /// `0..=1023`.
    #[error("worker id ({worker_id}) must be between 0 and {max}")]
    InvalidWorkerId {
        /// The rejected worker ID, as supplied by the caller.
        worker_id: i64,
        /// The largest accepted worker ID.
        max: u64,
    },

    /// The wall clock was observed behind the generator's claimed millisecond
    /// by more than the tolerated skew.
    ///
    /// The generator's time-sequence is not reset by this failure. A later
    /// call re-checks against the current time and fails again for as long as
    /// the condition holds.
    #[error(
        "clock moved backwards: generator is at {last_millis}ms but the clock reads \
         {now_millis}ms (tolerance {tolerance_millis}ms)"
    )]
    ClockRegression {
        /// The millisecond (since the Unix epoch) the counter claims.
        last_millis: u64,
        /// The millisecond (since the Unix epoch) the clock reported.
        now_millis: u64,
        /// The tolerance that was exceeded.
        tolerance_millis: u64,
    },
}

impl Error {
    /// Returns `true` for configuration errors raised at construction.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidWorkerId { .. })
    }

    /// Returns `true` for clock regressions raised during generation.
    pub const fn is_clock_regression(&self) -> bool {
        matches!(self, Self::ClockRegression { .. })
    }

    /// How far behind the clock was, in milliseconds, for a
    /// [`Error::ClockRegression`].
    pub const fn regression_millis(&self) -> Option<u64> {
        match self {
            Self::ClockRegression {
                last_millis,
                now_millis,
                ..
            } => Some((*last_millis).saturating_sub(*now_millis)),
            Self::InvalidWorkerId { .. } => None,
        }
    }
}
