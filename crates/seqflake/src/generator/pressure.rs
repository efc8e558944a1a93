/// A source of "concurrency pressure": how many threads might be racing on a
/// generator right now.
///
/// The automatic tolerance heuristic (see [`MaxTimeExceed::Auto`]) reads this
/// on the clock-behind path only. Swap the provider to mock it in tests or to
/// base the heuristic on something other than OS threads.
///
/// [`MaxTimeExceed::Auto`]: crate::MaxTimeExceed::Auto
pub trait ConcurrencyPressure {
    /// The number of live threads that may call into the generator.
    fn thread_count(&self) -> usize;
}

/// Counts the live threads of the current process.
///
/// On Linux this is the number of entries in `/proc/self/task`. Elsewhere, or
/// if procfs is unavailable, it falls back to the number of logical CPUs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessThreads;

impl ProcessThreads {
    #[cfg(target_os = "linux")]
    fn live_threads() -> Option<usize> {
        std::fs::read_dir("/proc/self/task")
            .ok()
            .map(|tasks| tasks.filter(Result::is_ok).count())
            .filter(|&count| count > 0)
    }

    #[cfg(not(target_os = "linux"))]
    fn live_threads() -> Option<usize> {
        None
    }
}

impl ConcurrencyPressure for ProcessThreads {
    fn thread_count(&self) -> usize {
        Self::live_threads().unwrap_or_else(num_cpus::get)
    }
}

/// A constant thread count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedPressure(pub usize);

impl ConcurrencyPressure for FixedPressure {
    fn thread_count(&self) -> usize {
        self.0
    }
}
