//! When to reclaim tombstoned slots.

/// Decides when an ordered container rebuilds its slot log.
///
/// The policy is consulted only after a removal; insertion never triggers a
/// rebuild. A rebuild runs synchronously on the removing call and costs
/// O(log length).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CompactionPolicy {
    /// Rebuild as soon as dead slots outnumber live ones, i.e. once more than
    /// half of the log is dead. Total rebuild work over any sequence of `n`
    /// removals is O(n).
    #[default]
    DeadExceedsLive,
    /// Never rebuild automatically. Dead slots accumulate until `compact()`
    /// is called, which makes `first()` and iteration pay for every
    /// tombstone they skip.
    Manual,
}

impl CompactionPolicy {
    /// Returns `true` if a log with `live` live and `dead` dead slots should be
    /// rebuilt now.
    #[inline]
    pub fn should_compact(self, live: usize, dead: usize) -> bool {
        match self {
            CompactionPolicy::DeadExceedsLive => dead > live,
            CompactionPolicy::Manual => false,
        }
    }
}
