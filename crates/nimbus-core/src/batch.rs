//! Delta batching against the remote call-size limit

/// Remote-enforced maximum number of deltas per update call. This is an
/// external contract of the cloud API, not a tunable.
pub const MAX_DELTAS_PER_UPDATE: usize = 1000;

/// Number of batches needed to apply `size` items `batch_size` at a time.
///
/// Integer ceiling division: `count_batches(0, n) == 0`,
/// `count_batches(n, n) == 1`, `count_batches(n + 1, n) == 2`.
/// `batch_size` must be non-zero.
pub fn count_batches(size: usize, batch_size: usize) -> usize {
    debug_assert!(batch_size > 0, "batch_size must be non-zero");
    size / batch_size + usize::from(size % batch_size != 0)
}
