mod property_escape;
mod property_partition;

/// Iterations for property tests.
pub(crate) fn quickcheck_tests() -> u64 {
    if is_ci::cached() { 10_000 } else { 1_000 }
}
