use crate::error::RunError;

/// Strict node-by-node equality of two count sequences. A length mismatch is
/// a construction bug, not a failed comparison.
pub fn compare(reference_counts: &[usize], simulated_counts: &[usize]) -> Result<bool, RunError> {
    if reference_counts.len() != simulated_counts.len() {
        return Err(RunError::structural(format!(
            "cannot compare {} reference counts with {} simulated counts",
            reference_counts.len(),
            simulated_counts.len()
        )));
    }

    Ok(reference_counts == simulated_counts)
}
