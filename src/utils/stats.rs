//! Round-count statistics.
//!
//! Runs are characterised by percentiles of finish rounds (p50 for the
//! typical peer, p100 for the last one), so these helpers work on integer
//! round numbers and use nearest-rank percentiles.

/// Nearest-rank percentile of `values`, `p` in `0.0..=100.0`
///
/// # Examples
/// ```
/// use swarmsim::utils::stats::percentile;
///
/// assert_eq!(percentile(&[4, 1, 3, 2], 50.0), Some(2));
/// assert_eq!(percentile(&[4, 1, 3, 2], 100.0), Some(4));
/// assert_eq!(percentile(&[], 50.0), None);
/// ```
pub fn percentile(values: &[u32], p: f64) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let rank = ((p.clamp(0.0, 100.0) / 100.0) * sorted.len() as f64).ceil() as usize;
    Some(sorted[rank.saturating_sub(1).min(sorted.len() - 1)])
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
}
