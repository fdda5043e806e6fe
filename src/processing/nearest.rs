//! Nearest-sample lookup over a sorted time array.

/// Index of the sample nearest to `t` in an ascending `times` slice.
///
/// Binary search, O(log n). Queries before the first sample clamp to index 0
/// and queries after the last clamp to the last index. When `t` sits exactly
/// halfway between two samples the earlier one wins. Returns `None` only for
/// an empty slice.
pub fn nearest_index(times: &[f64], t: f64) -> Option<usize> {
    let last = times.len().checked_sub(1)?;

    // First sample at or after t.
    let i = times.partition_point(|&v| v < t);
    if i == 0 {
        return Some(0);
    }
    if i > last {
        return Some(last);
    }

    let before = t - times[i - 1];
    let after = times[i] - t;
    let pick = if after < before { i } else { i - 1 };

    // Among repeated timestamps report the first copy.
    Some(times[..pick].partition_point(|&v| v < times[pick]))
}
