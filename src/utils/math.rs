//! Percentage helpers for progress and summary reporting

/// Calculate percentage safely for u64 values, returning 0.0 if total is zero.
///
/// # Examples
/// ```
/// use coinshuffle_scan::utils::math::safe_percentage_u64;
///
/// assert_eq!(safe_percentage_u64(50, 100), 50.0);
/// assert_eq!(safe_percentage_u64(50, 0), 0.0);  // Zero-division guard
/// ```
#[inline]
pub fn safe_percentage_u64(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Progress percentages crossed when item `done` of `total` completes.
///
/// Milestones sit at every 10%: 0% fires on the first item, 100% on the last,
/// and k*10% on item `round(total * k / 10)`. Small totals can hit several
/// milestones on the same item; zero-valued marks never fire.
///
/// # Examples
/// ```
/// use coinshuffle_scan::utils::math::progress_milestones;
///
/// assert_eq!(progress_milestones(1, 100), vec![0]);
/// assert_eq!(progress_milestones(50, 100), vec![50]);
/// assert_eq!(progress_milestones(100, 100), vec![100]);
/// assert!(progress_milestones(51, 100).is_empty());
/// ```
pub fn progress_milestones(done: usize, total: usize) -> Vec<u8> {
    let mut crossed = Vec::new();
    if done == 0 || total == 0 || done > total {
        return crossed;
    }
    if done == 1 {
        crossed.push(0);
    }
    for step in 1..=9u8 {
        let mark = (total as f64 * f64::from(step) / 10.0).round() as usize;
        if mark == done {
            crossed.push(step * 10);
        }
    }
    if done == total {
        crossed.push(100);
    }
    crossed
}
