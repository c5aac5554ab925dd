use crate::error::{MetricsError, Result};
use crate::model::{DateCounts, QuarterCounts};
use crate::util::quarter_key;
use chrono::NaiveDate;

/// Number of events on each distinct date. Input order does not matter.
pub fn count_by_date(dates: &[NaiveDate]) -> DateCounts {
    let mut counts = DateCounts::new();
    for date in dates {
        *counts.entry(*date).or_insert(0) += 1;
    }
    counts
}

/// Folds per-date counts into per-quarter sums. Quarters without events are
/// absent, not zero.
pub fn bucket_by_quarter(date_counts: &DateCounts) -> QuarterCounts {
    let mut quarters = QuarterCounts::new();
    for (date, count) in date_counts {
        *quarters.entry(quarter_key(date)).or_insert(0) += count;
    }
    quarters
}

/// Buckets a date list by quarter. The list is sorted first so the resulting
/// keys come out in chronological order, concatenated lists included.
pub fn bucket_dates(dates: &[NaiveDate]) -> QuarterCounts {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();
    bucket_by_quarter(&count_by_date(&sorted))
}

/// Key-wise sum of two quarter maps. Keys of `a` keep their position, keys
/// only present in `b` are appended in `b`'s order.
pub fn sum_counts(a: &QuarterCounts, b: &QuarterCounts) -> Result<QuarterCounts> {
    let mut sum = a.clone();
    for (quarter, count) in b {
        let slot = sum.entry(*quarter).or_insert(0);
        let current = *slot;
        *slot = current
            .checked_add(*count)
            .ok_or_else(|| MetricsError::Overflow(format!("{quarter}: {current} + {count}")))?;
    }
    Ok(sum)
}
