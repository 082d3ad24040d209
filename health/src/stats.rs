use common::{Error, Result};
use std::future::Future;

/// Number of entries kept in ranked lists and samples.
pub const TOP_N: usize = 3;

/// Usage strictly below this many runs within the lookback window counts as unused.
pub const UNUSED_THRESHOLD: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// `part / total`, refusing a zero denominator.
pub fn percentage(part: usize, total: usize) -> Result<f64> {
    if total == 0 {
        return Err(Error::DegenerateInput(
            "percentage of an empty population".into(),
        ));
    }
    if part > total {
        return Err(Error::DegenerateInput(format!(
            "part {} exceeds total {}",
            part, total
        )));
    }
    Ok(part as f64 / total as f64)
}

/// Median of integer samples; the mean of the two middle values for even lengths.
pub fn median(values: &[u64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::DegenerateInput("median of an empty list".into()));
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Ok(sorted[mid] as f64)
    }
}

/// Stable sort by `key` in `order`, truncated to the first `n` entries.
///
/// Entries with equal keys keep their input order.
pub fn top_n<T, F>(mut items: Vec<T>, n: usize, order: SortOrder, key: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    match order {
        SortOrder::Ascending => items.sort_by(|a, b| key(a).total_cmp(&key(b))),
        SortOrder::Descending => items.sort_by(|a, b| key(b).total_cmp(&key(a))),
    }
    items.truncate(n);
    items
}

/// Looks up candidates one at a time, in order, until `k` lookups produced a value.
///
/// Candidates whose lookup returns `None` are skipped and do not count towards
/// `k`; no lookup is issued once `k` values are collected.
pub async fn sample_first<I, U, F, Fut>(candidates: I, k: usize, lookup: F) -> Result<Vec<U>>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<Option<U>>>,
{
    let mut sample = Vec::with_capacity(k);
    if k == 0 {
        return Ok(sample);
    }

    for candidate in candidates {
        if let Some(value) = lookup(candidate).await? {
            sample.push(value);
            if sample.len() == k {
                break;
            }
        }
    }

    Ok(sample)
}
