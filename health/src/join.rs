use crate::models::UsageRecord;
use std::collections::HashMap;
use std::hash::Hash;

/// Sums usage measures onto catalog entries by exact key equality.
///
/// The result is positional: `counts[i]` is the total for `catalog[i]`, zero
/// when no usage record carries its key. Usage is indexed once, so the cost is
/// linear in both inputs.
pub fn join_counts<A, K, F>(catalog: &[A], catalog_key: F, usage: &[UsageRecord<K>]) -> Vec<u64>
where
    K: Eq + Hash,
    F: Fn(&A) -> K,
{
    let mut totals: HashMap<&K, u64> = HashMap::with_capacity(usage.len());
    for record in usage {
        let total = totals.entry(&record.key).or_insert(0);
        *total = total.saturating_add(record.measure);
    }

    catalog
        .iter()
        .map(|entry| totals.get(&catalog_key(entry)).copied().unwrap_or(0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(model: &str, explore: &str) -> (String, String) {
        (model.to_string(), explore.to_string())
    }

    #[test]
    fn test_sums_matching_rows() {
        let catalog = vec![key("m1", "e1"), key("m1", "e2")];
        let usage = vec![
            UsageRecord::new(key("m1", "e1"), 5),
            UsageRecord::new(key("m1", "e1"), 3),
            UsageRecord::new(key("m1", "e2"), 0),
        ];

        assert_eq!(join_counts(&catalog, |k| k.clone(), &usage), vec![8, 0]);
    }

    #[test]
    fn test_unmatched_entries_get_zero() {
        let catalog = vec![key("m1", "e1"), key("m2", "e1")];
        let usage = vec![
            UsageRecord::new(key("m1", "e1"), 4),
            // Same explore name under another model must not match.
            UsageRecord::new(key("m3", "e1"), 9),
        ];

        assert_eq!(join_counts(&catalog, |k| k.clone(), &usage), vec![4, 0]);
    }

    #[test]
    fn test_matches_nested_scan() {
        let catalog: Vec<u32> = (0..40).collect();
        let usage: Vec<UsageRecord<u32>> = (0..200)
            .map(|i| UsageRecord::new((i * 7) % 50, i as u64))
            .collect();

        let nested: Vec<u64> = catalog
            .iter()
            .map(|c| usage.iter().filter(|u| u.key == *c).map(|u| u.measure).sum())
            .collect();

        assert_eq!(join_counts(&catalog, |c| *c, &usage), nested);
    }

    #[test]
    fn test_empty_inputs() {
        let usage: Vec<UsageRecord<String>> = vec![];
        assert!(join_counts(&Vec::<String>::new(), |k| k.clone(), &usage).is_empty());
        assert_eq!(join_counts(&["a".to_string()], |k| k.clone(), &usage), vec![0]);
    }
}
