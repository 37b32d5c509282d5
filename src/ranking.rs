use std::cmp::Ordering;

use serde::Serialize;

use crate::aggregate::Collection;
use crate::types::{FetchFailure, UsageRecord};

/// Total order used for ranking: each dimension in turn, highest usage
/// first (unmeasured counts as zero), then namespace and name ascending.
pub fn compare_records(a: &UsageRecord, b: &UsageRecord, dimensions: &[String]) -> Ordering {
    dimensions
        .iter()
        .map(|dim| b.amount(dim).cmp(&a.amount(dim)))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.pod().cmp(b.pod()))
}

/// Returns a new vector; the input is left untouched.
pub fn rank(records: &[UsageRecord], dimensions: &[String]) -> Vec<UsageRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| compare_records(a, b, dimensions));
    ranked
}

/// Ranked records plus the pods that could not be measured.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub dimensions: Vec<String>,
    pub records: Vec<UsageRecord>,
    pub failures: Vec<FetchFailure>,
}

impl RankedResult {
    pub fn from_collection(collection: Collection, dimensions: &[String]) -> Self {
        let mut failures = collection.failures;
        // Arrival order of failures is racy too.
        failures.sort_by(|a, b| a.pod.cmp(&b.pod));
        Self {
            dimensions: dimensions.to_vec(),
            records: rank(&collection.records, dimensions),
            failures,
        }
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// The first `n` ranked records, or all of them.
    pub fn top(&self, n: Option<usize>) -> &[UsageRecord] {
        match n {
            Some(n) if n < self.records.len() => &self.records[..n],
            _ => &self.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::types::{PodRef, Quantity};
    use std::collections::BTreeMap;

    fn record(name: &str, cpu: Option<i64>, mem: Option<i64>) -> UsageRecord {
        let mut usage = BTreeMap::new();
        if let Some(c) = cpu {
            usage.insert("cpu".to_string(), Quantity::millicores(c));
        }
        if let Some(m) = mem {
            usage.insert("memory".to_string(), Quantity::bytes(m));
        }
        UsageRecord::new(PodRef::new("default", name), usage)
    }

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn names(records: &[UsageRecord]) -> Vec<&str> {
        records.iter().map(|r| r.pod().name.as_str()).collect()
    }

    #[test]
    fn test_ties_fall_back_to_identity() {
        let records = vec![
            record("a", Some(5), None),
            record("c", Some(9), None),
            record("b", Some(9), None),
        ];
        assert_eq!(names(&rank(&records, &dims(&["cpu"]))), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_second_dimension_breaks_tie() {
        let records = vec![record("a", Some(3), Some(10)), record("b", Some(3), Some(20))];
        assert_eq!(names(&rank(&records, &dims(&["cpu", "memory"]))), vec!["b", "a"]);
    }

    #[test]
    fn test_missing_dimension_ranks_as_zero() {
        let records = vec![record("a", Some(1), None), record("b", None, Some(5))];
        assert_eq!(names(&rank(&records, &dims(&["memory"]))), vec!["b", "a"]);
    }

    #[test]
    fn test_namespace_orders_before_name() {
        let mut usage = BTreeMap::new();
        usage.insert("cpu".to_string(), Quantity::millicores(1));
        let records = vec![
            UsageRecord::new(PodRef::new("zeta", "a"), usage.clone()),
            UsageRecord::new(PodRef::new("alpha", "z"), usage),
        ];
        let ranked = rank(&records, &dims(&["cpu"]));
        assert_eq!(ranked[0].pod().namespace, "alpha");
    }

    #[test]
    fn test_no_dimensions_orders_by_identity() {
        let records = vec![record("b", Some(100), None), record("a", Some(1), None)];
        assert_eq!(names(&rank(&records, &[])), vec!["a", "b"]);
    }

    #[test]
    fn test_input_is_not_reordered() {
        let records = vec![record("a", Some(1), None), record("b", Some(2), None)];
        let _ = rank(&records, &dims(&["cpu"]));
        assert_eq!(names(&records), vec!["a", "b"]);
    }

    #[test]
    fn test_result_sorts_failures_and_truncates() {
        let collection = Collection {
            records: vec![
                record("a", Some(1), None),
                record("b", Some(3), None),
                record("c", Some(2), None),
            ],
            failures: vec![
                FetchFailure { pod: PodRef::new("default", "y"), cause: FetchError::NotFound },
                FetchFailure { pod: PodRef::new("default", "x"), cause: FetchError::NotFound },
            ],
        };
        let result = RankedResult::from_collection(collection, &dims(&["cpu"]));

        assert_eq!(names(result.top(Some(2))), vec!["b", "c"]);
        assert_eq!(result.top(None).len(), 3);
        assert_eq!(result.top(Some(10)).len(), 3);
        assert_eq!(result.failure_count(), 2);
        assert_eq!(result.failures[0].pod.name, "x");
    }
}
