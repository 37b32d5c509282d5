use crate::types::{FetchFailure, FetchOutcome, UsageRecord};

/// Everything one collection run produced, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct Collection {
    pub records: Vec<UsageRecord>,
    pub failures: Vec<FetchFailure>,
}

impl Collection {
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Accumulates fetch outcomes. Owned by exactly one task; the only way to
/// read it is `finish`, which consumes it once the run is complete.
#[derive(Debug, Default)]
pub struct UsageAggregator {
    collected: Collection,
}

impl UsageAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            collected: Collection {
                records: Vec::with_capacity(n),
                failures: Vec::new(),
            },
        }
    }

    pub fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Success(record) => self.collected.records.push(record),
            FetchOutcome::Failure(failure) => self.collected.failures.push(failure),
        }
    }

    pub fn finish(self) -> Collection {
        self.collected
    }
}
