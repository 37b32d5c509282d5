use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct Config {
    /// Namespaces to enumerate pods from; empty means every namespace.
    pub namespaces: Vec<String>,
    pub dimensions: Vec<String>,
    pub concurrency: usize,
    pub fetch_timeout: Option<Duration>,
    pub top_n: Option<usize>,
    pub cluster_name: Option<String>,
    pub fail_if_no_metrics: bool,
}

/// Identity of one pod to be measured.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PodRef {
    // Field order gives the derived ordering: namespace, then name.
    pub namespace: String,
    pub name: String,
}

impl PodRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityUnit {
    Millicores,
    Bytes,
    /// Thousandths of a plain number, for dimensions without a known unit.
    Milli,
}

/// A resource amount normalised to the base unit of its dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Quantity {
    pub value: i64,
    pub unit: QuantityUnit,
}

impl Quantity {
    pub fn new(value: i64, unit: QuantityUnit) -> Self {
        Self { value, unit }
    }

    pub fn millicores(value: i64) -> Self {
        Self::new(value, QuantityUnit::Millicores)
    }

    pub fn bytes(value: i64) -> Self {
        Self::new(value, QuantityUnit::Bytes)
    }

    pub(crate) fn saturating_add(self, other: Quantity) -> Quantity {
        Quantity::new(self.value.saturating_add(other.value), self.unit)
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.unit.cmp(&other.unit))
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One successful measurement of a pod. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageRecord {
    pod: PodRef,
    usage: BTreeMap<String, Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    window: Option<String>,
}

impl UsageRecord {
    pub fn new(pod: PodRef, usage: BTreeMap<String, Quantity>) -> Self {
        Self {
            pod,
            usage,
            timestamp: None,
            window: None,
        }
    }

    /// Attach the sample time and window reported by the metrics API.
    pub fn with_sample(mut self, timestamp: Option<DateTime<Utc>>, window: Option<String>) -> Self {
        self.timestamp = timestamp;
        self.window = window;
        self
    }

    pub fn pod(&self) -> &PodRef {
        &self.pod
    }

    pub fn usage(&self) -> &BTreeMap<String, Quantity> {
        &self.usage
    }

    pub fn quantity(&self, dimension: &str) -> Option<&Quantity> {
        self.usage.get(dimension)
    }

    /// Normalised amount for a dimension; unmeasured dimensions count as zero.
    pub fn amount(&self, dimension: &str) -> i64 {
        self.usage.get(dimension).map(|q| q.value).unwrap_or(0)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn window(&self) -> Option<&str> {
        self.window.as_deref()
    }
}

/// A pod whose usage could not be fetched, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct FetchFailure {
    pub pod: PodRef,
    #[serde(serialize_with = "serialize_display")]
    pub cause: FetchError,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pod, self.cause)
    }
}

#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(UsageRecord),
    Failure(FetchFailure),
}

impl FetchOutcome {
    pub fn failure(pod: PodRef, cause: FetchError) -> Self {
        FetchOutcome::Failure(FetchFailure { pod, cause })
    }

    pub fn pod(&self) -> &PodRef {
        match self {
            FetchOutcome::Success(record) => record.pod(),
            FetchOutcome::Failure(failure) => &failure.pod,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
