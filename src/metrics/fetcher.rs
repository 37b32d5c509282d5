use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kube::Client;
use tracing::debug;

use crate::error::FetchError;
use crate::types::{FetchOutcome, PodRef, UsageRecord};
use super::base::{get_pod_metrics_http, usage_record_from_metrics};

/// A client that can report current resource usage for one pod.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn pod_usage(&self, pod: &PodRef, dimensions: &[String]) -> Result<UsageRecord, FetchError>;
}

/// Reads pod usage from the cluster's `metrics.k8s.io` API.
#[derive(Clone)]
pub struct KubeMetricsSource {
    client: Client,
}

impl KubeMetricsSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetricsSource for KubeMetricsSource {
    async fn pod_usage(&self, pod: &PodRef, dimensions: &[String]) -> Result<UsageRecord, FetchError> {
        let metrics = get_pod_metrics_http(&self.client, pod).await?;
        usage_record_from_metrics(pod.clone(), metrics, dimensions)
    }
}

/// Fetches one pod's usage at a time. Holds no mutable state, so a single
/// instance is shared by every collection worker.
pub struct MetricsFetcher {
    source: Arc<dyn MetricsSource>,
    dimensions: Vec<String>,
    timeout: Option<Duration>,
}

impl MetricsFetcher {
    pub fn new(source: Arc<dyn MetricsSource>, dimensions: Vec<String>) -> Self {
        Self {
            source,
            dimensions,
            timeout: None,
        }
    }

    /// Per-call deadline; an expired call becomes a `Timeout` failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub async fn fetch(&self, pod: PodRef) -> FetchOutcome {
        let call = self.source.pod_usage(&pod, &self.dimensions);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(FetchError::Timeout(limit))),
            None => call.await,
        };

        match result {
            Ok(record) if record.pod() == &pod => {
                debug!(pod = %pod, "fetched usage");
                FetchOutcome::Success(record)
            }
            Ok(record) => FetchOutcome::failure(
                pod,
                FetchError::Malformed(format!("metrics returned for {}", record.pod())),
            ),
            Err(cause) => {
                debug!(pod = %pod, error = %cause, "usage fetch failed");
                FetchOutcome::failure(pod, cause)
            }
        }
    }
}
