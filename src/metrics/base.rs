use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::parsing::parse_quantity;
use crate::types::{PodRef, Quantity, UsageRecord};

pub const METRICS_API_PATH: &str = "/apis/metrics.k8s.io/v1beta1";

#[derive(Debug, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    #[serde(default)]
    pub usage: BTreeMap<String, String>,
}

/// `metrics.k8s.io/v1beta1` PodMetrics as returned by metrics-server.
#[derive(Debug, Deserialize)]
pub struct PodMetrics {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

pub fn pod_metrics_path(pod: &PodRef) -> String {
    format!(
        "{}/namespaces/{}/pods/{}",
        METRICS_API_PATH, pod.namespace, pod.name
    )
}

pub async fn get_pod_metrics_http(client: &Client, pod: &PodRef) -> Result<PodMetrics, FetchError> {
    use http::Request as HttpRequest;
    let req = HttpRequest::builder()
        .method("GET")
        .uri(pod_metrics_path(pod))
        .body(Vec::new())
        .map_err(|e| FetchError::Connection(format!("build request: {}", e)))?;
    let metrics: PodMetrics = client.request(req).await?;
    Ok(metrics)
}

/// Sum container usage per requested dimension. Dimensions no container
/// reports are left out of the record.
pub fn usage_record_from_metrics(
    pod: PodRef,
    metrics: PodMetrics,
    dimensions: &[String],
) -> Result<UsageRecord, FetchError> {
    let mut usage = BTreeMap::new();
    for dim in dimensions {
        for c in &metrics.containers {
            let Some(raw) = c.usage.get(dim) else { continue };
            let q = parse_quantity(dim, raw).ok_or_else(|| {
                FetchError::Malformed(format!(
                    "container {} reports invalid {} quantity {:?}",
                    c.name, dim, raw
                ))
            })?;
            usage
                .entry(dim.clone())
                .and_modify(|total: &mut Quantity| *total = total.saturating_add(q))
                .or_insert(q);
        }
    }
    Ok(UsageRecord::new(pod, usage).with_sample(metrics.timestamp, metrics.window))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> PodMetrics {
        serde_json::from_value(serde_json::json!({
            "metadata": {"name": "web-0", "namespace": "shop"},
            "timestamp": "2024-05-01T10:00:00Z",
            "window": "30s",
            "containers": [
                {"name": "app", "usage": {"cpu": "250m", "memory": "100Mi"}},
                {"name": "sidecar", "usage": {"cpu": "5000000n", "memory": "28Mi"}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_containers_are_summed() {
        let record = usage_record_from_metrics(
            PodRef::new("shop", "web-0"),
            sample(),
            &dims(&["cpu", "memory"]),
        )
        .unwrap();

        assert_eq!(record.quantity("cpu"), Some(&Quantity::millicores(255)));
        assert_eq!(record.quantity("memory"), Some(&Quantity::bytes(128 * 1024 * 1024)));
        assert_eq!(record.window(), Some("30s"));
        assert!(record.timestamp().is_some());
    }

    #[test]
    fn test_only_requested_dimensions_are_kept() {
        let record = usage_record_from_metrics(
            PodRef::new("shop", "web-0"),
            sample(),
            &dims(&["memory", "nvidia.com/gpu"]),
        )
        .unwrap();

        assert!(record.quantity("cpu").is_none());
        assert!(record.quantity("nvidia.com/gpu").is_none());
        assert_eq!(record.usage().len(), 1);
    }

    #[test]
    fn test_invalid_quantity_is_malformed() {
        let metrics: PodMetrics = serde_json::from_value(serde_json::json!({
            "metadata": {"name": "web-0"},
            "containers": [{"name": "app", "usage": {"cpu": "fast"}}]
        }))
        .unwrap();

        let err = usage_record_from_metrics(PodRef::new("shop", "web-0"), metrics, &dims(&["cpu"]))
            .unwrap_err();
        assert!(matches!(err, FetchError::Malformed(ref m) if m.contains("app")));
    }

    #[test]
    fn test_negative_or_oversized_usage_is_malformed() {
        for cpu in ["-5m", "99999999999999999999999999n"] {
            let metrics: PodMetrics = serde_json::from_value(serde_json::json!({
                "metadata": {"name": "web-0"},
                "containers": [
                    {"name": "app", "usage": {"cpu": "10m"}},
                    {"name": "sidecar", "usage": {"cpu": cpu}}
                ]
            }))
            .unwrap();

            let err = usage_record_from_metrics(PodRef::new("shop", "web-0"), metrics, &dims(&["cpu"]))
                .unwrap_err();
            assert!(matches!(err, FetchError::Malformed(ref m) if m.contains("sidecar")), "cpu {}", cpu);
        }
    }

    #[test]
    fn test_pod_metrics_path() {
        assert_eq!(
            pod_metrics_path(&PodRef::new("shop", "web-0")),
            "/apis/metrics.k8s.io/v1beta1/namespaces/shop/pods/web-0"
        );
    }
}
