// Pod usage fetching from the metrics API
pub mod base;
pub mod fetcher;

pub use base::{get_pod_metrics_http, usage_record_from_metrics, PodMetrics, METRICS_API_PATH};
pub use fetcher::{KubeMetricsSource, MetricsFetcher, MetricsSource};
