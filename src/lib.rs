// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod cli;
pub mod kubernetes;
pub mod discovery;
pub mod metrics;
pub mod aggregate;
pub mod collector;
pub mod ranking;
pub mod report;

// Re-export commonly used items
pub use types::*;
pub use error::FetchError;
pub use config::{load_config, load_config_with_env, EnvSource, ProcessEnv, StaticEnv};
pub use parsing::{parse_cpu_to_millicores, parse_memory_to_bytes, parse_quantity, format_quantity};
pub use kubernetes::{connect, list_pods, ensure_metrics_available};
pub use metrics::{KubeMetricsSource, MetricsFetcher, MetricsSource};
pub use aggregate::{Collection, UsageAggregator};
pub use collector::collect;
pub use ranking::{rank, compare_records, RankedResult};
pub use report::{UsageReport, ReportSummary};
