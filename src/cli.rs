use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Rank pods by live CPU and memory usage.
///
/// Namespaces, ranking dimensions, concurrency and timeouts are read from
/// the environment (NAMESPACES, RANK_DIMENSIONS, CONCURRENCY,
/// FETCH_TIMEOUT_SECONDS, TOP_N, CLUSTER_NAME, FAIL_IF_NO_METRICS).
#[derive(Debug, Parser)]
#[command(name = "pod-usage-ranker", version, about, long_about = None)]
pub struct Cli {
    /// Path to a kubeconfig file (in-cluster config is used when omitted)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Also print the cluster's CRDs and API resources
    #[arg(long)]
    pub discovery: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub output: OutputFormat,
}
