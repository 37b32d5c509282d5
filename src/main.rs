use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use pod_usage_ranker::cli::{Cli, OutputFormat};
use pod_usage_ranker::discovery::{discover_api_resources, list_crds, render_api_resources, render_crds};
use pod_usage_ranker::{
    collect, connect, ensure_metrics_available, list_pods, load_config, KubeMetricsSource,
    MetricsFetcher, RankedResult, UsageReport,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = load_config()?;
    info!("namespaces = {:?}, dimensions = {:?}", cfg.namespaces, cfg.dimensions);

    let client = connect(cli.kubeconfig.as_deref()).await?;

    if cli.discovery {
        print!("{}", render_crds(&list_crds(&client).await?));
        print!("{}", render_api_resources(&discover_api_resources(&client).await?));
        println!();
    }

    // Check metrics API availability early (fail fast if requested)
    if cfg.fail_if_no_metrics {
        ensure_metrics_available(&client).await?;
    }

    let pods = list_pods(&client, &cfg.namespaces).await?;
    info!("Found {} pods to measure", pods.len());

    let source = Arc::new(KubeMetricsSource::new(client.clone()));
    let fetcher = Arc::new(
        MetricsFetcher::new(source, cfg.dimensions.clone()).with_timeout(cfg.fetch_timeout),
    );
    let collection = collect(pods, fetcher, cfg.concurrency).await;

    let ranked = RankedResult::from_collection(collection, &cfg.dimensions);
    let report = UsageReport::new(&cfg, ranked);
    let summary = report.summary();
    info!(
        "Ranked {} pods, {} could not be measured",
        summary.ranked_count, summary.failed_count
    );

    match cli.output {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.render_json()?),
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
