use std::fmt::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::parsing::format_quantity;
use crate::ranking::RankedResult;
use crate::types::{Config, FetchFailure, UsageRecord};

/// A ranking run ready to be printed.
pub struct UsageReport {
    pub cluster_name: Option<String>,
    pub top_n: Option<usize>,
    pub ranked: RankedResult,
}

pub struct ReportSummary {
    pub ranked_count: usize,
    pub shown_count: usize,
    pub failed_count: usize,
}

impl ReportSummary {
    pub fn attempted(&self) -> usize {
        self.ranked_count + self.failed_count
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    cluster: Option<&'a str>,
    dimensions: &'a [String],
    ranked_count: usize,
    failed_count: usize,
    records: &'a [UsageRecord],
    failures: &'a [FetchFailure],
}

impl UsageReport {
    pub fn new(config: &Config, ranked: RankedResult) -> Self {
        Self {
            cluster_name: config.cluster_name.clone(),
            top_n: config.top_n,
            ranked,
        }
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            ranked_count: self.ranked.records.len(),
            shown_count: self.ranked.top(self.top_n).len(),
            failed_count: self.ranked.failure_count(),
        }
    }

    pub fn render_text(&self) -> String {
        let summary = self.summary();
        let dims = &self.ranked.dimensions;
        let mut out = String::new();

        let title = match &self.cluster_name {
            Some(c) => format!("Pod usage ranking - {}", c),
            None => "Pod usage ranking".to_string(),
        };
        let _ = writeln!(out, "{} (by {})", title, dims.join(", "));

        let shown = self.ranked.top(self.top_n);
        if shown.is_empty() {
            let _ = writeln!(out, "No pod usage collected.");
        }
        let width = shown.len().to_string().len();
        for (i, record) in shown.iter().enumerate() {
            let usage: Vec<String> = dims
                .iter()
                .map(|d| {
                    let q = record.quantity(d).map(format_quantity).unwrap_or_else(|| "-".to_string());
                    format!("{}={}", d, q)
                })
                .collect();
            let _ = writeln!(out, "{:>width$}. {}  {}", i + 1, record.pod(), usage.join("  "), width = width);
        }
        if summary.shown_count < summary.ranked_count {
            let _ = writeln!(out, "(showing top {} of {})", summary.shown_count, summary.ranked_count);
        }

        let _ = writeln!(out, "Failed: {}", summary.failed_count);
        for failure in &self.ranked.failures {
            let _ = writeln!(out, "- {}", failure);
        }
        out
    }

    pub fn render_json(&self) -> Result<String> {
        let summary = self.summary();
        let report = JsonReport {
            cluster: self.cluster_name.as_deref(),
            dimensions: &self.ranked.dimensions,
            ranked_count: summary.ranked_count,
            failed_count: summary.failed_count,
            records: self.ranked.top(self.top_n),
            failures: &self.ranked.failures,
        };
        serde_json::to_string_pretty(&report).context("Error serializing report")
    }
}
