use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use crate::types::Config;

pub const DEFAULT_DIMENSIONS: &str = "cpu,memory";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 10;

/// Where settings are read from. Only `raw` is required; the typed getters
/// trim values and treat blank ones as unset.
pub trait EnvSource {
    fn raw(&self, key: &str) -> Option<String>;

    fn text(&self, key: &str) -> Option<String> {
        self.raw(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Parse a numeric setting, falling back to `default` when unset.
    fn number<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.text(key) {
            Some(v) => v.parse().with_context(|| format!("Invalid {} value {:?}", key, v)),
            None => Ok(default),
        }
    }

    fn list(&self, key: &str, default: &str, lowercase: bool) -> Vec<String> {
        split_list(self.raw(key).as_deref().unwrap_or(default), lowercase)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        match self.raw(key) {
            Some(v) => matches!(v.trim(), "1" | "true" | "TRUE" | "True"),
            None => default,
        }
    }
}

/// The process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed key/value settings, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticEnv(BTreeMap<String, String>);

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl EnvSource for StaticEnv {
    fn raw(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&ProcessEnv)
}

pub fn load_config_with_env<E: EnvSource>(env: &E) -> Result<Config> {
    let dimensions = env.list("RANK_DIMENSIONS", DEFAULT_DIMENSIONS, true);
    if dimensions.is_empty() {
        return Err(anyhow!("RANK_DIMENSIONS must name at least one resource"));
    }

    let timeout_secs: u64 = env.number("FETCH_TIMEOUT_SECONDS", DEFAULT_FETCH_TIMEOUT_SECONDS)?;

    Ok(Config {
        namespaces: env.list("NAMESPACES", "", false),
        dimensions,
        concurrency: env.number("CONCURRENCY", DEFAULT_CONCURRENCY)?,
        fetch_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        // advisory; junk and zero mean "no limit"
        top_n: env.text("TOP_N").and_then(|v| v.parse::<usize>().ok()).filter(|n| *n > 0),
        cluster_name: env.text("CLUSTER_NAME"),
        fail_if_no_metrics: env.flag("FAIL_IF_NO_METRICS", true),
    })
}

// Comma separated, trimmed, empty entries dropped, first occurrence wins.
fn split_list(raw: &str, lowercase: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let item = if lowercase { item.to_lowercase() } else { item.to_string() };
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
