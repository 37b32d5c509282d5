use std::path::Path;

use anyhow::{anyhow, Context, Result};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{api::ListParams, Api, Client, Config as KubeConfig};
use tracing::{debug, info};

use crate::metrics::METRICS_API_PATH;
use crate::types::PodRef;

/// Build a client from the kubeconfig at `path`, or from the in-cluster
/// service account when no path is given.
pub async fn connect(kubeconfig: Option<&Path>) -> Result<Client> {
    let config = match kubeconfig {
        Some(path) => {
            info!("Using kubeconfig {}", path.display());
            let raw = Kubeconfig::read_from(path)
                .with_context(|| format!("Error reading kubeconfig {}", path.display()))?;
            KubeConfig::from_custom_kubeconfig(raw, &KubeConfigOptions::default())
                .await
                .context("Error building config from kubeconfig")?
        }
        None => {
            info!("No kubeconfig given, using in-cluster config");
            KubeConfig::incluster().context("Error building in-cluster config")?
        }
    };
    Client::try_from(config).context("Error creating cluster client")
}

/// List the pods to measure. An empty namespace list means all namespaces.
pub async fn list_pods(client: &Client, namespaces: &[String]) -> Result<Vec<PodRef>> {
    let lp = ListParams::default();
    let pods = if namespaces.is_empty() {
        let api: Api<Pod> = Api::all(client.clone());
        api.list(&lp).await.context("Error listing pods in all namespaces")?.items
    } else {
        let mut pods = Vec::new();
        for ns in namespaces {
            let api: Api<Pod> = Api::namespaced(client.clone(), ns);
            let list = api
                .list(&lp)
                .await
                .with_context(|| format!("Error listing pods in namespace {}", ns))?;
            debug!(namespace = %ns, pods = list.items.len(), "listed pods");
            pods.extend(list.items);
        }
        pods
    };
    Ok(pods_to_refs(&pods))
}

/// Pods that can have live usage: named, namespaced and not terminated.
pub fn pods_to_refs(pods: &[Pod]) -> Vec<PodRef> {
    pods.iter()
        .filter(|pod| {
            let phase = pod.status.as_ref().and_then(|s| s.phase.as_deref());
            !matches!(phase, Some("Succeeded") | Some("Failed"))
        })
        .filter_map(|pod| {
            let name = pod.metadata.name.as_ref()?;
            let namespace = pod.metadata.namespace.as_ref()?;
            Some(PodRef::new(namespace.as_str(), name.as_str()))
        })
        .collect()
}

/// Fail fast when the metrics API group is not served.
pub async fn ensure_metrics_available(client: &Client) -> Result<()> {
    let req = http::Request::builder()
        .method("GET")
        .uri(METRICS_API_PATH)
        .body(Vec::new())
        .map_err(|e| anyhow!("build request: {}", e))?;
    let resources: APIResourceList = client
        .request(req)
        .await
        .context("metrics.k8s.io API is not available (is metrics-server installed?)")?;
    if !resources.resources.iter().any(|r| r.name == "pods") {
        return Err(anyhow!("metrics.k8s.io API does not serve pod metrics"));
    }
    Ok(())
}
