use std::collections::BTreeMap;
use std::fmt::Write;

use anyhow::{Context, Result};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::discovery::{Discovery, Scope};
use kube::{api::ListParams, Api, Client};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResourceInfo {
    pub kind: String,
    pub name: String,
    pub namespaced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiGroupResources {
    pub group_version: String,
    pub resources: Vec<ApiResourceInfo>,
}

/// Names of every CustomResourceDefinition in the cluster.
pub async fn list_crds(client: &Client) -> Result<Vec<String>> {
    let api: Api<CustomResourceDefinition> = Api::all(client.clone());
    let crds = api
        .list(&ListParams::default())
        .await
        .context("Error listing CRDs")?;
    Ok(crds.items.into_iter().filter_map(|crd| crd.metadata.name).collect())
}

/// The server's preferred version of every resource, grouped by group/version.
pub async fn discover_api_resources(client: &Client) -> Result<Vec<ApiGroupResources>> {
    let discovery = Discovery::new(client.clone())
        .run()
        .await
        .context("Error listing resources")?;

    let mut by_version: BTreeMap<String, Vec<ApiResourceInfo>> = BTreeMap::new();
    for group in discovery.groups() {
        for (ar, caps) in group.recommended_resources() {
            by_version.entry(ar.api_version.clone()).or_default().push(ApiResourceInfo {
                kind: ar.kind,
                name: ar.plural,
                namespaced: matches!(caps.scope, Scope::Namespaced),
            });
        }
    }
    Ok(by_version
        .into_iter()
        .map(|(group_version, resources)| ApiGroupResources { group_version, resources })
        .collect())
}

pub fn render_crds(crds: &[String]) -> String {
    let mut out = String::from("Custom Resource Definitions:\n");
    for name in crds {
        let _ = writeln!(out, "- {}", name);
    }
    out
}

pub fn render_api_resources(groups: &[ApiGroupResources]) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "\nAPI Group: {}", group.group_version);
        for r in &group.resources {
            let _ = writeln!(
                out,
                "  - Kind: {}, Name: {}, Namespaced: {}",
                r.kind, r.name, r.namespaced
            );
        }
    }
    out
}
