//! The endpoint view: one row per host of every cluster.

use crate::envoy::admin::{Clusters, HostStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefixes the path of a host reached over a named pipe.
pub const PIPE_SCHEME: &str = "unix://";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointEntry {
    pub address: String,
    pub port: u32,
    pub cluster: String,
    pub status: String,
    pub failed_outlier_check: bool,
}

/// A host row without its cluster, as listed under a cluster name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEntry {
    pub address: String,
    pub port: u32,
    pub status: String,
    pub failed_outlier_check: bool,
}

pub fn project(clusters: &Clusters) -> Vec<EndpointEntry> {
    clusters
        .cluster_statuses
        .iter()
        .flat_map(|cluster| {
            cluster.host_statuses.iter().map(move |host| {
                let HostEntry {
                    address,
                    port,
                    status,
                    failed_outlier_check,
                } = HostEntry::from_host(host);
                EndpointEntry {
                    address,
                    port,
                    cluster: cluster.name.clone(),
                    status,
                    failed_outlier_check,
                }
            })
        })
        .collect()
}

/// Lists hosts under their cluster's name.
///
/// A cluster that is reported more than once keeps its last listing.
pub fn by_cluster(clusters: &Clusters) -> BTreeMap<String, Vec<HostEntry>> {
    clusters
        .cluster_statuses
        .iter()
        .map(|cluster| {
            let hosts = cluster.host_statuses.iter().map(HostEntry::from_host);
            (cluster.name.clone(), hosts.collect())
        })
        .collect()
}

// === impl HostEntry ===

impl HostEntry {
    fn from_host(host: &HostStatus) -> Self {
        let address = match (&host.address.socket_address, &host.address.pipe) {
            (Some(sa), _) => sa.address.clone(),
            (None, Some(pipe)) => format!("{PIPE_SCHEME}{}", pipe.path),
            (None, None) => PIPE_SCHEME.to_string(),
        };
        Self {
            address,
            port: host.address.port(),
            status: host.health_status.eds_health_status.clone(),
            failed_outlier_check: host.health_status.failed_outlier_check,
        }
    }
}
