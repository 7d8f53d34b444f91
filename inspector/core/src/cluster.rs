//! The cluster view: one row per cluster the proxy knows about.

use crate::{envoy::cluster::Cluster, metadata, DecodeError, Snapshot};
use serde::{Deserialize, Serialize};

/// Placeholder for a cluster name component that is not present.
pub const UNSPECIFIED: &str = "-";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEntry {
    pub fqdn: String,
    pub port: u16,
    pub subset: String,
    pub direction: String,
    #[serde(rename = "type")]
    pub discovery_type: String,
    pub destination_rule: String,
}

/// A cluster name decomposed as `<direction>|<port>|<subset>|<fqdn>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterKey<'a> {
    pub direction: &'a str,
    pub port: u16,
    pub subset: &'a str,
    pub fqdn: &'a str,
}

pub fn project(snapshot: &Snapshot) -> Result<Vec<ClusterEntry>, DecodeError> {
    let clusters = match snapshot.clusters() {
        Ok(clusters) => clusters,
        Err(error) if error.is_not_found() => return Ok(Vec::new()),
        Err(error) => return Err(error),
    };
    Ok(clusters.iter().map(ClusterEntry::from_cluster).collect())
}

// === impl ClusterEntry ===

impl ClusterEntry {
    pub fn from_cluster(cluster: &Cluster) -> Self {
        let ClusterKey {
            direction,
            port,
            subset,
            fqdn,
        } = ClusterKey::parse(&cluster.name);
        Self {
            fqdn: fqdn.to_string(),
            port,
            subset: if subset.is_empty() {
                UNSPECIFIED.to_string()
            } else {
                subset.to_string()
            },
            direction: direction.to_string(),
            discovery_type: cluster.discovery_type().to_string(),
            destination_rule: metadata::originating_resource(cluster.metadata.as_ref()),
        }
    }
}

// === impl ClusterKey ===

impl<'a> ClusterKey<'a> {
    /// Names with fewer than four fields are treated as a bare destination.
    /// Fields past the fourth are ignored.
    pub fn parse(name: &'a str) -> Self {
        match name.split('|').collect::<Vec<_>>()[..] {
            [direction, port, subset, fqdn, ..] => Self {
                direction,
                port: port.parse().unwrap_or(0),
                subset,
                fqdn,
            },
            _ => Self {
                direction: UNSPECIFIED,
                port: 0,
                subset: UNSPECIFIED,
                fqdn: name,
            },
        }
    }
}
