//! Compares what each control-plane replica has sent to a proxy with what the
//! proxy has acknowledged.

use crate::DecodeError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// A replica's record of a connected proxy, as served by its sync debug endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncStatus {
    pub cluster_id: String,
    pub proxy: String,
    pub istio_version: String,
    pub cluster_sent: String,
    pub cluster_acked: String,
    pub listener_sent: String,
    pub listener_acked: String,
    pub route_sent: String,
    pub route_acked: String,
    pub endpoint_sent: String,
    pub endpoint_acked: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    #[serde(rename = "SYNCED")]
    Synced,
    #[serde(rename = "STALE")]
    Stale,
    #[serde(rename = "NOT SENT")]
    NotSent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEntry {
    pub replica: String,
    pub proxy: String,
    pub istio_version: String,
    pub cluster: SyncState,
    pub listener: SyncState,
    pub route: SyncState,
    pub endpoint: SyncState,
}

/// Reports, for every replica that knows of `proxy_id`, the state of each
/// resource type. Replicas are reported in name order.
pub fn project(
    replicas: &BTreeMap<String, Bytes>,
    proxy_id: &str,
) -> Result<Vec<SyncEntry>, DecodeError> {
    let mut entries = Vec::new();
    for (replica, body) in replicas {
        let statuses: Vec<SyncStatus> =
            serde_json::from_slice(body).map_err(DecodeError::envelope)?;
        entries.extend(
            statuses
                .iter()
                .filter(|s| s.proxy == proxy_id)
                .map(|s| SyncEntry::new(replica, s)),
        );
    }
    Ok(entries)
}

// === impl SyncEntry ===

impl SyncEntry {
    fn new(replica: &str, status: &SyncStatus) -> Self {
        Self {
            replica: replica.to_string(),
            proxy: status.proxy.clone(),
            istio_version: status.istio_version.clone(),
            cluster: SyncState::compare(&status.cluster_sent, &status.cluster_acked),
            listener: SyncState::compare(&status.listener_sent, &status.listener_acked),
            route: SyncState::compare(&status.route_sent, &status.route_acked),
            endpoint: SyncState::compare(&status.endpoint_sent, &status.endpoint_acked),
        }
    }
}

// === impl SyncState ===

impl SyncState {
    pub fn compare(sent: &str, acked: &str) -> Self {
        if sent.is_empty() {
            Self::NotSent
        } else if sent == acked {
            Self::Synced
        } else {
            Self::Stale
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synced => "SYNCED".fmt(f),
            Self::Stale => "STALE".fmt(f),
            Self::NotSent => "NOT SENT".fmt(f),
        }
    }
}
