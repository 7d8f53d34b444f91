//! Administrative documents reported by the proxy: the per-kind configuration
//! dumps and the cluster status listing.

use crate::{type_url, DecodeError, Typed, TypedAny};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClustersConfigDump {
    #[serde(alias = "versionInfo")]
    pub version_info: String,
    #[serde(alias = "staticClusters")]
    pub static_clusters: Vec<StaticCluster>,
    #[serde(alias = "dynamicActiveClusters")]
    pub dynamic_active_clusters: Vec<DynamicCluster>,
    #[serde(alias = "dynamicWarmingClusters")]
    pub dynamic_warming_clusters: Vec<DynamicCluster>,
}

impl Typed for ClustersConfigDump {
    const TYPE_URL: &'static str = type_url::CLUSTERS_CONFIG_DUMP;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StaticCluster {
    pub cluster: Option<TypedAny>,
    #[serde(alias = "lastUpdated")]
    pub last_updated: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DynamicCluster {
    #[serde(alias = "versionInfo")]
    pub version_info: String,
    pub cluster: Option<TypedAny>,
    #[serde(alias = "lastUpdated")]
    pub last_updated: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListenersConfigDump {
    #[serde(alias = "versionInfo")]
    pub version_info: String,
    #[serde(alias = "staticListeners")]
    pub static_listeners: Vec<StaticListener>,
    #[serde(alias = "dynamicListeners")]
    pub dynamic_listeners: Vec<DynamicListener>,
}

impl Typed for ListenersConfigDump {
    const TYPE_URL: &'static str = type_url::LISTENERS_CONFIG_DUMP;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StaticListener {
    pub listener: Option<TypedAny>,
    #[serde(alias = "lastUpdated")]
    pub last_updated: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DynamicListener {
    pub name: String,
    #[serde(alias = "activeState")]
    pub active_state: Option<ListenerState>,
    #[serde(alias = "warmingState")]
    pub warming_state: Option<ListenerState>,
    #[serde(alias = "drainingState")]
    pub draining_state: Option<ListenerState>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListenerState {
    #[serde(alias = "versionInfo")]
    pub version_info: String,
    pub listener: Option<TypedAny>,
    #[serde(alias = "lastUpdated")]
    pub last_updated: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoutesConfigDump {
    #[serde(alias = "staticRouteConfigs")]
    pub static_route_configs: Vec<RouteConfigEntry>,
    #[serde(alias = "dynamicRouteConfigs")]
    pub dynamic_route_configs: Vec<RouteConfigEntry>,
}

impl Typed for RoutesConfigDump {
    const TYPE_URL: &'static str = type_url::ROUTES_CONFIG_DUMP;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteConfigEntry {
    #[serde(alias = "versionInfo")]
    pub version_info: String,
    #[serde(alias = "routeConfig")]
    pub route_config: Option<TypedAny>,
    #[serde(alias = "lastUpdated")]
    pub last_updated: Option<String>,
}

/// The admin cluster status listing (`clusters?format=json`).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Clusters {
    #[serde(alias = "clusterStatuses")]
    pub cluster_statuses: Vec<ClusterStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterStatus {
    pub name: String,
    #[serde(alias = "addedViaApi")]
    pub added_via_api: bool,
    #[serde(alias = "hostStatuses")]
    pub host_statuses: Vec<HostStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostStatus {
    pub address: super::Address,
    #[serde(alias = "healthStatus")]
    pub health_status: HostHealthStatus,
    pub weight: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostHealthStatus {
    #[serde(alias = "edsHealthStatus")]
    pub eds_health_status: String,
    #[serde(alias = "failedOutlierCheck")]
    pub failed_outlier_check: bool,
}

impl Default for HostHealthStatus {
    fn default() -> Self {
        Self {
            eds_health_status: "UNKNOWN".to_string(),
            failed_outlier_check: false,
        }
    }
}

// === impl Clusters ===

impl Clusters {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(DecodeError::envelope)
    }
}
