use super::{route::RouteConfiguration, Address};
use crate::{type_url, Typed, TypedAny};
use serde::Deserialize;

/// Well-known network filter names.
pub const HTTP_CONNECTION_MANAGER: &str = "envoy.filters.network.http_connection_manager";
pub const TCP_PROXY: &str = "envoy.filters.network.tcp_proxy";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Listener {
    pub name: String,
    pub address: Address,
    #[serde(alias = "filterChains")]
    pub filter_chains: Vec<FilterChain>,
    #[serde(alias = "defaultFilterChain")]
    pub default_filter_chain: Option<FilterChain>,
}

impl Typed for Listener {
    const TYPE_URL: &'static str = type_url::LISTENER;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterChain {
    pub name: String,
    #[serde(alias = "filterChainMatch")]
    pub filter_chain_match: Option<FilterChainMatch>,
    pub filters: Vec<Filter>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterChainMatch {
    #[serde(alias = "destinationPort")]
    pub destination_port: Option<u32>,
    #[serde(alias = "prefixRanges")]
    pub prefix_ranges: Vec<CidrRange>,
    #[serde(alias = "serverNames")]
    pub server_names: Vec<String>,
    #[serde(alias = "transportProtocol")]
    pub transport_protocol: String,
    #[serde(alias = "applicationProtocols")]
    pub application_protocols: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CidrRange {
    #[serde(alias = "addressPrefix")]
    pub address_prefix: String,
    #[serde(alias = "prefixLen")]
    pub prefix_len: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Filter {
    pub name: String,
    #[serde(alias = "typedConfig")]
    pub typed_config: Option<TypedAny>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConnectionManager {
    #[serde(alias = "statPrefix")]
    pub stat_prefix: String,
    pub rds: Option<Rds>,
    #[serde(alias = "routeConfig")]
    pub route_config: Option<RouteConfiguration>,
}

impl Typed for HttpConnectionManager {
    const TYPE_URL: &'static str = type_url::HTTP_CONNECTION_MANAGER;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Rds {
    #[serde(alias = "routeConfigName")]
    pub route_config_name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TcpProxy {
    #[serde(alias = "statPrefix")]
    pub stat_prefix: String,
    pub cluster: Option<String>,
    #[serde(alias = "weightedClusters")]
    pub weighted_clusters: Option<TcpWeightedClusters>,
}

impl Typed for TcpProxy {
    const TYPE_URL: &'static str = type_url::TCP_PROXY;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TcpWeightedClusters {
    pub clusters: Vec<TcpClusterWeight>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TcpClusterWeight {
    pub name: String,
    pub weight: u32,
}

impl TcpProxy {
    /// Every cluster this proxy may forward to.
    pub fn clusters(&self) -> impl Iterator<Item = &str> {
        self.cluster.as_deref().into_iter().chain(
            self.weighted_clusters
                .iter()
                .flat_map(|w| w.clusters.iter().map(|c| c.name.as_str())),
        )
    }
}
