use super::Metadata;
use crate::{type_url, Typed};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteConfiguration {
    pub name: String,
    #[serde(alias = "virtualHosts")]
    pub virtual_hosts: Vec<VirtualHost>,
}

impl Typed for RouteConfiguration {
    const TYPE_URL: &'static str = type_url::ROUTE_CONFIGURATION;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct VirtualHost {
    pub name: String,
    pub domains: Vec<String>,
    pub routes: Vec<Route>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Route {
    pub name: String,
    #[serde(rename = "match")]
    pub route_match: RouteMatch,
    pub route: Option<RouteAction>,
    pub metadata: Option<Metadata>,
}

/// Header matchers are not modeled.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteMatch {
    pub prefix: Option<String>,
    pub path: Option<String>,
    #[serde(alias = "safeRegex")]
    pub safe_regex: Option<RegexMatcher>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegexMatcher {
    pub regex: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteAction {
    pub cluster: Option<String>,
    #[serde(alias = "weightedClusters")]
    pub weighted_clusters: Option<WeightedClusters>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightedClusters {
    pub clusters: Vec<ClusterWeight>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterWeight {
    pub name: String,
    pub weight: Option<u32>,
}

impl Route {
    /// The single cluster this route forwards to, if it names exactly one.
    pub fn cluster(&self) -> Option<&str> {
        self.route.as_ref()?.cluster.as_deref()
    }
}
