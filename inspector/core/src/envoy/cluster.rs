use super::Metadata;
use crate::{type_url, Typed};
use serde::Deserialize;

/// The discovery type reported when a cluster does not name one.
pub const DEFAULT_DISCOVERY_TYPE: &str = "STATIC";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Cluster {
    pub name: String,
    #[serde(rename = "type")]
    pub discovery_type: Option<String>,
    pub metadata: Option<Metadata>,
}

impl Typed for Cluster {
    const TYPE_URL: &'static str = type_url::CLUSTER;
}

impl Cluster {
    pub fn discovery_type(&self) -> &str {
        self.discovery_type
            .as_deref()
            .unwrap_or(DEFAULT_DISCOVERY_TYPE)
    }
}
