//! The subset of the proxy's configuration model that the views read.
//!
//! Fields accept both spellings of the proto JSON mapping: the snake_case
//! names the proxy's admin port emits and the lowerCamelCase names the
//! control plane's debug endpoints emit. Every field is optional on the
//! wire, so every struct decodes from `{}`.

pub mod admin;
pub mod cluster;
pub mod listener;
pub mod route;

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Address {
    #[serde(alias = "socketAddress")]
    pub socket_address: Option<SocketAddress>,
    pub pipe: Option<Pipe>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SocketAddress {
    pub address: String,
    #[serde(alias = "portValue")]
    pub port_value: u32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Pipe {
    pub path: String,
}

/// Free-form metadata, keyed by filter name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Metadata {
    #[serde(alias = "filterMetadata")]
    pub filter_metadata: BTreeMap<String, Value>,
}

// === impl Address ===

impl Address {
    /// The socket address, or the pipe path when the address is a pipe.
    pub fn host(&self) -> Option<&str> {
        if let Some(sa) = &self.socket_address {
            return Some(&sa.address);
        }
        self.pipe.as_ref().map(|p| p.path.as_str())
    }

    pub fn port(&self) -> u32 {
        self.socket_address
            .as_ref()
            .map(|sa| sa.port_value)
            .unwrap_or(0)
    }
}

// === impl Metadata ===

impl Metadata {
    /// Looks up a string field within a filter's metadata.
    pub fn string(&self, filter: &str, field: &str) -> Option<&str> {
        self.filter_metadata.get(filter)?.get(field)?.as_str()
    }
}
