//! The listener view: one row per filter chain of every listener.

use crate::{
    envoy::listener::{
        Filter, FilterChain, FilterChainMatch, HttpConnectionManager, Listener, TcpProxy,
        HTTP_CONNECTION_MANAGER, TCP_PROXY,
    },
    route, DecodeError, Snapshot, BLACKHOLE_CLUSTER,
};
use serde::{Deserialize, Serialize};

/// Match text for a filter chain without any criteria.
pub const MATCH_ALL: &str = "ALL";

/// Destination text for a filter chain without a recognized proxy filter.
pub const UNRECOGNIZED_DESTINATION: &str = "Non-HTTP/Non-TCP";

/// Well-known application protocol sets, checked in order.
const PROTOCOL_DESCRIPTIONS: &[(&str, &[&str])] = &[
    (
        "App: HTTP TLS",
        &[
            "http/1.0",
            "http/1.1",
            "h2c",
            "istio-http/1.0",
            "istio-http/1.1",
            "istio-h2",
        ],
    ),
    (
        "App: Istio HTTP Plain",
        &["istio", "istio-http/1.0", "istio-http/1.1", "istio-h2"],
    ),
    ("App: TCP TLS", &["istio-peer-exchange", "istio"]),
    ("App: HTTP", &["http/1.0", "http/1.1", "h2c"]),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerEntry {
    pub address: String,
    pub port: u32,
    #[serde(rename = "match")]
    pub chain_match: String,
    pub destination: String,
}

pub fn project(snapshot: &Snapshot) -> Result<Vec<ListenerEntry>, DecodeError> {
    let listeners = match snapshot.listeners() {
        Ok(listeners) => listeners,
        Err(error) if error.is_not_found() => return Ok(Vec::new()),
        Err(error) => return Err(error),
    };
    Ok(listeners.iter().flat_map(entries).collect())
}

fn entries(listener: &Listener) -> impl Iterator<Item = ListenerEntry> + '_ {
    let address = listener.address.host().unwrap_or_default().to_string();
    let port = listener.address.port();
    listener
        .filter_chains
        .iter()
        .chain(listener.default_filter_chain.as_ref())
        .map(move |chain| ListenerEntry {
            address: address.clone(),
            port,
            chain_match: describe_chain_match(chain.filter_chain_match.as_ref()),
            destination: describe_destination(chain),
        })
}

/// Describes the criteria a connection must meet to select a filter chain.
pub fn describe_chain_match(m: Option<&FilterChainMatch>) -> String {
    let Some(m) = m else {
        return MATCH_ALL.to_string();
    };

    let mut descriptions = Vec::new();
    if !m.server_names.is_empty() {
        descriptions.push(format!("SNI: {}", m.server_names.join(",")));
    }
    if !m.transport_protocol.is_empty() {
        descriptions.push(format!("Trans: {}", m.transport_protocol));
    }
    if !m.application_protocols.is_empty() {
        let known = PROTOCOL_DESCRIPTIONS
            .iter()
            .find(|(_, protocols)| *protocols == m.application_protocols.as_slice());
        descriptions.push(match known {
            Some((description, _)) => description.to_string(),
            None => format!("App: {}", m.application_protocols.join(",")),
        });
    }

    let port = m
        .destination_port
        .map(|p| format!(":{p}"))
        .unwrap_or_default();
    if !m.prefix_ranges.is_empty() {
        let ranges = m
            .prefix_ranges
            .iter()
            .map(|r| format!("{}/{}", r.address_prefix, r.prefix_len.unwrap_or(0)))
            .collect::<Vec<_>>();
        descriptions.push(format!("Addr: {}{port}", ranges.join(",")));
    } else if !port.is_empty() {
        descriptions.push(format!("Addr: *{port}"));
    }

    if descriptions.is_empty() {
        return MATCH_ALL.to_string();
    }
    descriptions.join("; ")
}

/// Describes where a filter chain sends traffic, based on its first
/// recognized proxy filter.
pub fn describe_destination(chain: &FilterChain) -> String {
    chain
        .filters
        .iter()
        .find_map(describe_filter)
        .unwrap_or_else(|| UNRECOGNIZED_DESTINATION.to_string())
}

fn describe_filter(filter: &Filter) -> Option<String> {
    let config = filter.typed_config.as_ref()?;
    match filter.name.as_str() {
        HTTP_CONNECTION_MANAGER => {
            let hcm = decode_filter::<HttpConnectionManager>(filter, config)?;
            if let Some(config) = &hcm.route_config {
                return Some(route::describe_route_config(config));
            }
            match hcm.rds.as_ref().map(|rds| rds.route_config_name.as_str()) {
                Some(name) if !name.is_empty() => Some(format!("Route: {name}")),
                _ => Some("HTTP".to_string()),
            }
        }
        TCP_PROXY => {
            let tcp = decode_filter::<TcpProxy>(filter, config)?;
            let clusters = tcp
                .clusters()
                .filter(|c| *c != BLACKHOLE_CLUSTER)
                .collect::<Vec<_>>();
            match clusters.as_slice() {
                [] => None,
                [cluster] => Some(describe_cluster(cluster)),
                clusters => Some(format!("Clusters: {}", clusters.join(","))),
            }
        }
        _ => None,
    }
}

fn decode_filter<T: crate::Typed>(filter: &Filter, config: &crate::TypedAny) -> Option<T> {
    match config.retag::<T>() {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            tracing::debug!(%error, filter = %filter.name, "Skipping filter that could not be decoded");
            None
        }
    }
}

/// Sentinel clusters are named verbatim; others are labeled.
pub(crate) fn describe_cluster(cluster: &str) -> String {
    if cluster.contains("Cluster") {
        return cluster.to_string();
    }
    format!("Cluster: {cluster}")
}
