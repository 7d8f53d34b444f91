//! The route view: one row per route of every virtual host.

use crate::{
    envoy::route::{Route, RouteConfiguration, RouteMatch, VirtualHost},
    metadata, DecodeError, Snapshot, PASSTHROUGH_CLUSTER,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Long-form service suffix, stripped first when collapsing domain aliases.
pub const CLUSTER_LOCAL_SUFFIX: &str = ".cluster.local";

/// Short-form service suffix, stripped second.
pub const SERVICE_SUFFIX: &str = ".svc";

/// Match text of the row reported for a virtual host without routes.
pub const NOT_FOUND_MATCH: &str = "/*";
pub const NOT_FOUND: &str = "404";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub name: String,
    pub domains: Vec<String>,
    #[serde(rename = "match")]
    pub route_match: String,
    pub virtual_service: String,
}

pub fn project(snapshot: &Snapshot) -> Result<Vec<RouteEntry>, DecodeError> {
    let routes = match snapshot.routes() {
        Ok(routes) => routes,
        Err(error) if error.is_not_found() => return Ok(Vec::new()),
        Err(error) => return Err(error),
    };

    let mut entries = Vec::new();
    for config in routes {
        for vhost in &config.virtual_hosts {
            let domains = describe_domains(&vhost.domains);
            let routes = vhost
                .routes
                .iter()
                .filter(|r| !is_passthrough(r))
                .collect::<Vec<_>>();
            if routes.is_empty() {
                entries.push(RouteEntry {
                    name: config.name.clone(),
                    domains,
                    route_match: NOT_FOUND_MATCH.to_string(),
                    virtual_service: NOT_FOUND.to_string(),
                });
                continue;
            }
            entries.extend(routes.into_iter().map(|r| RouteEntry {
                name: config.name.clone(),
                domains: domains.clone(),
                route_match: describe_match(&r.route_match),
                virtual_service: metadata::originating_resource(r.metadata.as_ref()),
            }));
        }
    }
    Ok(entries)
}

/// Describes path criteria only; header criteria are ignored.
pub fn describe_match(m: &RouteMatch) -> String {
    let mut conds = Vec::new();
    if let Some(prefix) = m.prefix.as_deref().filter(|p| !p.is_empty()) {
        conds.push(format!("{prefix}*"));
    }
    if let Some(path) = m.path.as_deref().filter(|p| !p.is_empty()) {
        conds.push(path.to_string());
    }
    if let Some(regex) = &m.safe_regex {
        conds.push(format!("regex {}", regex.regex));
    }
    conds.join(" ")
}

/// Drops domains that carry a port, then collapses aliases of the same
/// service to the longest form, preserving order.
pub fn describe_domains(domains: &[String]) -> Vec<String> {
    let without_port = domains
        .iter()
        .filter(|d| {
            let colons = d.matches(':').count();
            // A bare IPv6 address is kept; an IPv6 address with a port is not.
            colons == 0 || (colons > 2 && d.ends_with(']'))
        })
        .map(String::as_str)
        .collect::<Vec<_>>();
    collapse_aliases(&without_port)
}

/// Keeps only the longest form of each `<name>.svc.cluster.local` family.
pub fn collapse_aliases(domains: &[&str]) -> Vec<String> {
    let present = domains.iter().copied().collect::<HashSet<_>>();
    let mut aliases = HashSet::new();
    for domain in domains {
        let mut shorter = *domain;
        for suffix in [CLUSTER_LOCAL_SUFFIX, SERVICE_SUFFIX] {
            if let Some(stripped) = shorter.strip_suffix(suffix) {
                if present.contains(stripped) {
                    aliases.insert(stripped);
                }
                shorter = stripped;
            }
        }
    }
    domains
        .iter()
        .filter(|d| !aliases.contains(**d))
        .map(|d| d.to_string())
        .collect()
}

fn is_passthrough(route: &Route) -> bool {
    route.cluster() == Some(PASSTHROUGH_CLUSTER)
}

/// Summarizes an inline route configuration as listener destination text.
pub(crate) fn describe_route_config(config: &RouteConfiguration) -> String {
    if let Some(cluster) = match_all_cluster(config) {
        return crate::listener::describe_cluster(cluster);
    }
    let vhosts = config
        .virtual_hosts
        .iter()
        .map(|vh| match describe_vhost_domains(vh) {
            Some(domains) => format!("{domains} {}", describe_routes(vh)),
            None => describe_routes(vh),
        })
        .collect::<Vec<_>>();
    format!("Inline Route: {}", vhosts.join("; "))
}

/// A configuration with a single wildcard host routing `/` to one cluster.
fn match_all_cluster(config: &RouteConfiguration) -> Option<&str> {
    let [vh] = config.virtual_hosts.as_slice() else {
        return None;
    };
    if vh.domains != ["*"] {
        return None;
    }
    let [route] = vh.routes.as_slice() else {
        return None;
    };
    if route.route_match.prefix.as_deref() != Some("/") {
        return None;
    }
    route.cluster()
}

fn describe_vhost_domains(vh: &VirtualHost) -> Option<String> {
    if vh.domains == ["*"] {
        return None;
    }
    Some(vh.domains.join("/"))
}

fn describe_routes(vh: &VirtualHost) -> String {
    vh.routes
        .iter()
        .map(|r| describe_match(&r.route_match))
        .collect::<Vec<_>>()
        .join(", ")
}
