use crate::envoy::Metadata;

/// The filter metadata key under which the mesh annotates generated config.
pub(crate) const MESH_METADATA_KEY: &str = "istio";

/// Reported when a resource path does not have the expected shape.
pub(crate) const UNKNOWN_RESOURCE: &str = "<unknown>";

/// Names the resource that generated a piece of config, as `<name>.<namespace>`.
///
/// Returns an empty string when no annotation is present.
pub(crate) fn originating_resource(metadata: Option<&Metadata>) -> String {
    match metadata.and_then(|md| md.string(MESH_METADATA_KEY, "config")) {
        Some(path) => render_resource_path(path),
        None => String::new(),
    }
}

/// Renders `/apis/<group>/<version>/namespaces/<ns>/<kind>/<name>`.
pub(crate) fn render_resource_path(path: &str) -> String {
    let pieces = path.split('/').collect::<Vec<_>>();
    match pieces.as_slice() {
        ["", "apis", group, version, "namespaces", ns, kind, name]
            if [*group, *version, *ns, *kind, *name]
                .iter()
                .all(|p| !p.is_empty()) =>
        {
            format!("{name}.{ns}")
        }
        _ => UNKNOWN_RESOURCE.to_string(),
    }
}
