use crate::{
    envoy::{
        admin::{ClustersConfigDump, ListenersConfigDump, RoutesConfigDump},
        cluster::Cluster,
        listener::Listener,
        route::RouteConfiguration,
    },
    type_url, DecodeError, Typed, TypedAny,
};
use serde::Deserialize;
use std::sync::OnceLock;

/// A proxy's self-reported configuration at the moment it was requested.
///
/// Only the outer envelope is parsed on construction. Each well-known section
/// is decoded the first time it is requested and cached thereafter.
#[derive(Debug)]
pub struct Snapshot {
    configs: Vec<TypedAny>,
    clusters: OnceLock<Result<Entries<Cluster>, DecodeError>>,
    listeners: OnceLock<Result<Entries<Listener>, DecodeError>>,
    routes: OnceLock<Result<Entries<RouteConfiguration>, DecodeError>>,
}

/// The well-known sections of a snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Clusters,
    Listeners,
    Routes,
}

/// A decoded section.
#[derive(Copy, Clone, Debug)]
pub enum Section<'a> {
    Clusters(&'a Entries<Cluster>),
    Listeners(&'a Entries<Listener>),
    Routes(&'a Entries<RouteConfiguration>),
}

/// The entries of a section that decoded successfully, in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct Entries<T> {
    pub items: Vec<T>,
    /// The number of entries dropped because they could not be decoded.
    pub skipped: usize,
}

#[derive(Deserialize)]
struct Envelope {
    configs: Vec<TypedAny>,
}

// === impl SectionKind ===

impl SectionKind {
    pub const fn type_url(self) -> &'static str {
        match self {
            Self::Clusters => type_url::CLUSTERS_CONFIG_DUMP,
            Self::Listeners => type_url::LISTENERS_CONFIG_DUMP,
            Self::Routes => type_url::ROUTES_CONFIG_DUMP,
        }
    }
}

// === impl Snapshot ===

impl Snapshot {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let Envelope { configs } = serde_json::from_slice(bytes).map_err(DecodeError::envelope)?;
        Ok(Self::from_configs(configs))
    }

    pub fn from_configs(configs: Vec<TypedAny>) -> Self {
        Self {
            configs,
            clusters: OnceLock::new(),
            listeners: OnceLock::new(),
            routes: OnceLock::new(),
        }
    }

    /// The undecoded sections, in the order the proxy reported them.
    pub fn configs(&self) -> &[TypedAny] {
        &self.configs
    }

    /// Returns the first undecoded section carrying the given tag.
    pub fn raw(&self, type_url: &'static str) -> Result<&TypedAny, DecodeError> {
        self.configs
            .iter()
            .find(|c| c.type_url() == type_url)
            .ok_or(DecodeError::SectionNotFound { type_url })
    }

    pub fn section(&self, kind: SectionKind) -> Result<Section<'_>, DecodeError> {
        match kind {
            SectionKind::Clusters => self.clusters().map(Section::Clusters),
            SectionKind::Listeners => self.listeners().map(Section::Listeners),
            SectionKind::Routes => self.routes().map(Section::Routes),
        }
    }

    /// Static clusters followed by dynamically-active clusters.
    pub fn clusters(&self) -> Result<&Entries<Cluster>, DecodeError> {
        cached(&self.clusters, || {
            let dump = self.unpack::<ClustersConfigDump>()?;
            let statics = dump.static_clusters.iter().map(|c| c.cluster.as_ref());
            let dynamics = dump.dynamic_active_clusters.iter().map(|c| c.cluster.as_ref());
            Ok(Entries::retag_all(statics.chain(dynamics)))
        })
    }

    /// Static listeners followed by the active state of dynamic listeners.
    ///
    /// Warming and draining listener states are not reported.
    pub fn listeners(&self) -> Result<&Entries<Listener>, DecodeError> {
        cached(&self.listeners, || {
            let dump = self.unpack::<ListenersConfigDump>()?;
            let statics = dump.static_listeners.iter().map(|l| l.listener.as_ref());
            let dynamics = dump
                .dynamic_listeners
                .iter()
                .map(|l| l.active_state.as_ref().and_then(|s| s.listener.as_ref()));
            Ok(Entries::retag_all(statics.chain(dynamics)))
        })
    }

    /// Static route configurations followed by dynamic ones.
    pub fn routes(&self) -> Result<&Entries<RouteConfiguration>, DecodeError> {
        cached(&self.routes, || {
            let dump = self.unpack::<RoutesConfigDump>()?;
            let statics = dump.static_route_configs.iter();
            let dynamics = dump.dynamic_route_configs.iter();
            Ok(Entries::retag_all(
                statics.chain(dynamics).map(|r| r.route_config.as_ref()),
            ))
        })
    }

    fn unpack<T: Typed>(&self) -> Result<T, DecodeError> {
        self.raw(T::TYPE_URL)?
            .clone()
            .unpack()
            .map_err(|error| match error {
                DecodeError::Entry { type_url, source } => {
                    DecodeError::MalformedSection { type_url, source }
                }
                error => error,
            })
    }
}

fn cached<T>(
    cell: &OnceLock<Result<T, DecodeError>>,
    init: impl FnOnce() -> Result<T, DecodeError>,
) -> Result<&T, DecodeError> {
    cell.get_or_init(init).as_ref().map_err(Clone::clone)
}

// === impl Entries ===

impl<T: Typed> Entries<T> {
    /// Decodes each present entry under `T`'s canonical tag, dropping entries
    /// that fail to decode.
    fn retag_all<'a>(entries: impl Iterator<Item = Option<&'a TypedAny>>) -> Self {
        let mut items = Vec::new();
        let mut skipped = 0;
        for entry in entries.flatten() {
            match entry.retag::<T>() {
                Ok(item) => items.push(item),
                Err(error) => {
                    tracing::debug!(
                        %error,
                        type_url = %entry.type_url(),
                        "Skipping entry that could not be decoded"
                    );
                    skipped += 1;
                }
            }
        }
        Self { items, skipped }
    }
}

impl<T> Entries<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a Entries<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl From<Vec<TypedAny>> for Snapshot {
    fn from(configs: Vec<TypedAny>) -> Self {
        Self::from_configs(configs)
    }
}
