#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Decodes a sidecar proxy's self-reported configuration and projects it into
//! flat, display-ready views.

pub mod cluster;
mod config_dump;
pub mod endpoint;
pub mod envoy;
mod error;
pub mod listener;
mod metadata;
pub mod route;
pub mod sync;
mod typed;

pub use self::{
    config_dump::{Entries, Section, SectionKind, Snapshot},
    error::DecodeError,
    typed::{type_url, Typed, TypedAny},
};

/// The cluster that forwards traffic without modification.
pub const PASSTHROUGH_CLUSTER: &str = "PassthroughCluster";

/// The cluster that drops all traffic.
pub const BLACKHOLE_CLUSTER: &str = "BlackHoleCluster";
