#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Temporary, authenticated tunnels from a local address into a single pod's
//! network namespace, routed through the Kubernetes API's port-forward
//! sub-resource.

mod allocate;
mod client;
mod error;
mod tunnel;

pub use self::{
    allocate::allocate,
    client::{BoxedIo, FetchPod, Io, UpgradeStream},
    error::Error,
    tunnel::{Tunnel, DEFAULT_LOCAL_ADDRESS, DEFAULT_RETRY_BACKOFF},
};
pub use k8s_openapi::api::core::v1::Pod;

/// The pod phase in which a pod's containers are able to accept connections.
pub const POD_RUNNING: &str = "Running";
