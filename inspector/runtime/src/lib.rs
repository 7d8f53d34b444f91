#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use sidecar_inspector_core as core;
pub use sidecar_inspector_k8s_portforward as portforward;

mod args;
mod client;
mod error;
mod inspector;
mod request;

pub use self::{
    args::Args,
    client::ListPods,
    error::Error,
    inspector::{Config, Inspector},
};
