use crate::{core::DecodeError, portforward};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Tunnel(#[from] portforward::Error),

    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Request(#[from] hyper::Error),

    #[error("invalid HTTP request: {0}")]
    InvalidRequest(#[from] http::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to list control plane replicas: {0}")]
    ListReplicas(#[source] anyhow::Error),

    #[error("no running replicas match {selector:?} in the {namespace:?} namespace")]
    NoReplicasFound { namespace: String, selector: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
