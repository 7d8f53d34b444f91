#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to allocate a local port on {address}: {source}")]
    Allocation {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to retrieve pod {name} in the {namespace:?} namespace: {source}")]
    PodLookup {
        namespace: String,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("pod {name} in the {namespace:?} namespace is not running: phase={phase}")]
    PodNotRunning {
        namespace: String,
        name: String,
        phase: String,
    },

    #[error("port forward connection failed: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("tunnel has already been started")]
    AlreadyStarted,

    #[error("tunnel closed before it became ready")]
    Closed,
}
