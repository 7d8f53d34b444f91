use std::sync::Arc;

/// Errors produced while decoding a configuration snapshot.
///
/// Decoded sections are cached on the snapshot, so the error is cheaply
/// cloneable and every caller observes the same failure.
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("payload is not a configuration snapshot: {0}")]
    MalformedEnvelope(#[source] Arc<serde_json::Error>),

    #[error("configuration snapshot has no section of type {type_url}")]
    SectionNotFound { type_url: &'static str },

    #[error("section {type_url} could not be decoded: {source}")]
    MalformedSection {
        type_url: &'static str,
        #[source]
        source: Arc<serde_json::Error>,
    },

    #[error("expected an entry of type {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("entry of type {type_url} could not be decoded: {source}")]
    Entry {
        type_url: &'static str,
        #[source]
        source: Arc<serde_json::Error>,
    },
}

impl DecodeError {
    pub(crate) fn envelope(error: serde_json::Error) -> Self {
        Self::MalformedEnvelope(Arc::new(error))
    }

    /// Indicates that a requested section is simply absent.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SectionNotFound { .. })
    }
}
