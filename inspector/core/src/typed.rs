use crate::DecodeError;
use serde::{de, de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Canonical type identifiers for every typed payload the decoder understands.
///
/// Producers may stamp entries with older or alternate identifiers for the
/// same shape; [`TypedAny::retag`] forces the canonical identifier before
/// decoding, so an identifier change only needs to be made here.
pub mod type_url {
    pub const CLUSTERS_CONFIG_DUMP: &str = "type.googleapis.com/envoy.admin.v3.ClustersConfigDump";
    pub const LISTENERS_CONFIG_DUMP: &str =
        "type.googleapis.com/envoy.admin.v3.ListenersConfigDump";
    pub const ROUTES_CONFIG_DUMP: &str = "type.googleapis.com/envoy.admin.v3.RoutesConfigDump";

    pub const CLUSTER: &str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";
    pub const LISTENER: &str = "type.googleapis.com/envoy.config.listener.v3.Listener";
    pub const ROUTE_CONFIGURATION: &str =
        "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";

    pub const HTTP_CONNECTION_MANAGER: &str = "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager";
    pub const TCP_PROXY: &str =
        "type.googleapis.com/envoy.extensions.filters.network.tcp_proxy.v3.TcpProxy";
}

/// A structure that may be carried inside a [`TypedAny`].
pub trait Typed: DeserializeOwned {
    const TYPE_URL: &'static str;
}

/// A polymorphic payload identified only by its `@type` tag.
///
/// The remaining fields are held undecoded until a caller asks for a concrete
/// shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypedAny {
    type_url: String,
    fields: Map<String, Value>,
}

// === impl TypedAny ===

impl TypedAny {
    pub fn new(type_url: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            type_url: type_url.into(),
            fields,
        }
    }

    #[inline]
    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    #[inline]
    pub fn is<T: Typed>(&self) -> bool {
        self.type_url == T::TYPE_URL
    }

    /// Returns the raw value of a top-level field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Decodes the payload, requiring its tag to match `T` exactly.
    pub fn unpack<T: Typed>(self) -> Result<T, DecodeError> {
        if !self.is::<T>() {
            return Err(DecodeError::TypeMismatch {
                expected: T::TYPE_URL,
                found: self.type_url,
            });
        }
        serde_json::from_value(Value::Object(self.fields)).map_err(|error| DecodeError::Entry {
            type_url: T::TYPE_URL,
            source: Arc::new(error),
        })
    }

    /// Stamps the payload with `T`'s canonical tag and decodes it.
    pub fn retag<T: Typed>(&self) -> Result<T, DecodeError> {
        Self {
            type_url: T::TYPE_URL.to_string(),
            fields: self.fields.clone(),
        }
        .unpack()
    }
}

impl<'de> Deserialize<'de> for TypedAny {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::deserialize(deserializer)?;
        let type_url = match fields.remove("@type") {
            Some(Value::String(type_url)) => type_url,
            Some(_) => return Err(de::Error::custom("`@type` must be a string")),
            None => String::new(),
        };
        Ok(Self { type_url, fields })
    }
}
