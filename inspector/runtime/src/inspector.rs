use crate::{
    core::{
        cluster::{self, ClusterEntry},
        endpoint::{self, EndpointEntry},
        envoy::admin::Clusters,
        listener::{self, ListenerEntry},
        route::{self, RouteEntry},
        sync::{self, SyncEntry},
        Snapshot,
    },
    portforward::{FetchPod, Tunnel, UpgradeStream, DEFAULT_RETRY_BACKOFF},
    request, Error, ListPods,
};
use bytes::Bytes;
use http::Method;
use std::{collections::BTreeMap, sync::Arc};
use tokio::time;
use tracing::{debug, info_span, Instrument};

pub const DEFAULT_ADMIN_PORT: u16 = 15000;
pub const DEFAULT_DEBUG_PORT: u16 = 15014;

const CONFIG_DUMP_PATH: &str = "config_dump";
const CLUSTERS_PATH: &str = "clusters?format=json";
const SYNC_STATUS_PATH: &str = "debug/syncz";

#[derive(Clone, Debug)]
pub struct Config {
    /// The address on which tunnels listen.
    pub local_address: String,

    /// Bounds each query, including bringing up its tunnel.
    pub request_timeout: time::Duration,

    pub retry_backoff: time::Duration,

    /// The proxy's admin port.
    pub admin_port: u16,

    pub control_plane_namespace: String,

    /// Selects the control plane's discovery replicas.
    pub control_plane_selector: String,

    /// The replicas' debug port.
    pub debug_port: u16,
}

/// Queries proxies and control plane replicas over short-lived tunnels.
///
/// Nothing is cached between queries: every query opens its own tunnel and
/// closes it before returning.
#[derive(Debug)]
pub struct Inspector<C> {
    client: Arc<C>,
    config: Config,
}

// === impl Config ===

impl Default for Config {
    fn default() -> Self {
        Self {
            local_address: "127.0.0.1".to_string(),
            request_timeout: time::Duration::from_secs(30),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            admin_port: DEFAULT_ADMIN_PORT,
            control_plane_namespace: "istio-system".to_string(),
            control_plane_selector: "app=istiod".to_string(),
            debug_port: DEFAULT_DEBUG_PORT,
        }
    }
}

// === impl Inspector ===

impl<C> Inspector<C>
where
    C: FetchPod + UpgradeStream + ListPods,
{
    pub fn new(client: Arc<C>, config: Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Issues a single request to `remote_port` on a pod and returns the
    /// response body.
    ///
    /// The tunnel is closed on every path out of this call.
    pub async fn query_pod(
        &self,
        pod: &str,
        namespace: &str,
        method: Method,
        path: &str,
        remote_port: u16,
    ) -> Result<Bytes, Error> {
        let tunnel = Tunnel::new(
            self.client.clone(),
            pod,
            namespace,
            &self.config.local_address,
            0,
            remote_port,
        )?
        .with_retry_backoff(self.config.retry_backoff);

        let timeout = self.config.request_timeout;
        let res = time::timeout(timeout, async {
            tunnel.start().await?;
            request::send(&tunnel.address(), method, path).await
        })
        .instrument(info_span!("query", %pod, %namespace, port = remote_port))
        .await;
        tunnel.close();

        res.unwrap_or(Err(Error::Timeout(timeout)))
    }

    /// Issues a GET for `path` to every running control plane replica in
    /// `namespace`, one replica at a time.
    ///
    /// Any failure fails the whole call. Replicas that respond with an empty
    /// body are omitted, so an empty map means no replica had data.
    pub async fn query_all_replicas(
        &self,
        namespace: &str,
        path: &str,
    ) -> Result<BTreeMap<String, Bytes>, Error> {
        let selector = &self.config.control_plane_selector;
        let replicas = self
            .client
            .list_running(namespace, selector)
            .await
            .map_err(Error::ListReplicas)?;
        if replicas.is_empty() {
            return Err(Error::NoReplicasFound {
                namespace: namespace.to_string(),
                selector: selector.clone(),
            });
        }

        let mut bodies = BTreeMap::new();
        for replica in replicas {
            let body = self
                .query_pod(&replica, namespace, Method::GET, path, self.config.debug_port)
                .await?;
            if body.is_empty() {
                debug!(%replica, "Replica returned no data");
                continue;
            }
            bodies.insert(replica, body);
        }
        Ok(bodies)
    }

    /// Fetches and decodes the proxy's configuration dump.
    pub async fn config_dump(&self, pod: &str, namespace: &str) -> Result<Snapshot, Error> {
        let body = self.query_admin(pod, namespace, CONFIG_DUMP_PATH).await?;
        Ok(Snapshot::decode(&body)?)
    }

    pub async fn clusters(&self, pod: &str, namespace: &str) -> Result<Vec<ClusterEntry>, Error> {
        let snapshot = self.config_dump(pod, namespace).await?;
        Ok(cluster::project(&snapshot)?)
    }

    pub async fn listeners(
        &self,
        pod: &str,
        namespace: &str,
    ) -> Result<Vec<ListenerEntry>, Error> {
        let snapshot = self.config_dump(pod, namespace).await?;
        Ok(listener::project(&snapshot)?)
    }

    pub async fn routes(&self, pod: &str, namespace: &str) -> Result<Vec<RouteEntry>, Error> {
        let snapshot = self.config_dump(pod, namespace).await?;
        Ok(route::project(&snapshot)?)
    }

    /// Reads host membership and health from the proxy's cluster listing.
    pub async fn endpoints(
        &self,
        pod: &str,
        namespace: &str,
    ) -> Result<Vec<EndpointEntry>, Error> {
        let body = self.query_admin(pod, namespace, CLUSTERS_PATH).await?;
        let clusters = Clusters::decode(&body)?;
        Ok(endpoint::project(&clusters))
    }

    /// Fetches each control plane replica's view of the proxy's configuration.
    pub async fn control_plane_config_dump(
        &self,
        pod: &str,
        namespace: &str,
    ) -> Result<BTreeMap<String, Snapshot>, Error> {
        let path = format!("debug/{CONFIG_DUMP_PATH}?proxyID={}", proxy_id(pod, namespace));
        let bodies = self
            .query_all_replicas(&self.config.control_plane_namespace, &path)
            .await?;
        let mut snapshots = BTreeMap::new();
        for (replica, body) in bodies {
            let snapshot = Snapshot::decode(&body)?;
            snapshots.insert(replica, snapshot);
        }
        Ok(snapshots)
    }

    /// Reports whether each control plane replica's latest configuration has
    /// been acknowledged by the proxy.
    pub async fn sync_status(&self, pod: &str, namespace: &str) -> Result<Vec<SyncEntry>, Error> {
        let bodies = self
            .query_all_replicas(&self.config.control_plane_namespace, SYNC_STATUS_PATH)
            .await?;
        Ok(sync::project(&bodies, &proxy_id(pod, namespace))?)
    }

    async fn query_admin(&self, pod: &str, namespace: &str, path: &str) -> Result<Bytes, Error> {
        self.query_pod(pod, namespace, Method::GET, path, self.config.admin_port)
            .await
    }
}

/// The identity under which a proxy registers with the control plane.
fn proxy_id(pod: &str, namespace: &str) -> String {
    format!("{pod}.{namespace}")
}
