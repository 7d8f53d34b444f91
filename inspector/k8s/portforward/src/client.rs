use crate::Pod;
use anyhow::Result;
use tokio::io::{AsyncRead, AsyncWrite};

/// A bidirectional byte stream into a pod.
pub trait Io: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> Io for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

pub type BoxedIo = Box<dyn Io>;

/// Retrieves pod objects from the control plane.
#[async_trait::async_trait]
pub trait FetchPod: Send + Sync + 'static {
    async fn fetch_pod(&self, namespace: &str, name: &str) -> Result<Pod>;
}

/// Opens an upgraded stream to a port on a pod.
#[async_trait::async_trait]
pub trait UpgradeStream: Send + Sync + 'static {
    async fn upgrade(&self, namespace: &str, name: &str, port: u16) -> Result<BoxedIo>;
}

#[async_trait::async_trait]
impl FetchPod for kube::Client {
    async fn fetch_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let pod = kube::Api::<Pod>::namespaced(self.clone(), namespace)
            .get(name)
            .await?;
        Ok(pod)
    }
}

#[async_trait::async_trait]
impl UpgradeStream for kube::Client {
    async fn upgrade(&self, namespace: &str, name: &str, port: u16) -> Result<BoxedIo> {
        let mut pf = kube::Api::<Pod>::namespaced(self.clone(), namespace)
            .portforward(name, &[port])
            .await?;
        let io = pf
            .take_stream(port)
            .ok_or_else(|| anyhow::anyhow!("port forward has no stream for port {port}"))?;
        Ok(Box::new(io))
    }
}
