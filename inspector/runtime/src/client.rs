use crate::portforward::Pod;
use anyhow::Result;
use kube::{api::ListParams, ResourceExt};

/// Lists the running pods that match a label selector.
#[async_trait::async_trait]
pub trait ListPods: Send + Sync + 'static {
    async fn list_running(&self, namespace: &str, selector: &str) -> Result<Vec<String>>;
}

#[async_trait::async_trait]
impl ListPods for kube::Client {
    async fn list_running(&self, namespace: &str, selector: &str) -> Result<Vec<String>> {
        let params = ListParams::default()
            .labels(selector)
            .fields("status.phase=Running");
        let pods = kube::Api::<Pod>::namespaced(self.clone(), namespace)
            .list(&params)
            .await?;
        Ok(pods.items.iter().map(|pod| pod.name_any()).collect())
    }
}
