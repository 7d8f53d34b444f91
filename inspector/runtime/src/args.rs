use crate::{Config, Inspector};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::debug;

#[derive(Debug, Parser)]
#[clap(
    name = "sidecar-inspector",
    about = "Inspects the configuration of a sidecar proxy",
    version
)]
pub struct Args {
    #[clap(
        long,
        default_value = "sidecar_inspector=info,warn",
        env = "SIDECAR_INSPECTOR_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    /// The local address on which tunnels listen.
    #[clap(long, default_value = "127.0.0.1")]
    local_address: String,

    #[clap(long, default_value = "30000")]
    request_timeout_ms: u64,

    #[clap(long, default_value = "1000")]
    retry_backoff_ms: u64,

    #[clap(long, default_value = "15000")]
    admin_port: u16,

    #[clap(long, default_value = "istio-system")]
    control_plane_namespace: String,

    #[clap(long, default_value = "app=istiod")]
    control_plane_selector: String,

    #[clap(long, default_value = "15014")]
    debug_port: u16,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lists the proxy's clusters.
    Clusters(Target),

    /// Lists the hosts of each of the proxy's clusters.
    Endpoints(Target),

    /// Lists the proxy's listeners, one row per filter chain.
    Listeners(Target),

    /// Lists the proxy's routes.
    Routes(Target),

    /// Reports whether the proxy has acknowledged each control plane
    /// replica's configuration.
    SyncStatus(Target),
}

#[derive(Debug, clap::Args)]
struct Target {
    /// The name of the pod running the proxy.
    pod: String,

    #[clap(long, short = 'n', default_value = "default")]
    namespace: String,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            local_address,
            request_timeout_ms,
            retry_backoff_ms,
            admin_port,
            control_plane_namespace,
            control_plane_selector,
            debug_port,
            command,
        } = self;

        log_format.try_init(log_level)?;

        let config = Config {
            local_address,
            request_timeout: Duration::from_millis(request_timeout_ms),
            retry_backoff: Duration::from_millis(retry_backoff_ms),
            admin_port,
            control_plane_namespace,
            control_plane_selector,
            debug_port,
        };
        debug!(?config, "Inspecting");

        let client = client.try_client().await?;
        let inspector = Inspector::new(Arc::new(client), config);

        let output = match command {
            Command::Clusters(Target { pod, namespace }) => {
                to_json(&inspector.clusters(&pod, &namespace).await?)?
            }
            Command::Endpoints(Target { pod, namespace }) => {
                to_json(&inspector.endpoints(&pod, &namespace).await?)?
            }
            Command::Listeners(Target { pod, namespace }) => {
                to_json(&inspector.listeners(&pod, &namespace).await?)?
            }
            Command::Routes(Target { pod, namespace }) => {
                to_json(&inspector.routes(&pod, &namespace).await?)?
            }
            Command::SyncStatus(Target { pod, namespace }) => {
                to_json(&inspector.sync_status(&pod, &namespace).await?)?
            }
        };
        println!("{output}");
        Ok(())
    }
}

fn to_json<T: Serialize>(rows: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}
