use crate::{allocate, BoxedIo, Error, FetchPod, UpgradeStream, POD_RUNNING};
use parking_lot::Mutex;
use std::{net::SocketAddr, sync::Arc};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

pub const DEFAULT_LOCAL_ADDRESS: &str = "localhost";

/// The pause between attempts to re-establish a broken port forward.
pub const DEFAULT_RETRY_BACKOFF: time::Duration = time::Duration::from_secs(1);

/// Forwards a local address to a single port on a pod.
///
/// A tunnel is started once and closed once. Closing is idempotent and also
/// happens when the tunnel is dropped.
#[derive(Debug)]
pub struct Tunnel<C> {
    client: Arc<C>,
    namespace: String,
    pod: String,
    pod_port: u16,
    local_address: String,
    local_port: u16,
    retry_backoff: time::Duration,
    stop: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// The background task that owns the local listener and the upgraded stream.
struct Forward<C> {
    client: Arc<C>,
    namespace: String,
    pod: String,
    pod_port: u16,
    bind_address: String,
    local_port: u16,
    retry_backoff: time::Duration,
    stop: CancellationToken,
    ready: Option<oneshot::Sender<Result<(), Error>>>,
}

// === impl Tunnel ===

impl<C> Tunnel<C>
where
    C: FetchPod + UpgradeStream,
{
    /// Prepares a tunnel to `pod_port` on the named pod.
    ///
    /// An empty `local_address` listens on [`DEFAULT_LOCAL_ADDRESS`]; a zero
    /// `local_port` is replaced with an unused port.
    pub fn new(
        client: Arc<C>,
        pod: impl Into<String>,
        namespace: impl Into<String>,
        local_address: &str,
        local_port: u16,
        pod_port: u16,
    ) -> Result<Self, Error> {
        let local_address = if local_address.is_empty() {
            DEFAULT_LOCAL_ADDRESS
        } else {
            local_address
        };
        let local_port = match local_port {
            0 => allocate(local_address)?,
            port => port,
        };
        Ok(Self {
            client,
            namespace: namespace.into(),
            pod: pod.into(),
            pod_port,
            local_address: local_address.to_string(),
            local_port,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            stop: CancellationToken::new(),
            task: Mutex::new(None),
        })
    }

    pub fn with_retry_backoff(mut self, retry_backoff: time::Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    /// Starts forwarding and waits until the tunnel is ready to carry traffic.
    ///
    /// Fails if the pod cannot be retrieved, is not running, or if the tunnel
    /// is closed before it becomes ready. Transport failures are retried until
    /// the tunnel is closed.
    pub async fn start(&self) -> Result<(), Error> {
        let (ready_tx, ready_rx) = oneshot::channel();
        {
            let mut task = self.task.lock();
            if task.is_some() {
                return Err(Error::AlreadyStarted);
            }
            let forward = Forward {
                client: self.client.clone(),
                namespace: self.namespace.clone(),
                pod: self.pod.clone(),
                pod_port: self.pod_port,
                bind_address: self.local_address.clone(),
                local_port: self.local_port,
                retry_backoff: self.retry_backoff,
                stop: self.stop.clone(),
                ready: Some(ready_tx),
            };
            let span = info_span!(
                "portforward",
                pod = %self.pod,
                namespace = %self.namespace,
                port = self.pod_port,
            );
            *task = Some(tokio::spawn(forward.run().instrument(span)));
        }

        let error = match ready_rx.await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(error)) => error,
            Err(_) => Error::Closed,
        };

        // The task has given up; wait for it so nothing outlives the failure.
        self.stop.cancel();
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
        Err(error)
    }
}

impl<C> Tunnel<C> {
    /// The local `host:port` that forwards to the pod.
    ///
    /// Only meaningful after [`Tunnel::start`] has succeeded and before the
    /// tunnel is closed.
    pub fn address(&self) -> String {
        if self.local_address.contains(':') {
            format!("[{}]:{}", self.local_address, self.local_port)
        } else {
            format!("{}:{}", self.local_address, self.local_port)
        }
    }

    #[inline]
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Stops forwarding and releases the listener, the upgraded stream, and
    /// the background task.
    pub fn close(&self) {
        self.stop.cancel();
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Waits until the tunnel has been closed, by this caller or another.
    pub async fn wait_for_stop(&self) {
        self.stop.cancelled().await
    }

    /// Indicates whether the background task is still alive.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}

impl<C> Drop for Tunnel<C> {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

// === impl Forward ===

impl<C> Forward<C>
where
    C: FetchPod + UpgradeStream,
{
    async fn run(mut self) {
        // The pod's phase is checked once, before the first stream is opened.
        // Later reconnects assume the pod is still the one that was checked.
        let checked = tokio::select! {
            biased;
            _ = self.stop.cancelled() => return,
            res = self.check_pod() => res,
        };
        if let Err(error) = checked {
            self.signal(Err(error));
            return;
        }

        // The first stream gates readiness and carries the first connection.
        // Every later stream is opened only once a connection is accepted.
        let Some(io) = self.upgrade().await else {
            return;
        };
        let bind = TcpListener::bind((self.bind_address.as_str(), self.local_port));
        let listener = match bind.await {
            Ok(listener) => listener,
            Err(source) => {
                self.signal(Err(Error::Bind {
                    address: format!("{}:{}", self.bind_address, self.local_port),
                    source,
                }));
                return;
            }
        };
        debug!(address = %self.bind_address, port = self.local_port, "Ready");
        self.signal(Ok(()));

        let mut pending = Some(io);
        loop {
            let accepted = tokio::select! {
                biased;
                _ = self.stop.cancelled() => return,
                res = listener.accept() => res,
            };
            let (conn, peer) = match accepted {
                Ok(accepted) => accepted,
                Err(error) => {
                    debug!(%error, "Failed to accept connection");
                    continue;
                }
            };

            let io = match pending.take() {
                Some(io) => io,
                None => match self.upgrade().await {
                    Some(io) => io,
                    None => return,
                },
            };

            tokio::select! {
                biased;
                _ = self.stop.cancelled() => return,
                res = forward(conn, peer, io) => {
                    if let Err(error) = res {
                        debug!(%error, "Forwarded connection failed");
                    }
                }
            }
        }
    }

    /// Opens a stream to the pod, retrying transport failures until the tunnel
    /// is closed.
    async fn upgrade(&self) -> Option<BoxedIo> {
        loop {
            let upgraded = tokio::select! {
                biased;
                _ = self.stop.cancelled() => return None,
                res = self.client.upgrade(&self.namespace, &self.pod, self.pod_port) => res,
            };
            match upgraded {
                Ok(io) => return Some(io),
                Err(error) => {
                    let error = Error::Transport(error);
                    info!(%error, "Port forward failed; retrying");
                    tokio::select! {
                        biased;
                        _ = self.stop.cancelled() => return None,
                        _ = time::sleep(self.retry_backoff) => {}
                    }
                }
            }
        }
    }

    async fn check_pod(&self) -> Result<(), Error> {
        let pod = self
            .client
            .fetch_pod(&self.namespace, &self.pod)
            .await
            .map_err(|source| Error::PodLookup {
                namespace: self.namespace.clone(),
                name: self.pod.clone(),
                source,
            })?;
        let phase = pod.status.and_then(|s| s.phase).unwrap_or_default();
        if phase != POD_RUNNING {
            return Err(Error::PodNotRunning {
                namespace: self.namespace.clone(),
                name: self.pod.clone(),
                phase,
            });
        }
        Ok(())
    }

    /// Resolves the caller's readiness wait at most once.
    fn signal(&mut self, res: Result<(), Error>) {
        if let Some(ready) = self.ready.take() {
            let _ = ready.send(res);
        }
    }
}

/// Carries a single local connection over the upgraded stream.
async fn forward(mut conn: TcpStream, peer: SocketAddr, mut io: BoxedIo) -> std::io::Result<()> {
    debug!(%peer, "Forwarding connection");
    let (sent, received) = tokio::io::copy_bidirectional(&mut conn, &mut io).await?;
    debug!(%peer, sent, received, "Connection closed");
    Ok(())
}
