use crate::Error;
use bytes::Bytes;
use http::{header, Method, Request};
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Issues a single plain HTTP/1.1 request to `address` and reads the whole
/// response body.
///
/// The request asks the server to close the connection once it has
/// responded, so the tunnel carrying it is released promptly.
pub(crate) async fn send(address: &str, method: Method, path: &str) -> Result<Bytes, Error> {
    let path = format!("/{}", path.trim_start_matches('/'));
    let req = Request::builder()
        .method(method)
        .uri(path.as_str())
        .header(header::HOST, address)
        .header(header::CONNECTION, "close")
        .body(Empty::<Bytes>::new())?;

    let io = TcpStream::connect(address)
        .await
        .map_err(|source| Error::Connect {
            address: address.to_string(),
            source,
        })?;
    let (mut tx, conn) = hyper::client::conn::http1::handshake(TokioIo::new(io)).await?;
    tokio::spawn(async move {
        if let Err(error) = conn.await {
            debug!(%error, "Connection closed with an error");
        }
    });

    let rsp = tx.send_request(req).await?;
    let status = rsp.status();
    let body = rsp.into_body().collect().await?.to_bytes();
    if !status.is_success() {
        warn!(%status, %path, "Unexpected response status");
    }
    debug!(%status, %path, bytes = body.len(), "Received response");
    Ok(body)
}
