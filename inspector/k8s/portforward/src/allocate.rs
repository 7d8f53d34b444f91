use crate::Error;
use std::net::TcpListener;

/// Picks an unused local port on `local_address`.
///
/// The port is reserved by binding a listener and released immediately, so
/// uniqueness across concurrent callers relies on the operating system's
/// ephemeral port assignment.
pub fn allocate(local_address: &str) -> Result<u16, Error> {
    let allocation = |source| Error::Allocation {
        address: local_address.to_string(),
        source,
    };
    let listener = TcpListener::bind((local_address, 0)).map_err(allocation)?;
    let port = listener.local_addr().map_err(allocation)?.port();
    tracing::trace!(%local_address, port, "Allocated local port");
    Ok(port)
}
