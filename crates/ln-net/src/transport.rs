//! TCP connection setup: name resolution plus timed connects.

use ln_core::LanternError;
use ln_core::LanternResult;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::time::Duration;

/// Object-safe byte stream, plain or TLS.
pub trait IoStream: Read + Write {}
impl<T> IoStream for T where T: Read + Write {}

pub type BoxedIoStream = Box<dyn IoStream>;

/// Resolves `host` and connects to the first address that accepts.
pub fn connect(host: &str, port: u16, timeout: Duration) -> LanternResult<TcpStream> {
    let addresses = resolve(host, port)?;
    connect_first(&addresses, |address| connect_address(address, timeout))
}

/// Tries `addresses` in order and keeps the first successful connection.
fn connect_first<S>(
    addresses: &[SocketAddr],
    mut connect_one: impl FnMut(SocketAddr) -> LanternResult<S>,
) -> LanternResult<S> {
    let mut last_error = None;
    for address in addresses {
        match connect_one(*address) {
            Ok(stream) => return Ok(stream),
            Err(error) => {
                log::debug!("connect to {address} failed: {error}");
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        LanternError::new(
            "net.transport.no_addresses",
            "no addresses to connect to",
        )
    }))
}

fn resolve(host: &str, port: u16) -> LanternResult<Vec<SocketAddr>> {
    let query = format!("{host}:{port}");
    let addresses: Vec<SocketAddr> = query
        .to_socket_addrs()
        .map_err(|error| {
            LanternError::new(
                "net.dns.resolve_failed",
                format!("failed to resolve `{query}`: {error}"),
            )
        })?
        .collect();

    if addresses.is_empty() {
        return Err(LanternError::new(
            "net.dns.no_results",
            format!("resolver returned no addresses for `{query}`"),
        ));
    }
    Ok(addresses)
}

fn connect_address(address: SocketAddr, timeout: Duration) -> LanternResult<TcpStream> {
    let stream = TcpStream::connect_timeout(&address, timeout).map_err(|error| {
        LanternError::new(
            "net.transport.connect_failed",
            format!("failed to connect to `{address}`: {error}"),
        )
    })?;

    let configure = |result: std::io::Result<()>, what: &str| {
        result.map_err(|error| {
            LanternError::new(
                "net.transport.configure_failed",
                format!("failed to set {what} for `{address}`: {error}"),
            )
        })
    };
    configure(stream.set_nodelay(true), "TCP_NODELAY")?;
    configure(stream.set_read_timeout(Some(timeout)), "read timeout")?;
    configure(stream.set_write_timeout(Some(timeout)), "write timeout")?;

    Ok(stream)
}
