//! TLS client connections over rustls with the webpki root set.

use crate::transport::BoxedIoStream;
use ln_core::LanternError;
use ln_core::LanternResult;
use std::net::TcpStream;

#[cfg(feature = "tls-rustls")]
use rustls::ClientConfig;
#[cfg(feature = "tls-rustls")]
use rustls::ClientConnection;
#[cfg(feature = "tls-rustls")]
use rustls::RootCertStore;
#[cfg(feature = "tls-rustls")]
use rustls::StreamOwned;
#[cfg(feature = "tls-rustls")]
use rustls::pki_types::ServerName;
#[cfg(feature = "tls-rustls")]
use std::sync::Arc;

/// Performs the handshake for `server_name` and returns the encrypted stream.
#[cfg(feature = "tls-rustls")]
pub fn connect_tls(mut stream: TcpStream, server_name: &str) -> LanternResult<BoxedIoStream> {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|error| {
            LanternError::new(
                "net.tls.config_versions_invalid",
                format!("failed to configure TLS protocol versions: {error}"),
            )
        })?
        .with_root_certificates(root_store())
        .with_no_client_auth();

    let name = ServerName::try_from(server_name.to_owned()).map_err(|error| {
        LanternError::new(
            "net.tls.server_name_invalid",
            format!("invalid TLS server name `{server_name}`: {error}"),
        )
    })?;

    let mut connection = ClientConnection::new(Arc::new(config), name).map_err(|error| {
        LanternError::new(
            "net.tls.connection_init_failed",
            format!("failed to initialize TLS connection for `{server_name}`: {error}"),
        )
    })?;

    connection.complete_io(&mut stream).map_err(|error| {
        LanternError::new(
            "net.tls.handshake_failed",
            format!("TLS handshake failed for `{server_name}`: {error}"),
        )
    })?;

    Ok(Box::new(StreamOwned::new(connection, stream)))
}

#[cfg(feature = "tls-rustls")]
fn root_store() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    roots
}

#[cfg(not(feature = "tls-rustls"))]
pub fn connect_tls(_stream: TcpStream, server_name: &str) -> LanternResult<BoxedIoStream> {
    Err(LanternError::new(
        "net.tls.backend_unavailable",
        format!("cannot reach `{server_name}`: build without `ln-net/tls-rustls`"),
    ))
}
