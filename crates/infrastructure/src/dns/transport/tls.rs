//! TLS Transport for DNS queries (DNS-over-TLS, RFC 7858)
//!
//! - Static shared `ClientConfig` (built once, reused across all queries)
//! - Idle TLS connections are cached per server and reused for subsequent
//!   queries, amortizing the handshake cost.

use super::tcp::{classify_send_error, connect_stream, read_with_length_prefix, send_with_length_prefix};
use super::{DnsTransport, TransportResponse};
use bytes::Bytes;
use async_trait::async_trait;
use dashmap::DashMap;
use ferrous_resolver_application::ports::NetProxy;
use ferrous_resolver_domain::{DnsTransportProtocol, DomainError, NameServerAddress};
use rustls::pki_types::ServerName;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

/// Maximum idle connections per server.
const MAX_IDLE_PER_HOST: usize = 2;

static SHARED_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    // Both aws-lc-rs and ring are linked, so rustls cannot pick a default.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
});

static TLS_POOL: LazyLock<DashMap<String, Vec<TlsStream<TcpStream>>>> = LazyLock::new(DashMap::new);

/// DNS-over-TLS transport (RFC 7858)
pub struct TlsTransport {
    server: NameServerAddress,
    proxy: Option<Arc<dyn NetProxy>>,
}

impl TlsTransport {
    pub fn new(server: NameServerAddress, proxy: Option<Arc<dyn NetProxy>>) -> Self {
        Self { server, proxy }
    }

    fn pool_key(&self) -> String {
        match self.proxy {
            Some(_) => format!("proxy:{}", self.server),
            None => self.server.to_string(),
        }
    }

    fn take_pooled(&self) -> Option<TlsStream<TcpStream>> {
        TLS_POOL.get_mut(&self.pool_key())?.pop()
    }

    fn return_to_pool(&self, stream: TlsStream<TcpStream>) {
        let mut entry = TLS_POOL.entry(self.pool_key()).or_default();
        if entry.len() < MAX_IDLE_PER_HOST {
            entry.push(stream);
        }
    }

    /// TCP connect (direct or proxied) followed by the TLS handshake.
    async fn connect_new(&self, timeout: Duration) -> Result<TlsStream<TcpStream>, DomainError> {
        let connector = tokio_rustls::TlsConnector::from(SHARED_TLS_CONFIG.clone());

        let hostname = self.server.server_name();
        let server_name = ServerName::try_from(hostname.clone()).map_err(|e| {
            DomainError::InvalidNameServer(format!("Invalid TLS hostname '{}': {}", hostname, e))
        })?;

        let tcp_stream = connect_stream(&self.server, self.proxy.as_ref(), timeout).await?;

        let tls_stream = tokio::time::timeout(timeout, connector.connect(server_name, tcp_stream))
            .await
            .map_err(|_| DomainError::timeout(&self.server, "timeout during TLS handshake"))?
            .map_err(|e| DomainError::transport(&self.server, &e))?;

        debug!(server = %self.server, hostname = %hostname, "TLS connection established");
        Ok(tls_stream)
    }

    async fn send_on_stream(
        &self,
        stream: &mut TlsStream<TcpStream>,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        tokio::time::timeout(timeout, send_with_length_prefix(stream, message_bytes))
            .await
            .map_err(|_| DomainError::timeout(&self.server, "timeout sending TLS query"))?
            .map_err(|e| classify_send_error(&self.server, &e))?;

        tokio::time::timeout(timeout, read_with_length_prefix(stream))
            .await
            .map_err(|_| DomainError::timeout(&self.server, "timeout waiting for TLS response"))?
            .map_err(|e| DomainError::transport(&self.server, &e))
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        if let Some(mut stream) = self.take_pooled() {
            match self.send_on_stream(&mut stream, message_bytes, timeout).await {
                Ok(response_bytes) => {
                    debug!(server = %self.server, "TLS query via pooled connection");
                    self.return_to_pool(stream);
                    return Ok(TransportResponse {
                        bytes: Bytes::from(response_bytes),
                        protocol_used: DnsTransportProtocol::Tls,
                    });
                }
                Err(_) => {
                    debug!(server = %self.server, "Pooled TLS connection stale, reconnecting");
                }
            }
        }

        let mut stream = self.connect_new(timeout).await?;
        let response_bytes = self.send_on_stream(&mut stream, message_bytes, timeout).await?;

        debug!(
            server = %self.server,
            response_len = response_bytes.len(),
            "TLS response received"
        );

        self.return_to_pool(stream);

        Ok(TransportResponse {
            bytes: Bytes::from(response_bytes),
            protocol_used: DnsTransportProtocol::Tls,
        })
    }

    fn protocol(&self) -> DnsTransportProtocol {
        DnsTransportProtocol::Tls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_tls_config() {
        let config = &*SHARED_TLS_CONFIG;
        assert!(!config.crypto_provider().cipher_suites.is_empty());
    }

    #[tokio::test]
    async fn test_closed_port_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let server: NameServerAddress = format!("tls://dns.example.test:{} (127.0.0.1)", port)
            .parse()
            .unwrap();
        let transport = TlsTransport::new(server, None);

        let result = transport.send(&[0u8; 12], Duration::from_millis(500)).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_tls_transport_protocol() {
        let server: NameServerAddress = "tls://dns.quad9.net (9.9.9.9)".parse().unwrap();
        let transport = TlsTransport::new(server, None);
        assert_eq!(transport.protocol(), DnsTransportProtocol::Tls);
        assert_eq!(transport.server.server_name(), "dns.quad9.net");
    }
}
