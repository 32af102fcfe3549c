pub mod connection;
pub mod https;
pub mod tcp;
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use ferrous_resolver_application::ports::NetProxy;
use ferrous_resolver_domain::{DnsTransportProtocol, DomainError, NameServerAddress};
use std::sync::Arc;
use std::time::Duration;

pub use connection::{PooledConnection, PooledConnectionFactory};

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Bytes,

    pub protocol_used: DnsTransportProtocol,
}

/// Moves raw DNS messages to one server and back.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol(&self) -> DnsTransportProtocol;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    #[cfg(feature = "dns-over-rustls")]
    Tls(tls::TlsTransport),
    #[cfg(feature = "dns-over-https")]
    Https(https::HttpsTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(t) => DnsTransport::send(t, message_bytes, timeout).await,
            #[cfg(feature = "dns-over-https")]
            Self::Https(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol(&self) -> DnsTransportProtocol {
        match self {
            Self::Udp(t) => t.protocol(),
            Self::Tcp(t) => t.protocol(),
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(t) => t.protocol(),
            #[cfg(feature = "dns-over-https")]
            Self::Https(t) => t.protocol(),
        }
    }
}

/// Builds the transport for `server` over `protocol`.
///
/// UDP always goes direct and therefore needs a resolved endpoint; stream
/// transports may dial through `proxy`.
pub fn create_transport(
    protocol: DnsTransportProtocol,
    server: &NameServerAddress,
    proxy: Option<Arc<dyn NetProxy>>,
) -> Result<Transport, DomainError> {
    match protocol {
        DnsTransportProtocol::Udp => {
            let addr = server.endpoint().ok_or_else(|| {
                DomainError::InvalidNameServer(format!("{} has no resolved address", server))
            })?;
            Ok(Transport::Udp(udp::UdpTransport::new(addr)))
        }
        DnsTransportProtocol::Tcp => Ok(Transport::Tcp(tcp::TcpTransport::new(server.clone(), proxy))),

        #[cfg(feature = "dns-over-rustls")]
        DnsTransportProtocol::Tls => Ok(Transport::Tls(tls::TlsTransport::new(server.clone(), proxy))),

        #[cfg(not(feature = "dns-over-rustls"))]
        DnsTransportProtocol::Tls => {
            tracing::warn!("TLS feature not enabled, falling back to TCP for {}", server);
            Ok(Transport::Tcp(tcp::TcpTransport::new(server.clone(), proxy)))
        }

        #[cfg(feature = "dns-over-https")]
        DnsTransportProtocol::Https => {
            let url = match server.url() {
                Some(url) => url.to_string(),
                None => format!("https://{}:{}/dns-query", server.server_name(), server.port()),
            };
            Ok(Transport::Https(https::HttpsTransport::new(url)))
        }

        #[cfg(not(feature = "dns-over-https"))]
        DnsTransportProtocol::Https => Err(DomainError::InvalidNameServer(format!(
            "HTTPS feature not enabled. Enable 'dns-over-https' feature to use: {}",
            server
        ))),
    }
}
