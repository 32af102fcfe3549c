use async_trait::async_trait;
use ferrous_resolver_domain::{DomainError, NameServerAddress};
use std::time::Duration;
use tokio::net::TcpStream;

/// Outbound proxy or tunnel that stream transports dial through.
#[async_trait]
pub trait NetProxy: Send + Sync {
    /// Servers reached directly instead of through the proxy.
    fn is_bypassed(&self, server: &NameServerAddress) -> bool;

    /// Whether the proxy can relay UDP datagrams.
    fn is_udp_available(&self) -> bool;

    async fn connect_tcp(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<TcpStream, DomainError>;
}
