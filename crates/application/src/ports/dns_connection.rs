use async_trait::async_trait;
use ferrous_resolver_domain::{DnsTransportProtocol, DomainError, NameServerAddress};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::Duration;

use super::NetProxy;
use crate::dns_response::DnsResponse;

/// One reusable connection to a single name server over a single protocol.
#[async_trait]
pub trait DnsConnection: Send + Sync {
    /// Sends `request` and waits up to `timeout` for the matching reply.
    ///
    /// `Ok(None)` means the exchange produced nothing usable but is not worth
    /// reporting, e.g. a reply the transport chose to ignore.
    async fn query(
        &self,
        request: &Message,
        timeout: Duration,
    ) -> Result<Option<DnsResponse>, DomainError>;

    fn server(&self) -> &NameServerAddress;

    fn protocol(&self) -> DnsTransportProtocol;
}

/// Hands out pooled connections keyed by protocol and server.
pub trait ConnectionFactory: Send + Sync {
    fn get_connection(
        &self,
        protocol: DnsTransportProtocol,
        server: &NameServerAddress,
        proxy: Option<Arc<dyn NetProxy>>,
    ) -> Result<Arc<dyn DnsConnection>, DomainError>;
}
