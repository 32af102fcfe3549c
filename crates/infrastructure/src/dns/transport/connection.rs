use super::{create_transport, Transport};
use crate::dns::forwarding::{MessageBuilder, ResponseParser};
use async_trait::async_trait;
use dashmap::DashMap;
use ferrous_resolver_application::ports::{ConnectionFactory, DnsConnection, NetProxy};
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{DnsTransportProtocol, DomainError, NameServerAddress};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A [`DnsConnection`] backed by one of the wire transports.
pub struct PooledConnection {
    server: NameServerAddress,
    transport: Transport,
}

impl PooledConnection {
    pub fn new(
        protocol: DnsTransportProtocol,
        server: NameServerAddress,
        proxy: Option<Arc<dyn NetProxy>>,
    ) -> Result<Self, DomainError> {
        let server = if server.protocol() == protocol {
            server
        } else {
            server.with_protocol(protocol)
        };
        let transport = create_transport(protocol, &server, proxy)?;
        Ok(Self { server, transport })
    }
}

#[async_trait]
impl DnsConnection for PooledConnection {
    async fn query(
        &self,
        request: &Message,
        timeout: Duration,
    ) -> Result<Option<DnsResponse>, DomainError> {
        let request_bytes = MessageBuilder::serialize_message(request)?;

        let started = Instant::now();
        let response = self.transport.send(&request_bytes, timeout).await?;
        let rtt = started.elapsed();

        let message = ResponseParser::parse_reply(request, &response.bytes)?;

        debug!(
            server = %self.server,
            protocol = %response.protocol_used,
            rtt_ms = rtt.as_millis() as u64,
            "Query answered"
        );

        Ok(Some(DnsResponse::new(message).with_metadata(
            self.server.clone(),
            response.protocol_used,
            rtt,
        )))
    }

    fn server(&self) -> &NameServerAddress {
        &self.server
    }

    fn protocol(&self) -> DnsTransportProtocol {
        self.transport.protocol()
    }
}

type ConnectionKey = (DnsTransportProtocol, NameServerAddress, bool);

/// Pooled connections kept before idle ones are dropped.
const DEFAULT_MAX_CONNECTIONS: usize = 1024;

/// Hands out one [`PooledConnection`] per (protocol, server) and keeps it for
/// reuse. Proxied and direct connections to the same server are kept apart.
///
/// Once `max_connections` entries are pooled, connections no caller holds are
/// evicted. If every pooled connection is still in use, the new one is handed
/// out without being pooled.
pub struct PooledConnectionFactory {
    connections: DashMap<ConnectionKey, Arc<PooledConnection>>,
    max_connections: usize,
}

impl Default for PooledConnectionFactory {
    fn default() -> Self {
        Self::with_max_connections(DEFAULT_MAX_CONNECTIONS)
    }
}

impl PooledConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_connections(max_connections: usize) -> Self {
        Self {
            connections: DashMap::new(),
            max_connections: max_connections.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    fn evict_idle(&self) {
        let before = self.len();
        self.connections
            .retain(|_, connection| Arc::strong_count(connection) > 1);
        debug!(before, after = self.len(), "Evicted idle pooled connections");
    }
}

impl ConnectionFactory for PooledConnectionFactory {
    fn get_connection(
        &self,
        protocol: DnsTransportProtocol,
        server: &NameServerAddress,
        proxy: Option<Arc<dyn NetProxy>>,
    ) -> Result<Arc<dyn DnsConnection>, DomainError> {
        let key = (protocol, server.clone(), proxy.is_some());
        if let Some(existing) = self.connections.get(&key) {
            return Ok(existing.clone());
        }

        let connection = Arc::new(PooledConnection::new(protocol, server.clone(), proxy)?);
        if self.len() >= self.max_connections {
            self.evict_idle();
            if self.len() >= self.max_connections {
                return Ok(connection);
            }
        }

        let connection = self.connections.entry(key).or_insert(connection).clone();
        Ok(connection)
    }
}
