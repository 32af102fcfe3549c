//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). Each query binds its own ephemeral
//! socket, so a late reply to an earlier query can never be mistaken for the
//! current one. Datagrams carrying another identifier are dropped and the
//! socket keeps listening until the deadline.

use super::{DnsTransport, TransportResponse};
use bytes::Bytes;
use crate::dns::forwarding::ResponseParser;
use async_trait::async_trait;
use ferrous_resolver_domain::{DnsTransportProtocol, DomainError, TransportErrorKind};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// Largest query we are willing to put in a single datagram.
const MAX_UDP_QUERY_SIZE: usize = 512;

/// DNS over UDP transport
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        if message_bytes.len() > MAX_UDP_QUERY_SIZE {
            return Err(DomainError::Transport {
                server: self.server_addr.to_string(),
                kind: TransportErrorKind::MessageTooLarge,
                message: format!("{} byte query does not fit a datagram", message_bytes.len()),
            });
        }

        let request_id = ResponseParser::peek_id(message_bytes);
        let deadline = Instant::now() + timeout;

        let socket = UdpSocket::bind(self.bind_addr())
            .await
            .map_err(|e| DomainError::transport(self.server_addr, &e))?;

        let bytes_sent = tokio::time::timeout_at(deadline, socket.send_to(message_bytes, self.server_addr))
            .await
            .map_err(|_| DomainError::timeout(self.server_addr, "timeout sending UDP query"))?
            .map_err(|e| DomainError::transport(self.server_addr, &e))?;

        debug!(
            server = %self.server_addr,
            bytes_sent = bytes_sent,
            "UDP query sent"
        );

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        loop {
            let (bytes_received, from_addr) =
                tokio::time::timeout_at(deadline, socket.recv_from(&mut recv_buf))
                    .await
                    .map_err(|_| {
                        DomainError::timeout(self.server_addr, "timeout waiting for UDP response")
                    })?
                    .map_err(|e| DomainError::transport(self.server_addr, &e))?;

            if from_addr.ip() != self.server_addr.ip() {
                warn!(
                    expected = %self.server_addr,
                    received_from = %from_addr,
                    "UDP response from unexpected source"
                );
                continue;
            }

            let received = &recv_buf[..bytes_received];
            if ResponseParser::peek_id(received) != request_id {
                debug!(
                    server = %self.server_addr,
                    "Discarding UDP datagram with mismatched identifier"
                );
                continue;
            }

            debug!(
                server = %self.server_addr,
                bytes_received = bytes_received,
                "UDP response received"
            );

            return Ok(TransportResponse {
                bytes: Bytes::copy_from_slice(received),
                protocol_used: DnsTransportProtocol::Udp,
            });
        }
    }

    fn protocol(&self) -> DnsTransportProtocol {
        DnsTransportProtocol::Udp
    }
}
