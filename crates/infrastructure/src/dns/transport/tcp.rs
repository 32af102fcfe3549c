use super::{DnsTransport, TransportResponse};
use bytes::Bytes;
use async_trait::async_trait;
use dashmap::DashMap;
use ferrous_resolver_application::ports::NetProxy;
use ferrous_resolver_domain::{
    DnsTransportProtocol, DomainError, NameServerAddress, TransportErrorKind,
};
use std::io;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;
const MAX_IDLE_TCP_PER_HOST: usize = 2;

type TcpConnectionPool = DashMap<String, Vec<TcpStream>>;

static TCP_POOL: LazyLock<TcpConnectionPool> = LazyLock::new(TcpConnectionPool::new);

pub struct TcpTransport {
    server: NameServerAddress,
    proxy: Option<Arc<dyn NetProxy>>,
}

impl TcpTransport {
    pub fn new(server: NameServerAddress, proxy: Option<Arc<dyn NetProxy>>) -> Self {
        Self { server, proxy }
    }

    fn pool_key(&self) -> String {
        match self.proxy {
            Some(_) => format!("proxy:{}", self.server),
            None => self.server.to_string(),
        }
    }

    fn take_pooled(&self) -> Option<TcpStream> {
        TCP_POOL.get_mut(&self.pool_key())?.pop()
    }

    fn return_to_pool(&self, stream: TcpStream) {
        let key = self.pool_key();
        let mut entry = TCP_POOL.entry(key).or_default();
        if entry.len() < MAX_IDLE_TCP_PER_HOST {
            entry.push(stream);
        }
    }

    async fn connect_new(&self, timeout: Duration) -> Result<TcpStream, DomainError> {
        connect_stream(&self.server, self.proxy.as_ref(), timeout).await
    }

    async fn exchange(
        &self,
        stream: &mut TcpStream,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        tokio::time::timeout(timeout, send_with_length_prefix(stream, message_bytes))
            .await
            .map_err(|_| DomainError::timeout(&self.server, "timeout sending TCP query"))?
            .map_err(|e| classify_send_error(&self.server, &e))?;

        tokio::time::timeout(timeout, read_with_length_prefix(stream))
            .await
            .map_err(|_| DomainError::timeout(&self.server, "timeout waiting for TCP response"))?
            .map_err(|e| DomainError::transport(&self.server, &e))
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        if let Some(mut stream) = self.take_pooled() {
            match self.exchange(&mut stream, message_bytes, timeout).await {
                Ok(response_bytes) => {
                    debug!(server = %self.server, "TCP query via pooled connection");
                    self.return_to_pool(stream);
                    return Ok(TransportResponse {
                        bytes: Bytes::from(response_bytes),
                        protocol_used: DnsTransportProtocol::Tcp,
                    });
                }
                Err(_) => {
                    debug!(server = %self.server, "Pooled TCP connection stale, reconnecting");
                }
            }
        }

        let mut stream = self.connect_new(timeout).await?;
        let response_bytes = self.exchange(&mut stream, message_bytes, timeout).await?;

        debug!(
            server = %self.server,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        self.return_to_pool(stream);

        Ok(TransportResponse {
            bytes: Bytes::from(response_bytes),
            protocol_used: DnsTransportProtocol::Tcp,
        })
    }

    fn protocol(&self) -> DnsTransportProtocol {
        DnsTransportProtocol::Tcp
    }
}

/// Opens a TCP stream to `server`, through `proxy` unless the proxy bypasses it.
///
/// A proxied server may still be stale; the proxy resolves its host name.
pub(crate) async fn connect_stream(
    server: &NameServerAddress,
    proxy: Option<&Arc<dyn NetProxy>>,
    timeout: Duration,
) -> Result<TcpStream, DomainError> {
    if let Some(proxy) = proxy.filter(|p| !p.is_bypassed(server)) {
        debug!(server = %server, "Connecting through proxy");
        let stream = proxy
            .connect_tcp(&server.server_name(), server.port(), timeout)
            .await?;
        let _ = stream.set_nodelay(true);
        return Ok(stream);
    }

    let server_addr = server.endpoint().ok_or_else(|| {
        DomainError::InvalidNameServer(format!("{} has no resolved address", server))
    })?;

    let stream = tokio::time::timeout(timeout, TcpStream::connect(server_addr))
        .await
        .map_err(|_| DomainError::timeout(server, "timeout connecting"))?
        .map_err(|e| DomainError::transport(server, &e))?;

    stream
        .set_nodelay(true)
        .map_err(|e| DomainError::transport(server, &e))?;

    Ok(stream)
}

pub(crate) async fn send_with_length_prefix<S>(stream: &mut S, message_bytes: &[u8]) -> io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "DNS message exceeds 65535 bytes")
    })?;

    stream.write_all(&length.to_be_bytes()).await?;
    stream.write_all(message_bytes).await?;
    stream.flush().await
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    if response_len == 0 || response_len > MAX_TCP_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid response length: {} bytes", response_len),
        ));
    }

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await?;
    Ok(response)
}

/// Maps an oversized message to the non-retryable transport class.
pub(crate) fn classify_send_error(server: &NameServerAddress, error: &io::Error) -> DomainError {
    if error.kind() == io::ErrorKind::InvalidInput {
        DomainError::Transport {
            server: server.to_string(),
            kind: TransportErrorKind::MessageTooLarge,
            message: error.to_string(),
        }
    } else {
        DomainError::transport(server, error)
    }
}
