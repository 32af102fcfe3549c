//! HTTPS Transport for DNS queries (DNS-over-HTTPS, RFC 8484)
//!
//! Sends DNS queries as HTTP POST requests with `application/dns-message`
//! content type. The request body is the raw DNS wire format message, and the
//! response body contains the raw DNS wire format response.
//!
//! ```text
//! POST /dns-query HTTP/2
//! Content-Type: application/dns-message
//! Accept: application/dns-message
//!
//! <raw DNS message bytes>
//! ```

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use ferrous_resolver_domain::{DnsTransportProtocol, DomainError, TransportErrorKind};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Shared HTTP/2 client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .http2_prior_knowledge()
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Expected content type for DNS-over-HTTPS responses (RFC 8484 §4.2.1)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// DNS-over-HTTPS transport (RFC 8484)
pub struct HttpsTransport {
    url: String,
}

impl HttpsTransport {
    pub fn new(url: String) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_error(&self, error: reqwest::Error) -> DomainError {
        let kind = if error.is_timeout() {
            TransportErrorKind::TimedOut
        } else if error.is_connect() {
            TransportErrorKind::ConnectionRefused
        } else {
            TransportErrorKind::Other
        };
        DomainError::Transport {
            server: self.url.clone(),
            kind,
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        debug!(
            url = %self.url,
            message_len = message_bytes.len(),
            "Sending DoH query"
        );

        let response = tokio::time::timeout(
            timeout,
            SHARED_CLIENT
                .post(&self.url)
                .header("Content-Type", DNS_MESSAGE_CONTENT_TYPE)
                .header("Accept", DNS_MESSAGE_CONTENT_TYPE)
                .body(message_bytes.to_vec())
                .send(),
        )
        .await
        .map_err(|_| DomainError::timeout(&self.url, "timeout sending DoH query"))?
        .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Transport {
                server: self.url.clone(),
                kind: TransportErrorKind::Other,
                message: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let response_bytes = tokio::time::timeout(timeout, response.bytes())
            .await
            .map_err(|_| DomainError::timeout(&self.url, "timeout reading DoH response"))?
            .map_err(|e| self.request_error(e))?;

        debug!(
            url = %self.url,
            response_len = response_bytes.len(),
            "DoH response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: DnsTransportProtocol::Https,
        })
    }

    fn protocol(&self) -> DnsTransportProtocol {
        DnsTransportProtocol::Https
    }
}
