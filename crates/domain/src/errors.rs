use std::fmt;
use std::io;
use thiserror::Error;

/// Socket-level failure classes reported by transport connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    ConnectionReset,
    HostUnreachable,
    NetworkUnreachable,
    NetworkReset,
    MessageTooLarge,
    ConnectionRefused,
    TimedOut,
    Other,
}

impl TransportErrorKind {
    /// Only unclassified failures are worth another attempt against the same server.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportErrorKind::Other)
    }

    pub fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                TransportErrorKind::ConnectionReset
            }
            io::ErrorKind::ConnectionRefused => TransportErrorKind::ConnectionRefused,
            io::ErrorKind::TimedOut => TransportErrorKind::TimedOut,
            io::ErrorKind::HostUnreachable => TransportErrorKind::HostUnreachable,
            io::ErrorKind::NetworkUnreachable => TransportErrorKind::NetworkUnreachable,
            io::ErrorKind::NetworkDown => TransportErrorKind::NetworkReset,
            _ => TransportErrorKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::ConnectionReset => "connection reset",
            TransportErrorKind::HostUnreachable => "host unreachable",
            TransportErrorKind::NetworkUnreachable => "network unreachable",
            TransportErrorKind::NetworkReset => "network reset",
            TransportErrorKind::MessageTooLarge => "message too large",
            TransportErrorKind::ConnectionRefused => "connection refused",
            TransportErrorKind::TimedOut => "timed out",
            TransportErrorKind::Other => "transport failure",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn server_suffix(server: &Option<String>) -> String {
    match server {
        Some(server) => format!("; Name server: {}", server),
        None => String::new(),
    }
}

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid name server: {0}")]
    InvalidNameServer(String),

    #[error("Transport error talking to {server} ({kind}): {message}")]
    Transport {
        server: String,
        kind: TransportErrorKind,
        message: String,
    },

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Domain does not exist: {domain}{}", server_suffix(.server))]
    NameDoesNotExist {
        domain: String,
        server: Option<String>,
    },

    #[error("Name server returned error. DNS RCODE: {rcode} ({code}){}", server_suffix(.server))]
    ServerError {
        rcode: String,
        code: u16,
        server: Option<String>,
    },

    #[error("Recursive resolution exceeded the maximum stack depth of {max} for domain: {domain}")]
    StackDepthExceeded { domain: String, max: usize },

    #[error("Resolution failed: {reason}")]
    ResolutionExhausted {
        reason: String,
        #[source]
        source: Option<Box<DomainError>>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    pub fn transport(server: impl fmt::Display, error: &io::Error) -> Self {
        DomainError::Transport {
            server: server.to_string(),
            kind: TransportErrorKind::from_io(error),
            message: error.to_string(),
        }
    }

    pub fn timeout(server: impl fmt::Display, message: impl Into<String>) -> Self {
        DomainError::Transport {
            server: server.to_string(),
            kind: TransportErrorKind::TimedOut,
            message: message.into(),
        }
    }

    pub fn exhausted(reason: impl Into<String>, last_error: Option<DomainError>) -> Self {
        DomainError::ResolutionExhausted {
            reason: reason.into(),
            source: last_error.map(Box::new),
        }
    }

    pub fn is_name_error(&self) -> bool {
        matches!(self, DomainError::NameDoesNotExist { .. })
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, DomainError::Transport { .. })
    }

    /// Whether another attempt against the same server may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DomainError::Transport { kind, .. } => kind.is_retryable(),
            DomainError::ProtocolViolation(_) => false,
            _ => true,
        }
    }

    /// The innermost cause recorded by a `ResolutionExhausted` chain.
    pub fn root_cause(&self) -> &DomainError {
        match self {
            DomainError::ResolutionExhausted {
                source: Some(inner),
                ..
            } => inner.root_cause(),
            other => other,
        }
    }
}
