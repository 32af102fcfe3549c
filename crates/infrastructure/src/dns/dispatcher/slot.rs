use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::DomainError;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Write-once result cell shared by the workers of one dispatch.
///
/// The first successful worker stores its response and fires the completion
/// signal; later writes are refused. Failures only update `last_error`.
#[derive(Debug, Default)]
pub struct ResultSlot {
    response: OnceLock<DnsResponse>,
    done: CancellationToken,
    last_error: Mutex<Option<DomainError>>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `response` if nothing was stored yet. Returns whether this
    /// call won.
    pub fn try_set(&self, response: DnsResponse) -> bool {
        let won = self.response.set(response).is_ok();
        if won {
            self.done.cancel();
        }
        won
    }

    pub fn is_signalled(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Fires the signal without a response so stragglers stop.
    pub fn close(&self) {
        self.done.cancel();
    }

    pub fn record_error(&self, error: DomainError) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    pub fn last_error(&self) -> Option<DomainError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn response(&self) -> Option<&DnsResponse> {
        self.response.get()
    }

    /// Resolves once a response was stored or the slot was closed.
    pub async fn signalled(&self) {
        self.done.cancelled().await
    }

    /// Waits for the signal for at most `timeout`; true if it fired.
    pub async fn wait(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.signalled()).await.is_ok()
    }
}
