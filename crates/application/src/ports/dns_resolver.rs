use async_trait::async_trait;
use ferrous_resolver_domain::{DnsQuestion, DomainError};

use crate::dns_response::DnsResponse;

#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, question: &DnsQuestion) -> Result<DnsResponse, DomainError>;
}
