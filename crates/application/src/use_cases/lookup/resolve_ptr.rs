use crate::ports::DnsResolver;
use crate::services::{extract_ptr, reverse_domain};
use ferrous_resolver_domain::{DnsQuestion, DomainError, RecordType};
use std::net::IpAddr;
use std::sync::Arc;

pub struct ResolvePtrUseCase {
    resolver: Arc<dyn DnsResolver>,
}

impl ResolvePtrUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }

    pub async fn execute(&self, ip: IpAddr) -> Result<Option<String>, DomainError> {
        let question = DnsQuestion::new(reverse_domain(&ip), RecordType::PTR);
        let response = self.resolver.resolve(&question).await?;
        extract_ptr(&response)
    }
}
