use crate::ports::DnsResolver;
use crate::services::extract_txt;
use ferrous_resolver_domain::{validate_domain_name, DnsQuestion, DomainError, RecordType};
use std::sync::Arc;

pub struct ResolveTxtUseCase {
    resolver: Arc<dyn DnsResolver>,
}

impl ResolveTxtUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }

    pub async fn execute(&self, domain: &str) -> Result<Vec<String>, DomainError> {
        validate_domain_name(domain)?;
        let question = DnsQuestion::new(domain, RecordType::TXT);
        let response = self.resolver.resolve(&question).await?;
        extract_txt(&response)
    }
}
