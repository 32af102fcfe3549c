use crate::ports::DnsResolver;
use crate::services::{extract_ipv4, extract_ipv6};
use ferrous_resolver_domain::{validate_domain_name, DnsQuestion, DomainError, RecordType};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

pub struct ResolveIpUseCase {
    resolver: Arc<dyn DnsResolver>,
}

impl ResolveIpUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }

    /// AAAA first when `prefer_ipv6` is set, falling back to A when that
    /// yields nothing. An IP literal resolves to itself.
    pub async fn execute(&self, domain: &str, prefer_ipv6: bool) -> Result<Vec<IpAddr>, DomainError> {
        if let Ok(ip) = domain.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }
        validate_domain_name(domain)?;

        if prefer_ipv6 {
            let question = DnsQuestion::new(domain, RecordType::AAAA);
            let response = self.resolver.resolve(&question).await?;
            let addresses = extract_ipv6(&response)?;
            if !addresses.is_empty() {
                return Ok(addresses.into_iter().map(IpAddr::V6).collect());
            }
            debug!(domain = %domain, "No AAAA records, falling back to A");
        }

        let question = DnsQuestion::new(domain, RecordType::A);
        let response = self.resolver.resolve(&question).await?;
        Ok(extract_ipv4(&response)?
            .into_iter()
            .map(IpAddr::V4)
            .collect())
    }
}
