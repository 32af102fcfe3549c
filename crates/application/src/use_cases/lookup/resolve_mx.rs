use super::ResolveIpUseCase;
use crate::dns_response::owner_name;
use crate::ports::DnsResolver;
use crate::services::extract_mx;
use ferrous_resolver_domain::{
    names_equal, validate_domain_name, DnsQuestion, DomainError, RecordType,
};
use hickory_proto::rr::RData;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ResolveMxUseCase {
    resolver: Arc<dyn DnsResolver>,
    resolve_ip: ResolveIpUseCase,
}

impl ResolveMxUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self {
            resolve_ip: ResolveIpUseCase::new(Arc::clone(&resolver)),
            resolver,
        }
    }

    /// Mail exchangers for `domain`, best preference first.
    ///
    /// With `resolve_ip` the exchangers are replaced by their addresses: glue
    /// from the additional section when present, otherwise a fresh lookup.
    /// Exchangers that do not exist are dropped; exchangers that fail to
    /// resolve for any other reason are kept as host names.
    pub async fn execute(
        &self,
        domain: &str,
        resolve_ip: bool,
        prefer_ipv6: bool,
    ) -> Result<Vec<String>, DomainError> {
        if domain.parse::<IpAddr>().is_ok() {
            return Ok(vec![domain.to_string()]);
        }
        validate_domain_name(domain)?;

        let question = DnsQuestion::new(domain, RecordType::MX);
        let response = self.resolver.resolve(&question).await?;
        let exchanges = extract_mx(&response)?;

        if !resolve_ip {
            return Ok(exchanges);
        }

        let mut addresses = Vec::new();
        for exchange in &exchanges {
            let glue: Vec<String> = response
                .additionals()
                .iter()
                .filter(|record| names_equal(&owner_name(record), exchange))
                .filter_map(|record| match &record.data {
                    RData::A(a) if !prefer_ipv6 => Some(a.0.to_string()),
                    RData::AAAA(aaaa) if prefer_ipv6 => Some(aaaa.0.to_string()),
                    _ => None,
                })
                .collect();

            if !glue.is_empty() {
                debug!(exchange = %exchange, count = glue.len(), "Using MX glue records");
                addresses.extend(glue);
                continue;
            }

            match self.resolve_ip.execute(exchange, prefer_ipv6).await {
                Ok(ips) => addresses.extend(ips.into_iter().map(|ip| ip.to_string())),
                Err(e) if e.is_name_error() => {
                    debug!(exchange = %exchange, "MX exchange does not exist");
                }
                Err(e) => {
                    warn!(exchange = %exchange, error = %e, "Failed to resolve MX exchange");
                    addresses.push(exchange.clone());
                }
            }
        }

        Ok(addresses)
    }
}
