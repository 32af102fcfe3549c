//! Address lookup for name servers configured by host name.

use super::cname_chase::CnameChaser;
use super::config::ResolverContext;
use ferrous_resolver_application::ports::DnsCache;
use ferrous_resolver_application::services::{extract_ipv4, extract_ipv6};
use ferrous_resolver_domain::{DnsQuestion, DomainError, RecordType};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Finds an address for `host` with a walk from the root: AAAA first when
/// IPv6 is preferred, then A. The first address found is used.
///
/// The dispatcher reaches this from its workers while the recursive engine
/// itself dispatches queries, so the future is boxed to keep the types finite.
pub fn resolve_server_ip(
    context: ResolverContext,
    host: String,
    cache: Arc<dyn DnsCache>,
) -> BoxFuture<'static, Result<IpAddr, DomainError>> {
    async move {
        let prefer_ipv6 = context.options.prefer_ipv6;
        let chaser = CnameChaser::new(context);

        if prefer_ipv6 {
            let question = DnsQuestion::new(&host, RecordType::AAAA);
            let response = chaser.query(&question, cache.as_ref()).await?;
            if let Some(ip) = extract_ipv6(&response)?.first() {
                debug!(host = %host, ip = %ip, "Resolved name server");
                return Ok(IpAddr::V6(*ip));
            }
        }

        let question = DnsQuestion::new(&host, RecordType::A);
        let response = chaser.query(&question, cache.as_ref()).await?;
        let ip = extract_ipv4(&response)?
            .first()
            .map(|ip| IpAddr::V4(*ip))
            .ok_or_else(|| {
                DomainError::exhausted(format!("no address found for name server {}", host), None)
            })?;
        debug!(host = %host, ip = %ip, "Resolved name server");
        Ok(ip)
    }
    .boxed()
}
