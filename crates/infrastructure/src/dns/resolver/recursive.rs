use super::cname_chase::CnameChaser;
use super::config::{ResolverContext, ResolverOptions};
use crate::dns::cache::InMemoryDnsCache;
use crate::dns::random::FastRandom;
use crate::dns::transport::connection::PooledConnectionFactory;
use async_trait::async_trait;
use ferrous_resolver_application::ports::{DnsCache, DnsResolver, NetProxy};
use ferrous_resolver_application::use_cases::ResolveIpUseCase;
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{DnsQuestion, DomainError};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Resolves questions itself, starting at the root servers.
pub struct RecursiveResolver {
    chaser: CnameChaser,
    cache: Arc<dyn DnsCache>,
    prefer_ipv6: bool,
}

impl RecursiveResolver {
    /// `context` carries the connections, randomness, proxy and options;
    /// answers are kept in a fresh in-memory cache.
    pub fn new(context: ResolverContext) -> Self {
        Self::with_cache(context, Arc::new(InMemoryDnsCache::new()))
    }

    pub fn with_cache(context: ResolverContext, cache: Arc<dyn DnsCache>) -> Self {
        let prefer_ipv6 = context.options.prefer_ipv6;
        Self {
            chaser: CnameChaser::new(context),
            cache,
            prefer_ipv6,
        }
    }

    /// Pooled network connections and `fastrand` ordering.
    pub fn with_options(options: ResolverOptions, proxy: Option<Arc<dyn NetProxy>>) -> Self {
        let context = ResolverContext::new(
            Arc::new(PooledConnectionFactory::new()),
            Arc::new(FastRandom),
        )
        .with_options(options)
        .with_proxy(proxy);
        Self::new(context)
    }

    pub fn cache(&self) -> &Arc<dyn DnsCache> {
        &self.cache
    }

    /// Addresses of `domain`: AAAA first when IPv6 is preferred, then A.
    pub async fn resolve_ip(self: Arc<Self>, domain: &str) -> Result<Vec<IpAddr>, DomainError> {
        let prefer_ipv6 = self.prefer_ipv6;
        ResolveIpUseCase::new(self).execute(domain, prefer_ipv6).await
    }
}

#[async_trait]
impl DnsResolver for RecursiveResolver {
    async fn resolve(&self, question: &DnsQuestion) -> Result<DnsResponse, DomainError> {
        debug!(question = %question, "Resolving recursively");
        self.chaser.query(question, self.cache.as_ref()).await
    }
}
