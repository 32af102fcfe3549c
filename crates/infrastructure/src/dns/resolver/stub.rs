use super::config::{ResolverContext, ResolverOptions};
use crate::dns::dispatcher::ParallelDispatcher;
use crate::dns::forwarding::MessageBuilder;
use crate::dns::random::FastRandom;
use crate::dns::transport::connection::PooledConnectionFactory;
use crate::system::ResolvConfReader;
use async_trait::async_trait;
use ferrous_resolver_application::ports::{ConnectionFactory, DnsResolver, NetProxy, RandomSource};
use ferrous_resolver_application::services::reverse_domain;
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{
    validate_domain_name, DnsQuestion, DomainError, NameServerAddress, RecordType,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Forwards questions to a fixed set of recursive name servers.
pub struct StubResolver {
    servers: Vec<NameServerAddress>,
    context: ResolverContext,
}

impl StubResolver {
    pub fn new(
        servers: Vec<NameServerAddress>,
        connections: Arc<dyn ConnectionFactory>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, DomainError> {
        if servers.is_empty() {
            return Err(DomainError::InvalidNameServer(
                "at least one name server is required".to_string(),
            ));
        }
        Ok(Self {
            servers,
            context: ResolverContext::new(connections, random),
        })
    }

    /// Pooled network connections and `fastrand` ordering.
    pub fn with_servers(servers: Vec<NameServerAddress>) -> Result<Self, DomainError> {
        Self::new(
            servers,
            Arc::new(PooledConnectionFactory::new()),
            Arc::new(FastRandom),
        )
    }

    /// DNS-over-HTTPS endpoints such as `https://cloudflare-dns.com/dns-query`.
    pub fn from_urls(urls: &[&str]) -> Result<Self, DomainError> {
        let servers = urls
            .iter()
            .map(|url| NameServerAddress::from_url(url))
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_servers(servers)
    }

    /// Servers configured for the operating system resolver.
    pub async fn from_system(prefer_ipv6: bool) -> Result<Self, DomainError> {
        Self::from_resolv_conf(&ResolvConfReader::new(), prefer_ipv6).await
    }

    pub async fn from_resolv_conf(
        reader: &ResolvConfReader,
        prefer_ipv6: bool,
    ) -> Result<Self, DomainError> {
        let servers = reader.name_servers(prefer_ipv6).await?;
        Ok(Self::with_servers(servers)?.with_prefer_ipv6(prefer_ipv6))
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.context = self.context.with_options(options);
        self
    }

    pub fn with_proxy(mut self, proxy: Option<Arc<dyn NetProxy>>) -> Self {
        self.context = self.context.with_proxy(proxy);
        self
    }

    pub fn with_prefer_ipv6(mut self, prefer_ipv6: bool) -> Self {
        self.context.options = self.context.options.with_prefer_ipv6(prefer_ipv6);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.context.options = self.context.options.with_retries(retries);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.context.options = self.context.options.with_timeout(timeout);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.context.options = self.context.options.with_threads(threads);
        self
    }

    pub fn servers(&self) -> &[NameServerAddress] {
        &self.servers
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.context.options
    }

    /// Looks up `domain`. A PTR query for an IP literal asks for its
    /// reverse-mapping name instead.
    pub async fn resolve_name(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<DnsResponse, DomainError> {
        let name = match (record_type, domain.parse::<IpAddr>()) {
            (RecordType::PTR, Ok(ip)) => reverse_domain(&ip),
            _ => {
                validate_domain_name(domain)?;
                domain.to_string()
            }
        };
        self.resolve(&DnsQuestion::new(name, record_type)).await
    }
}

#[async_trait]
impl DnsResolver for StubResolver {
    async fn resolve(&self, question: &DnsQuestion) -> Result<DnsResponse, DomainError> {
        debug!(question = %question, servers = self.servers.len(), "Forwarding query");
        let request = MessageBuilder::build_query(question, true)?;
        ParallelDispatcher::new(self.context.clone())
            .dispatch(&request, &self.servers)
            .await
    }
}
