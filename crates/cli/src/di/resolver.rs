use ferrous_resolver_application::ports::DnsResolver;
use ferrous_resolver_domain::{Config, ResolutionMode};
use ferrous_resolver_infrastructure::dns::resolver::ResolverOptions;
use ferrous_resolver_infrastructure::dns::{RecursiveResolver, StubResolver};
use std::sync::Arc;
use tracing::{info, warn};

/// Front-end selected by `resolver.mode`.
pub async fn build_resolver(config: &Config) -> anyhow::Result<Arc<dyn DnsResolver>> {
    let options = ResolverOptions::from_config(&config.resolver);

    if let Some(proxy) = &config.resolver.proxy {
        warn!(proxy = %proxy, "No proxy transport is available, querying servers directly");
    }

    let resolver: Arc<dyn DnsResolver> = match config.resolver.mode {
        ResolutionMode::Stub => {
            let servers = config.name_servers()?;
            info!(servers = servers.len(), "Using configured name servers");
            Arc::new(StubResolver::with_servers(servers)?.with_options(options))
        }
        ResolutionMode::System => {
            let resolver = StubResolver::from_system(options.prefer_ipv6)
                .await?
                .with_options(options);
            info!(servers = resolver.servers().len(), "Using system name servers");
            Arc::new(resolver)
        }
        ResolutionMode::Recursive => {
            info!(max_stack_depth = options.max_stack_depth, "Resolving from the root servers");
            Arc::new(RecursiveResolver::with_options(options, None))
        }
    };

    Ok(resolver)
}
