use ferrous_resolver_application::ports::{ConnectionFactory, NetProxy, RandomSource};
use ferrous_resolver_domain::config::ResolverConfig;
use std::sync::Arc;
use std::time::Duration;

/// Per-query tuning shared by the dispatcher and the recursive engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    pub prefer_ipv6: bool,

    /// Attempts per server before moving on.
    pub retries: u32,

    /// Time allowed for a single attempt.
    pub timeout: Duration,

    /// Upper bound on concurrent workers in one dispatch.
    pub threads: usize,

    pub max_stack_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            prefer_ipv6: false,
            retries: 2,
            timeout: Duration::from_millis(2000),
            threads: 2,
            max_stack_depth: 10,
        }
    }
}

impl ResolverOptions {
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            prefer_ipv6: config.prefer_ipv6,
            retries: config.retries.max(1),
            timeout: Duration::from_millis(config.timeout_ms),
            threads: config.threads.max(1),
            max_stack_depth: config.max_stack_depth,
        }
    }

    pub fn with_prefer_ipv6(mut self, prefer_ipv6: bool) -> Self {
        self.prefer_ipv6 = prefer_ipv6;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_max_stack_depth(mut self, max_stack_depth: usize) -> Self {
        self.max_stack_depth = max_stack_depth;
        self
    }

    /// How long a caller waits for the first successful worker.
    pub fn dispatch_wait(&self) -> Duration {
        self.timeout * self.retries
    }
}

/// Collaborators and options threaded through one resolution.
#[derive(Clone)]
pub struct ResolverContext {
    pub connections: Arc<dyn ConnectionFactory>,
    pub random: Arc<dyn RandomSource>,
    pub proxy: Option<Arc<dyn NetProxy>>,
    pub options: ResolverOptions,
}

impl ResolverContext {
    pub fn new(connections: Arc<dyn ConnectionFactory>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            connections,
            random,
            proxy: None,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_proxy(mut self, proxy: Option<Arc<dyn NetProxy>>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Same collaborators without the proxy, used to bootstrap stale servers.
    pub fn without_proxy(&self) -> Self {
        Self {
            proxy: None,
            ..self.clone()
        }
    }
}
