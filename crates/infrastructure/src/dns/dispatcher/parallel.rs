use super::slot::ResultSlot;
use crate::dns::cache::InMemoryDnsCache;
use crate::dns::resolver::bootstrap::resolve_server_ip;
use crate::dns::resolver::config::ResolverContext;
use crate::dns::resolver::name_servers::shuffle_servers;
use ferrous_resolver_application::ports::DnsCache;
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{DnsTransportProtocol, DomainError, NameServerAddress};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use hickory_proto::op::Message;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Races a request across a list of name servers.
///
/// At most `threads` workers pull servers from a shared cursor, so every
/// server is tried by one worker only. The first non-truncated reply wins;
/// the other workers notice the signal before their next attempt and stop.
pub struct ParallelDispatcher {
    context: ResolverContext,
}

impl ParallelDispatcher {
    pub fn new(context: ResolverContext) -> Self {
        Self { context }
    }

    pub async fn dispatch(
        &self,
        request: &Message,
        servers: &[NameServerAddress],
    ) -> Result<DnsResponse, DomainError> {
        if servers.is_empty() {
            return Err(DomainError::InvalidNameServer(
                "no name servers to query".to_string(),
            ));
        }

        let options = self.context.options;
        let (servers, threads) = if servers.len() > options.threads {
            let mut copy = servers.to_vec();
            shuffle_servers(&mut copy, self.context.random.as_ref(), options.prefer_ipv6);
            (copy, options.threads)
        } else {
            (servers.to_vec(), servers.len())
        };

        let state = Arc::new(DispatchState::new(
            request.clone(),
            servers,
            self.context.clone(),
        ));

        if threads > 1 {
            debug!(workers = threads, servers = state.servers.len(), "Dispatching query in parallel");

            let mut workers: FuturesUnordered<_> = (0..threads)
                .map(|_| tokio::spawn(run_worker(Arc::clone(&state))))
                .collect();

            let all_done = async {
                while let Some(joined) = workers.next().await {
                    if let Err(e) = joined {
                        warn!(error = %e, "Dispatch worker panicked");
                    }
                }
            };

            tokio::select! {
                _ = state.slot.wait(options.dispatch_wait()) => {}
                _ = all_done => {}
            }
        } else {
            run_worker(Arc::clone(&state)).await;
        }

        state.slot.close();

        match state.slot.response() {
            Some(response) => Ok(response.clone()),
            None => Err(DomainError::exhausted(
                format!("no response from name servers [{}]", state.server_list()),
                state.slot.last_error(),
            )),
        }
    }
}

struct Cursor {
    next: usize,
    bootstrap_cache: Option<Arc<dyn DnsCache>>,
}

struct DispatchState {
    request: Message,
    servers: Vec<NameServerAddress>,
    context: ResolverContext,
    cursor: Mutex<Cursor>,
    slot: ResultSlot,
}

impl DispatchState {
    fn new(request: Message, servers: Vec<NameServerAddress>, context: ResolverContext) -> Self {
        Self {
            request,
            servers,
            context,
            cursor: Mutex::new(Cursor {
                next: 0,
                bootstrap_cache: None,
            }),
            slot: ResultSlot::new(),
        }
    }

    /// Claims the next untried server. Stale servers come with the cache
    /// shared by every bootstrap walk of this dispatch.
    fn claim_next(&self) -> Option<(NameServerAddress, Option<Arc<dyn DnsCache>>)> {
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let server = self.servers.get(cursor.next)?.clone();
        cursor.next += 1;

        let cache = if server.is_stale() && self.context.proxy.is_none() {
            let cache = cursor
                .bootstrap_cache
                .get_or_insert_with(|| Arc::new(InMemoryDnsCache::new()) as Arc<dyn DnsCache>);
            Some(Arc::clone(cache))
        } else {
            None
        };

        Some((server, cache))
    }

    fn server_list(&self) -> String {
        self.servers
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// UDP goes through TCP when the proxy cannot relay datagrams.
    fn effective_protocol(&self, server: &NameServerAddress) -> DnsTransportProtocol {
        let protocol = server.protocol();
        match &self.context.proxy {
            Some(proxy)
                if protocol == DnsTransportProtocol::Udp
                    && !proxy.is_bypassed(server)
                    && !proxy.is_udp_available() =>
            {
                DnsTransportProtocol::Tcp
            }
            _ => protocol,
        }
    }
}

async fn run_worker(state: Arc<DispatchState>) {
    let options = state.context.options;

    loop {
        if state.slot.is_signalled() {
            return;
        }
        let Some((mut server, bootstrap_cache)) = state.claim_next() else {
            return;
        };

        if let Some(cache) = bootstrap_cache {
            let host = server.host().to_string();
            match resolve_server_ip(state.context.without_proxy(), host, cache).await {
                Ok(ip) => server.set_ip(ip),
                Err(e) => {
                    debug!(server = %server, error = %e, "Failed to resolve name server address");
                    state.slot.record_error(e);
                    continue;
                }
            }
        }

        let mut protocol = state.effective_protocol(&server);

        'protocol: loop {
            let connection = match state.context.connections.get_connection(
                protocol,
                &server,
                state.context.proxy.clone(),
            ) {
                Ok(connection) => connection,
                Err(e) => {
                    state.slot.record_error(e);
                    break 'protocol;
                }
            };

            let mut attempt = 0;
            while attempt < options.retries {
                attempt += 1;
                if state.slot.is_signalled() {
                    return;
                }

                let mut request = state.request.clone();
                request.metadata.id = state.context.random.query_id();
                debug!(server = %server, protocol = %protocol, attempt, "Querying name server");

                match connection.query(&request, options.timeout).await {
                    Ok(Some(response)) if response.is_truncated() => {
                        if protocol == DnsTransportProtocol::Udp {
                            debug!(server = %server, "Truncated reply, switching to TCP");
                            protocol = DnsTransportProtocol::Tcp;
                            continue 'protocol;
                        }
                    }
                    Ok(Some(response)) => {
                        if state.slot.try_set(response) {
                            debug!(server = %server, protocol = %protocol, attempt, "Name server answered first");
                        }
                        return;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        let retryable = e.is_retryable();
                        state.slot.record_error(e);
                        if !retryable {
                            warn!(server = %server, protocol = %protocol, attempt, "Giving up on name server");
                            break;
                        }
                    }
                }
            }
            break 'protocol;
        }
    }
}
