#![allow(dead_code)]
use async_trait::async_trait;
use ferrous_resolver_application::dns_response::name_to_string;
use ferrous_resolver_application::ports::{
    ConnectionFactory, DnsCache, DnsConnection, NetProxy, RandomSource,
};
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{
    DnsQuestion, DnsTransportProtocol, DomainError, NameServerAddress, TransportErrorKind,
};
use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::RecordType;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One query seen by [`MockConnectionFactory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentQuery {
    pub id: u16,
    pub server: IpAddr,
    pub name: String,
    pub record_type: RecordType,
    pub protocol: DnsTransportProtocol,
    pub recursion_desired: bool,
}

type Responder = Arc<dyn Fn(&SentQuery) -> Result<Message, DomainError> + Send + Sync>;

/// Scripted name servers keyed by IP address. Queries to an address with
/// no script fail with a refused connection.
#[derive(Default, Clone)]
pub struct MockConnectionFactory {
    responders: Arc<Mutex<HashMap<IpAddr, Responder>>>,
    sent: Arc<Mutex<Vec<SentQuery>>>,
}

impl MockConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve<F>(&self, ip: &str, responder: F)
    where
        F: Fn(&SentQuery) -> Result<Message, DomainError> + Send + Sync + 'static,
    {
        self.responders
            .lock()
            .unwrap()
            .insert(ip.parse().unwrap(), Arc::new(responder));
    }

    /// Same script for every address in `ips`.
    pub fn serve_all<F>(&self, ips: impl IntoIterator<Item = IpAddr>, responder: F)
    where
        F: Fn(&SentQuery) -> Result<Message, DomainError> + Send + Sync + 'static,
    {
        let responder: Responder = Arc::new(responder);
        let mut responders = self.responders.lock().unwrap();
        for ip in ips {
            responders.insert(ip, Arc::clone(&responder));
        }
    }

    pub fn sent(&self) -> Vec<SentQuery> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, ip: &str) -> Vec<SentQuery> {
        let ip: IpAddr = ip.parse().unwrap();
        self.sent().into_iter().filter(|q| q.server == ip).collect()
    }
}

impl ConnectionFactory for MockConnectionFactory {
    fn get_connection(
        &self,
        protocol: DnsTransportProtocol,
        server: &NameServerAddress,
        _proxy: Option<Arc<dyn NetProxy>>,
    ) -> Result<Arc<dyn DnsConnection>, DomainError> {
        Ok(Arc::new(MockConnection {
            factory: self.clone(),
            server: server.clone(),
            protocol,
        }))
    }
}

struct MockConnection {
    factory: MockConnectionFactory,
    server: NameServerAddress,
    protocol: DnsTransportProtocol,
}

#[async_trait]
impl DnsConnection for MockConnection {
    async fn query(
        &self,
        request: &Message,
        _timeout: Duration,
    ) -> Result<Option<DnsResponse>, DomainError> {
        let ip = self
            .server
            .endpoint()
            .map(|e| e.ip())
            .ok_or_else(|| DomainError::InvalidNameServer(self.server.to_string()))?;
        let query = request.queries.first().expect("request without question");
        let sent = SentQuery {
            id: request.metadata.id,
            server: ip,
            name: name_to_string(query.name()).to_lowercase(),
            record_type: query.query_type(),
            protocol: self.protocol,
            recursion_desired: request.metadata.recursion_desired,
        };
        self.factory.sent.lock().unwrap().push(sent.clone());

        let responder = self.factory.responders.lock().unwrap().get(&ip).cloned();
        let Some(responder) = responder else {
            return Err(DomainError::Transport {
                server: self.server.to_string(),
                kind: TransportErrorKind::ConnectionRefused,
                message: "no scripted server".to_string(),
            });
        };

        let mut message = responder(&sent)?;
        message.metadata.id = request.metadata.id;
        message.metadata.message_type = MessageType::Response;
        if message.queries.is_empty() {
            message.add_query(query.clone());
        }

        Ok(Some(DnsResponse::new(message).with_metadata(
            self.server.clone(),
            self.protocol,
            Duration::from_millis(1),
        )))
    }

    fn server(&self) -> &NameServerAddress {
        &self.server
    }

    fn protocol(&self) -> DnsTransportProtocol {
        self.protocol
    }
}

/// Cache that never answers and counts what it was asked to store.
#[derive(Default)]
pub struct MockDnsCache {
    stored: AtomicUsize,
    lookups: AtomicUsize,
    preset: Mutex<HashMap<(String, String), DnsResponse>>,
}

impl MockDnsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `response` for questions about `name` of `record_type`.
    pub fn preset(&self, name: &str, record_type: &str, response: DnsResponse) {
        self.preset
            .lock()
            .unwrap()
            .insert((name.to_lowercase(), record_type.to_string()), response);
    }

    pub fn stored(&self) -> usize {
        self.stored.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl DnsCache for MockDnsCache {
    fn query(&self, question: &DnsQuestion) -> Option<DnsResponse> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let key = (
            question.name.to_lowercase(),
            question.record_type.to_string(),
        );
        self.preset.lock().unwrap().get(&key).cloned()
    }

    fn cache_response(&self, _response: &DnsResponse) {
        self.stored.fetch_add(1, Ordering::SeqCst);
    }
}

/// Keeps server lists in order and hands out increasing query ids.
#[derive(Default)]
pub struct SequentialRandom {
    next_id: AtomicU16,
}

impl SequentialRandom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RandomSource for SequentialRandom {
    fn shuffle(&self, _servers: &mut [NameServerAddress]) {}

    fn query_id(&self) -> u16 {
        self.next_id.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }
}
