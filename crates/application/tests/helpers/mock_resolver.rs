#![allow(dead_code)]
use async_trait::async_trait;
use ferrous_resolver_application::ports::DnsResolver;
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{DnsQuestion, DomainError, RecordType};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Key = (String, RecordType);

/// Resolver returning canned replies keyed by (name, type).
#[derive(Clone, Default)]
pub struct MockDnsResolver {
    responses: Arc<Mutex<HashMap<Key, Result<DnsResponse, DomainError>>>>,
    calls: Arc<Mutex<Vec<Key>>>,
}

impl MockDnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_response(&self, domain: &str, record_type: RecordType, response: DnsResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert((domain.to_lowercase(), record_type), Ok(response));
    }

    pub fn set_error(&self, domain: &str, record_type: RecordType, error: DomainError) {
        self.responses
            .lock()
            .unwrap()
            .insert((domain.to_lowercase(), record_type), Err(error));
    }

    pub fn calls(&self) -> Vec<Key> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve(&self, question: &DnsQuestion) -> Result<DnsResponse, DomainError> {
        let key = (question.name.to_lowercase(), question.record_type);
        self.calls.lock().unwrap().push(key.clone());

        self.responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| {
                Err(DomainError::exhausted(
                    format!("no canned response for {} {}", key.0, key.1),
                    None,
                ))
            })
    }
}
