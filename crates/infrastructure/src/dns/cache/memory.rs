//! In-memory answer cache.
//!
//! Stores every record set a live reply carries (answers, delegations and
//! glue) plus negative entries, and answers questions the way a server would:
//! exact records first (following cached CNAMEs), then negative entries, then
//! the closest enclosing delegation with whatever glue is known. Entries
//! expire lazily on read.

use super::key::{normalize, parent_zone, CacheKey};
use crate::dns::forwarding::{MessageBuilder, RecordTypeMapper};
use dashmap::DashMap;
use ferrous_resolver_application::dns_response::name_to_string;
use ferrous_resolver_application::ports::DnsCache;
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::DnsQuestion;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{RData, Record, RecordType};
use std::collections::HashMap;
use tokio::time::{Duration, Instant};
use tracing::debug;

const MAX_CNAME_CHAIN: usize = 16;

/// Upper bound on how long anything stays cached, in seconds.
const MAX_TTL: u32 = 604_800;

/// Entry count above which a store first sweeps out expired entries.
const DEFAULT_PURGE_THRESHOLD: usize = 4096;

#[derive(Debug, Clone)]
struct CachedRecordSet {
    records: Vec<Record>,
    expires_at: Instant,
}

impl CachedRecordSet {
    fn new(records: Vec<Record>, ttl: u32, now: Instant) -> Self {
        Self {
            records,
            expires_at: now + Duration::from_secs(u64::from(ttl.min(MAX_TTL))),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Records with their TTL counted down to what is left.
    fn live_records(&self, now: Instant) -> Vec<Record> {
        let remaining = self.expires_at.saturating_duration_since(now).as_secs() as u32;
        self.records
            .iter()
            .map(|r| Record::from_rdata(r.name.clone(), remaining, r.data.clone()))
            .collect()
    }
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Positive(CachedRecordSet),
    /// The name exists but has no records of this type; holds the SOA.
    NoData(CachedRecordSet),
}

impl CacheEntry {
    fn record_set(&self) -> &CachedRecordSet {
        match self {
            CacheEntry::Positive(set) | CacheEntry::NoData(set) => set,
        }
    }
}

pub struct InMemoryDnsCache {
    entries: DashMap<CacheKey, CacheEntry>,
    name_errors: DashMap<String, CachedRecordSet>,
    purge_threshold: usize,
}

impl Default for InMemoryDnsCache {
    fn default() -> Self {
        Self::with_purge_threshold(DEFAULT_PURGE_THRESHOLD)
    }
}

impl InMemoryDnsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_purge_threshold(purge_threshold: usize) -> Self {
        Self {
            entries: DashMap::new(),
            name_errors: DashMap::new(),
            purge_threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.name_errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.name_errors.clear();
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.record_set().is_expired(now));
        self.name_errors.retain(|_, set| !set.is_expired(now));
    }

    fn positive(&self, key: &CacheKey, now: Instant) -> Option<Vec<Record>> {
        let expired = {
            let entry = self.entries.get(key)?;
            match entry.value() {
                CacheEntry::Positive(set) if !set.is_expired(now) => {
                    return Some(set.live_records(now))
                }
                CacheEntry::Positive(_) => true,
                CacheEntry::NoData(_) => false,
            }
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn no_data(&self, key: &CacheKey, now: Instant) -> Option<Vec<Record>> {
        let expired = {
            let entry = self.entries.get(key)?;
            match entry.value() {
                CacheEntry::NoData(set) if !set.is_expired(now) => {
                    return Some(set.live_records(now))
                }
                CacheEntry::NoData(_) => true,
                CacheEntry::Positive(_) => false,
            }
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn name_error(&self, name: &str, now: Instant) -> Option<Vec<Record>> {
        let expired = {
            let set = self.name_errors.get(name)?;
            if !set.is_expired(now) {
                return Some(set.live_records(now));
            }
            true
        };
        if expired {
            self.name_errors.remove(name);
        }
        None
    }

    fn answer_chain(&self, name: &str, record_type: RecordType, now: Instant) -> Vec<Record> {
        let mut answers = Vec::new();
        let mut current = name.to_string();

        for _ in 0..MAX_CNAME_CHAIN {
            if let Some(records) = self.positive(&CacheKey::new(&current, record_type), now) {
                answers.extend(records);
                break;
            }
            if record_type == RecordType::CNAME {
                break;
            }

            let Some(cname) = self.positive(&CacheKey::new(&current, RecordType::CNAME), now)
            else {
                break;
            };
            let target = cname.iter().find_map(|r| match &r.data {
                RData::CNAME(target) => Some(normalize(&name_to_string(&target.0))),
                _ => None,
            });
            answers.extend(cname);

            match target {
                Some(target) => current = target,
                None => break,
            }
        }

        answers
    }

    /// NS records of the closest cached zone enclosing `name`, with glue.
    fn closest_delegation(&self, name: &str, now: Instant) -> Option<(Vec<Record>, Vec<Record>)> {
        let mut zone = Some(name);
        while let Some(current) = zone {
            if let Some(ns_records) = self.positive(&CacheKey::new(current, RecordType::NS), now) {
                let glue = ns_records
                    .iter()
                    .filter_map(|r| match &r.data {
                        RData::NS(ns) => Some(name_to_string(&ns.0)),
                        _ => None,
                    })
                    .flat_map(|host| {
                        [RecordType::A, RecordType::AAAA]
                            .into_iter()
                            .filter_map(|t| self.positive(&CacheKey::new(&host, t), now))
                            .flatten()
                            .collect::<Vec<_>>()
                    })
                    .collect();
                return Some((ns_records, glue));
            }
            zone = parent_zone(current);
        }
        None
    }

    fn store_sections(&self, response: &DnsResponse, now: Instant) {
        let mut groups: HashMap<CacheKey, Vec<Record>> = HashMap::new();

        let additional_glue = response
            .additionals()
            .iter()
            .filter(|r| matches!(r.record_type(), RecordType::A | RecordType::AAAA));
        let authority = response
            .authorities()
            .iter()
            .filter(|r| r.record_type() != RecordType::SOA);

        for record in response.answers().iter().chain(authority).chain(additional_glue) {
            let key = CacheKey::new(&name_to_string(&record.name), record.record_type());
            let group = groups.entry(key).or_default();
            if !group.contains(record) {
                group.push(record.clone());
            }
        }

        for (key, records) in groups {
            let ttl = records.iter().map(|r| r.ttl).min().unwrap_or(0);
            if ttl == 0 {
                continue;
            }
            self.name_errors.remove(&key.domain);
            self.entries
                .insert(key, CacheEntry::Positive(CachedRecordSet::new(records, ttl, now)));
        }
    }

    fn synthesize(
        question: &DnsQuestion,
        rcode: ResponseCode,
        answers: Vec<Record>,
        authority: Vec<Record>,
        additional: Vec<Record>,
    ) -> DnsResponse {
        let mut message = Message::new(0, MessageType::Response, OpCode::Query);
        message.metadata.response_code = rcode;
        message.metadata.recursion_desired = true;

        if let Ok(name) = MessageBuilder::parse_name(&question.name) {
            let mut query = Query::new();
            query.set_name(name);
            query.set_query_type(RecordTypeMapper::to_hickory(&question.record_type));
            query.set_query_class(RecordTypeMapper::class_to_hickory(&question.class));
            message.add_query(query);
        }

        for record in answers {
            message.add_answer(record);
        }
        for record in authority {
            message.add_authority(record);
        }
        for record in additional {
            message.add_additional(record);
        }

        DnsResponse::new(message)
    }
}

/// TTL of a negative answer: the smaller of the SOA record TTL and its MINIMUM.
fn negative_ttl(authority: &[Record]) -> Option<(Vec<Record>, u32)> {
    authority.iter().find_map(|r| match &r.data {
        RData::SOA(soa) => Some((vec![r.clone()], r.ttl.min(soa.minimum))),
        _ => None,
    })
}

impl DnsCache for InMemoryDnsCache {
    fn query(&self, question: &DnsQuestion) -> Option<DnsResponse> {
        let now = Instant::now();
        let name = normalize(&question.name);
        let record_type = RecordTypeMapper::to_hickory(&question.record_type);

        if let Some(soa) = self.name_error(&name, now) {
            debug!(domain = %name, "Cache hit: name error");
            return Some(Self::synthesize(question, ResponseCode::NXDomain, vec![], soa, vec![]));
        }

        let answers = self.answer_chain(&name, record_type, now);
        if !answers.is_empty() {
            debug!(domain = %name, record_type = %record_type, answers = answers.len(), "Cache hit");
            return Some(Self::synthesize(question, ResponseCode::NoError, answers, vec![], vec![]));
        }

        if let Some(soa) = self.no_data(&CacheKey::new(&name, record_type), now) {
            debug!(domain = %name, record_type = %record_type, "Cache hit: no data");
            return Some(Self::synthesize(question, ResponseCode::NoError, vec![], soa, vec![]));
        }

        let (ns_records, glue) = self.closest_delegation(&name, now)?;
        debug!(
            domain = %name,
            name_servers = ns_records.len(),
            glue = glue.len(),
            "Cache hit: delegation"
        );
        Some(Self::synthesize(question, ResponseCode::NoError, vec![], ns_records, glue))
    }

    fn cache_response(&self, response: &DnsResponse) {
        let Some(query) = response.message.queries.first() else {
            return;
        };
        let now = Instant::now();
        let name = normalize(&name_to_string(query.name()));

        if self.len() >= self.purge_threshold {
            let before = self.len();
            self.purge_expired();
            debug!(before, after = self.len(), "Purged expired cache entries");
        }

        match response.response_code() {
            ResponseCode::NoError => {
                self.store_sections(response, now);

                if response.answers().is_empty() {
                    if let Some((soa, ttl)) = negative_ttl(response.authorities()) {
                        self.entries.insert(
                            CacheKey::new(&name, query.query_type()),
                            CacheEntry::NoData(CachedRecordSet::new(soa, ttl, now)),
                        );
                    }
                }
            }
            ResponseCode::NXDomain => {
                if let Some((soa, ttl)) = negative_ttl(response.authorities()) {
                    self.name_errors
                        .insert(name, CachedRecordSet::new(soa, ttl, now));
                }
            }
            _ => {}
        }
    }
}
