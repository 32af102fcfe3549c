use ferrous_resolver_application::ports::DnsCache;
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{DnsQuestion, RecordType};
use ferrous_resolver_infrastructure::dns::InMemoryDnsCache;
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{Record, RecordType as WireType};
use std::time::Duration;

mod helpers;
use helpers::*;

fn store(cache: &InMemoryDnsCache, reply: Reply) {
    cache.cache_response(&DnsResponse::new(reply.build()));
}

fn lookup(cache: &InMemoryDnsCache, domain: &str, record_type: RecordType) -> Option<DnsResponse> {
    cache.query(&DnsQuestion::new(domain, record_type))
}

#[tokio::test]
async fn test_positive_answer_is_served_for_its_question() {
    let cache = InMemoryDnsCache::new();
    store(
        &cache,
        Reply::new()
            .question("www.example.test", WireType::A)
            .answer(a("www.example.test", "192.0.2.80")),
    );

    let response = lookup(&cache, "www.example.test.", RecordType::A).unwrap();
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert_eq!(response.answers().len(), 1);
    assert_eq!(response.question_name().as_deref(), Some("www.example.test"));

    assert!(lookup(&cache, "www.example.test", RecordType::MX).is_none());
}

#[tokio::test]
async fn test_name_error_covers_every_type() {
    let cache = InMemoryDnsCache::new();
    store(
        &cache,
        Reply::nx_domain()
            .question("gone.example.test", WireType::A)
            .authority(soa("example.test")),
    );

    for record_type in [RecordType::A, RecordType::AAAA, RecordType::TXT] {
        let response = lookup(&cache, "gone.example.test", record_type).unwrap();
        assert_eq!(response.response_code(), ResponseCode::NXDomain);
        assert_eq!(response.first_authority_type(), Some(WireType::SOA));
    }
}

#[tokio::test]
async fn test_no_data_is_kept_per_type() {
    let cache = InMemoryDnsCache::new();
    store(
        &cache,
        Reply::new()
            .question("www.example.test", WireType::AAAA)
            .authority(soa("example.test")),
    );

    let response = lookup(&cache, "www.example.test", RecordType::AAAA).unwrap();
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert!(response.answers().is_empty());
    assert_eq!(response.first_authority_type(), Some(WireType::SOA));

    assert!(lookup(&cache, "www.example.test", RecordType::A).is_none());
}

#[tokio::test]
async fn test_delegation_is_served_with_glue_below_the_zone() {
    let cache = InMemoryDnsCache::new();
    store(
        &cache,
        Reply::referral("example.test", "ns1.example.test", Some("192.0.2.53"))
            .question("www.example.test", WireType::A),
    );

    let response = lookup(&cache, "mail.example.test", RecordType::MX).unwrap();
    assert!(response.answers().is_empty());
    assert_eq!(response.first_authority_type(), Some(WireType::NS));
    assert_eq!(response.additionals().len(), 1);

    assert!(lookup(&cache, "example.org", RecordType::A).is_none());
}

#[tokio::test]
async fn test_cached_cname_chain_is_followed() {
    let cache = InMemoryDnsCache::new();
    store(
        &cache,
        Reply::new()
            .question("www.example.test", WireType::A)
            .answer(cname("www.example.test", "web.example.test")),
    );
    store(
        &cache,
        Reply::new()
            .question("web.example.test", WireType::A)
            .answer(a("web.example.test", "192.0.2.80")),
    );

    let response = lookup(&cache, "www.example.test", RecordType::A).unwrap();
    let types: Vec<WireType> = response.answers().iter().map(Record::record_type).collect();
    assert_eq!(types, vec![WireType::CNAME, WireType::A]);
}

#[tokio::test]
async fn test_zero_ttl_records_are_not_cached() {
    let cache = InMemoryDnsCache::new();
    let mut record = a("www.example.test", "192.0.2.80");
    record.ttl = 0;
    store(&cache, Reply::new().question("www.example.test", WireType::A).answer(record));

    assert!(cache.is_empty());
    assert!(lookup(&cache, "www.example.test", RecordType::A).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_entries_expire_and_count_down() {
    let cache = InMemoryDnsCache::new();
    store(
        &cache,
        Reply::new()
            .question("www.example.test", WireType::A)
            .answer(a("www.example.test", "192.0.2.80")),
    );

    tokio::time::advance(Duration::from_secs(100)).await;
    let response = lookup(&cache, "www.example.test", RecordType::A).unwrap();
    assert_eq!(response.answers()[0].ttl, 200);

    tokio::time::advance(Duration::from_secs(201)).await;
    assert!(lookup(&cache, "www.example.test", RecordType::A).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_negative_entry_uses_soa_minimum() {
    let cache = InMemoryDnsCache::new();
    store(
        &cache,
        Reply::nx_domain()
            .question("gone.example.test", WireType::A)
            .authority(soa_with_ttl("example.test", 3600, 60)),
    );

    tokio::time::advance(Duration::from_secs(59)).await;
    assert!(lookup(&cache, "gone.example.test", RecordType::A).is_some());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(lookup(&cache, "gone.example.test", RecordType::A).is_none());

    cache.purge_expired();
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_store_past_threshold_sweeps_expired_entries() {
    let cache = InMemoryDnsCache::with_purge_threshold(2);
    for host in ["a.example.test", "b.example.test"] {
        store(&cache, Reply::new().question(host, WireType::A).answer(a(host, "192.0.2.80")));
    }
    assert_eq!(cache.len(), 2);

    tokio::time::advance(Duration::from_secs(301)).await;
    store(
        &cache,
        Reply::new()
            .question("c.example.test", WireType::A)
            .answer(a("c.example.test", "192.0.2.81")),
    );

    assert_eq!(cache.len(), 1);
    assert!(lookup(&cache, "c.example.test", RecordType::A).is_some());
}
