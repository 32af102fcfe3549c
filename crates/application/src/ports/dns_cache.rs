use crate::dns_response::DnsResponse;
use ferrous_resolver_domain::DnsQuestion;

/// Answer cache consulted by the resolution engine.
///
/// A hit must look like a live reply for the question: the same RCODE and
/// section layout, including SOA-only "no data" replies and NS referrals with
/// whatever glue is known. Implementations must be safe for concurrent use.
pub trait DnsCache: Send + Sync {
    fn query(&self, question: &DnsQuestion) -> Option<DnsResponse>;

    /// Stores the records of a live reply. Storing the same reply twice is harmless.
    fn cache_response(&self, response: &DnsResponse);
}
