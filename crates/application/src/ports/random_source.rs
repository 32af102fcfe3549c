use ferrous_resolver_domain::NameServerAddress;

/// Randomness used for server ordering and query identifiers.
pub trait RandomSource: Send + Sync {
    fn shuffle(&self, servers: &mut [NameServerAddress]);

    fn query_id(&self) -> u16;
}
