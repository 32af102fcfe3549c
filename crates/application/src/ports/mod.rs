mod dns_cache;
mod dns_connection;
mod dns_resolver;
mod net_proxy;
mod random_source;

pub use dns_cache::DnsCache;
pub use dns_connection::{ConnectionFactory, DnsConnection};
pub use dns_resolver::DnsResolver;
pub use net_proxy::NetProxy;
pub use random_source::RandomSource;
