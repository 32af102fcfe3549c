pub mod key;
pub mod memory;

pub use key::CacheKey;
pub use memory::InMemoryDnsCache;
