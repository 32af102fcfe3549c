pub mod cache;
pub mod dispatcher;
pub mod forwarding;
pub mod random;
pub mod resolver;
pub mod transport;

pub use cache::InMemoryDnsCache;
pub use dispatcher::ParallelDispatcher;
pub use random::FastRandom;
pub use resolver::{RecursiveResolver, StubResolver};
pub use transport::connection::PooledConnectionFactory;
