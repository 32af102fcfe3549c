pub mod builders;
pub mod mock_resolver;

#[allow(unused_imports)]
pub use builders::*;
#[allow(unused_imports)]
pub use mock_resolver::MockDnsResolver;
