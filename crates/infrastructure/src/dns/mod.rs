pub mod cache;
pub mod dial;
pub mod resolver;
pub mod upstream;

pub use cache::{LookupMetrics, MemoryCacheStore};
pub use dial::{AddressOrderer, TcpDialer};
pub use resolver::{CachingResolver, ResolverBuilder};
pub use upstream::{EndpointResolver, FamilyResolver, SystemResolver};
