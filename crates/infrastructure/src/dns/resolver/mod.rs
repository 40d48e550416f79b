pub mod builder;
pub mod cache_layer;
pub mod caching;
pub mod inflight;

pub use builder::ResolverBuilder;
pub use cache_layer::{addresses_changed, CachePolicy, CachedLookup, LookupKind};
pub use caching::CachingResolver;
pub use inflight::InflightGroup;
