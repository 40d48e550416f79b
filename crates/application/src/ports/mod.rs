mod cache_store;
mod dialer;
mod lookup_hooks;
mod lookup_trace;
mod upstream_resolver;

pub use cache_store::{Addresses, CacheEntry, CacheStore};
pub use dialer::Dialer;
pub use lookup_hooks::{ChangeHook, LookupHooks, MissHook};
pub use lookup_trace::LookupTrace;
pub use upstream_resolver::UpstreamResolver;
