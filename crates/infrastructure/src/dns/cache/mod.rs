pub mod metrics;
pub mod store;

pub use metrics::LookupMetrics;
pub use store::MemoryCacheStore;
