pub mod eviction_job;

pub use eviction_job::EvictionJob;
