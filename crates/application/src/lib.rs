pub mod context;
pub mod ports;

pub use context::LookupContext;
