pub mod endpoint;
pub mod family;
pub mod message;
pub mod system;

pub use endpoint::EndpointResolver;
pub use family::FamilyResolver;
pub use system::SystemResolver;
