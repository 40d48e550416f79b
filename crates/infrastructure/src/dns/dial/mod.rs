pub mod address;
pub mod strategy;
pub mod tcp;

pub use address::{join_host_port, split_host_port};
pub use strategy::AddressOrderer;
pub use tcp::TcpDialer;
