#![allow(dead_code)]
pub mod dns_server_mock;
pub mod mock_upstream;

pub use dns_server_mock::{MockDnsServer, MockZone};
pub use mock_upstream::{
    build_resolver, fast_config, server_failure, strings, MockResponse, MockUpstream,
    RecordingDialer,
};
