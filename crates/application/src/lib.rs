//! Ferrous Resolver Application Layer
pub mod dns_response;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dns_response::{DnsResponse, ResponseMetadata};
