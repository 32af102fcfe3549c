//! Ferrous Resolver Domain Layer
pub mod config;
pub mod dns_protocol;
pub mod dns_question;
pub mod dns_record;
pub mod errors;
pub mod validators;

pub use config::{CliOverrides, Config, ConfigError, ResolutionMode};
pub use dns_protocol::{DnsTransportProtocol, NameServerAddress};
pub use dns_question::{names_equal, DnsQuestion};
pub use dns_record::{DnsClass, RecordType};
pub use errors::{DomainError, TransportErrorKind};
pub use validators::{is_domain_name_valid, validate_domain_name};
