//! DNS Message Builder
//!
//! Turns a [`DnsQuestion`] into a `hickory-proto` query message. When the
//! question is minimizing, only the minimized name and type go on the wire.

use super::record_type_map::RecordTypeMapper;
use ferrous_resolver_domain::{DnsQuestion, DomainError};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::Name;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Builds DNS query messages
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a standard query for `question`.
    ///
    /// The identifier is left at zero; the dispatcher assigns a fresh random
    /// one per attempt. Iterative queries to authoritative servers are sent
    /// with `recursion_desired` off.
    pub fn build_query(
        question: &DnsQuestion,
        recursion_desired: bool,
    ) -> Result<Message, DomainError> {
        let name = Self::parse_name(question.minimized_name())?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordTypeMapper::to_hickory(&question.minimized_type()));
        query.set_query_class(RecordTypeMapper::class_to_hickory(&question.class));

        let mut message = Message::new(0, MessageType::Query, OpCode::Query);
        message.metadata.recursion_desired = recursion_desired;
        message.add_query(query);
        Ok(message)
    }

    /// Fully qualified name for `domain`; the empty string is the root.
    pub fn parse_name(domain: &str) -> Result<Name, DomainError> {
        let domain = domain.trim_end_matches('.');
        if domain.is_empty() {
            return Ok(Name::root());
        }

        Name::from_str(&format!("{}.", domain)).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", domain, e))
        })
    }

    /// Serialize a Message to wire format bytes
    pub fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::ProtocolViolation(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrous_resolver_domain::RecordType;

    #[test]
    fn test_recursion_desired_flag() {
        let question = DnsQuestion::new("example.com", RecordType::A);

        let bytes =
            MessageBuilder::serialize_message(&MessageBuilder::build_query(&question, true).unwrap())
                .unwrap();
        assert_eq!(bytes[2] & 0x01, 0x01, "RD flag should be set");

        let bytes =
            MessageBuilder::serialize_message(&MessageBuilder::build_query(&question, false).unwrap())
                .unwrap();
        assert_eq!(bytes[2] & 0x01, 0x00, "RD flag should be clear");
    }

    #[test]
    fn test_minimizing_question_sends_minimized_name() {
        let mut question = DnsQuestion::new("www.example.com", RecordType::MX);
        question.enable_minimization();
        question.set_zone_cut("com");

        let message = MessageBuilder::build_query(&question, false).unwrap();
        let query = &message.queries[0];

        assert_eq!(query.name().to_utf8(), "example.com.");
        assert_eq!(query.query_type(), hickory_proto::rr::RecordType::A);
    }

    #[test]
    fn test_root_name() {
        assert!(MessageBuilder::parse_name("").unwrap().is_root());
        assert!(MessageBuilder::parse_name(".").unwrap().is_root());
    }
}
