use ferrous_resolver_domain::DomainError;
use hickory_proto::op::{Message, MessageType};
use tracing::debug;

pub struct ResponseParser;

impl ResponseParser {
    /// Decode a wire response. Anything that is not a well-formed reply is a
    /// protocol violation.
    pub fn parse(response_bytes: &[u8]) -> Result<Message, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::ProtocolViolation(format!("Failed to parse DNS response: {}", e))
        })?;

        if message.metadata.message_type != MessageType::Response {
            return Err(DomainError::ProtocolViolation(
                "Received a query where a response was expected".to_string(),
            ));
        }

        debug!(
            id = message.metadata.id,
            rcode = %message.metadata.response_code,
            answers = message.answers.len(),
            authority = message.authorities.len(),
            additional = message.additionals.len(),
            truncated = message.metadata.truncation,
            "DNS response parsed"
        );

        Ok(message)
    }

    /// Decode a response to `request`, rejecting a mismatched identifier.
    pub fn parse_reply(request: &Message, response_bytes: &[u8]) -> Result<Message, DomainError> {
        let message = Self::parse(response_bytes)?;
        if message.metadata.id != request.metadata.id {
            return Err(DomainError::ProtocolViolation(format!(
                "Response identifier {} does not match request {}",
                message.metadata.id, request.metadata.id
            )));
        }
        Ok(message)
    }

    /// Identifier of a raw message, read from the header.
    pub fn peek_id(bytes: &[u8]) -> Option<u16> {
        match bytes {
            [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }
}
