use ferrous_resolver_domain::{DnsTransportProtocol, NameServerAddress};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{Name, Record, RecordType};
use std::time::Duration;

/// Who answered, over what, and how fast.
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    pub server: NameServerAddress,
    pub protocol: DnsTransportProtocol,
    pub rtt: Duration,
}

/// A DNS reply together with where it came from.
///
/// Responses synthesized by a cache carry no metadata.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub message: Message,
    pub metadata: Option<ResponseMetadata>,
}

impl DnsResponse {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            metadata: None,
        }
    }

    pub fn with_metadata(
        mut self,
        server: NameServerAddress,
        protocol: DnsTransportProtocol,
        rtt: Duration,
    ) -> Self {
        self.metadata = Some(ResponseMetadata {
            server,
            protocol,
            rtt,
        });
        self
    }

    pub fn response_code(&self) -> ResponseCode {
        self.message.metadata.response_code
    }

    pub fn answers(&self) -> &[Record] {
        &self.message.answers
    }

    pub fn authorities(&self) -> &[Record] {
        &self.message.authorities
    }

    pub fn additionals(&self) -> &[Record] {
        &self.message.additionals
    }

    pub fn is_truncated(&self) -> bool {
        self.message.metadata.truncation
    }

    pub fn is_name_error(&self) -> bool {
        self.response_code() == ResponseCode::NXDomain
    }

    pub fn last_answer(&self) -> Option<&Record> {
        self.answers().last()
    }

    /// Type of the first authority record, which decides between a
    /// referral (NS) and a negative answer (SOA).
    pub fn first_authority_type(&self) -> Option<RecordType> {
        self.authorities().first().map(|r| r.record_type())
    }

    /// Name of the first question, without the trailing root dot.
    pub fn question_name(&self) -> Option<String> {
        self.message.queries.first().map(|q| name_to_string(q.name()))
    }

    pub fn server(&self) -> Option<&NameServerAddress> {
        self.metadata.as_ref().map(|m| &m.server)
    }

    pub fn server_label(&self) -> Option<String> {
        self.server().map(|s| s.to_string())
    }
}

/// Presentation form of a name without the trailing root dot.
pub fn name_to_string(name: &Name) -> String {
    let text = name.to_utf8();
    text.trim_end_matches('.').to_string()
}

/// Owner name of a record, see [`name_to_string`].
pub fn owner_name(record: &Record) -> String {
    name_to_string(&record.name)
}
