//! Follows CNAME chains across several walks and merges them into one reply.

use super::config::ResolverContext;
use super::engine::RecursiveEngine;
use crate::dns::forwarding::{MessageBuilder, RecordTypeMapper};
use ferrous_resolver_application::dns_response::name_to_string;
use ferrous_resolver_application::ports::DnsCache;
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{DnsQuestion, DomainError, RecordType};
use hickory_proto::op::MessageType;
use hickory_proto::rr::{RData, Record, RecordType as HickoryRecordType};
use tracing::debug;

/// Walks started for CNAME targets after the first one.
pub const MAX_CNAME_HOPS: usize = 16;

pub struct CnameChaser {
    engine: RecursiveEngine,
}

impl CnameChaser {
    pub fn new(context: ResolverContext) -> Self {
        Self {
            engine: RecursiveEngine::new(context),
        }
    }

    /// Resolves `question` from the root, chasing CNAMEs until a record of
    /// the asked type shows up or a walk returns no answers.
    ///
    /// The result carries only the original question, every answer record
    /// in the order found, and the RCODE and metadata of the last walk.
    pub async fn query(
        &self,
        question: &DnsQuestion,
        cache: &dyn DnsCache,
    ) -> Result<DnsResponse, DomainError> {
        let first = self.engine.resolve(question, None, cache).await?;
        let wanted = RecordTypeMapper::to_hickory(&question.record_type);

        let Some(mut last_record) = first.last_answer().cloned() else {
            return compose(question, first.answers().to_vec(), &first);
        };
        if question.record_type == RecordType::ANY
            || last_record.record_type() == wanted
            || last_record.record_type() != HickoryRecordType::CNAME
        {
            return compose(question, first.answers().to_vec(), &first);
        }

        let mut answers = first.answers().to_vec();
        let mut last = first;
        let mut hops = 0;

        while last_record.record_type() == HickoryRecordType::CNAME {
            if hops == MAX_CNAME_HOPS {
                return Err(DomainError::ProtocolViolation(format!(
                    "CNAME chain for {} exceeds {} hops",
                    question.name, MAX_CNAME_HOPS
                )));
            }
            hops += 1;

            let RData::CNAME(target) = &last_record.data else {
                break;
            };
            let target = name_to_string(&target.0);
            debug!(domain = %question.name, target = %target, hop = hops, "Following CNAME");

            let next = DnsQuestion::new(&target, question.record_type).with_class(question.class);
            last = self.engine.resolve(&next, None, cache).await?;

            let Some(record) = last.last_answer().cloned() else {
                break;
            };
            answers.extend_from_slice(last.answers());

            if record.record_type() == wanted {
                break;
            }
            if record.record_type() != HickoryRecordType::CNAME {
                return Err(DomainError::ProtocolViolation(format!(
                    "unexpected {} record at the end of the CNAME chain for {}",
                    record.record_type(),
                    question.name
                )));
            }
            last_record = record;
        }

        compose(question, answers, &last)
    }
}

/// Reply for `question` built from `answers`; authority is kept only when it
/// starts with an SOA and additional records only for MX questions.
fn compose(
    question: &DnsQuestion,
    answers: Vec<Record>,
    last: &DnsResponse,
) -> Result<DnsResponse, DomainError> {
    let mut message = MessageBuilder::build_query(question, true)?;
    message.metadata.message_type = MessageType::Response;
    message.metadata.recursion_available = true;
    message.metadata.response_code = last.response_code();

    for record in answers {
        message.add_answer(record);
    }
    if last.first_authority_type() == Some(HickoryRecordType::SOA) {
        for record in last.authorities() {
            message.add_authority(record.clone());
        }
    }
    if question.record_type == RecordType::MX {
        for record in last.additionals() {
            message.add_additional(record.clone());
        }
    }

    Ok(DnsResponse {
        message,
        metadata: last.metadata.clone(),
    })
}
