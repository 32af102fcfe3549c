//! Iterative resolution from the root with QNAME minimization.
//!
//! The walk is a loop over an explicit stack of [`StackFrame`]s. The active
//! level holds the question, the name servers for the current zone and the
//! position in that list. When a server is only known by name, the level is
//! suspended and the walk switches to resolving that name; the resulting
//! address is patched into the suspended list before it resumes.

use super::config::ResolverContext;
use super::name_servers::{
    is_self_referral, name_servers_from_response, prepare_servers, shuffle_servers,
};
use super::root_servers::root_servers;
use super::stack::{ResolverStack, StackFrame};
use crate::dns::dispatcher::ParallelDispatcher;
use crate::dns::forwarding::MessageBuilder;
use ferrous_resolver_application::dns_response::owner_name;
use ferrous_resolver_application::ports::DnsCache;
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{
    names_equal, DnsQuestion, DomainError, NameServerAddress, RecordType,
};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{RData, RecordType as HickoryRecordType};
use std::net::IpAddr;
use tracing::debug;

/// Referrals followed by one level before it is abandoned.
pub const MAX_DELEGATION_HOPS: usize = 16;

pub struct RecursiveEngine {
    context: ResolverContext,
    dispatcher: ParallelDispatcher,
}

impl RecursiveEngine {
    pub fn new(context: ResolverContext) -> Self {
        let dispatcher = ParallelDispatcher::new(context.clone());
        Self {
            context,
            dispatcher,
        }
    }

    /// Resolves `question` by walking the delegation tree.
    ///
    /// With `name_servers` the walk starts at a shuffled copy of that list
    /// and minimization stays off; otherwise it starts at the root servers
    /// with minimization on. Every live reply is stored in `cache`.
    pub async fn resolve(
        &self,
        question: &DnsQuestion,
        name_servers: Option<&[NameServerAddress]>,
        cache: &dyn DnsCache,
    ) -> Result<DnsResponse, DomainError> {
        let options = self.context.options;
        let random = self.context.random.as_ref();

        let mut level = StackFrame::new(question.clone());
        match name_servers {
            Some(servers) if !servers.is_empty() => {
                level.name_servers = prepare_servers(servers, random, options.prefer_ipv6);
            }
            _ => level.question.enable_minimization(),
        }
        let mut stack = ResolverStack::new(options.max_stack_depth);

        'stack: loop {
            if let Some(cached) = cache.query(&level.question) {
                match cached.response_code() {
                    ResponseCode::NoError if !cached.answers().is_empty() => {
                        let Some(frame) = stack.pop() else {
                            return Ok(cached);
                        };
                        let resolved = std::mem::replace(&mut level, frame);
                        resume_with_address(&mut level, &resolved.question, &cached);
                    }
                    ResponseCode::NoError
                        if cached.first_authority_type() == Some(HickoryRecordType::SOA) =>
                    {
                        if stack.is_empty() {
                            return Ok(cached);
                        }
                        if level.question.record_type == RecordType::AAAA {
                            level.question = ipv4_fallback(&level.question);
                            continue 'stack;
                        }
                        pop_and_skip(&mut stack, &mut level);
                    }
                    ResponseCode::NoError if level.name_servers.is_empty() => {
                        let mut servers = name_servers_from_response(&cached, options.prefer_ipv6, true);
                        if !servers.is_empty() {
                            shuffle_servers(&mut servers, random, options.prefer_ipv6);
                            level.name_servers = servers;
                            if let Some(cut) = cached.authorities().first() {
                                level.question.set_zone_cut(&owner_name(cut));
                            }
                        }
                    }
                    ResponseCode::NXDomain => {
                        if stack.is_empty() {
                            return Ok(cached);
                        }
                        pop_and_skip(&mut stack, &mut level);
                    }
                    _ => {}
                }
            }

            if level.name_servers.is_empty() {
                let mut roots = root_servers(options.prefer_ipv6);
                shuffle_servers(&mut roots, random, options.prefer_ipv6);
                level.name_servers = roots;
            }

            'resolver: loop {
                let mut i = std::mem::take(&mut level.index);
                let mut last_error = None;

                while i < level.name_servers.len() {
                    let server = level.name_servers[i].clone();

                    if server.is_stale() && self.context.proxy.is_none() {
                        level.index = i;
                        let sub_question = address_question(
                            server.host(),
                            &level.question,
                            options.prefer_ipv6,
                        );
                        let suspended = std::mem::replace(&mut level, StackFrame::new(sub_question));
                        stack.push(suspended)?;
                        continue 'stack;
                    }

                    let request = MessageBuilder::build_query(&level.question, false)?;
                    let response = match self
                        .dispatcher
                        .dispatch(&request, std::slice::from_ref(&server))
                        .await
                    {
                        Ok(response) => response,
                        Err(e) => {
                            debug!(server = %server, error = %e, "Name server failed, trying next");
                            last_error = Some(e);
                            i += 1;
                            continue;
                        }
                    };

                    cache.cache_response(&response);

                    match response.response_code() {
                        ResponseCode::NoError if !response.answers().is_empty() => {
                            let question = &mut level.question;
                            let owner = response
                                .answers()
                                .first()
                                .map(owner_name)
                                .unwrap_or_default();

                            if names_equal(&owner, &question.name) {
                                if !question.record_type.is_address() && question.is_minimizing() {
                                    disable_minimization(question, &server);
                                    continue;
                                }
                            } else if question.is_minimizing() {
                                disable_minimization(question, &server);
                                continue;
                            } else {
                                i += 1;
                                continue;
                            }

                            let Some(frame) = stack.pop() else {
                                return Ok(response);
                            };
                            let resolved = std::mem::replace(&mut level, frame);
                            resume_with_address(&mut level, &resolved.question, &response);
                            continue 'resolver;
                        }

                        ResponseCode::NoError
                            if response.first_authority_type() == Some(HickoryRecordType::SOA) =>
                        {
                            let question = &mut level.question;
                            if question.is_minimizing() {
                                if !question.is_minimized_name_full() {
                                    let cut = question.minimized_name().to_string();
                                    debug!(domain = %question.name, zone_cut = %cut, "Advancing zone cut");
                                    question.set_zone_cut(&cut);
                                    continue;
                                }
                                if !question.record_type.is_address() {
                                    disable_minimization(question, &server);
                                    continue;
                                }
                            }

                            if stack.is_empty() {
                                return Ok(response);
                            }
                            if question.record_type == RecordType::AAAA {
                                *question = ipv4_fallback(question);
                                continue;
                            }
                            pop_and_skip(&mut stack, &mut level);
                            continue 'resolver;
                        }

                        ResponseCode::NoError if !response.authorities().is_empty() => {
                            if is_self_referral(&response) || level.hop_count >= MAX_DELEGATION_HOPS {
                                debug!(
                                    domain = %level.question.name,
                                    server = %server,
                                    hop_count = level.hop_count,
                                    "Abandoning delegation level"
                                );
                                if stack.is_empty() {
                                    return Ok(response);
                                }
                                pop_and_skip(&mut stack, &mut level);
                                continue 'resolver;
                            }

                            let mut next_hops =
                                name_servers_from_response(&response, options.prefer_ipv6, false);
                            if next_hops.is_empty() {
                                if stack.is_empty() {
                                    return Ok(response);
                                }
                                pop_and_skip(&mut stack, &mut level);
                                continue 'resolver;
                            }

                            shuffle_servers(&mut next_hops, random, options.prefer_ipv6);
                            if let Some(cut) = response.authorities().first() {
                                level.question.set_zone_cut(&owner_name(cut));
                            }
                            level.name_servers = next_hops;
                            level.hop_count += 1;
                            debug!(
                                domain = %level.question.name,
                                zone_cut = level.question.zone_cut().unwrap_or_default(),
                                name_servers = level.name_servers.len(),
                                hop_count = level.hop_count,
                                "Following referral"
                            );
                            continue 'resolver;
                        }

                        ResponseCode::NXDomain => {
                            let question = &mut level.question;
                            if question.is_minimizing() && !question.is_minimized_name_full() {
                                disable_minimization(question, &server);
                                continue;
                            }
                            if stack.is_empty() {
                                return Ok(response);
                            }
                            pop_and_skip(&mut stack, &mut level);
                            continue 'resolver;
                        }

                        _ => {
                            if i + 1 == level.name_servers.len() {
                                if stack.is_empty() {
                                    return Ok(response);
                                }
                                pop_and_skip(&mut stack, &mut level);
                                continue 'resolver;
                            }
                            i += 1;
                        }
                    }
                }

                if stack.is_empty() {
                    let servers = level
                        .name_servers
                        .iter()
                        .map(|s| s.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(DomainError::exhausted(
                        format!("no response from name servers [{}]", servers),
                        last_error,
                    ));
                }
                pop_and_skip(&mut stack, &mut level);
            }
        }
    }
}

/// Question for the address of a name server known only by host name.
fn address_question(host: &str, parent: &DnsQuestion, prefer_ipv6: bool) -> DnsQuestion {
    let record_type = if prefer_ipv6 {
        RecordType::AAAA
    } else {
        RecordType::A
    };
    let mut question = DnsQuestion::new(host, record_type).with_class(parent.class);
    question.enable_minimization();
    question
}

fn ipv4_fallback(question: &DnsQuestion) -> DnsQuestion {
    debug!(domain = %question.name, "No AAAA for name server, trying A");
    DnsQuestion::new(&question.name, RecordType::A).with_class(question.class)
}

fn disable_minimization(question: &mut DnsQuestion, server: &NameServerAddress) {
    debug!(domain = %question.name, server = %server, "Disabling QNAME minimization");
    question.disable_minimization();
}

/// Resumes the suspended level and moves past the server whose address
/// could not be found.
fn pop_and_skip(stack: &mut ResolverStack, level: &mut StackFrame) {
    if let Some(frame) = stack.pop() {
        *level = frame;
        level.index += 1;
    }
}

/// Patches the pending server of the resumed level with the address found
/// for it, or skips that server when the answer has none.
fn resume_with_address(level: &mut StackFrame, resolved: &DnsQuestion, response: &DnsResponse) {
    let address = server_address(response, resolved);
    match (address, level.name_servers.get_mut(level.index)) {
        (Some(ip), Some(server)) => {
            server.set_ip(ip);
            debug!(server = %server, "Resolved name server address");
        }
        _ => level.index += 1,
    }
}

/// A or AAAA record owned by the name server itself. CNAMEs are not
/// followed; the type asked for wins over the other family.
fn server_address(response: &DnsResponse, question: &DnsQuestion) -> Option<IpAddr> {
    let mut other_family = None;
    for record in response.answers() {
        if !names_equal(&owner_name(record), &question.name) {
            continue;
        }
        let (ip, record_type) = match &record.data {
            RData::A(a) => (IpAddr::V4(a.0), RecordType::A),
            RData::AAAA(aaaa) => (IpAddr::V6(aaaa.0), RecordType::AAAA),
            _ => continue,
        };
        if record_type == question.record_type {
            return Some(ip);
        }
        other_family.get_or_insert(ip);
    }
    other_family
}
