//! Typed views over a [`DnsResponse`] answer section.
//!
//! Every extractor starts at the question name and follows CNAME records by
//! owner name, collecting records of the wanted type on the way. NXDOMAIN is
//! reported as [`DomainError::NameDoesNotExist`] and any other failing RCODE
//! as [`DomainError::ServerError`].

use crate::dns_response::{name_to_string, owner_name, DnsResponse};
use ferrous_resolver_domain::{names_equal, DomainError};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RData;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// An MX target with its preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailExchanger {
    pub preference: u16,
    pub exchange: String,
}

fn collect_chain<T>(
    response: &DnsResponse,
    mut pick: impl FnMut(&RData) -> Option<T>,
) -> Result<Vec<T>, DomainError> {
    let mut domain = response.question_name().unwrap_or_default();

    match response.response_code() {
        ResponseCode::NoError => {
            let mut found = Vec::new();
            for record in response.answers() {
                if !names_equal(&owner_name(record), &domain) {
                    continue;
                }
                match &record.data {
                    RData::CNAME(cname) => domain = name_to_string(&cname.0),
                    data => {
                        if let Some(value) = pick(data) {
                            found.push(value);
                        }
                    }
                }
            }
            Ok(found)
        }
        ResponseCode::NXDomain => Err(DomainError::NameDoesNotExist {
            domain,
            server: response.server_label(),
        }),
        rcode => Err(DomainError::ServerError {
            rcode: rcode.to_string(),
            code: u16::from(rcode),
            server: response.server_label(),
        }),
    }
}

pub fn extract_ipv4(response: &DnsResponse) -> Result<Vec<Ipv4Addr>, DomainError> {
    collect_chain(response, |data| match data {
        RData::A(a) => Some(a.0),
        _ => None,
    })
}

pub fn extract_ipv6(response: &DnsResponse) -> Result<Vec<Ipv6Addr>, DomainError> {
    collect_chain(response, |data| match data {
        RData::AAAA(aaaa) => Some(aaaa.0),
        _ => None,
    })
}

/// A and AAAA records alike, in answer order.
pub fn extract_addresses(response: &DnsResponse) -> Result<Vec<IpAddr>, DomainError> {
    collect_chain(response, |data| match data {
        RData::A(a) => Some(IpAddr::V4(a.0)),
        RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
        _ => None,
    })
}

pub fn extract_txt(response: &DnsResponse) -> Result<Vec<String>, DomainError> {
    collect_chain(response, |data| match data {
        RData::TXT(txt) => Some(
            txt.txt_data
                .iter()
                .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                .collect::<String>(),
        ),
        _ => None,
    })
}

/// First PTR target on the chain, if any.
pub fn extract_ptr(response: &DnsResponse) -> Result<Option<String>, DomainError> {
    let targets = collect_chain(response, |data| match data {
        RData::PTR(ptr) => Some(name_to_string(&ptr.0)),
        _ => None,
    })?;
    Ok(targets.into_iter().next())
}

/// MX records sorted by preference, lowest first.
pub fn extract_mx_records(response: &DnsResponse) -> Result<Vec<MailExchanger>, DomainError> {
    let mut records = collect_chain(response, |data| match data {
        RData::MX(mx) => Some(MailExchanger {
            preference: mx.preference,
            exchange: name_to_string(&mx.exchange),
        }),
        _ => None,
    })?;
    records.sort_by_key(|mx| mx.preference);
    Ok(records)
}

pub fn extract_mx(response: &DnsResponse) -> Result<Vec<String>, DomainError> {
    Ok(extract_mx_records(response)?
        .into_iter()
        .map(|mx| mx.exchange)
        .collect())
}
