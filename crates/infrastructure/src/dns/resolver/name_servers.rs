//! Name server list handling for the dispatcher and the recursive walk.

use ferrous_resolver_application::dns_response::name_to_string;
use ferrous_resolver_application::ports::RandomSource;
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{names_equal, DnsTransportProtocol, NameServerAddress};
use hickory_proto::rr::RData;
use std::net::{IpAddr, SocketAddr};

/// Shuffles `servers` in place and, when IPv6 is preferred, moves IPv6
/// servers to the front without disturbing the shuffle within each family.
pub fn shuffle_servers(
    servers: &mut [NameServerAddress],
    random: &dyn RandomSource,
    prefer_ipv6: bool,
) {
    random.shuffle(servers);
    if prefer_ipv6 {
        NameServerAddress::sort_by_family(servers);
    }
}

/// Shuffled copy of a caller supplied list; the original stays untouched.
pub fn prepare_servers(
    servers: &[NameServerAddress],
    random: &dyn RandomSource,
    prefer_ipv6: bool,
) -> Vec<NameServerAddress> {
    let mut copy = servers.to_vec();
    shuffle_servers(&mut copy, random, prefer_ipv6);
    copy
}

/// Next-hop name servers named by the NS records of a referral.
///
/// Each glue address in the Additional section yields one resolved server
/// (AAAA glue only when IPv6 is preferred). A name server without usable
/// glue is returned stale unless `glue_only` is set.
pub fn name_servers_from_response(
    response: &DnsResponse,
    prefer_ipv6: bool,
    glue_only: bool,
) -> Vec<NameServerAddress> {
    let mut name_servers = Vec::new();

    for authority in response.authorities() {
        let RData::NS(ns) = &authority.data else {
            continue;
        };
        let host = name_to_string(&ns.0);
        let mut found_glue = false;

        for additional in response.additionals() {
            if !names_equal(&name_to_string(&additional.name), &host) {
                continue;
            }
            let ip = match &additional.data {
                RData::A(a) => IpAddr::V4(a.0),
                RData::AAAA(aaaa) if prefer_ipv6 => IpAddr::V6(aaaa.0),
                _ => continue,
            };
            found_glue = true;
            name_servers.push(NameServerAddress::new(
                host.as_str(),
                Some(SocketAddr::new(ip, 53)),
                DnsTransportProtocol::Udp,
            ));
        }

        if !found_glue && !glue_only {
            name_servers.push(NameServerAddress::from_host(
                host.as_str(),
                DnsTransportProtocol::Udp,
            ));
        }
    }

    name_servers
}

/// True when the answering server names itself in the NS set, i.e. the
/// reply is an empty answer from the authority rather than a referral.
pub fn is_self_referral(response: &DnsResponse) -> bool {
    let Some(server) = response.server() else {
        return false;
    };
    if server.host().is_empty() {
        return false;
    }

    response.authorities().iter().any(|record| match &record.data {
        RData::NS(ns) => names_equal(&name_to_string(&ns.0), server.host()),
        _ => false,
    })
}
