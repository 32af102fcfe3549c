//! Root name server hints (IANA root zone, `named.root`).

use ferrous_resolver_domain::{DnsTransportProtocol, NameServerAddress};
use std::net::{IpAddr, SocketAddr};
use std::sync::LazyLock;

/// (host, IPv4, IPv6)
type RootHint = (&'static str, &'static str, &'static str);

const ROOT_HINTS: [RootHint; 13] = [
    ("a.root-servers.net", "198.41.0.4", "2001:503:ba3e::2:30"),
    ("b.root-servers.net", "170.247.170.2", "2801:1b8:10::b"),
    ("c.root-servers.net", "192.33.4.12", "2001:500:2::c"),
    ("d.root-servers.net", "199.7.91.13", "2001:500:2d::d"),
    ("e.root-servers.net", "192.203.230.10", "2001:500:a8::e"),
    ("f.root-servers.net", "192.5.5.241", "2001:500:2f::f"),
    ("g.root-servers.net", "192.112.36.4", "2001:500:12::d0d"),
    ("h.root-servers.net", "198.97.190.53", "2001:500:1::53"),
    ("i.root-servers.net", "192.36.148.17", "2001:7fe::53"),
    ("j.root-servers.net", "192.58.128.30", "2001:503:c27::2:30"),
    ("k.root-servers.net", "193.0.14.129", "2001:7fd::1"),
    ("l.root-servers.net", "199.7.83.42", "2001:500:9f::42"),
    ("m.root-servers.net", "202.12.27.33", "2001:dc3::35"),
];

fn build(pick: fn(&RootHint) -> &'static str) -> Vec<NameServerAddress> {
    ROOT_HINTS
        .iter()
        .filter_map(|hint| {
            let ip = pick(hint).parse::<IpAddr>().ok()?;
            Some(NameServerAddress::new(
                hint.0,
                Some(SocketAddr::new(ip, 53)),
                DnsTransportProtocol::Udp,
            ))
        })
        .collect()
}

static ROOT_NAME_SERVERS_IPV4: LazyLock<Vec<NameServerAddress>> = LazyLock::new(|| build(|h| h.1));

static ROOT_NAME_SERVERS_IPV6: LazyLock<Vec<NameServerAddress>> = LazyLock::new(|| build(|h| h.2));

pub fn root_servers_ipv4() -> &'static [NameServerAddress] {
    &ROOT_NAME_SERVERS_IPV4
}

pub fn root_servers_ipv6() -> &'static [NameServerAddress] {
    &ROOT_NAME_SERVERS_IPV6
}

/// Owned copy of the root set to start a walk from: IPv4 roots, or IPv6
/// followed by IPv4 when IPv6 is preferred.
pub fn root_servers(prefer_ipv6: bool) -> Vec<NameServerAddress> {
    let mut servers = Vec::with_capacity(ROOT_HINTS.len() * 2);
    if prefer_ipv6 {
        servers.extend_from_slice(root_servers_ipv6());
    }
    servers.extend_from_slice(root_servers_ipv4());
    servers
}

pub fn is_root_server(server: &NameServerAddress) -> bool {
    server.endpoint().is_some_and(|endpoint| {
        root_servers_ipv4()
            .iter()
            .chain(root_servers_ipv6())
            .any(|root| root.endpoint() == Some(endpoint))
    })
}
