use crate::errors::DomainError;
use crate::validators::is_domain_name_valid;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DnsTransportProtocol {
    #[default]
    Udp,
    Tcp,
    Tls,
    Https,
}

impl DnsTransportProtocol {
    pub fn default_port(&self) -> u16 {
        match self {
            DnsTransportProtocol::Udp | DnsTransportProtocol::Tcp => 53,
            DnsTransportProtocol::Tls => 853,
            DnsTransportProtocol::Https => 443,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            DnsTransportProtocol::Udp => "UDP",
            DnsTransportProtocol::Tcp => "TCP",
            DnsTransportProtocol::Tls => "TLS",
            DnsTransportProtocol::Https => "HTTPS",
        }
    }

    fn scheme(&self) -> &'static str {
        match self {
            DnsTransportProtocol::Udp => "udp",
            DnsTransportProtocol::Tcp => "tcp",
            DnsTransportProtocol::Tls => "tls",
            DnsTransportProtocol::Https => "https",
        }
    }
}

impl fmt::Display for DnsTransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol_name())
    }
}

/// A name server known by host name, by endpoint, or both.
///
/// An address whose endpoint is still unknown is *stale* and has to be
/// resolved before it can be queried. DNS-over-HTTPS servers are never stale
/// since the HTTP client resolves the URL host itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameServerAddress {
    host: Arc<str>,
    endpoint: Option<SocketAddr>,
    port: u16,
    protocol: DnsTransportProtocol,
    url: Option<Arc<str>>,
}

impl NameServerAddress {
    pub fn new(
        host: impl Into<Arc<str>>,
        endpoint: Option<SocketAddr>,
        protocol: DnsTransportProtocol,
    ) -> Self {
        let port = endpoint
            .map(|e| e.port())
            .unwrap_or_else(|| protocol.default_port());
        Self {
            host: host.into(),
            endpoint,
            port,
            protocol,
            url: None,
        }
    }

    pub fn from_ip(ip: IpAddr) -> Self {
        Self::new("", Some(SocketAddr::new(ip, 53)), DnsTransportProtocol::Udp)
    }

    pub fn from_socket_addr(addr: SocketAddr, protocol: DnsTransportProtocol) -> Self {
        Self::new("", Some(addr), protocol)
    }

    /// A name server known only by host name, to be resolved later.
    pub fn from_host(host: impl Into<Arc<str>>, protocol: DnsTransportProtocol) -> Self {
        Self::new(host, None, protocol)
    }

    pub fn from_url(url: &str) -> Result<Self, DomainError> {
        let rest = url
            .strip_prefix("https://")
            .ok_or_else(|| DomainError::InvalidNameServer(url.to_string()))?;
        let authority = rest.split('/').next().unwrap_or_default();
        if authority.is_empty() {
            return Err(DomainError::InvalidNameServer(url.to_string()));
        }

        let (host, port) = match parse_host_port(authority) {
            Some((host, port)) => (host, port),
            None => (
                authority.trim_start_matches('[').trim_end_matches(']'),
                DnsTransportProtocol::Https.default_port(),
            ),
        };
        let endpoint = host.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, port));
        let host = if endpoint.is_some() { "" } else { host };
        if endpoint.is_none() && !is_domain_name_valid(host) {
            return Err(DomainError::InvalidNameServer(url.to_string()));
        }

        Ok(Self {
            host: host.into(),
            endpoint,
            port,
            protocol: DnsTransportProtocol::Https,
            url: Some(url.into()),
        })
    }

    /// Parses a comma separated list, e.g. `"8.8.8.8, tls://1.1.1.1"`.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, DomainError> {
        let servers = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Self>, _>>()?;

        if servers.is_empty() {
            return Err(DomainError::InvalidNameServer(
                "name server list is empty".to_string(),
            ));
        }
        Ok(servers)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn endpoint(&self) -> Option<SocketAddr> {
        self.endpoint
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn protocol(&self) -> DnsTransportProtocol {
        self.protocol
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_stale(&self) -> bool {
        self.endpoint.is_none() && self.protocol != DnsTransportProtocol::Https
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self.endpoint, Some(SocketAddr::V6(_)))
    }

    /// Host used for TLS server name verification and HTTP requests.
    pub fn server_name(&self) -> String {
        match self.endpoint {
            Some(endpoint) if self.host.is_empty() => endpoint.ip().to_string(),
            _ => self.host.to_string(),
        }
    }

    /// Fills in the endpoint learned from glue, the cache or a bootstrap walk.
    pub fn set_ip(&mut self, ip: IpAddr) {
        self.endpoint = Some(SocketAddr::new(ip, self.port));
    }

    pub fn resolved_with(&self, ip: IpAddr) -> Self {
        let mut resolved = self.clone();
        resolved.set_ip(ip);
        resolved
    }

    /// Same server over another transport, used for TC escalation.
    pub fn with_protocol(&self, protocol: DnsTransportProtocol) -> Self {
        let mut changed = self.clone();
        if changed.port == self.protocol.default_port() {
            changed.port = protocol.default_port();
            changed.endpoint = self.endpoint.map(|e| SocketAddr::new(e.ip(), changed.port));
        }
        changed.protocol = protocol;
        changed
    }

    /// Sort key by address family: IPv6 first, then IPv4, unresolved last.
    pub fn family_rank(&self) -> u8 {
        match self.endpoint {
            Some(SocketAddr::V6(_)) => 0,
            Some(SocketAddr::V4(_)) => 1,
            None => 2,
        }
    }

    /// Stable sort by [`family_rank`](Self::family_rank), keeping the
    /// existing order within each family.
    pub fn sort_by_family(servers: &mut [NameServerAddress]) {
        servers.sort_by_key(NameServerAddress::family_rank);
    }
}

impl fmt::Display for NameServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(url) = &self.url {
            return write!(f, "{}", url);
        }
        if self.protocol != DnsTransportProtocol::Udp {
            write!(f, "{}://", self.protocol.scheme())?;
        }
        match (self.host.is_empty(), self.endpoint) {
            (true, Some(endpoint)) => write!(f, "{}", endpoint),
            (false, Some(endpoint)) => write!(f, "{}:{} ({})", self.host, self.port, endpoint.ip()),
            (_, None) => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        let port_str = rest.strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        if host.contains(':') {
            return None;
        }
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}

/// Splits `"dns.google (8.8.8.8)"` into its host and address parts.
fn split_host_and_ip(s: &str) -> Option<(&str, &str)> {
    let inner = s.strip_suffix(')')?;
    let (host, ip) = inner.split_once('(')?;
    Some((host.trim(), ip.trim()))
}

fn parse_endpoint(s: &str, default_port: u16) -> Option<SocketAddr> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Some(addr);
    }
    let bare = s.trim_start_matches('[').trim_end_matches(']');
    bare.parse::<IpAddr>()
        .ok()
        .map(|ip| SocketAddr::new(ip, default_port))
}

impl FromStr for NameServerAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DomainError::InvalidNameServer(s.to_string());

        if s.starts_with("https://") {
            return Self::from_url(s);
        }

        let (protocol, rest) = if let Some(rest) = s.strip_prefix("udp://") {
            (DnsTransportProtocol::Udp, rest)
        } else if let Some(rest) = s.strip_prefix("tcp://") {
            (DnsTransportProtocol::Tcp, rest)
        } else if let Some(rest) = s.strip_prefix("tls://") {
            (DnsTransportProtocol::Tls, rest)
        } else {
            (DnsTransportProtocol::Udp, s)
        };
        if rest.is_empty() {
            return Err(invalid());
        }
        let default_port = protocol.default_port();

        if let Some((host_part, ip_part)) = split_host_and_ip(rest) {
            let (host, port) = parse_host_port(host_part).unwrap_or((host_part, default_port));
            let ip = ip_part.parse::<IpAddr>().map_err(|_| invalid())?;
            if !is_domain_name_valid(host) {
                return Err(invalid());
            }
            return Ok(Self::new(host, Some(SocketAddr::new(ip, port)), protocol));
        }

        if let Some(endpoint) = parse_endpoint(rest, default_port) {
            return Ok(Self::new("", Some(endpoint), protocol));
        }

        let (host, port) = parse_host_port(rest).unwrap_or((rest, default_port));
        if host.is_empty() || !is_domain_name_valid(host) {
            return Err(invalid());
        }
        let mut server = Self::new(host.trim_end_matches('.'), None, protocol);
        server.port = port;
        Ok(server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_only_is_stale_with_default_port() {
        let server: NameServerAddress = "ns1.example.net".parse().unwrap();
        assert!(server.is_stale());
        assert_eq!(server.port(), 53);
        assert_eq!(server.host(), "ns1.example.net");
    }

    #[test]
    fn test_with_protocol_moves_default_port() {
        let server: NameServerAddress = "9.9.9.9".parse().unwrap();
        let tls = server.with_protocol(DnsTransportProtocol::Tls);
        assert_eq!(tls.port(), 853);
        assert_eq!(tls.endpoint(), Some("9.9.9.9:853".parse().unwrap()));

        let tcp = server.with_protocol(DnsTransportProtocol::Tcp);
        assert_eq!(tcp.port(), 53);
    }

    #[test]
    fn test_resolved_with_keeps_original_untouched() {
        let server = NameServerAddress::from_host("a.gtld-servers.net", DnsTransportProtocol::Udp);
        let resolved = server.resolved_with("192.5.6.30".parse().unwrap());

        assert!(server.is_stale());
        assert!(!resolved.is_stale());
        assert_eq!(resolved.endpoint(), Some("192.5.6.30:53".parse().unwrap()));
    }
}
