use ferrous_resolver_domain::{DomainError, NameServerAddress};
use std::net::IpAddr;
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, warn};

/// Reads the name servers the operating system resolver is configured with
/// (`nameserver` lines of /etc/resolv.conf).
pub struct ResolvConfReader {
    path: String,
}

impl ResolvConfReader {
    pub fn new() -> Self {
        Self {
            path: "/etc/resolv.conf".to_string(),
        }
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Configured servers in file order; with `prefer_ipv6` IPv6 entries
    /// come first.
    pub async fn name_servers(&self, prefer_ipv6: bool) -> Result<Vec<NameServerAddress>, DomainError> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::ConfigError(format!("Failed to read {}: {}", self.path, e))
        })?;

        let mut servers = parse_name_servers(&content);
        if servers.is_empty() {
            return Err(DomainError::ConfigError(format!(
                "No name servers configured in {}",
                self.path
            )));
        }
        if prefer_ipv6 {
            NameServerAddress::sort_by_family(&mut servers);
        }

        debug!(path = %self.path, servers = servers.len(), "System name servers loaded");
        Ok(servers)
    }
}

impl Default for ResolvConfReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_name_servers(content: &str) -> Vec<NameServerAddress> {
    let mut servers = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let mut fields = line.split_whitespace();
        if fields.next() != Some("nameserver") {
            continue;
        }
        let Some(value) = fields.next() else {
            continue;
        };

        // Link-local IPv6 entries may carry a zone, e.g. fe80::1%eth0
        let address = value.split('%').next().unwrap_or(value);
        match IpAddr::from_str(address) {
            Ok(ip) => servers.push(NameServerAddress::from_ip(ip)),
            Err(e) => warn!(error = %e, value = value, "Invalid nameserver entry"),
        }
    }

    servers
}
