use clap::Parser;
use ferrous_resolver_application::services::reverse_domain;
use ferrous_resolver_domain::{
    validate_domain_name, CliOverrides, DnsQuestion, ResolutionMode, RecordType,
};
use hickory_proto::op::ResponseCode;
use std::net::IpAddr;
use std::process::ExitCode;
use tracing::{debug, error, info};

mod bootstrap;
mod di;
mod output;

#[derive(Parser)]
#[command(name = "ferrous-resolve")]
#[command(version = "0.1.0")]
#[command(about = "Ferrous Resolver - recursive and stub DNS lookups")]
struct Cli {
    /// Name to look up (an IP address for PTR)
    name: String,

    /// Record type
    #[arg(default_value = "A")]
    record_type: String,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Name server to query instead of resolving from the root (repeatable)
    #[arg(short = 's', long = "server", value_name = "ADDR")]
    servers: Vec<String>,

    /// Resolve from the root servers
    #[arg(long, conflicts_with_all = ["servers", "system"])]
    recursive: bool,

    /// Forward to the servers of /etc/resolv.conf
    #[arg(long, conflicts_with = "servers")]
    system: bool,

    /// Prefer IPv6 name servers and addresses
    #[arg(short = '6', long)]
    prefer_ipv6: bool,

    /// Attempts per name server
    #[arg(long)]
    retries: Option<u32>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Name servers queried concurrently
    #[arg(long)]
    threads: Option<usize>,

    /// Limit on nested name server lookups
    #[arg(long)]
    max_stack_depth: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let mode = if self.recursive {
            Some(ResolutionMode::Recursive)
        } else if self.system {
            Some(ResolutionMode::System)
        } else {
            None
        };

        CliOverrides {
            servers: (!self.servers.is_empty()).then(|| self.servers.clone()),
            mode,
            prefer_ipv6: self.prefer_ipv6,
            retries: self.retries,
            timeout_ms: self.timeout,
            threads: self.threads,
            max_stack_depth: self.max_stack_depth,
            log_level: self.log_level.clone(),
        }
    }
}

/// Question for `name`; PTR lookups of an IP address ask for its reverse name.
fn build_question(name: &str, record_type: RecordType) -> anyhow::Result<DnsQuestion> {
    let name = match (record_type, name.parse::<IpAddr>()) {
        (RecordType::PTR, Ok(ip)) => reverse_domain(&ip),
        _ => {
            validate_domain_name(name)?;
            name.to_string()
        }
    };
    Ok(DnsQuestion::new(name, record_type))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);

    let record_type: RecordType = cli
        .record_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let question = build_question(&cli.name, record_type)?;

    info!(mode = %config.resolver.mode, question = %question, "Starting lookup");
    let resolver = di::build_resolver(&config).await?;

    let response = match resolver.resolve(&question).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Lookup failed");
            return Err(e.into());
        }
    };
    debug!(server = ?response.server_label(), "Lookup complete");

    print!("{}", output::render(&response));

    Ok(match response.response_code() {
        ResponseCode::NoError | ResponseCode::NXDomain => ExitCode::SUCCESS,
        _ => ExitCode::from(2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ptr_of_ip_uses_reverse_name() {
        let question = build_question("192.0.2.80", RecordType::PTR).unwrap();
        assert_eq!(question.name, "80.2.0.192.in-addr.arpa");
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        assert!(build_question("bad..name", RecordType::A).is_err());
    }

    #[test]
    fn test_servers_force_stub_overrides() {
        let cli = Cli::parse_from(["ferrous-resolve", "-s", "192.0.2.53", "example.test", "MX"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.servers, Some(vec!["192.0.2.53".to_string()]));
        assert_eq!(overrides.mode, None);
        assert_eq!(cli.record_type, "MX");
    }

    #[test]
    fn test_recursive_conflicts_with_servers() {
        let parsed = Cli::try_parse_from(["ferrous-resolve", "--recursive", "-s", "192.0.2.53", "a.test"]);
        assert!(parsed.is_err());
    }
}
