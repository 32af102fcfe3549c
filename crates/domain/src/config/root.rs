use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::resolver::{ResolutionMode, ResolverConfig};
use crate::dns_protocol::NameServerAddress;

/// Main configuration structure for Ferrous Resolver
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-resolver.toml in current directory
    /// 3. /etc/ferrous-resolver/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(servers) = overrides.servers {
            if !servers.is_empty() {
                self.resolver.servers = servers;
                self.resolver.mode = ResolutionMode::Stub;
            }
        }
        if let Some(mode) = overrides.mode {
            self.resolver.mode = mode;
        }
        if overrides.prefer_ipv6 {
            self.resolver.prefer_ipv6 = true;
        }
        if let Some(retries) = overrides.retries {
            self.resolver.retries = retries;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.resolver.timeout_ms = timeout_ms;
        }
        if let Some(threads) = overrides.threads {
            self.resolver.threads = threads;
        }
        if let Some(depth) = overrides.max_stack_depth {
            self.resolver.max_stack_depth = depth;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let resolver = &self.resolver;

        if resolver.retries == 0 {
            return Err(ConfigError::Validation(
                "retries must be at least 1".to_string(),
            ));
        }
        if resolver.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        if resolver.threads == 0 {
            return Err(ConfigError::Validation(
                "threads must be at least 1".to_string(),
            ));
        }
        if resolver.max_stack_depth == 0 {
            return Err(ConfigError::Validation(
                "max_stack_depth must be at least 1".to_string(),
            ));
        }
        if resolver.mode == ResolutionMode::Stub && resolver.servers.is_empty() {
            return Err(ConfigError::Validation(
                "stub mode requires at least one server".to_string(),
            ));
        }

        for server in &resolver.servers {
            server.parse::<NameServerAddress>().map_err(|e| {
                ConfigError::Validation(format!("Invalid server '{}': {}", server, e))
            })?;
        }
        if let Some(proxy) = &resolver.proxy {
            proxy.parse::<NameServerAddress>().map_err(|e| {
                ConfigError::Validation(format!("Invalid proxy '{}': {}", proxy, e))
            })?;
        }

        Ok(())
    }

    /// Parsed form of `resolver.servers`.
    pub fn name_servers(&self) -> Result<Vec<NameServerAddress>, ConfigError> {
        self.resolver
            .servers
            .iter()
            .map(|s| {
                s.parse::<NameServerAddress>().map_err(|e| {
                    ConfigError::Validation(format!("Invalid server '{}': {}", s, e))
                })
            })
            .collect()
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new("ferrous-resolver.toml").exists() {
            Some("ferrous-resolver.toml".to_string())
        } else if std::path::Path::new("/etc/ferrous-resolver/config.toml").exists() {
            Some("/etc/ferrous-resolver/config.toml".to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub servers: Option<Vec<String>>,
    pub mode: Option<ResolutionMode>,
    pub prefer_ipv6: bool,
    pub retries: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub threads: Option<usize>,
    pub max_stack_depth: Option<usize>,
    pub log_level: Option<String>,
}
