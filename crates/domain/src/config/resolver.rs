use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where answers come from when no explicit server list overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Forward to the configured servers.
    Stub,
    /// Walk the delegation tree from the root servers.
    #[default]
    Recursive,
    /// Forward to the servers listed in the system resolver configuration.
    System,
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionMode::Stub => f.write_str("stub"),
            ResolutionMode::Recursive => f.write_str("recursive"),
            ResolutionMode::System => f.write_str("system"),
        }
    }
}

impl FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stub" => Ok(ResolutionMode::Stub),
            "recursive" => Ok(ResolutionMode::Recursive),
            "system" => Ok(ResolutionMode::System),
            _ => Err(format!("Unknown resolution mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub servers: Vec<String>,

    #[serde(default)]
    pub mode: ResolutionMode,

    #[serde(default)]
    pub prefer_ipv6: bool,

    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_threads")]
    pub threads: usize,

    #[serde(default = "default_max_stack_depth")]
    pub max_stack_depth: usize,

    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            mode: ResolutionMode::default(),
            prefer_ipv6: false,
            retries: default_retries(),
            timeout_ms: default_timeout_ms(),
            threads: default_threads(),
            max_stack_depth: default_max_stack_depth(),
            proxy: None,
        }
    }
}

fn default_retries() -> u32 {
    2
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_threads() -> usize {
    2
}

fn default_max_stack_depth() -> usize {
    10
}
