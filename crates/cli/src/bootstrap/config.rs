use ferrous_resolver_domain::{CliOverrides, Config};

/// Loads the configuration file (if any), applies the command line on top
/// and validates the result.
pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}
