//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::AppConfig;
use crate::cli::Cli;

/// Resolve configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<AppConfig> {
    resolve_configuration(cli, |key| std::env::var(key).ok())
}

/// Same hierarchy with an explicit environment lookup
pub fn resolve_configuration<F>(cli: &Cli, env: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    // Steps 1 and 2: defaults, then the config file if one applies
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config file")?;

    // Step 3: environment overrides
    let env_overrides = config
        .apply_env_from(env)
        .context("Invalid environment override")?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    // Step 4: CLI overrides
    let cli_overrides = apply_cli_overrides(&mut config, cli);
    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) -> usize {
    let mut applied = 0;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
        applied += 1;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
        applied += 1;
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
        applied += 1;
    }
    applied
}

/// Registry snapshot path: `--state`, else `<output_dir>/registry.json`
pub fn state_path(cli: &Cli, config: &AppConfig) -> PathBuf {
    cli.state.clone().unwrap_or_else(|| config.state_file())
}
