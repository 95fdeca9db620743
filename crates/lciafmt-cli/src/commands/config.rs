//! `config` subcommands

use anyhow::Context;
use lciafmt_core::config::config_schema;
use lciafmt_core::{ConfigLoader, LciaConfig, LciaError};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::ConfigFormat;
use crate::output;

/// Config init command implementation
pub fn init_command(format: ConfigFormat, force: bool) -> anyhow::Result<()> {
    debug!("Initializing configuration file with format: {:?}", format);

    let filename = match format {
        ConfigFormat::Json => ".lciafmtrc.json",
        ConfigFormat::Toml => ".lciafmtrc.toml",
        ConfigFormat::Yaml => "lciafmt.yaml",
    };
    let config_path = PathBuf::from(filename);

    if config_path.exists() && !force {
        error!(
            "Configuration file '{}' already exists. Use --force to overwrite.",
            filename
        );
        return Err(LciaError::config_error(format!(
            "Configuration file '{filename}' already exists"
        ))
        .into());
    }

    let content = LciaConfig::example().to_string_for(&config_path)?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write '{filename}'"))?;

    output::print_success(&format!("Created configuration file: {filename}"));
    println!("   Edit the file to customize mapping, collapsing and export.");
    Ok(())
}

/// Config validate command implementation
pub fn validate_command(path: Option<&Path>) -> anyhow::Result<()> {
    debug!("Validating configuration file: {:?}", path);

    let config = match path {
        Some(p) => ConfigLoader::load_from_file(p),
        None => ConfigLoader::load(None, None),
    }
    .and_then(|config| config.validate().map(|_| config));

    match config {
        Ok(config) => {
            output::print_success("Configuration is valid");
            println!("   Duplicate policy: {}", config.duplicate_policy());
            println!("   Write flows: {}", config.write_flows());
            Ok(())
        }
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Config show command implementation
pub fn show_command(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = ConfigLoader::load(config_path, None)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub fn schema_command() -> anyhow::Result<()> {
    println!("{}", config_schema()?);
    Ok(())
}
