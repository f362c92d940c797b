//! Config command - View and validate drivesync configuration
//!
//! Provides the `drivesync config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Validates the configuration file and reports every error found

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use drivesync_core::config::Config;

use super::GlobalArgs;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, args: &GlobalArgs) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(args),
            ConfigCommand::Validate => execute_validate(args),
        }
    }
}

fn execute_show(args: &GlobalArgs) -> Result<()> {
    let formatter = args.formatter();
    let config_path = args.config_file();
    let config = args.load_config()?;

    info!(config_path = %config_path.display(), "Showing configuration");

    if args.format.is_json() {
        let json =
            serde_json::to_value(&config).context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
    } else {
        formatter.success(&format!("Configuration ({})", config_path.display()));
        formatter.info("");

        let yaml =
            serde_yaml::to_string(&config).context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            formatter.info(line);
        }
    }
    Ok(())
}

fn execute_validate(args: &GlobalArgs) -> Result<()> {
    let formatter = args.formatter();
    let config_path = args.config_file();
    let check = check_file(&config_path);

    info!(config_path = %config_path.display(), valid = check.valid, "Validated configuration");

    if args.format.is_json() {
        formatter.print_json(&serde_json::json!({
            "valid": check.valid,
            "found": check.found,
            "config_path": config_path.display().to_string(),
            "errors": check.errors,
        }));
    } else if !check.found {
        formatter.info(&format!(
            "Configuration file not found at {}",
            config_path.display()
        ));
        formatter.info("Using default configuration.");
    } else if check.valid {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", config_path.display()));
    } else {
        formatter.error(&format!(
            "Configuration has {} error{}:",
            check.errors.len(),
            if check.errors.len() == 1 { "" } else { "s" }
        ));
        formatter.info(&format!("File: {}", config_path.display()));
        for error in &check.errors {
            formatter.info(&format!("  {error}"));
        }
    }
    Ok(())
}

#[derive(Debug)]
struct FileCheck {
    found: bool,
    valid: bool,
    errors: Vec<String>,
}

/// Loads `path` without falling back to defaults and collects every problem
fn check_file(path: &Path) -> FileCheck {
    if !path.exists() {
        return FileCheck {
            found: false,
            valid: false,
            errors: vec!["Configuration file not found. Using defaults.".to_string()],
        };
    }

    let errors = match Config::load(path) {
        Ok(config) => config
            .with_env_overrides()
            .validate()
            .iter()
            .map(ToString::to_string)
            .collect(),
        Err(e) => vec![format!("Failed to parse configuration: {e}")],
    };
    FileCheck {
        found: true,
        valid: errors.is_empty(),
        errors,
    }
}
