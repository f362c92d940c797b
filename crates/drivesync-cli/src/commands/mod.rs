//! CLI subcommands
//!
//! Every command takes the [`GlobalArgs`] parsed from the top-level flags and
//! returns `anyhow::Result<()>`.

pub mod config;
pub mod find;
pub mod menu;
pub mod resolve;
pub mod scan;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::debug;

use drivesync_core::config::Config;
use drivesync_core::usecases::TransferObserver;

use crate::app::App;
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Flags shared by every subcommand
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub format: OutputFormat,
    pub quiet: bool,
    /// `--config`; the default location is used when absent
    pub config_path: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(Config::default_path)
    }

    /// Loads the configuration file, with environment overrides applied
    ///
    /// An explicit `--config` must exist and parse; the default location
    /// falls back to built-in defaults.
    pub fn load_config(&self) -> Result<Config> {
        let config = match &self.config_path {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load_or_default(&Config::default_path()),
        };
        Ok(config.with_env_overrides())
    }

    pub fn load_config_or_default(&self) -> Config {
        Config::load_or_default(&self.config_file()).with_env_overrides()
    }

    /// Loads the configuration, rejects invalid settings, then connects to Drive
    pub fn connect(&self) -> Result<App> {
        App::connect(self.load_valid_config()?)
    }

    fn load_valid_config(&self) -> Result<Config> {
        let config = self.load_config()?;
        let errors = config.validate();
        if !errors.is_empty() {
            let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("Invalid configuration: {}", details.join("; "));
        }
        Ok(config)
    }
}

/// Logs transfer progress in whole percent
pub fn progress_observer() -> TransferObserver {
    Arc::new(|path, fraction| {
        debug!(path = %path, percent = (fraction * 100.0).round() as u32, "Transfer progress");
    })
}
