//! Configuration module for drivesync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, environment overrides, validation, defaults, and a builder
//! pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable naming the local sync folder (overrides `sync.root`).
pub const SYNC_FOLDER_ENV: &str = "SYNC_FOLDER";

/// Environment variable naming the configuration directory.
pub const SYNC_CONFIG_ENV: &str = "SYNC_CONFIG";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for drivesync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub scan: ScanConfig,
    pub transfer: TransferConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
}

/// Which folders are compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Local folder to reconcile.
    pub root: PathBuf,
    /// Drive container ID the local folder corresponds to (`root` for My Drive).
    pub remote_root: String,
}

/// How local directories are matched to remote containers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalLookup {
    /// List each mapped container once and answer lookups from that index.
    #[default]
    Prefetch,
    /// One name query per local file and subdirectory.
    PerEntry,
}

impl std::str::FromStr for LocalLookup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefetch" => Ok(LocalLookup::Prefetch),
            "per_entry" | "per-entry" => Ok(LocalLookup::PerEntry),
            other => Err(format!("unknown lookup strategy '{other}'")),
        }
    }
}

impl std::fmt::Display for LocalLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalLookup::Prefetch => write!(f, "prefetch"),
            LocalLookup::PerEntry => write!(f, "per_entry"),
        }
    }
}

/// Scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub local_lookup: LocalLookup,
    /// Items requested per listing page (Drive accepts 1..=1000).
    pub page_size: u32,
}

/// Transfer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Size of each ranged download request (in MiB).
    pub download_chunk_size_mb: u64,
    /// Size of each resumable upload chunk (in MiB).
    pub upload_chunk_size_mb: u64,
    /// Format native documents are exported to when downloaded.
    pub export_mime_type: String,
}

impl TransferConfig {
    pub fn download_chunk_bytes(&self) -> u64 {
        self.download_chunk_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn upload_chunk_bytes(&self) -> u64 {
        self.upload_chunk_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

/// Credential location. Obtaining and refreshing tokens is out of scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// File holding a bearer access token. `None` means `<config dir>/token.json`.
    pub token_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Directory holding the configuration and token files.
    ///
    /// `$SYNC_CONFIG` when set, otherwise `$XDG_CONFIG_HOME/drivesync`.
    pub fn config_dir() -> PathBuf {
        match std::env::var_os(SYNC_CONFIG_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("~/.config"))
                .join("drivesync"),
        }
    }

    /// Platform-appropriate default path for the configuration file.
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Apply environment overrides (`SYNC_FOLDER`).
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        let folder = std::env::var(SYNC_FOLDER_ENV).ok();
        self.with_sync_folder(folder)
    }

    fn with_sync_folder(mut self, folder: Option<String>) -> Self {
        if let Some(folder) = folder.filter(|f| !f.is_empty()) {
            self.sync.root = PathBuf::from(folder);
        }
        self
    }

    /// `sync.root` with a leading `~` expanded to the home directory.
    pub fn sync_root(&self) -> PathBuf {
        expand_tilde(&self.sync.root)
    }

    /// Token file location, defaulting to `token.json` in the config directory.
    pub fn token_file(&self) -> PathBuf {
        match &self.auth.token_file {
            Some(path) => expand_tilde(path),
            None => Self::config_dir().join("token.json"),
        }
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("Drive"),
            remote_root: "root".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            local_lookup: LocalLookup::Prefetch,
            page_size: 100,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            download_chunk_size_mb: 4,
            upload_chunk_size_mb: 4,
            export_mime_type: "application/pdf".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"scan.page_size"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Largest page Drive will return.
const MAX_PAGE_SIZE: u32 = 1000;

/// Largest transfer chunk, in MiB.
const MAX_CHUNK_SIZE_MB: u64 = 1024;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        let root_str = self.sync.root.to_string_lossy();
        if !root_str.starts_with('~') && !self.sync.root.exists() {
            errors.push(ValidationError {
                field: "sync.root".into(),
                message: format!("directory does not exist: {}", self.sync.root.display()),
            });
        }
        if crate::domain::RemoteId::new(self.sync.remote_root.clone()).is_err() {
            errors.push(ValidationError {
                field: "sync.remote_root".into(),
                message: format!("not a valid Drive ID: '{}'", self.sync.remote_root),
            });
        }

        // --- scan ---
        if self.scan.page_size == 0 || self.scan.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError {
                field: "scan.page_size".into(),
                message: format!("must be in range 1..={MAX_PAGE_SIZE}"),
            });
        }

        // --- transfer ---
        if self.transfer.download_chunk_size_mb == 0
            || self.transfer.download_chunk_size_mb > MAX_CHUNK_SIZE_MB
        {
            errors.push(ValidationError {
                field: "transfer.download_chunk_size_mb".into(),
                message: format!("must be in range 1..={MAX_CHUNK_SIZE_MB}"),
            });
        }
        if self.transfer.upload_chunk_size_mb == 0
            || self.transfer.upload_chunk_size_mb > MAX_CHUNK_SIZE_MB
        {
            errors.push(ValidationError {
                field: "transfer.upload_chunk_size_mb".into(),
                message: format!("must be in range 1..={MAX_CHUNK_SIZE_MB}"),
            });
        }
        if !self.transfer.export_mime_type.contains('/') {
            errors.push(ValidationError {
                field: "transfer.export_mime_type".into(),
                message: format!(
                    "not a MIME type: '{}'",
                    self.transfer.export_mime_type
                ),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use drivesync_core::config::{ConfigBuilder, LocalLookup};
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .sync_root(PathBuf::from("/home/user/Drive"))
///     .scan_local_lookup(LocalLookup::PerEntry)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sync ---

    pub fn sync_root(mut self, root: PathBuf) -> Self {
        self.config.sync.root = root;
        self
    }

    pub fn sync_remote_root(mut self, id: impl Into<String>) -> Self {
        self.config.sync.remote_root = id.into();
        self
    }

    // --- scan ---

    pub fn scan_local_lookup(mut self, lookup: LocalLookup) -> Self {
        self.config.scan.local_lookup = lookup;
        self
    }

    pub fn scan_page_size(mut self, size: u32) -> Self {
        self.config.scan.page_size = size;
        self
    }

    // --- transfer ---

    pub fn transfer_download_chunk_size_mb(mut self, mb: u64) -> Self {
        self.config.transfer.download_chunk_size_mb = mb;
        self
    }

    pub fn transfer_upload_chunk_size_mb(mut self, mb: u64) -> Self {
        self.config.transfer.upload_chunk_size_mb = mb;
        self
    }

    pub fn transfer_export_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.config.transfer.export_mime_type = mime.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- auth ---

    pub fn auth_token_file(mut self, path: PathBuf) -> Self {
        self.config.auth.token_file = Some(path);
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
