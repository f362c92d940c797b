//! Wiring of the scan engine and resolvers from configuration

use std::sync::Arc;

use anyhow::{Context, Result};

use drivesync_core::config::{Config, LocalLookup};
use drivesync_core::domain::newtypes::{RemoteId, SyncPath};
use drivesync_core::ports::{ILocalFileSystem, IRemoteStore};
use drivesync_core::usecases::ResolveEntryUseCase;
use drivesync_gdrive::client::DriveClient;
use drivesync_gdrive::provider::DriveRemoteStore;
use drivesync_sync::engine::ScanEngine;
use drivesync_sync::filesystem::LocalFileSystemAdapter;

use crate::credentials;

/// Adapters and roots shared by every command of one invocation
pub struct App {
    pub config: Config,
    pub remote: Arc<dyn IRemoteStore>,
    pub local: Arc<dyn ILocalFileSystem>,
    pub sync_root: SyncPath,
    pub remote_root: RemoteId,
}

impl App {
    /// Builds the Drive adapter with the access token from the environment or token file
    pub fn connect(config: Config) -> Result<Self> {
        let token = credentials::access_token(&config)?;
        let client = DriveClient::new(token).with_page_size(config.scan.page_size);
        let remote: Arc<dyn IRemoteStore> =
            Arc::new(DriveRemoteStore::from_config(client, &config.transfer));
        Self::with_remote(config, remote)
    }

    pub fn with_remote(config: Config, remote: Arc<dyn IRemoteStore>) -> Result<Self> {
        let sync_root = SyncPath::new(config.sync_root())
            .with_context(|| format!("Invalid sync folder {}", config.sync.root.display()))?;
        let remote_root = RemoteId::new(config.sync.remote_root.clone())
            .context("Invalid remote root id")?;

        Ok(Self {
            config,
            remote,
            local: Arc::new(LocalFileSystemAdapter::new()),
            sync_root,
            remote_root,
        })
    }

    /// Replaces the remote root for this invocation
    pub fn with_remote_root(mut self, id: Option<String>) -> Result<Self> {
        if let Some(id) = id {
            self.remote_root = RemoteId::new(id).context("Invalid remote root id")?;
        }
        Ok(self)
    }

    pub fn scan_engine(&self, lookup: Option<LocalLookup>) -> ScanEngine {
        ScanEngine::new(
            Arc::clone(&self.remote),
            Arc::clone(&self.local),
            lookup.unwrap_or(self.config.scan.local_lookup),
        )
    }

    pub fn resolver(&self) -> ResolveEntryUseCase {
        ResolveEntryUseCase::new(
            Arc::clone(&self.remote),
            Arc::clone(&self.local),
            self.sync_root.clone(),
            self.config.transfer.export_mime_type.clone(),
        )
    }
}
