//! Database - opens the storage and log layers for one directory.

use std::sync::Arc;

use tracing::info;

use crate::common::{Result, StorageConfig};
use crate::recovery::LogManager;
use crate::storage::FileManager;

/// The file manager and log manager of one database directory.
///
/// Higher layers (a transaction manager, a buffer pool) are built on the two
/// handles exposed here.
pub struct Database {
    file_manager: Arc<FileManager>,
    log_manager: LogManager,
}

impl Database {
    /// Open (or create) the database described by `config`.
    ///
    /// # Errors
    /// Any failure creating the directory or reading the log aborts startup.
    pub fn open(config: StorageConfig) -> Result<Self> {
        let file_manager = Arc::new(FileManager::new(&config.db_dir, config.block_size)?);
        let log_manager = LogManager::new(Arc::clone(&file_manager), &config.log_file)?;

        info!(
            dir = %file_manager.db_dir().display(),
            is_new = file_manager.is_new(),
            latest_lsn = log_manager.latest_lsn(),
            "database.open"
        );

        Ok(Self {
            file_manager,
            log_manager,
        })
    }

    pub fn file_manager(&self) -> &Arc<FileManager> {
        &self.file_manager
    }

    pub fn log_manager(&self) -> &LogManager {
        &self.log_manager
    }

    /// Whether the directory was created by this open.
    pub fn is_new(&self) -> bool {
        self.file_manager.is_new()
    }
}
