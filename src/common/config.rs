//! Configuration constants and storage settings for StrataDB.

use std::path::{Path, PathBuf};

/// Width in bytes of every encoded integer and length prefix.
pub const INT_SIZE: usize = 8;

/// Default size of a block in bytes (4KB).
///
/// Matches the OS page size on most systems. The block size is fixed for the
/// lifetime of a [`FileManager`](crate::storage::FileManager) and must be the
/// same for every process that opens the same directory.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Smallest usable block size: a log block needs its boundary field plus the
/// length prefix of at least one (empty) record.
pub const MIN_BLOCK_SIZE: usize = 2 * INT_SIZE;

/// Files in the database directory starting with this prefix are scratch
/// files and are deleted when an existing directory is reopened.
pub const TEMP_FILE_PREFIX: &str = "temp";

/// Name of the write-ahead log file inside the database directory.
pub const DEFAULT_LOG_FILE: &str = "stratadb.log";

/// Settings needed to open a database directory.
///
/// # Example
/// ```
/// use stratadb::StorageConfig;
///
/// let config = StorageConfig::new("/tmp/db").with_block_size(400);
/// assert_eq!(config.block_size, 400);
/// assert_eq!(config.log_file, "stratadb.log");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding every file of the database.
    pub db_dir: PathBuf,
    /// Size of a block in bytes.
    pub block_size: usize,
    /// Name of the log file inside `db_dir`.
    pub log_file: String,
}

impl StorageConfig {
    /// Settings for `db_dir` with the default block size and log file name.
    pub fn new<P: AsRef<Path>>(db_dir: P) -> Self {
        Self {
            db_dir: db_dir.as_ref().to_path_buf(),
            block_size: DEFAULT_BLOCK_SIZE,
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_log_file(mut self, log_file: impl Into<String>) -> Self {
        self.log_file = log_file.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_block_size_is_power_of_two() {
        assert!(DEFAULT_BLOCK_SIZE.is_power_of_two());
        assert!(DEFAULT_BLOCK_SIZE >= MIN_BLOCK_SIZE);
    }

    #[test]
    fn test_storage_config_builders() {
        let config = StorageConfig::new("db")
            .with_block_size(512)
            .with_log_file("wal");

        assert_eq!(config.db_dir, PathBuf::from("db"));
        assert_eq!(config.block_size, 512);
        assert_eq!(config.log_file, "wal");
    }
}
