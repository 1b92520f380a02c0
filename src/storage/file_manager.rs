//! File Manager - block-granular file I/O for the database directory.
//!
//! The [`FileManager`] handles all direct file operations:
//! - Reading and writing blocks
//! - Extending files with zeroed blocks
//! - Cleaning up stale temporary files at startup

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::common::config::{MIN_BLOCK_SIZE, TEMP_FILE_PREFIX};
use crate::common::{BlockId, Error, Result};
use crate::storage::{IoStats, Page};

/// Maps [`BlockId`]s to byte ranges of files inside one database directory.
///
/// # File Layout
/// Every file is a flat sequence of fixed-size blocks with no header:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │ Block 2 │  ...    │ Block N │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0        B        2B      ...       N×B
/// ```
/// where `B` is the block size given at construction.
///
/// # Thread Safety
/// File handles are opened once and cached in a table keyed by file name.
/// The table lock is held only while looking up (or opening) a handle; the
/// I/O itself runs under a per-file lock. Operations on unrelated files
/// proceed in parallel, while reads, writes, size queries and appends on the
/// same file are mutually exclusive. `append` computes the new block number
/// and extends the file under that one lock, so two appenders can never
/// claim the same block.
///
/// # Durability
/// Every `write` and `append` is followed by `sync_data()`.
pub struct FileManager {
    db_dir: PathBuf,
    block_size: usize,
    /// Whether `db_dir` was created by this manager.
    is_new: bool,
    /// Open handles, one per file, closed when the manager drops.
    open_files: Mutex<HashMap<String, Arc<Mutex<File>>>>,
    stats: IoStats,
}

impl FileManager {
    /// Open the database directory `db_dir`, creating it if needed.
    ///
    /// When the directory already exists, every regular file in it whose name
    /// starts with [`TEMP_FILE_PREFIX`] is deleted.
    ///
    /// # Errors
    /// - `Error::InvalidBlockSize` if `block_size < MIN_BLOCK_SIZE`
    /// - I/O errors creating the directory or removing temp files
    pub fn new<P: AsRef<Path>>(db_dir: P, block_size: usize) -> Result<Self> {
        if block_size < MIN_BLOCK_SIZE {
            return Err(Error::InvalidBlockSize(block_size));
        }

        let db_dir = db_dir.as_ref().to_path_buf();
        let is_new = !db_dir.exists();
        if is_new {
            fs::create_dir_all(&db_dir)?;
        } else {
            remove_temp_files(&db_dir)?;
        }

        info!(
            dir = %db_dir.display(),
            block_size,
            is_new,
            "file_manager.open"
        );

        Ok(Self {
            db_dir,
            block_size,
            is_new,
            open_files: Mutex::new(HashMap::new()),
            stats: IoStats::new(),
        })
    }

    /// Read a block from disk into `page`.
    ///
    /// # Errors
    /// - `Error::BlockNotFound` if the block extends past end-of-file
    /// - `Error::BlockSizeMismatch` if `page` is not block-sized
    pub fn read(&self, blk: &BlockId, page: &mut Page) -> Result<()> {
        self.check_page(page)?;
        let offset = self.offset(blk)?;

        let handle = self.file(blk.file_name())?;
        let mut file = handle.lock();

        let len = file.metadata()?.len();
        if offset.saturating_add(self.block_size as u64) > len {
            return Err(Error::BlockNotFound(blk.clone()));
        }

        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(page.as_mut_slice())?;
        self.stats.record_read();

        Ok(())
    }

    /// Write `page` to the block's position on disk.
    ///
    /// Writing past the end of the file extends it.
    ///
    /// # Errors
    /// Returns `Error::BlockSizeMismatch` if `page` is not block-sized.
    pub fn write(&self, blk: &BlockId, page: &Page) -> Result<()> {
        self.check_page(page)?;
        let offset = self.offset(blk)?;

        let handle = self.file(blk.file_name())?;
        let mut file = handle.lock();

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(page.as_slice())?;
        file.sync_data()?;
        self.stats.record_write();

        Ok(())
    }

    /// Number of whole blocks in `file_name`.
    ///
    /// The file is created empty if it does not exist yet.
    pub fn size(&self, file_name: &str) -> Result<u64> {
        let handle = self.file(file_name)?;
        let file = handle.lock();
        Ok(file.metadata()?.len() / self.block_size as u64)
    }

    /// Extend `file_name` by one zeroed block and return its id.
    pub fn append(&self, file_name: &str) -> Result<BlockId> {
        let handle = self.file(file_name)?;
        let mut file = handle.lock();

        let number = file.metadata()?.len() / self.block_size as u64;
        let blk = BlockId::new(file_name, number);

        file.seek(SeekFrom::Start(self.offset(&blk)?))?;
        file.write_all(&vec![0u8; self.block_size])?;
        file.sync_data()?;
        self.stats.record_append();

        debug!(block = %blk, "file_manager.append");
        Ok(blk)
    }

    /// Size of every block managed here, in bytes.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Whether the database directory was created by this manager.
    #[inline]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    #[inline]
    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }

    /// I/O counters for this manager.
    #[inline]
    pub fn stats(&self) -> &IoStats {
        &self.stats
    }

    /// Cached handle for `file_name`, opening (and creating) it on first use.
    fn file(&self, file_name: &str) -> Result<Arc<Mutex<File>>> {
        let mut open_files = self.open_files.lock();
        if let Some(handle) = open_files.get(file_name) {
            return Ok(Arc::clone(handle));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.db_dir.join(file_name))?;
        let handle = Arc::new(Mutex::new(file));
        open_files.insert(file_name.to_string(), Arc::clone(&handle));

        Ok(handle)
    }

    fn offset(&self, blk: &BlockId) -> Result<u64> {
        blk.number()
            .checked_mul(self.block_size as u64)
            .ok_or_else(|| Error::BlockNotFound(blk.clone()))
    }

    fn check_page(&self, page: &Page) -> Result<()> {
        if page.len() != self.block_size {
            return Err(Error::BlockSizeMismatch {
                expected: self.block_size,
                actual: page.len(),
            });
        }
        Ok(())
    }
}

/// Delete leftover scratch files from an earlier run.
fn remove_temp_files(db_dir: &Path) -> Result<()> {
    for entry in fs::read_dir(db_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(TEMP_FILE_PREFIX) {
            let path = entry.path();
            fs::remove_file(&path)?;
            debug!(file = %path.display(), "file_manager.remove_temp");
        }
    }
    Ok(())
}
