//! Log Manager - the append side of the write-ahead log.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::common::config::INT_SIZE;
use crate::common::{BlockId, Error, Result};
use crate::recovery::LogIterator;
use crate::storage::{FileManager, Page};

/// Log sequence number. The first record ever appended gets LSN 1.
pub type Lsn = u64;

/// Appends variable-length records to a single log file.
///
/// # Block Format
/// ```text
/// 0        8             boundary                               block_size
/// ┌────────┬──────────────┬──────────┬──────────┬──────────┬──────┐
/// │boundary│   (unused)   │ record k │   ...    │ record 2 │ rec 1│
/// └────────┴──────────────┴──────────┴──────────┴──────────┴──────┘
/// ```
/// Records are packed from the end of the block toward the front, each as a
/// length-prefixed byte array. The boundary field at offset 0 holds the start
/// of the most recently written record, or `block_size` for an empty block.
/// Reading forward from the boundary therefore yields the block's records
/// newest-first.
///
/// # Buffering
/// The tail block lives in an in-memory [`Page`]. It reaches disk when the
/// block fills up, on [`flush`](Self::flush) / [`flush_to`](Self::flush_to),
/// and before an [`iterator`](Self::iterator) is handed out.
///
/// # Thread Safety
/// The tail page, current block and LSN counters sit behind one mutex, so an
/// append (space check, possible rotation, write, LSN bump) is atomic and
/// LSNs are assigned without gaps or duplicates.
///
/// # Restart
/// On reopen the last block becomes the tail again, and the LSN counter
/// resumes at the number of records already in the log.
pub struct LogManager {
    file_manager: Arc<FileManager>,
    log_file: String,
    state: Mutex<LogState>,
}

struct LogState {
    /// Write buffer for the tail block.
    page: Page,
    current_block: BlockId,
    /// Last LSN handed out.
    latest_lsn: Lsn,
    /// Highest LSN a caller has forced to disk with `flush_to`.
    last_saved_lsn: Lsn,
}

impl LogManager {
    /// Open the log stored in `log_file`, creating it if it is empty.
    ///
    /// Reopening an existing log scans every record to resume the LSN
    /// counter, so startup time grows with the size of the log.
    ///
    /// # Errors
    /// - I/O errors reading or extending the log file
    /// - `Error::CorruptLogBlock` if an existing block has an impossible boundary
    pub fn new(file_manager: Arc<FileManager>, log_file: &str) -> Result<Self> {
        let mut page = Page::new(file_manager.block_size());
        let log_size = file_manager.size(log_file)?;

        let (current_block, latest_lsn) = if log_size == 0 {
            let blk = append_new_block(&file_manager, log_file, &mut page)?;
            info!(block = %blk, "log_manager.create");
            (blk, 0)
        } else {
            let blk = BlockId::new(log_file, log_size - 1);
            file_manager.read(&blk, &mut page)?;
            let boundary = read_boundary(&page, &blk)?;
            page.set_int(0, boundary as u64)?;

            let mut records = 0;
            for record in LogIterator::new(Arc::clone(&file_manager), blk.clone())? {
                record?;
                records += 1;
            }
            info!(block = %blk, records, "log_manager.resume");
            (blk, records)
        };

        Ok(Self {
            file_manager,
            log_file: log_file.to_string(),
            state: Mutex::new(LogState {
                page,
                current_block,
                latest_lsn,
                last_saved_lsn: latest_lsn,
            }),
        })
    }

    /// Append `record` to the log and return its LSN.
    ///
    /// If the tail block cannot hold the record, it is written out and a fresh
    /// block is appended to the log file first.
    ///
    /// # Errors
    /// - `Error::RecordTooLarge` if the record cannot fit in an empty block
    /// - I/O errors from flushing or extending the log
    pub fn append(&self, record: &[u8]) -> Result<Lsn> {
        let block_size = self.file_manager.block_size();
        let max = max_record_len(block_size);
        if record.len() > max {
            return Err(Error::RecordTooLarge {
                len: record.len(),
                max,
            });
        }

        let bytes_needed = Page::max_length(record.len());
        let mut state = self.state.lock();

        let mut boundary = state.page.get_int(0)? as usize;
        if boundary < bytes_needed + INT_SIZE {
            self.write_tail(&state)?;
            let blk = append_new_block(&self.file_manager, &self.log_file, &mut state.page)?;
            debug!(
                from = %state.current_block,
                to = %blk,
                lsn = state.latest_lsn + 1,
                "log_manager.rotate"
            );
            state.current_block = blk;
            boundary = block_size;
        }

        let record_pos = boundary - bytes_needed;
        state.page.set_bytes(record_pos, record)?;
        state.page.set_int(0, record_pos as u64)?;
        state.latest_lsn += 1;

        Ok(state.latest_lsn)
    }

    /// Write the tail block to disk.
    pub fn flush(&self) -> Result<()> {
        let state = self.state.lock();
        self.write_tail(&state)
    }

    /// Make every record up to `lsn` durable.
    ///
    /// Writes the tail block only if `lsn` is newer than the last LSN saved
    /// this way. LSNs beyond the latest assigned one are clamped to it.
    pub fn flush_to(&self, lsn: Lsn) -> Result<()> {
        let mut state = self.state.lock();
        if lsn > state.last_saved_lsn {
            self.write_tail(&state)?;
            state.last_saved_lsn = lsn.min(state.latest_lsn);
        }
        Ok(())
    }

    /// Flush the log and return an iterator over every record, newest first.
    ///
    /// The iterator works on its own copy of each block, so appends made
    /// after this call are not observed.
    pub fn iterator(&self) -> Result<LogIterator> {
        let state = self.state.lock();
        self.write_tail(&state)?;
        LogIterator::new(Arc::clone(&self.file_manager), state.current_block.clone())
    }

    /// Last LSN handed out, or 0 if nothing was appended yet.
    pub fn latest_lsn(&self) -> Lsn {
        self.state.lock().latest_lsn
    }

    pub fn last_saved_lsn(&self) -> Lsn {
        self.state.lock().last_saved_lsn
    }

    /// The block currently being filled.
    pub fn current_block(&self) -> BlockId {
        self.state.lock().current_block.clone()
    }

    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    fn write_tail(&self, state: &LogState) -> Result<()> {
        self.file_manager.write(&state.current_block, &state.page)?;
        trace!(block = %state.current_block, lsn = state.latest_lsn, "log_manager.flush");
        Ok(())
    }
}

/// Largest record an empty block of `block_size` bytes can hold.
#[inline]
pub(crate) fn max_record_len(block_size: usize) -> usize {
    block_size - 2 * INT_SIZE
}

/// Read and validate the boundary field of a log block held in `page`.
///
/// A boundary of 0 marks a block that was allocated but never initialized and
/// is treated as empty.
pub(crate) fn read_boundary(page: &Page, blk: &BlockId) -> Result<usize> {
    let boundary = page.get_int(0)?;
    if boundary == 0 {
        return Ok(page.len());
    }
    if boundary < INT_SIZE as u64 || boundary > page.len() as u64 {
        return Err(Error::CorruptLogBlock {
            block: blk.clone(),
            boundary,
        });
    }
    Ok(boundary as usize)
}

/// Extend the log by one block and initialize it as empty, both in `page`
/// and on disk.
fn append_new_block(file_manager: &FileManager, log_file: &str, page: &mut Page) -> Result<BlockId> {
    let blk = file_manager.append(log_file)?;
    page.reset();
    page.set_int(0, file_manager.block_size() as u64)?;
    file_manager.write(&blk, page)?;
    Ok(blk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    const LOG_FILE: &str = "test.log";

    fn create_log(block_size: usize) -> (LogManager, Arc<FileManager>, TempDir) {
        let dir = tempdir().unwrap();
        let fm = Arc::new(FileManager::new(dir.path(), block_size).unwrap());
        let lm = LogManager::new(Arc::clone(&fm), LOG_FILE).unwrap();
        (lm, fm, dir)
    }

    fn boundary_on_disk(fm: &FileManager, number: u64) -> u64 {
        let mut page = Page::new(fm.block_size());
        fm.read(&BlockId::new(LOG_FILE, number), &mut page).unwrap();
        page.get_int(0).unwrap()
    }

    #[test]
    fn test_new_log_has_one_empty_block() {
        let (lm, fm, _dir) = create_log(400);

        assert_eq!(fm.size(LOG_FILE).unwrap(), 1);
        assert_eq!(boundary_on_disk(&fm, 0), 400);
        assert_eq!(lm.current_block(), BlockId::new(LOG_FILE, 0));
        assert_eq!(lm.latest_lsn(), 0);
        assert_eq!(lm.last_saved_lsn(), 0);
    }

    #[test]
    fn test_append_packs_records_backward() {
        let (lm, fm, _dir) = create_log(400);

        assert_eq!(lm.append(b"first").unwrap(), 1);
        assert_eq!(lm.append(b"second!").unwrap(), 2);
        lm.flush().unwrap();

        let mut page = Page::new(400);
        fm.read(&BlockId::new(LOG_FILE, 0), &mut page).unwrap();

        // "first" ends at the block end, "second!" sits right before it
        assert_eq!(page.get_bytes(400 - 13).unwrap(), b"first");
        assert_eq!(page.get_bytes(400 - 13 - 15).unwrap(), b"second!");
        assert_eq!(page.get_int(0).unwrap(), 400 - 13 - 15);
    }

    #[test]
    fn test_append_rotates_when_full() {
        let (lm, fm, _dir) = create_log(400);
        let record = [7u8; 50];

        for _ in 0..6 {
            lm.append(&record).unwrap();
        }
        assert_eq!(lm.current_block().number(), 0);

        // 6 × 58 bytes used, boundary 52; 52 - 58 < 8 so block 1 is started
        assert_eq!(lm.append(&record).unwrap(), 7);
        assert_eq!(lm.current_block(), BlockId::new(LOG_FILE, 1));
        assert_eq!(fm.size(LOG_FILE).unwrap(), 2);
        assert_eq!(boundary_on_disk(&fm, 0), 52);
        // The rotated block is initialized on disk before record 7 is flushed
        assert_eq!(boundary_on_disk(&fm, 1), 400);
    }

    #[test]
    fn test_record_exactly_filling_block() {
        let (lm, _fm, _dir) = create_log(64);

        let record = vec![1u8; max_record_len(64)];
        assert_eq!(lm.append(&record).unwrap(), 1);
        assert_eq!(lm.current_block().number(), 0);

        // The next record, however small, needs a new block
        lm.append(&[]).unwrap();
        assert_eq!(lm.current_block().number(), 1);
    }

    #[test]
    fn test_record_too_large() {
        let (lm, fm, _dir) = create_log(64);

        let record = vec![0u8; max_record_len(64) + 1];
        assert!(matches!(
            lm.append(&record),
            Err(Error::RecordTooLarge { len: 49, max: 48 })
        ));
        assert_eq!(lm.latest_lsn(), 0);
        assert_eq!(fm.size(LOG_FILE).unwrap(), 1);
    }

    #[test]
    fn test_flush_to_skips_saved_lsns() {
        let (lm, fm, _dir) = create_log(400);
        let lsn1 = lm.append(b"a").unwrap();
        let lsn2 = lm.append(b"b").unwrap();

        let writes = || fm.stats().snapshot().blocks_written;
        let before = writes();

        lm.flush_to(lsn2).unwrap();
        assert_eq!(writes(), before + 1);
        assert_eq!(lm.last_saved_lsn(), lsn2);

        lm.flush_to(lsn1).unwrap();
        lm.flush_to(lsn2).unwrap();
        assert_eq!(writes(), before + 1);
        assert_eq!(lm.last_saved_lsn(), lsn2);
    }

    #[test]
    fn test_flush_to_clamps_future_lsn() {
        let (lm, _fm, _dir) = create_log(400);
        lm.append(b"a").unwrap();

        lm.flush_to(100).unwrap();
        assert_eq!(lm.last_saved_lsn(), 1);
    }

    #[test]
    fn test_flush_always_writes() {
        let (lm, fm, _dir) = create_log(400);
        let before = fm.stats().snapshot().blocks_written;

        lm.flush().unwrap();
        lm.flush().unwrap();

        assert_eq!(fm.stats().snapshot().blocks_written, before + 2);
    }

    #[test]
    fn test_resume_zeroed_tail_block() {
        let (lm, fm, _dir) = create_log(400);
        lm.append(b"kept").unwrap();
        lm.flush().unwrap();
        drop(lm);

        // Extended but never initialized
        fm.append(LOG_FILE).unwrap();

        let lm = LogManager::new(Arc::clone(&fm), LOG_FILE).unwrap();
        assert_eq!(lm.current_block().number(), 1);
        assert_eq!(lm.latest_lsn(), 1);
        assert_eq!(lm.append(b"next").unwrap(), 2);
    }

    #[test]
    fn test_corrupt_boundary_on_resume() {
        let (lm, fm, _dir) = create_log(400);
        drop(lm);

        let mut page = Page::new(400);
        page.set_int(0, 4).unwrap();
        fm.write(&BlockId::new(LOG_FILE, 0), &page).unwrap();

        assert!(matches!(
            LogManager::new(Arc::clone(&fm), LOG_FILE),
            Err(Error::CorruptLogBlock { boundary: 4, .. })
        ));
    }

    #[test]
    fn test_read_boundary() {
        let blk = BlockId::new(LOG_FILE, 0);
        let mut page = Page::new(100);

        assert_eq!(read_boundary(&page, &blk).unwrap(), 100);

        page.set_int(0, 8).unwrap();
        assert_eq!(read_boundary(&page, &blk).unwrap(), 8);

        page.set_int(0, 101).unwrap();
        assert!(read_boundary(&page, &blk).is_err());
    }
}
