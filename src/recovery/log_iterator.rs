//! Log Iterator - reverse scan over the write-ahead log.

use std::sync::Arc;

use crate::common::{BlockId, Error, Result};
use crate::recovery::log_manager::read_boundary;
use crate::storage::{FileManager, Page};

/// Walks the log from the most recent record back to the first one.
///
/// Within a block, records are read forward from the boundary, which yields
/// them newest-first. When a block is used up the iterator loads the previous
/// block and continues from its boundary, stopping after block 0.
///
/// Each block is read into a page private to the iterator.
///
/// # Example
/// ```no_run
/// # fn demo(lm: &stratadb::LogManager) -> stratadb::Result<()> {
/// for record in lm.iterator()? {
///     let bytes = record?;
///     // undo / redo with `bytes`
/// #   let _ = bytes;
/// }
/// # Ok(())
/// # }
/// ```
pub struct LogIterator {
    file_manager: Arc<FileManager>,
    block: BlockId,
    page: Page,
    /// Offset of the next record to return within `page`.
    current_pos: usize,
    /// Set after the first error; the scan ends there.
    failed: bool,
}

impl LogIterator {
    /// Position a new iterator at the newest record of `block`.
    pub fn new(file_manager: Arc<FileManager>, block: BlockId) -> Result<Self> {
        let page = Page::new(file_manager.block_size());
        let mut iter = Self {
            file_manager,
            block: block.clone(),
            page,
            current_pos: 0,
            failed: false,
        };
        iter.move_to_block(block)?;
        Ok(iter)
    }

    /// Whether another record may follow.
    ///
    /// True while the current block has unread records or an earlier block
    /// exists. Earlier blocks may all be empty, so a `true` here can still be
    /// followed by `Error::IteratorExhausted`. False after any error.
    pub fn has_next(&self) -> bool {
        !self.failed
            && (self.current_pos < self.file_manager.block_size() || self.block.number() > 0)
    }

    /// Return the next record, moving to earlier blocks as needed.
    ///
    /// The first I/O or corruption error ends the scan: it is returned once,
    /// and every later call returns `Error::IteratorExhausted`.
    ///
    /// # Errors
    /// - `Error::IteratorExhausted` once every record has been returned
    /// - I/O errors reading an earlier block
    /// - `Error::BufferOverrun` / `Error::CorruptLogBlock` on a damaged block
    pub fn next_record(&mut self) -> Result<Vec<u8>> {
        if self.failed {
            return Err(Error::IteratorExhausted);
        }
        let result = self.read_next();
        if matches!(&result, Err(e) if !matches!(e, Error::IteratorExhausted)) {
            self.failed = true;
        }
        result
    }

    fn read_next(&mut self) -> Result<Vec<u8>> {
        while self.current_pos >= self.file_manager.block_size() {
            match self.block.previous() {
                Some(prev) => self.move_to_block(prev)?,
                None => return Err(Error::IteratorExhausted),
            }
        }

        let record = self.page.get_bytes(self.current_pos)?;
        self.current_pos += Page::max_length(record.len());
        Ok(record)
    }

    /// The block the iterator is currently reading.
    pub fn block(&self) -> &BlockId {
        &self.block
    }

    fn move_to_block(&mut self, block: BlockId) -> Result<()> {
        self.file_manager.read(&block, &mut self.page)?;
        self.current_pos = read_boundary(&self.page, &block)?;
        self.block = block;
        Ok(())
    }
}

impl Iterator for LogIterator {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Err(Error::IteratorExhausted) => None,
            other => Some(other),
        }
    }
}
