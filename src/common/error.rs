//! Error types for StrataDB.

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::common::BlockId;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the storage and log layers.
///
/// Nothing in this crate retries on error; every failure is returned to the
/// caller, which owns any retry policy.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a file read, write, stat or create.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An encode/decode would touch bytes outside the page.
    #[error("buffer overrun: {len} bytes at offset {offset} exceed page size {page_size}")]
    BufferOverrun {
        offset: usize,
        len: usize,
        page_size: usize,
    },

    /// `next_record` was called on a log iterator with no records left.
    #[error("log iterator exhausted")]
    IteratorExhausted,

    /// The requested block lies past the end of its file.
    #[error("block {0} not found")]
    BlockNotFound(BlockId),

    /// A page of the wrong length was handed to the file manager.
    #[error("page size {actual} does not match block size {expected}")]
    BlockSizeMismatch { expected: usize, actual: usize },

    /// Block size too small to hold a log boundary and a record header.
    #[error("invalid block size {0}")]
    InvalidBlockSize(usize),

    /// A log record can never fit in a single block.
    #[error("log record of {len} bytes exceeds the maximum of {max} bytes")]
    RecordTooLarge { len: usize, max: usize },

    /// A log block whose boundary field points outside the block.
    #[error("corrupt log block {block}: boundary {boundary}")]
    CorruptLogBlock { block: BlockId, boundary: u64 },

    /// A string field did not decode as UTF-8.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidString {
        offset: usize,
        #[source]
        source: FromUtf8Error,
    },
}
