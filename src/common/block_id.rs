//! Block identifier type.

use std::fmt;

/// Identifies a block on disk: a file name plus a zero-based block number.
///
/// Block `n` of a file occupies bytes `[n * block_size, (n + 1) * block_size)`.
/// The block size itself is owned by the
/// [`FileManager`](crate::storage::FileManager), not by the id.
///
/// # Example
/// ```
/// use stratadb::BlockId;
///
/// let blk = BlockId::new("stratadb.log", 3);
/// assert_eq!(blk.file_name(), "stratadb.log");
/// assert_eq!(blk.number(), 3);
/// assert_eq!(blk, BlockId::new("stratadb.log", 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
    file_name: String,
    number: u64,
}

impl BlockId {
    /// Create a new BlockId.
    pub fn new(file_name: impl Into<String>, number: u64) -> Self {
        Self {
            file_name: file_name.into(),
            number,
        }
    }

    /// Name of the file this block belongs to.
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Index of the block within its file.
    #[inline]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// The block immediately before this one in the same file, if any.
    pub fn previous(&self) -> Option<BlockId> {
        self.number
            .checked_sub(1)
            .map(|number| BlockId::new(self.file_name.clone(), number))
    }

    /// Content hash of the id.
    ///
    /// CRC32 over the canonical display form, so equal ids always hash equal
    /// across processes. Intended as a stable lookup key for caches built on
    /// top of the file manager.
    pub fn hash_code(&self) -> u32 {
        crc32fast::hash(self.to_string().as_bytes())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[file {}, block {}]", self.file_name, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_new() {
        let blk = BlockId::new("data.tbl", 42);
        assert_eq!(blk.file_name(), "data.tbl");
        assert_eq!(blk.number(), 42);
    }

    #[test]
    fn test_block_id_equality() {
        assert_eq!(BlockId::new("a", 5), BlockId::new("a", 5));
        assert_ne!(BlockId::new("a", 5), BlockId::new("a", 6));
        assert_ne!(BlockId::new("a", 5), BlockId::new("b", 5));
    }

    #[test]
    fn test_block_id_hash_code_consistent_with_eq() {
        let a = BlockId::new("log", 7);
        let b = BlockId::new(String::from("log"), 7);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_ne!(a.hash_code(), BlockId::new("log", 8).hash_code());
    }

    #[test]
    fn test_block_id_previous() {
        assert_eq!(BlockId::new("log", 3).previous(), Some(BlockId::new("log", 2)));
        assert_eq!(BlockId::new("log", 0).previous(), None);
    }

    #[test]
    fn test_block_id_ordering() {
        assert!(BlockId::new("a", 1) < BlockId::new("a", 2));
        assert!(BlockId::new("a", 9) < BlockId::new("b", 0));
    }

    #[test]
    fn test_block_id_display() {
        assert_eq!(format!("{}", BlockId::new("log", 2)), "[file log, block 2]");
    }
}
