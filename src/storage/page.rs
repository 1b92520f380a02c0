//! Page - a fixed-size in-memory block with a typed byte codec.
//!
//! A [`Page`] is the unit of I/O between the [`FileManager`] and memory.
//! Its length equals the manager's block size and never changes.
//!
//! [`FileManager`]: crate::storage::FileManager

use std::ops::Range;

use crate::common::config::INT_SIZE;
use crate::common::{Error, Result};

/// A block-sized byte buffer with random-access get/set operations.
///
/// # Encoding
/// All values are little-endian with an 8-byte field width:
/// ```text
/// integer:    ┌──────────────┐
///             │ u64 (8 bytes)│
///             └──────────────┘
/// byte array: ┌──────────────┬───────────────────┐
///             │ len (8 bytes)│ payload (len)     │
///             └──────────────┴───────────────────┘
/// string:     encoded as the byte array of its UTF-8 bytes
/// ```
///
/// # Bounds
/// The caller picks every offset. An access that would reach past the end of
/// the page returns [`Error::BufferOverrun`] and leaves the page untouched.
///
/// # Example
/// ```
/// use stratadb::Page;
///
/// let mut page = Page::new(400);
/// page.set_int(0, 7).unwrap();
/// page.set_string(8, "abc").unwrap();
/// assert_eq!(page.get_int(0).unwrap(), 7);
/// assert_eq!(page.get_string(8).unwrap(), "abc");
/// assert!(page.set_int(396, 1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    data: Box<[u8]>,
}

impl Page {
    /// Create a new zeroed page of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size].into_boxed_slice(),
        }
    }

    /// Wrap an existing buffer; the page takes its length.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            data: bytes.into_boxed_slice(),
        }
    }

    /// Length of the page in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Read the integer stored at `offset`.
    pub fn get_int(&self, offset: usize) -> Result<u64> {
        let range = self.range(offset, INT_SIZE)?;
        let mut buf = [0u8; INT_SIZE];
        buf.copy_from_slice(&self.data[range]);
        Ok(u64::from_le_bytes(buf))
    }

    /// Store `value` at `offset`.
    pub fn set_int(&mut self, offset: usize, value: u64) -> Result<()> {
        let range = self.range(offset, INT_SIZE)?;
        self.data[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Read the length-prefixed byte array stored at `offset`.
    pub fn get_bytes(&self, offset: usize) -> Result<Vec<u8>> {
        let len = self.get_int(offset)?;
        // A length that does not even fit in usize cannot fit in the page.
        let len = usize::try_from(len).map_err(|_| self.overrun(offset, usize::MAX))?;
        let start = offset + INT_SIZE;
        let range = self.range(start, len)?;
        Ok(self.data[range].to_vec())
    }

    /// Store `bytes` at `offset` as a length prefix followed by the payload.
    ///
    /// Nothing is written unless the whole encoding fits.
    pub fn set_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let total = Self::max_length(bytes.len());
        self.range(offset, total)?;
        self.set_int(offset, bytes.len() as u64)?;
        let start = offset + INT_SIZE;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Read the string stored at `offset`.
    pub fn get_string(&self, offset: usize) -> Result<String> {
        let bytes = self.get_bytes(offset)?;
        String::from_utf8(bytes).map_err(|source| Error::InvalidString { offset, source })
    }

    /// Store `s` at `offset` as the byte array of its UTF-8 bytes.
    pub fn set_string(&mut self, offset: usize, s: &str) -> Result<()> {
        self.set_bytes(offset, s.as_bytes())
    }

    /// Bytes needed to encode a byte array or string of `len` bytes.
    #[inline]
    pub const fn max_length(len: usize) -> usize {
        INT_SIZE + len
    }

    /// Bytes `s` will occupy once encoded with [`Page::set_string`].
    #[inline]
    pub fn max_encoded_length(s: &str) -> usize {
        Self::max_length(s.len())
    }

    fn range(&self, offset: usize, len: usize) -> Result<Range<usize>> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(offset..end),
            _ => Err(self.overrun(offset, len)),
        }
    }

    fn overrun(&self, offset: usize, len: usize) -> Error {
        Error::BufferOverrun {
            offset,
            len,
            page_size: self.data.len(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
