//! StrataDB - block storage and write-ahead logging for a disk-resident database.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            StrataDB                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Recovery Layer (recovery/)                  │   │
//! │  │     LogManager (append, flush)  +  LogIterator (scan)    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/)                    │   │
//! │  │        FileManager (block I/O)  +  Page (codec)          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │            one directory, one file per name, fixed blocks       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, Error, config)
//! - [`storage`] - Block I/O and the page codec
//! - [`recovery`] - Write-ahead log append and reverse scan
//! - [`database`] - Opens both layers for a directory
//!
//! # Quick Start
//! ```no_run
//! use stratadb::{Database, StorageConfig};
//!
//! let db = Database::open(StorageConfig::new("my_database")).unwrap();
//! let lsn = db.log_manager().append(b"set x = 1").unwrap();
//! db.log_manager().flush_to(lsn).unwrap();
//!
//! for record in db.log_manager().iterator().unwrap() {
//!     println!("{:?}", record.unwrap());
//! }
//! ```

pub mod common;
pub mod database;
pub mod recovery;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::DEFAULT_BLOCK_SIZE;
pub use common::{BlockId, Error, Result, StorageConfig};

pub use database::Database;
pub use recovery::{LogIterator, LogManager, Lsn};
pub use storage::{FileManager, IoStats, IoStatsSnapshot, Page};
