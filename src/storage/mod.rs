//! Storage layer - block I/O and the page codec.
//!
//! This module handles persistent storage:
//! - [`FileManager`] - Block-granular file I/O
//! - [`Page`] - Block-sized buffer with typed get/set operations
//! - [`IoStats`] - I/O counters

mod file_manager;
mod page;
mod stats;

pub use file_manager::FileManager;
pub use page::Page;
pub use stats::{IoStats, IoStatsSnapshot};
