//! Write-ahead logging.
//!
//! - [`LogManager`] - Appends records to the log file and assigns LSNs
//! - [`LogIterator`] - Replays records newest-first for recovery and undo

mod log_iterator;
mod log_manager;

pub use log_iterator::LogIterator;
pub use log_manager::{LogManager, Lsn};
