//! Common types and utilities shared across StrataDB.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`StorageConfig`]
//! - Error types
//! - Block identifiers ([`BlockId`])

mod block_id;
pub mod config;
pub mod error;

pub use block_id::BlockId;
pub use config::StorageConfig;
pub use error::{Error, Result};
