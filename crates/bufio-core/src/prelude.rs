//! Convenient re-exports for downstream crates.

pub use crate::config::{StreamConfig, DEFAULT_CHUNK_SIZE, DEFAULT_RECORD_SEPARATOR};
pub use crate::error::{Error, Result};
pub use crate::mode::OpenMode;
