#![forbid(unsafe_code)]
//! bufio-core: error taxonomy, stream configuration, and access modes.
//!
//! No I/O lives here. `bufio-io` builds the raw sources and the buffered
//! stream on top of these types.

pub mod config;
pub mod error;
pub mod mode;
pub mod prelude;

pub use config::StreamConfig;
pub use error::{Error, Result};
pub use mode::OpenMode;
