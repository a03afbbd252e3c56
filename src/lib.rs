#![forbid(unsafe_code)]
//! bufio: buffered streams with pushback over raw descriptor sources.
//!
//! ```no_run
//! use bufio::{BufferedStream, FileSource, StreamConfig};
//!
//! # fn main() -> bufio::Result<()> {
//! let source = FileSource::sysopen("/etc/hosts", "r")?;
//! let lines = BufferedStream::open_scoped(source, StreamConfig::from_env(), |io| {
//!     io.read_lines()
//! })?;
//! println!("{} lines", lines.len());
//! # Ok(())
//! # }
//! ```

pub use bufio_core::{config, error, mode, Error, OpenMode, Result, StreamConfig};
pub use bufio_io::{
    BufferedStream, Bytes, FileSource, Lines, MemorySource, RawSource, Separator, Whence,
};
