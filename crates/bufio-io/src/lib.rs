#![forbid(unsafe_code)]
//! bufio-io: raw sources and the buffered stream built on them.
//!
//! A `RawSource` is the unbuffered capability (`sysread`/`syswrite`/`sysseek`/
//! `close`). `BufferedStream` turns it into byte, line, paragraph and unit
//! reads with pushback and exact position tracking.

pub mod iter;
pub mod separator;
pub mod source;
pub mod stream;

pub use iter::{Bytes, Lines};
pub use separator::Separator;
pub use source::{FileSource, MemorySource, RawSource, Whence};
pub use stream::BufferedStream;
