//! Raw, unbuffered sources.
//!
//! - `FileSource`: descriptor-backed source over `std::fs::File`.
//! - `MemorySource`: in-memory bytes with optional short reads, used by tests
//!   and for wrapping already-materialized content.

mod file;
mod memory;

pub use file::FileSource;
pub use memory::MemorySource;

use std::io::SeekFrom;

use bufio_core::{Error, Result};

/// Reference point for `sysseek`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl Whence {
    pub fn to_seek_from(self, offset: i64) -> Result<SeekFrom> {
        match self {
            Whence::Start => u64::try_from(offset)
                .map(SeekFrom::Start)
                .map_err(|_| Error::Argument(format!("negative seek offset {offset}"))),
            Whence::Current => Ok(SeekFrom::Current(offset)),
            Whence::End => Ok(SeekFrom::End(offset)),
        }
    }
}

/// The unbuffered capability a `BufferedStream` is layered on.
///
/// `sysread` returns at most `max_bytes` bytes and may return fewer; it fails
/// with `Error::EndOfStream` when nothing remains. Once `close` succeeds no
/// other method is called again.
pub trait RawSource {
    fn sysread(&mut self, max_bytes: usize) -> Result<Vec<u8>>;

    fn syswrite(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Reposition the source; returns the new absolute offset.
    fn sysseek(&mut self, offset: i64, whence: Whence) -> Result<u64>;

    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;
}

impl<S: RawSource + ?Sized> RawSource for Box<S> {
    fn sysread(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        (**self).sysread(max_bytes)
    }

    fn syswrite(&mut self, bytes: &[u8]) -> Result<usize> {
        (**self).syswrite(bytes)
    }

    fn sysseek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        (**self).sysseek(offset, whence)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}
