//! In-memory raw source.
//!
//! Holds the whole content in a `Vec<u8>` with a cursor. `with_max_read`
//! caps how much one `sysread` returns, which models pipes and sockets that
//! hand back short reads.

use bufio_core::{Error, Result};

use super::{RawSource, Whence};

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
    cursor: usize,
    max_read: Option<usize>,
    closed: bool,
    sysread_calls: usize,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// Return at most `max_read` bytes per `sysread`, regardless of request.
    pub fn with_max_read(mut self, max_read: usize) -> Self {
        self.max_read = Some(max_read.max(1));
        self
    }

    /// Number of `sysread` calls that reached the source.
    pub fn sysread_calls(&self) -> usize {
        self.sysread_calls
    }

    /// Bytes written so far, plus the original content.
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    pub fn offset(&self) -> usize {
        self.cursor
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::closed_stream());
        }
        Ok(())
    }
}

impl RawSource for MemorySource {
    fn sysread(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        self.ensure_open()?;
        self.sysread_calls += 1;
        if max_bytes == 0 {
            return Ok(Vec::new());
        }
        if self.cursor >= self.data.len() {
            return Err(Error::EndOfStream);
        }
        let cap = self.max_read.map_or(max_bytes, |m| m.min(max_bytes));
        let end = (self.cursor + cap).min(self.data.len());
        let out = self.data[self.cursor..end].to_vec();
        self.cursor = end;
        Ok(out)
    }

    fn syswrite(&mut self, bytes: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        let end = self.cursor + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
        Ok(bytes.len())
    }

    fn sysseek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        self.ensure_open()?;
        let base = match whence {
            Whence::Start => 0i64,
            Whence::Current => self.cursor as i64,
            Whence::End => self.data.len() as i64,
        };
        let target = base
            .checked_add(offset)
            .filter(|t| *t >= 0)
            .ok_or_else(|| Error::Argument(format!("invalid seek offset {offset}")))?;
        self.cursor = target as usize;
        Ok(target as u64)
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
