//! Buffered stream over a raw source.
//!
//! The stream keeps a FIFO of bytes read ahead (or pushed back) but not yet
//! delivered, plus the logical position of the next byte the caller will see.
//! Every read goes through `fill_step`, which touches the source at most once
//! per call and never asks it for more than `chunk_size` bytes.
//!
//! Invariant: `pos` equals the bytes handed to callers minus the bytes pushed
//! back since. For a source that was only read through this stream, the
//! source's own offset is `pos + buf.len()`.

use std::collections::VecDeque;
use std::fmt;
use std::io;

use bstr::ByteSlice;
use bufio_core::{Error, Result, StreamConfig};

use crate::iter::{Bytes, Lines};
use crate::separator::Separator;
use crate::source::{RawSource, Whence};

/// Outcome of a buffer operation that may run into the end of the stream.
///
/// Strict calls turn `Eof` into `Error::EndOfStream`; the convenience layer
/// (`gets`, `getc`, iterators) turns it into `None`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Step<T> {
    Data(T),
    Eof,
}

impl<T> Step<T> {
    pub(crate) fn strict(self) -> Result<T> {
        match self {
            Step::Data(v) => Ok(v),
            Step::Eof => Err(Error::EndOfStream),
        }
    }

    pub(crate) fn into_option(self) -> Option<T> {
        match self {
            Step::Data(v) => Some(v),
            Step::Eof => None,
        }
    }
}

impl Step<Vec<u8>> {
    fn from_collected(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Step::Eof
        } else {
            Step::Data(bytes)
        }
    }
}

pub struct BufferedStream<S: RawSource> {
    source: S,
    buf: VecDeque<u8>,
    pos: u64,
    closed: bool,
    // Source reported end of stream while buffered bytes were still served.
    eof_pending: bool,
    config: StreamConfig,
}

impl<S: RawSource> BufferedStream<S> {
    /// Wrap an already-open source. Fails if `config` does not validate.
    pub fn new(source: S, config: StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            buf: VecDeque::with_capacity(config.chunk_size),
            pos: 0,
            closed: false,
            eof_pending: false,
            config,
        })
    }

    pub fn with_defaults(source: S) -> Self {
        Self {
            source,
            buf: VecDeque::new(),
            pos: 0,
            closed: false,
            eof_pending: false,
            config: StreamConfig::default(),
        }
    }

    /// Run `body` against a fresh stream and close it afterwards, even when
    /// `body` fails. A stream the body already closed is left alone, and a
    /// failing close never replaces the body's result.
    pub fn open_scoped<T, F>(source: S, config: StreamConfig, body: F) -> Result<T>
    where
        F: FnOnce(&mut BufferedStream<S>) -> Result<T>,
    {
        let mut stream = BufferedStream::new(source, config)?;
        let result = body(&mut stream);
        if !stream.is_closed() {
            if let Err(_e) = stream.close() {
                #[cfg(feature = "tracing")]
                tracing::trace!(error = %_e, "close after scoped use failed");
            }
        }
        result
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Bytes currently buffered (read ahead or pushed back).
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::closed_stream());
        }
        Ok(())
    }

    pub(crate) fn fill_step(&mut self, max_len: usize) -> Result<Step<Vec<u8>>> {
        self.ensure_open()?;
        let chunk = self.config.chunk_size;
        if max_len > chunk {
            return Err(Error::Argument(format!(
                "fill size {max_len} out of range 0..={chunk}"
            )));
        }
        if max_len == 0 {
            return Ok(Step::Data(Vec::new()));
        }

        let mut hit_eof = false;
        if self.buf.len() < max_len {
            if self.eof_pending {
                self.eof_pending = false;
                hit_eof = true;
            } else {
                match self.source.sysread(chunk - self.buf.len()) {
                    Ok(bytes) if bytes.is_empty() => hit_eof = true,
                    Ok(bytes) => self.buf.extend(bytes),
                    Err(Error::EndOfStream) => hit_eof = true,
                    Err(e) => return Err(e),
                }
            }
        }

        let take = max_len.min(self.buf.len());
        if take == 0 {
            #[cfg(feature = "tracing")]
            tracing::trace!(pos = self.pos, "end of stream");
            return Ok(Step::Eof);
        }
        if hit_eof {
            self.eof_pending = true;
        }

        let out: Vec<u8> = self.buf.drain(..take).collect();
        self.pos += take as u64;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            requested = max_len,
            delivered = take,
            buffered = self.buf.len(),
            pos = self.pos,
            "fill"
        );
        Ok(Step::Data(out))
    }

    /// Return the next `max_len` bytes (fewer near the end of the stream).
    ///
    /// `max_len` must not exceed the chunk size. `fill(0)` returns an empty
    /// slice without touching the source.
    pub fn fill(&mut self, max_len: usize) -> Result<Vec<u8>> {
        self.fill_step(max_len)?.strict()
    }

    fn unread(&mut self, bytes: &[u8]) {
        for &b in bytes.iter().rev() {
            self.buf.push_front(b);
        }
        // Pushing back more than was delivered pins the position at zero.
        self.pos = self.pos.saturating_sub(bytes.len() as u64);
        #[cfg(feature = "tracing")]
        tracing::trace!(len = bytes.len(), pos = self.pos, "pushback");
    }

    /// Prepend `bytes` so they are delivered again by the next read.
    pub fn pushback(&mut self, bytes: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_open()?;
        self.unread(bytes.as_ref());
        Ok(())
    }

    pub fn unget_char(&mut self, byte: u8) -> Result<()> {
        self.ensure_open()?;
        if self.pos == 0 {
            return Err(Error::Io("unget before start of stream".to_string()));
        }
        self.unread(&[byte]);
        Ok(())
    }

    /// Read everything up to the end of the stream. An exhausted stream
    /// yields an empty vector.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let chunk = self.config.chunk_size;
        let mut out = Vec::new();
        while let Step::Data(bytes) = self.fill_step(chunk)? {
            out.extend_from_slice(&bytes);
        }
        Ok(out)
    }

    /// Read exactly `len` bytes, fewer at the end of the stream, or `None`
    /// when nothing is left. `read_bytes(0)` is always `Some(vec![])`.
    pub fn read_bytes(&mut self, len: usize) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        if len == 0 {
            return Ok(Some(Vec::new()));
        }
        Ok(self.read_upto(len)?.into_option())
    }

    fn read_upto(&mut self, len: usize) -> Result<Step<Vec<u8>>> {
        let chunk = self.config.chunk_size;
        let mut out = Vec::with_capacity(len.min(chunk));
        while out.len() < len {
            match self.fill_step(chunk.min(len - out.len()))? {
                Step::Data(bytes) => out.extend_from_slice(&bytes),
                Step::Eof => break,
            }
        }
        Ok(Step::from_collected(out))
    }

    pub(crate) fn default_separator(&self) -> Separator {
        Separator::Bytes(self.config.separator_bytes().to_vec())
    }

    pub(crate) fn line_step(
        &mut self,
        separator: &Separator,
        limit: Option<usize>,
    ) -> Result<Step<Vec<u8>>> {
        self.ensure_open()?;
        let limit = limit.filter(|l| *l > 0);
        match separator {
            Separator::None => match limit {
                Some(max) => self.read_upto(max),
                None => Ok(Step::from_collected(self.read_all()?)),
            },
            Separator::Paragraph => self.paragraph_step(limit),
            Separator::Bytes(sep) if sep.is_empty() => self.paragraph_step(limit),
            Separator::Bytes(sep) => self.delimited_step(sep, limit),
        }
    }

    fn delimited_step(&mut self, sep: &[u8], limit: Option<usize>) -> Result<Step<Vec<u8>>> {
        let chunk = self.config.chunk_size;
        let mut line = Vec::new();
        loop {
            // A separator may straddle the previous chunk boundary.
            let search_from = line.len().saturating_sub(sep.len() - 1);
            match self.fill_step(chunk)? {
                Step::Data(bytes) => line.extend_from_slice(&bytes),
                Step::Eof => break,
            }

            let mut cut = line[search_from..]
                .find(sep)
                .map(|i| search_from + i + sep.len());
            if let Some(max) = limit {
                if line.len() >= max {
                    cut = Some(cut.map_or(max, |end| end.min(max)));
                }
            }

            if let Some(end) = cut {
                if end < line.len() {
                    let rest = line.split_off(end);
                    self.unread(&rest);
                }
                break;
            }
        }
        Ok(Step::from_collected(line))
    }

    fn paragraph_step(&mut self, limit: Option<usize>) -> Result<Step<Vec<u8>>> {
        let rs = self.config.separator_bytes().to_vec();
        let blank = [rs.as_slice(), rs.as_slice()].concat();

        let mut para = Vec::new();
        loop {
            match self.delimited_step(&rs, None)? {
                Step::Data(line) => para.extend_from_slice(&line),
                Step::Eof => break,
            }
            if let Some(max) = limit {
                if para.len() >= max {
                    let rest = para.split_off(max);
                    self.unread(&rest);
                    break;
                }
            }
            if para.ends_with(&blank) {
                break;
            }
        }
        Ok(Step::from_collected(para))
    }

    /// Read one record ending with the configured record separator.
    pub fn read_line(&mut self) -> Result<Vec<u8>> {
        let sep = self.default_separator();
        self.line_step(&sep, None)?.strict()
    }

    /// Read one record using `separator`, returning at most `limit` bytes
    /// when a positive limit is given.
    ///
    /// `Separator::None` reads the rest of the stream. Unlike `read_all`, it
    /// fails with `Error::EndOfStream` once nothing is left, so
    /// `lines_with(Separator::None, ..)` ends after one record.
    pub fn read_line_with(&mut self, separator: &Separator, limit: Option<usize>) -> Result<Vec<u8>> {
        self.line_step(separator, limit)?.strict()
    }

    /// Like `read_line` but `None` at the end of the stream.
    pub fn gets(&mut self) -> Result<Option<Vec<u8>>> {
        let sep = self.default_separator();
        Ok(self.line_step(&sep, None)?.into_option())
    }

    pub fn gets_with(
        &mut self,
        separator: &Separator,
        limit: Option<usize>,
    ) -> Result<Option<Vec<u8>>> {
        Ok(self.line_step(separator, limit)?.into_option())
    }

    pub fn read_char(&mut self) -> Result<u8> {
        let bytes = self.fill_step(1)?.strict()?;
        Ok(bytes[0])
    }

    pub fn getc(&mut self) -> Result<Option<u8>> {
        Ok(self.fill_step(1)?.into_option().map(|bytes| bytes[0]))
    }

    /// Probe one byte and push it straight back. Never consumes input.
    pub fn is_eof(&mut self) -> Result<bool> {
        match self.fill_step(1)? {
            Step::Eof => Ok(true),
            Step::Data(bytes) => {
                self.unread(&bytes);
                Ok(false)
            }
        }
    }

    pub fn lines(&mut self) -> Lines<'_, S> {
        let sep = self.default_separator();
        Lines::new(self, sep, None)
    }

    pub fn lines_with(&mut self, separator: Separator, limit: Option<usize>) -> Lines<'_, S> {
        Lines::new(self, separator, limit)
    }

    pub fn bytes(&mut self) -> Bytes<'_, S> {
        Bytes::new(self)
    }

    pub fn read_lines(&mut self) -> Result<Vec<Vec<u8>>> {
        self.lines().collect()
    }

    pub fn pos(&self) -> Result<u64> {
        self.ensure_open()?;
        Ok(self.pos)
    }

    pub fn set_pos(&mut self, pos: u64) -> Result<u64> {
        let offset = i64::try_from(pos)
            .map_err(|_| Error::Argument(format!("position {pos} out of range")))?;
        self.seek(offset, Whence::Start)
    }

    /// Reposition the stream and drop everything buffered. Returns the new
    /// absolute position.
    ///
    /// `Whence::Current` is relative to the logical position, not to the
    /// source's offset (which runs ahead by the buffered bytes).
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        self.ensure_open()?;
        let (offset, whence) = match whence {
            Whence::Current => {
                let target = i64::try_from(self.pos)
                    .ok()
                    .and_then(|p| p.checked_add(offset))
                    .ok_or_else(|| Error::Argument(format!("seek offset {offset} overflows")))?;
                (target, Whence::Start)
            }
            other => (offset, other),
        };

        let new_pos = self.source.sysseek(offset, whence)?;
        self.buf.clear();
        self.eof_pending = false;
        self.pos = new_pos;
        #[cfg(feature = "tracing")]
        tracing::trace!(pos = new_pos, "seek");
        Ok(new_pos)
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.seek(0, Whence::Start).map(|_| ())
    }

    /// Write `bytes` with a single `syswrite`. A short write is an error.
    ///
    /// Read-ahead bytes are dropped first and the source is moved back to the
    /// logical position, so the write lands where the caller expects.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) -> Result<usize> {
        self.ensure_open()?;
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Ok(0);
        }
        if !self.buf.is_empty() {
            self.seek(0, Whence::Current)?;
        }

        let written = self.source.syswrite(bytes)?;
        if written != bytes.len() {
            return Err(Error::Io(format!(
                "short write: {written} of {} bytes",
                bytes.len()
            )));
        }
        self.pos += written as u64;
        Ok(written)
    }

    /// Write `line`, adding the record separator unless it already ends
    /// with one.
    pub fn puts(&mut self, line: impl AsRef<[u8]>) -> Result<usize> {
        let mut out = line.as_ref().to_vec();
        let rs = self.config.separator_bytes();
        if !out.ends_with(rs) {
            out.extend_from_slice(rs);
        }
        self.write(out)
    }

    pub fn printf(&mut self, args: fmt::Arguments<'_>) -> Result<usize> {
        self.write(fmt::format(args))
    }

    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.source.close()?;
        self.closed = true;
        self.buf.clear();
        #[cfg(feature = "tracing")]
        tracing::trace!(pos = self.pos, "closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<S: RawSource> Drop for BufferedStream<S> {
    fn drop(&mut self) {
        if !self.closed && !self.source.is_closed() {
            let _ = self.source.close();
        }
    }
}

impl<S: RawSource> io::Read for BufferedStream<S> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let want = out.len().min(self.config.chunk_size);
        match self.fill_step(want)? {
            Step::Data(bytes) => {
                out[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
            Step::Eof => Ok(0),
        }
    }
}

impl<S: RawSource> io::Write for BufferedStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(BufferedStream::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.ensure_open()?)
    }
}

impl<S: RawSource + fmt::Debug> fmt::Debug for BufferedStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedStream")
            .field("source", &self.source)
            .field("buffered", &self.buf.len())
            .field("pos", &self.pos)
            .field("closed", &self.closed)
            .finish()
    }
}
