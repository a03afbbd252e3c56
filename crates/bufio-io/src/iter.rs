//! Lazy, forward-only iterators over a `BufferedStream`.
//!
//! Both stop at the first end of stream. An error is yielded once and ends
//! the iteration.

use std::iter::FusedIterator;

use bufio_core::Result;

use crate::separator::Separator;
use crate::source::RawSource;
use crate::stream::BufferedStream;

pub struct Lines<'a, S: RawSource> {
    stream: &'a mut BufferedStream<S>,
    separator: Separator,
    limit: Option<usize>,
    done: bool,
}

impl<'a, S: RawSource> Lines<'a, S> {
    pub(crate) fn new(
        stream: &'a mut BufferedStream<S>,
        separator: Separator,
        limit: Option<usize>,
    ) -> Self {
        Self {
            stream,
            separator,
            limit,
            done: false,
        }
    }
}

impl<S: RawSource> Iterator for Lines<'_, S> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.gets_with(&self.separator, self.limit) {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: RawSource> FusedIterator for Lines<'_, S> {}

/// Single units (bytes) via `getc`.
pub struct Bytes<'a, S: RawSource> {
    stream: &'a mut BufferedStream<S>,
    done: bool,
}

impl<'a, S: RawSource> Bytes<'a, S> {
    pub(crate) fn new(stream: &'a mut BufferedStream<S>) -> Self {
        Self {
            stream,
            done: false,
        }
    }
}

impl<S: RawSource> Iterator for Bytes<'_, S> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.getc() {
            Ok(Some(b)) => Some(Ok(b)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: RawSource> FusedIterator for Bytes<'_, S> {}
