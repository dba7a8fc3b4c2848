// Location: src/gpu_top/stream.rs

//! Decoder for a sequence of JSON objects separated by commas.
//!
//! `intel_gpu_top -J` writes `{...},\n{...},\n...` to stdout: neither an
//! array nor newline-delimited JSON. Each object is decoded with a fresh
//! `serde_json` deserializer positioned at the current offset of the
//! buffered reader, then a single `,` separator is skipped if present.

use std::io::{self, BufRead};
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::error::Result;

/// Lazy, non-restartable sequence of values decoded from `reader`.
///
/// The iterator ends (`None`) when the stream ends between two values.
/// A malformed value or an I/O error is yielded once as `Err` and ends the
/// iterator; there is no resynchronisation.
pub struct JsonStream<R, T> {
    reader: R,
    finished: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<R: BufRead, T: DeserializeOwned> JsonStream<R, T> {
    /// Create a decoder reading from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            finished: false,
            _marker: PhantomData,
        }
    }

    /// Decode the next value, `Ok(None)` at a clean end of stream
    pub fn next_value(&mut self) -> Result<Option<T>> {
        if self.skip_whitespace()?.is_none() {
            return Ok(None);
        }

        let value = {
            let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
            serde::Deserialize::deserialize(&mut de)?
        };

        self.skip_separator()?;
        Ok(Some(value))
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Consume JSON whitespace and return the next byte without consuming it
    fn skip_whitespace(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.peek_byte()? {
                Some(b' ' | b'\n' | b'\r' | b'\t') => self.reader.consume(1),
                other => return Ok(other),
            }
        }
    }

    /// Drop one `,` following a value; any other byte stays in the buffer
    /// for the next decode.
    fn skip_separator(&mut self) -> io::Result<()> {
        if self.skip_whitespace()? == Some(b',') {
            self.reader.consume(1);
        }
        Ok(())
    }
}

impl<R: BufRead, T: DeserializeOwned> Iterator for JsonStream<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_value() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
