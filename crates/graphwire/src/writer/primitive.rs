// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive writers: fixed-width little-endian scalars and length-prefixed
//! strings.

use crate::config::DEFAULT_BUFFER_CAPACITY;
use crate::error::{EncodeError, Result};
use std::io::{BufWriter, Write};

/// Generate write methods for primitive types (eliminates code duplication)
///
/// Each generated method converts the value to little-endian bytes via
/// `to_le_bytes()` and hands them to `write_bytes`.
macro_rules! impl_write_le {
    ($($name:ident: $type:ty),* $(,)?) => {
        $(
            fn $name(&mut self, value: $type) -> Result<()> {
                self.write_bytes(&value.to_le_bytes())
            }
        )*
    };
}

/// Appends primitive encodings to an output; call order is byte order.
pub trait PrimitiveWriter {
    /// Append raw bytes.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Total bytes accepted so far.
    fn bytes_written(&self) -> usize;

    impl_write_le!(
        write_u8: u8,
        write_i8: i8,
        write_u16: u16,
        write_i16: i16,
        write_u32: u32,
        write_i32: i32,
        write_u64: u64,
        write_i64: i64,
        write_f32: f32,
        write_f64: f64,
    );

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(u8::from(value))
    }

    fn write_char(&mut self, value: char) -> Result<()> {
        self.write_u32(u32::from(value))
    }

    /// Count or length as a wire `i32`.
    fn write_length(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| EncodeError::LengthOverflow(len))?;
        self.write_i32(len)
    }

    /// UTF-8 byte length followed by the bytes.
    fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_length(value.len())?;
        self.write_bytes(value.as_bytes())
    }
}

/// Growable in-memory writer.
#[derive(Debug, Default, Clone)]
pub struct BufferWriter {
    buffer: Vec<u8>,
}

impl BufferWriter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Drop everything written so far (e.g. after a failed graph).
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl PrimitiveWriter for BufferWriter {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.buffer.len()
    }
}

/// Buffered writer over any [`Write`] sink.
#[derive(Debug)]
pub struct StreamWriter<W: Write> {
    inner: BufWriter<W>,
    written: usize,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, sink)
    }

    pub fn with_capacity(capacity: usize, sink: W) -> Self {
        Self {
            inner: BufWriter::with_capacity(capacity, sink),
            written: 0,
        }
    }

    /// Flush buffered bytes and return the sink.
    pub fn finish(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| EncodeError::Io(e.into_error()))
    }
}

impl<W: Write> PrimitiveWriter for StreamWriter<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.written
    }
}
