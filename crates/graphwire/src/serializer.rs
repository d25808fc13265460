// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization sessions over a shared encoder cache.

use crate::config::SerializerConfig;
use crate::encoder::{EncoderCache, TypeEncoder};
use crate::error::Result;
use crate::types::{TypeDescriptor, TypeRegistry};
use crate::writer::{BufferWriter, GraphWriter, PrimitiveWriter, StreamWriter};
use crate::Value;
use std::io::Write;
use std::sync::Arc;

/// Serializer for object graphs.
///
/// Owns the encoder cache, so encoders built by one session are reused by
/// every later one. A `Serializer` can be shared between threads; each
/// call to [`serialize`](Self::serialize) is an independent session.
///
/// # Example
///
/// ```
/// use graphwire::{HashMapTypeRegistry, Serializer, SerializerConfig, Value};
/// use std::sync::Arc;
///
/// let serializer = Serializer::new(Arc::new(HashMapTypeRegistry::new()), SerializerConfig::default());
/// let bytes = serializer.serialize_to_vec(&Value::Null).unwrap();
/// assert_eq!(bytes, (-1i32).to_le_bytes());
/// ```
#[derive(Debug)]
pub struct Serializer {
    encoders: EncoderCache,
    config: SerializerConfig,
}

impl Serializer {
    pub fn new(registry: Arc<dyn TypeRegistry>, config: SerializerConfig) -> Self {
        Self {
            encoders: EncoderCache::new(registry, &config),
            config,
        }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Write the graph rooted at `root` to `out`.
    ///
    /// The root is written as a reference of formal type `object`.
    pub fn serialize(&self, root: &Value, out: &mut dyn PrimitiveWriter) -> Result<()> {
        self.serialize_as(&TypeDescriptor::object(), root, out)
    }

    /// Write the graph rooted at `root`, declared as `formal`.
    pub fn serialize_as(
        &self,
        formal: &Arc<TypeDescriptor>,
        root: &Value,
        out: &mut dyn PrimitiveWriter,
    ) -> Result<()> {
        let start = out.bytes_written();
        let (objects, types) = {
            let mut session = self.session(out);
            session.write_root(formal, root)?;
            (session.identity().len(), session.type_index().len())
        };
        log::debug!(
            "[SERIALIZER] wrote {} as {}: {} objects, {} types, {} bytes",
            root.kind_name(),
            formal.name(),
            objects,
            types,
            out.bytes_written() - start
        );
        Ok(())
    }

    pub fn serialize_to_vec(&self, root: &Value) -> Result<Vec<u8>> {
        let mut out = BufferWriter::new();
        self.serialize(root, &mut out)?;
        Ok(out.into_bytes())
    }

    /// Write to `sink` through a buffered stream, returning the flushed sink.
    pub fn serialize_into<W: Write>(&self, root: &Value, sink: W) -> Result<W> {
        let mut out = StreamWriter::with_capacity(self.config.buffer_capacity, sink);
        self.serialize(root, &mut out)?;
        out.finish()
    }

    /// Open a session writing to `out`, for callers driving several roots
    /// through one identity table.
    pub fn session<'a>(&'a self, out: &'a mut dyn PrimitiveWriter) -> GraphWriter<'a> {
        GraphWriter::new(&self.encoders, out, self.config.type_stamping)
    }

    /// Memoized encoder for `ty`, building it if needed.
    pub fn encoder_for(&self, ty: &Arc<TypeDescriptor>) -> Result<Arc<TypeEncoder>> {
        self.encoders.encoder_for(ty)
    }

    /// Number of cached type encoders.
    pub fn cached_encoders(&self) -> usize {
        self.encoders.len()
    }
}
