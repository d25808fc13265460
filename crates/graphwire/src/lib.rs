// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # graphwire - binary object-graph serializer
//!
//! Writes arbitrary object graphs (shared references, cycles, arrays of any
//! rank, collections, dictionaries, nullables, enums, plain structs) to a
//! compact binary stream. Every type is classified once, gets one encoder,
//! and that encoder is memoized for every later value of the type.
//!
//! ## Quick Start
//!
//! ```rust
//! use graphwire::{
//!     HashMapTypeRegistry, ObjectRef, PrimitiveKind, Serializer, SerializerConfig,
//!     TypeDescriptorBuilder, Value,
//! };
//! use std::sync::Arc;
//!
//! let node = Arc::new(
//!     TypeDescriptorBuilder::class("Node")
//!         .field("value", PrimitiveKind::I32)
//!         .field("next", "Node")
//!         .build(),
//! );
//! let registry = HashMapTypeRegistry::new().with(Arc::clone(&node));
//! let serializer = Serializer::new(Arc::new(registry), SerializerConfig::default());
//!
//! // A node pointing at itself.
//! let a = ObjectRef::with_fields(&node, [("value", Value::I32(7)), ("next", Value::Null)]);
//! a.set_field("next", Value::Object(a.clone()));
//!
//! let bytes = serializer.serialize_to_vec(&Value::Object(a.clone())).unwrap();
//! assert_eq!(
//!     bytes,
//!     [
//!         0, 0, 0, 0, 4, 0, 0, 0, b'N', b'o', b'd', b'e', // type id 0 + name
//!         0, 0, 0, 0, // object id 0
//!         0, 0, 0, 0, 0, 0, 0, 0, // next: type id 0, object id 0 (back-reference)
//!         7, 0, 0, 0, // value
//!     ]
//! );
//! a.set_field("next", Value::Null);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                           Serializer                                |
//! |   session per call | shared EncoderCache (DashMap, build-once)     |
//! +---------------------------------------------------------------------+
//! |                            Encoders                                 |
//! |   classify -> SlotPlan (skip | value | reference) -> TypeEncoder   |
//! +---------------------------------------------------------------------+
//! |                          GraphWriter                                |
//! |   TypeIndex | IdentityTable | pending bodies (FIFO)               |
//! +---------------------------------------------------------------------+
//! |                        PrimitiveWriter                              |
//! |   BufferWriter | StreamWriter<W: Write>                            |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Wire format
//!
//! | Slot | Layout |
//! |------|--------|
//! | null reference | `-1:i32` |
//! | reference | `type_id:i32` (+ `name` on first sight), `object_id:i32` |
//! | nullable | `0:u8` or `1:u8` + value |
//! | array | `rank:i32`, `length:i32` per dimension, elements row-major |
//! | collection | `count:i32`, elements |
//! | dictionary | `count:i32`, key/value pairs |
//! | struct, enum, primitive | inline, no tag |
//! | string | reference; body `len:i32` + UTF-8 bytes |
//!
//! All integers are little-endian.
//!
//! ## Modules Overview
//!
//! - [`types`] - Type descriptors, builders and the type registry
//! - [`classify`] - Transient / value / reference classification
//! - [`encoder`] - Per-type encoders and the memoized cache
//! - [`writer`] - Primitive writers and the per-session graph writer
//! - [`config`] - Wire constants and serializer configuration

pub mod classify;
pub mod config;
pub mod encoder;
pub mod error;
pub mod object;
pub mod serializer;
pub mod types;
pub mod value;
pub mod writer;

#[cfg(test)]
mod tests;

pub use classify::{check_legality, classify, SerializationType};
pub use config::{DataOnlyPolicy, InlinePolicy, NeverInline, SerializerConfig, TypeStamping};
pub use encoder::{EncoderCache, TypeEncoder};
pub use error::{EncodeError, HookError, Result};
pub use object::{ArrayValue, ObjectData, ObjectRef};
pub use serializer::Serializer;
pub use types::{
    EnumBuilder, FieldDescriptor, Hook, HookPhase, HashMapTypeRegistry, PrimitiveKind,
    TypeDescriptor, TypeDescriptorBuilder, TypeKind, TypeRef, TypeRegistry,
};
pub use value::Value;
pub use writer::{BufferWriter, GraphWriter, ObjectWriter, PrimitiveWriter, StreamWriter};
