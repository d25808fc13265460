// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and serializer configuration.
//!
//! All protocol markers live here. **Never hardcode them elsewhere!**

use crate::types::{resolve, TypeDescriptor, TypeKind, TypeRef, TypeRegistry};
use std::fmt;
use std::sync::Arc;

// =======================================================================
// Wire markers
// =======================================================================

/// Written in the type-id slot of a null reference.
///
/// Type ids are non-negative, so this never collides with one.
pub const NULL_REFERENCE_MARKER: i32 = -1;

/// Nullable flag byte: no value follows.
pub const NULLABLE_ABSENT: u8 = 0;

/// Nullable flag byte: the underlying value follows.
pub const NULLABLE_PRESENT: u8 = 1;

/// Initial capacity of in-memory and stream buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Depth limit when testing nested field and element types for inlining.
const MAX_INLINE_NESTING: usize = 16;

// =======================================================================
// Inline eligibility
// =======================================================================

/// Decides which reference types can be rebuilt from their inline data
/// alone, so their body may follow the object id at first occurrence.
///
/// A body written inline is written immediately, on the call stack. An
/// implementation must only accept types whose bodies reach nothing but
/// further data-only values, or deep graphs recurse once per link.
///
/// Both ends of a stream must use the same policy.
pub trait InlinePolicy: Send + Sync + fmt::Debug {
    fn is_data_only(&self, ty: &TypeDescriptor, registry: &dyn TypeRegistry) -> bool;
}

/// Primitives (strings included), enums, and nullables, pairs, structs and
/// arrays built only from those.
///
/// A slot whose formal type could hold a class instance or an `object`
/// disqualifies the whole type.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataOnlyPolicy;

impl DataOnlyPolicy {
    fn check(ty: &TypeDescriptor, registry: &dyn TypeRegistry, depth: usize) -> bool {
        if depth > MAX_INLINE_NESTING {
            return false;
        }
        let nested = |type_ref: &TypeRef| {
            resolve(type_ref, registry)
                .map(|inner| Self::check(&inner, registry, depth + 1))
                .unwrap_or(false)
        };
        match &ty.kind {
            // Written as nothing.
            _ if ty.is_transient() => true,
            TypeKind::Primitive(_) | TypeKind::Enum(_) => true,
            TypeKind::Nullable(inner) => nested(inner),
            TypeKind::Pair { key, value } => nested(key) && nested(value),
            TypeKind::Struct(fields) => fields
                .iter()
                .filter(|f| !f.transient)
                .all(|f| nested(&f.field_type)),
            TypeKind::Array { element, .. } => nested(element),
            _ => false,
        }
    }
}

impl InlinePolicy for DataOnlyPolicy {
    fn is_data_only(&self, ty: &TypeDescriptor, registry: &dyn TypeRegistry) -> bool {
        Self::check(ty, registry, 0)
    }
}

/// Never inline; every body goes through the pending queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverInline;

impl InlinePolicy for NeverInline {
    fn is_data_only(&self, _ty: &TypeDescriptor, _registry: &dyn TypeRegistry) -> bool {
        false
    }
}

// =======================================================================
// Serializer configuration
// =======================================================================

/// What follows a type id the first time it is written in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeStamping {
    /// The type name, so the reader can resolve the id.
    #[default]
    Full,
    /// Nothing; the reader must assign ids in the same order.
    IdOnly,
}

/// Serializer configuration.
#[derive(Clone)]
pub struct SerializerConfig {
    /// Types with fixed ids `0..n` in every session, in this order.
    pub known_types: Vec<Arc<TypeDescriptor>>,
    /// Inline eligibility predicate.
    pub inline_policy: Arc<dyn InlinePolicy>,
    /// Type stamp written with a first-seen type id.
    pub type_stamping: TypeStamping,
    /// Buffer capacity for stream output.
    pub buffer_capacity: usize,
}

impl SerializerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a type with the next fixed id.
    #[must_use]
    pub fn known_type(mut self, ty: Arc<TypeDescriptor>) -> Self {
        if !self.known_types.iter().any(|t| t.name() == ty.name()) {
            self.known_types.push(ty);
        }
        self
    }

    #[must_use]
    pub fn inline_policy(mut self, policy: Arc<dyn InlinePolicy>) -> Self {
        self.inline_policy = policy;
        self
    }

    #[must_use]
    pub fn type_stamping(mut self, stamping: TypeStamping) -> Self {
        self.type_stamping = stamping;
        self
    }

    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            known_types: Vec::new(),
            inline_policy: Arc::new(DataOnlyPolicy),
            type_stamping: TypeStamping::Full,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl fmt::Debug for SerializerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = self.known_types.iter().map(|t| t.name()).collect();
        f.debug_struct("SerializerConfig")
            .field("known_types", &known)
            .field("inline_policy", &self.inline_policy)
            .field("type_stamping", &self.type_stamping)
            .field("buffer_capacity", &self.buffer_capacity)
            .finish()
    }
}
