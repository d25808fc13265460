// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type model.
//!
//! - **TypeDescriptor**: formal/actual type description (primitives, structs,
//!   classes, arrays, collections, ...)
//! - **Builder API**: fluent construction of class, struct and enum descriptors
//! - **TypeRegistry**: metadata provider resolving named references and
//!   inheritance
//!
//! # Example
//!
//! ```rust
//! use graphwire::types::{HashMapTypeRegistry, PrimitiveKind, TypeDescriptorBuilder};
//! use std::sync::Arc;
//!
//! let mut registry = HashMapTypeRegistry::new();
//! registry.register(Arc::new(
//!     TypeDescriptorBuilder::class("Node")
//!         .field("value", PrimitiveKind::I32)
//!         .field("next", "Node")
//!         .build(),
//! ));
//! assert_eq!(registry.len(), 1);
//! ```

mod builder;
mod descriptor;
mod registry;

pub use builder::{EnumBuilder, TypeDescriptorBuilder};
pub use descriptor::{
    ClassDescriptor, EnumDescriptor, EnumVariant, FieldDescriptor, Hook, HookPhase, HookTarget,
    InstanceHookFn, PrimitiveKind, StaticHookFn, TypeDescriptor, TypeFlags, TypeKind, TypeRef,
};
pub use registry::{builtin, fields_of, hooks_of, resolve, HashMapTypeRegistry, TypeRegistry};
