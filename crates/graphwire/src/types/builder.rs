// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use crate::error::HookError;
use crate::types::{
    ClassDescriptor, EnumDescriptor, EnumVariant, FieldDescriptor, Hook, HookPhase, PrimitiveKind,
    TypeDescriptor, TypeFlags, TypeKind, TypeRef,
};
use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Class,
    Struct,
}

/// Builder for class and struct descriptors.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    layout: Layout,
    fields: Vec<FieldDescriptor>,
    base: Option<TypeRef>,
    flags: TypeFlags,
    hooks: Vec<Hook>,
}

impl TypeDescriptorBuilder {
    fn new(name: impl Into<String>, layout: Layout) -> Self {
        Self {
            name: name.into(),
            layout,
            fields: Vec::new(),
            base: None,
            flags: TypeFlags::default(),
            hooks: Vec::new(),
        }
    }

    /// Start a reference (class) type.
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, Layout::Class)
    }

    /// Start a plain value struct.
    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, Layout::Struct)
    }

    /// Add a field.
    pub fn field(mut self, name: impl Into<String>, field_type: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldDescriptor::new(name, field_type));
        self
    }

    /// Add a field excluded from serialization.
    pub fn transient_field(
        mut self,
        name: impl Into<String>,
        field_type: impl Into<TypeRef>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, field_type).transient());
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String)
    }

    /// Set the base class. Ignored for structs.
    pub fn base(mut self, base: impl Into<TypeRef>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn sealed(mut self) -> Self {
        self.flags.sealed = true;
        self
    }

    pub fn transient(mut self) -> Self {
        self.flags.transient = true;
        self
    }

    /// Add an instance hook run before the value is written.
    pub fn pre_serialization<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.push(Hook::instance(name, HookPhase::Pre, f));
        self
    }

    /// Add an instance hook run after the value is written.
    pub fn post_serialization<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.push(Hook::instance(name, HookPhase::Post, f));
        self
    }

    /// Add an arbitrary hook (instance or static).
    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        let kind = match self.layout {
            Layout::Class => TypeKind::Class(ClassDescriptor {
                fields: self.fields,
                base: self.base,
            }),
            Layout::Struct => TypeKind::Struct(self.fields),
        };
        let mut desc = TypeDescriptor::new(self.name, kind);
        desc.flags = self.flags;
        desc.hooks = self.hooks;
        desc
    }
}

/// Builder for enum types.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    variants: Vec<EnumVariant>,
    next_value: i64,
    underlying: PrimitiveKind,
}

impl EnumBuilder {
    /// Create a new enum builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            next_value: 0,
            underlying: PrimitiveKind::I32,
        }
    }

    /// Add a variant with auto-incremented value.
    pub fn variant(mut self, name: impl Into<String>) -> Self {
        self.variants
            .push(EnumVariant::new(name, self.next_value));
        self.next_value += 1;
        self
    }

    /// Add a variant with explicit value.
    pub fn variant_with_value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variants.push(EnumVariant::new(name, value));
        self.next_value = value + 1;
        self
    }

    /// Set underlying type.
    pub fn underlying(mut self, kind: PrimitiveKind) -> Self {
        self.underlying = kind;
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        let desc = EnumDescriptor::new(self.variants).with_underlying(self.underlying);
        TypeDescriptor::new(self.name, TypeKind::Enum(desc))
    }
}
