// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type metadata provider.
//!
//! Resolves named type references and walks inheritance chains to produce
//! the field and hook lists an encoder is built from.

use crate::error::{EncodeError, Result};
use crate::types::{FieldDescriptor, Hook, HookPhase, PrimitiveKind, TypeDescriptor, TypeRef};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Source of type descriptors by name.
pub trait TypeRegistry: Send + Sync {
    /// Look up a descriptor by its name.
    ///
    /// Returns `None` if the name is unknown.
    fn lookup(&self, name: &str) -> Option<Arc<TypeDescriptor>>;
}

/// Built-in descriptors known without registration (`object` and primitives).
pub fn builtin(name: &str) -> Option<Arc<TypeDescriptor>> {
    if name == "object" {
        return Some(TypeDescriptor::object());
    }
    PrimitiveKind::from_name(name).map(TypeDescriptor::primitive)
}

/// Simple [`HashMap`]-backed [`TypeRegistry`].
///
/// Filled before serialization starts, then shared read-only.
#[derive(Debug, Default)]
pub struct HashMapTypeRegistry {
    types: HashMap<Arc<str>, Arc<TypeDescriptor>>,
}

impl HashMapTypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own name, replacing any previous one.
    pub fn register(&mut self, ty: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        self.types.insert(Arc::clone(ty.name_arc()), Arc::clone(&ty));
        ty
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, ty: Arc<TypeDescriptor>) -> Self {
        self.register(ty);
        self
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeRegistry for HashMapTypeRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).cloned().or_else(|| builtin(name))
    }
}

/// Resolve a reference to its descriptor.
pub fn resolve(type_ref: &TypeRef, registry: &dyn TypeRegistry) -> Result<Arc<TypeDescriptor>> {
    match type_ref {
        TypeRef::Resolved(ty) => Ok(Arc::clone(ty)),
        TypeRef::Named(name) => registry
            .lookup(name)
            .ok_or_else(|| EncodeError::UnknownType(name.to_string())),
    }
}

/// `ty` followed by its base classes, most-derived first.
fn inheritance_chain(
    ty: &Arc<TypeDescriptor>,
    registry: &dyn TypeRegistry,
) -> Result<Vec<Arc<TypeDescriptor>>> {
    let mut chain = vec![Arc::clone(ty)];
    let mut seen = HashSet::new();
    seen.insert(ty.name().to_string());
    let mut current = Arc::clone(ty);
    while let Some(base_ref) = current.base() {
        let base = resolve(base_ref, registry)?;
        if !seen.insert(base.name().to_string()) {
            return Err(EncodeError::UnsupportedType {
                type_name: ty.name().to_string(),
                reason: format!("inheritance cycle through {}", base.name()),
            });
        }
        chain.push(Arc::clone(&base));
        current = base;
    }
    Ok(chain)
}

/// Own and inherited fields, base class fields first.
pub fn fields_of(
    ty: &Arc<TypeDescriptor>,
    registry: &dyn TypeRegistry,
) -> Result<Vec<FieldDescriptor>> {
    let chain = inheritance_chain(ty, registry)?;
    Ok(chain
        .iter()
        .rev()
        .flat_map(|t| t.declared_fields().iter().cloned())
        .collect())
}

/// Own and inherited hooks of `phase`, base class hooks first.
pub fn hooks_of(
    ty: &Arc<TypeDescriptor>,
    registry: &dyn TypeRegistry,
    phase: HookPhase,
) -> Result<Vec<Hook>> {
    let chain = inheritance_chain(ty, registry)?;
    Ok(chain
        .iter()
        .rev()
        .flat_map(|t| t.declared_hooks(phase).cloned().collect::<Vec<_>>())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDescriptorBuilder;

    fn shapes() -> HashMapTypeRegistry {
        HashMapTypeRegistry::new()
            .with(Arc::new(
                TypeDescriptorBuilder::class("Shape")
                    .field("id", PrimitiveKind::U32)
                    .hook(Hook::static_fn("shape_pre", HookPhase::Pre, || Ok(())))
                    .build(),
            ))
            .with(Arc::new(
                TypeDescriptorBuilder::class("Circle")
                    .base("Shape")
                    .field("radius", PrimitiveKind::F64)
                    .hook(Hook::static_fn("circle_pre", HookPhase::Pre, || Ok(())))
                    .build(),
            ))
    }

    #[test]
    fn test_lookup_builtins() {
        let registry = HashMapTypeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup("object").is_some_and(|t| t.is_object()));
        assert_eq!(registry.lookup("f64").map(|t| t.name().to_string()), Some("f64".into()));
        assert!(registry.lookup("Missing").is_none());
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = HashMapTypeRegistry::new();
        let err = resolve(&TypeRef::named("Ghost"), &registry).unwrap_err();
        assert!(matches!(err, EncodeError::UnknownType(ref n) if n == "Ghost"));
    }

    #[test]
    fn test_inherited_fields_and_hooks() {
        let registry = shapes();
        assert_eq!(registry.len(), 2);
        let circle = registry.lookup("Circle").unwrap();

        let fields: Vec<_> = fields_of(&circle, &registry)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(fields, ["id", "radius"]);

        let hooks: Vec<_> = hooks_of(&circle, &registry, HookPhase::Pre)
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(hooks, ["shape_pre", "circle_pre"]);
        assert!(hooks_of(&circle, &registry, HookPhase::Post).unwrap().is_empty());
    }

    #[test]
    fn test_inheritance_cycle_rejected() {
        let registry = HashMapTypeRegistry::new()
            .with(Arc::new(TypeDescriptorBuilder::class("A").base("B").build()))
            .with(Arc::new(TypeDescriptorBuilder::class("B").base("A").build()));
        let a = registry.lookup("A").unwrap();
        let err = fields_of(&a, &registry).unwrap_err();
        assert!(err.is_build_error());
    }
}
