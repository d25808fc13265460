// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Heap objects with reference identity.
//!
//! An [`ObjectRef`] is a cheap-clone handle; two handles denote the same
//! instance iff they point to the same allocation. Bodies sit behind a
//! `RwLock` so cyclic graphs can be wired after allocation.

use crate::error::{EncodeError, Result};
use crate::types::TypeDescriptor;
use crate::Value;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Multi-dimensional array contents in row-major order.
#[derive(Debug, Clone)]
pub struct ArrayValue {
    lengths: Vec<usize>,
    elements: Vec<Value>,
}

impl ArrayValue {
    /// Build an array of `lengths.len()` dimensions.
    ///
    /// `elements` are row-major (last dimension varies fastest) and must
    /// number exactly the product of `lengths`.
    pub fn new(lengths: Vec<usize>, elements: Vec<Value>) -> Result<Self> {
        if lengths.is_empty() {
            return Err(EncodeError::InvalidArray {
                type_name: "array".into(),
                reason: "rank must be at least 1".into(),
            });
        }
        let expected = lengths
            .iter()
            .try_fold(1usize, |acc, len| acc.checked_mul(*len))
            .ok_or_else(|| EncodeError::InvalidArray {
                type_name: "array".into(),
                reason: "dimension product overflows".into(),
            })?;
        if expected != elements.len() {
            return Err(EncodeError::InvalidArray {
                type_name: "array".into(),
                reason: format!("{} elements for dimensions {:?}", elements.len(), lengths),
            });
        }
        Ok(Self { lengths, elements })
    }

    /// Single-dimensional array.
    pub fn vector(elements: Vec<Value>) -> Self {
        Self {
            lengths: vec![elements.len()],
            elements,
        }
    }

    pub fn rank(&self) -> usize {
        self.lengths.len()
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }
}

/// Body of a heap object.
#[derive(Debug, Clone)]
pub enum ObjectData {
    /// `object` instance with no state.
    Empty,
    /// Class instance fields by name.
    Fields(HashMap<String, Value>),
    /// Array contents.
    Array(ArrayValue),
    /// Sequential collection in enumeration order.
    Sequence(Vec<Value>),
    /// Dictionary entries in enumeration order.
    Map(Vec<(Value, Value)>),
    /// Value type instance held in a reference slot.
    Boxed(Value),
}

impl ObjectData {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty object",
            Self::Fields(_) => "fields",
            Self::Array(_) => "array",
            Self::Sequence(_) => "sequence",
            Self::Map(_) => "map",
            Self::Boxed(_) => "boxed value",
        }
    }
}

struct Object {
    ty: Arc<TypeDescriptor>,
    data: RwLock<ObjectData>,
}

/// Shared handle to a heap object.
#[derive(Clone)]
pub struct ObjectRef(Arc<Object>);

impl ObjectRef {
    /// Allocate an object of actual type `ty`.
    pub fn new(ty: &Arc<TypeDescriptor>, data: ObjectData) -> Self {
        Self(Arc::new(Object {
            ty: Arc::clone(ty),
            data: RwLock::new(data),
        }))
    }

    /// Class instance from `(field, value)` pairs.
    pub fn with_fields<I, K>(ty: &Arc<TypeDescriptor>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(ty, ObjectData::Fields(fields))
    }

    pub fn array(ty: &Arc<TypeDescriptor>, array: ArrayValue) -> Self {
        Self::new(ty, ObjectData::Array(array))
    }

    pub fn sequence(ty: &Arc<TypeDescriptor>, elements: Vec<Value>) -> Self {
        Self::new(ty, ObjectData::Sequence(elements))
    }

    pub fn map(ty: &Arc<TypeDescriptor>, entries: Vec<(Value, Value)>) -> Self {
        Self::new(ty, ObjectData::Map(entries))
    }

    /// Box a value type instance.
    pub fn boxed(ty: &Arc<TypeDescriptor>, value: Value) -> Self {
        Self::new(ty, ObjectData::Boxed(value))
    }

    /// Actual (runtime) type.
    pub fn type_descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.0.ty
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ObjectData> {
        self.0.data.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ObjectData> {
        self.0.data.write()
    }

    /// Set a field on a class instance. Returns `false` for other bodies.
    pub fn set_field(&self, name: impl Into<String>, value: Value) -> bool {
        match &mut *self.write() {
            ObjectData::Fields(fields) => {
                fields.insert(name.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Identity comparison.
    pub fn ptr_eq(a: &ObjectRef, b: &ObjectRef) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Address used as identity key.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

// Graphs may be cyclic; never recurse into the body.
impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}@{:#x})", self.0.ty.name(), self.addr())
    }
}
