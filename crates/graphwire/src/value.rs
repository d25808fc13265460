// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values.

use crate::object::ObjectRef;
use crate::types::PrimitiveKind;
use std::collections::HashMap;

/// A value stored in a field, element or root slot.
///
/// Value-typed data is held inline; reference-typed data goes through
/// [`Value::Object`].
#[derive(Debug, Clone)]
pub enum Value {
    // Primitives
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),

    // Inline composites
    Enum(i64),
    Nullable(Option<Box<Value>>),
    Pair(Box<(Value, Value)>),
    Struct(HashMap<String, Value>),

    // References
    Object(ObjectRef),
    Null,
}

impl Value {
    /// Build a struct value from `(field, value)` pairs.
    pub fn structure<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn nullable(inner: Option<Value>) -> Self {
        Self::Nullable(inner.map(Box::new))
    }

    pub fn pair(key: Value, value: Value) -> Self {
        Self::Pair(Box::new((key, value)))
    }

    /// Check if value is a null reference.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Primitive kind of this value, if it is a primitive.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::U8(_) => PrimitiveKind::U8,
            Self::I8(_) => PrimitiveKind::I8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::I16(_) => PrimitiveKind::I16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::I32(_) => PrimitiveKind::I32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::I64(_) => PrimitiveKind::I64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::Char(_) => PrimitiveKind::Char,
            Self::String(_) => PrimitiveKind::String,
            _ => return None,
        })
    }

    /// Short name of the value's shape, used in mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        if let Some(kind) = self.primitive_kind() {
            return kind.name();
        }
        match self {
            Self::Enum(_) => "enum",
            Self::Nullable(_) => "nullable",
            Self::Pair(_) => "pair",
            Self::Struct(_) => "struct",
            Self::Object(_) => "object",
            Self::Null => "null",
            _ => "primitive",
        }
    }

    /// Try to get as object reference.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get struct field.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.get(name),
            _ => None,
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive!(
    bool => Bool,
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    ObjectRef => Object,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&ObjectRef> for Value {
    fn from(obj: &ObjectRef) -> Self {
        Self::Object(obj.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Self::nullable(v.map(Into::into))
    }
}
