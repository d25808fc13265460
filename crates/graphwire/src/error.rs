// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Errors raised while building encoders or writing a graph.

use thiserror::Error;

/// Error returned by a failing pre/post-serialization hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Encoding errors.
///
/// Build-time variants abort encoder construction for a type; write-time
/// variants abandon the whole graph. Partial output must be discarded by the
/// caller in both cases.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The type has no legal serialization form (pointer, delegate, ...).
    #[error("unsupported type {type_name}: {reason}")]
    UnsupportedType { type_name: String, reason: String },

    /// A named type reference could not be resolved by the registry.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A value type contains itself by value.
    #[error("value type {0} contains itself by value")]
    RecursiveValueType(String),

    /// Two fields (own or inherited) share a name.
    #[error("type {type_name} declares field {field} more than once")]
    DuplicateField { type_name: String, field: String },

    /// The type can be a formal type but never the actual type of an instance.
    #[error("type {0} cannot be instantiated")]
    NotInstantiable(String),

    /// The runtime value does not have the shape the formal type requires.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A non-transient field is absent from the value.
    #[error("missing field {field} on {type_name}")]
    MissingField { type_name: String, field: String },

    /// Array lengths and element count disagree.
    #[error("invalid array for {type_name}: {reason}")]
    InvalidArray { type_name: String, reason: String },

    /// Enum value does not fit the underlying integer type.
    #[error("value {value} out of range for {type_name}")]
    ValueOutOfRange { type_name: String, value: i64 },

    /// A hook method failed.
    #[error("hook {hook} on {type_name} failed: {source}")]
    Hook {
        type_name: String,
        hook: String,
        #[source]
        source: HookError,
    },

    /// A count or length does not fit the wire `i32`.
    #[error("length {0} exceeds the wire limit")]
    LengthOverflow(usize),

    /// Underlying stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Context wrapper naming the field being written when `source` occurred.
    #[error("{type_name}.{field}: {source}")]
    Field {
        type_name: String,
        field: String,
        #[source]
        source: Box<EncodeError>,
    },
}

impl EncodeError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: &crate::Value) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.kind_name().to_string(),
        }
    }

    pub(crate) fn in_field(self, type_name: &str, field: &str) -> Self {
        Self::Field {
            type_name: type_name.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// `true` when the error comes from encoder construction rather than
    /// from writing a particular value.
    pub fn is_build_error(&self) -> bool {
        match self {
            Self::UnsupportedType { .. }
            | Self::UnknownType(_)
            | Self::RecursiveValueType(_)
            | Self::DuplicateField { .. }
            | Self::NotInstantiable(_) => true,
            Self::Field { source, .. } => source.is_build_error(),
            _ => false,
        }
    }

    /// Innermost error, skipping field context wrappers.
    pub fn root_cause(&self) -> &EncodeError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EncodeError>;
