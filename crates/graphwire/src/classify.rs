// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type classification and legality checks.

use crate::error::{EncodeError, Result};
use crate::types::{TypeDescriptor, TypeKind};
use std::fmt;

/// How values of a formal type are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializationType {
    /// Skipped entirely.
    Transient,
    /// Written inline, no identity.
    Value,
    /// Written through type id + object identity.
    Reference,
}

impl fmt::Display for SerializationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Transient => "transient",
            Self::Value => "value",
            Self::Reference => "reference",
        };
        f.write_str(s)
    }
}

/// Classify a formal type. Pure function of the descriptor.
pub fn classify(ty: &TypeDescriptor) -> SerializationType {
    if ty.is_transient() {
        SerializationType::Transient
    } else if ty.is_value_type() {
        SerializationType::Value
    } else {
        SerializationType::Reference
    }
}

/// Fail if `ty` has no legal serialized form.
pub fn check_legality(ty: &TypeDescriptor) -> Result<()> {
    let unsupported = |reason: &str| {
        Err(EncodeError::UnsupportedType {
            type_name: ty.name().to_string(),
            reason: reason.to_string(),
        })
    };
    match &ty.kind {
        TypeKind::Pointer => unsupported("pointers cannot be serialized"),
        TypeKind::Delegate => unsupported("delegates cannot be serialized"),
        TypeKind::Array { rank: 0, .. } => unsupported("array rank must be at least 1"),
        TypeKind::Enum(e) if !e.underlying.is_integer() => {
            unsupported("enum underlying type must be an integer")
        }
        _ => Ok(()),
    }
}
