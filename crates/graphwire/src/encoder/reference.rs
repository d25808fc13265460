// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reference encoder: null marker, type id, transient check, object id.

use crate::config::NULL_REFERENCE_MARKER;
use crate::encoder::plan::{IdentityWrite, ReferencePlan};
use crate::error::{EncodeError, Result};
use crate::object::ObjectRef;
use crate::types::TypeDescriptor;
use crate::writer::ObjectWriter;
use crate::Value;

impl ReferencePlan {
    /// Write one reference slot.
    ///
    /// A primitive in a reference slot is boxed into a fresh object of its
    /// natural type first.
    pub fn write(&self, w: &mut dyn ObjectWriter, value: &Value) -> Result<()> {
        let obj = match value {
            Value::Null => return w.primitives().write_i32(NULL_REFERENCE_MARKER),
            Value::Object(obj) => obj.clone(),
            other => box_value(other)?,
        };

        if self.sealed && obj.type_descriptor().name() != &*self.formal {
            return Err(EncodeError::TypeMismatch {
                expected: self.formal.to_string(),
                found: obj.type_descriptor().name().to_string(),
            });
        }

        match self.fixed_type_id {
            Some(id) => w.primitives().write_i32(id)?,
            None => {
                w.touch_and_write_type_id(obj.type_descriptor())?;
            }
        }

        if self.check_transient && w.is_transient_instance(&obj) {
            return Ok(());
        }

        match self.identity {
            Some(IdentityWrite::Plain) => w.write_object_id(&obj),
            Some(IdentityWrite::InlineEligible) => w.write_object_id_inline_eligible(&obj),
            None => Ok(()),
        }
    }
}

/// Box an inline value under its natural type.
fn box_value(value: &Value) -> Result<ObjectRef> {
    match value.primitive_kind() {
        Some(kind) => Ok(ObjectRef::boxed(
            &TypeDescriptor::primitive(kind),
            value.clone(),
        )),
        None => Err(EncodeError::mismatch("object reference", value)),
    }
}
