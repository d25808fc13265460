// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collection and dictionary encoders.
//!
//! Collections: `[count:i32][elements...]`.
//! Dictionaries: `[count:i32]([key][value])*count`, in enumeration order.

use crate::encoder::plan::SlotPlan;
use crate::error::Result;
use crate::writer::ObjectWriter;
use crate::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CollectionPlan {
    pub type_name: Arc<str>,
    /// Declared element type, or `object` for non-generic collections.
    pub element: SlotPlan,
}

impl CollectionPlan {
    pub fn write(&self, w: &mut dyn ObjectWriter, elements: &[Value]) -> Result<()> {
        w.primitives().write_length(elements.len())?;
        for (i, element) in elements.iter().enumerate() {
            self.element
                .write(w, element)
                .map_err(|e| e.in_field(&self.type_name, &format!("[{}]", i)))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DictionaryPlan {
    pub type_name: Arc<str>,
    pub key: SlotPlan,
    pub value: SlotPlan,
}

impl DictionaryPlan {
    pub fn write(&self, w: &mut dyn ObjectWriter, entries: &[(Value, Value)]) -> Result<()> {
        w.primitives().write_length(entries.len())?;
        for (i, (key, value)) in entries.iter().enumerate() {
            self.key
                .write(w, key)
                .map_err(|e| e.in_field(&self.type_name, &format!("key[{}]", i)))?;
            self.value
                .write(w, value)
                .map_err(|e| e.in_field(&self.type_name, &format!("value[{}]", i)))?;
        }
        Ok(())
    }
}
