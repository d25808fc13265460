// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Array encoder.
//!
//! Wire layout: `[rank:i32][length:i32]*rank[elements...]`, elements in
//! row-major order (last dimension varies fastest).

use crate::encoder::plan::SlotPlan;
use crate::error::{EncodeError, Result};
use crate::object::ArrayValue;
use crate::writer::ObjectWriter;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ArrayPlan {
    pub type_name: Arc<str>,
    pub rank: usize,
    /// Plan for the declared element type.
    pub element: SlotPlan,
}

impl ArrayPlan {
    pub fn write(&self, w: &mut dyn ObjectWriter, array: &ArrayValue) -> Result<()> {
        if array.rank() != self.rank {
            return Err(EncodeError::InvalidArray {
                type_name: self.type_name.to_string(),
                reason: format!("rank {} does not match declared rank {}", array.rank(), self.rank),
            });
        }

        let out = w.primitives();
        out.write_length(self.rank)?;
        for len in array.lengths() {
            out.write_length(*len)?;
        }

        let mut index = MultiIndex::new(array.lengths());
        for element in array.elements() {
            self.element
                .write(w, element)
                .map_err(|e| e.in_field(&self.type_name, &index.to_string()))?;
            index.advance();
        }
        Ok(())
    }
}

/// Row-major odometer over an array's dimensions, used to name the element
/// being written in error context.
struct MultiIndex<'a> {
    lengths: &'a [usize],
    current: Vec<usize>,
}

impl<'a> MultiIndex<'a> {
    fn new(lengths: &'a [usize]) -> Self {
        Self {
            lengths,
            current: vec![0; lengths.len()],
        }
    }

    fn advance(&mut self) {
        for dim in (0..self.current.len()).rev() {
            self.current[dim] += 1;
            if self.current[dim] < self.lengths[dim] {
                return;
            }
            self.current[dim] = 0;
        }
    }
}

impl std::fmt::Display for MultiIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, idx) in self.current.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", idx)?;
        }
        f.write_str("]")
    }
}
