// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Graph writer: type index, object identity and pending bodies for one
//! serialization session.

use crate::config::TypeStamping;
use crate::encoder::EncoderCache;
use crate::error::Result;
use crate::object::ObjectRef;
use crate::types::TypeDescriptor;
use crate::writer::identity::{IdentityTable, TypeIndex};
use crate::writer::PrimitiveWriter;
use crate::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Session state an encoder writes through.
pub trait ObjectWriter {
    /// Underlying primitive output.
    fn primitives(&mut self) -> &mut dyn PrimitiveWriter;

    /// Write the id of `actual`, assigning (and announcing) it on first sight.
    fn touch_and_write_type_id(&mut self, actual: &Arc<TypeDescriptor>) -> Result<i32>;

    /// Whether this particular instance is excluded from the stream.
    fn is_transient_instance(&self, obj: &ObjectRef) -> bool;

    /// Write the object id; a first-seen body is written later.
    fn write_object_id(&mut self, obj: &ObjectRef) -> Result<()>;

    /// Write the object id; a first-seen body may follow immediately.
    fn write_object_id_inline_eligible(&mut self, obj: &ObjectRef) -> Result<()>;
}

/// [`ObjectWriter`] for one graph.
///
/// Bodies of first-seen objects are queued and written in discovery order
/// by [`drain`](Self::drain). Only bodies of data-only types are written
/// inline right after their id; those reach only further data-only values,
/// so nesting on the call stack is bounded by type depth, not graph depth.
pub struct GraphWriter<'a> {
    out: &'a mut dyn PrimitiveWriter,
    encoders: &'a EncoderCache,
    stamping: TypeStamping,
    identity: IdentityTable,
    types: TypeIndex,
    pending: VecDeque<ObjectRef>,
}

impl<'a> GraphWriter<'a> {
    pub fn new(
        encoders: &'a EncoderCache,
        out: &'a mut dyn PrimitiveWriter,
        stamping: TypeStamping,
    ) -> Self {
        Self {
            out,
            encoders,
            stamping,
            identity: IdentityTable::new(),
            types: TypeIndex::seeded(encoders.known_type_names()),
            pending: VecDeque::new(),
        }
    }

    /// Write `value` in a slot of formal type `formal`, then every body it
    /// reaches.
    pub fn write_root(&mut self, formal: &Arc<TypeDescriptor>, value: &Value) -> Result<()> {
        let plan = self.encoders.slot_plan(formal)?;
        plan.write(self, value)?;
        self.drain()
    }

    /// Write queued bodies until none remain.
    pub fn drain(&mut self) -> Result<()> {
        while let Some(obj) = self.pending.pop_front() {
            self.write_body(&obj)?;
        }
        Ok(())
    }

    fn write_body(&mut self, obj: &ObjectRef) -> Result<()> {
        let encoder = self.encoders.encoder_for(obj.type_descriptor())?;
        encoder.write(self, obj)
    }

    pub fn identity(&self) -> &IdentityTable {
        &self.identity
    }

    pub fn type_index(&self) -> &TypeIndex {
        &self.types
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Assign an object id, returning it and whether it is new.
    fn assign_object_id(&mut self, obj: &ObjectRef) -> Result<(i32, bool)> {
        let (id, fresh) = self.identity.get_or_insert(obj);
        self.out.write_i32(id)?;
        if fresh {
            log::trace!("[GRAPH] object id {} -> {:?}", id, obj);
        }
        Ok((id, fresh))
    }
}

impl ObjectWriter for GraphWriter<'_> {
    fn primitives(&mut self) -> &mut dyn PrimitiveWriter {
        &mut *self.out
    }

    fn touch_and_write_type_id(&mut self, actual: &Arc<TypeDescriptor>) -> Result<i32> {
        let (id, fresh) = self.types.get_or_assign(actual.name_arc());
        self.out.write_i32(id)?;
        if fresh {
            log::trace!("[GRAPH] type id {} -> {}", id, actual.name());
            if self.stamping == TypeStamping::Full {
                self.out.write_str(actual.name())?;
            }
        }
        Ok(id)
    }

    fn is_transient_instance(&self, obj: &ObjectRef) -> bool {
        obj.type_descriptor().is_transient()
    }

    fn write_object_id(&mut self, obj: &ObjectRef) -> Result<()> {
        let (_, fresh) = self.assign_object_id(obj)?;
        if fresh {
            self.pending.push_back(obj.clone());
        }
        Ok(())
    }

    fn write_object_id_inline_eligible(&mut self, obj: &ObjectRef) -> Result<()> {
        let (_, fresh) = self.assign_object_id(obj)?;
        if !fresh {
            return Ok(());
        }
        if self.encoders.is_data_only(obj.type_descriptor()) {
            self.write_body(obj)
        } else {
            self.pending.push_back(obj.clone());
            Ok(())
        }
    }
}
