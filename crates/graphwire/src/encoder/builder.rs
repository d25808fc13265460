// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encoder builder and the memoized per-type encoder cache.
//!
//! An encoder for an actual type is built at most once per cache and then
//! shared by every thread. Builds run outside any lock; when two threads
//! race on the same type, the first published encoder wins and the other
//! build is dropped.

use crate::classify::check_legality;
use crate::config::{InlinePolicy, SerializerConfig};
use crate::encoder::array::ArrayPlan;
use crate::encoder::collection::{CollectionPlan, DictionaryPlan};
use crate::encoder::plan::{FieldPlan, PlanBuilder, SlotPlan};
use crate::encoder::value::write_fields;
use crate::error::{EncodeError, Result};
use crate::object::{ObjectData, ObjectRef};
use crate::types::{
    hooks_of, Hook, HookPhase, PrimitiveKind, TypeDescriptor, TypeKind, TypeRegistry,
};
use crate::writer::ObjectWriter;
use crate::Value;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How an object body is laid out.
#[derive(Debug, Clone)]
pub enum BodyPlan {
    /// Boxed value type instance, or the characters of a string.
    Boxed(SlotPlan),
    Array(ArrayPlan),
    Collection(CollectionPlan),
    Dictionary(DictionaryPlan),
    /// Class fields ordered by name.
    Fields(Vec<FieldPlan>),
}

impl BodyPlan {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Boxed(_) => "boxed value",
            Self::Array(_) => "array",
            Self::Collection(_) => "sequence",
            Self::Dictionary(_) => "map",
            Self::Fields(_) => "fields",
        }
    }
}

/// Reusable encoder for object bodies of one actual type.
#[derive(Debug)]
pub struct TypeEncoder {
    ty: Arc<TypeDescriptor>,
    pre_hooks: Vec<Hook>,
    post_hooks: Vec<Hook>,
    body: BodyPlan,
}

impl TypeEncoder {
    pub fn type_descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.ty
    }

    pub fn body(&self) -> &BodyPlan {
        &self.body
    }

    /// Write the body of `obj`.
    ///
    /// Pre hooks run first, then the body under the object's read lock,
    /// then post hooks once the lock is released.
    pub fn write(&self, w: &mut dyn ObjectWriter, obj: &ObjectRef) -> Result<()> {
        if obj.type_descriptor().name() != self.ty.name() {
            return Err(EncodeError::TypeMismatch {
                expected: self.ty.name().to_string(),
                found: obj.type_descriptor().name().to_string(),
            });
        }

        let receiver = if self.pre_hooks.is_empty() && self.post_hooks.is_empty() {
            Value::Null
        } else {
            Value::Object(obj.clone())
        };

        self.run_hooks(&self.pre_hooks, &receiver)?;
        {
            let data = obj.read();
            self.write_body(w, &data)?;
        }
        self.run_hooks(&self.post_hooks, &receiver)
    }

    fn write_body(&self, w: &mut dyn ObjectWriter, data: &ObjectData) -> Result<()> {
        match (&self.body, data) {
            (BodyPlan::Boxed(plan), ObjectData::Boxed(value)) => plan.write(w, value),
            (BodyPlan::Array(plan), ObjectData::Array(array)) => plan.write(w, array),
            (BodyPlan::Collection(plan), ObjectData::Sequence(items)) => plan.write(w, items),
            (BodyPlan::Dictionary(plan), ObjectData::Map(entries)) => plan.write(w, entries),
            (BodyPlan::Fields(fields), ObjectData::Fields(values)) => {
                write_fields(self.ty.name(), fields, values, w)
            }
            (BodyPlan::Fields(fields), ObjectData::Empty) if fields.is_empty() => Ok(()),
            (body, data) => Err(EncodeError::TypeMismatch {
                expected: format!("{} body for {}", body.kind_name(), self.ty.name()),
                found: data.kind_name().to_string(),
            }),
        }
    }

    fn run_hooks(&self, hooks: &[Hook], receiver: &Value) -> Result<()> {
        for hook in hooks {
            hook.invoke(receiver).map_err(|source| EncodeError::Hook {
                type_name: self.ty.name().to_string(),
                hook: hook.name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "encoder {}", self.ty.name())?;
        for hook in &self.pre_hooks {
            writeln!(f, "  pre {}", hook.name)?;
        }
        match &self.body {
            BodyPlan::Boxed(plan) => writeln!(f, "  boxed {}", plan)?,
            BodyPlan::Array(plan) => writeln!(f, "  array rank {} of {}", plan.rank, plan.element)?,
            BodyPlan::Collection(plan) => writeln!(f, "  collection of {}", plan.element)?,
            BodyPlan::Dictionary(plan) => {
                writeln!(f, "  dictionary of {} => {}", plan.key, plan.value)?
            }
            BodyPlan::Fields(fields) => {
                for field in fields {
                    writeln!(f, "  field {}: {}", field.name, field.plan)?;
                }
            }
        }
        for hook in &self.post_hooks {
            writeln!(f, "  post {}", hook.name)?;
        }
        Ok(())
    }
}

/// Memoized encoders keyed by type name.
///
/// Type names are unique within a registry; two descriptors with the same
/// name share one encoder.
pub struct EncoderCache {
    registry: Arc<dyn TypeRegistry>,
    policy: Arc<dyn InlinePolicy>,
    known_types: HashMap<Arc<str>, i32>,
    known_order: Vec<Arc<str>>,
    encoders: DashMap<Arc<str>, Arc<TypeEncoder>>,
    slots: DashMap<Arc<str>, Arc<SlotPlan>>,
}

impl EncoderCache {
    pub fn new(registry: Arc<dyn TypeRegistry>, config: &SerializerConfig) -> Self {
        let known_order: Vec<Arc<str>> = config
            .known_types
            .iter()
            .map(|ty| Arc::clone(ty.name_arc()))
            .collect();
        let known_types = known_order
            .iter()
            .enumerate()
            .map(|(id, name)| (Arc::clone(name), id as i32))
            .collect();
        Self {
            registry,
            policy: Arc::clone(&config.inline_policy),
            known_types,
            known_order,
            encoders: DashMap::new(),
            slots: DashMap::new(),
        }
    }

    /// Encoder for object bodies of actual type `ty`, built on first use.
    pub fn encoder_for(&self, ty: &Arc<TypeDescriptor>) -> Result<Arc<TypeEncoder>> {
        if let Some(encoder) = self.encoders.get(ty.name()) {
            return Ok(Arc::clone(encoder.value()));
        }
        let built = self.build(ty)?;
        Ok(publish(&self.encoders, ty.name_arc(), built, "encoder"))
    }

    /// Plan for a slot of formal type `formal`, built on first use.
    pub fn slot_plan(&self, formal: &Arc<TypeDescriptor>) -> Result<Arc<SlotPlan>> {
        if let Some(plan) = self.slots.get(formal.name()) {
            return Ok(Arc::clone(plan.value()));
        }
        let built = self.plan_builder().slot(formal)?;
        Ok(publish(&self.slots, formal.name_arc(), built, "slot plan"))
    }

    /// Number of cached type encoders.
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Names of pre-registered types in fixed-id order.
    pub fn known_type_names(&self) -> &[Arc<str>] {
        &self.known_order
    }

    pub fn registry(&self) -> &dyn TypeRegistry {
        self.registry.as_ref()
    }

    pub(crate) fn is_data_only(&self, ty: &TypeDescriptor) -> bool {
        self.policy.is_data_only(ty, self.registry.as_ref())
    }

    fn plan_builder(&self) -> PlanBuilder<'_> {
        PlanBuilder::new(self.registry.as_ref(), &self.known_types, self.policy.as_ref())
    }

    fn build(&self, ty: &Arc<TypeDescriptor>) -> Result<TypeEncoder> {
        check_legality(ty)?;
        let mut plans = self.plan_builder();
        let body = match &ty.kind {
            _ if ty.is_value_type() => BodyPlan::Boxed(plans.value(ty)?),
            TypeKind::Primitive(PrimitiveKind::String) => {
                BodyPlan::Boxed(SlotPlan::Primitive(PrimitiveKind::String))
            }
            TypeKind::Array { element, rank } => BodyPlan::Array(ArrayPlan {
                type_name: Arc::clone(ty.name_arc()),
                rank: *rank,
                element: plans.slot_ref(element)?,
            }),
            TypeKind::Collection { element, generic } => BodyPlan::Collection(CollectionPlan {
                type_name: Arc::clone(ty.name_arc()),
                element: if *generic {
                    plans.slot_ref(element)?
                } else {
                    plans.slot(&TypeDescriptor::object())?
                },
            }),
            TypeKind::Dictionary {
                key,
                value,
                generic,
            } => {
                let (key, value) = if *generic {
                    (plans.slot_ref(key)?, plans.slot_ref(value)?)
                } else {
                    let object = TypeDescriptor::object();
                    (plans.slot(&object)?, plans.slot(&object)?)
                };
                BodyPlan::Dictionary(DictionaryPlan {
                    type_name: Arc::clone(ty.name_arc()),
                    key,
                    value,
                })
            }
            TypeKind::Class(_) | TypeKind::Object => BodyPlan::Fields(plans.fields(ty)?),
            _ => return Err(EncodeError::NotInstantiable(ty.name().to_string())),
        };

        Ok(TypeEncoder {
            ty: Arc::clone(ty),
            pre_hooks: hooks_of(ty, self.registry.as_ref(), HookPhase::Pre)?,
            post_hooks: hooks_of(ty, self.registry.as_ref(), HookPhase::Post)?,
            body,
        })
    }
}

impl fmt::Debug for EncoderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderCache")
            .field("known_types", &self.known_order)
            .field("policy", &self.policy)
            .field("encoders", &self.encoders.len())
            .field("slot_plans", &self.slots.len())
            .finish()
    }
}

/// Insert `built` unless another thread got there first; return the winner.
fn publish<T>(map: &DashMap<Arc<str>, Arc<T>>, key: &Arc<str>, built: T, what: &str) -> Arc<T> {
    match map.entry(Arc::clone(key)) {
        Entry::Occupied(existing) => {
            log::debug!("[ENCODER] discarding redundant {} build for {}", what, key);
            Arc::clone(existing.get())
        }
        Entry::Vacant(slot) => {
            log::debug!("[ENCODER] built {} for {}", what, key);
            let published = Arc::new(built);
            slot.insert(Arc::clone(&published));
            published
        }
    }
}
