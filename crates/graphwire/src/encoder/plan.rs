// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-slot write plans.
//!
//! A slot is anything with a formal type: a field, an array element, a
//! collection element, a dictionary key or value, the root. Its plan is
//! decided once from the formal type and then replayed for every value.

use crate::classify::{check_legality, classify, SerializationType};
use crate::config::InlinePolicy;
use crate::encoder::value;
use crate::error::{EncodeError, Result};
use crate::types::{fields_of, resolve, PrimitiveKind, TypeDescriptor, TypeKind, TypeRef, TypeRegistry};
use crate::writer::ObjectWriter;
use crate::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How one slot is written.
#[derive(Debug, Clone)]
pub enum SlotPlan {
    /// Transient formal type: nothing is written.
    Skip,
    Primitive(PrimitiveKind),
    Enum {
        type_name: Arc<str>,
        underlying: PrimitiveKind,
    },
    /// Presence flag, then the underlying value when present.
    Nullable(Box<SlotPlan>),
    /// Key then value, each planned from its own formal type.
    Pair(Box<SlotPlan>, Box<SlotPlan>),
    /// Fields inline, ordered by name.
    Struct {
        type_name: Arc<str>,
        fields: Vec<FieldPlan>,
    },
    Reference(ReferencePlan),
}

impl SlotPlan {
    /// Write `value` according to this plan.
    pub fn write(&self, w: &mut dyn ObjectWriter, value: &Value) -> Result<()> {
        match self {
            Self::Skip => Ok(()),
            Self::Reference(plan) => plan.write(w, value),
            _ => value::write_value(self, w, value),
        }
    }

    pub fn serialization_type(&self) -> SerializationType {
        match self {
            Self::Skip => SerializationType::Transient,
            Self::Reference(_) => SerializationType::Reference,
            _ => SerializationType::Value,
        }
    }
}

/// A named field and its plan.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub name: String,
    pub plan: SlotPlan,
}

/// Which identity write follows the type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityWrite {
    Plain,
    /// The body may follow the id at first occurrence.
    InlineEligible,
}

/// Reference slot strategy, fixed when the plan is built.
#[derive(Debug, Clone)]
pub struct ReferencePlan {
    /// Formal type name.
    pub formal: Arc<str>,
    /// The formal type has no subtypes; the actual type must match it.
    pub sealed: bool,
    /// Type id baked in for a sealed, pre-registered formal type.
    pub fixed_type_id: Option<i32>,
    /// Ask the writer whether the instance is transient.
    pub check_transient: bool,
    /// `None` for a sealed transient formal type.
    pub identity: Option<IdentityWrite>,
}

/// Builds slot plans against a registry.
pub(crate) struct PlanBuilder<'a> {
    registry: &'a dyn TypeRegistry,
    known_types: &'a HashMap<Arc<str>, i32>,
    policy: &'a dyn InlinePolicy,
    /// Value structs being planned, to catch by-value recursion.
    value_stack: Vec<Arc<str>>,
}

impl<'a> PlanBuilder<'a> {
    pub(crate) fn new(
        registry: &'a dyn TypeRegistry,
        known_types: &'a HashMap<Arc<str>, i32>,
        policy: &'a dyn InlinePolicy,
    ) -> Self {
        Self {
            registry,
            known_types,
            policy,
            value_stack: Vec::new(),
        }
    }

    /// Plan for a slot of formal type `formal`.
    pub(crate) fn slot(&mut self, formal: &Arc<TypeDescriptor>) -> Result<SlotPlan> {
        check_legality(formal)?;
        match classify(formal) {
            SerializationType::Transient => Ok(SlotPlan::Skip),
            SerializationType::Value => self.value(formal),
            SerializationType::Reference => Ok(SlotPlan::Reference(self.reference(formal))),
        }
    }

    pub(crate) fn slot_ref(&mut self, formal: &TypeRef) -> Result<SlotPlan> {
        let ty = resolve(formal, self.registry)?;
        self.slot(&ty)
    }

    /// Inline plan for a value type, ignoring its transient marker.
    pub(crate) fn value(&mut self, formal: &Arc<TypeDescriptor>) -> Result<SlotPlan> {
        check_legality(formal)?;
        match &formal.kind {
            TypeKind::Primitive(kind) => Ok(SlotPlan::Primitive(*kind)),
            TypeKind::Enum(desc) => Ok(SlotPlan::Enum {
                type_name: Arc::clone(formal.name_arc()),
                underlying: desc.underlying,
            }),
            TypeKind::Nullable(underlying) => {
                let underlying = resolve(underlying, self.registry)?;
                if !underlying.is_value_type() {
                    return Err(EncodeError::UnsupportedType {
                        type_name: formal.name().to_string(),
                        reason: format!("{} is not a value type", underlying.name()),
                    });
                }
                Ok(SlotPlan::Nullable(Box::new(self.value(&underlying)?)))
            }
            TypeKind::Pair { key, value } => Ok(SlotPlan::Pair(
                Box::new(self.slot_ref(key)?),
                Box::new(self.slot_ref(value)?),
            )),
            TypeKind::Struct(_) => {
                if self.value_stack.iter().any(|n| &**n == formal.name()) {
                    return Err(EncodeError::RecursiveValueType(formal.name().to_string()));
                }
                self.value_stack.push(Arc::clone(formal.name_arc()));
                let fields = self.fields(formal);
                self.value_stack.pop();
                Ok(SlotPlan::Struct {
                    type_name: Arc::clone(formal.name_arc()),
                    fields: fields?,
                })
            }
            _ => Err(EncodeError::UnsupportedType {
                type_name: formal.name().to_string(),
                reason: "not a value type".into(),
            }),
        }
    }

    /// Own and inherited fields ordered by name, transient ones dropped.
    pub(crate) fn fields(&mut self, ty: &Arc<TypeDescriptor>) -> Result<Vec<FieldPlan>> {
        let mut fields = fields_of(ty, self.registry)?;
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(dup) = fields.windows(2).find(|pair| pair[0].name == pair[1].name) {
            return Err(EncodeError::DuplicateField {
                type_name: ty.name().to_string(),
                field: dup[0].name.clone(),
            });
        }

        let mut plans = Vec::with_capacity(fields.len());
        for field in fields.into_iter().filter(|f| !f.transient) {
            let plan = self
                .slot_ref(&field.field_type)
                .map_err(|e| e.in_field(ty.name(), &field.name))?;
            if matches!(plan, SlotPlan::Skip) {
                continue;
            }
            plans.push(FieldPlan {
                name: field.name,
                plan,
            });
        }
        Ok(plans)
    }

    /// Reference strategy for a formal type.
    pub(crate) fn reference(&self, formal: &TypeDescriptor) -> ReferencePlan {
        let sealed = formal.is_sealed();
        let fixed_type_id = if sealed {
            self.known_types.get(formal.name()).copied()
        } else {
            None
        };
        let identity_kind = if formal.is_object() || self.policy.is_data_only(formal, self.registry) {
            IdentityWrite::InlineEligible
        } else {
            IdentityWrite::Plain
        };
        let (check_transient, identity) = match (sealed, formal.is_transient()) {
            (true, true) => (true, None),
            (true, false) => (false, Some(identity_kind)),
            (false, _) => (true, Some(identity_kind)),
        };
        ReferencePlan {
            formal: Arc::clone(formal.name_arc()),
            sealed,
            fixed_type_id,
            check_transient,
            identity,
        }
    }
}

impl fmt::Display for SlotPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Primitive(kind) => f.write_str(kind.name()),
            Self::Enum {
                type_name,
                underlying,
            } => write!(f, "enum {} as {}", type_name, underlying.name()),
            Self::Nullable(inner) => write!(f, "nullable<{}>", inner),
            Self::Pair(key, value) => write!(f, "pair<{}, {}>", key, value),
            Self::Struct { type_name, fields } => {
                write!(f, "struct {} {{", type_name)?;
                for (i, field) in fields.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{}{}: {}", sep, field.name, field.plan)?;
                }
                f.write_str(" }")
            }
            Self::Reference(plan) => fmt::Display::fmt(plan, f),
        }
    }
}

impl fmt::Display for ReferencePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref {} [type-id ", self.formal)?;
        match self.fixed_type_id {
            Some(id) => write!(f, "{}", id)?,
            None => f.write_str("runtime")?,
        }
        if self.check_transient {
            f.write_str(", transient-check")?;
        }
        let id = match self.identity {
            Some(IdentityWrite::Plain) => "plain",
            Some(IdentityWrite::InlineEligible) => "inline-eligible",
            None => "none",
        };
        write!(f, ", id {}]", id)
    }
}
