// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value encoder: primitives, enums, nullables, pairs and structs inline.

use crate::config::{NULLABLE_ABSENT, NULLABLE_PRESENT};
use crate::encoder::plan::{FieldPlan, SlotPlan};
use crate::error::{EncodeError, Result};
use crate::types::PrimitiveKind;
use crate::writer::{ObjectWriter, PrimitiveWriter};
use crate::Value;
use std::collections::HashMap;

pub(crate) fn write_value(plan: &SlotPlan, w: &mut dyn ObjectWriter, value: &Value) -> Result<()> {
    match plan {
        SlotPlan::Primitive(kind) => write_primitive(*kind, w.primitives(), value),
        SlotPlan::Enum {
            type_name,
            underlying,
        } => match value {
            Value::Enum(v) => write_enum(type_name, *underlying, *v, w.primitives()),
            other => Err(EncodeError::mismatch(&**type_name, other)),
        },
        SlotPlan::Nullable(inner) => match value {
            Value::Null | Value::Nullable(None) => w.primitives().write_u8(NULLABLE_ABSENT),
            Value::Nullable(Some(v)) => {
                w.primitives().write_u8(NULLABLE_PRESENT)?;
                inner.write(w, v)
            }
            v => {
                w.primitives().write_u8(NULLABLE_PRESENT)?;
                inner.write(w, v)
            }
        },
        SlotPlan::Pair(key, val) => match value {
            Value::Pair(pair) => {
                key.write(w, &pair.0)?;
                val.write(w, &pair.1)
            }
            other => Err(EncodeError::mismatch("pair", other)),
        },
        SlotPlan::Struct { type_name, fields } => match value {
            Value::Struct(values) => write_fields(type_name, fields, values, w),
            other => Err(EncodeError::mismatch(&**type_name, other)),
        },
        SlotPlan::Skip | SlotPlan::Reference(_) => plan.write(w, value),
    }
}

/// Write `fields` in plan order, taking each value from `values`.
pub(crate) fn write_fields(
    type_name: &str,
    fields: &[FieldPlan],
    values: &HashMap<String, Value>,
    w: &mut dyn ObjectWriter,
) -> Result<()> {
    for field in fields {
        let value = values.get(&field.name).ok_or_else(|| EncodeError::MissingField {
            type_name: type_name.to_string(),
            field: field.name.clone(),
        })?;
        field
            .plan
            .write(w, value)
            .map_err(|e| e.in_field(type_name, &field.name))?;
    }
    Ok(())
}

fn write_primitive(kind: PrimitiveKind, out: &mut dyn PrimitiveWriter, value: &Value) -> Result<()> {
    match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(v)) => out.write_bool(*v),
        (PrimitiveKind::U8, Value::U8(v)) => out.write_u8(*v),
        (PrimitiveKind::I8, Value::I8(v)) => out.write_i8(*v),
        (PrimitiveKind::U16, Value::U16(v)) => out.write_u16(*v),
        (PrimitiveKind::I16, Value::I16(v)) => out.write_i16(*v),
        (PrimitiveKind::U32, Value::U32(v)) => out.write_u32(*v),
        (PrimitiveKind::I32, Value::I32(v)) => out.write_i32(*v),
        (PrimitiveKind::U64, Value::U64(v)) => out.write_u64(*v),
        (PrimitiveKind::I64, Value::I64(v)) => out.write_i64(*v),
        (PrimitiveKind::F32, Value::F32(v)) => out.write_f32(*v),
        (PrimitiveKind::F64, Value::F64(v)) => out.write_f64(*v),
        (PrimitiveKind::Char, Value::Char(v)) => out.write_char(*v),
        (PrimitiveKind::String, Value::String(v)) => out.write_str(v),
        (kind, other) => Err(EncodeError::mismatch(kind.name(), other)),
    }
}

/// Narrow an enum value to its underlying integer width.
macro_rules! write_narrowed {
    ($out:expr, $type_name:expr, $value:expr, $underlying:expr, $($kind:ident => $ty:ty: $method:ident),* $(,)?) => {
        match $underlying {
            $(
                PrimitiveKind::$kind => {
                    let narrowed = <$ty>::try_from($value).map_err(|_| EncodeError::ValueOutOfRange {
                        type_name: $type_name.to_string(),
                        value: $value,
                    })?;
                    $out.$method(narrowed)
                }
            )*
            other => Err(EncodeError::UnsupportedType {
                type_name: $type_name.to_string(),
                reason: format!("{} cannot back an enum", other.name()),
            }),
        }
    };
}

fn write_enum(
    type_name: &str,
    underlying: PrimitiveKind,
    value: i64,
    out: &mut dyn PrimitiveWriter,
) -> Result<()> {
    write_narrowed!(out, type_name, value, underlying,
        U8 => u8: write_u8,
        I8 => i8: write_i8,
        U16 => u16: write_u16,
        I16 => i16: write_i16,
        U32 => u32: write_u32,
        I32 => i32: write_i32,
        U64 => u64: write_u64,
        I64 => i64: write_i64,
    )
}
