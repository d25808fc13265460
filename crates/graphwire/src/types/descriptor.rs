// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use crate::error::HookError;
use crate::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Char,
    String,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 13] = [
        Self::Bool,
        Self::U8,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::U32,
        Self::I32,
        Self::U64,
        Self::I64,
        Self::F32,
        Self::F64,
        Self::Char,
        Self::String,
    ];

    /// Get the size in bytes (None for strings).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 | Self::Char => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::String => None,
        }
    }

    /// Canonical type name, also the registry key of the built-in descriptor.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "string",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Integer kinds may back an enum.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::U8 | Self::I8 | Self::U16 | Self::I16 | Self::U32 | Self::I32 | Self::U64 | Self::I64
        )
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }
}

/// Reference to a type from inside another descriptor.
///
/// `Named` references are resolved through a [`TypeRegistry`](super::TypeRegistry)
/// when an encoder is built, which is what makes self-referential classes
/// expressible.
#[derive(Clone)]
pub enum TypeRef {
    Resolved(Arc<TypeDescriptor>),
    Named(Arc<str>),
}

impl TypeRef {
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Named(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Resolved(ty) => ty.name(),
            Self::Named(name) => name,
        }
    }
}

impl From<Arc<TypeDescriptor>> for TypeRef {
    fn from(ty: Arc<TypeDescriptor>) -> Self {
        Self::Resolved(ty)
    }
}

impl From<&Arc<TypeDescriptor>> for TypeRef {
    fn from(ty: &Arc<TypeDescriptor>) -> Self {
        Self::Resolved(Arc::clone(ty))
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Resolved(TypeDescriptor::primitive(kind))
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

// Descriptors may reference each other; only print names.
impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(ty) => write!(f, "{}", ty.name()),
            Self::Named(name) => write!(f, "@{}", name),
        }
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Enumeration, written through its underlying integer.
    Enum(EnumDescriptor),
    /// Nullable wrapper around a value type.
    Nullable(TypeRef),
    /// Key/value pair.
    Pair { key: TypeRef, value: TypeRef },
    /// Plain value struct.
    Struct(Vec<FieldDescriptor>),
    /// The root reference type every class derives from.
    Object,
    /// Abstract reference type; never the actual type of an instance.
    Interface,
    /// Reference type with fields and an optional base class.
    Class(ClassDescriptor),
    /// Array of `rank` dimensions.
    Array { element: TypeRef, rank: usize },
    /// Sequential collection with a count.
    Collection { element: TypeRef, generic: bool },
    /// Key/value collection with a count.
    Dictionary {
        key: TypeRef,
        value: TypeRef,
        generic: bool,
    },
    /// Raw pointer; has no serialized form.
    Pointer,
    /// Callable; has no serialized form.
    Delegate,
}

/// Static markers carried by a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeFlags {
    /// No subtypes can exist.
    pub sealed: bool,
    /// Values of this type are never serialized.
    pub transient: bool,
}

/// A complete type descriptor.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: Arc<str>,
    /// Type kind.
    pub kind: TypeKind,
    /// Sealed/transient markers.
    pub flags: TypeFlags,
    /// Pre/post-serialization hooks, in declaration order.
    pub hooks: Vec<Hook>,
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<Arc<str>>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            flags: TypeFlags::default(),
            hooks: Vec::new(),
        }
    }

    /// Shared built-in descriptor for a primitive kind.
    pub fn primitive(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        static PRIMITIVES: OnceLock<Vec<Arc<TypeDescriptor>>> = OnceLock::new();
        let table = PRIMITIVES.get_or_init(|| {
            PrimitiveKind::ALL
                .iter()
                .map(|k| Arc::new(TypeDescriptor::new(k.name(), TypeKind::Primitive(*k)).sealed()))
                .collect()
        });
        Arc::clone(&table[kind.index()])
    }

    /// Shared built-in `object` descriptor.
    pub fn object() -> Arc<TypeDescriptor> {
        static OBJECT: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
        Arc::clone(OBJECT.get_or_init(|| Arc::new(TypeDescriptor::new("object", TypeKind::Object))))
    }

    /// `T[]`, `T[,]`, ... for `rank` dimensions.
    pub fn array_of(element: impl Into<TypeRef>, rank: usize) -> Arc<TypeDescriptor> {
        let element = element.into();
        let commas = ",".repeat(rank.saturating_sub(1));
        let name = format!("{}[{}]", element.name(), commas);
        Arc::new(Self::new(name, TypeKind::Array { element, rank }))
    }

    pub fn nullable_of(underlying: impl Into<TypeRef>) -> Arc<TypeDescriptor> {
        let underlying = underlying.into();
        let name = format!("Nullable<{}>", underlying.name());
        Arc::new(Self::new(name, TypeKind::Nullable(underlying)))
    }

    pub fn pair_of(key: impl Into<TypeRef>, value: impl Into<TypeRef>) -> Arc<TypeDescriptor> {
        let (key, value) = (key.into(), value.into());
        let name = format!("KeyValuePair<{},{}>", key.name(), value.name());
        Arc::new(Self::new(name, TypeKind::Pair { key, value }))
    }

    /// Generic list of `element`.
    pub fn list_of(element: impl Into<TypeRef>) -> Arc<TypeDescriptor> {
        let element = element.into();
        let name = format!("List<{}>", element.name());
        Arc::new(Self::new(
            name,
            TypeKind::Collection {
                element,
                generic: true,
            },
        ))
    }

    /// Generic dictionary from `key` to `value`.
    pub fn dictionary_of(key: impl Into<TypeRef>, value: impl Into<TypeRef>) -> Arc<TypeDescriptor> {
        let (key, value) = (key.into(), value.into());
        let name = format!("Dictionary<{},{}>", key.name(), value.name());
        Arc::new(Self::new(
            name,
            TypeKind::Dictionary {
                key,
                value,
                generic: true,
            },
        ))
    }

    /// Non-generic collection; elements are written as `object`.
    pub fn array_list() -> Arc<TypeDescriptor> {
        Arc::new(Self::new(
            "ArrayList",
            TypeKind::Collection {
                element: TypeRef::from(Self::object()),
                generic: false,
            },
        ))
    }

    /// Non-generic dictionary; keys and values are written as `object`.
    pub fn hashtable() -> Arc<TypeDescriptor> {
        let object = TypeRef::from(Self::object());
        Arc::new(Self::new(
            "Hashtable",
            TypeKind::Dictionary {
                key: object.clone(),
                value: object,
                generic: false,
            },
        ))
    }

    /// Mark as sealed.
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.flags.sealed = true;
        self
    }

    /// Mark as transient.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.flags.transient = true;
        self
    }

    /// Attach a hook.
    #[must_use]
    pub fn with_hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    /// Value types are written inline and carry no identity.
    ///
    /// `string` is a primitive but not a value type: a string slot may be
    /// null and one string instance may be shared.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Primitive(kind) if kind != PrimitiveKind::String
        ) || matches!(
            self.kind,
            TypeKind::Enum(_)
                | TypeKind::Nullable(_)
                | TypeKind::Pair { .. }
                | TypeKind::Struct(_)
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array { .. })
    }

    /// Array rank, `None` for non-arrays.
    pub fn rank(&self) -> Option<usize> {
        match self.kind {
            TypeKind::Array { rank, .. } => Some(rank),
            _ => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, TypeKind::Nullable(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object)
    }

    /// Primitives, value types and arrays can never have subtypes; other
    /// types only when explicitly marked.
    pub fn is_sealed(&self) -> bool {
        match self.kind {
            TypeKind::Object | TypeKind::Interface => false,
            TypeKind::Primitive(_) => true,
            _ => self.flags.sealed || self.is_value_type() || self.is_array(),
        }
    }

    /// `true` for the built-in `string` type.
    pub fn is_string(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(PrimitiveKind::String))
    }

    pub fn is_transient(&self) -> bool {
        self.flags.transient
    }

    /// Fields declared directly on this type (no inherited ones).
    pub fn declared_fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            TypeKind::Struct(fields) => fields,
            TypeKind::Class(class) => &class.fields,
            _ => &[],
        }
    }

    /// Base class, if any.
    pub fn base(&self) -> Option<&TypeRef> {
        match &self.kind {
            TypeKind::Class(class) => class.base.as_ref(),
            _ => None,
        }
    }

    /// Hooks of `phase` declared directly on this type.
    pub fn declared_hooks(&self, phase: HookPhase) -> impl Iterator<Item = &Hook> {
        self.hooks.iter().filter(move |h| h.phase == phase)
    }
}

/// Field descriptor for struct and class members.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Declared (formal) type.
    pub field_type: TypeRef,
    /// Excluded from serialization.
    pub transient: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            transient: false,
        }
    }

    /// Mark as transient.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

/// Class body: own fields plus optional base class.
#[derive(Debug, Clone, Default)]
pub struct ClassDescriptor {
    pub fields: Vec<FieldDescriptor>,
    pub base: Option<TypeRef>,
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    /// Enum variants.
    pub variants: Vec<EnumVariant>,
    /// Underlying type (default i32).
    pub underlying: PrimitiveKind,
}

impl EnumDescriptor {
    pub fn new(variants: Vec<EnumVariant>) -> Self {
        Self {
            variants,
            underlying: PrimitiveKind::I32,
        }
    }

    /// Create with specific underlying type.
    pub fn with_underlying(mut self, underlying: PrimitiveKind) -> Self {
        self.underlying = underlying;
        self
    }

    /// Get variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// Enum variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    pub name: String,
    pub value: i64,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// When a hook runs relative to the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Pre,
    Post,
}

pub type InstanceHookFn = dyn Fn(&Value) -> Result<(), HookError> + Send + Sync;
pub type StaticHookFn = dyn Fn() -> Result<(), HookError> + Send + Sync;

/// Receiver of a hook call.
#[derive(Clone)]
pub enum HookTarget {
    /// Called with the value being written.
    Instance(Arc<InstanceHookFn>),
    /// Called without a receiver.
    Static(Arc<StaticHookFn>),
}

/// A method marked to run before or after a value is written.
#[derive(Clone)]
pub struct Hook {
    pub name: String,
    pub phase: HookPhase,
    pub target: HookTarget,
}

impl Hook {
    pub fn instance<F>(name: impl Into<String>, phase: HookPhase, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            phase,
            target: HookTarget::Instance(Arc::new(f)),
        }
    }

    pub fn static_fn<F>(name: impl Into<String>, phase: HookPhase, f: F) -> Self
    where
        F: Fn() -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            phase,
            target: HookTarget::Static(Arc::new(f)),
        }
    }

    pub(crate) fn invoke(&self, receiver: &Value) -> Result<(), HookError> {
        match &self.target {
            HookTarget::Instance(f) => f(receiver),
            HookTarget::Static(f) => f(),
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self.target {
            HookTarget::Instance(_) => "instance",
            HookTarget::Static(_) => "static",
        };
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("target", &target)
            .finish()
    }
}
