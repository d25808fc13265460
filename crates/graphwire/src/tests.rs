// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Workflow tests: whole graphs through a `Serializer`.

use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// Expected byte stream, built in write order.
#[derive(Default)]
struct Expect(Vec<u8>);

impl Expect {
    fn new() -> Self {
        Self::default()
    }

    fn i32(mut self, v: i32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    fn str(self, s: &str) -> Self {
        let mut this = self.i32(s.len() as i32);
        this.0.extend_from_slice(s.as_bytes());
        this
    }

    /// First-seen type id followed by its name.
    fn new_type(self, id: i32, name: &str) -> Self {
        self.i32(id).str(name)
    }

    fn bytes(self) -> Vec<u8> {
        self.0
    }
}

fn serializer(types: &[&Arc<TypeDescriptor>]) -> Serializer {
    serializer_with(types, SerializerConfig::default())
}

fn serializer_with(types: &[&Arc<TypeDescriptor>], config: SerializerConfig) -> Serializer {
    let mut registry = HashMapTypeRegistry::new();
    for ty in types {
        registry.register(Arc::clone(ty));
    }
    Serializer::new(Arc::new(registry), config)
}

fn node_type() -> Arc<TypeDescriptor> {
    Arc::new(
        TypeDescriptorBuilder::class("Node")
            .field("value", PrimitiveKind::I32)
            .field("next", "Node")
            .build(),
    )
}

fn node(ty: &Arc<TypeDescriptor>, value: i32) -> ObjectRef {
    ObjectRef::with_fields(ty, [("value", Value::I32(value)), ("next", Value::Null)])
}

#[test]
fn test_null_root() {
    let s = serializer(&[]);
    assert_eq!(s.serialize_to_vec(&Value::Null).unwrap(), Expect::new().i32(-1).bytes());
}

#[test]
fn test_primitive_root_is_boxed_inline() {
    let s = serializer(&[]);
    let bytes = s.serialize_to_vec(&Value::I32(42)).unwrap();
    let expected = Expect::new().new_type(0, "i32").i32(0).i32(42).bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_array_shapes() {
    let s = serializer(&[]);
    let ints = TypeDescriptor::array_of(PrimitiveKind::I32, 1);
    let vector = ObjectRef::array(
        &ints,
        ArrayValue::vector(vec![Value::I32(10), Value::I32(20), Value::I32(30)]),
    );
    let bytes = s.serialize_to_vec(&Value::Object(vector)).unwrap();
    let body = Expect::new().i32(1).i32(3).i32(10).i32(20).i32(30).bytes();
    assert_eq!(bytes, [Expect::new().new_type(0, "i32[]").i32(0).bytes(), body].concat());

    let grid_ty = TypeDescriptor::array_of(PrimitiveKind::I32, 2);
    let grid = ArrayValue::new(vec![2, 2], (1..=4).map(Value::I32).collect()).unwrap();
    let bytes = s
        .serialize_to_vec(&Value::Object(ObjectRef::array(&grid_ty, grid)))
        .unwrap();
    let body = Expect::new().i32(2).i32(2).i32(2).i32(1).i32(2).i32(3).i32(4).bytes();
    assert!(bytes.ends_with(&body));
}

#[test]
fn test_zero_length_dimension() {
    let s = serializer(&[]);
    let ty = TypeDescriptor::array_of(PrimitiveKind::I32, 2);
    let empty = ArrayValue::new(vec![2, 0], Vec::new()).unwrap();
    let bytes = s
        .serialize_to_vec(&Value::Object(ObjectRef::array(&ty, empty)))
        .unwrap();
    let expected = Expect::new().new_type(0, "i32[,]").i32(0).i32(2).i32(2).i32(0).bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_array_rank_mismatch() {
    let s = serializer(&[]);
    let ty = TypeDescriptor::array_of(PrimitiveKind::I32, 2);
    let flat = ArrayValue::vector(vec![Value::I32(1)]);
    let err = s
        .serialize_to_vec(&Value::Object(ObjectRef::array(&ty, flat)))
        .unwrap_err();
    assert!(matches!(err, EncodeError::InvalidArray { .. }));
}

#[test]
fn test_dictionary_shape() {
    let s = serializer(&[]);
    let ty = TypeDescriptor::dictionary_of(PrimitiveKind::String, PrimitiveKind::I32);
    let map = ObjectRef::map(
        &ty,
        vec![
            (Value::from("a"), Value::I32(1)),
            (Value::from("b"), Value::I32(2)),
        ],
    );
    let bytes = s.serialize_to_vec(&Value::Object(map)).unwrap();
    let expected = Expect::new()
        .new_type(0, "Dictionary<string,i32>")
        .i32(0)
        .i32(2)
        .new_type(1, "string")
        .i32(1)
        .str("a")
        .i32(1)
        .i32(1)
        .i32(2)
        .str("b")
        .i32(2)
        .bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_non_generic_collection_writes_object_slots() {
    let s = serializer(&[]);
    let list = ObjectRef::sequence(
        &TypeDescriptor::array_list(),
        vec![Value::I32(1), Value::Null, Value::from("s")],
    );
    let bytes = s.serialize_to_vec(&Value::Object(list)).unwrap();
    let expected = Expect::new()
        .new_type(0, "ArrayList")
        .i32(0)
        .i32(3)
        .new_type(1, "i32")
        .i32(1)
        .i32(1)
        .i32(-1)
        .new_type(2, "string")
        .i32(2)
        .str("s")
        .bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_nullable_shapes() {
    let nullable = TypeDescriptor::nullable_of(PrimitiveKind::I32);
    let holder = Arc::new(
        TypeDescriptorBuilder::class("Holder")
            .field("b", &nullable)
            .field("a", &nullable)
            .build(),
    );
    let s = serializer(&[&holder]);
    let obj = ObjectRef::with_fields(
        &holder,
        [("a", Value::nullable(None)), ("b", Value::from(Some(5i32)))],
    );
    let bytes = s.serialize_to_vec(&Value::Object(obj)).unwrap();
    let expected = Expect::new()
        .new_type(0, "Holder")
        .i32(0)
        .u8(0)
        .u8(1)
        .i32(5)
        .bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_shared_instance_written_once() {
    let node_ty = node_type();
    let holder = Arc::new(
        TypeDescriptorBuilder::class("Holder")
            .field("left", "Node")
            .field("right", "Node")
            .build(),
    );
    let s = serializer(&[&node_ty, &holder]);
    let shared = node(&node_ty, 9);
    let root = ObjectRef::with_fields(
        &holder,
        [
            ("left", Value::Object(shared.clone())),
            ("right", Value::Object(shared)),
        ],
    );
    let bytes = s.serialize_to_vec(&Value::Object(root)).unwrap();
    let expected = Expect::new()
        .new_type(0, "Holder")
        .i32(0)
        .new_type(1, "Node")
        .i32(1)
        .i32(1)
        .i32(1)
        .i32(-1)
        .i32(9)
        .bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_cycle_terminates() {
    let node_ty = node_type();
    let s = serializer(&[&node_ty]);
    let a = node(&node_ty, 1);
    let b = node(&node_ty, 2);
    a.set_field("next", Value::Object(b.clone()));
    b.set_field("next", Value::Object(a.clone()));

    let bytes = s.serialize_to_vec(&Value::Object(a.clone())).unwrap();
    let expected = Expect::new()
        .new_type(0, "Node")
        .i32(0)
        .i32(0)
        .i32(1)
        .i32(1)
        .i32(0)
        .i32(0)
        .i32(2)
        .bytes();
    assert_eq!(bytes, expected);

    a.set_field("next", Value::Null);
}

#[test]
fn test_long_chain_does_not_recurse() {
    let node_ty = node_type();
    let s = serializer(&[&node_ty]);
    let head = node(&node_ty, 0);
    let mut tail = head.clone();
    for i in 1..50_000 {
        let next = node(&node_ty, i);
        tail.set_field("next", Value::Object(next.clone()));
        tail = next;
    }
    let bytes = s.serialize_to_vec(&Value::Object(head.clone())).unwrap();
    // Header, then per node: next ref (8, or 4 for the null tail) + value (4).
    assert_eq!(bytes.len(), 12 + 4 + 50_000 * 12 - 4);

    // Unlink iteratively so the chain is not dropped recursively.
    let mut current = Some(head);
    while let Some(obj) = current.take() {
        let next = match &mut *obj.write() {
            ObjectData::Fields(fields) => fields.insert("next".into(), Value::Null),
            _ => None,
        };
        current = next.and_then(|v| v.as_object().cloned());
    }
}

#[test]
fn test_long_boxed_struct_chain_does_not_recurse() {
    let link = Arc::new(
        TypeDescriptorBuilder::structure("Link")
            .field("v", PrimitiveKind::I32)
            .field("next", TypeDescriptor::object())
            .build(),
    );
    let s = serializer(&[&link]);
    let mut links: Vec<ObjectRef> = Vec::with_capacity(50_000);
    for i in 0..50_000 {
        let next = links.last().map_or(Value::Null, Value::from);
        links.push(ObjectRef::boxed(
            &link,
            Value::structure([("v", Value::I32(i)), ("next", next)]),
        ));
    }
    let head = links.last().cloned().unwrap();
    let bytes = s.serialize_to_vec(&Value::Object(head)).unwrap();
    // Header, then per link: next ref (8, or 4 for the null tail) + v (4).
    assert_eq!(bytes.len(), 12 + 4 + 50_000 * 12 - 4);

    for obj in &links {
        if let ObjectData::Boxed(Value::Struct(fields)) = &mut *obj.write() {
            fields.insert("next".into(), Value::Null);
        }
    }
}

#[test]
fn test_null_string_field() {
    let person = Arc::new(TypeDescriptorBuilder::class("Person").string_field("name").build());
    let s = serializer(&[&person]);

    let anonymous = ObjectRef::with_fields(&person, [("name", Value::Null)]);
    let bytes = s.serialize_to_vec(&Value::Object(anonymous)).unwrap();
    assert_eq!(bytes, Expect::new().new_type(0, "Person").i32(0).i32(-1).bytes());

    let named = ObjectRef::with_fields(&person, [("name", Value::from("ann"))]);
    let bytes = s.serialize_to_vec(&Value::Object(named)).unwrap();
    let expected = Expect::new()
        .new_type(0, "Person")
        .i32(0)
        .new_type(1, "string")
        .i32(1)
        .str("ann")
        .bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_shared_string_written_once() {
    let names = Arc::new(
        TypeDescriptorBuilder::class("Names")
            .string_field("first")
            .string_field("second")
            .build(),
    );
    let s = serializer(&[&names]);

    let hi = ObjectRef::boxed(&TypeDescriptor::primitive(PrimitiveKind::String), Value::from("hi"));
    let shared = ObjectRef::with_fields(
        &names,
        [("first", Value::from(&hi)), ("second", Value::from(&hi))],
    );
    let bytes = s.serialize_to_vec(&Value::Object(shared)).unwrap();
    let expected = Expect::new()
        .new_type(0, "Names")
        .i32(0)
        .new_type(1, "string")
        .i32(1)
        .str("hi")
        .i32(1)
        .i32(1)
        .bytes();
    assert_eq!(bytes, expected);

    // Equal text in two instances is two objects.
    let distinct = ObjectRef::with_fields(
        &names,
        [("first", Value::from("hi")), ("second", Value::from("hi"))],
    );
    let bytes = s.serialize_to_vec(&Value::Object(distinct)).unwrap();
    let expected = Expect::new()
        .new_type(0, "Names")
        .i32(0)
        .new_type(1, "string")
        .i32(1)
        .str("hi")
        .i32(1)
        .i32(2)
        .str("hi")
        .bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_string_field_rejects_other_types() {
    let person = Arc::new(TypeDescriptorBuilder::class("Person").string_field("name").build());
    let s = serializer(&[&person]);
    let wrong = ObjectRef::with_fields(&person, [("name", Value::I32(7))]);
    let err = s.serialize_to_vec(&Value::Object(wrong)).unwrap_err();
    assert!(err.to_string().starts_with("Person.name: "), "{}", err);
    assert!(matches!(
        err.root_cause(),
        EncodeError::TypeMismatch { expected, found } if expected == "string" && found == "i32"
    ));
}

#[test]
fn test_field_order_independent_of_declaration() {
    let declared = Arc::new(
        TypeDescriptorBuilder::class("Triple")
            .field("z", PrimitiveKind::I32)
            .field("a", PrimitiveKind::I32)
            .field("m", PrimitiveKind::I32)
            .build(),
    );
    let s = serializer(&[&declared]);
    let obj = ObjectRef::with_fields(
        &declared,
        [("z", Value::I32(3)), ("a", Value::I32(1)), ("m", Value::I32(2))],
    );
    let bytes = s.serialize_to_vec(&Value::Object(obj)).unwrap();
    assert!(bytes.ends_with(&Expect::new().i32(1).i32(2).i32(3).bytes()));
}

#[test]
fn test_transient_fields_contribute_nothing() {
    let scratch = Arc::new(TypeDescriptorBuilder::class("Scratch").transient().build());
    let with_transient = Arc::new(
        TypeDescriptorBuilder::class("Sample")
            .field("value", PrimitiveKind::I32)
            .transient_field("cache", PrimitiveKind::I64)
            .field("scratch", &scratch)
            .build(),
    );
    let s = serializer(&[&with_transient, &scratch]);

    let encode = |cache: i64| {
        let obj = ObjectRef::with_fields(
            &with_transient,
            [
                ("value", Value::I32(4)),
                ("cache", Value::I64(cache)),
                (
                    "scratch",
                    Value::Object(ObjectRef::new(&scratch, ObjectData::Empty)),
                ),
            ],
        );
        s.serialize_to_vec(&Value::Object(obj)).unwrap()
    };
    let expected = Expect::new().new_type(0, "Sample").i32(0).i32(4).bytes();
    assert_eq!(encode(1), expected);
    assert_eq!(encode(i64::MAX), expected);
}

#[test]
fn test_transient_instance_in_object_slot() {
    let handle = Arc::new(TypeDescriptorBuilder::class("Handle").transient().build());
    let s = serializer(&[&handle]);
    let obj = ObjectRef::new(&handle, ObjectData::Empty);
    let bytes = s.serialize_to_vec(&Value::Object(obj)).unwrap();
    assert_eq!(bytes, Expect::new().new_type(0, "Handle").bytes());
}

#[test]
fn test_value_struct_and_enum_inline() {
    let point = Arc::new(
        TypeDescriptorBuilder::structure("Point")
            .field("y", PrimitiveKind::I32)
            .field("x", PrimitiveKind::I32)
            .build(),
    );
    let color = Arc::new(
        EnumBuilder::new("Color")
            .variant("Red")
            .variant("Green")
            .underlying(PrimitiveKind::U8)
            .build(),
    );
    let shape = Arc::new(
        TypeDescriptorBuilder::class("Shape")
            .field("center", &point)
            .field("color", &color)
            .build(),
    );
    let s = serializer(&[&shape]);
    let obj = ObjectRef::with_fields(
        &shape,
        [
            (
                "center",
                Value::structure([("x", Value::I32(3)), ("y", Value::I32(4))]),
            ),
            ("color", Value::Enum(1)),
        ],
    );
    let bytes = s.serialize_to_vec(&Value::Object(obj)).unwrap();
    let expected = Expect::new()
        .new_type(0, "Shape")
        .i32(0)
        .i32(3)
        .i32(4)
        .u8(1)
        .bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_sealed_known_type_fast_path() {
    let leaf = Arc::new(
        TypeDescriptorBuilder::class("Leaf")
            .field("v", PrimitiveKind::I32)
            .sealed()
            .build(),
    );
    let holder = Arc::new(TypeDescriptorBuilder::class("Holder").field("leaf", &leaf).build());
    let config = SerializerConfig::new().known_type(Arc::clone(&leaf));
    let s = serializer_with(&[&leaf, &holder], config);

    let root = ObjectRef::with_fields(
        &holder,
        [(
            "leaf",
            Value::Object(ObjectRef::with_fields(&leaf, [("v", Value::I32(6))])),
        )],
    );
    let bytes = s.serialize_to_vec(&Value::Object(root)).unwrap();
    let expected = Expect::new()
        .new_type(1, "Holder")
        .i32(0)
        .i32(0)
        .i32(1)
        .i32(6)
        .bytes();
    assert_eq!(bytes, expected);
}

#[test]
fn test_id_only_stamping() {
    let config = SerializerConfig::new().type_stamping(TypeStamping::IdOnly);
    let s = serializer_with(&[], config);
    let bytes = s.serialize_to_vec(&Value::from("hi")).unwrap();
    assert_eq!(bytes, Expect::new().i32(0).i32(0).str("hi").bytes());
}

#[test]
fn test_hooks_run_around_body() {
    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let (pre_log, post_log, base_log) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));

    let base = Arc::new(
        TypeDescriptorBuilder::class("Base")
            .pre_serialization("base_pre", move |_| {
                base_log.lock().push("base_pre".into());
                Ok(())
            })
            .build(),
    );
    let derived = Arc::new(
        TypeDescriptorBuilder::class("Derived")
            .base("Base")
            .field("v", PrimitiveKind::I32)
            .pre_serialization("pre", move |this| {
                let v = this
                    .as_object()
                    .and_then(|obj| match &*obj.read() {
                        ObjectData::Fields(fields) => fields.get("v").cloned(),
                        _ => None,
                    });
                pre_log.lock().push(format!("pre {:?}", v));
                Ok(())
            })
            .post_serialization("post", move |_| {
                post_log.lock().push("post".into());
                Ok(())
            })
            .build(),
    );
    let s = serializer(&[&base, &derived]);
    let obj = ObjectRef::with_fields(&derived, [("v", Value::I32(1))]);
    s.serialize_to_vec(&Value::Object(obj)).unwrap();

    assert_eq!(*log.lock(), ["base_pre", "pre Some(I32(1))", "post"]);
}

#[test]
fn test_hook_failure_aborts() {
    let failing = Arc::new(
        TypeDescriptorBuilder::class("Guarded")
            .pre_serialization("check", |_| Err("invariant broken".into()))
            .build(),
    );
    let s = serializer(&[&failing]);
    let obj = ObjectRef::with_fields(&failing, Vec::<(String, Value)>::new());
    let err = s.serialize_to_vec(&Value::Object(obj)).unwrap_err();
    match err {
        EncodeError::Hook { type_name, hook, .. } => {
            assert_eq!(type_name, "Guarded");
            assert_eq!(hook, "check");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_field_errors_carry_context() {
    let node_ty = node_type();
    let s = serializer(&[&node_ty]);
    let bad = ObjectRef::with_fields(
        &node_ty,
        [("value", Value::I64(1)), ("next", Value::Null)],
    );
    let err = s.serialize_to_vec(&Value::Object(bad)).unwrap_err();
    assert!(err.to_string().starts_with("Node.value: "));
    assert!(matches!(err.root_cause(), EncodeError::TypeMismatch { .. }));

    let missing = ObjectRef::with_fields(&node_ty, [("value", Value::I32(1))]);
    let err = s.serialize_to_vec(&Value::Object(missing)).unwrap_err();
    assert!(matches!(err, EncodeError::MissingField { ref field, .. } if field == "next"));
}

#[test]
fn test_unknown_field_type_is_build_error() {
    let orphan = Arc::new(TypeDescriptorBuilder::class("Orphan").field("ghost", "Ghost").build());
    let s = serializer(&[&orphan]);
    let obj = ObjectRef::with_fields(&orphan, [("ghost", Value::Null)]);
    let err = s.serialize_to_vec(&Value::Object(obj)).unwrap_err();
    assert!(err.is_build_error());
    assert!(matches!(err.root_cause(), EncodeError::UnknownType(name) if name == "Ghost"));
    assert_eq!(s.cached_encoders(), 0);
}

#[test]
fn test_deterministic_and_cache_reused() {
    let node_ty = node_type();
    let s = serializer(&[&node_ty]);
    let a = node(&node_ty, 1);
    a.set_field("next", Value::Object(node(&node_ty, 2)));
    let root = Value::Object(a);

    let first = s.serialize_to_vec(&root).unwrap();
    let cached = s.cached_encoders();
    let second = s.serialize_to_vec(&root).unwrap();
    assert_eq!(first, second);
    assert_eq!(s.cached_encoders(), cached);

    let fresh = serializer(&[&node_ty]);
    assert_eq!(fresh.serialize_to_vec(&root).unwrap(), first);
}

#[test]
fn test_session_spans_roots() {
    let node_ty = node_type();
    let s = serializer(&[&node_ty]);
    let shared = Value::Object(node(&node_ty, 5));
    let mut out = BufferWriter::new();
    {
        let mut session = s.session(&mut out);
        session.write_root(&TypeDescriptor::object(), &shared).unwrap();
        session.write_root(&TypeDescriptor::object(), &shared).unwrap();
        assert_eq!(session.identity().len(), 1);
        assert_eq!(session.pending(), 0);
    }
    let expected = Expect::new()
        .new_type(0, "Node")
        .i32(0)
        .i32(-1)
        .i32(5)
        .i32(0)
        .i32(0)
        .bytes();
    assert_eq!(out.into_bytes(), expected);
}

#[test]
fn test_concurrent_sessions_share_encoders() {
    let node_ty = node_type();
    let s = serializer(&[&node_ty]);
    let a = node(&node_ty, 1);
    a.set_field("next", Value::Object(node(&node_ty, 2)));
    let root = Value::Object(a);
    let expected = s.serialize_to_vec(&root).unwrap();

    let fresh = serializer(&[&node_ty]);
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                assert_eq!(fresh.serialize_to_vec(&root).unwrap(), expected);
            });
        }
    });
    assert_eq!(fresh.cached_encoders(), 1);
}

#[test]
fn test_encoder_display_shows_plan() {
    let node_ty = node_type();
    let s = serializer(&[&node_ty]);
    let rendered = s.encoder_for(&node_ty).unwrap().to_string();
    assert_eq!(
        rendered,
        "encoder Node\n  field next: ref Node [type-id runtime, transient-check, id plain]\n  field value: i32\n"
    );
}
