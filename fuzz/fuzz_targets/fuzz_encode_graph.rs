// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use graphwire::{
    HashMapTypeRegistry, ObjectRef, PrimitiveKind, Serializer, SerializerConfig,
    TypeDescriptorBuilder, Value,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

// Input layout: node count, then per node `value, left, right`.
// Edge bytes at or above the node count mean null.
fuzz_target!(|data: &[u8]| {
    let Some((&count, rest)) = data.split_first() else {
        return;
    };
    let count = usize::from(count % 32) + 1;

    let ty = Arc::new(
        TypeDescriptorBuilder::class("Vertex")
            .field("value", PrimitiveKind::U8)
            .field("left", "Vertex")
            .field("right", "Vertex")
            .build(),
    );
    let nodes: Vec<ObjectRef> = (0..count)
        .map(|i| {
            let value = rest.get(i * 3).copied().unwrap_or(0);
            ObjectRef::with_fields(
                &ty,
                [
                    ("value", Value::U8(value)),
                    ("left", Value::Null),
                    ("right", Value::Null),
                ],
            )
        })
        .collect();
    for (i, node) in nodes.iter().enumerate() {
        for (slot, edge) in ["left", "right"].into_iter().enumerate() {
            let target = usize::from(rest.get(i * 3 + slot + 1).copied().unwrap_or(u8::MAX));
            if target < count {
                node.set_field(edge, Value::Object(nodes[target].clone()));
            }
        }
    }

    let registry = HashMapTypeRegistry::new().with(Arc::clone(&ty));
    let serializer = Serializer::new(Arc::new(registry), SerializerConfig::default());
    let root = Value::Object(nodes[0].clone());
    let first = serializer.serialize_to_vec(&root).expect("well-formed graph must encode");
    let second = serializer.serialize_to_vec(&root).expect("well-formed graph must encode");
    assert_eq!(first, second);

    for node in &nodes {
        node.set_field("left", Value::Null);
        node.set_field("right", Value::Null);
    }
});
