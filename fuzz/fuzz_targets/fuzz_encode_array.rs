// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use graphwire::{
    ArrayValue, HashMapTypeRegistry, ObjectRef, PrimitiveKind, Serializer, SerializerConfig,
    TypeDescriptor, Value,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

// Input layout: rank, one length byte per dimension, then element bytes.
fuzz_target!(|data: &[u8]| {
    let Some((&rank, rest)) = data.split_first() else {
        return;
    };
    let rank = usize::from(rank % 4) + 1;
    if rest.len() < rank {
        return;
    }
    let (dims, payload) = rest.split_at(rank);
    let lengths: Vec<usize> = dims.iter().map(|d| usize::from(d % 8)).collect();
    let total: usize = lengths.iter().product();
    let elements = (0..total)
        .map(|i| Value::U8(payload.get(i).copied().unwrap_or(0)))
        .collect();

    let array = ArrayValue::new(lengths.clone(), elements).expect("element count matches");
    let ty = TypeDescriptor::array_of(PrimitiveKind::U8, rank);
    let serializer = Serializer::new(
        Arc::new(HashMapTypeRegistry::new()),
        SerializerConfig::default(),
    );
    let bytes = serializer
        .serialize_to_vec(&Value::Object(ObjectRef::array(&ty, array)))
        .expect("valid array must encode");

    // type id + name + object id, then rank + lengths + one byte per element.
    let header = 4 + 4 + ty.name().len() + 4;
    assert_eq!(bytes.len(), header + 4 + 4 * rank + total);
});
