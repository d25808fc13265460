// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session-scoped identity and type tables.

use crate::object::ObjectRef;
use std::collections::HashMap;
use std::sync::Arc;

/// Dense object ids keyed by instance address.
///
/// The table keeps a handle to every registered instance for the whole
/// session, so an address cannot be reused by a later allocation while
/// the graph is being written.
#[derive(Debug, Default)]
pub struct IdentityTable {
    objects: Vec<ObjectRef>,
    ids: HashMap<usize, i32>,
}

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `obj`, assigning the next one on first sight.
    ///
    /// The flag is `true` when the id was just assigned.
    pub fn get_or_insert(&mut self, obj: &ObjectRef) -> (i32, bool) {
        if let Some(id) = self.ids.get(&obj.addr()) {
            return (*id, false);
        }
        let id = self.objects.len() as i32;
        self.ids.insert(obj.addr(), id);
        self.objects.push(obj.clone());
        (id, true)
    }

    pub fn get(&self, obj: &ObjectRef) -> Option<i32> {
        self.ids.get(&obj.addr()).copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Type ids by type name; an id never changes once assigned.
#[derive(Debug, Default, Clone)]
pub struct TypeIndex {
    ids: HashMap<Arc<str>, i32>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index pre-filled with fixed ids `0..n` for `names`.
    pub fn seeded<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a Arc<str>>,
    {
        let mut index = Self::new();
        for name in names {
            index.get_or_assign(name);
        }
        index
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.ids.get(name).copied()
    }

    /// Id for `name`, assigning the next one on first sight.
    ///
    /// The flag is `true` when the id was just assigned.
    pub fn get_or_assign(&mut self, name: &Arc<str>) -> (i32, bool) {
        if let Some(id) = self.ids.get(name) {
            return (*id, false);
        }
        let id = self.ids.len() as i32;
        self.ids.insert(Arc::clone(name), id);
        (id, true)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrimitiveKind, TypeDescriptor};
    use crate::Value;

    #[test]
    fn test_identity_is_by_instance() {
        let ty = TypeDescriptor::primitive(PrimitiveKind::I32);
        let a = ObjectRef::boxed(&ty, Value::I32(1));
        let b = ObjectRef::boxed(&ty, Value::I32(1));

        let mut table = IdentityTable::new();
        assert_eq!(table.get_or_insert(&a), (0, true));
        assert_eq!(table.get_or_insert(&b), (1, true));
        assert_eq!(table.get_or_insert(&a.clone()), (0, false));
        assert_eq!(table.get(&b), Some(1));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_type_index_seed_and_growth() {
        let names: Vec<Arc<str>> = vec!["Node".into(), "Edge".into()];
        let mut index = TypeIndex::seeded(&names);
        assert_eq!(index.get("Edge"), Some(1));
        assert_eq!(index.get_or_assign(&"Node".into()), (0, false));
        assert_eq!(index.get_or_assign(&"Graph".into()), (2, true));
        assert_eq!(index.get_or_assign(&"Graph".into()), (2, false));
        assert_eq!(index.len(), 3);
    }
}
