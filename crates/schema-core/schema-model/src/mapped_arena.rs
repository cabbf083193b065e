// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A wrapper around a `typed_generational_arena::Arena` that also provides lookup by name.
//!
//! Schema types are stored by their logical name. Lookups go through the map, and iteration
//! through [`MappedArena::iter`] always walks the keys in sorted order, so nothing downstream can
//! observe the order in which types were declared.

use std::{
    collections::{BTreeMap, btree_map::Keys},
    ops,
};

use serde::{Deserialize, Serialize};

use typed_generational_arena::{Arena, IgnoreGeneration, Index};

pub type SerializableSlab<T> = Arena<T, usize, IgnoreGeneration>;
pub type SerializableSlabIndex<T> = Index<T, usize, IgnoreGeneration>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappedArena<V> {
    values: SerializableSlab<V>,
    map: BTreeMap<String, SerializableSlabIndex<V>>,
}

impl<V> MappedArena<V> {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Keys<'_, String, SerializableSlabIndex<V>> {
        self.map.keys()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn get_id(&self, key: &str) -> Option<SerializableSlabIndex<V>> {
        self.map.get(key).copied()
    }

    pub fn get_by_key(&self, key: &str) -> Option<&V> {
        self.get_id(key).map(|id| &self[id])
    }

    pub fn get_by_key_mut(&mut self, key: &str) -> Option<&mut V> {
        self.get_id(key).map(|id| &mut self.values[id])
    }

    /// Adds a value under `key`, returning the id of the existing value if the key is taken.
    pub fn add(&mut self, key: &str, value: V) -> Result<SerializableSlabIndex<V>, SerializableSlabIndex<V>> {
        if let Some(existing) = self.get_id(key) {
            return Err(existing);
        }

        let id = self.values.insert(value);
        self.map.insert(key.to_string(), id);
        Ok(id)
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.map
            .iter()
            .map(|(key, id)| (key.as_str(), &self.values[*id]))
    }

    /// Iterates over the values mutably, in key order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        let ids: Vec<_> = self.map.values().copied().collect();
        let mut by_id: BTreeMap<usize, &mut V> = self
            .values
            .iter_mut()
            .map(|(id, value)| (id.to_idx(), value))
            .collect();
        ids.into_iter()
            .filter_map(move |id| by_id.remove(&id.to_idx()))
    }
}

impl<V> Default for MappedArena<V> {
    fn default() -> Self {
        MappedArena {
            values: SerializableSlab::new(),
            map: BTreeMap::default(),
        }
    }
}

impl<V> ops::Index<SerializableSlabIndex<V>> for MappedArena<V> {
    type Output = V;

    #[inline]
    fn index(&self, id: SerializableSlabIndex<V>) -> &V {
        &self.values[id]
    }
}

impl<V> ops::IndexMut<SerializableSlabIndex<V>> for MappedArena<V> {
    #[inline]
    fn index_mut(&mut self, id: SerializableSlabIndex<V>) -> &mut V {
        &mut self.values[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiplatform_test::multiplatform_test;

    #[multiplatform_test]
    fn iteration_ignores_insertion_order() {
        let mut forward = MappedArena::default();
        let mut backward = MappedArena::default();
        for name in ["Widget", "Component", "WidgetVersion"] {
            forward.add(name, name.len()).unwrap();
        }
        for name in ["WidgetVersion", "Component", "Widget"] {
            backward.add(name, name.len()).unwrap();
        }

        let forward: Vec<_> = forward.iter().collect();
        let backward: Vec<_> = backward.iter().collect();
        assert_eq!(forward, backward);
        assert_eq!(forward[0], ("Component", &9));
    }

    #[multiplatform_test]
    fn duplicate_keys_are_rejected() {
        let mut arena = MappedArena::default();
        let id = arena.add("Widget", 1).unwrap();

        assert_eq!(arena.add("Widget", 2), Err(id));
        assert_eq!(arena.get_by_key("Widget"), Some(&1));
    }

    #[multiplatform_test]
    fn values_mut_follow_key_order() {
        let mut arena = MappedArena::default();
        arena.add("b", String::from("b")).unwrap();
        arena.add("a", String::from("a")).unwrap();

        for value in arena.values_mut() {
            value.push('!');
        }

        let values: Vec<_> = arena.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["a!", "b!"]);
    }
}
