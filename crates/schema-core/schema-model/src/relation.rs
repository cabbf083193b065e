// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use runtime_metadata::{Cardinality, Direction};
use serde_json::{Map, Value};

/// A relationship from one type to another, resolved by name at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub related_type: String,
    /// Dot-separated path to the foreign key field (on this type for `Out`, on the related type
    /// for `In`).
    pub foreign_key: String,
    pub direction: Direction,
    pub cardinality: Cardinality,
    /// Singular form of the relation name, used for the `<singular>_aggregations` field.
    pub singular: Option<String>,
    pub additional_filter: Map<String, Value>,
    /// Remote field path on the related type to the local field path it is equivalent to.
    pub equivalent_fields: BTreeMap<String, String>,
}

impl Relation {
    /// Deep-merges a filter fragment into the relation's additional filter. Later fragments win
    /// when both sides hold a non-object value for the same key.
    pub fn merge_additional_filter(&mut self, fragment: Map<String, Value>) {
        deep_merge(&mut self.additional_filter, fragment);
    }

    /// The remote field path whose value equals `local_path`'s value, if one was declared.
    pub fn remote_path_equivalent_to(&self, local_path: &str) -> Option<&str> {
        self.equivalent_fields
            .iter()
            .find(|(_, local)| local.as_str() == local_path)
            .map(|(remote, _)| remote.as_str())
    }
}

fn deep_merge(target: &mut Map<String, Value>, fragment: Map<String, Value>) {
    for (key, value) in fragment {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming)
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Declares that a field's value is copied from a field of a related type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedFrom {
    pub relationship: String,
    pub field_path: String,
}
