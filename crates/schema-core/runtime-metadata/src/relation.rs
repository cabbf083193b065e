// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

/// Which side of a relationship stores the foreign key.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The related type holds a foreign key pointing at this type.
    In,
    /// This type holds a foreign key pointing at the related type.
    Out,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RelationMetadata {
    pub foreign_key: String,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub additional_filter: serde_json::Map<String, serde_json::Value>,
    /// Paths (in index field names) of the `nested` fields the foreign key is stored under.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_key_nested_paths: Vec<String>,
}
