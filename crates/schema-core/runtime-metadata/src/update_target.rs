// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of the script that writes an ingested document (or the sourced fields of a related
/// document) into its index.
pub const INDEX_DATA_UPDATE_SCRIPT_ID: &str = "update_index_data_d577eb4b07ee3c53b59f2f6d6c7b2413";

/// Relationship name used by the update target that indexes a type's own data.
pub const SELF_RELATIONSHIP_NAME: &str = "__self";

/// A write the indexer must perform when a document of the owning type is ingested.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UpdateTarget {
    /// The type whose index receives the update.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    pub script_id: String,
    /// Path on the ingested document holding the id(s) of the documents to update.
    pub id_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_value_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollover_timestamp_value_source: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_params: BTreeMap<String, DynamicParam>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata_params: BTreeMap<String, Param>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DynamicParam {
    pub source_path: String,
    pub cardinality: Cardinality,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Param {
    Static { value: serde_json::Value },
    Dynamic(DynamicParam),
}

impl Param {
    pub fn dynamic(source_path: &str) -> Self {
        Param::Dynamic(DynamicParam {
            source_path: source_path.to_string(),
            cardinality: Cardinality::One,
        })
    }

    pub fn static_value(value: impl Into<serde_json::Value>) -> Self {
        Param::Static {
            value: value.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}
