// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The runtime metadata emitted alongside a GraphQL schema.
//!
//! The schema builder produces one [`RuntimeMetadata`] document per build. It is consumed by the
//! query engine (to map GraphQL fields back to index fields, relations and aggregation functions)
//! and by the indexer (through the update targets of each ingested type).
//!
//! The document crosses process boundaries as a plain nested map ("dumpable hash"), so every type
//! here round-trips through [`RuntimeMetadata::to_dumpable_hash`] and
//! [`RuntimeMetadata::from_hash`] without loss.

mod enum_type;
mod error;
mod index_definition;
mod object_type;
mod relation;
mod update_target;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use enum_type::{EnumTypeMetadata, EnumValueMetadata, SortDirection, SortField};
pub use error::RuntimeMetadataError;
pub use index_definition::{IndexDefinitionMetadata, RolloverFrequency, RolloverMetadata};
pub use object_type::{
    AggregationFunction, ComputationDetail, ElasticGraphCategory, GraphQLFieldMetadata,
    ObjectTypeMetadata,
};
pub use relation::{Direction, RelationMetadata};
pub use update_target::{
    Cardinality, DynamicParam, INDEX_DATA_UPDATE_SCRIPT_ID, Param, SELF_RELATIONSHIP_NAME,
    UpdateTarget,
};

/// Scoped name under which the shared index-data update script is registered.
pub const INDEX_DATA_UPDATE_SCRIPT_SCOPED_NAME: &str = "update/index_data";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeMetadata {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub object_types_by_name: BTreeMap<String, ObjectTypeMetadata>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enum_types_by_name: BTreeMap<String, EnumTypeMetadata>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub index_definitions_by_name: BTreeMap<String, IndexDefinitionMetadata>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub static_script_ids_by_scoped_name: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub graphql_extension_modules: Vec<ExtensionModule>,
}

/// An extension that participated in the build, with the resolvers it registered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExtensionModule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolvers: Vec<String>,
}

impl RuntimeMetadata {
    /// Converts the metadata into a plain nested map/array structure.
    pub fn to_dumpable_hash(&self) -> Result<serde_json::Value, RuntimeMetadataError> {
        serde_json::to_value(self).map_err(RuntimeMetadataError::Serialize)
    }

    /// Rebuilds the metadata from the structure produced by [`Self::to_dumpable_hash`].
    pub fn from_hash(hash: &serde_json::Value) -> Result<Self, RuntimeMetadataError> {
        Self::deserialize(hash).map_err(RuntimeMetadataError::Deserialize)
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectTypeMetadata> {
        self.object_types_by_name.get(name)
    }
}
