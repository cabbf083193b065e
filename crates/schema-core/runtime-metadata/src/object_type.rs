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

use crate::{relation::RelationMetadata, update_target::UpdateTarget};

/// Runtime metadata for an object, interface, union or input object type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ObjectTypeMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update_targets: Vec<UpdateTarget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index_definition_names: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub graphql_fields_by_name: BTreeMap<String, GraphQLFieldMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticgraph_category: Option<ElasticGraphCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub graphql_only_return_type: bool,
}

impl ObjectTypeMetadata {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GraphQLFieldMetadata {
    pub name_in_index: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computation_detail: Option<ComputationDetail>,
}

/// Tags types whose resolution needs special handling by the query engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElasticGraphCategory {
    ScalarAggregatedValues,
    DateGroupedByObject,
    IndexedAggregation,
    NestedSubAggregation,
    NestedSubAggregationConnection,
    RelayConnection,
    RelayEdge,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ComputationDetail {
    pub function: AggregationFunction,
    /// Value reported for a bucket with no documents (`None` reports `null`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_bucket_value: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AggregationFunction {
    Avg,
    Cardinality,
    Max,
    Min,
    Sum,
}
