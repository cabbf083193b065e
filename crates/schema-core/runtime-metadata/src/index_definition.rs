// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::enum_type::SortField;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct IndexDefinitionMetadata {
    /// Index path of the field used as the shard routing value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollover: Option<RolloverMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_sort_fields: Vec<SortField>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RolloverMetadata {
    pub frequency: RolloverFrequency,
    pub timestamp_field_path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RolloverFrequency {
    Yearly,
    Monthly,
    Daily,
    Hourly,
}
