// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use runtime_metadata::{RolloverFrequency, SortDirection};

/// The search index a type's documents are stored in.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: String,
    /// Field path whose value is used as the shard routing key.
    pub route_with: Option<String>,
    pub rollover: Option<Rollover>,
    pub default_sort: Vec<(String, SortDirection)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollover {
    pub frequency: RolloverFrequency,
    pub timestamp_field_path: String,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route_with: None,
            rollover: None,
            default_sort: vec![],
        }
    }

    pub fn route_with(&mut self, field_path: impl Into<String>) -> &mut Self {
        self.route_with = Some(field_path.into());
        self
    }

    pub fn rollover(
        &mut self,
        frequency: RolloverFrequency,
        timestamp_field_path: impl Into<String>,
    ) -> &mut Self {
        self.rollover = Some(Rollover {
            frequency,
            timestamp_field_path: timestamp_field_path.into(),
        });
        self
    }

    pub fn default_sort(&mut self, field_path: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.default_sort.push((field_path.into(), direction));
        self
    }

    pub fn has_custom_routing(&self) -> bool {
        self.route_with.is_some()
    }
}
