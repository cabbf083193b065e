// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use schema_env::{EnvError, Environment};
use schema_model::naming::{DerivedTypeFamily, apply_format};
use thiserror::Error;

/// Overrides `derivation.legacy_grouping_schema` when set.
pub const LEGACY_GROUPING_SCHEMA_ENV: &str = "SCHEMA_LEGACY_GROUPING_SCHEMA";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaConfig {
    pub naming: NamingConfig,
    pub derivation: DerivationConfig,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamingConfig {
    /// Logical type name to emitted type name.
    pub type_name_overrides: BTreeMap<String, String>,
    /// Logical enum type name to (value name to emitted value name).
    pub enum_value_overrides_by_type: BTreeMap<String, BTreeMap<String, String>>,
    pub derived_type_name_formats: BTreeMap<DerivedTypeFamily, String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivationConfig {
    /// Expose `Date`/`DateTime` grouping as fields taking a `granularity` argument instead of
    /// the `DateGroupedBy`/`DateTimeGroupedBy` helper types.
    pub legacy_grouping_schema: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("{0}")]
    Env(#[from] EnvError),
}

impl NamingConfig {
    pub fn format_for(&self, family: DerivedTypeFamily) -> &str {
        self.derived_type_name_formats
            .get(&family)
            .map(String::as_str)
            .unwrap_or_else(|| family.default_format())
    }

    /// The name of `family`'s type derived from `base` (no type name overrides applied).
    pub fn derived_name(&self, family: DerivedTypeFamily, base: &str) -> String {
        apply_format(self.format_for(family), base, "")
    }

    pub fn sub_aggregation_name(&self, parent_types: &str, base: &str) -> String {
        apply_format(
            self.format_for(DerivedTypeFamily::SubAggregation),
            base,
            parent_types,
        )
    }
}

impl SchemaConfig {
    /// Applies environment overrides on top of the file (or default) configuration.
    pub fn with_env_overrides(mut self, env: &dyn Environment) -> Result<Self, ConfigError> {
        self.derivation.legacy_grouping_schema = env.enabled(
            LEGACY_GROUPING_SCHEMA_ENV,
            self.derivation.legacy_grouping_schema,
        )?;
        Ok(self)
    }
}
