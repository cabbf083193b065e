// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;

use schema_env::Environment;
use schema_model::naming::{DerivedTypeFamily, is_valid_graphql_name};

use super::model::{ConfigError, DerivationConfig, NamingConfig, SchemaConfig};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigSer {
    pub naming: Option<NamingSer>,
    pub derivation: Option<DerivationSer>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct NamingSer {
    pub type_name_overrides: Option<BTreeMap<String, String>>,
    pub enum_value_overrides_by_type: Option<BTreeMap<String, BTreeMap<String, String>>>,
    pub derived_type_name_formats: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct DerivationSer {
    pub legacy_grouping_schema: Option<bool>,
}

impl TryFrom<ConfigSer> for SchemaConfig {
    type Error = ConfigError;

    fn try_from(config: ConfigSer) -> Result<Self, Self::Error> {
        Ok(SchemaConfig {
            naming: config
                .naming
                .map(NamingConfig::try_from)
                .transpose()?
                .unwrap_or_default(),
            derivation: config
                .derivation
                .map(DerivationConfig::from)
                .unwrap_or_default(),
        })
    }
}

impl TryFrom<NamingSer> for NamingConfig {
    type Error = ConfigError;

    fn try_from(config: NamingSer) -> Result<Self, Self::Error> {
        let derived_type_name_formats = config
            .derived_type_name_formats
            .unwrap_or_default()
            .into_iter()
            .map(|(key, format)| {
                let family: DerivedTypeFamily = key.parse().map_err(ConfigError::Invalid)?;
                validate_format(family, &format)?;
                Ok((family, format))
            })
            .collect::<Result<_, ConfigError>>()?;

        let type_name_overrides = config.type_name_overrides.unwrap_or_default();
        if let Some((from, to)) = type_name_overrides
            .iter()
            .find(|(_, to)| !is_valid_graphql_name(to))
        {
            return Err(ConfigError::Invalid(format!(
                "type name override `{from}` = `{to}` is not a valid GraphQL name"
            )));
        }

        let enum_value_overrides_by_type = config.enum_value_overrides_by_type.unwrap_or_default();
        for (type_name, values) in &enum_value_overrides_by_type {
            if let Some((from, to)) = values.iter().find(|(_, to)| !is_valid_graphql_name(to)) {
                return Err(ConfigError::Invalid(format!(
                    "enum value override `{type_name}.{from}` = `{to}` is not a valid GraphQL name"
                )));
            }
        }

        Ok(NamingConfig {
            type_name_overrides,
            enum_value_overrides_by_type,
            derived_type_name_formats,
        })
    }
}

impl From<DerivationSer> for DerivationConfig {
    fn from(config: DerivationSer) -> Self {
        DerivationConfig {
            legacy_grouping_schema: config.legacy_grouping_schema.unwrap_or(false),
        }
    }
}

fn validate_format(family: DerivedTypeFamily, format: &str) -> Result<(), ConfigError> {
    let missing: Vec<_> = family
        .required_placeholders()
        .iter()
        .filter(|placeholder| !format.contains(*placeholder))
        .copied()
        .collect();

    if !missing.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "derived type name format for {family} (`{format}`) must contain {}",
            missing.join(" and ")
        )));
    }

    let sample = format.replace("{parent_types}", "").replace("{base}", "Widget");
    if !is_valid_graphql_name(&sample) {
        return Err(ConfigError::Invalid(format!(
            "derived type name format for {family} (`{format}`) does not produce valid GraphQL names"
        )));
    }

    Ok(())
}

impl SchemaConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        parse_toml(toml_str, "<inline>")
    }
}

fn parse_toml(toml_str: &str, path: &str) -> Result<SchemaConfig, ConfigError> {
    let config: ConfigSer = toml::from_str(toml_str).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;

    config.try_into()
}

pub fn load_config_from_file(path: &Path) -> Result<SchemaConfig, ConfigError> {
    let toml_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_toml(&toml_str, &path.display().to_string())
}

/// Loads `schema.toml` from `dir` (defaults when absent) and applies environment overrides.
pub fn load_config(dir: &Path, env: &dyn Environment) -> Result<SchemaConfig, ConfigError> {
    let config_path = dir.join("schema.toml");

    let config = if config_path.exists() {
        load_config_from_file(&config_path)?
    } else {
        SchemaConfig::default()
    };

    config.with_env_overrides(env)
}
