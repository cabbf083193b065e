// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

use schema_model::types::TypeReferenceError;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum SchemaBuildingError {
    #[error("Invalid name `{name}` for {context}: {reason}")]
    InvalidName {
        name: String,
        context: String,
        reason: String,
    },

    #[error("{0}")]
    InvalidTypeReference(#[from] TypeReferenceError),

    #[error("Duplicate definition for type `{0}`")]
    DuplicateType(String),

    #[error("Duplicate field `{field}` on type `{type_name}`")]
    DuplicateField { type_name: String, field: String },

    #[error("Duplicate value `{value}` on enum `{type_name}`")]
    DuplicateEnumValue { type_name: String, value: String },

    #[error("Invalid options for relationship `{type_name}.{relationship}`: {reason}")]
    InvalidRelationshipOption {
        type_name: String,
        relationship: String,
        reason: String,
    },

    #[error("Type `{0}` already has an index definition")]
    DuplicateIndex(String),

    #[error("Scalar type `{0}` must declare a mapping type")]
    MissingScalarMapping(String),

    #[error("`{type_name}` references unknown type `{referenced}` ({context})")]
    UnknownType {
        type_name: String,
        referenced: String,
        context: String,
    },

    #[error(
        "Embedded types cannot reference themselves, directly or indirectly. Found the cycle: {}. Use a relationship for at least one of these references.",
        .0.join(", ")
    )]
    SelfReferentialTypes(Vec<String>),

    #[error("Abstract types cannot be their own subtypes. Found the cycle: {}", .0.join(" -> "))]
    AbstractTypeCycle(Vec<String>),

    #[error(
        "Field `{field}` of `{abstract_type}` has conflicting types in its subtypes: `{first_subtype}.{field}: {first_type}` and `{second_subtype}.{field}: {second_type}`"
    )]
    FieldTypeConflict {
        abstract_type: String,
        field: String,
        first_subtype: String,
        first_type: String,
        second_subtype: String,
        second_type: String,
    },

    #[error(
        "The subtypes of `{abstract_type}` must be uniformly indexed. Indexed: {}. Not indexed: {}.",
        .indexed.join(", "),
        .not_indexed.join(", ")
    )]
    InconsistentIndexing {
        abstract_type: String,
        indexed: Vec<String>,
        not_indexed: Vec<String>,
    },

    #[error("`{type_name}` implements `{interface}`, but {reason}")]
    InterfaceNotImplemented {
        type_name: String,
        interface: String,
        reason: String,
    },

    #[error("{}", numbered_problems("relationships and derived fields", .0))]
    InvalidRelationships(Vec<String>),

    #[error(
        "`customize_derived_types` on `{source_type}` names derived types that are not generated for it: {}. {}",
        .unknown.join(", "),
        suggestion_sentence(.suggestions)
    )]
    UnknownDerivedTypes {
        source_type: String,
        unknown: Vec<String>,
        suggestions: Vec<String>,
    },

    #[error(
        "`customize_derived_type_fields` on `{source_type}` names fields of `{type_name}` that do not exist: {}. {}",
        .unknown.join(", "),
        suggestion_sentence(.suggestions)
    )]
    UnknownDerivedTypeFields {
        source_type: String,
        type_name: String,
        unknown: Vec<String>,
        suggestions: Vec<String>,
    },

    #[error("{}", numbered_problems("derived types", .0))]
    InvalidDerivedTypes(Vec<String>),

    #[error("{}", numbered_problems("naming overrides", .0))]
    InvalidNameOverrides(Vec<String>),

    #[error("A schema definition is already being built on this thread; builds cannot be nested")]
    NestedBuild,

    #[error("Unable to parse raw SDL: {0}")]
    RawSdl(String),

    #[error("Extension `{extension}` failed: {message}")]
    Extension { extension: String, message: String },

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Unable to produce runtime metadata: {0}")]
    RuntimeMetadata(#[from] runtime_metadata::RuntimeMetadataError),
}

fn numbered_problems(subject: &str, problems: &[String]) -> String {
    let list: Vec<_> = problems
        .iter()
        .enumerate()
        .map(|(i, problem)| format!("{}. {problem}", i + 1))
        .collect();

    format!(
        "Found {} problem(s) with the schema's {subject}:\n\n{}",
        problems.len(),
        list.join("\n\n")
    )
}

fn suggestion_sentence(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        "No derived names are close matches.".to_string()
    } else {
        format!("Possible matches: {}.", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problems_are_numbered() {
        let error = SchemaBuildingError::InvalidRelationships(vec![
            "first".to_string(),
            "second".to_string(),
        ]);

        insta::assert_snapshot!(error.to_string(), @r"
        Found 2 problem(s) with the schema's relationships and derived fields:

        1. first

        2. second
        ");
    }
}
