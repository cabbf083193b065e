// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![allow(dead_code)]

use std::collections::BTreeSet;

use async_graphql_parser::types::{TypeDefinition, TypeKind, TypeSystemDefinition};

use schema_builder::{SchemaApi, SchemaArtifacts, SchemaBuildingError, SchemaConfig, SchemaDefinition};

pub fn build(
    define: impl FnOnce(&mut SchemaApi<'_>) -> Result<(), SchemaBuildingError>,
) -> Result<SchemaArtifacts, SchemaBuildingError> {
    build_with_config(SchemaConfig::default(), define)
}

pub fn build_with_config(
    config: SchemaConfig,
    define: impl FnOnce(&mut SchemaApi<'_>) -> Result<(), SchemaBuildingError>,
) -> Result<SchemaArtifacts, SchemaBuildingError> {
    let mut definition = SchemaDefinition::new(config);
    definition.define(define)?;
    definition.build()
}

fn type_definitions(sdl: &str) -> Vec<TypeDefinition> {
    async_graphql_parser::parse_schema(sdl)
        .unwrap()
        .definitions
        .into_iter()
        .filter_map(|definition| match definition {
            TypeSystemDefinition::Type(type_definition) => Some(type_definition.node),
            _ => None,
        })
        .collect()
}

pub fn type_names(sdl: &str) -> BTreeSet<String> {
    type_definitions(sdl)
        .into_iter()
        .map(|definition| definition.name.node.to_string())
        .collect()
}

/// `name: Type` entries of an object, interface or input type, or the values of an enum.
pub fn members(sdl: &str, type_name: &str) -> Vec<String> {
    let definition = type_definitions(sdl)
        .into_iter()
        .find(|definition| definition.name.node.as_str() == type_name)
        .unwrap_or_else(|| panic!("`{type_name}` is not defined in:\n{sdl}"));

    match definition.kind {
        TypeKind::Object(object) => object
            .fields
            .into_iter()
            .map(|field| format!("{}: {}", field.node.name.node, field.node.ty.node))
            .collect(),
        TypeKind::Interface(interface) => interface
            .fields
            .into_iter()
            .map(|field| format!("{}: {}", field.node.name.node, field.node.ty.node))
            .collect(),
        TypeKind::InputObject(input) => input
            .fields
            .into_iter()
            .map(|field| format!("{}: {}", field.node.name.node, field.node.ty.node))
            .collect(),
        TypeKind::Enum(enum_type) => enum_type
            .values
            .into_iter()
            .map(|value| value.node.value.node.to_string())
            .collect(),
        TypeKind::Scalar | TypeKind::Union(_) => vec![],
    }
}

/// Argument names of a field, in order.
pub fn arguments(sdl: &str, type_name: &str, field_name: &str) -> Vec<String> {
    type_definitions(sdl)
        .into_iter()
        .filter(|definition| definition.name.node.as_str() == type_name)
        .find_map(|definition| match definition.kind {
            TypeKind::Object(object) => object
                .fields
                .into_iter()
                .find(|field| field.node.name.node.as_str() == field_name),
            _ => None,
        })
        .unwrap_or_else(|| panic!("`{type_name}.{field_name}` is not defined"))
        .node
        .arguments
        .into_iter()
        .map(|argument| argument.node.name.node.to_string())
        .collect()
}

/// The (emitted) names of every type whose name contains `fragment`.
pub fn names_containing(sdl: &str, fragment: &str) -> BTreeSet<String> {
    type_names(sdl)
        .into_iter()
        .filter(|name| name.contains(fragment))
        .collect()
}
