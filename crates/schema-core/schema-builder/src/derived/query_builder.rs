// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The root `Query` type: a document connection field and an aggregations field per indexed type.

use heck::ToSnakeCase;

use schema_model::{
    graphql::{GraphQLField, GraphQLType},
    naming::DerivedTypeFamily,
    types::TypeReference,
};

use super::{
    DerivationContext, DerivedTypes,
    aggregation_builder::derive_indexed_aggregation,
    connection_builder::{
        aggregation_connection_arguments, document_connection_arguments, ensure_aggregation_connection,
        ensure_connection,
    },
};
use crate::error::SchemaBuildingError;

pub const QUERY_TYPE: &str = "Query";

pub trait ToPlural {
    fn to_plural(&self) -> String;
}

impl ToPlural for str {
    fn to_plural(&self) -> String {
        let plural_name = pluralizer::pluralize(self, 2, false);
        if plural_name == self {
            // Force pluralization if the pluralizer returns the same string
            format!("{self}s")
        } else {
            plural_name
        }
    }
}

/// Builds `Query`, or nothing when no type is indexed. Root field names default to the
/// snake-cased type name (pluralized for the document field).
pub(crate) fn build_query_type(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
) -> Result<Option<GraphQLType>, SchemaBuildingError> {
    let mut fields: Vec<GraphQLField> = vec![];

    for type_def in ctx.resolved.registry().declared_types() {
        if type_def.graphql_only || !ctx.resolved.is_indexed(&type_def.name) {
            continue;
        }

        let type_name = type_def.name.as_str();
        let (plural, singular) = match &type_def.root_query_fields {
            Some(root_query_fields) => (
                root_query_fields.plural.clone(),
                root_query_fields.singular.clone(),
            ),
            None => (type_name.to_plural().to_snake_case(), type_name.to_snake_case()),
        };

        let connection = ensure_connection(ctx, out, type_name);
        let documents = GraphQLField::new(&plural, TypeReference::non_null_named(&connection))
            .with_documentation(format!("Fetches `{type_name}`s based on the provided arguments."))
            .with_arguments(document_connection_arguments(ctx, out, type_name));

        derive_indexed_aggregation(ctx, out, type_name);
        let aggregation = ctx.derived_name(DerivedTypeFamily::Aggregation, type_name);
        let aggregation_connection = ensure_aggregation_connection(ctx, out, &aggregation);
        let aggregations = GraphQLField::new(
            format!("{singular}_aggregations"),
            TypeReference::non_null_named(&aggregation_connection),
        )
        .with_documentation(format!(
            "Aggregations over the `{plural}` data:\n\n> {}",
            type_def
                .documentation
                .as_deref()
                .unwrap_or(&format!("Fetches `{type_name}`s based on the provided arguments."))
        ))
        .with_arguments(aggregation_connection_arguments(ctx, out, type_name));

        for field in [documents, aggregations] {
            if fields.iter().any(|existing| existing.name == field.name) {
                return Err(SchemaBuildingError::DuplicateField {
                    type_name: QUERY_TYPE.to_string(),
                    field: field.name,
                });
            }
            fields.push(field);
        }
    }

    if fields.is_empty() {
        return Ok(None);
    }

    Ok(Some(
        GraphQLType::object(QUERY_TYPE, fields)
            .with_documentation("The query entry point for the entire schema."),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiplatform_test::multiplatform_test;

    #[multiplatform_test]
    fn plurals() {
        assert_eq!("Widget".to_plural(), "Widgets");
        assert_eq!("WidgetVersion".to_plural().to_snake_case(), "widget_versions");
    }
}
