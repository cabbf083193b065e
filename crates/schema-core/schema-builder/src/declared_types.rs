// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! GraphQL types of the registry's own types: declared types and built-in scalars and enums.
//!
//! Relationship and paginated collection fields are exposed through connections here, which
//! pulls the connection (and aggregation) types of their targets into the derived types.

use heck::ToSnakeCase;

use runtime_metadata::{Cardinality, Direction, RelationMetadata};
use schema_model::{
    field::{FieldDef, NESTED_MAPPING_TYPE},
    graphql::{GraphQLField, GraphQLType, GraphQLTypeKind, TypeOrigin},
    naming::DerivedTypeFamily,
    relation::Relation,
    type_def::{TypeDef, TypeDefKind},
    types::TypeReference,
};

use crate::{
    built_in_types::enum_values,
    derived::{
        DerivationContext, DerivedTypes,
        aggregation_builder::derive_indexed_aggregation,
        connection_builder::{
            aggregation_connection_arguments, document_connection_arguments,
            ensure_aggregation_connection, ensure_connection, pagination_arguments,
        },
    },
    error::SchemaBuildingError,
};

pub(crate) fn registry_graphql_types(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
) -> Result<Vec<GraphQLType>, SchemaBuildingError> {
    ctx.resolved
        .registry()
        .iter()
        .map(|type_def| graphql_type(ctx, out, type_def))
        .collect()
}

fn graphql_type(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_def: &TypeDef,
) -> Result<GraphQLType, SchemaBuildingError> {
    let mut graphql_type = match &type_def.kind {
        TypeDefKind::Scalar(_) => GraphQLType::scalar(&type_def.name),
        TypeDefKind::Enum(enum_type) => {
            GraphQLType::enum_type(&type_def.name, enum_values(&enum_type.values))
        }
        TypeDefKind::Union(union) => GraphQLType::union(&type_def.name, union.subtypes.clone()),
        TypeDefKind::Object(composite) | TypeDefKind::Interface(composite) => {
            let mut fields = vec![];
            for field in composite.fields.iter().filter(|f| f.is_graphql_visible()) {
                for graphql_field in graphql_fields(ctx, out, type_def, field) {
                    if fields.iter().any(|f: &GraphQLField| f.name == graphql_field.name) {
                        return Err(SchemaBuildingError::DuplicateField {
                            type_name: type_def.name.clone(),
                            field: graphql_field.name,
                        });
                    }
                    fields.push(graphql_field);
                }
            }

            let implements = composite.implements.clone();
            let mut graphql_type = GraphQLType::object(&type_def.name, fields);
            graphql_type.kind = match type_def.kind {
                TypeDefKind::Interface(_) => GraphQLTypeKind::Interface { implements },
                _ => GraphQLTypeKind::Object { implements },
            };
            graphql_type.graphql_only_return_type = type_def.graphql_only;
            graphql_type
        }
    };

    graphql_type.documentation.clone_from(&type_def.documentation);
    graphql_type.directives.clone_from(&type_def.directives);
    if !type_def.built_in {
        graphql_type.origin = TypeOrigin::Declared;
    }
    Ok(graphql_type)
}

/// The GraphQL fields of one declared field: usually one, two for `relates_to_many`
/// relationships to indexed types.
fn graphql_fields(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    owner: &TypeDef,
    field: &FieldDef,
) -> Vec<GraphQLField> {
    let mut graphql_field = GraphQLField::new(&field.name, field.typ.clone())
        .with_documentation_opt(field.documentation.clone());
    graphql_field.directives.clone_from(&field.directives);

    if let Some(relation) = &field.relation {
        let metadata = relation_metadata(ctx, owner, relation);
        graphql_field.relation = Some(metadata.clone());

        if relation.cardinality == Cardinality::One {
            return vec![graphql_field];
        }

        let related_type = relation.related_type.as_str();
        let connection = ensure_connection(ctx, out, related_type);
        graphql_field.typ = TypeReference::named(&connection);
        graphql_field.arguments = document_connection_arguments(ctx, out, related_type);

        if !ctx.resolved.is_indexed(related_type) {
            return vec![graphql_field];
        }

        derive_indexed_aggregation(ctx, out, related_type);
        let aggregation = ctx.derived_name(DerivedTypeFamily::Aggregation, related_type);
        let aggregation_connection = ensure_aggregation_connection(ctx, out, &aggregation);
        let singular = relation
            .singular
            .clone()
            .unwrap_or_else(|| related_type.to_snake_case());

        let mut aggregations = GraphQLField::new(
            format!("{singular}_aggregations"),
            TypeReference::named(&aggregation_connection),
        )
        .with_documentation(format!(
            "Aggregations over the `{}` data:\n\n> {}",
            field.name,
            field
                .documentation
                .as_deref()
                .unwrap_or(&format!("The `{related_type}`s related through `{}`.", field.name))
        ))
        .with_arguments(aggregation_connection_arguments(ctx, out, related_type));
        aggregations.relation = Some(metadata);

        return vec![graphql_field, aggregations];
    }

    if field.paginated {
        let element = field.typ.type_name();
        let connection = ensure_connection(ctx, out, element);
        graphql_field.typ = TypeReference::named(&connection);
        graphql_field.arguments = pagination_arguments();
    }

    if field.is_indexed() {
        graphql_field.name_in_index = Some(field.name_in_index.clone());
    }
    vec![graphql_field]
}

fn relation_metadata(ctx: &DerivationContext<'_>, owner: &TypeDef, relation: &Relation) -> RelationMetadata {
    let foreign_key_type = match relation.direction {
        Direction::In => relation.related_type.as_str(),
        Direction::Out => owner.name.as_str(),
    };

    RelationMetadata {
        foreign_key: relation.foreign_key.clone(),
        direction: relation.direction,
        additional_filter: relation.additional_filter.clone(),
        foreign_key_nested_paths: nested_paths(ctx, foreign_key_type, &relation.foreign_key),
    }
}

/// Index paths of the `nested` fields a dotted path passes through. Unresolvable paths are
/// reported by the relationship validation; here they yield nothing.
fn nested_paths(ctx: &DerivationContext<'_>, type_name: &str, path: &str) -> Vec<String> {
    let Ok(segments) = ctx.resolved.resolve_path(type_name, path) else {
        return vec![];
    };

    let mut index_path: Vec<&str> = vec![];
    let mut nested = vec![];
    for field in segments {
        index_path.push(&field.name_in_index);
        let is_nested = field.typ.is_list()
            && field.mapping.type_name.as_deref() == Some(NESTED_MAPPING_TYPE);
        if is_nested {
            nested.push(index_path.join("."));
        }
    }
    nested
}
