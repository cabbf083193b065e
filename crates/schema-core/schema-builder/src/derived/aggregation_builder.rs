// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! `*Aggregation` types of indexed types, and the sub-aggregation types of their `nested` fields.
//!
//! A sub-aggregation mirrors an aggregation one level down: `Team.players` (a `nested` list of
//! `Player`) is aggregated through `TeamAggregationSubAggregations.players`, returning a
//! `TeamPlayerSubAggregationConnection`. The names of sub-aggregation types carry the chain of
//! types above them so that the same nested type reached through different parents gets
//! distinct types.

use heck::ToUpperCamelCase;
use runtime_metadata::ElasticGraphCategory;
use schema_model::{
    field::DerivedFieldFamily,
    graphql::{GraphQLArgument, GraphQLField, GraphQLType},
    naming::DerivedTypeFamily,
    types::TypeReference,
};

use super::{
    DerivationContext, DerivedTypes,
    aggregated_values_builder::ensure_aggregated_values,
    connection_builder::{ensure_aggregation_connection, filter_argument},
    derived_field,
    filter_builder::ensure_filter,
    grouped_by_builder::ensure_grouped_by,
};
use crate::{
    built_in_types::{INT, JSON_SAFE_LONG},
    naming::{DerivedName, NamePart},
};

pub(crate) fn derive_indexed_aggregation(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_name: &str,
) {
    let derived = DerivedName::of(DerivedTypeFamily::Aggregation, type_name);
    let name = ctx.derived_name(DerivedTypeFamily::Aggregation, type_name);
    if out.exists(&derived, &name) {
        return;
    }

    let parent_types = [NamePart::Type(type_name.to_string())];
    let fields = aggregation_fields(ctx, out, type_name, &name, &parent_types);
    out.insert(
        derived,
        GraphQLType::object(&name, fields)
            .with_documentation(format!(
                "Return type representing a bucket of `{type_name}` documents for an aggregations query."
            ))
            .derived_from(type_name, DerivedTypeFamily::Aggregation)
            .with_category(ElasticGraphCategory::IndexedAggregation),
    );
    ensure_aggregation_connection(ctx, out, &name);
}

fn aggregation_fields(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_name: &str,
    aggregation_name: &str,
    parent_types: &[NamePart],
) -> Vec<GraphQLField> {
    let mut fields = vec![];

    if let Some(grouped_by) = ensure_grouped_by(ctx, out, type_name) {
        fields.push(
            GraphQLField::new("grouped_by", TypeReference::named(&grouped_by)).with_documentation(
                format!("Used to specify the `{type_name}` fields to group by. The returned values identify each aggregation bucket."),
            ),
        );
    }

    fields.push(
        GraphQLField::new("count", TypeReference::non_null_named(JSON_SAFE_LONG))
            .with_documentation(format!(
                "The count of `{type_name}` documents in an aggregation bucket."
            )),
    );

    if let Some(aggregated_values) = ensure_aggregated_values(ctx, out, type_name) {
        fields.push(
            GraphQLField::new("aggregated_values", TypeReference::named(&aggregated_values))
                .with_documentation(format!(
                    "Provides computed aggregated values over all `{type_name}` documents in an aggregation bucket."
                )),
        );
    }

    let container_base = vec![NamePart::Type(aggregation_name.to_string())];
    if let Some(sub_aggregations) =
        ensure_sub_aggregations(ctx, out, container_base, type_name, parent_types)
    {
        fields.push(
            GraphQLField::new("sub_aggregations", TypeReference::named(&sub_aggregations))
                .with_documentation(format!(
                    "Used to perform sub-aggregations of the `nested` fields of `{type_name}`."
                )),
        );
    }

    fields
}

/// The type listing the sub-aggregations reachable from `type_name`. Embedded objects holding
/// `nested` fields get a container of their own, named after the path to them.
fn ensure_sub_aggregations(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    base: Vec<NamePart>,
    type_name: &str,
    parent_types: &[NamePart],
) -> Option<String> {
    if !ctx.capabilities.has_sub_aggregations(type_name) {
        return None;
    }

    let derived = DerivedName {
        family: DerivedTypeFamily::SubAggregations,
        base,
        parent_types: vec![],
    };
    let name = derived.logical(ctx.naming());
    if out.exists(&derived, &name) {
        return Some(name);
    }

    let mut fields = vec![];
    for field in ctx.resolved.fields(type_name) {
        if ctx.capabilities.sub_aggregatable(field) {
            let element = field.typ.type_name();
            let connection = ensure_sub_aggregation(ctx, out, element, parent_types);
            let filter = ensure_filter(ctx, out, element);

            fields.push(
                derived_field(
                    &field.name,
                    TypeReference::named(&connection),
                    field,
                    DerivedFieldFamily::SubAggregations,
                    format!("Used to perform a sub-aggregation of `{}`.", field.name),
                )
                .with_arguments(vec![
                    filter_argument(&filter, element),
                    GraphQLArgument::new("first", TypeReference::named(INT)).with_documentation(
                        "Determines how many sub-aggregation buckets should be returned.",
                    ),
                ]),
            );
        } else if let Some(embedded) = ctx.capabilities.has_sub_aggregations_through(field) {
            let mut embedded_base = derived.base.clone();
            embedded_base.push(NamePart::Literal(field.name.to_upper_camel_case()));

            if let Some(embedded_container) =
                ensure_sub_aggregations(ctx, out, embedded_base, &embedded.name, parent_types)
            {
                fields.push(derived_field(
                    &field.name,
                    TypeReference::named(&embedded_container),
                    field,
                    DerivedFieldFamily::SubAggregations,
                    format!("Used to perform sub-aggregations of the `{}` fields.", field.name),
                ));
            }
        }
    }

    out.insert(
        derived,
        GraphQLType::object(&name, fields)
            .with_documentation(format!(
                "Provides access to the `sub_aggregations` within each `{type_name}`."
            ))
            .derived_from(type_name, DerivedTypeFamily::SubAggregations),
    );
    Some(name)
}

/// The sub-aggregation type of `element` under `parent_types`; returns the name of its
/// connection.
fn ensure_sub_aggregation(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    element: &str,
    parent_types: &[NamePart],
) -> String {
    let derived = DerivedName {
        family: DerivedTypeFamily::SubAggregation,
        base: vec![NamePart::Type(element.to_string())],
        parent_types: parent_types.to_vec(),
    };
    let name = derived.logical(ctx.naming());
    let connection = ctx.derived_name(DerivedTypeFamily::Connection, &name);
    if out.exists(&derived, &name) {
        return connection;
    }

    let mut child_parent_types = parent_types.to_vec();
    child_parent_types.push(NamePart::Type(element.to_string()));
    let fields = aggregation_fields(ctx, out, element, &name, &child_parent_types);

    out.insert(
        derived,
        GraphQLType::object(&name, fields)
            .with_documentation(format!(
                "Return type representing a bucket of `{element}` objects for a sub-aggregation within each parent document."
            ))
            .derived_from(element, DerivedTypeFamily::SubAggregation)
            .with_category(ElasticGraphCategory::NestedSubAggregation),
    );
    out.insert(
        DerivedName::of(DerivedTypeFamily::Connection, &name),
        GraphQLType::object(
            &connection,
            vec![
                GraphQLField::new(
                    "nodes",
                    TypeReference::non_null_list_of(TypeReference::non_null_named(&name)),
                )
                .with_documentation(format!("The list of `{name}` results.")),
            ],
        )
        .with_documentation(format!(
            "Represents a collection of `{name}` results."
        ))
        .derived_from(&name, DerivedTypeFamily::Connection)
        .with_category(ElasticGraphCategory::NestedSubAggregationConnection),
    );
    connection
}
