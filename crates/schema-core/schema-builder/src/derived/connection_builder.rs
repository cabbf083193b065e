// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Relay connection and edge types, and the arguments of fields returning them.

use runtime_metadata::ElasticGraphCategory;
use schema_model::{
    graphql::{GraphQLArgument, GraphQLField, GraphQLType},
    naming::DerivedTypeFamily,
    types::TypeReference,
};

use super::{
    DerivationContext, DerivedTypes, filter_builder::ensure_filter,
    sort_order_builder::ensure_sort_order,
};
use crate::{
    built_in_types::{CURSOR, INT, JSON_SAFE_LONG, PAGE_INFO},
    naming::DerivedName,
};

/// The connection (and edge) type paginating over `element_type`. Connections over indexed types
/// can report the total number of matching documents.
pub(crate) fn ensure_connection(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    element_type: &str,
) -> String {
    let total_edge_count = ctx.resolved.is_indexed(element_type);
    connection(ctx, out, element_type, total_edge_count)
}

/// Aggregation results are paginated, but never counted.
pub(crate) fn ensure_aggregation_connection(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    aggregation_type: &str,
) -> String {
    connection(ctx, out, aggregation_type, false)
}

fn connection(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    element_type: &str,
    total_edge_count: bool,
) -> String {
    let derived = DerivedName::of(DerivedTypeFamily::Connection, element_type);
    let name = ctx.derived_name(DerivedTypeFamily::Connection, element_type);
    if out.exists(&derived, &name) {
        return name;
    }

    let edge = ctx.derived_name(DerivedTypeFamily::Edge, element_type);
    out.insert(
        DerivedName::of(DerivedTypeFamily::Edge, element_type),
        GraphQLType::object(
            &edge,
            vec![
                GraphQLField::new("node", TypeReference::named(element_type))
                    .with_documentation(format!("The `{element_type}` of this edge.")),
                GraphQLField::new("cursor", TypeReference::named(CURSOR)).with_documentation(format!(
                    "The `Cursor` of this `{element_type}`. This can be passed in the next query as a `before` or `after` argument to continue paginating from this `{element_type}`."
                )),
            ],
        )
        .with_documentation(format!(
            "Represents a specific `{element_type}` in the context of a `{name}`, providing access to both the `{element_type}` and a pagination `Cursor`."
        ))
        .derived_from(element_type, DerivedTypeFamily::Edge)
        .with_category(ElasticGraphCategory::RelayEdge),
    );

    let mut fields = vec![
        GraphQLField::new(
            "edges",
            TypeReference::non_null_list_of(TypeReference::non_null_named(&edge)),
        )
        .with_documentation(format!(
            "Wraps a specific `{element_type}` to pair it with its pagination cursor."
        )),
        GraphQLField::new(
            "nodes",
            TypeReference::non_null_list_of(TypeReference::non_null_named(element_type)),
        )
        .with_documentation(format!("The list of `{element_type}` results.")),
        GraphQLField::new("page_info", TypeReference::non_null_named(PAGE_INFO))
            .with_documentation("Provides pagination-related information."),
    ];
    if total_edge_count {
        fields.push(
            GraphQLField::new("total_edge_count", TypeReference::non_null_named(JSON_SAFE_LONG))
                .with_documentation("The total number of edges available in this connection to paginate over."),
        );
    }

    out.insert(
        derived,
        GraphQLType::object(&name, fields)
            .with_documentation(format!(
                "Represents a paginated collection of `{element_type}` results."
            ))
            .derived_from(element_type, DerivedTypeFamily::Connection)
            .with_category(ElasticGraphCategory::RelayConnection),
    );
    name
}

pub(crate) fn pagination_arguments() -> Vec<GraphQLArgument> {
    vec![
        GraphQLArgument::new("first", TypeReference::named(INT)).with_documentation(
            "Used in conjunction with the `after` argument to forward-paginate through the results. When provided, limits the number of returned results to the first `n` after the provided `after` cursor (or from the start, if no `after` cursor is provided).",
        ),
        GraphQLArgument::new("after", TypeReference::named(CURSOR)).with_documentation(
            "Used to forward-paginate through the results. When provided, the next page after the provided cursor will be returned.",
        ),
        GraphQLArgument::new("last", TypeReference::named(INT)).with_documentation(
            "Used in conjunction with the `before` argument to backward-paginate through the results. When provided, limits the number of returned results to the last `n` before the provided `before` cursor (or from the end, if no `before` cursor is provided).",
        ),
        GraphQLArgument::new("before", TypeReference::named(CURSOR)).with_documentation(
            "Used to backward-paginate through the results. When provided, the previous page before the provided cursor will be returned.",
        ),
    ]
}

pub(crate) fn filter_argument(filter_type: &str, type_name: &str) -> GraphQLArgument {
    GraphQLArgument::new("filter", TypeReference::named(filter_type)).with_documentation(format!(
        "Used to filter the returned `{type_name}` results based on the provided criteria."
    ))
}

pub(crate) fn order_by_argument(sort_order_type: &str, type_name: &str) -> GraphQLArgument {
    GraphQLArgument::new(
        "order_by",
        TypeReference::list_of(TypeReference::non_null_named(sort_order_type)),
    )
    .with_documentation(format!(
        "Used to specify how the returned `{type_name}` results should be sorted."
    ))
}

/// The arguments of a field returning a connection of `type_name` documents.
pub(crate) fn document_connection_arguments(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_name: &str,
) -> Vec<GraphQLArgument> {
    let filter = ensure_filter(ctx, out, type_name);
    let mut arguments = vec![filter_argument(&filter, type_name)];
    if let Some(sort_order) = ensure_sort_order(ctx, out, type_name) {
        arguments.push(order_by_argument(&sort_order, type_name));
    }
    arguments.extend(pagination_arguments());
    arguments
}

/// The arguments of a field returning a connection of `type_name` aggregations.
pub(crate) fn aggregation_connection_arguments(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_name: &str,
) -> Vec<GraphQLArgument> {
    let filter = ensure_filter(ctx, out, type_name);
    let mut arguments = vec![filter_argument(&filter, type_name)];
    arguments.extend(pagination_arguments());
    arguments
}
