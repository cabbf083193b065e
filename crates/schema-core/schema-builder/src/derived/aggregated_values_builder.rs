// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! `*AggregatedValues` types: the functions computed over the values of aggregatable fields.

use runtime_metadata::{AggregationFunction, ComputationDetail, ElasticGraphCategory};
use schema_model::{
    field::DerivedFieldFamily,
    graphql::{GraphQLField, GraphQLType},
    naming::DerivedTypeFamily,
    type_def::{ScalarAggregation, TypeDef, TypeDefKind},
    types::TypeReference,
};

use super::{DerivationContext, DerivedTypes, derived_field};
use crate::{
    built_in_types::{
        FLOAT, JSON_SAFE_LONG, LONG_STRING, NON_NUMERIC_AGGREGATED_VALUES,
        approximate_distinct_value_count,
    },
    capabilities::FieldKind,
    naming::DerivedName,
};

/// `IntAggregatedValues`, `DateTimeAggregatedValues`, ... for scalars aggregated numerically.
pub(crate) fn derive_scalar_aggregated_values(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_def: &TypeDef,
) {
    let Some(scalar) = type_def.as_scalar() else {
        return;
    };
    let scalar_name = type_def.name.as_str();

    let fields = match scalar.aggregation {
        // Sums of `Int` values can exceed the `Int` range.
        ScalarAggregation::Integer | ScalarAggregation::SafeLong => vec![
            approximate_avg(FLOAT),
            approximate_distinct_value_count(),
            approximate_sum(),
            exact(AggregationFunction::Max, scalar_name),
            exact(AggregationFunction::Min, scalar_name),
            exact(AggregationFunction::Sum, JSON_SAFE_LONG),
        ],
        ScalarAggregation::Float => vec![
            approximate_avg(FLOAT),
            approximate_distinct_value_count(),
            approximate_sum(),
            exact(AggregationFunction::Max, FLOAT),
            exact(AggregationFunction::Min, FLOAT),
        ],
        // Values may exceed the range of `JsonSafeLong`, so exact results can be unavailable.
        ScalarAggregation::LongString => vec![
            approximate_avg(FLOAT),
            approximate_distinct_value_count(),
            approximate(AggregationFunction::Max, LONG_STRING),
            approximate(AggregationFunction::Min, LONG_STRING),
            approximate_sum(),
            exact(AggregationFunction::Max, JSON_SAFE_LONG),
            exact(AggregationFunction::Min, JSON_SAFE_LONG),
            exact(AggregationFunction::Sum, JSON_SAFE_LONG),
        ],
        ScalarAggregation::Temporal => vec![
            approximate_distinct_value_count(),
            exact(AggregationFunction::Avg, scalar_name),
            exact(AggregationFunction::Max, scalar_name),
            exact(AggregationFunction::Min, scalar_name),
        ],
        ScalarAggregation::NonNumeric => return,
    };

    let name = ctx.derived_name(DerivedTypeFamily::AggregatedValues, scalar_name);
    out.insert(
        DerivedName::of(DerivedTypeFamily::AggregatedValues, scalar_name),
        GraphQLType::object(&name, fields)
            .with_documentation(format!(
                "A return type used from aggregations to provided aggregated values over `{scalar_name}` fields."
            ))
            .derived_from(scalar_name, DerivedTypeFamily::AggregatedValues)
            .with_category(ElasticGraphCategory::ScalarAggregatedValues),
    );
}

/// The `*AggregatedValues` type of an object, interface or union with aggregatable fields.
pub(crate) fn ensure_aggregated_values(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_name: &str,
) -> Option<String> {
    if !ctx.capabilities.has_aggregatable_fields(type_name) {
        return None;
    }

    let derived = DerivedName::of(DerivedTypeFamily::AggregatedValues, type_name);
    let name = ctx.derived_name(DerivedTypeFamily::AggregatedValues, type_name);
    if out.exists(&derived, &name) {
        return Some(name);
    }

    let mut fields = vec![];
    for field in ctx.resolved.fields(type_name) {
        if !ctx.capabilities.aggregatable(field) {
            continue;
        }

        let values_type = match ctx.capabilities.kind(field) {
            FieldKind::Leaf(leaf) => leaf_aggregated_values(ctx, leaf),
            FieldKind::Object { type_def, .. } => {
                match ensure_aggregated_values(ctx, out, &type_def.name) {
                    Some(values_type) => values_type,
                    None => continue,
                }
            }
            FieldKind::Excluded | FieldKind::Text => continue,
        };

        fields.push(derived_field(
            &field.name,
            TypeReference::named(&values_type),
            field,
            DerivedFieldFamily::AggregatedValues,
            format!("Computed aggregate values for the `{}` field.", field.name),
        ));
    }

    out.insert(
        derived,
        GraphQLType::object(&name, fields)
            .with_documentation(format!(
                "Type used to perform aggregation computations on `{type_name}` fields."
            ))
            .derived_from(type_name, DerivedTypeFamily::AggregatedValues),
    );
    Some(name)
}

fn leaf_aggregated_values(ctx: &DerivationContext<'_>, leaf: &TypeDef) -> String {
    match &leaf.kind {
        TypeDefKind::Scalar(scalar) if scalar.aggregation != ScalarAggregation::NonNumeric => {
            ctx.derived_name(DerivedTypeFamily::AggregatedValues, &leaf.name)
        }
        _ => NON_NUMERIC_AGGREGATED_VALUES.to_string(),
    }
}

fn computed(name: &str, typ: TypeReference, function: AggregationFunction) -> GraphQLField {
    let empty_bucket_value = matches!(function, AggregationFunction::Sum).then_some(0);
    GraphQLField::new(name, typ).with_computation(ComputationDetail {
        function,
        empty_bucket_value,
    })
}

fn function_name(function: AggregationFunction) -> &'static str {
    match function {
        AggregationFunction::Avg => "avg",
        AggregationFunction::Cardinality => "distinct_value_count",
        AggregationFunction::Max => "max",
        AggregationFunction::Min => "min",
        AggregationFunction::Sum => "sum",
    }
}

fn approximate_avg(result_type: &str) -> GraphQLField {
    computed(
        "approximate_avg",
        TypeReference::named(result_type),
        AggregationFunction::Avg,
    )
    .with_documentation("The average (mean) of the field values within this grouping. The computation of this value may introduce additional imprecision (on top of the natural imprecision of floats) when it deals with intermediary values that are outside the `JsonSafeLong` range.")
}

/// Sums are computed as doubles, so they are never `null` (an empty bucket sums to `0`).
fn approximate_sum() -> GraphQLField {
    computed(
        "approximate_sum",
        TypeReference::non_null_named(FLOAT),
        AggregationFunction::Sum,
    )
    .with_documentation("The sum of the field values within this grouping. As with all double-precision `Float` values, its value may be an approximation.")
}

fn approximate(function: AggregationFunction, result_type: &str) -> GraphQLField {
    let name = function_name(function);
    computed(
        &format!("approximate_{name}"),
        TypeReference::named(result_type),
        function,
    )
    .with_documentation(format!(
        "The {name} of the field values within this grouping. May be an approximation when the values fall outside the `JsonSafeLong` range."
    ))
}

fn exact(function: AggregationFunction, result_type: &str) -> GraphQLField {
    let name = function_name(function);
    computed(
        &format!("exact_{name}"),
        TypeReference::named(result_type),
        function,
    )
    .with_documentation(format!(
        "The exact {name} of the field values within this grouping, or `null` when it cannot be computed exactly."
    ))
}
