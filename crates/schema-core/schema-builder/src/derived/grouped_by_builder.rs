// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! `*GroupedBy` types, selecting the fields aggregations group on.

use runtime_metadata::ElasticGraphCategory;
use schema_model::{
    field::{DerivedFieldFamily, FieldDef},
    graphql::{GraphQLArgument, GraphQLField, GraphQLType},
    naming::DerivedTypeFamily,
    type_def::TypeDef,
    types::TypeReference,
};

use super::{DerivationContext, DerivedTypes, derived_field};
use crate::{
    built_in_types::{
        DATE, DATE_GROUPING_GRANULARITY, DATE_GROUPING_OFFSET_INPUT, DATE_GROUPING_TRUNCATION_UNIT,
        DATE_TIME, DATE_TIME_GROUPING_GRANULARITY, DATE_TIME_GROUPING_OFFSET_INPUT,
        DATE_TIME_GROUPING_TRUNCATION_UNIT, DAY_OF_WEEK, DAY_OF_WEEK_GROUPING_OFFSET_INPUT,
        LOCAL_TIME, LOCAL_TIME_GROUPING_OFFSET_INPUT, LOCAL_TIME_GROUPING_TRUNCATION_UNIT,
        time_zone_argument,
    },
    capabilities::FieldKind,
    naming::DerivedName,
};

pub(crate) fn ensure_grouped_by(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_name: &str,
) -> Option<String> {
    if !ctx.capabilities.has_groupable_fields(type_name) {
        return None;
    }

    let derived = DerivedName::of(DerivedTypeFamily::GroupedBy, type_name);
    let name = ctx.derived_name(DerivedTypeFamily::GroupedBy, type_name);
    if !out.exists(&derived, &name) {
        let fields: Vec<GraphQLField> = ctx
            .resolved
            .fields(type_name)
            .iter()
            .filter(|field| ctx.capabilities.groupable(type_name, field))
            .filter_map(|field| grouped_by_field(ctx, out, field))
            .collect();

        // Subtypes of abstract types can contribute a field and another list field's singular
        // under the same name.
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|earlier| earlier.name == field.name) {
                out.problem(format!(
                    "`{name}` would have two fields named `{}`. Choose a different `singular` name for the list field.",
                    field.name
                ));
            }
        }

        out.insert(
            derived,
            GraphQLType::object(&name, fields)
                .with_documentation(format!(
                    "Type used to specify the `{type_name}` fields to group by for aggregations."
                ))
                .derived_from(type_name, DerivedTypeFamily::GroupedBy),
        );
    }
    Some(name)
}

fn grouped_by_field(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    field: &FieldDef,
) -> Option<GraphQLField> {
    // Lists group on their individual values, exposed under the singular name.
    let is_list = field.typ.is_list();
    let name = match &field.singular {
        Some(singular) if is_list => singular.as_str(),
        _ => field.name.as_str(),
    };
    let documentation = if is_list {
        format!(
            "The individual value from `{field_name}` for this group.\n\nNote: `{field_name}` is a collection field, but selecting this field will group on individual values of `{field_name}`. That means that a document may be grouped into multiple aggregation groupings (i.e. when its `{field_name}` field has multiple values) leading to some data duplication in the response.",
            field_name = field.name
        )
    } else {
        format!("The `{}` field value for this group.", field.name)
    };

    let (typ, arguments) = match ctx.capabilities.kind(field) {
        FieldKind::Leaf(leaf) => leaf_grouping(ctx, leaf),
        FieldKind::Object {
            type_def,
            nested: false,
        } => (
            TypeReference::named(&ensure_grouped_by(ctx, out, &type_def.name)?),
            vec![],
        ),
        FieldKind::Object { nested: true, .. } | FieldKind::Excluded | FieldKind::Text => {
            return None;
        }
    };

    Some(
        derived_field(name, typ, field, DerivedFieldFamily::GroupedBy, documentation)
            .with_arguments(arguments),
    )
}

/// Temporal values are grouped into buckets. By default `Date` and `DateTime` fields expose the
/// `DateGroupedBy`/`DateTimeGroupedBy` helper types; the legacy schema takes a `granularity`
/// argument instead.
fn leaf_grouping(ctx: &DerivationContext<'_>, leaf: &TypeDef) -> (TypeReference, Vec<GraphQLArgument>) {
    let legacy = ctx.config.derivation.legacy_grouping_schema;

    match (leaf.name.as_str(), legacy) {
        (DATE | DATE_TIME, false) => (
            TypeReference::named(&ctx.derived_name(DerivedTypeFamily::GroupedBy, &leaf.name)),
            vec![],
        ),
        (DATE, true) => (
            TypeReference::named(DATE),
            vec![
                granularity_argument(ctx, DATE_GROUPING_GRANULARITY),
                offset_argument(DATE_GROUPING_OFFSET_INPUT),
            ],
        ),
        (DATE_TIME, true) => (
            TypeReference::named(DATE_TIME),
            vec![
                granularity_argument(ctx, DATE_TIME_GROUPING_GRANULARITY),
                time_zone_argument(),
                offset_argument(DATE_TIME_GROUPING_OFFSET_INPUT),
            ],
        ),
        (LOCAL_TIME, false) => (
            TypeReference::named(LOCAL_TIME),
            vec![
                truncation_unit_argument(ctx, LOCAL_TIME_GROUPING_TRUNCATION_UNIT),
                offset_argument(LOCAL_TIME_GROUPING_OFFSET_INPUT),
            ],
        ),
        _ => (TypeReference::named(&leaf.name), vec![]),
    }
}

/// The `DateGroupedBy` and `DateTimeGroupedBy` helper types.
pub(crate) fn derive_date_grouped_by(ctx: &DerivationContext<'_>, out: &mut DerivedTypes, scalar: &str) {
    let fields = match scalar {
        DATE => vec![as_date(ctx, false), as_day_of_week(false)],
        DATE_TIME => vec![
            GraphQLField::new("as_date_time", TypeReference::named(DATE_TIME))
                .with_arguments(vec![
                    truncation_unit_argument(ctx, DATE_TIME_GROUPING_TRUNCATION_UNIT),
                    time_zone_argument(),
                    offset_argument(DATE_TIME_GROUPING_OFFSET_INPUT),
                ])
                .with_documentation("Used when grouping on the full `DateTime` value."),
            as_date(ctx, true),
            GraphQLField::new("as_time_of_day", TypeReference::named(LOCAL_TIME))
                .with_arguments(vec![
                    truncation_unit_argument(ctx, LOCAL_TIME_GROUPING_TRUNCATION_UNIT),
                    time_zone_argument(),
                    offset_argument(LOCAL_TIME_GROUPING_OFFSET_INPUT),
                ])
                .with_documentation("An alternative to `as_date_time` for when grouping on just the time-of-day is desired."),
            as_day_of_week(true),
        ],
        _ => return,
    };

    let name = ctx.derived_name(DerivedTypeFamily::GroupedBy, scalar);
    out.insert(
        DerivedName::of(DerivedTypeFamily::GroupedBy, scalar),
        GraphQLType::object(&name, fields)
            .with_documentation(format!(
                "Allows for grouping `{scalar}` values based on the desired return type."
            ))
            .derived_from(scalar, DerivedTypeFamily::GroupedBy)
            .with_category(ElasticGraphCategory::DateGroupedByObject),
    );
}

fn as_date(ctx: &DerivationContext<'_>, with_time_zone: bool) -> GraphQLField {
    let mut arguments = vec![truncation_unit_argument(ctx, DATE_GROUPING_TRUNCATION_UNIT)];
    if with_time_zone {
        arguments.push(time_zone_argument());
    }
    arguments.push(offset_argument(DATE_GROUPING_OFFSET_INPUT));

    GraphQLField::new("as_date", TypeReference::named(DATE))
        .with_arguments(arguments)
        .with_documentation("Used when grouping on the date portion of the value.")
}

fn as_day_of_week(with_time_zone: bool) -> GraphQLField {
    let mut arguments = vec![];
    if with_time_zone {
        arguments.push(time_zone_argument());
    }
    arguments.push(offset_argument(DAY_OF_WEEK_GROUPING_OFFSET_INPUT));

    GraphQLField::new("as_day_of_week", TypeReference::named(DAY_OF_WEEK))
        .with_arguments(arguments)
        .with_documentation("An alternative to `as_date` for when grouping on the day-of-week is desired.")
}

fn truncation_unit_argument(ctx: &DerivationContext<'_>, unit_enum: &str) -> GraphQLArgument {
    GraphQLArgument::new(
        "truncation_unit",
        TypeReference::non_null_named(&ctx.derived_name(DerivedTypeFamily::InputEnum, unit_enum)),
    )
    .with_documentation("Determines the grouping truncation unit for this field.")
}

fn granularity_argument(ctx: &DerivationContext<'_>, granularity_enum: &str) -> GraphQLArgument {
    GraphQLArgument::new(
        "granularity",
        TypeReference::non_null_named(
            &ctx.derived_name(DerivedTypeFamily::InputEnum, granularity_enum),
        ),
    )
    .with_documentation("Determines the grouping granularity for this field.")
}

fn offset_argument(offset_input: &str) -> GraphQLArgument {
    GraphQLArgument::new("offset", TypeReference::named(offset_input)).with_documentation(
        "Amount of offset (positive or negative) to shift the boundaries of each grouping bucket.",
    )
}
