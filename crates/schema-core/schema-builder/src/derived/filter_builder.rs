// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! `*FilterInput`, `*ListFilterInput`, `*ListElementFilterInput` and `*FieldsListFilterInput`
//! types, and the `Input` copies of enums they filter on.

use schema_model::{
    field::{DerivedFieldFamily, FieldDef},
    graphql::{GraphQLField, GraphQLType},
    naming::DerivedTypeFamily,
    type_def::{TypeDef, TypeDefKind},
    types::TypeReference,
};

use super::{DerivationContext, DerivedTypes, derived_field};
use crate::{
    built_in_types::{
        self, DATE_TIME_TIME_OF_DAY_FILTER_INPUT, INT, TEXT_FILTER_INPUT, TEXT_LIST_FILTER_INPUT,
        any_of, count_filter, list_filter_fields, not, range_fields,
    },
    capabilities::FieldKind,
    naming::DerivedName,
};

/// Fields of a type reached through a list of `object` mapped values are indexed as parallel
/// lists, so each of them is filtered like a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterContext {
    Document,
    FieldsList,
}

/// Filters of a scalar or enum type. Enum filters compare against the enum's `Input` copy.
pub(crate) fn derive_leaf_filters(ctx: &DerivationContext<'_>, out: &mut DerivedTypes, type_def: &TypeDef) {
    let name = type_def.name.as_str();
    let (value_type, ordered, time_of_day) = match &type_def.kind {
        TypeDefKind::Enum(enum_type) => {
            let input = ctx.derived_name(DerivedTypeFamily::InputEnum, name);
            let mut input_enum =
                GraphQLType::enum_type(&input, built_in_types::enum_values(&enum_type.values))
                    .derived_from(name, DerivedTypeFamily::InputEnum);
            input_enum.documentation.clone_from(&type_def.documentation);
            out.insert(DerivedName::of(DerivedTypeFamily::InputEnum, name), input_enum);

            (input, false, false)
        }
        TypeDefKind::Scalar(scalar) => (name.to_string(), scalar.ordered, scalar.time_of_day_filter),
        _ => return,
    };

    let filter = ctx.derived_name(DerivedTypeFamily::FilterInput, name);
    let element_filter = ctx.derived_name(DerivedTypeFamily::ListElementFilterInput, name);
    let list_filter = ctx.derived_name(DerivedTypeFamily::ListFilterInput, name);
    let int_filter = ctx.derived_name(DerivedTypeFamily::FilterInput, INT);

    let mut filter_fields = vec![
        any_of(&filter),
        not(&filter),
        equal_to_any_of(TypeReference::list_of(TypeReference::named(&value_type))),
    ];
    let mut element_fields = vec![
        any_of(&element_filter),
        equal_to_any_of(TypeReference::list_of(TypeReference::non_null_named(&value_type))),
    ];
    if ordered {
        filter_fields.extend(range_fields(&value_type));
        element_fields.extend(range_fields(&value_type));
    }
    if time_of_day {
        filter_fields.push(time_of_day_field());
        element_fields.push(time_of_day_field());
    }

    out.insert(
        DerivedName::of(DerivedTypeFamily::FilterInput, name),
        GraphQLType::input_object(&filter, filter_fields)
            .with_documentation(format!("Input type used to specify filters on `{name}` fields."))
            .derived_from(name, DerivedTypeFamily::FilterInput),
    );
    out.insert(
        DerivedName::of(DerivedTypeFamily::ListElementFilterInput, name),
        GraphQLType::input_object(&element_filter, element_fields)
            .with_documentation(format!(
                "Input type used to specify filters on elements of a `[{name}]` field."
            ))
            .derived_from(name, DerivedTypeFamily::ListElementFilterInput),
    );
    out.insert(
        DerivedName::of(DerivedTypeFamily::ListFilterInput, name),
        GraphQLType::input_object(
            &list_filter,
            list_filter_fields(&list_filter, &element_filter, &int_filter),
        )
        .with_documentation(format!("Input type used to specify filters on `[{name}]` fields."))
        .derived_from(name, DerivedTypeFamily::ListFilterInput),
    );
}

/// The `*FilterInput` of an object, interface or union type.
pub(crate) fn ensure_filter(ctx: &DerivationContext<'_>, out: &mut DerivedTypes, type_name: &str) -> String {
    let derived = DerivedName::of(DerivedTypeFamily::FilterInput, type_name);
    let name = ctx.derived_name(DerivedTypeFamily::FilterInput, type_name);
    if out.exists(&derived, &name) {
        return name;
    }

    let mut fields = vec![any_of(&name), not(&name)];
    fields.extend(filter_fields(ctx, out, type_name, FilterContext::Document));

    out.insert(
        derived,
        GraphQLType::input_object(&name, fields)
            .with_documentation(format!("Input type used to specify filters on `{type_name}` fields."))
            .derived_from(type_name, DerivedTypeFamily::FilterInput),
    );
    name
}

/// Filters a list of `nested` values: each element is a separate document matched by the
/// element type's own filter.
fn ensure_list_filter(ctx: &DerivationContext<'_>, out: &mut DerivedTypes, type_name: &str) -> String {
    let derived = DerivedName::of(DerivedTypeFamily::ListFilterInput, type_name);
    let name = ctx.derived_name(DerivedTypeFamily::ListFilterInput, type_name);
    if out.exists(&derived, &name) {
        return name;
    }

    let element_filter = ensure_filter(ctx, out, type_name);
    let int_filter = ctx.derived_name(DerivedTypeFamily::FilterInput, INT);
    out.insert(
        derived,
        GraphQLType::input_object(&name, list_filter_fields(&name, &element_filter, &int_filter))
            .with_documentation(format!("Input type used to specify filters on `[{type_name}]` fields."))
            .derived_from(type_name, DerivedTypeFamily::ListFilterInput),
    );
    name
}

fn ensure_fields_list_filter(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_name: &str,
) -> String {
    let derived = DerivedName::of(DerivedTypeFamily::FieldsListFilterInput, type_name);
    let name = ctx.derived_name(DerivedTypeFamily::FieldsListFilterInput, type_name);
    if out.exists(&derived, &name) {
        return name;
    }

    let mut fields = vec![any_of(&name), not(&name)];
    fields.extend(filter_fields(ctx, out, type_name, FilterContext::FieldsList));

    if ctx.resolved.field(type_name, "count").is_some() {
        out.warn(format!(
            "`{type_name}` has a field named `count`, so `{name}` does not offer the synthetic `count` filter on the number of list elements."
        ));
    } else {
        let int_filter = ctx.derived_name(DerivedTypeFamily::FilterInput, INT);
        fields.push(count_filter(&int_filter));
    }

    out.insert(
        derived,
        GraphQLType::input_object(&name, fields)
            .with_documentation(format!(
                "Input type used to specify filters on a `[{type_name}]` field whose values are indexed as parallel lists."
            ))
            .derived_from(type_name, DerivedTypeFamily::FieldsListFilterInput),
    );
    name
}

fn filter_fields(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_name: &str,
    context: FilterContext,
) -> Vec<GraphQLField> {
    ctx.resolved
        .fields(type_name)
        .iter()
        .filter(|field| ctx.capabilities.filterable(field))
        .filter_map(|field| {
            let filter = filter_reference(ctx, out, field, context)?;
            Some(derived_field(
                &field.name,
                TypeReference::named(&filter),
                field,
                DerivedFieldFamily::Filter,
                format!("Used to filter on the `{}` field.", field.name),
            ))
        })
        .collect()
}

fn filter_reference(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    field: &FieldDef,
    context: FilterContext,
) -> Option<String> {
    let as_list = field.typ.is_list() || context == FilterContext::FieldsList;

    let reference = match ctx.capabilities.kind(field) {
        FieldKind::Excluded => return None,
        FieldKind::Text if as_list => TEXT_LIST_FILTER_INPUT.to_string(),
        FieldKind::Text => TEXT_FILTER_INPUT.to_string(),
        FieldKind::Leaf(leaf) if as_list => {
            ctx.derived_name(DerivedTypeFamily::ListFilterInput, &leaf.name)
        }
        FieldKind::Leaf(leaf) => ctx.derived_name(DerivedTypeFamily::FilterInput, &leaf.name),
        FieldKind::Object {
            type_def,
            nested: true,
        } => ensure_list_filter(ctx, out, &type_def.name),
        FieldKind::Object { type_def, .. } if as_list => {
            ensure_fields_list_filter(ctx, out, &type_def.name)
        }
        FieldKind::Object { type_def, .. } => ensure_filter(ctx, out, &type_def.name),
    };
    Some(reference)
}

fn equal_to_any_of(typ: TypeReference) -> GraphQLField {
    GraphQLField::new("equal_to_any_of", typ).with_documentation(
        "Matches records where the field value is equal to any of the provided values.\n\nWhen `null` is passed, matches all documents. When an empty list is passed, matches no documents.",
    )
}

fn time_of_day_field() -> GraphQLField {
    GraphQLField::new(
        "time_of_day",
        TypeReference::named(DATE_TIME_TIME_OF_DAY_FILTER_INPUT),
    )
    .with_documentation("Matches records based on the time-of-day of the `DateTime` values.")
}
