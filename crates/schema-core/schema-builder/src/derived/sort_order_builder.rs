// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use runtime_metadata::{SortDirection, SortField};
use schema_model::{
    field::{DerivedFieldFamily, FieldDef},
    graphql::{GraphQLEnumValue, GraphQLType},
    naming::DerivedTypeFamily,
};

use super::{DerivationContext, DerivedTypes};
use crate::{capabilities::FieldKind, naming::DerivedName};

/// The `*SortOrderInput` enum of a type with at least one sortable field. Embedded objects
/// contribute their own sortable fields, prefixed with the path to them.
pub(crate) fn ensure_sort_order(
    ctx: &DerivationContext<'_>,
    out: &mut DerivedTypes,
    type_name: &str,
) -> Option<String> {
    if !ctx.capabilities.has_sortable_fields(type_name) {
        return None;
    }

    let derived = DerivedName::of(DerivedTypeFamily::SortOrderInput, type_name);
    let name = ctx.derived_name(DerivedTypeFamily::SortOrderInput, type_name);
    if !out.exists(&derived, &name) {
        let mut values = vec![];
        collect_sort_values(ctx, type_name, &mut vec![], &mut values);

        out.insert(
            derived,
            GraphQLType::enum_type(&name, values)
                .with_documentation(format!("Enumerates the ways `{type_name}`s can be sorted."))
                .derived_from(type_name, DerivedTypeFamily::SortOrderInput),
        );
    }
    Some(name)
}

fn collect_sort_values<'a>(
    ctx: &DerivationContext<'a>,
    type_name: &str,
    path: &mut Vec<&'a FieldDef>,
    values: &mut Vec<GraphQLEnumValue>,
) {
    let fields = ctx.resolved.fields(type_name);
    for field in fields.iter().filter(|field| ctx.capabilities.sortable(field)) {
        path.push(field);
        match ctx.capabilities.kind(field) {
            FieldKind::Object { type_def, .. } => {
                collect_sort_values(ctx, &type_def.name, path, values)
            }
            _ => {
                for direction in [SortDirection::Asc, SortDirection::Desc] {
                    values.push(sort_value(path, direction));
                }
            }
        }
        path.pop();
    }
}

fn sort_value(path: &[&FieldDef], direction: SortDirection) -> GraphQLEnumValue {
    let names: Vec<&str> = path.iter().map(|field| field.name.as_str()).collect();
    let index_path: Vec<&str> = path.iter().map(|field| field.name_in_index.as_str()).collect();
    let order = match direction {
        SortDirection::Asc => "ascending",
        SortDirection::Desc => "descending",
    };

    let mut value = GraphQLEnumValue::new(format!(
        "{}_{}",
        names.join("_"),
        direction.enum_value_suffix()
    ))
    .with_documentation(format!("Sorts {order} by the `{}` field.", names.join(".")));
    value.sort_field = Some(SortField {
        field_path: index_path.join("."),
        direction,
    });

    if let Some(customization) = path
        .last()
        .and_then(|leaf| leaf.customization(DerivedFieldFamily::SortOrder))
    {
        customization.apply_to(&mut value.directives, &mut value.documentation);
    }
    value
}
