// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Replays `customize_derived_types`, `customize_all_derived_types` and
//! `customize_derived_type_fields` onto the derived types.
//!
//! The types a declaration can customize are exactly those derived from it, directly or through
//! another derived type (`WidgetAggregationConnection` belongs to `Widget`). A customization may
//! name a type by its logical name or by its emitted name.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use schema_model::{directive::ElementCustomization, graphql::GraphQLType, type_def::TypeDef};

use crate::{
    error::SchemaBuildingError,
    naming::{NameMap, suggestions},
    registry::TypeRegistry,
};

/// Applies the derived type customizations of every declared type to `types` (which still carry
/// logical names).
pub(crate) fn apply_customizations(
    registry: &TypeRegistry,
    types: &mut [GraphQLType],
    name_map: &NameMap,
) -> Result<(), SchemaBuildingError> {
    let mut catalogue = derived_types_by_source(types);

    for type_def in registry.declared_types() {
        if type_def.derived_type_customizations.is_empty()
            && type_def.derived_field_customizations.is_empty()
        {
            continue;
        }

        let lookup = DerivedLookup {
            derived: catalogue.remove(&type_def.name).unwrap_or_default(),
            name_map,
        };

        for customization in &type_def.derived_type_customizations {
            let targets = match &customization.type_names {
                Some(names) => lookup.resolve(type_def, names)?,
                None => lookup.derived.iter().map(|(position, _)| *position).collect(),
            };
            for position in targets {
                let target = &mut types[position];
                customization
                    .customization
                    .apply_to(&mut target.directives, &mut target.documentation);
            }
        }

        for field_customization in &type_def.derived_field_customizations {
            let requested = std::slice::from_ref(&field_customization.type_name);
            for position in lookup.resolve(type_def, requested)? {
                customize_members(
                    type_def,
                    &mut types[position],
                    &field_customization.type_name,
                    &field_customization.field_names,
                    &field_customization.customization,
                )?;
            }
        }

        debug!(source_type = %type_def.name, "applied derived type customizations");
    }

    Ok(())
}

struct DerivedLookup<'a> {
    /// Positions and logical names of the types derived from one declared type, in name order.
    derived: Vec<(usize, String)>,
    name_map: &'a NameMap,
}

impl DerivedLookup<'_> {
    /// Positions of the named types; every unknown name is reported at once.
    fn resolve(&self, type_def: &TypeDef, names: &[String]) -> Result<Vec<usize>, SchemaBuildingError> {
        let mut resolved = vec![];
        let mut unknown = vec![];

        for name in names {
            match self.position_of(name) {
                Some(position) => resolved.push(position),
                None => unknown.push(name.clone()),
            }
        }

        if unknown.is_empty() {
            return Ok(resolved);
        }

        Err(SchemaBuildingError::UnknownDerivedTypes {
            source_type: type_def.name.clone(),
            suggestions: self.suggestions_for(&unknown),
            unknown,
        })
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.derived
            .iter()
            .find(|(_, logical)| logical == name || self.name_map.name_for(logical) == name)
            .map(|(position, _)| *position)
    }

    fn suggestions_for(&self, unknown: &[String]) -> Vec<String> {
        let candidates: Vec<&str> = self
            .derived
            .iter()
            .map(|(_, logical)| self.name_map.name_for(logical))
            .collect();

        let mut found: Vec<String> = vec![];
        for name in unknown {
            // A bare suffix (`FilterInput`) is the most common mistake.
            let by_suffix = candidates
                .iter()
                .filter(|candidate| candidate.ends_with(name.as_str()))
                .map(|candidate| candidate.to_string());
            let by_similarity = suggestions(name, candidates.iter().copied());

            for suggestion in by_suffix.chain(by_similarity) {
                if !found.contains(&suggestion) {
                    found.push(suggestion);
                }
            }
        }
        found
    }
}

fn customize_members(
    type_def: &TypeDef,
    target: &mut GraphQLType,
    requested_type_name: &str,
    member_names: &[String],
    customization: &ElementCustomization,
) -> Result<(), SchemaBuildingError> {
    let existing = target.member_names();
    let unknown: Vec<String> = member_names
        .iter()
        .filter(|name| !existing.contains(&name.as_str()))
        .cloned()
        .collect();

    if !unknown.is_empty() {
        let mut found = vec![];
        for name in &unknown {
            for suggestion in suggestions(name, existing.iter().copied()) {
                if !found.contains(&suggestion) {
                    found.push(suggestion);
                }
            }
        }
        return Err(SchemaBuildingError::UnknownDerivedTypeFields {
            source_type: type_def.name.clone(),
            type_name: requested_type_name.to_string(),
            unknown,
            suggestions: found,
        });
    }

    for name in member_names {
        if let Some(field) = target.field_mut(name) {
            customization.apply_to(&mut field.directives, &mut field.documentation);
        } else if let Some(value) = target.enum_values.iter_mut().find(|v| &v.name == name) {
            customization.apply_to(&mut value.directives, &mut value.documentation);
        }
    }
    Ok(())
}

/// Derived types keyed by the declared type they ultimately derive from.
fn derived_types_by_source(types: &[GraphQLType]) -> BTreeMap<String, Vec<(usize, String)>> {
    let by_name: HashMap<&str, &GraphQLType> = types.iter().map(|t| (t.name.as_str(), t)).collect();
    let mut by_source: BTreeMap<String, Vec<(usize, String)>> = BTreeMap::new();

    for (position, graphql_type) in types.iter().enumerate() {
        let Some(mut source) = graphql_type.source_type() else {
            continue;
        };
        // Derived types of derived types: follow the chain to the declared type.
        let mut hops = 0;
        while let Some(parent) = by_name.get(source).and_then(|parent| parent.source_type()) {
            source = parent;
            hops += 1;
            if hops > types.len() {
                break;
            }
        }
        by_source
            .entry(source.to_string())
            .or_default()
            .push((position, graphql_type.name.clone()));
    }

    for derived in by_source.values_mut() {
        derived.sort_by(|(_, a), (_, b)| a.cmp(b));
    }
    by_source
}
