// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Maps logical type names to the names emitted in the schema.
//!
//! Types are derived under logical names: declared names, and derived names computed from the
//! configured formats. Once every type exists, [`NameMap`] resolves the emitted name of each one
//! (applying `type_name_overrides` to the type and to every name it is derived from) and renames
//! the types and all references to them.

use std::collections::{BTreeMap, BTreeSet};

use async_graphql_value::{ConstValue, Name};
use tracing::debug;

use schema_model::{
    graphql::{GraphQLType, GraphQLTypeKind, TypeOrigin},
    naming::{DerivedTypeFamily, apply_format, is_valid_graphql_name},
    types::TypeReference,
};

use crate::{config::NamingConfig, error::SchemaBuildingError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePart {
    /// The (logical) name of another type; replaced by that type's emitted name.
    Type(String),
    Literal(String),
}

/// How a derived type's name is put together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedName {
    pub family: DerivedTypeFamily,
    pub base: Vec<NamePart>,
    pub parent_types: Vec<NamePart>,
}

impl DerivedName {
    /// A derived name whose base is another type's name.
    pub fn of(family: DerivedTypeFamily, source: &str) -> Self {
        DerivedName {
            family,
            base: vec![NamePart::Type(source.to_string())],
            parent_types: vec![],
        }
    }

    pub fn logical(&self, naming: &NamingConfig) -> String {
        self.render(naming, |name| name.to_string())
    }

    fn render(&self, naming: &NamingConfig, type_name: impl Fn(&str) -> String) -> String {
        let join = |parts: &[NamePart]| -> String {
            parts
                .iter()
                .map(|part| match part {
                    NamePart::Type(name) => type_name(name),
                    NamePart::Literal(literal) => literal.clone(),
                })
                .collect()
        };

        apply_format(
            naming.format_for(self.family),
            &join(&self.base),
            &join(&self.parent_types),
        )
    }

    /// Names the family and source for error messages, for example "the `FilterInput` of `Widget`".
    pub fn describe(&self) -> String {
        let join = |parts: &[NamePart]| -> String {
            parts
                .iter()
                .map(|part| match part {
                    NamePart::Type(name) | NamePart::Literal(name) => name.as_str(),
                })
                .collect()
        };

        let mut description = format!("the `{}` of `{}`", self.family, join(&self.base));
        if !self.parent_types.is_empty() {
            description.push_str(&format!(" under `{}`", join(&self.parent_types)));
        }
        description
    }

    /// The type this name is derived from, when the base is a single type name.
    fn source_type(&self) -> Option<&str> {
        match self.base.as_slice() {
            [NamePart::Type(name)] => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct NameMap {
    emitted: BTreeMap<String, String>,
    logical_by_emitted: BTreeMap<String, String>,
    enum_value_overrides: BTreeMap<String, BTreeMap<String, String>>,
    /// `Input` enum (logical name) to the enum it copies.
    input_enum_sources: BTreeMap<String, String>,
}

impl NameMap {
    /// Resolves the emitted name of every type in `types`. `derived_names` describes the types
    /// whose names were derived from other names.
    pub fn build(
        naming: &NamingConfig,
        types: &[GraphQLType],
        derived_names: &BTreeMap<String, DerivedName>,
    ) -> Result<Self, SchemaBuildingError> {
        let mut problems = vec![];

        let logical_names: BTreeSet<&str> = types.iter().map(|t| t.name.as_str()).collect();
        for (logical, emitted) in &naming.type_name_overrides {
            if !logical_names.contains(logical.as_str()) {
                problems.push(format!(
                    "`type_name_overrides` names `{logical}`, which is not a type of this schema.{}",
                    suggestion_suffix(logical, logical_names.iter().copied())
                ));
            }
            if !is_valid_graphql_name(emitted) {
                problems.push(format!(
                    "`type_name_overrides` maps `{logical}` to `{emitted}`, which is not a valid GraphQL name."
                ));
            }
        }

        let mut resolver = EmittedNames {
            naming,
            derived_names,
            resolved: BTreeMap::new(),
            in_progress: BTreeSet::new(),
        };
        let emitted: BTreeMap<String, String> = logical_names
            .iter()
            .map(|logical| (logical.to_string(), resolver.emitted(logical)))
            .collect();

        let mut logical_by_emitted: BTreeMap<String, String> = BTreeMap::new();
        for (logical, name) in &emitted {
            if !is_valid_graphql_name(name) && !naming.type_name_overrides.contains_key(logical) {
                problems.push(format!(
                    "The type `{logical}` would be named `{name}`, which is not a valid GraphQL name."
                ));
            }
            if let Some(other) = logical_by_emitted.insert(name.clone(), logical.clone()) {
                problems.push(format!(
                    "`{other}` and `{logical}` would both be named `{name}`."
                ));
            }
        }

        let input_enum_sources: BTreeMap<String, String> = derived_names
            .iter()
            .filter(|(_, derived)| derived.family == DerivedTypeFamily::InputEnum)
            .filter_map(|(logical, derived)| {
                Some((logical.clone(), derived.source_type()?.to_string()))
            })
            .collect();

        let enum_values: BTreeMap<&str, Vec<&str>> = types
            .iter()
            .filter(|t| t.kind == GraphQLTypeKind::Enum)
            .map(|t| {
                (
                    t.name.as_str(),
                    t.enum_values.iter().map(|v| v.name.as_str()).collect(),
                )
            })
            .collect();
        validate_enum_value_overrides(naming, &enum_values, &mut problems);

        if !problems.is_empty() {
            return Err(SchemaBuildingError::InvalidNameOverrides(problems));
        }

        debug!(
            overridden = naming.type_name_overrides.len(),
            "resolved emitted type names"
        );
        Ok(NameMap {
            emitted,
            logical_by_emitted,
            enum_value_overrides: naming.enum_value_overrides_by_type.clone(),
            input_enum_sources,
        })
    }

    pub fn name_for<'a>(&'a self, logical: &'a str) -> &'a str {
        self.emitted.get(logical).map(String::as_str).unwrap_or(logical)
    }

    pub fn logical_name_of<'a>(&'a self, emitted: &'a str) -> &'a str {
        self.logical_by_emitted
            .get(emitted)
            .map(String::as_str)
            .unwrap_or(emitted)
    }

    /// The emitted name of a value of a (logical) enum type. `Input` enums share the overrides
    /// of the enum they copy unless they have their own.
    pub fn enum_value_name<'a>(&'a self, enum_type: &str, value: &'a str) -> &'a str {
        let lookup = |type_name: &str| {
            self.enum_value_overrides
                .get(type_name)
                .and_then(|overrides| overrides.get(value))
        };

        lookup(enum_type)
            .or_else(|| {
                self.input_enum_sources
                    .get(enum_type)
                    .and_then(|source| lookup(source))
            })
            .map(String::as_str)
            .unwrap_or(value)
    }

    /// Renames the types, their enum values and every reference to a type or enum value.
    pub fn rename(&self, types: &mut [GraphQLType]) {
        for graphql_type in types.iter_mut() {
            let logical = std::mem::take(&mut graphql_type.name);

            for value in &mut graphql_type.enum_values {
                value.name = self.enum_value_name(&logical, &value.name).to_string();
            }

            match &mut graphql_type.kind {
                GraphQLTypeKind::Object { implements } | GraphQLTypeKind::Interface { implements } => {
                    self.rename_all(implements)
                }
                GraphQLTypeKind::Union { members } => self.rename_all(members),
                GraphQLTypeKind::Enum | GraphQLTypeKind::InputObject | GraphQLTypeKind::Scalar => {}
            }

            for field in &mut graphql_type.fields {
                if let Some(default_value) = &mut field.default_value {
                    self.rename_enum_literal(field.typ.type_name(), default_value);
                }
                field.typ = self.rename_reference(&field.typ);

                for argument in &mut field.arguments {
                    if let Some(default_value) = &mut argument.default_value {
                        self.rename_enum_literal(argument.typ.type_name(), default_value);
                    }
                    argument.typ = self.rename_reference(&argument.typ);
                }
            }

            if let TypeOrigin::Derived { source_type, .. } = &mut graphql_type.origin {
                *source_type = self.name_for(source_type).to_string();
            }

            graphql_type.name = self.name_for(&logical).to_string();
        }
    }

    fn rename_all(&self, names: &mut [String]) {
        for name in names {
            *name = self.name_for(name).to_string();
        }
    }

    fn rename_reference(&self, reference: &TypeReference) -> TypeReference {
        reference.with_innermost(self.name_for(reference.type_name()).to_string())
    }

    fn rename_enum_literal(&self, enum_type: &str, value: &mut ConstValue) {
        match value {
            ConstValue::Enum(name) => {
                let renamed = self.enum_value_name(enum_type, name.as_str()).to_string();
                if renamed != name.as_str() {
                    *name = Name::new(renamed);
                }
            }
            ConstValue::List(values) => {
                for value in values {
                    self.rename_enum_literal(enum_type, value);
                }
            }
            _ => {}
        }
    }
}

/// Computes emitted names, following derived names down to the names they are built from.
struct EmittedNames<'a> {
    naming: &'a NamingConfig,
    derived_names: &'a BTreeMap<String, DerivedName>,
    resolved: BTreeMap<String, String>,
    in_progress: BTreeSet<String>,
}

impl EmittedNames<'_> {
    fn emitted(&mut self, logical: &str) -> String {
        if let Some(name) = self.resolved.get(logical) {
            return name.clone();
        }

        let naming = self.naming;
        let derived_names = self.derived_names;
        let name = match (naming.type_name_overrides.get(logical), derived_names.get(logical)) {
            (Some(name), _) => name.clone(),
            // A name derived (indirectly) from itself cannot be resolved further.
            (None, Some(derived)) if !self.in_progress.contains(logical) => {
                self.in_progress.insert(logical.to_string());
                let base_names: BTreeMap<String, String> = derived
                    .base
                    .iter()
                    .chain(&derived.parent_types)
                    .filter_map(|part| match part {
                        NamePart::Type(name) => Some(name),
                        NamePart::Literal(_) => None,
                    })
                    .map(|name| (name.clone(), self.emitted(name)))
                    .collect();
                self.in_progress.remove(logical);

                derived.render(naming, |name| {
                    base_names
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| name.to_string())
                })
            }
            _ => logical.to_string(),
        };

        self.resolved.insert(logical.to_string(), name.clone());
        name
    }
}

fn validate_enum_value_overrides(
    naming: &NamingConfig,
    enum_values: &BTreeMap<&str, Vec<&str>>,
    problems: &mut Vec<String>,
) {
    for (type_name, overrides) in &naming.enum_value_overrides_by_type {
        let Some(values) = enum_values.get(type_name.as_str()) else {
            problems.push(format!(
                "`enum_value_overrides_by_type` names `{type_name}`, which is not an enum type of this schema.{}",
                suggestion_suffix(type_name, enum_values.keys().copied())
            ));
            continue;
        };

        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for (value, emitted) in overrides {
            if !values.contains(&value.as_str()) {
                problems.push(format!(
                    "`enum_value_overrides_by_type` names `{type_name}.{value}`, which does not exist.{}",
                    suggestion_suffix(value, values.iter().copied())
                ));
            }
            if !is_valid_graphql_name(emitted) {
                problems.push(format!(
                    "`enum_value_overrides_by_type` maps `{type_name}.{value}` to `{emitted}`, which is not a valid GraphQL name."
                ));
            }
            seen.insert(value, emitted);
        }

        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        for value in values {
            let emitted = seen.get(value).copied().unwrap_or(value);
            if let Some(other) = owners.insert(emitted, value) {
                problems.push(format!(
                    "`{type_name}.{other}` and `{type_name}.{value}` would both be named `{emitted}`."
                ));
            }
        }
    }
}

/// The closest names to `unknown` among `candidates`, best first.
pub(crate) fn suggestions<'a>(
    unknown: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), candidate))
        .filter(|(score, _)| *score >= 0.8)
        .collect();
    scored.sort_by(|(a, a_name), (b, b_name)| b.total_cmp(a).then_with(|| a_name.cmp(b_name)));

    scored
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

fn suggestion_suffix<'a>(unknown: &str, candidates: impl IntoIterator<Item = &'a str>) -> String {
    let suggestions = suggestions(unknown, candidates);
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" Possible matches: {}.", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use schema_model::{
        graphql::{GraphQLEnumValue, GraphQLField},
        types::TypeReference,
    };

    use super::*;

    fn widget_types() -> (Vec<GraphQLType>, BTreeMap<String, DerivedName>) {
        let naming = NamingConfig::default();
        let filter = DerivedName::of(DerivedTypeFamily::FilterInput, "Widget");
        let connection = DerivedName::of(DerivedTypeFamily::Connection, "Widget");
        let input_enum = DerivedName::of(DerivedTypeFamily::InputEnum, "Color");

        let types = vec![
            GraphQLType::object(
                "Widget",
                vec![GraphQLField::new("color", TypeReference::named("Color"))],
            )
            .with_origin(TypeOrigin::Declared),
            GraphQLType::enum_type(
                "Color",
                vec![GraphQLEnumValue::new("RED"), GraphQLEnumValue::new("BLUE")],
            )
            .with_origin(TypeOrigin::Declared),
            GraphQLType::enum_type(
                "ColorInput",
                vec![GraphQLEnumValue::new("RED"), GraphQLEnumValue::new("BLUE")],
            )
            .derived_from("Color", DerivedTypeFamily::InputEnum),
            GraphQLType::input_object(
                "WidgetFilterInput",
                vec![
                    GraphQLField::new("not", TypeReference::named("WidgetFilterInput")),
                    GraphQLField::new("color", TypeReference::named("ColorInput"))
                        .with_default_value(ConstValue::Enum(Name::new("RED"))),
                ],
            )
            .derived_from("Widget", DerivedTypeFamily::FilterInput),
            GraphQLType::object(
                "WidgetConnection",
                vec![GraphQLField::new(
                    "nodes",
                    TypeReference::non_null_list_of(TypeReference::non_null_named("Widget")),
                )],
            )
            .derived_from("Widget", DerivedTypeFamily::Connection),
        ];

        let derived_names = [filter, connection, input_enum]
            .into_iter()
            .map(|derived| (derived.logical(&naming), derived))
            .collect();
        (types, derived_names)
    }

    fn naming(overrides: &[(&str, &str)]) -> NamingConfig {
        NamingConfig {
            type_name_overrides: overrides
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn overrides_flow_into_derived_names() {
        let (mut types, derived_names) = widget_types();
        let naming = naming(&[("Widget", "Gadget")]);
        let names = NameMap::build(&naming, &types, &derived_names).unwrap();

        assert_eq!(names.name_for("WidgetFilterInput"), "GadgetFilterInput");
        assert_eq!(names.logical_name_of("GadgetConnection"), "WidgetConnection");

        names.rename(&mut types);
        let connection = types.iter().find(|t| t.name == "GadgetConnection").unwrap();
        assert_eq!(connection.fields[0].typ.to_string(), "[Gadget!]!");
        assert_eq!(connection.source_type(), Some("Gadget"));
    }

    #[test]
    fn derived_names_can_be_overridden_directly() {
        let (types, derived_names) = widget_types();
        let naming = naming(&[("Widget", "Gadget"), ("WidgetConnection", "Gadgets")]);
        let names = NameMap::build(&naming, &types, &derived_names).unwrap();

        assert_eq!(names.name_for("WidgetConnection"), "Gadgets");
        assert_eq!(names.name_for("WidgetFilterInput"), "GadgetFilterInput");
    }

    #[test]
    fn input_enums_are_independently_overridable() {
        let (types, derived_names) = widget_types();
        let naming = naming(&[("ColorInput", "ColorChoice")]);
        let names = NameMap::build(&naming, &types, &derived_names).unwrap();

        assert_eq!(names.name_for("Color"), "Color");
        assert_eq!(names.name_for("ColorInput"), "ColorChoice");
    }

    #[test]
    fn enum_value_overrides_apply_to_input_enums_and_defaults() {
        let (mut types, derived_names) = widget_types();
        let mut naming = NamingConfig::default();
        naming.enum_value_overrides_by_type.insert(
            "Color".to_string(),
            BTreeMap::from([("RED".to_string(), "CRIMSON".to_string())]),
        );
        let names = NameMap::build(&naming, &types, &derived_names).unwrap();

        names.rename(&mut types);
        let input = types.iter().find(|t| t.name == "ColorInput").unwrap();
        assert_eq!(input.enum_values[0].name, "CRIMSON");

        let filter = types.iter().find(|t| t.name == "WidgetFilterInput").unwrap();
        assert_eq!(
            filter.field("color").unwrap().default_value,
            Some(ConstValue::Enum(Name::new("CRIMSON")))
        );
    }

    #[test]
    fn collisions_and_unknown_keys_are_reported_together() {
        let (types, derived_names) = widget_types();
        let naming = naming(&[("Widgte", "Gizmo"), ("Color", "WidgetConnection")]);

        let Err(SchemaBuildingError::InvalidNameOverrides(problems)) =
            NameMap::build(&naming, &types, &derived_names)
        else {
            panic!("expected invalid overrides");
        };

        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("`Widgte`"));
        assert!(problems[0].contains("Possible matches: Widget"));
        assert!(problems[1].contains("would both be named `WidgetConnection`"));
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let (types, derived_names) = widget_types();
        let mut naming = NamingConfig::default();
        naming.enum_value_overrides_by_type.insert(
            "Color".to_string(),
            BTreeMap::from([
                ("GREN".to_string(), "VERT".to_string()),
                ("BLUE".to_string(), "RED".to_string()),
            ]),
        );

        let Err(SchemaBuildingError::InvalidNameOverrides(problems)) =
            NameMap::build(&naming, &types, &derived_names)
        else {
            panic!("expected invalid overrides");
        };

        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("`Color.GREN`"));
        assert!(problems[1].contains("would both be named `RED`"));
    }
}
