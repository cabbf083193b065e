// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Generators for the types derived from declared types.
//!
//! Every generator works on logical names and is idempotent: asking for a derived type that
//! already exists returns its name. [`DerivedTypes`] records how each name was put together so
//! that [`crate::naming::NameMap`] can apply overrides afterwards.

pub(crate) mod aggregated_values_builder;
pub(crate) mod aggregation_builder;
pub(crate) mod connection_builder;
pub(crate) mod customization;
pub(crate) mod filter_builder;
pub(crate) mod grouped_by_builder;
pub(crate) mod query_builder;
pub(crate) mod sort_order_builder;

use std::collections::BTreeMap;

use tracing::{debug, warn};

use schema_model::{
    field::{DerivedFieldFamily, FieldDef},
    graphql::{GraphQLField, GraphQLType},
    naming::DerivedTypeFamily,
    type_def::{ScalarAggregation, TypeDef, TypeDefKind},
    types::TypeReference,
};

use crate::{
    built_in_types::{DATE, DATE_TIME},
    capabilities::Capabilities,
    config::{NamingConfig, SchemaConfig},
    error::SchemaBuildingError,
    naming::DerivedName,
    type_graph_resolver::ResolvedSchema,
};

pub(crate) struct DerivationContext<'a> {
    pub resolved: &'a ResolvedSchema,
    pub capabilities: Capabilities<'a>,
    pub config: &'a SchemaConfig,
}

impl<'a> DerivationContext<'a> {
    pub fn new(resolved: &'a ResolvedSchema, config: &'a SchemaConfig) -> Self {
        DerivationContext {
            resolved,
            capabilities: Capabilities::new(resolved),
            config,
        }
    }

    pub fn naming(&self) -> &'a NamingConfig {
        &self.config.naming
    }

    /// The logical name of `family`'s type derived from `source`.
    pub fn derived_name(&self, family: DerivedTypeFamily, source: &str) -> String {
        self.naming().derived_name(family, source)
    }
}

/// Derived types under their logical names.
#[derive(Debug, Default)]
pub struct DerivedTypes {
    types: BTreeMap<String, GraphQLType>,
    names: BTreeMap<String, DerivedName>,
    warnings: Vec<String>,
    problems: Vec<String>,
}

impl DerivedTypes {
    pub fn contains(&self, logical_name: &str) -> bool {
        self.types.contains_key(logical_name)
    }

    /// Whether `logical_name` was already derived. A type derived under the same name from
    /// another family or source is recorded as a collision and never handed out in its place.
    pub(crate) fn exists(&mut self, derived: &DerivedName, logical_name: &str) -> bool {
        self.check_collision(derived, logical_name);
        self.contains(logical_name)
    }

    pub(crate) fn insert(&mut self, name: DerivedName, graphql_type: GraphQLType) {
        if self.check_collision(&name, &graphql_type.name) {
            return;
        }
        self.names.insert(graphql_type.name.clone(), name);
        self.types.insert(graphql_type.name.clone(), graphql_type);
    }

    fn check_collision(&mut self, derived: &DerivedName, logical_name: &str) -> bool {
        let Some(existing) = self.names.get(logical_name) else {
            return false;
        };
        if existing == derived {
            return false;
        }

        let problem = format!(
            "`{logical_name}` is derived as both {} and {}. Rename one of the source types or change the name format.",
            existing.describe(),
            derived.describe()
        );
        self.problem(problem);
        true
    }

    /// Records a problem that fails the build once derivation is done.
    pub(crate) fn problem(&mut self, problem: String) {
        if !self.problems.contains(&problem) {
            self.problems.push(problem);
        }
    }

    pub(crate) fn ensure_valid(&self) -> Result<(), SchemaBuildingError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(SchemaBuildingError::InvalidDerivedTypes(self.problems.clone()))
        }
    }

    pub(crate) fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }

    pub fn names(&self) -> &BTreeMap<String, DerivedName> {
        &self.names
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn get(&self, logical_name: &str) -> Option<&GraphQLType> {
        self.types.get(logical_name)
    }

    pub fn into_parts(self) -> (Vec<GraphQLType>, BTreeMap<String, DerivedName>, Vec<String>) {
        (self.types.into_values().collect(), self.names, self.warnings)
    }
}

/// Derives every type that exists regardless of how declared types reference each other, along
/// with everything those types reference.
pub(crate) fn derive_types(ctx: &DerivationContext<'_>, out: &mut DerivedTypes) {
    for type_def in ctx.resolved.registry().iter() {
        if type_def.graphql_only {
            continue;
        }

        match &type_def.kind {
            TypeDefKind::Enum(_) => filter_builder::derive_leaf_filters(ctx, out, type_def),
            TypeDefKind::Scalar(scalar) if scalar.indexable => {
                filter_builder::derive_leaf_filters(ctx, out, type_def);
                if scalar.aggregation != ScalarAggregation::NonNumeric {
                    aggregated_values_builder::derive_scalar_aggregated_values(ctx, out, type_def);
                }
                if !ctx.config.derivation.legacy_grouping_schema
                    && [DATE, DATE_TIME].contains(&type_def.name.as_str())
                {
                    grouped_by_builder::derive_date_grouped_by(ctx, out, &type_def.name);
                }
            }
            TypeDefKind::Scalar(_) => {}
            TypeDefKind::Object(_) | TypeDefKind::Interface(_) | TypeDefKind::Union(_) => {
                filter_builder::ensure_filter(ctx, out, &type_def.name);
                if ctx.resolved.is_indexed(&type_def.name) {
                    derive_indexed_type(ctx, out, type_def);
                }
            }
        }
    }

    debug!(count = out.types.len(), "derived types");
}

fn derive_indexed_type(ctx: &DerivationContext<'_>, out: &mut DerivedTypes, type_def: &TypeDef) {
    sort_order_builder::ensure_sort_order(ctx, out, &type_def.name);
    connection_builder::ensure_connection(ctx, out, &type_def.name);
    aggregation_builder::derive_indexed_aggregation(ctx, out, &type_def.name);
}

/// A field of a derived type standing for `source`: it reads the same index field, carries the
/// source's documentation (or `default_documentation`) and the source's customizations for
/// `family`.
pub(crate) fn derived_field(
    name: &str,
    typ: TypeReference,
    source: &FieldDef,
    family: DerivedFieldFamily,
    default_documentation: String,
) -> GraphQLField {
    let mut field = GraphQLField::new(name, typ)
        .with_name_in_index(source.name_in_index.clone())
        .with_documentation(
            source
                .documentation
                .clone()
                .unwrap_or(default_documentation),
        );

    if let Some(customization) = source.customization(family) {
        customization.apply_to(&mut field.directives, &mut field.documentation);
    }
    field
}
