// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Drives a build from a registry of declared types to the emitted artifacts.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use runtime_metadata::RuntimeMetadata;
use schema_model::graphql::GraphQLType;

use crate::{
    built_in_types::built_in_graphql_types,
    config::SchemaConfig,
    declared_types::registry_graphql_types,
    definition::SchemaApi,
    derived::{
        DerivationContext, DerivedTypes, customization::apply_customizations, derive_types,
        query_builder::build_query_type,
    },
    error::SchemaBuildingError,
    extension::{SchemaExtension, extension_failure},
    naming::NameMap,
    registry::TypeRegistry,
    runtime_metadata_builder::{MetadataInputs, build_runtime_metadata},
    sdl::{emit_sdl, parse_raw_sdl},
    type_graph_resolver,
    update_targets::build_update_targets,
};

/// The outputs of a build.
#[derive(Debug, Clone)]
pub struct SchemaArtifacts {
    pub graphql_schema_string: String,
    pub runtime_metadata: RuntimeMetadata,
    /// Non-fatal findings, such as derived types that were skipped.
    pub warnings: Vec<String>,
}

#[instrument(skip_all, fields(declared_types = registry.declared_types().count()))]
pub(crate) fn build_schema(
    mut registry: TypeRegistry,
    config: &SchemaConfig,
    extensions: &[Box<dyn SchemaExtension>],
) -> Result<SchemaArtifacts, SchemaBuildingError> {
    {
        let mut api = SchemaApi::new(&mut registry);
        for extension in extensions {
            extension.before_derive(&mut api)?;
        }
    }

    let raw_sdl = parse_raw_sdl(registry.raw_sdl())?;
    let resolved = type_graph_resolver::resolve(registry)?;

    let ctx = DerivationContext::new(&resolved, config);
    let mut derived = DerivedTypes::default();
    derive_types(&ctx, &mut derived);

    let mut types = registry_graphql_types(&ctx, &mut derived)?;
    let query = build_query_type(&ctx, &mut derived)?;
    derived.ensure_valid()?;

    let (derived_types, derived_names, warnings) = derived.into_parts();
    types.extend(derived_types);
    types.extend(built_in_graphql_types(ctx.naming()));
    types.extend(query);
    types.extend(raw_sdl.types);
    ensure_unique_names(&types)?;

    let name_map = NameMap::build(ctx.naming(), &types, &derived_names)?;
    apply_customizations(resolved.registry(), &mut types, &name_map)?;
    name_map.rename(&mut types);

    for extension in extensions {
        for graphql_type in types.iter_mut() {
            extension.decorate_type(graphql_type);
        }
        extension
            .after_derive(&mut types)
            .map_err(|error| extension_failure(extension.as_ref(), error))?;
    }

    let update_targets = build_update_targets(&resolved)?;
    let runtime_metadata = build_runtime_metadata(
        MetadataInputs {
            resolved: &resolved,
            types: &types,
            name_map: &name_map,
            extensions,
        },
        update_targets,
    );

    let graphql_schema_string = emit_sdl(&types, &raw_sdl.directive_definitions);

    debug!(
        types = types.len(),
        warnings = warnings.len(),
        "built schema artifacts"
    );

    Ok(SchemaArtifacts {
        graphql_schema_string,
        runtime_metadata,
        warnings,
    })
}

// Raw SDL and declared names may collide with each other or with derived names.
fn ensure_unique_names(types: &[GraphQLType]) -> Result<(), SchemaBuildingError> {
    let mut seen = BTreeSet::new();
    for graphql_type in types {
        if !seen.insert(graphql_type.name.as_str()) {
            return Err(SchemaBuildingError::DuplicateType(graphql_type.name.clone()));
        }
    }
    Ok(())
}
