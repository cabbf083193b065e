// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Projects the final types onto the runtime metadata consumed by the query engine and the
//! indexer.

use std::collections::BTreeMap;

use tracing::debug;

use runtime_metadata::{
    ElasticGraphCategory, EnumTypeMetadata, EnumValueMetadata, ExtensionModule,
    GraphQLFieldMetadata, INDEX_DATA_UPDATE_SCRIPT_ID, INDEX_DATA_UPDATE_SCRIPT_SCOPED_NAME,
    IndexDefinitionMetadata, ObjectTypeMetadata, RolloverMetadata, RuntimeMetadata, SortField,
};
use schema_model::{
    graphql::{GraphQLField, GraphQLType, GraphQLTypeKind},
    index::IndexDefinition,
};

use crate::{
    extension::SchemaExtension, naming::NameMap, type_graph_resolver::ResolvedSchema,
    update_targets::UpdateTargetsByType,
};

pub(crate) struct MetadataInputs<'a> {
    pub resolved: &'a ResolvedSchema,
    /// Final types, under their emitted names.
    pub types: &'a [GraphQLType],
    pub name_map: &'a NameMap,
    pub extensions: &'a [Box<dyn SchemaExtension>],
}

pub(crate) fn build_runtime_metadata(
    inputs: MetadataInputs<'_>,
    mut update_targets: UpdateTargetsByType,
) -> RuntimeMetadata {
    let MetadataInputs {
        resolved,
        types,
        name_map,
        extensions,
    } = inputs;

    let mut static_script_ids_by_scoped_name = BTreeMap::from([(
        INDEX_DATA_UPDATE_SCRIPT_SCOPED_NAME.to_string(),
        INDEX_DATA_UPDATE_SCRIPT_ID.to_string(),
    )]);

    let mut object_types_by_name = BTreeMap::new();
    let mut enum_types_by_name = BTreeMap::new();

    for graphql_type in types {
        if graphql_type.kind == GraphQLTypeKind::Enum {
            if let Some(metadata) = enum_metadata(graphql_type) {
                enum_types_by_name.insert(graphql_type.name.clone(), metadata);
            }
            continue;
        }
        if graphql_type.kind == GraphQLTypeKind::Scalar {
            continue;
        }

        let logical = name_map.logical_name_of(&graphql_type.name);
        let mut targets = update_targets.remove(logical).unwrap_or_default();
        for target in &mut targets {
            if target.script_id != INDEX_DATA_UPDATE_SCRIPT_ID {
                static_script_ids_by_scoped_name
                    .insert(format!("update/{}", target.script_id), target.script_id.clone());
            }
            target.type_name = name_map.name_for(&target.type_name).to_string();
        }

        let declared = resolved
            .type_def(logical)
            .filter(|type_def| !type_def.built_in && type_def.is_composite());

        let metadata = ObjectTypeMetadata {
            update_targets: targets,
            index_definition_names: declared
                .map(|type_def| resolved.index_names(&type_def.name))
                .unwrap_or_default(),
            graphql_fields_by_name: graphql_type
                .fields
                .iter()
                .filter_map(field_metadata)
                .collect(),
            elasticgraph_category: graphql_type.category,
            source_type: match graphql_type.category {
                Some(
                    ElasticGraphCategory::IndexedAggregation
                    | ElasticGraphCategory::NestedSubAggregation,
                ) => graphql_type.source_type().map(str::to_string),
                _ => None,
            },
            graphql_only_return_type: graphql_type.graphql_only_return_type,
        };

        if !metadata.is_empty() {
            object_types_by_name.insert(graphql_type.name.clone(), metadata);
        }
    }

    let index_definitions_by_name: BTreeMap<_, _> = resolved
        .registry()
        .declared_types()
        .filter_map(|type_def| {
            let index = type_def.index.as_ref()?;
            Some((
                index.name.clone(),
                index_definition_metadata(resolved, &type_def.name, index),
            ))
        })
        .collect();

    let graphql_extension_modules = extensions
        .iter()
        .map(|extension| ExtensionModule {
            name: extension.name().to_string(),
            resolvers: extension.resolvers(),
        })
        .collect();

    debug!(
        object_types = object_types_by_name.len(),
        enum_types = enum_types_by_name.len(),
        indices = index_definitions_by_name.len(),
        "built runtime metadata"
    );

    RuntimeMetadata {
        object_types_by_name,
        enum_types_by_name,
        index_definitions_by_name,
        static_script_ids_by_scoped_name,
        graphql_extension_modules,
    }
}

/// Fields whose resolution needs more than reading the index field of the same name.
fn field_metadata(field: &GraphQLField) -> Option<(String, GraphQLFieldMetadata)> {
    let name_in_index = field.name_in_index.as_deref().unwrap_or(&field.name);
    if name_in_index == field.name && field.relation.is_none() && field.computation.is_none() {
        return None;
    }

    Some((
        field.name.clone(),
        GraphQLFieldMetadata {
            name_in_index: name_in_index.to_string(),
            relation: field.relation.clone(),
            computation_detail: field.computation.clone(),
        },
    ))
}

fn enum_metadata(graphql_type: &GraphQLType) -> Option<EnumTypeMetadata> {
    let values_by_name: BTreeMap<_, _> = graphql_type
        .enum_values
        .iter()
        .filter_map(|value| {
            let sort_field = value.sort_field.clone()?;
            Some((
                value.name.clone(),
                EnumValueMetadata {
                    sort_field: Some(sort_field),
                },
            ))
        })
        .collect();

    (!values_by_name.is_empty()).then_some(EnumTypeMetadata { values_by_name })
}

fn index_definition_metadata(
    resolved: &ResolvedSchema,
    type_name: &str,
    index: &IndexDefinition,
) -> IndexDefinitionMetadata {
    let index_path = |path: &str| {
        resolved
            .index_path(type_name, path)
            .unwrap_or_else(|_| path.to_string())
    };

    IndexDefinitionMetadata {
        route_with: index.route_with.as_deref().map(index_path),
        rollover: index.rollover.as_ref().map(|rollover| RolloverMetadata {
            frequency: rollover.frequency,
            timestamp_field_path: index_path(&rollover.timestamp_field_path),
        }),
        default_sort_fields: index
            .default_sort
            .iter()
            .map(|(path, direction)| SortField {
                field_path: index_path(path),
                direction: *direction,
            })
            .collect(),
    }
}
