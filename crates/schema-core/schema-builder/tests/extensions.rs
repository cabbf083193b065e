// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::{Arc, Mutex};

use runtime_metadata::ExtensionModule;
use schema_builder::{
    ExtensionError, IndexedTypeApi, SchemaApi, SchemaBuildingError, SchemaConfig,
    SchemaDefinition, SchemaExtension, TypeApi,
};
use schema_model::{
    directive::Directive,
    graphql::{GraphQLType, GraphQLTypeKind},
};

mod support;

use support::{members, type_names};

/// Tags stored types as entities and adds the types needed to resolve them.
#[derive(Default)]
struct EntityExtension {
    decorated: Arc<Mutex<Vec<String>>>,
}

impl SchemaExtension for EntityExtension {
    fn name(&self) -> &str {
        "entities"
    }

    fn before_derive(&self, schema: &mut SchemaApi<'_>) -> Result<(), SchemaBuildingError> {
        schema.raw_sdl("directive @key(fields: String!) on OBJECT");
        schema.object_type("ServiceDescription", |t| {
            t.field("sdl", "String")?;
            t.graphql_only();
            Ok(())
        })
    }

    fn decorate_type(&self, graphql_type: &mut GraphQLType) {
        let is_entity = matches!(graphql_type.kind, GraphQLTypeKind::Object { .. })
            && !graphql_type.is_built_in()
            && graphql_type.source_type().is_none()
            && graphql_type.field("id").is_some();
        if is_entity {
            graphql_type
                .directives
                .push(Directive::new("key").with_argument("fields", "id"));
            if let Ok(mut decorated) = self.decorated.lock() {
                decorated.push(graphql_type.name.clone());
            }
        }
    }

    fn after_derive(&self, types: &mut Vec<GraphQLType>) -> Result<(), ExtensionError> {
        let mut entities: Vec<String> = types
            .iter()
            .filter(|t| t.directives.iter().any(|d| d.name == "key"))
            .map(|t| t.name.clone())
            .collect();
        entities.sort();
        if entities.is_empty() {
            return Err("no entity types were found".into());
        }
        types.push(GraphQLType::union("Entity", entities));
        Ok(())
    }

    fn resolvers(&self) -> Vec<String> {
        vec!["entities".to_string(), "service".to_string()]
    }
}

fn widget_definition(config: SchemaConfig) -> SchemaDefinition {
    let mut definition = SchemaDefinition::new(config);
    definition
        .define(|schema| {
            schema.object_type("Widget", |t| {
                t.field("id", "ID!")?;
                t.field("cost", "Int")?;
                t.index("widgets")?;
                Ok(())
            })?;
            schema.object_type("Part", |t| {
                t.field("id", "ID!")?;
                t.field("name", "String")?;
                t.index("parts")?;
                Ok(())
            })
        })
        .unwrap();
    definition
}

#[test]
fn hooks_shape_the_final_schema() {
    let extension = EntityExtension::default();
    let decorated = extension.decorated.clone();

    let mut definition = widget_definition(SchemaConfig::default());
    definition.register_extension(extension);
    let artifacts = definition.build().unwrap();
    let sdl = &artifacts.graphql_schema_string;

    assert!(sdl.starts_with("directive @key(fields: String!) on OBJECT\n"), "{sdl}");
    assert_eq!(members(sdl, "ServiceDescription"), vec!["sdl: String"]);
    assert!(!type_names(sdl).contains("ServiceDescriptionFilterInput"));
    assert!(sdl.contains("type Widget @key(fields: \"id\") {"), "{sdl}");
    assert!(sdl.contains("type Part @key(fields: \"id\") {"), "{sdl}");
    assert!(sdl.contains("union Entity = Part | Widget\n"), "{sdl}");

    let mut decorated = decorated.lock().unwrap().clone();
    decorated.sort();
    assert_eq!(decorated, vec!["Part", "Widget"]);

    assert_eq!(
        artifacts.runtime_metadata.graphql_extension_modules,
        vec![ExtensionModule {
            name: "entities".to_string(),
            resolvers: vec!["entities".to_string(), "service".to_string()],
        }]
    );
}

#[test]
fn hooks_see_emitted_names() {
    let mut config = SchemaConfig::default();
    config
        .naming
        .type_name_overrides
        .insert("Widget".to_string(), "Gadget".to_string());

    let extension = EntityExtension::default();
    let decorated = extension.decorated.clone();
    let mut definition = widget_definition(config);
    definition.register_extension(extension);
    let sdl = definition.build().unwrap().graphql_schema_string;

    assert!(sdl.contains("union Entity = Gadget | Part\n"), "{sdl}");
    assert!(decorated.lock().unwrap().contains(&"Gadget".to_string()));
}

#[test]
fn building_leaves_the_definition_untouched() {
    let mut definition = widget_definition(SchemaConfig::default());
    definition.register_extension(EntityExtension::default());

    let first = definition.build().unwrap();
    let second = definition.build().unwrap();
    assert_eq!(first.graphql_schema_string, second.graphql_schema_string);
    assert_eq!(first.runtime_metadata, second.runtime_metadata);
}

struct FailingExtension;

impl SchemaExtension for FailingExtension {
    fn name(&self) -> &str {
        "failing"
    }

    fn after_derive(&self, _types: &mut Vec<GraphQLType>) -> Result<(), ExtensionError> {
        Err("cannot resolve entities".into())
    }
}

#[test]
fn extension_failures_name_the_extension() {
    let mut definition = widget_definition(SchemaConfig::default());
    definition.register_extension(FailingExtension);

    let error = definition.build().unwrap_err();
    assert!(
        matches!(&error, SchemaBuildingError::Extension { extension, message }
            if extension == "failing" && message == "cannot resolve entities"),
        "{error}"
    );
    assert_eq!(error.to_string(), "Extension `failing` failed: cannot resolve entities");
}
