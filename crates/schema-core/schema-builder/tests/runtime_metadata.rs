// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use runtime_metadata::{
    AggregationFunction, Cardinality, Direction, DynamicParam, ElasticGraphCategory,
    INDEX_DATA_UPDATE_SCRIPT_ID, Param, RolloverFrequency, RuntimeMetadata, SortDirection,
    SortField, UpdateTarget,
};
use schema_builder::{IndexedTypeApi, SchemaApi, SchemaBuildingError};

mod support;

use support::build;

fn declare_workspaces(schema: &mut SchemaApi<'_>) -> Result<(), SchemaBuildingError> {
    schema.object_type("WidgetWorkspace", |t| {
        t.field("id", "ID!")?;
        t.field("name", "String")?;
        t.field("widget_ids", "[ID!]!")?;
        t.index("widget_workspaces")?;
        Ok(())
    })?;
    schema.object_type("Widget", |t| {
        t.field("id", "ID!")?;
        t.field("cost", "Int")?;
        t.relates_to_one("workspace", "WidgetWorkspace", "widget_ids", Direction::In)?;
        t.field("workspace_name", "String")?
            .sourced_from("workspace", "name");
        t.index("widgets")?;
        Ok(())
    })
}

fn targets<'a>(metadata: &'a RuntimeMetadata, type_name: &str) -> &'a [UpdateTarget] {
    &metadata
        .object_type(type_name)
        .unwrap_or_else(|| panic!("no metadata for `{type_name}`"))
        .update_targets
}

#[test]
fn sourced_fields_are_updated_from_the_related_type() {
    let metadata = build(declare_workspaces).unwrap().runtime_metadata;

    let widget_targets = targets(&metadata, "Widget");
    assert_eq!(widget_targets.len(), 1);
    let self_target = &widget_targets[0];
    assert_eq!(self_target.relationship.as_deref(), Some("__self"));
    assert_eq!(self_target.script_id, INDEX_DATA_UPDATE_SCRIPT_ID);
    assert_eq!(
        self_target.data_params.keys().collect::<Vec<_>>(),
        vec!["cost", "id"]
    );

    let workspace_target = targets(&metadata, "WidgetWorkspace")
        .iter()
        .find(|target| target.relationship.as_deref() == Some("workspace"))
        .unwrap();
    assert_eq!(workspace_target.type_name, "Widget");
    assert_eq!(workspace_target.id_source, "widget_ids");
    assert_eq!(
        workspace_target.data_params,
        BTreeMap::from([(
            "workspace_name".to_string(),
            DynamicParam {
                source_path: "name".to_string(),
                cardinality: Cardinality::One,
            }
        )])
    );
    assert_eq!(
        workspace_target.metadata_params["sourceType"],
        Param::static_value("WidgetWorkspace")
    );
    assert_eq!(
        workspace_target.metadata_params["sourceId"],
        Param::dynamic("id")
    );

    assert!(
        targets(&metadata, "WidgetWorkspace")
            .iter()
            .any(|target| target.type_name == "WidgetWorkspace"
                && target.relationship.as_deref() == Some("__self"))
    );
}

#[test]
fn relationship_fields_carry_relation_metadata() {
    let metadata = build(declare_workspaces).unwrap().runtime_metadata;

    let workspace = &metadata.object_type("Widget").unwrap().graphql_fields_by_name["workspace"];
    let relation = workspace.relation.as_ref().unwrap();
    assert_eq!(relation.foreign_key, "widget_ids");
    assert_eq!(relation.direction, Direction::In);
    assert!(relation.foreign_key_nested_paths.is_empty());
}

#[test]
fn sourced_fields_are_validated_together() {
    let result = build(|schema| {
        schema.object_type("WidgetWorkspace", |t| {
            t.field("id", "ID!")?;
            t.field("name", "Int")?;
            t.field("widget_ids", "[ID!]!")?;
            t.index("widget_workspaces")?;
            Ok(())
        })?;
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.relates_to_one("workspace", "WidgetWorkspace", "widget_ids", Direction::In)?;
            t.field("workspace_name", "String!")?
                .sourced_from("workspace", "name");
            t.field("workspace_size", "Int")?
                .sourced_from("workspace", "size");
            t.index("widgets")?;
            Ok(())
        })
    });

    let Err(SchemaBuildingError::InvalidRelationships(problems)) = result else {
        panic!("expected relationship problems, got {result:?}");
    };
    assert_eq!(problems.len(), 3, "{problems:#?}");
    assert!(problems[0].contains("`WidgetWorkspace.name` is `Int`"), "{}", problems[0]);
    assert!(problems[1].contains("must be nullable"), "{}", problems[1]);
    assert!(problems[2].contains("The path `WidgetWorkspace.size`"), "{}", problems[2]);
}

#[test]
fn sourcing_relationships_must_be_inbound_and_single() {
    let result = build(|schema| {
        schema.object_type("WidgetWorkspace", |t| {
            t.field("id", "ID!")?;
            t.field("name", "String")?;
            Ok(())
        })?;
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("workspace_id", "ID")?;
            t.relates_to_one("workspace", "WidgetWorkspace", "workspace_id", Direction::Out)?;
            t.field("workspace_name", "String")?
                .sourced_from("workspace", "name");
            t.index("widgets")?;
            Ok(())
        })
    });

    let error = result.unwrap_err().to_string();
    assert!(error.contains("must use `Direction::In`"), "{error}");
}

fn declare_routed_widgets(
    schema: &mut SchemaApi<'_>,
    with_equivalent_field: bool,
) -> Result<(), SchemaBuildingError> {
    schema.object_type("WidgetWorkspace", |t| {
        t.field("id", "ID!")?;
        t.field("name", "String")?;
        t.field("widget_ids", "[ID!]!")?;
        t.field("tenant", "String")?;
        t.index("widget_workspaces")?;
        Ok(())
    })?;
    schema.object_type("Widget", |t| {
        t.field("id", "ID!")?;
        t.field("tenant_id", "String")?;
        let mut workspace =
            t.relates_to_one("workspace", "WidgetWorkspace", "widget_ids", Direction::In)?;
        if with_equivalent_field {
            workspace.equivalent_field_locally_named("tenant", "tenant_id")?;
        }
        t.field("workspace_name", "String")?
            .sourced_from("workspace", "name");
        t.index("widgets")?.route_with("tenant_id");
        Ok(())
    })
}

#[test]
fn custom_routing_needs_an_equivalent_field() {
    let error = build(|schema| declare_routed_widgets(schema, false))
        .unwrap_err()
        .to_string();
    assert!(error.contains("must declare an `equivalent_field`"), "{error}");

    let metadata = build(|schema| declare_routed_widgets(schema, true))
        .unwrap()
        .runtime_metadata;
    let workspace_target = targets(&metadata, "WidgetWorkspace")
        .iter()
        .find(|target| target.type_name == "Widget")
        .unwrap();
    assert_eq!(workspace_target.routing_value_source.as_deref(), Some("tenant"));
}

#[test]
fn index_definitions_use_index_field_names() {
    let metadata = build(|schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("workspace_id", "ID")?;
            t.field("created_at", "DateTime")?;
            t.field("name", "String")?.name_in_index("name_str");
            t.index("widgets")?
                .route_with("workspace_id")
                .rollover(RolloverFrequency::Monthly, "created_at")
                .default_sort("name", SortDirection::Desc);
            Ok(())
        })
    })
    .unwrap()
    .runtime_metadata;

    let index = &metadata.index_definitions_by_name["widgets"];
    assert_eq!(index.route_with.as_deref(), Some("workspace_id"));
    let rollover = index.rollover.as_ref().unwrap();
    assert_eq!(rollover.frequency, RolloverFrequency::Monthly);
    assert_eq!(rollover.timestamp_field_path, "created_at");
    assert_eq!(
        index.default_sort_fields,
        vec![SortField {
            field_path: "name_str".to_string(),
            direction: SortDirection::Desc,
        }]
    );

    let widget = metadata.object_type("Widget").unwrap();
    assert_eq!(widget.index_definition_names, vec!["widgets"]);
    assert_eq!(widget.graphql_fields_by_name["name"].name_in_index, "name_str");
    assert!(!widget.graphql_fields_by_name.contains_key("id"));

    let self_target = &widget.update_targets[0];
    assert_eq!(self_target.routing_value_source.as_deref(), Some("workspace_id"));
    assert_eq!(self_target.rollover_timestamp_value_source.as_deref(), Some("created_at"));
    assert!(self_target.data_params.contains_key("name_str"));

    let sort_values = &metadata.enum_types_by_name["WidgetSortOrderInput"].values_by_name;
    assert_eq!(
        sort_values["name_ASC"].sort_field,
        Some(SortField {
            field_path: "name_str".to_string(),
            direction: SortDirection::Asc,
        })
    );
}

#[test]
fn derived_indexed_types_get_their_own_scripts() {
    let metadata = build(|schema| {
        schema.object_type("WidgetCurrency", |t| {
            t.field("id", "ID!")?;
            t.field("widget_names", "[String!]!")?;
            t.index("widget_currencies")?;
            Ok(())
        })?;
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("name", "String")?;
            t.field("currency_id", "ID")?;
            t.index("widgets")?;
            t.derive_indexed_type_fields("WidgetCurrency", "currency_id", |derived| {
                derived.append_only_set("widget_names", "name");
            })?;
            Ok(())
        })
    })
    .unwrap()
    .runtime_metadata;

    let derived = targets(&metadata, "Widget")
        .iter()
        .find(|target| target.type_name == "WidgetCurrency")
        .unwrap();
    assert!(derived.relationship.is_none());
    assert!(derived.script_id.starts_with("update_WidgetCurrency_from_Widget_"));
    assert_eq!(derived.script_id.len(), "update_WidgetCurrency_from_Widget_".len() + 32);
    assert_eq!(derived.id_source, "currency_id");
    assert_eq!(
        derived.data_params["widget_names"],
        DynamicParam {
            source_path: "name".to_string(),
            cardinality: Cardinality::Many,
        }
    );
    assert_eq!(
        metadata.static_script_ids_by_scoped_name[&format!("update/{}", derived.script_id)],
        derived.script_id
    );
    assert!(metadata.static_script_ids_by_scoped_name.contains_key("update/index_data"));
}

#[test]
fn update_target_paths_use_index_field_names() {
    let metadata = build(|schema| {
        schema.object_type("WidgetWorkspace", |t| {
            t.field("id", "ID!")?;
            t.field("name", "String")?.name_in_index("name_str");
            t.field("widget_ids", "[ID!]!")?.name_in_index("widget_ids_str");
            t.field("widget_names", "[String!]!")?.name_in_index("widget_names_str");
            t.index("widget_workspaces")?;
            Ok(())
        })?;
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("label", "String")?.name_in_index("label_str");
            t.field("workspace_id", "ID")?.name_in_index("workspace_id_str");
            t.relates_to_one("workspace", "WidgetWorkspace", "widget_ids", Direction::In)?;
            t.field("workspace_name", "String")?
                .sourced_from("workspace", "name");
            t.index("widgets")?;
            t.derive_indexed_type_fields("WidgetWorkspace", "workspace_id", |derived| {
                derived.append_only_set("widget_names", "label");
            })?;
            Ok(())
        })
    })
    .unwrap()
    .runtime_metadata;

    let sourced = targets(&metadata, "WidgetWorkspace")
        .iter()
        .find(|target| target.relationship.as_deref() == Some("workspace"))
        .unwrap();
    assert_eq!(sourced.id_source, "widget_ids_str");
    assert_eq!(sourced.data_params["workspace_name"].source_path, "name_str");

    let derived = targets(&metadata, "Widget")
        .iter()
        .find(|target| target.type_name == "WidgetWorkspace")
        .unwrap();
    assert_eq!(derived.id_source, "workspace_id_str");
    assert_eq!(
        derived.data_params["widget_names_str"],
        DynamicParam {
            source_path: "label_str".to_string(),
            cardinality: Cardinality::Many,
        }
    );
}

#[test]
fn derived_indexed_types_must_match_their_destination() {
    let result = build(|schema| {
        schema.object_type("WidgetCurrency", |t| {
            t.field("id", "ID!")?;
            t.index("widget_currencies")?.route_with("id");
            Ok(())
        })?;
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("currency_id", "ID")?;
            t.index("widgets")?;
            t.derive_indexed_type_fields("WidgetCurrency", "currency_id", |derived| {
                derived.min_value("oldest_widget", "created_at");
            })?;
            Ok(())
        })
    });

    let Err(SchemaBuildingError::InvalidRelationships(problems)) = result else {
        panic!("expected relationship problems, got {result:?}");
    };
    assert_eq!(problems.len(), 3, "{problems:#?}");
    assert!(problems[0].contains("must specify `route_with`"));
    assert!(problems[1].contains("`WidgetCurrency.oldest_widget`, which does not exist"));
    assert!(problems[2].contains("The path `Widget.created_at`"));
}

#[test]
fn aggregation_types_are_categorized() {
    let metadata = build(|schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("cost", "Int")?;
            t.index("widgets")?;
            Ok(())
        })
    })
    .unwrap()
    .runtime_metadata;

    let aggregation = metadata.object_type("WidgetAggregation").unwrap();
    assert_eq!(
        aggregation.elasticgraph_category,
        Some(ElasticGraphCategory::IndexedAggregation)
    );
    assert_eq!(aggregation.source_type.as_deref(), Some("Widget"));
    assert_eq!(
        metadata.object_type("WidgetConnection").unwrap().elasticgraph_category,
        Some(ElasticGraphCategory::RelayConnection)
    );

    let int_values = metadata.object_type("IntAggregatedValues").unwrap();
    let sum = int_values.graphql_fields_by_name["approximate_sum"]
        .computation_detail
        .as_ref()
        .unwrap();
    assert_eq!(sum.function, AggregationFunction::Sum);
    assert_eq!(sum.empty_bucket_value, Some(0));
}

#[test]
fn metadata_survives_the_dumpable_hash() {
    let metadata = build(|schema| {
        declare_workspaces(schema)?;
        schema.object_type("Part", |t| {
            t.field("name", "String")?;
            Ok(())
        })?;
        schema.object_type("Gadget", |t| {
            t.field("id", "ID!")?;
            t.field("parts", "[Part!]!")?.mapping_type("nested");
            t.index("gadgets")?;
            Ok(())
        })
    })
    .unwrap()
    .runtime_metadata;

    let hash = metadata.to_dumpable_hash().unwrap();
    let reloaded = RuntimeMetadata::from_hash(&hash).unwrap();

    for (name, object_type) in &metadata.object_types_by_name {
        let reloaded_type = reloaded.object_type(name).unwrap();
        assert_eq!(reloaded_type.graphql_fields_by_name, object_type.graphql_fields_by_name);
        assert_eq!(reloaded_type.update_targets, object_type.update_targets);
        assert_eq!(reloaded_type.elasticgraph_category, object_type.elasticgraph_category);
    }
    assert_eq!(reloaded, metadata);
    let dumped_targets = hash["object_types_by_name"]["WidgetWorkspace"]["update_targets"]
        .as_array()
        .unwrap();
    assert!(dumped_targets.iter().any(|target| target["type"] == "Widget"));
}
