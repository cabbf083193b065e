// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use runtime_metadata::Direction;
use schema_builder::{
    IndexedTypeApi, SchemaBuildingError, SchemaConfig, SchemaDefinition, TypeApi, is_build_active,
};
use schema_model::{directive::Directive, naming::DerivedTypeFamily};

mod support;

use support::{build, build_with_config, members, names_containing, type_names};

const TAG_DIRECTIVE: &str =
    "directive @tag(name: String!) repeatable on OBJECT | INPUT_OBJECT | ENUM_VALUE | INPUT_FIELD_DEFINITION";

fn tag(name: &str) -> Directive {
    Directive::new("tag").with_argument("name", name)
}

fn config_with_overrides(overrides: &[(&str, &str)]) -> SchemaConfig {
    let mut config = SchemaConfig::default();
    config.naming.type_name_overrides = overrides
        .iter()
        .map(|(logical, emitted)| (logical.to_string(), emitted.to_string()))
        .collect();
    config
}

#[test]
fn customizations_apply_to_derived_types_and_fields() {
    let sdl = build(|schema| {
        schema.raw_sdl(TAG_DIRECTIVE);
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("cost", "Int")?;
            t.index("widgets")?;
            t.customize_derived_types(&["WidgetFilterInput", "WidgetConnection"], |c| {
                c.directive(tag("public"));
            });
            t.customize_derived_type_fields("WidgetSortOrderInput", &["cost_DESC"], |c| {
                c.documentation("Most expensive first.");
            });
            Ok(())
        })
    })
    .unwrap()
    .graphql_schema_string;

    assert!(sdl.starts_with(TAG_DIRECTIVE), "{sdl}");
    assert!(sdl.contains("input WidgetFilterInput @tag(name: \"public\") {"), "{sdl}");
    assert!(sdl.contains("type WidgetConnection @tag(name: \"public\") {"), "{sdl}");
    assert!(sdl.contains("type WidgetEdge {"), "{sdl}");
    assert!(
        sdl.contains("  \"\"\"\n  Most expensive first.\n  \"\"\"\n  cost_DESC\n"),
        "{sdl}"
    );
}

#[test]
fn customize_all_reaches_nested_derived_types() {
    let sdl = build(|schema| {
        schema.raw_sdl(TAG_DIRECTIVE);
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("cost", "Int")?;
            t.index("widgets")?;
            t.customize_all_derived_types(|c| {
                c.directive(tag("widget"));
            });
            Ok(())
        })
    })
    .unwrap()
    .graphql_schema_string;

    for name in ["WidgetAggregation", "WidgetAggregationConnection", "WidgetAggregationEdge"] {
        assert!(
            sdl.contains(&format!("type {name} @tag(name: \"widget\") {{")),
            "`{name}` was not customized:\n{sdl}"
        );
    }
    assert!(sdl.contains("type Widget {"), "{sdl}");
    assert!(sdl.contains("input IntFilterInput {"), "{sdl}");
}

#[test]
fn unknown_derived_types_are_reported_with_suggestions() {
    let result = build(|schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("cost", "Int")?;
            t.index("widgets")?;
            t.customize_derived_types(&["FilterInput", "WidgetConection", "WidgetSortOrderInput"], |c| {
                c.documentation("Customized.");
            });
            Ok(())
        })
    });

    let Err(SchemaBuildingError::UnknownDerivedTypes {
        source_type,
        unknown,
        suggestions,
    }) = result
    else {
        panic!("expected unknown derived types, got {result:?}");
    };
    assert_eq!(source_type, "Widget");
    assert_eq!(unknown, vec!["FilterInput", "WidgetConection"]);
    assert!(suggestions.contains(&"WidgetFilterInput".to_string()), "{suggestions:?}");
    assert!(suggestions.contains(&"WidgetConnection".to_string()), "{suggestions:?}");
}

#[test]
fn only_types_derived_from_the_declaration_can_be_customized() {
    let result = build(|schema| {
        schema.object_type("Dimensions", |t| {
            t.field("height", "Float")?;
            t.customize_derived_types(&["DimensionsConnection"], |c| {
                c.documentation("Customized.");
            });
            Ok(())
        })?;
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("dimensions", "Dimensions")?;
            t.index("widgets")?;
            Ok(())
        })
    });

    let error = result.unwrap_err();
    assert!(
        matches!(&error, SchemaBuildingError::UnknownDerivedTypes { source_type, unknown, .. }
            if source_type == "Dimensions" && unknown == &["DimensionsConnection"]),
        "{error}"
    );
}

#[test]
fn unknown_derived_type_fields_are_reported_with_suggestions() {
    let result = build(|schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("cost", "Int")?;
            t.index("widgets")?;
            t.customize_derived_type_fields("WidgetFilterInput", &["cots", "id"], |c| {
                c.documentation("Customized.");
            });
            Ok(())
        })
    });

    let Err(SchemaBuildingError::UnknownDerivedTypeFields {
        type_name,
        unknown,
        suggestions,
        ..
    }) = result
    else {
        panic!("expected unknown derived type fields, got {result:?}");
    };
    assert_eq!(type_name, "WidgetFilterInput");
    assert_eq!(unknown, vec!["cots"]);
    assert_eq!(suggestions, vec!["cost"]);
}

#[test]
fn type_name_overrides_flow_into_derived_names() {
    let artifacts = build_with_config(config_with_overrides(&[("Widget", "Gadget")]), |schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("cost", "Int")?;
            t.index("widgets")?;
            Ok(())
        })
    })
    .unwrap();
    let sdl = &artifacts.graphql_schema_string;

    assert!(names_containing(sdl, "Widget").is_empty(), "{sdl}");
    let gadget_types = names_containing(sdl, "Gadget");
    for name in [
        "Gadget",
        "GadgetAggregation",
        "GadgetConnection",
        "GadgetEdge",
        "GadgetFilterInput",
        "GadgetSortOrderInput",
    ] {
        assert!(gadget_types.contains(name), "missing `{name}` in {gadget_types:?}");
    }
    assert!(members(sdl, "GadgetConnection").contains(&"edges: [GadgetEdge!]!".to_string()));

    let metadata = &artifacts.runtime_metadata;
    let gadget = metadata.object_type("Gadget").unwrap();
    assert_eq!(gadget.update_targets[0].type_name, "Gadget");
    assert!(metadata.enum_types_by_name.contains_key("GadgetSortOrderInput"));
}

#[test]
fn customizations_may_use_emitted_names() {
    let sdl = build_with_config(config_with_overrides(&[("Widget", "Gadget")]), |schema| {
        schema.raw_sdl(TAG_DIRECTIVE);
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.index("widgets")?;
            t.customize_derived_types(&["GadgetFilterInput", "WidgetConnection"], |c| {
                c.directive(tag("renamed"));
            });
            Ok(())
        })
    })
    .unwrap()
    .graphql_schema_string;

    assert!(sdl.contains("input GadgetFilterInput @tag(name: \"renamed\") {"), "{sdl}");
    assert!(sdl.contains("type GadgetConnection @tag(name: \"renamed\") {"), "{sdl}");
}

#[test]
fn enum_value_overrides_apply_to_input_enums() {
    let mut config = SchemaConfig::default();
    config.naming.enum_value_overrides_by_type.insert(
        "Color".to_string(),
        BTreeMap::from([("RED".to_string(), "CRIMSON".to_string())]),
    );

    let sdl = build_with_config(config, |schema| {
        schema.enum_type("Color", |t| {
            t.values(&["RED", "BLUE"])?;
            Ok(())
        })?;
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("color", "Color")?;
            t.index("widgets")?;
            Ok(())
        })
    })
    .unwrap()
    .graphql_schema_string;

    assert_eq!(members(&sdl, "Color"), vec!["CRIMSON", "BLUE"]);
    assert_eq!(members(&sdl, "ColorInput"), vec!["CRIMSON", "BLUE"]);
    assert!(members(&sdl, "ColorFilterInput").contains(&"equal_to_any_of: [ColorInput]".to_string()));
}

#[test]
fn invalid_overrides_are_reported_together() {
    let result = build_with_config(
        config_with_overrides(&[("Widgte", "Gizmo"), ("Part", "WidgetConnection")]),
        |schema| {
            schema.object_type("Part", |t| {
                t.field("name", "String")?;
                Ok(())
            })?;
            schema.object_type("Widget", |t| {
                t.field("id", "ID!")?;
                t.field("part", "Part")?;
                t.index("widgets")?;
                Ok(())
            })
        },
    );

    let Err(SchemaBuildingError::InvalidNameOverrides(problems)) = result else {
        panic!("expected invalid overrides, got {result:?}");
    };
    assert_eq!(problems.len(), 2, "{problems:#?}");
    assert!(problems[0].contains("Possible matches: Widget"), "{}", problems[0]);
    assert!(problems[1].contains("would both be named `WidgetConnection`"), "{}", problems[1]);
}

#[test]
fn derived_type_name_formats_are_configurable() {
    let mut config = SchemaConfig::default();
    config
        .naming
        .derived_type_name_formats
        .insert(DerivedTypeFamily::FilterInput, "{base}Filter".to_string());

    let sdl = build_with_config(config, |schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("cost", "Int")?;
            t.index("widgets")?;
            Ok(())
        })
    })
    .unwrap()
    .graphql_schema_string;

    let names = type_names(&sdl);
    assert!(names.contains("WidgetFilter"));
    assert!(names.contains("IntFilter"));
    assert!(!names.contains("WidgetFilterInput"));
    assert!(members(&sdl, "WidgetFilter").contains(&"cost: IntFilter".to_string()));
}

#[test]
fn raw_sdl_is_merged_into_the_schema() {
    let sdl = build(|schema| {
        schema.raw_sdl("type Banner {\n  text: String\n}");
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.index("widgets")?;
            Ok(())
        })
    })
    .unwrap()
    .graphql_schema_string;

    assert_eq!(members(&sdl, "Banner"), vec!["text: String"]);
    assert!(!type_names(&sdl).contains("BannerFilterInput"));
}

#[test]
fn raw_sdl_cannot_redefine_types() {
    let result = build(|schema| {
        schema.raw_sdl("type WidgetConnection {\n  count: Int\n}");
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.index("widgets")?;
            Ok(())
        })
    });
    assert!(matches!(result, Err(SchemaBuildingError::DuplicateType(name)) if name == "WidgetConnection"));

    let extension = build(|schema| {
        schema.raw_sdl("extend type Query {\n  banner: String\n}");
        Ok(())
    });
    assert!(matches!(extension, Err(SchemaBuildingError::RawSdl(_))));

    let unparseable = build(|schema| {
        schema.raw_sdl("type {");
        Ok(())
    });
    assert!(matches!(unparseable, Err(SchemaBuildingError::RawSdl(_))));
}

#[test]
fn builds_cannot_be_nested() {
    let mut definition = SchemaDefinition::new(SchemaConfig::default());
    definition
        .define(|schema| {
            assert!(is_build_active());

            let mut nested = SchemaDefinition::new(SchemaConfig::default());
            assert!(matches!(nested.define(|_| Ok(())), Err(SchemaBuildingError::NestedBuild)));
            assert!(matches!(nested.build(), Err(SchemaBuildingError::NestedBuild)));
            assert!(is_build_active());

            schema.object_type("Widget", |t| {
                t.field("id", "ID!")?;
                t.index("widgets")?;
                Ok(())
            })
        })
        .unwrap();

    assert!(!is_build_active());
    assert!(definition.build().is_ok());
}

#[test]
fn failed_blocks_release_the_build() {
    let mut definition = SchemaDefinition::new(SchemaConfig::default());
    let result = definition.define(|schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "[ID!")?;
            Ok(())
        })
    });

    assert!(matches!(result, Err(SchemaBuildingError::InvalidTypeReference(_))));
    assert!(!is_build_active());
    definition
        .define(|schema| {
            schema.object_type("Widget", |t| {
                t.field("id", "ID!")?;
                Ok(())
            })
        })
        .unwrap();
}

#[test]
fn embedded_cycles_are_rejected() {
    let error = build(|schema| {
        schema.object_type("Type1", |t| {
            t.field("t2", "Type2")?;
            Ok(())
        })?;
        schema.object_type("Type2", |t| {
            t.field("t3", "Type3")?;
            Ok(())
        })?;
        schema.object_type("Type3", |t| {
            t.field("t1", "Type1")?;
            Ok(())
        })
    })
    .unwrap_err();

    assert!(error.to_string().contains("Type1, Type2, Type3"), "{error}");
}

#[test]
fn singular_names_must_be_valid_graphql_names() {
    let result = build(|schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("tags", "[String!]!")?.singular("a tag!");
            t.index("widgets")?;
            Ok(())
        })
    });

    assert!(matches!(
        result,
        Err(SchemaBuildingError::InvalidName { ref name, .. }) if name == "a tag!"
    ));
}

#[test]
fn singular_names_cannot_shadow_other_fields() {
    let result = build(|schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("tag", "String")?;
            t.field("tags", "[String!]!")?.singular("tag");
            t.index("widgets")?;
            Ok(())
        })
    });

    let error = result.unwrap_err().to_string();
    assert!(
        error.contains("the singular form of `Widget.tags`: `Widget.tag` already uses that name"),
        "{error}"
    );
}

#[test]
fn grouping_fields_of_abstract_types_cannot_collide() {
    let result = build(|schema| {
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("tag", "String")?;
            Ok(())
        })?;
        schema.object_type("Gadget", |t| {
            t.field("id", "ID!")?;
            t.field("tags", "[String!]!")?.singular("tag");
            Ok(())
        })?;
        schema.union_type("Thing", |t| {
            t.subtypes(&["Widget", "Gadget"])?;
            t.index("things")?;
            Ok(())
        })
    });

    let Err(SchemaBuildingError::InvalidDerivedTypes(problems)) = result else {
        panic!("expected derived type problems, got {result:?}");
    };
    assert!(
        problems
            .iter()
            .any(|problem| problem.contains("`ThingGroupedBy` would have two fields named `tag`")),
        "{problems:#?}"
    );
}

#[test]
fn derived_types_with_the_same_name_are_rejected() {
    let result = build(|schema| {
        schema.object_type("Part", |t| {
            t.field("name", "String")?;
            Ok(())
        })?;
        schema.object_type("PartList", |t| {
            t.field("size", "Int")?;
            Ok(())
        })?;
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("parts", "[Part!]!")?.mapping_type("nested");
            t.field("part_list", "PartList")?;
            t.index("widgets")?;
            Ok(())
        })
    });

    let Err(SchemaBuildingError::InvalidDerivedTypes(problems)) = result else {
        panic!("expected derived type problems, got {result:?}");
    };
    let collision = problems
        .iter()
        .find(|problem| problem.starts_with("`PartListFilterInput` is derived as both"))
        .unwrap_or_else(|| panic!("{problems:#?}"));
    assert!(collision.contains("the `FilterInput` of `PartList`"), "{collision}");
    assert!(collision.contains("the `ListFilterInput` of `Part`"), "{collision}");
}

#[test]
fn relationship_foreign_keys_must_exist() {
    let result = build(|schema| {
        schema.object_type("Component", |t| {
            t.field("id", "ID!")?;
            t.field("widget_id", "ID")?;
            t.index("components")?;
            Ok(())
        })?;
        schema.object_type("Person", |t| {
            t.field("id", "ID!")?;
            t.index("people")?;
            Ok(())
        })?;
        schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("maker_name", "String")?;
            t.relates_to_many("components", "Component", "wigdet_idd", Direction::In, "component")?;
            t.relates_to_one("owner", "Person", "no_such_field", Direction::Out)?;
            t.relates_to_one("maker", "Person", "maker_name", Direction::Out)?;
            t.index("widgets")?;
            Ok(())
        })
    });

    let Err(SchemaBuildingError::InvalidRelationships(problems)) = result else {
        panic!("expected relationship problems, got {result:?}");
    };
    assert_eq!(problems.len(), 3, "{problems:#?}");
    assert!(problems[0].contains(
        "The path `Component.wigdet_idd` used by the foreign key of `Widget.components` cannot be resolved"
    ));
    assert!(problems[1].contains(
        "The path `Widget.no_such_field` used by the foreign key of `Widget.owner` cannot be resolved"
    ));
    assert!(problems[2].contains(
        "The foreign key `Widget.maker_name` of `Widget.maker` must be an indexed `ID` field, but it is `String`"
    ));
}

#[test]
fn sourced_fields_require_an_indexed_type() {
    let result = build(|schema| {
        schema.object_type("Widget", |t| {
            t.field("x", "String!")?.sourced_from("nope", "missing.path");
            Ok(())
        })
    });

    let Err(SchemaBuildingError::InvalidRelationships(problems)) = result else {
        panic!("expected relationship problems, got {result:?}");
    };
    assert_eq!(problems.len(), 2, "{problems:#?}");
    assert!(problems[0].contains("`Widget.x` is `sourced_from` another type, but `Widget` is not an indexed type"));
    assert!(problems[1].contains("the `nope` relationship, which does not exist"));
}
