// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Converts definitions parsed from raw SDL into the types the schema is built from.

use async_graphql_parser::{
    Positioned,
    types::{
        self as ast, ConstDirective, DirectiveDefinition, DirectiveLocation, InputValueDefinition,
        TypeKind,
    },
};

use schema_model::{
    directive::Directive,
    graphql::{GraphQLArgument, GraphQLEnumValue, GraphQLField, GraphQLType, GraphQLTypeKind, TypeOrigin},
    types::TypeReference,
};

use crate::error::SchemaBuildingError;

/// Types and directive definitions declared through `raw_sdl`.
#[derive(Debug, Default)]
pub struct RawSdlDefinitions {
    pub types: Vec<GraphQLType>,
    /// Rendered `directive @...` definitions.
    pub directive_definitions: Vec<(String, String)>,
}

pub(crate) fn parse_raw_sdl(sdls: &[String]) -> Result<RawSdlDefinitions, SchemaBuildingError> {
    let mut definitions = RawSdlDefinitions::default();

    for sdl in sdls {
        let document = async_graphql_parser::parse_schema(sdl)
            .map_err(|error| SchemaBuildingError::RawSdl(error.to_string()))?;

        for definition in document.definitions {
            match definition {
                ast::TypeSystemDefinition::Type(type_definition) => {
                    if type_definition.node.extend {
                        return Err(SchemaBuildingError::RawSdl(format!(
                            "type extensions are not supported (found `extend` of `{}`)",
                            type_definition.node.name.node
                        )));
                    }
                    definitions.types.push(graphql_type(type_definition.node)?);
                }
                ast::TypeSystemDefinition::Directive(directive) => {
                    let rendered = render_directive_definition(&directive.node)?;
                    definitions
                        .directive_definitions
                        .push((directive.node.name.node.to_string(), rendered));
                }
                ast::TypeSystemDefinition::Schema(_) => {
                    return Err(SchemaBuildingError::RawSdl(
                        "schema definitions are not supported".to_string(),
                    ));
                }
            }
        }
    }

    Ok(definitions)
}

fn graphql_type(definition: ast::TypeDefinition) -> Result<GraphQLType, SchemaBuildingError> {
    let name = definition.name.node.to_string();

    let mut graphql_type = match definition.kind {
        TypeKind::Scalar => GraphQLType::scalar(name),
        TypeKind::Object(object) => {
            let mut graphql_type = GraphQLType::object(name, fields(object.fields)?);
            graphql_type.kind = GraphQLTypeKind::Object {
                implements: names(&object.implements),
            };
            graphql_type
        }
        TypeKind::Interface(interface) => {
            let mut graphql_type = GraphQLType::interface(name, fields(interface.fields)?);
            graphql_type.kind = GraphQLTypeKind::Interface {
                implements: names(&interface.implements),
            };
            graphql_type
        }
        TypeKind::Union(union) => GraphQLType::union(name, names(&union.members)),
        TypeKind::Enum(enum_type) => GraphQLType::enum_type(
            name,
            enum_type
                .values
                .into_iter()
                .map(|value| {
                    let value = value.node;
                    GraphQLEnumValue {
                        name: value.value.node.to_string(),
                        documentation: value.description.map(|d| d.node),
                        directives: directives(&value.directives),
                        sort_field: None,
                    }
                })
                .collect(),
        ),
        TypeKind::InputObject(input) => GraphQLType::input_object(
            name,
            input
                .fields
                .into_iter()
                .map(|field| input_field(field.node))
                .collect::<Result<_, _>>()?,
        ),
    };

    graphql_type.documentation = definition.description.map(|d| d.node);
    graphql_type.directives = directives(&definition.directives);
    graphql_type.origin = TypeOrigin::Declared;
    Ok(graphql_type)
}

fn fields(
    fields: Vec<Positioned<ast::FieldDefinition>>,
) -> Result<Vec<GraphQLField>, SchemaBuildingError> {
    fields
        .into_iter()
        .map(|field| {
            let field = field.node;
            let mut graphql_field =
                GraphQLField::new(field.name.node.to_string(), type_reference(&field.ty.node)?)
                    .with_arguments(
                        field
                            .arguments
                            .into_iter()
                            .map(|argument| argument_definition(argument.node))
                            .collect::<Result<_, _>>()?,
                    )
                    .with_documentation_opt(field.description.map(|d| d.node));
            graphql_field.directives = directives(&field.directives);
            Ok(graphql_field)
        })
        .collect()
}

fn input_field(definition: InputValueDefinition) -> Result<GraphQLField, SchemaBuildingError> {
    let mut field = GraphQLField::new(definition.name.node.to_string(), type_reference(&definition.ty.node)?)
        .with_documentation_opt(definition.description.map(|d| d.node));
    field.default_value = definition.default_value.map(|value| value.node);
    field.directives = directives(&definition.directives);
    Ok(field)
}

fn argument_definition(definition: InputValueDefinition) -> Result<GraphQLArgument, SchemaBuildingError> {
    Ok(GraphQLArgument {
        typ: type_reference(&definition.ty.node)?,
        name: definition.name.node.to_string(),
        default_value: definition.default_value.map(|value| value.node),
        documentation: definition.description.map(|d| d.node),
    })
}

fn type_reference(ty: &ast::Type) -> Result<TypeReference, SchemaBuildingError> {
    Ok(TypeReference::parse(&ty.to_string())?)
}

fn names(names: &[Positioned<async_graphql_value::Name>]) -> Vec<String> {
    names.iter().map(|name| name.node.to_string()).collect()
}

fn directives(directives: &[Positioned<ConstDirective>]) -> Vec<Directive> {
    directives
        .iter()
        .map(|directive| Directive {
            name: directive.node.name.node.to_string(),
            arguments: directive
                .node
                .arguments
                .iter()
                .map(|(name, value)| (name.node.to_string(), value.node.clone()))
                .collect(),
        })
        .collect()
}

fn render_directive_definition(definition: &DirectiveDefinition) -> Result<String, SchemaBuildingError> {
    let mut rendered = format!("directive @{}", definition.name.node);

    if !definition.arguments.is_empty() {
        let arguments = definition
            .arguments
            .iter()
            .map(|argument| {
                let argument = &argument.node;
                let mut rendered = format!("{}: {}", argument.name.node, type_reference(&argument.ty.node)?);
                if let Some(default_value) = &argument.default_value {
                    rendered.push_str(&format!(" = {}", default_value.node));
                }
                Ok(rendered)
            })
            .collect::<Result<Vec<_>, SchemaBuildingError>>()?;
        rendered.push_str(&format!("({})", arguments.join(", ")));
    }

    if definition.is_repeatable {
        rendered.push_str(" repeatable");
    }

    let locations: Vec<_> = definition
        .locations
        .iter()
        .map(|location| location_name(&location.node))
        .collect();
    rendered.push_str(&format!(" on {}", locations.join(" | ")));

    if let Some(description) = &definition.description {
        rendered = format!("{}{rendered}", super::printer::Description(&description.node, ""));
    }
    Ok(rendered)
}

fn location_name(location: &DirectiveLocation) -> &'static str {
    match location {
        DirectiveLocation::Query => "QUERY",
        DirectiveLocation::Mutation => "MUTATION",
        DirectiveLocation::Subscription => "SUBSCRIPTION",
        DirectiveLocation::Field => "FIELD",
        DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
        DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
        DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
        DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
        DirectiveLocation::Schema => "SCHEMA",
        DirectiveLocation::Scalar => "SCALAR",
        DirectiveLocation::Object => "OBJECT",
        DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
        DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
        DirectiveLocation::Interface => "INTERFACE",
        DirectiveLocation::Union => "UNION",
        DirectiveLocation::Enum => "ENUM",
        DirectiveLocation::EnumValue => "ENUM_VALUE",
        DirectiveLocation::InputObject => "INPUT_OBJECT",
        DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
    }
}
