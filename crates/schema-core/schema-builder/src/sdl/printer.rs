// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Renders GraphQL types as SDL.

use std::fmt::{self, Display, Write};

use schema_model::{
    directive::Directive,
    graphql::{GraphQLArgument, GraphQLEnumValue, GraphQLField, GraphQLType, GraphQLTypeKind},
};

const INDENT: &str = "  ";

/// A type definition, followed by a newline.
pub(crate) struct TypeDefinition<'a>(pub &'a GraphQLType);

impl Display for TypeDefinition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let TypeDefinition(graphql_type) = self;

        if let Some(documentation) = &graphql_type.documentation {
            Description(documentation, "").fmt(f)?;
        }

        let name = &graphql_type.name;
        let directives = Directives(&graphql_type.directives);
        match &graphql_type.kind {
            GraphQLTypeKind::Scalar => writeln!(f, "scalar {name}{directives}"),
            GraphQLTypeKind::Union { members } => {
                writeln!(f, "union {name}{directives} = {}", members.join(" | "))
            }
            GraphQLTypeKind::Enum => {
                write!(f, "enum {name}{directives}")?;
                write_block(f, &graphql_type.enum_values, |f, value| {
                    EnumValue(value).fmt(f)
                })
            }
            GraphQLTypeKind::InputObject => {
                write!(f, "input {name}{directives}")?;
                write_block(f, &graphql_type.fields, |f, field| Field(field).fmt(f))
            }
            GraphQLTypeKind::Object { implements } | GraphQLTypeKind::Interface { implements } => {
                let keyword = match graphql_type.kind {
                    GraphQLTypeKind::Interface { .. } => "interface",
                    _ => "type",
                };
                write!(f, "{keyword} {name}")?;
                if !implements.is_empty() {
                    write!(f, " implements {}", implements.join(" & "))?;
                }
                write!(f, "{directives}")?;
                write_block(f, &graphql_type.fields, |f, field| Field(field).fmt(f))
            }
        }
    }
}

/// Writes ` {`, one entry per line, and `}`. Empty blocks are left out entirely.
fn write_block<T>(
    f: &mut fmt::Formatter<'_>,
    entries: &[T],
    mut write_entry: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    if entries.is_empty() {
        return f.write_char('\n');
    }

    f.write_str(" {\n")?;
    for entry in entries {
        write_entry(f, entry)?;
    }
    f.write_str("}\n")
}

struct Field<'a>(&'a GraphQLField);

impl Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Field(field) = self;

        if let Some(documentation) = &field.documentation {
            Description(documentation, INDENT).fmt(f)?;
        }
        write!(f, "{INDENT}{}", field.name)?;

        if !field.arguments.is_empty() {
            let documented = field.arguments.iter().any(|a| a.documentation.is_some());
            if documented {
                f.write_str("(\n")?;
                for argument in &field.arguments {
                    if let Some(documentation) = &argument.documentation {
                        Description(documentation, "    ").fmt(f)?;
                    }
                    writeln!(f, "    {}", Argument(argument))?;
                }
                write!(f, "{INDENT})")?;
            } else {
                let arguments: Vec<_> = field.arguments.iter().map(|a| Argument(a).to_string()).collect();
                write!(f, "({})", arguments.join(", "))?;
            }
        }

        write!(f, ": {}", field.typ)?;
        if let Some(default_value) = &field.default_value {
            write!(f, " = {default_value}")?;
        }
        writeln!(f, "{}", Directives(&field.directives))
    }
}

struct Argument<'a>(&'a GraphQLArgument);

impl Display for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Argument(argument) = self;
        write!(f, "{}: {}", argument.name, argument.typ)?;
        if let Some(default_value) = &argument.default_value {
            write!(f, " = {default_value}")?;
        }
        Ok(())
    }
}

struct EnumValue<'a>(&'a GraphQLEnumValue);

impl Display for EnumValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let EnumValue(value) = self;
        if let Some(documentation) = &value.documentation {
            Description(documentation, INDENT).fmt(f)?;
        }
        writeln!(f, "{INDENT}{}{}", value.name, Directives(&value.directives))
    }
}

/// Directives in call order, each preceded by a space.
struct Directives<'a>(&'a [Directive]);

impl Display for Directives<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for directive in self.0 {
            write!(f, " {directive}")?;
        }
        Ok(())
    }
}

/// A block string description at the given indentation.
pub(crate) struct Description<'a>(pub &'a str, pub &'a str);

impl Display for Description<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Description(description, indentation) = self;

        writeln!(f, r#"{indentation}""""#)?;
        for line in description.trim().lines() {
            let line = line.trim_end().replace(r#"""""#, r#"\""""#);
            if line.is_empty() {
                f.write_char('\n')?;
            } else {
                writeln!(f, "{indentation}{line}")?;
            }
        }
        writeln!(f, r#"{indentation}""""#)
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::ConstValue;
    use schema_model::types::TypeReference;

    use super::*;

    #[test]
    fn object_with_documented_arguments() {
        let widget = GraphQLType::object(
            "Widget",
            vec![
                GraphQLField::new("id", TypeReference::non_null_named("ID")),
                GraphQLField::new("parts", TypeReference::named("PartConnection"))
                    .with_documentation("The parts.\n\nSee also `components`.")
                    .with_arguments(vec![
                        GraphQLArgument::new("first", TypeReference::named("Int"))
                            .with_documentation("How many to return."),
                        GraphQLArgument::new("after", TypeReference::named("Cursor")),
                    ]),
            ],
        )
        .with_documentation("A widget.");

        insta::assert_snapshot!(TypeDefinition(&widget).to_string(), @r#"
        """
        A widget.
        """
        type Widget {
          id: ID!
          """
          The parts.

          See also `components`.
          """
          parts(
            """
            How many to return.
            """
            first: Int
            after: Cursor
          ): PartConnection
        }
        "#);
    }

    #[test]
    fn inputs_enums_and_unions() {
        let mut size = GraphQLEnumValue::new("LARGE");
        size.directives.push(Directive::new("deprecated").with_argument("reason", "too big"));
        let sizes = GraphQLType::enum_type("Size", vec![GraphQLEnumValue::new("SMALL"), size]);

        let filter = GraphQLType::input_object(
            "GroupingInput",
            vec![
                GraphQLField::new("time_zone", TypeReference::named("TimeZone"))
                    .with_default_value(ConstValue::String("UTC".to_string())),
            ],
        );

        let union = GraphQLType::union("Inventor", vec!["Company".to_string(), "Person".to_string()]);

        insta::assert_snapshot!(TypeDefinition(&sizes).to_string(), @r#"
        enum Size {
          SMALL
          LARGE @deprecated(reason: "too big")
        }
        "#);
        insta::assert_snapshot!(TypeDefinition(&filter).to_string(), @r#"
        input GroupingInput {
          time_zone: TimeZone = "UTC"
        }
        "#);
        assert_eq!(
            TypeDefinition(&union).to_string(),
            "union Inventor = Company | Person\n"
        );
    }
}
