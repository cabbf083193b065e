// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::naming::is_valid_graphql_name;

/// A GraphQL type reference such as `Int`, `Int!`, `[Int]` or `[[Int!]]!`.
///
/// `Plain` is a non-null named type, `List` a non-null list, and `Optional` makes its
/// underlying type nullable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType<T> {
    Plain(T),
    Optional(Box<FieldType<T>>),
    List(Box<FieldType<T>>),
}

/// A type reference by (logical) type name.
pub type TypeReference = FieldType<String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid type reference `{reference}`: {reason}")]
pub struct TypeReferenceError {
    pub reference: String,
    pub reason: String,
}

impl<T> FieldType<T> {
    pub fn innermost(&self) -> &T {
        match self {
            FieldType::Plain(t) => t,
            FieldType::Optional(underlying) | FieldType::List(underlying) => underlying.innermost(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldType::Optional(_))
    }

    /// The type with its outermost nullability removed.
    pub fn non_null(&self) -> &FieldType<T> {
        match self {
            FieldType::Optional(underlying) => underlying.non_null(),
            _ => self,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.non_null(), FieldType::List(_))
    }

    pub fn list_element(&self) -> Option<&FieldType<T>> {
        match self.non_null() {
            FieldType::List(element) => Some(element),
            _ => None,
        }
    }

    /// True for lists whose elements are themselves lists (`[[Int]]`).
    pub fn is_nested_list(&self) -> bool {
        self.list_element().is_some_and(|element| element.is_list())
    }
}

impl<T: Clone> FieldType<T> {
    pub fn optional(&self) -> Self {
        match self {
            FieldType::Optional(_) => self.clone(),
            _ => FieldType::Optional(Box::new(self.clone())),
        }
    }

    /// The same shape with every level of nullability removed.
    pub fn stripped(&self) -> Self {
        match self {
            FieldType::Plain(t) => FieldType::Plain(t.clone()),
            FieldType::Optional(underlying) => underlying.stripped(),
            FieldType::List(underlying) => FieldType::List(Box::new(underlying.stripped())),
        }
    }

    /// Replaces the innermost type while keeping the list/nullability wrapping.
    pub fn with_innermost<U: Clone>(&self, replacement: U) -> FieldType<U> {
        match self {
            FieldType::Plain(_) => FieldType::Plain(replacement),
            FieldType::Optional(underlying) => {
                FieldType::Optional(Box::new(underlying.with_innermost(replacement)))
            }
            FieldType::List(underlying) => {
                FieldType::List(Box::new(underlying.with_innermost(replacement)))
            }
        }
    }
}

impl<T: Clone + PartialEq> FieldType<T> {
    /// Unifies two references that agree once nullability is ignored, keeping the nullable form
    /// at each level. Returns `None` when the shapes or named types differ.
    pub fn unify(&self, other: &Self) -> Option<Self> {
        let nullable = self.is_nullable() || other.is_nullable();
        let unified = match (self.non_null(), other.non_null()) {
            (FieldType::Plain(a), FieldType::Plain(b)) if a == b => FieldType::Plain(a.clone()),
            (FieldType::List(a), FieldType::List(b)) => FieldType::List(Box::new(a.unify(b)?)),
            _ => return None,
        };

        Some(if nullable {
            FieldType::Optional(Box::new(unified))
        } else {
            unified
        })
    }
}

impl TypeReference {
    /// Parses the GraphQL type grammar (`T`, `T!`, `[T]`, `[T!]!`, ...).
    pub fn parse(reference: &str) -> Result<Self, TypeReferenceError> {
        fn parse_inner(whole: &str, part: &str) -> Result<TypeReference, TypeReferenceError> {
            let error = |reason: &str| TypeReferenceError {
                reference: whole.to_string(),
                reason: reason.to_string(),
            };

            let part = part.trim();
            let (body, non_null) = match part.strip_suffix('!') {
                Some(body) => (body.trim_end(), true),
                None => (part, false),
            };

            let base = if let Some(rest) = body.strip_prefix('[') {
                let inner = rest
                    .strip_suffix(']')
                    .ok_or_else(|| error("unbalanced list brackets"))?;
                FieldType::List(Box::new(parse_inner(whole, inner)?))
            } else if body.is_empty() {
                return Err(error("missing type name"));
            } else if !is_valid_graphql_name(body) {
                return Err(error(&format!("`{body}` is not a valid GraphQL type name")));
            } else {
                FieldType::Plain(body.to_string())
            };

            Ok(if non_null {
                base
            } else {
                FieldType::Optional(Box::new(base))
            })
        }

        parse_inner(reference, reference)
    }

    pub fn type_name(&self) -> &str {
        self.innermost()
    }

    /// `Name`
    pub fn named(name: &str) -> Self {
        FieldType::Optional(Box::new(FieldType::Plain(name.to_string())))
    }

    /// `Name!`
    pub fn non_null_named(name: &str) -> Self {
        FieldType::Plain(name.to_string())
    }

    /// `[element]`
    pub fn list_of(element: TypeReference) -> Self {
        FieldType::Optional(Box::new(FieldType::List(Box::new(element))))
    }

    /// `[element]!`
    pub fn non_null_list_of(element: TypeReference) -> Self {
        FieldType::List(Box::new(element))
    }
}

impl<T: Display> FieldType<T> {
    fn fmt_with_nullability(&self, f: &mut fmt::Formatter<'_>, nullable: bool) -> fmt::Result {
        match self {
            FieldType::Optional(underlying) => underlying.fmt_with_nullability(f, true),
            FieldType::Plain(t) => {
                write!(f, "{t}")?;
                if !nullable { write!(f, "!") } else { Ok(()) }
            }
            FieldType::List(underlying) => {
                write!(f, "[")?;
                underlying.fmt_with_nullability(f, false)?;
                write!(f, "]")?;
                if !nullable { write!(f, "!") } else { Ok(()) }
            }
        }
    }
}

impl<T: Display> Display for FieldType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_nullability(f, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiplatform_test::multiplatform_test;

    fn parse(reference: &str) -> TypeReference {
        TypeReference::parse(reference).unwrap()
    }

    #[multiplatform_test]
    fn parses_wrapping_grammar() {
        assert_eq!(parse("Int"), FieldType::Optional(Box::new(FieldType::Plain("Int".into()))));
        assert_eq!(parse("Int!"), FieldType::Plain("Int".into()));
        assert_eq!(
            parse("[Int!]!"),
            FieldType::List(Box::new(FieldType::Plain("Int".into())))
        );

        for reference in ["Int", "Int!", "[Int]", "[Int!]", "[Int]!", "[[Int!]]!"] {
            assert_eq!(parse(reference).to_string(), reference);
        }
        insta::assert_snapshot!(parse(" [ Widget ! ] ").to_string(), @"[Widget!]");
    }

    #[multiplatform_test]
    fn rejects_malformed_references() {
        for reference in ["", "[Int", "Int]", "Int!!", "[]", "3D", "Wid-get"] {
            assert!(
                TypeReference::parse(reference).is_err(),
                "`{reference}` should be rejected"
            );
        }
    }

    #[multiplatform_test]
    fn shape_queries() {
        assert!(parse("[String!]!").is_list());
        assert!(!parse("String").is_list());
        assert!(parse("[[Int]]").is_nested_list());
        assert_eq!(parse("[[Int]]").type_name(), "Int");
        assert_eq!(parse("[Int!]!").stripped(), parse("[Int!]!"));
        assert_eq!(parse("[Int]").stripped(), parse("[Int!]!"));
        assert_eq!(parse("[Int!]").with_innermost("Float".to_string()), parse("[Float!]"));
    }

    #[multiplatform_test]
    fn unify_prefers_nullable_forms() {
        assert_eq!(parse("Int!").unify(&parse("Int")), Some(parse("Int")));
        assert_eq!(parse("[Int!]!").unify(&parse("[Int]!")), Some(parse("[Int]!")));
        assert_eq!(parse("Int").unify(&parse("[Int]")), None);
        assert_eq!(parse("Int").unify(&parse("Float")), None);
    }
}
