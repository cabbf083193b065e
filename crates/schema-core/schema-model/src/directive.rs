// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{self, Display};

use async_graphql_value::ConstValue;

/// A directive application such as `@deprecated(reason: "use `name`")`.
///
/// Arguments keep the order they were given in.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<(String, ConstValue)>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: vec![],
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<ConstValue>) -> Self {
        self.arguments.push((name.into(), value.into()));
        self
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.arguments.is_empty() {
            let arguments: Vec<_> = self
                .arguments
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect();
            write!(f, "({})", arguments.join(", "))?;
        }
        Ok(())
    }
}

/// Directives and documentation to apply to a generated schema element.
///
/// Built by the closures passed to the `customize_*` declaration methods and replayed onto each
/// derived type or field the customization targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementCustomization {
    pub directives: Vec<Directive>,
    pub documentation: Option<String>,
}

impl ElementCustomization {
    pub fn directive(&mut self, directive: Directive) -> &mut Self {
        self.directives.push(directive);
        self
    }

    pub fn documentation(&mut self, documentation: impl Into<String>) -> &mut Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty() && self.documentation.is_none()
    }

    /// Appends another customization; later documentation replaces earlier.
    pub fn merge(&mut self, other: &ElementCustomization) {
        self.directives.extend(other.directives.iter().cloned());
        if other.documentation.is_some() {
            self.documentation.clone_from(&other.documentation);
        }
    }

    pub fn apply_to(&self, directives: &mut Vec<Directive>, documentation: &mut Option<String>) {
        directives.extend(self.directives.iter().cloned());
        if self.documentation.is_some() {
            documentation.clone_from(&self.documentation);
        }
    }
}
