// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Extension points for collaborators that build on the derived schema (federation support, for
//! example) without taking part in derivation.
//!
//! Hooks fire in this order during [`crate::definition::SchemaDefinition::build`]:
//!
//! 1. [`SchemaExtension::before_derive`], once per extension in registration order, on a copy of
//!    the declared types. Types and raw SDL declared here are derived like any other.
//! 2. [`SchemaExtension::decorate_type`], for every type of the final schema (declared, derived
//!    and built-in), after names have been resolved.
//! 3. [`SchemaExtension::after_derive`], with the complete list of types.
//!
//! The resolvers an extension reports are listed in the runtime metadata under the extension's
//! name.

use std::error::Error;

use schema_model::graphql::GraphQLType;

use crate::{definition::SchemaApi, error::SchemaBuildingError};

pub type ExtensionError = Box<dyn Error + Send + Sync + 'static>;

pub trait SchemaExtension {
    /// Identifies the extension in errors and runtime metadata.
    fn name(&self) -> &str;

    fn before_derive(&self, _schema: &mut SchemaApi<'_>) -> Result<(), SchemaBuildingError> {
        Ok(())
    }

    /// Called on every constructed type; may add directives or documentation to it and its
    /// fields.
    fn decorate_type(&self, _graphql_type: &mut GraphQLType) {}

    /// May add types, or tag existing ones (including built-in types).
    fn after_derive(&self, _types: &mut Vec<GraphQLType>) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Names of the GraphQL resolvers this extension provides.
    fn resolvers(&self) -> Vec<String> {
        vec![]
    }
}

pub(crate) fn extension_failure(extension: &dyn SchemaExtension, error: ExtensionError) -> SchemaBuildingError {
    SchemaBuildingError::Extension {
        extension: extension.name().to_string(),
        message: error.to_string(),
    }
}
