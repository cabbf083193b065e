// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The declaration API.
//!
//! A [`SchemaDefinition`] accumulates declarations from any number of [`SchemaDefinition::define`]
//! blocks and turns them into SDL and runtime metadata with [`SchemaDefinition::build`]:
//!
//! ```ignore
//! let mut definition = SchemaDefinition::new(SchemaConfig::default());
//! definition.define(|schema| {
//!     schema.object_type("Widget", |t| {
//!         t.field("id", "ID!")?;
//!         t.field("cost", "Int")?;
//!         t.index("widgets")?;
//!         Ok(())
//!     })
//! })?;
//! let artifacts = definition.build()?;
//! ```

mod active_build;
mod relationship_api;
mod schema_api;
mod type_api;

pub use active_build::is_build_active;
pub use relationship_api::RelationshipApi;
pub use schema_api::SchemaApi;
pub use type_api::{EnumTypeApi, IndexedTypeApi, ObjectTypeApi, ScalarTypeApi, TypeApi, UnionTypeApi};

pub(crate) use active_build::ActiveBuildGuard;

use crate::{
    config::SchemaConfig, error::SchemaBuildingError, extension::SchemaExtension,
    registry::TypeRegistry, system_builder::{self, SchemaArtifacts},
};

/// A schema under construction.
pub struct SchemaDefinition {
    config: SchemaConfig,
    registry: TypeRegistry,
    extensions: Vec<Box<dyn SchemaExtension>>,
}

impl SchemaDefinition {
    pub fn new(config: SchemaConfig) -> Self {
        SchemaDefinition {
            config,
            registry: TypeRegistry::new(),
            extensions: vec![],
        }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn register_extension(&mut self, extension: impl SchemaExtension + 'static) -> &mut Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Runs a declaration block. Blocks accumulate, and cannot be nested in other blocks or
    /// builds on the same thread.
    pub fn define(
        &mut self,
        declarations: impl FnOnce(&mut SchemaApi<'_>) -> Result<(), SchemaBuildingError>,
    ) -> Result<(), SchemaBuildingError> {
        let _guard = ActiveBuildGuard::acquire()?;
        declarations(&mut SchemaApi::new(&mut self.registry))
    }

    /// Derives the full schema. The definition is left untouched, so building twice yields the
    /// same artifacts.
    pub fn build(&self) -> Result<SchemaArtifacts, SchemaBuildingError> {
        let _guard = ActiveBuildGuard::acquire()?;
        system_builder::build_schema(self.registry.clone(), &self.config, &self.extensions)
    }
}
