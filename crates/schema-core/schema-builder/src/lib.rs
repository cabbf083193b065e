// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Derives a query-oriented GraphQL schema and its runtime metadata from a set of declared
//! types.
//!
//! Types are declared through [`SchemaDefinition::define`]. A build then resolves the type graph,
//! generates the derived types (filters, connections, aggregations, sort orders and so on),
//! applies naming overrides and extensions, and emits the SDL together with the
//! [`RuntimeMetadata`] the query engine needs.

pub mod built_in_types;
mod capabilities;
pub mod config;
mod declared_types;
pub mod definition;
mod derived;
pub mod error;
pub mod extension;
pub mod naming;
pub mod registry;
mod runtime_metadata_builder;
mod sdl;
mod system_builder;
pub mod type_graph_resolver;
mod update_targets;

pub use config::{DerivationConfig, NamingConfig, SchemaConfig, load_config, load_config_from_file};
pub use definition::{
    EnumTypeApi, IndexedTypeApi, ObjectTypeApi, RelationshipApi, ScalarTypeApi, SchemaApi,
    SchemaDefinition, TypeApi, UnionTypeApi, is_build_active,
};
pub use error::SchemaBuildingError;
pub use extension::{ExtensionError, SchemaExtension};
pub use runtime_metadata::RuntimeMetadata;
pub use system_builder::SchemaArtifacts;
