// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Build configuration: naming overrides and derivation switches.
//!
//! Configuration is read from a TOML file (conventionally `schema.toml`) and then adjusted by
//! environment variables:
//!
//! ```toml
//! [naming]
//! type_name_overrides = { Widget = "Gadget" }
//! derived_type_name_formats = { FilterInput = "{base}Filter" }
//!
//! [naming.enum_value_overrides_by_type.DayOfWeek]
//! MONDAY = "MON"
//!
//! [derivation]
//! legacy_grouping_schema = false
//! ```

mod loader;
mod model;

pub use loader::{load_config, load_config_from_file};
pub use model::{ConfigError, DerivationConfig, LEGACY_GROUPING_SCHEMA_ENV, NamingConfig, SchemaConfig};
