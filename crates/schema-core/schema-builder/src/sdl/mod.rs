// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Deterministic SDL output.
//!
//! Types are printed in name order, separated by blank lines, after the directive definitions
//! (also in name order). The standard GraphQL scalars are never printed.

mod printer;
mod type_definition;

pub(crate) use type_definition::{RawSdlDefinitions, parse_raw_sdl};

use schema_model::graphql::GraphQLType;

use crate::built_in_types::is_standard_scalar;

use printer::TypeDefinition;

pub(crate) fn emit_sdl(types: &[GraphQLType], directive_definitions: &[(String, String)]) -> String {
    let mut directive_definitions: Vec<_> = directive_definitions.iter().collect();
    directive_definitions.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut types: Vec<_> = types
        .iter()
        .filter(|graphql_type| !is_standard_scalar(&graphql_type.name))
        .collect();
    types.sort_by(|a, b| a.name.cmp(&b.name));

    let mut sections: Vec<String> = directive_definitions
        .into_iter()
        .map(|(_, rendered)| format!("{rendered}\n"))
        .collect();
    sections.extend(types.into_iter().map(|t| TypeDefinition(t).to_string()));
    sections.join("\n")
}
