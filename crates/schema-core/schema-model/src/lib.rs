// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Declared schema types, the GraphQL type graph derived from them, and the naming vocabulary
//! shared between the two.

pub mod directive;
pub mod field;
pub mod graphql;
pub mod index;
pub mod mapped_arena;
pub mod naming;
pub mod relation;
pub mod type_def;
pub mod types;
