// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeSet;

use schema_model::{
    mapped_arena::MappedArena,
    type_def::{TypeDef, TypeDefKind},
};

use crate::{built_in_types, error::SchemaBuildingError};

/// The declared and built-in types of a schema definition, keyed by logical name.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: MappedArena<TypeDef>,
    /// Names of built-in types that exist only in the GraphQL schema (`PageInfo`, ...).
    reserved_names: BTreeSet<String>,
    raw_sdl: Vec<String>,
}

impl TypeRegistry {
    /// A registry holding only the built-in types.
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            types: MappedArena::default(),
            reserved_names: BTreeSet::new(),
            raw_sdl: vec![],
        };
        built_in_types::register_built_in_types(&mut registry);
        registry
    }

    pub fn register(&mut self, type_def: TypeDef) -> Result<(), SchemaBuildingError> {
        if self.reserved_names.contains(&type_def.name) {
            return Err(SchemaBuildingError::DuplicateType(type_def.name));
        }

        let name = type_def.name.clone();
        self.types
            .add(&name, type_def)
            .map(|_| ())
            .map_err(|_| SchemaBuildingError::DuplicateType(name))
    }

    pub(crate) fn reserve_name(&mut self, name: &str) {
        self.reserved_names.insert(name.to_string());
    }

    pub fn add_raw_sdl(&mut self, sdl: String) {
        self.raw_sdl.push(sdl);
    }

    pub fn raw_sdl(&self) -> &[String] {
        &self.raw_sdl
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get_by_key(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name) || self.reserved_names.contains(name)
    }

    /// All types in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> + '_ {
        self.types.iter().map(|(_, type_def)| type_def)
    }

    pub fn declared_types(&self) -> impl Iterator<Item = &TypeDef> + '_ {
        self.iter().filter(|type_def| !type_def.built_in)
    }

    /// Object and interface types declaring `implements interface`, in name order.
    pub fn implementers(&self, interface: &str) -> Vec<&str> {
        self.iter()
            .filter(|type_def| {
                type_def
                    .as_composite()
                    .is_some_and(|composite| composite.implements.iter().any(|i| i == interface))
            })
            .map(|type_def| type_def.name.as_str())
            .collect()
    }

    /// Direct subtypes of an abstract type: union members in declared order, interface
    /// implementers in name order.
    pub fn subtypes(&self, name: &str) -> Vec<&str> {
        match self.get(name).map(|type_def| &type_def.kind) {
            Some(TypeDefKind::Union(union)) => union.subtypes.iter().map(String::as_str).collect(),
            Some(TypeDefKind::Interface(_)) => self.implementers(name),
            _ => vec![],
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use schema_model::type_def::{CompositeTypeDef, UnionTypeDef};

    use super::*;

    fn object(name: &str, implements: &[&str]) -> TypeDef {
        TypeDef::new(
            name,
            TypeDefKind::Object(CompositeTypeDef {
                implements: implements.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn rejects_duplicates_and_reserved_names() {
        let mut registry = TypeRegistry::new();
        registry.register(object("Widget", &[])).unwrap();

        assert!(matches!(
            registry.register(object("Widget", &[])),
            Err(SchemaBuildingError::DuplicateType(name)) if name == "Widget"
        ));
        assert!(matches!(
            registry.register(object("PageInfo", &[])),
            Err(SchemaBuildingError::DuplicateType(_))
        ));
        assert!(matches!(
            registry.register(object("Int", &[])),
            Err(SchemaBuildingError::DuplicateType(_))
        ));
    }

    #[test]
    fn subtypes_are_order_independent_for_interfaces() {
        let mut registry = TypeRegistry::new();
        registry.register(object("Person", &["Inventor"])).unwrap();
        registry.register(object("Company", &["Inventor"])).unwrap();
        registry
            .register(TypeDef::new(
                "Thing",
                TypeDefKind::Union(UnionTypeDef {
                    subtypes: vec!["Person".to_string(), "Company".to_string()],
                }),
            ))
            .unwrap();
        registry
            .register(TypeDef::new(
                "Inventor",
                TypeDefKind::Interface(CompositeTypeDef::default()),
            ))
            .unwrap();

        assert_eq!(registry.subtypes("Inventor"), vec!["Company", "Person"]);
        assert_eq!(registry.subtypes("Thing"), vec!["Person", "Company"]);
        assert!(registry.subtypes("Person").is_empty());
    }
}
