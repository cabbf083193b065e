// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use schema_model::{
    naming::is_valid_graphql_name,
    type_def::{CompositeTypeDef, EnumTypeDef, TypeDef, TypeDefKind, UnionTypeDef},
};

use crate::{error::SchemaBuildingError, registry::TypeRegistry};

use super::type_api::{EnumTypeApi, ObjectTypeApi, ScalarTypeApi, UnionTypeApi};

/// Declares types into the registry of the running [`super::SchemaDefinition::define`] block.
///
/// Each `*_type` method hands the closure a builder for the new type. The type is registered
/// (and can no longer change) once the closure returns.
pub struct SchemaApi<'a> {
    registry: &'a mut TypeRegistry,
}

impl<'a> SchemaApi<'a> {
    pub(crate) fn new(registry: &'a mut TypeRegistry) -> Self {
        SchemaApi { registry }
    }

    pub fn object_type(
        &mut self,
        name: &str,
        define: impl FnOnce(&mut ObjectTypeApi) -> Result<(), SchemaBuildingError>,
    ) -> Result<(), SchemaBuildingError> {
        self.composite_type(name, false, define)
    }

    /// Interfaces are declared like object types; their implementers list them with
    /// [`ObjectTypeApi::implements`].
    pub fn interface_type(
        &mut self,
        name: &str,
        define: impl FnOnce(&mut ObjectTypeApi) -> Result<(), SchemaBuildingError>,
    ) -> Result<(), SchemaBuildingError> {
        self.composite_type(name, true, define)
    }

    fn composite_type(
        &mut self,
        name: &str,
        interface: bool,
        define: impl FnOnce(&mut ObjectTypeApi) -> Result<(), SchemaBuildingError>,
    ) -> Result<(), SchemaBuildingError> {
        validate_type_name(name)?;
        let kind = if interface {
            TypeDefKind::Interface(CompositeTypeDef::default())
        } else {
            TypeDefKind::Object(CompositeTypeDef::default())
        };

        let mut api = ObjectTypeApi::new(TypeDef::new(name, kind));
        define(&mut api)?;
        self.registry.register(api.finish()?)
    }

    pub fn union_type(
        &mut self,
        name: &str,
        define: impl FnOnce(&mut UnionTypeApi) -> Result<(), SchemaBuildingError>,
    ) -> Result<(), SchemaBuildingError> {
        validate_type_name(name)?;
        let mut api = UnionTypeApi::new(TypeDef::new(
            name,
            TypeDefKind::Union(UnionTypeDef::default()),
        ));
        define(&mut api)?;
        self.registry.register(api.finish())
    }

    pub fn enum_type(
        &mut self,
        name: &str,
        define: impl FnOnce(&mut EnumTypeApi) -> Result<(), SchemaBuildingError>,
    ) -> Result<(), SchemaBuildingError> {
        validate_type_name(name)?;
        let mut api = EnumTypeApi::new(TypeDef::new(
            name,
            TypeDefKind::Enum(EnumTypeDef::default()),
        ));
        define(&mut api)?;
        self.registry.register(api.finish())
    }

    pub fn scalar_type(
        &mut self,
        name: &str,
        define: impl FnOnce(&mut ScalarTypeApi) -> Result<(), SchemaBuildingError>,
    ) -> Result<(), SchemaBuildingError> {
        validate_type_name(name)?;
        let mut api = ScalarTypeApi::new(name);
        define(&mut api)?;
        self.registry.register(api.finish()?)
    }

    /// Adds SDL that is passed through to the output (after being parsed at build time).
    pub fn raw_sdl(&mut self, sdl: impl Into<String>) -> &mut Self {
        self.registry.add_raw_sdl(sdl.into());
        self
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.registry.contains(name)
    }
}

pub(crate) fn validate_type_name(name: &str) -> Result<(), SchemaBuildingError> {
    validate_name(name, "a type")
}

pub(crate) fn validate_name(name: &str, context: &str) -> Result<(), SchemaBuildingError> {
    let reason = if name.contains(['[', ']', '!']) {
        Some("type wrapping characters are only allowed in type references".to_string())
    } else if name.starts_with("__") {
        Some("names starting with `__` are reserved for introspection".to_string())
    } else if !is_valid_graphql_name(name) {
        Some("GraphQL names must match /^[_A-Za-z][_0-9A-Za-z]*$/".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SchemaBuildingError::InvalidName {
            name: name.to_string(),
            context: context.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Index field paths address (sub)fields of the index mapping, such as `name.keyword`.
pub(crate) fn validate_index_field_path(path: &str, context: &str) -> Result<(), SchemaBuildingError> {
    if path.split('.').all(is_valid_graphql_name) {
        return Ok(());
    }

    Err(SchemaBuildingError::InvalidName {
        name: path.to_string(),
        context: context.to_string(),
        reason: "index field paths are dot-separated names matching /^[_A-Za-z][_0-9A-Za-z]*$/"
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_validated_at_declaration() {
        let mut registry = TypeRegistry::new();
        let mut schema = SchemaApi::new(&mut registry);

        for name in ["[Widget]", "Widget!", "__Widget", "Wid get", "3D"] {
            let result = schema.object_type(name, |_| Ok(()));
            assert!(
                matches!(result, Err(SchemaBuildingError::InvalidName { .. })),
                "`{name}` should be rejected"
            );
        }

        assert!(schema.object_type("Widget", |_| Ok(())).is_ok());
        assert!(schema.has_type("Widget"));
    }

    #[test]
    fn types_are_registered_only_when_their_block_succeeds() {
        let mut registry = TypeRegistry::new();
        let mut schema = SchemaApi::new(&mut registry);

        let result = schema.object_type("Widget", |t| {
            t.field("id", "ID!")?;
            t.field("id", "ID")?;
            Ok(())
        });

        assert!(matches!(
            result,
            Err(SchemaBuildingError::DuplicateField { ref type_name, ref field })
                if type_name == "Widget" && field == "id"
        ));
        assert!(!schema.has_type("Widget"));
    }

    #[test]
    fn field_options_are_validated_with_the_type() {
        let mut registry = TypeRegistry::new();
        let mut schema = SchemaApi::new(&mut registry);

        let result = schema.object_type("Widget", |t| {
            t.field("tags", "[String!]!")?.singular("a tag!");
            Ok(())
        });
        assert!(matches!(
            result,
            Err(SchemaBuildingError::InvalidName { ref name, ref context, .. })
                if name == "a tag!" && context == "the singular form of `Widget.tags`"
        ));

        let result = schema.object_type("Widget", |t| {
            t.field("name", "String")?.name_in_index("name str");
            Ok(())
        });
        assert!(matches!(
            result,
            Err(SchemaBuildingError::InvalidName { ref name, .. }) if name == "name str"
        ));
        assert!(!schema.has_type("Widget"));

        schema
            .object_type("Widget", |t| {
                t.field("name", "String")?.name_in_index("name.keyword");
                t.field("tags", "[String!]!")?.singular("tag");
                Ok(())
            })
            .unwrap();
        assert!(schema.has_type("Widget"));
    }

    #[test]
    fn scalars_require_a_mapping_type() {
        let mut registry = TypeRegistry::new();
        let mut schema = SchemaApi::new(&mut registry);

        assert!(matches!(
            schema.scalar_type("Money", |_| Ok(())),
            Err(SchemaBuildingError::MissingScalarMapping(name)) if name == "Money"
        ));
        assert!(schema
            .scalar_type("Money", |t| {
                t.mapping_type("long").ordered();
                Ok(())
            })
            .is_ok());
    }
}
