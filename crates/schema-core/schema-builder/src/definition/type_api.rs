// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use runtime_metadata::{Cardinality, Direction};
use serde_json::Map;

use schema_model::{
    directive::{Directive, ElementCustomization},
    field::FieldDef,
    index::IndexDefinition,
    relation::Relation,
    type_def::{
        CompositeTypeDef, DerivedFieldCustomization, DerivedIndexedType,
        DerivedTypeCustomization, EnumValueDef, RootQueryFields, ScalarAggregation,
        ScalarTypeDef, TypeDef, TypeDefKind,
    },
    types::{TypeReference, TypeReferenceError},
};

use crate::error::SchemaBuildingError;

use super::{
    relationship_api::RelationshipApi,
    schema_api::{validate_index_field_path, validate_name, validate_type_name},
};

/// Options shared by every kind of declared type.
pub trait TypeApi {
    #[doc(hidden)]
    fn type_def_mut(&mut self) -> &mut TypeDef;

    fn documentation(&mut self, documentation: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.type_def_mut().documentation = Some(documentation.into());
        self
    }

    fn directive(&mut self, directive: Directive) -> &mut Self
    where
        Self: Sized,
    {
        self.type_def_mut().directives.push(directive);
        self
    }

    /// Emits the type in the GraphQL schema without indexing it or deriving types from it.
    fn graphql_only(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.type_def_mut().graphql_only = true;
        self
    }

    /// Customizes the named types derived from this one. Names are checked at build time.
    fn customize_derived_types(
        &mut self,
        type_names: &[&str],
        customize: impl FnOnce(&mut ElementCustomization),
    ) -> &mut Self
    where
        Self: Sized,
    {
        let mut customization = ElementCustomization::default();
        customize(&mut customization);
        self.type_def_mut()
            .derived_type_customizations
            .push(DerivedTypeCustomization {
                type_names: Some(type_names.iter().map(|name| name.to_string()).collect()),
                customization,
            });
        self
    }

    fn customize_all_derived_types(
        &mut self,
        customize: impl FnOnce(&mut ElementCustomization),
    ) -> &mut Self
    where
        Self: Sized,
    {
        let mut customization = ElementCustomization::default();
        customize(&mut customization);
        self.type_def_mut()
            .derived_type_customizations
            .push(DerivedTypeCustomization {
                type_names: None,
                customization,
            });
        self
    }

    /// Customizes fields (or enum values) of one derived type.
    fn customize_derived_type_fields(
        &mut self,
        type_name: &str,
        field_names: &[&str],
        customize: impl FnOnce(&mut ElementCustomization),
    ) -> &mut Self
    where
        Self: Sized,
    {
        let mut customization = ElementCustomization::default();
        customize(&mut customization);
        self.type_def_mut()
            .derived_field_customizations
            .push(DerivedFieldCustomization {
                type_name: type_name.to_string(),
                field_names: field_names.iter().map(|name| name.to_string()).collect(),
                customization,
            });
        self
    }
}

/// Options of types that can be stored in an index: objects, interfaces and unions.
pub trait IndexedTypeApi: TypeApi {
    fn index(&mut self, name: &str) -> Result<&mut IndexDefinition, SchemaBuildingError>
    where
        Self: Sized,
    {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(SchemaBuildingError::InvalidName {
                name: name.to_string(),
                context: format!("an index of `{}`", self.type_def_mut().name),
                reason: "index names must be non-empty and contain no whitespace".to_string(),
            });
        }

        let type_def = self.type_def_mut();
        if type_def.index.is_some() {
            return Err(SchemaBuildingError::DuplicateIndex(type_def.name.clone()));
        }
        Ok(type_def.index.insert(IndexDefinition::new(name)))
    }

    /// Names the root `Query` fields of this type instead of the pluralized defaults.
    fn root_query_fields(&mut self, plural: &str, singular: &str) -> Result<&mut Self, SchemaBuildingError>
    where
        Self: Sized,
    {
        validate_name(plural, "a root query field")?;
        validate_name(singular, "a root query field")?;
        self.type_def_mut().root_query_fields = Some(RootQueryFields {
            plural: plural.to_string(),
            singular: singular.to_string(),
        });
        Ok(self)
    }
}

/// Builder for object and interface types.
#[derive(Debug)]
pub struct ObjectTypeApi {
    type_def: TypeDef,
    composite: CompositeTypeDef,
}

impl ObjectTypeApi {
    pub(crate) fn new(type_def: TypeDef) -> Self {
        ObjectTypeApi {
            type_def,
            composite: CompositeTypeDef::default(),
        }
    }

    pub(crate) fn finish(self) -> Result<TypeDef, SchemaBuildingError> {
        self.check_field_options()?;

        let ObjectTypeApi {
            mut type_def,
            composite,
        } = self;
        type_def.kind = match type_def.kind {
            TypeDefKind::Interface(_) => TypeDefKind::Interface(composite),
            _ => TypeDefKind::Object(composite),
        };
        Ok(type_def)
    }

    /// Field options set through [`FieldDef`]'s setters, checked once the type is complete.
    fn check_field_options(&self) -> Result<(), SchemaBuildingError> {
        let type_name = &self.type_def.name;
        let fields = &self.composite.fields;

        for field in fields {
            validate_index_field_path(
                &field.name_in_index,
                &format!("the `name_in_index` of `{type_name}.{}`", field.name),
            )?;

            let Some(singular) = &field.singular else {
                continue;
            };
            let context = format!("the singular form of `{type_name}.{}`", field.name);
            validate_name(singular, &context)?;

            // Lists group on their individual values under the singular name.
            let clash = fields.iter().find(|other| {
                other.name != field.name
                    && (other.name == *singular || other.singular.as_ref() == Some(singular))
            });
            if let Some(other) = clash {
                return Err(SchemaBuildingError::InvalidName {
                    name: singular.clone(),
                    context,
                    reason: format!(
                        "`{type_name}.{}` already uses that name, and both would be fields of the same grouping type",
                        other.name
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.type_def.name
    }

    /// Declares a field with a type reference such as `Int`, `[String!]!` or `Widget`.
    pub fn field(&mut self, name: &str, typ: &str) -> Result<&mut FieldDef, SchemaBuildingError> {
        let typ = TypeReference::parse(typ)?;
        self.add_field(FieldDef::new(name, typ))
    }

    /// A list field exposed as a Relay connection of its elements.
    pub fn paginated_collection_field(
        &mut self,
        name: &str,
        element_type: &str,
    ) -> Result<&mut FieldDef, SchemaBuildingError> {
        let element = TypeReference::parse(element_type)?;
        if element.is_list() {
            return Err(TypeReferenceError {
                reference: element_type.to_string(),
                reason: "paginated collection fields take the element type, not a list".to_string(),
            }
            .into());
        }

        let mut field = FieldDef::new(name, TypeReference::non_null_list_of(element.non_null().clone()));
        field.paginated = true;
        self.add_field(field)
    }

    /// A relationship to at most one document of `typ`, found through the foreign key `via`.
    ///
    /// With [`Direction::Out`] the foreign key is a field of this type holding the related id;
    /// with [`Direction::In`] it is a field of the related type holding this type's id.
    pub fn relates_to_one(
        &mut self,
        name: &str,
        typ: &str,
        via: &str,
        direction: Direction,
    ) -> Result<RelationshipApi<'_>, SchemaBuildingError> {
        let reference = TypeReference::parse(typ)?;
        if reference.is_list() {
            return Err(TypeReferenceError {
                reference: typ.to_string(),
                reason: "`relates_to_one` relationships take a non-list type".to_string(),
            }
            .into());
        }

        let related_type = reference.type_name().to_string();
        self.add_relation(name, reference, related_type, via, direction, Cardinality::One, None)
    }

    /// A relationship to any number of documents of `related_type`, exposed as a connection
    /// field plus a `<singular>_aggregations` field.
    pub fn relates_to_many(
        &mut self,
        name: &str,
        related_type: &str,
        via: &str,
        direction: Direction,
        singular: &str,
    ) -> Result<RelationshipApi<'_>, SchemaBuildingError> {
        validate_type_name(related_type)?;
        validate_name(singular, &format!("the singular form of `{}.{name}`", self.name()))?;

        let reference = TypeReference::non_null_list_of(TypeReference::non_null_named(related_type));
        self.add_relation(
            name,
            reference,
            related_type.to_string(),
            via,
            direction,
            Cardinality::Many,
            Some(singular.to_string()),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn add_relation(
        &mut self,
        name: &str,
        reference: TypeReference,
        related_type: String,
        via: &str,
        direction: Direction,
        cardinality: Cardinality,
        singular: Option<String>,
    ) -> Result<RelationshipApi<'_>, SchemaBuildingError> {
        let mut field = FieldDef::new(name, reference);
        field.relation = Some(Relation {
            related_type,
            foreign_key: via.to_string(),
            direction,
            cardinality,
            singular,
            additional_filter: Map::new(),
            equivalent_fields: BTreeMap::new(),
        });

        let type_name = self.type_def.name.clone();
        Ok(RelationshipApi::new(type_name, self.add_field(field)?))
    }

    pub fn implements(&mut self, interface: &str) -> Result<&mut Self, SchemaBuildingError> {
        validate_type_name(interface)?;
        if !self.composite.implements.iter().any(|i| i == interface) {
            self.composite.implements.push(interface.to_string());
        }
        Ok(self)
    }

    /// Maintains fields of `destination_type` from documents of this type. `from_id` is the path
    /// (on this type) holding the id of the destination document.
    pub fn derive_indexed_type_fields(
        &mut self,
        destination_type: &str,
        from_id: &str,
        derive: impl FnOnce(&mut DerivedIndexedType),
    ) -> Result<&mut Self, SchemaBuildingError> {
        validate_type_name(destination_type)?;
        let mut derived = DerivedIndexedType::new(destination_type, from_id);
        derive(&mut derived);
        self.composite.derived_indexed_types.push(derived);
        Ok(self)
    }

    fn add_field(&mut self, field: FieldDef) -> Result<&mut FieldDef, SchemaBuildingError> {
        validate_name(&field.name, &format!("a field of `{}`", self.type_def.name))?;

        if self.composite.fields.iter().any(|f| f.name == field.name) {
            return Err(SchemaBuildingError::DuplicateField {
                type_name: self.type_def.name.clone(),
                field: field.name,
            });
        }

        self.composite.fields.push(field);
        let index = self.composite.fields.len() - 1;
        Ok(&mut self.composite.fields[index])
    }
}

impl TypeApi for ObjectTypeApi {
    fn type_def_mut(&mut self) -> &mut TypeDef {
        &mut self.type_def
    }
}

impl IndexedTypeApi for ObjectTypeApi {}

#[derive(Debug)]
pub struct UnionTypeApi {
    type_def: TypeDef,
    subtypes: Vec<String>,
}

impl UnionTypeApi {
    pub(crate) fn new(type_def: TypeDef) -> Self {
        UnionTypeApi {
            type_def,
            subtypes: vec![],
        }
    }

    pub(crate) fn finish(self) -> TypeDef {
        let UnionTypeApi {
            mut type_def,
            subtypes,
        } = self;
        type_def.kind = TypeDefKind::Union(schema_model::type_def::UnionTypeDef { subtypes });
        type_def
    }

    pub fn subtype(&mut self, name: &str) -> Result<&mut Self, SchemaBuildingError> {
        validate_type_name(name)?;
        if self.subtypes.iter().any(|subtype| subtype == name) {
            return Err(SchemaBuildingError::InvalidName {
                name: name.to_string(),
                context: format!("a subtype of `{}`", self.type_def.name),
                reason: "a union cannot list the same subtype twice".to_string(),
            });
        }
        self.subtypes.push(name.to_string());
        Ok(self)
    }

    pub fn subtypes(&mut self, names: &[&str]) -> Result<&mut Self, SchemaBuildingError> {
        for name in names {
            self.subtype(name)?;
        }
        Ok(self)
    }
}

impl TypeApi for UnionTypeApi {
    fn type_def_mut(&mut self) -> &mut TypeDef {
        &mut self.type_def
    }
}

impl IndexedTypeApi for UnionTypeApi {}

#[derive(Debug)]
pub struct EnumTypeApi {
    type_def: TypeDef,
    values: Vec<EnumValueDef>,
}

impl EnumTypeApi {
    pub(crate) fn new(type_def: TypeDef) -> Self {
        EnumTypeApi {
            type_def,
            values: vec![],
        }
    }

    pub(crate) fn finish(self) -> TypeDef {
        let EnumTypeApi {
            mut type_def,
            values,
        } = self;
        type_def.kind = TypeDefKind::Enum(schema_model::type_def::EnumTypeDef { values });
        type_def
    }

    pub fn value(&mut self, name: &str) -> Result<&mut EnumValueDef, SchemaBuildingError> {
        validate_name(name, &format!("a value of `{}`", self.type_def.name))?;
        if self.values.iter().any(|value| value.name == name) {
            return Err(SchemaBuildingError::DuplicateEnumValue {
                type_name: self.type_def.name.clone(),
                value: name.to_string(),
            });
        }

        self.values.push(EnumValueDef {
            name: name.to_string(),
            documentation: None,
            directives: vec![],
        });
        let index = self.values.len() - 1;
        Ok(&mut self.values[index])
    }

    pub fn values(&mut self, names: &[&str]) -> Result<&mut Self, SchemaBuildingError> {
        for name in names {
            self.value(name)?;
        }
        Ok(self)
    }
}

impl TypeApi for EnumTypeApi {
    fn type_def_mut(&mut self) -> &mut TypeDef {
        &mut self.type_def
    }
}

#[derive(Debug)]
pub struct ScalarTypeApi {
    type_def: TypeDef,
    mapping_type: Option<String>,
    ordered: bool,
    aggregation: ScalarAggregation,
}

impl ScalarTypeApi {
    pub(crate) fn new(name: &str) -> Self {
        ScalarTypeApi {
            type_def: TypeDef::new(name, TypeDefKind::Scalar(ScalarTypeDef::new(""))),
            mapping_type: None,
            ordered: false,
            aggregation: ScalarAggregation::NonNumeric,
        }
    }

    pub(crate) fn finish(self) -> Result<TypeDef, SchemaBuildingError> {
        let ScalarTypeApi {
            mut type_def,
            mapping_type,
            ordered,
            aggregation,
        } = self;

        let mapping_type = mapping_type
            .ok_or_else(|| SchemaBuildingError::MissingScalarMapping(type_def.name.clone()))?;

        let mut scalar = ScalarTypeDef::new(mapping_type);
        scalar.ordered = ordered;
        scalar.aggregation = aggregation;
        type_def.kind = TypeDefKind::Scalar(scalar);
        Ok(type_def)
    }

    /// The index mapping type values of this scalar are stored with.
    pub fn mapping_type(&mut self, mapping_type: impl Into<String>) -> &mut Self {
        self.mapping_type = Some(mapping_type.into());
        self
    }

    /// Offers range filter operators on this scalar.
    pub fn ordered(&mut self) -> &mut Self {
        self.ordered = true;
        self
    }

    /// Aggregates fields of this scalar like the given built-in kind.
    pub fn aggregated_as(&mut self, aggregation: ScalarAggregation) -> &mut Self {
        self.aggregation = aggregation;
        self
    }
}

impl TypeApi for ScalarTypeApi {
    fn type_def_mut(&mut self) -> &mut TypeDef {
        &mut self.type_def
    }
}
