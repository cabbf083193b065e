// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    directive::{Directive, ElementCustomization},
    field::FieldDef,
    index::IndexDefinition,
};

/// A declared (or built-in) type, keyed by its logical name in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub documentation: Option<String>,
    pub directives: Vec<Directive>,
    /// Emitted in the GraphQL schema, but neither indexed nor used to derive other types.
    pub graphql_only: bool,
    pub built_in: bool,
    pub kind: TypeDefKind,
    pub index: Option<IndexDefinition>,
    pub root_query_fields: Option<RootQueryFields>,
    pub derived_type_customizations: Vec<DerivedTypeCustomization>,
    pub derived_field_customizations: Vec<DerivedFieldCustomization>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    Object(CompositeTypeDef),
    Interface(CompositeTypeDef),
    Union(UnionTypeDef),
    Enum(EnumTypeDef),
    Scalar(ScalarTypeDef),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeTypeDef {
    pub fields: Vec<FieldDef>,
    /// Names of the interfaces this type implements, in declaration order.
    pub implements: Vec<String>,
    pub derived_indexed_types: Vec<DerivedIndexedType>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionTypeDef {
    pub subtypes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumTypeDef {
    pub values: Vec<EnumValueDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDef {
    pub name: String,
    pub documentation: Option<String>,
    pub directives: Vec<Directive>,
}

impl EnumValueDef {
    pub fn documentation(&mut self, documentation: impl Into<String>) -> &mut Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn directive(&mut self, directive: Directive) -> &mut Self {
        self.directives.push(directive);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarTypeDef {
    /// The index mapping type values of this scalar are stored with.
    pub mapping_type: String,
    /// Whether range operators (`gt`, `gte`, `lt`, `lte`) apply.
    pub ordered: bool,
    pub aggregation: ScalarAggregation,
    /// Scalars such as `Cursor` exist only in the GraphQL layer.
    pub indexable: bool,
    /// Filters on this scalar offer a `time_of_day` sub-filter.
    pub time_of_day_filter: bool,
}

impl ScalarTypeDef {
    pub fn new(mapping_type: impl Into<String>) -> Self {
        Self {
            mapping_type: mapping_type.into(),
            ordered: false,
            aggregation: ScalarAggregation::NonNumeric,
            indexable: true,
            time_of_day_filter: false,
        }
    }
}

/// Selects the aggregated-values type fields of a given scalar are aggregated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarAggregation {
    /// `Int`: exact min/max/sum and approximate sum/avg/distinct count.
    Integer,
    /// `JsonSafeLong`: same functions as `Integer`.
    SafeLong,
    /// `Float`: approximate sum/avg, exact min/max.
    Float,
    /// `LongString`: exact and approximate min/max/sum.
    LongString,
    /// `Date`, `DateTime`, `LocalTime`: exact min/max, approximate avg.
    Temporal,
    /// Only an approximate distinct value count.
    NonNumeric,
}

/// Root `Query` field names for an indexed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootQueryFields {
    pub plural: String,
    pub singular: String,
}

/// A `customize_derived_types` call: `type_names` of `None` targets every derived type.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTypeCustomization {
    pub type_names: Option<Vec<String>>,
    pub customization: ElementCustomization,
}

/// A `customize_derived_type_fields` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFieldCustomization {
    pub type_name: String,
    pub field_names: Vec<String>,
    pub customization: ElementCustomization,
}

/// Fields of another indexed type maintained from documents of the declaring type.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedIndexedType {
    pub destination_type: String,
    /// Path on the source document holding the destination document's id.
    pub from_id: String,
    pub route_with: Option<String>,
    pub rollover_with: Option<String>,
    pub derivations: Vec<FieldDerivation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDerivation {
    pub kind: DerivationKind,
    pub destination_field: String,
    pub source_field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationKind {
    AppendOnlySet,
    ImmutableValue,
    MinValue,
    MaxValue,
}

impl DerivationKind {
    pub fn name(&self) -> &'static str {
        match self {
            DerivationKind::AppendOnlySet => "append_only_set",
            DerivationKind::ImmutableValue => "immutable_value",
            DerivationKind::MinValue => "min_value",
            DerivationKind::MaxValue => "max_value",
        }
    }
}

impl DerivedIndexedType {
    pub fn new(destination_type: impl Into<String>, from_id: impl Into<String>) -> Self {
        Self {
            destination_type: destination_type.into(),
            from_id: from_id.into(),
            route_with: None,
            rollover_with: None,
            derivations: vec![],
        }
    }

    pub fn route_with(&mut self, source_path: impl Into<String>) -> &mut Self {
        self.route_with = Some(source_path.into());
        self
    }

    pub fn rollover_with(&mut self, source_path: impl Into<String>) -> &mut Self {
        self.rollover_with = Some(source_path.into());
        self
    }

    pub fn append_only_set(&mut self, destination_field: &str, source_field: &str) -> &mut Self {
        self.derive(DerivationKind::AppendOnlySet, destination_field, source_field)
    }

    pub fn immutable_value(&mut self, destination_field: &str, source_field: &str) -> &mut Self {
        self.derive(DerivationKind::ImmutableValue, destination_field, source_field)
    }

    pub fn min_value(&mut self, destination_field: &str, source_field: &str) -> &mut Self {
        self.derive(DerivationKind::MinValue, destination_field, source_field)
    }

    pub fn max_value(&mut self, destination_field: &str, source_field: &str) -> &mut Self {
        self.derive(DerivationKind::MaxValue, destination_field, source_field)
    }

    fn derive(&mut self, kind: DerivationKind, destination_field: &str, source_field: &str) -> &mut Self {
        self.derivations.push(FieldDerivation {
            kind,
            destination_field: destination_field.to_string(),
            source_field: source_field.to_string(),
        });
        self
    }
}

impl TypeDef {
    pub fn new(name: impl Into<String>, kind: TypeDefKind) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            directives: vec![],
            graphql_only: false,
            built_in: false,
            kind,
            index: None,
            root_query_fields: None,
            derived_type_customizations: vec![],
            derived_field_customizations: vec![],
        }
    }

    pub fn built_in(mut self) -> Self {
        self.built_in = true;
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, TypeDefKind::Interface(_) | TypeDefKind::Union(_))
    }

    /// Object, interface or union: a type with fields (possibly through its subtypes).
    pub fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            TypeDefKind::Object(_) | TypeDefKind::Interface(_) | TypeDefKind::Union(_)
        )
    }

    pub fn as_composite(&self) -> Option<&CompositeTypeDef> {
        match &self.kind {
            TypeDefKind::Object(composite) | TypeDefKind::Interface(composite) => Some(composite),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarTypeDef> {
        match &self.kind {
            TypeDefKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumTypeDef> {
        match &self.kind {
            TypeDefKind::Enum(enum_type) => Some(enum_type),
            _ => None,
        }
    }

    /// Fields declared directly on this type (empty for unions, enums and scalars).
    pub fn declared_fields(&self) -> &[FieldDef] {
        self.as_composite()
            .map(|composite| composite.fields.as_slice())
            .unwrap_or_default()
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TypeDefKind::Object(_) => "object",
            TypeDefKind::Interface(_) => "interface",
            TypeDefKind::Union(_) => "union",
            TypeDefKind::Enum(_) => "enum",
            TypeDefKind::Scalar(_) => "scalar",
        }
    }
}
