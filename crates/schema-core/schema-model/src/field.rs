// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    directive::{Directive, ElementCustomization},
    relation::{Relation, SourcedFrom},
    types::TypeReference,
};

/// Mapping `type` used for fields indexed as analyzed full text.
pub const TEXT_MAPPING_TYPE: &str = "text";
/// Mapping `type` storing each element of an object list as a separate sub-document.
pub const NESTED_MAPPING_TYPE: &str = "nested";
/// Mapping `type` flattening object lists into parallel value lists.
pub const OBJECT_MAPPING_TYPE: &str = "object";

/// Derived-field families a source field's customizations can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DerivedFieldFamily {
    /// Fields of `*FilterInput`, `*ListFilterInput` and `*FieldsListFilterInput` types.
    Filter,
    /// The `_ASC`/`_DESC` values of `*SortOrderInput` enums.
    SortOrder,
    GroupedBy,
    AggregatedValues,
    SubAggregations,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingOptions {
    /// Overrides the index mapping type (`text`, `nested`, or a datastore-specific type).
    pub type_name: Option<String>,
    /// Any other mapping parameters (for example `meta`); these never affect derivation.
    pub options: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub typ: TypeReference,
    pub documentation: Option<String>,
    pub directives: Vec<Directive>,
    pub name_in_index: String,

    pub filterable: Option<bool>,
    pub sortable: Option<bool>,
    pub groupable: Option<bool>,
    pub aggregatable: Option<bool>,

    /// Indexed, but absent from the GraphQL schema.
    pub indexing_only: bool,
    /// Present in the GraphQL schema, but not indexed.
    pub graphql_only: bool,

    pub mapping: MappingOptions,
    pub relation: Option<Relation>,
    pub sourced_from: Option<SourcedFrom>,
    pub singular: Option<String>,
    /// Exposed as a Relay connection rather than a plain list.
    pub paginated: bool,

    pub customizations: BTreeMap<DerivedFieldFamily, ElementCustomization>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, typ: TypeReference) -> Self {
        let name = name.into();
        Self {
            name_in_index: name.clone(),
            name,
            typ,
            documentation: None,
            directives: vec![],
            filterable: None,
            sortable: None,
            groupable: None,
            aggregatable: None,
            indexing_only: false,
            graphql_only: false,
            mapping: MappingOptions::default(),
            relation: None,
            sourced_from: None,
            singular: None,
            paginated: false,
            customizations: BTreeMap::new(),
        }
    }

    pub fn documentation(&mut self, documentation: impl Into<String>) -> &mut Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn directive(&mut self, directive: Directive) -> &mut Self {
        self.directives.push(directive);
        self
    }

    pub fn name_in_index(&mut self, name_in_index: impl Into<String>) -> &mut Self {
        self.name_in_index = name_in_index.into();
        self
    }

    pub fn filterable(&mut self, filterable: bool) -> &mut Self {
        self.filterable = Some(filterable);
        self
    }

    pub fn sortable(&mut self, sortable: bool) -> &mut Self {
        self.sortable = Some(sortable);
        self
    }

    pub fn groupable(&mut self, groupable: bool) -> &mut Self {
        self.groupable = Some(groupable);
        self
    }

    pub fn aggregatable(&mut self, aggregatable: bool) -> &mut Self {
        self.aggregatable = Some(aggregatable);
        self
    }

    pub fn indexing_only(&mut self) -> &mut Self {
        self.indexing_only = true;
        self
    }

    pub fn graphql_only(&mut self) -> &mut Self {
        self.graphql_only = true;
        self
    }

    pub fn mapping_type(&mut self, type_name: impl Into<String>) -> &mut Self {
        self.mapping.type_name = Some(type_name.into());
        self
    }

    pub fn mapping_option(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.mapping.options.insert(key.into(), value);
        self
    }

    pub fn singular(&mut self, singular: impl Into<String>) -> &mut Self {
        self.singular = Some(singular.into());
        self
    }

    pub fn sourced_from(
        &mut self,
        relationship: impl Into<String>,
        field_path: impl Into<String>,
    ) -> &mut Self {
        self.sourced_from = Some(SourcedFrom {
            relationship: relationship.into(),
            field_path: field_path.into(),
        });
        self
    }

    /// Customizes the fields generated for this field in filter input types.
    pub fn customize_filter_field(&mut self, f: impl FnOnce(&mut ElementCustomization)) -> &mut Self {
        self.customize(DerivedFieldFamily::Filter, f)
    }

    /// Customizes the `_ASC`/`_DESC` sort order enum values generated for this field.
    pub fn customize_sort_order_enum_values(
        &mut self,
        f: impl FnOnce(&mut ElementCustomization),
    ) -> &mut Self {
        self.customize(DerivedFieldFamily::SortOrder, f)
    }

    pub fn customize_grouped_by_field(&mut self, f: impl FnOnce(&mut ElementCustomization)) -> &mut Self {
        self.customize(DerivedFieldFamily::GroupedBy, f)
    }

    pub fn customize_aggregated_values_field(
        &mut self,
        f: impl FnOnce(&mut ElementCustomization),
    ) -> &mut Self {
        self.customize(DerivedFieldFamily::AggregatedValues, f)
    }

    pub fn customize_sub_aggregations_field(
        &mut self,
        f: impl FnOnce(&mut ElementCustomization),
    ) -> &mut Self {
        self.customize(DerivedFieldFamily::SubAggregations, f)
    }

    fn customize(
        &mut self,
        family: DerivedFieldFamily,
        f: impl FnOnce(&mut ElementCustomization),
    ) -> &mut Self {
        f(self.customizations.entry(family).or_default());
        self
    }

    pub fn customization(&self, family: DerivedFieldFamily) -> Option<&ElementCustomization> {
        self.customizations.get(&family)
    }

    /// Whether the field's value lives in the index (as opposed to being resolved at query time).
    pub fn is_indexed(&self) -> bool {
        !self.graphql_only && self.relation.is_none()
    }

    pub fn is_graphql_visible(&self) -> bool {
        !self.indexing_only
    }
}
