// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Which derived types a field takes part in.

use schema_model::{
    field::{FieldDef, NESTED_MAPPING_TYPE, OBJECT_MAPPING_TYPE, TEXT_MAPPING_TYPE},
    type_def::{TypeDef, TypeDefKind},
};

use crate::{built_in_types::STRING, type_graph_resolver::ResolvedSchema};

/// How a field's values are indexed, as far as derivation is concerned.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind<'a> {
    /// Nothing is derived: relationships, fields that are not indexed or not exposed, nested
    /// lists, non-indexable scalars and fields with a custom mapping type.
    Excluded,
    /// A scalar or enum value.
    Leaf(&'a TypeDef),
    /// A `String` indexed for full text search.
    Text,
    /// An embedded object. `nested` lists store each element as a separate sub-document.
    Object { type_def: &'a TypeDef, nested: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct Capabilities<'a> {
    resolved: &'a ResolvedSchema,
}

impl<'a> Capabilities<'a> {
    pub fn new(resolved: &'a ResolvedSchema) -> Self {
        Capabilities { resolved }
    }

    pub fn kind(&self, field: &FieldDef) -> FieldKind<'a> {
        if field.relation.is_some()
            || field.graphql_only
            || field.indexing_only
            || field.typ.is_nested_list()
        {
            return FieldKind::Excluded;
        }

        let Some(target) = self.resolved.type_def(field.typ.type_name()) else {
            return FieldKind::Excluded;
        };
        if target.graphql_only {
            return FieldKind::Excluded;
        }
        let mapping_type = field.mapping.type_name.as_deref();

        match &target.kind {
            TypeDefKind::Scalar(scalar) => match mapping_type {
                _ if !scalar.indexable => FieldKind::Excluded,
                None => FieldKind::Leaf(target),
                Some(TEXT_MAPPING_TYPE) if target.name == STRING => FieldKind::Text,
                Some(mapping) if mapping == scalar.mapping_type => FieldKind::Leaf(target),
                Some(_) => FieldKind::Excluded,
            },
            TypeDefKind::Enum(_) => match mapping_type {
                None | Some("keyword") => FieldKind::Leaf(target),
                Some(_) => FieldKind::Excluded,
            },
            TypeDefKind::Object(_) | TypeDefKind::Interface(_) | TypeDefKind::Union(_) => {
                match mapping_type {
                    None | Some(OBJECT_MAPPING_TYPE) => FieldKind::Object {
                        type_def: target,
                        nested: false,
                    },
                    Some(NESTED_MAPPING_TYPE) if field.typ.is_list() => FieldKind::Object {
                        type_def: target,
                        nested: true,
                    },
                    Some(_) => FieldKind::Excluded,
                }
            }
        }
    }

    pub fn filterable(&self, field: &FieldDef) -> bool {
        !matches!(self.kind(field), FieldKind::Excluded) && field.filterable.unwrap_or(true)
    }

    /// Lists are never sortable; embedded objects are sorted by their own sortable fields.
    pub fn sortable(&self, field: &FieldDef) -> bool {
        if field.typ.is_list() || !field.sortable.unwrap_or(true) {
            return false;
        }

        match self.kind(field) {
            FieldKind::Leaf(_) => true,
            FieldKind::Object { type_def, .. } => self.has_sortable_fields(&type_def.name),
            FieldKind::Excluded | FieldKind::Text => false,
        }
    }

    /// `id` fields of stored types are not groupable unless requested (each group would hold
    /// one document). Lists of leaves need a `singular` name to be grouped on.
    pub fn groupable(&self, owner: &str, field: &FieldDef) -> bool {
        match self.kind(field) {
            FieldKind::Leaf(_) if field.typ.is_list() => {
                field.singular.is_some() && field.groupable.unwrap_or(true)
            }
            FieldKind::Leaf(_) => field
                .groupable
                .unwrap_or_else(|| !(field.name == "id" && self.resolved.is_stored(owner))),
            FieldKind::Object {
                type_def,
                nested: false,
            } => field.groupable.unwrap_or(true) && self.has_groupable_fields(&type_def.name),
            FieldKind::Object { nested: true, .. } | FieldKind::Excluded | FieldKind::Text => false,
        }
    }

    pub fn aggregatable(&self, field: &FieldDef) -> bool {
        if !field.aggregatable.unwrap_or(true) {
            return false;
        }

        match self.kind(field) {
            FieldKind::Leaf(_) => true,
            FieldKind::Object {
                type_def,
                nested: false,
            } => self.has_aggregatable_fields(&type_def.name),
            FieldKind::Object { nested: true, .. } | FieldKind::Excluded | FieldKind::Text => false,
        }
    }

    /// `nested` lists are aggregated separately, through `sub_aggregations`.
    pub fn sub_aggregatable(&self, field: &FieldDef) -> bool {
        matches!(self.kind(field), FieldKind::Object { nested: true, .. })
            && field.aggregatable.unwrap_or(true)
    }

    /// An embedded (non-list) object field whose type has sub-aggregations of its own.
    pub fn has_sub_aggregations_through(&self, field: &FieldDef) -> Option<&'a TypeDef> {
        match self.kind(field) {
            FieldKind::Object {
                type_def,
                nested: false,
            } if !field.typ.is_list() && self.has_sub_aggregations(&type_def.name) => {
                Some(type_def)
            }
            _ => None,
        }
    }

    pub fn has_sortable_fields(&self, type_name: &str) -> bool {
        self.resolved.fields(type_name).iter().any(|f| self.sortable(f))
    }

    pub fn has_groupable_fields(&self, type_name: &str) -> bool {
        self.resolved
            .fields(type_name)
            .iter()
            .any(|f| self.groupable(type_name, f))
    }

    pub fn has_aggregatable_fields(&self, type_name: &str) -> bool {
        self.resolved.fields(type_name).iter().any(|f| self.aggregatable(f))
    }

    pub fn has_sub_aggregations(&self, type_name: &str) -> bool {
        self.resolved.fields(type_name).iter().any(|f| {
            self.sub_aggregatable(f) || self.has_sub_aggregations_through(f).is_some()
        })
    }
}
