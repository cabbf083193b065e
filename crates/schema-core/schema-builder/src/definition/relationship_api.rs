// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::Value;

use schema_model::{directive::Directive, field::FieldDef, relation::Relation};

use crate::error::SchemaBuildingError;

/// Further options of a relationship field declared with `relates_to_one`/`relates_to_many`.
#[derive(Debug)]
pub struct RelationshipApi<'a> {
    type_name: String,
    field: &'a mut FieldDef,
}

impl<'a> RelationshipApi<'a> {
    pub(crate) fn new(type_name: String, field: &'a mut FieldDef) -> Self {
        RelationshipApi { type_name, field }
    }

    fn relation(&mut self) -> Option<&mut Relation> {
        self.field.relation.as_mut()
    }

    fn invalid(&self, reason: String) -> SchemaBuildingError {
        SchemaBuildingError::InvalidRelationshipOption {
            type_name: self.type_name.clone(),
            relationship: self.field.name.clone(),
            reason,
        }
    }

    /// Restricts the related documents with a filter (in the filter input format). Repeated
    /// calls are deep-merged; later values win.
    pub fn additional_filter(&mut self, filter: Value) -> Result<&mut Self, SchemaBuildingError> {
        let filter = match filter {
            Value::Object(filter) => filter,
            other => {
                return Err(self.invalid(format!(
                    "`additional_filter` takes an object, got `{other}`"
                )));
            }
        };

        if let Some(relation) = self.relation() {
            relation.merge_additional_filter(filter);
        }
        Ok(self)
    }

    /// Declares that the related type's `remote_path` holds the same value as the field of the
    /// same name on this type.
    pub fn equivalent_field(&mut self, remote_path: &str) -> Result<&mut Self, SchemaBuildingError> {
        self.equivalent_field_locally_named(remote_path, remote_path)
    }

    pub fn equivalent_field_locally_named(
        &mut self,
        remote_path: &str,
        local_path: &str,
    ) -> Result<&mut Self, SchemaBuildingError> {
        let duplicate = self
            .field
            .relation
            .as_ref()
            .is_some_and(|relation| relation.equivalent_fields.contains_key(remote_path));
        if duplicate {
            return Err(self.invalid(format!(
                "`equivalent_field` was declared twice for `{remote_path}`"
            )));
        }

        if let Some(relation) = self.relation() {
            relation
                .equivalent_fields
                .insert(remote_path.to_string(), local_path.to_string());
        }
        Ok(self)
    }

    pub fn documentation(&mut self, documentation: impl Into<String>) -> &mut Self {
        self.field.documentation(documentation);
        self
    }

    pub fn directive(&mut self, directive: Directive) -> &mut Self {
        self.field.directive(directive);
        self
    }

    pub fn field(&mut self) -> &mut FieldDef {
        self.field
    }
}
