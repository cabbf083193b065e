// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Update targets: the writes the indexer performs when a document is ingested.
//!
//! Every stored type gets a `__self` target indexing its own fields. A relationship used by
//! `sourced_from` fields gets a target on the related type, copying the sourced values into the
//! documents that reference it. Each `derive_indexed_type_fields` declaration gets a target on the
//! declaring type, accumulating values into the destination type's documents.
//!
//! Targets are keyed by the (logical) name of the type whose ingestion triggers them. Paths in
//! targets are index paths (`name_in_index` segments). All problems found along the way,
//! including invalid relationship foreign keys, are reported together.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use runtime_metadata::{
    Cardinality, Direction, DynamicParam, INDEX_DATA_UPDATE_SCRIPT_ID, Param,
    SELF_RELATIONSHIP_NAME, UpdateTarget,
};
use schema_model::{
    field::FieldDef,
    index::IndexDefinition,
    relation::Relation,
    type_def::{DerivedIndexedType, TypeDef, TypeDefKind},
};

use crate::{
    built_in_types::ID,
    error::SchemaBuildingError,
    type_graph_resolver::{ResolvedSchema, index_path},
};

pub(crate) type UpdateTargetsByType = BTreeMap<String, Vec<UpdateTarget>>;

pub(crate) fn build_update_targets(
    resolved: &ResolvedSchema,
) -> Result<UpdateTargetsByType, SchemaBuildingError> {
    let mut builder = UpdateTargetBuilder {
        resolved,
        targets: BTreeMap::new(),
        foreign_keys: BTreeMap::new(),
        problems: vec![],
    };

    for type_def in resolved.registry().declared_types() {
        builder.check_foreign_keys(type_def);
    }

    for type_def in resolved.registry().declared_types() {
        if !matches!(type_def.kind, TypeDefKind::Object(_)) {
            continue;
        }

        let index = resolved
            .storing_index(&type_def.name)
            .filter(|_| !type_def.graphql_only);
        if let Some(index) = index {
            builder.self_target(type_def, index);
        }
        builder.sourced_from_targets(type_def, index);

        if type_def.graphql_only {
            continue;
        }
        if let Some(composite) = type_def.as_composite() {
            for derived in &composite.derived_indexed_types {
                builder.derived_indexed_type_target(type_def, derived);
            }
        }
    }

    if !builder.problems.is_empty() {
        return Err(SchemaBuildingError::InvalidRelationships(builder.problems));
    }

    debug!(
        types = builder.targets.len(),
        "built update targets"
    );
    Ok(builder.targets)
}

struct UpdateTargetBuilder<'a> {
    resolved: &'a ResolvedSchema,
    targets: UpdateTargetsByType,
    /// Index paths of the valid foreign keys, by owning type and relationship.
    foreign_keys: BTreeMap<(String, String), String>,
    problems: Vec<String>,
}

impl<'a> UpdateTargetBuilder<'a> {
    fn add(&mut self, ingested_type: &str, target: UpdateTarget) {
        self.targets
            .entry(ingested_type.to_string())
            .or_default()
            .push(target);
    }

    fn self_target(&mut self, type_def: &TypeDef, index: &IndexDefinition) {
        let data_params = self
            .resolved
            .fields(&type_def.name)
            .iter()
            .filter(|field| field.is_indexed() && field.sourced_from.is_none())
            .map(|field| {
                (
                    field.name_in_index.clone(),
                    DynamicParam {
                        source_path: field.name_in_index.clone(),
                        cardinality: Cardinality::One,
                    },
                )
            })
            .collect();

        self.add(
            &type_def.name,
            UpdateTarget {
                type_name: type_def.name.clone(),
                relationship: Some(SELF_RELATIONSHIP_NAME.to_string()),
                script_id: INDEX_DATA_UPDATE_SCRIPT_ID.to_string(),
                id_source: "id".to_string(),
                routing_value_source: index
                    .route_with
                    .as_deref()
                    .map(|path| self.own_index_path(&type_def.name, path)),
                rollover_timestamp_value_source: index
                    .rollover
                    .as_ref()
                    .map(|rollover| self.own_index_path(&type_def.name, &rollover.timestamp_field_path)),
                data_params,
                metadata_params: metadata_params(&type_def.name, SELF_RELATIONSHIP_NAME),
            },
        );
    }

    /// Index path of a path on the type's own index definition. Those paths are checked when the
    /// index definition is resolved.
    fn own_index_path(&self, type_name: &str, path: &str) -> String {
        self.resolved
            .index_path(type_name, path)
            .unwrap_or_else(|_| path.to_string())
    }

    /// Checks the foreign key of every relationship of `type_def`: it must resolve on the owning
    /// type (outbound) or the related type (inbound) to an indexed `ID` field.
    fn check_foreign_keys(&mut self, type_def: &TypeDef) {
        for field in type_def.declared_fields() {
            let Some(relation) = &field.relation else {
                continue;
            };
            let key_type = match relation.direction {
                Direction::In => relation.related_type.as_str(),
                Direction::Out => type_def.name.as_str(),
            };
            let owner = type_def.name.as_str();
            let relationship = field.name.as_str();

            let Some(segments) = self.resolve_path(key_type, &relation.foreign_key, || {
                format!("the foreign key of `{owner}.{relationship}`")
            }) else {
                continue;
            };
            let Some(foreign_key) = segments.last() else {
                continue;
            };
            if foreign_key.typ.type_name() != ID || !foreign_key.is_indexed() {
                self.problems.push(format!(
                    "The foreign key `{key_type}.{}` of `{owner}.{relationship}` must be an indexed `ID` field, but it is `{}`{}.",
                    relation.foreign_key,
                    foreign_key.typ,
                    if foreign_key.is_indexed() { "" } else { " and is not indexed" }
                ));
                continue;
            }

            self.foreign_keys.insert(
                (owner.to_string(), relationship.to_string()),
                index_path(&segments),
            );
        }
    }

    fn sourced_from_targets(&mut self, type_def: &TypeDef, index: Option<&IndexDefinition>) {
        let mut by_relationship: BTreeMap<&str, Vec<&FieldDef>> = BTreeMap::new();
        for field in type_def.declared_fields() {
            if let Some(sourced_from) = &field.sourced_from {
                by_relationship
                    .entry(sourced_from.relationship.as_str())
                    .or_default()
                    .push(field);
            }
        }

        let type_name = type_def.name.as_str();
        if index.is_none() && !by_relationship.is_empty() {
            let fields: Vec<String> = by_relationship
                .values()
                .flatten()
                .map(|field| format!("`{type_name}.{}`", field.name))
                .collect();
            self.problems.push(format!(
                "{} {} `sourced_from` another type, but `{type_name}` is not an indexed type. Only fields of indexed types can be sourced from related documents.",
                fields.join(", "),
                if fields.len() == 1 { "is" } else { "are" }
            ));
        }

        for (relationship, fields) in by_relationship {
            let Some(relation) = self.sourcing_relation(type_name, relationship) else {
                continue;
            };
            let related_type = relation.related_type.as_str();
            let foreign_key = self
                .foreign_keys
                .get(&(type_name.to_string(), relationship.to_string()))
                .cloned();

            let mut data_params = BTreeMap::new();
            for field in fields {
                let Some(sourced_from) = &field.sourced_from else {
                    continue;
                };
                if let Some(source_path) =
                    self.check_sourced_field(type_name, related_type, field, &sourced_from.field_path)
                {
                    data_params.insert(
                        field.name_in_index.clone(),
                        DynamicParam {
                            source_path,
                            cardinality: Cardinality::One,
                        },
                    );
                }
            }

            let (Some(index), Some(foreign_key)) = (index, foreign_key) else {
                continue;
            };
            let routing_value_source = index.route_with.as_deref().and_then(|local_path| {
                self.equivalent_source(
                    type_name,
                    relationship,
                    relation,
                    &foreign_key,
                    local_path,
                    "custom shard routing",
                )
            });
            let rollover_timestamp_value_source = index.rollover.as_ref().and_then(|rollover| {
                self.equivalent_source(
                    type_name,
                    relationship,
                    relation,
                    &foreign_key,
                    &rollover.timestamp_field_path,
                    "a rollover index",
                )
            });

            self.add(
                related_type,
                UpdateTarget {
                    type_name: type_name.to_string(),
                    relationship: Some(relationship.to_string()),
                    script_id: INDEX_DATA_UPDATE_SCRIPT_ID.to_string(),
                    id_source: foreign_key,
                    routing_value_source,
                    rollover_timestamp_value_source,
                    data_params,
                    metadata_params: metadata_params(related_type, relationship),
                },
            );
        }
    }

    /// The relation of a `sourced_from` relationship, if it is one `sourced_from` can use.
    fn sourcing_relation(&mut self, type_name: &str, relationship: &str) -> Option<&'a Relation> {
        let resolved: &'a ResolvedSchema = self.resolved;
        let Some(relation) = resolved
            .field(type_name, relationship)
            .and_then(|field| field.relation.as_ref())
        else {
            self.problems.push(format!(
                "`{type_name}` has fields `sourced_from` the `{relationship}` relationship, which does not exist."
            ));
            return None;
        };

        let mut usable = true;
        if relation.cardinality != Cardinality::One {
            usable = false;
            self.problems.push(format!(
                "`{type_name}.{relationship}` is used by `sourced_from` fields, so it must be a `relates_to_one` relationship."
            ));
        }
        if relation.direction != Direction::In {
            usable = false;
            self.problems.push(format!(
                "`{type_name}.{relationship}` is used by `sourced_from` fields, so it must use `Direction::In` (the foreign key lives on `{}`).",
                relation.related_type
            ));
        }
        if !relation.additional_filter.is_empty() {
            usable = false;
            self.problems.push(format!(
                "`{type_name}.{relationship}` is used by `sourced_from` fields, so it cannot have an `additional_filter`."
            ));
        }
        usable.then_some(relation)
    }

    /// Checks a `sourced_from` field against its source, returning the source's index path.
    fn check_sourced_field(
        &mut self,
        type_name: &str,
        related_type: &str,
        field: &FieldDef,
        path: &str,
    ) -> Option<String> {
        let segments = self.resolve_path(related_type, path, || {
            format!("`{type_name}.{}` (`sourced_from`)", field.name)
        })?;
        let source = segments.last()?;

        let mut valid = true;
        if source.typ.stripped() != field.typ.stripped() {
            valid = false;
            self.problems.push(format!(
                "The type of `{type_name}.{}` is `{}`, but the type of its source `{related_type}.{path}` is `{}`. These must agree (ignoring nullability).",
                field.name, field.typ, source.typ
            ));
        }
        if !field.typ.is_nullable() {
            valid = false;
            self.problems.push(format!(
                "`{type_name}.{}` is `sourced_from` another type, so it must be nullable (it has no value until the related document is ingested), but it is `{}`.",
                field.name, field.typ
            ));
        }
        valid.then(|| index_path(&segments))
    }

    /// The index path on the related type whose value equals `local_path` on `type_name`.
    fn equivalent_source(
        &mut self,
        type_name: &str,
        relationship: &str,
        relation: &Relation,
        foreign_key: &str,
        local_path: &str,
        feature: &str,
    ) -> Option<String> {
        if local_path == "id" {
            return Some(foreign_key.to_string());
        }

        match relation.remote_path_equivalent_to(local_path) {
            Some(remote_path) => {
                let segments = self.resolve_path(&relation.related_type, remote_path, || {
                    format!("the `equivalent_field` of `{type_name}.{relationship}`")
                })?;
                Some(index_path(&segments))
            }
            None => {
                self.problems.push(format!(
                    "`{type_name}` uses {feature} on `{local_path}`, so `{type_name}.{relationship}` must declare an `equivalent_field` mapping a field of `{}` to `{local_path}`.",
                    relation.related_type
                ));
                None
            }
        }
    }

    fn derived_indexed_type_target(&mut self, source: &TypeDef, derived: &DerivedIndexedType) {
        let source_type = source.name.as_str();
        let destination = derived.destination_type.as_str();
        let context = || format!("`derive_indexed_type_fields` of `{source_type}` into `{destination}`");

        let Some(destination_index) = self.resolved.storing_index(destination) else {
            self.problems.push(format!(
                "{} names a destination type that is not an indexed type.",
                context()
            ));
            return;
        };
        let requires_routing = destination_index.has_custom_routing();
        let requires_rollover = destination_index.rollover.is_some();

        let id_source = self
            .resolve_path(source_type, &derived.from_id, context)
            .map(|segments| index_path(&segments));
        let mut valid = id_source.is_some();

        if requires_routing && derived.route_with.is_none() {
            valid = false;
            self.problems.push(format!(
                "{} must specify `route_with` since `{destination}` uses custom shard routing.",
                context()
            ));
        }
        if requires_rollover && derived.rollover_with.is_none() {
            valid = false;
            self.problems.push(format!(
                "{} must specify `rollover_with` since `{destination}` uses a rollover index.",
                context()
            ));
        }
        let mut source_index_path = |path: &Option<String>| -> Option<String> {
            let segments = self.resolve_path(source_type, path.as_deref()?, context)?;
            Some(index_path(&segments))
        };
        let routing_value_source = source_index_path(&derived.route_with);
        let rollover_timestamp_value_source = source_index_path(&derived.rollover_with);
        valid &= derived.route_with.is_none() || routing_value_source.is_some();
        valid &= derived.rollover_with.is_none() || rollover_timestamp_value_source.is_some();

        let mut data_params = BTreeMap::new();
        for derivation in &derived.derivations {
            let resolved: &'a ResolvedSchema = self.resolved;
            let destination_field = resolved.field(destination, &derivation.destination_field);
            if destination_field.is_none() {
                valid = false;
                self.problems.push(format!(
                    "{} derives `{destination}.{}`, which does not exist.",
                    context(),
                    derivation.destination_field
                ));
            }
            let source_path = self
                .resolve_path(source_type, &derivation.source_field, context)
                .map(|segments| index_path(&segments));

            if let (Some(destination_field), Some(source_path)) = (destination_field, source_path) {
                data_params.insert(
                    destination_field.name_in_index.clone(),
                    DynamicParam {
                        source_path,
                        cardinality: Cardinality::Many,
                    },
                );
            } else {
                valid = false;
            }
        }

        let Some(id_source) = id_source.filter(|_| valid) else {
            return;
        };

        self.add(
            source_type,
            UpdateTarget {
                type_name: destination.to_string(),
                relationship: None,
                script_id: derived_indexed_type_script_id(source_type, derived),
                id_source,
                routing_value_source,
                rollover_timestamp_value_source,
                data_params,
                metadata_params: BTreeMap::from([(
                    "sourceType".to_string(),
                    Param::static_value(source_type),
                )]),
            },
        );
    }

    /// Resolves a dotted path, recording a problem when a segment is missing or when the path
    /// passes through a list.
    fn resolve_path(
        &mut self,
        type_name: &str,
        path: &str,
        context: impl FnOnce() -> String,
    ) -> Option<Vec<&'a FieldDef>> {
        let resolved: &'a ResolvedSchema = self.resolved;
        match resolved.resolve_path(type_name, path) {
            Ok(segments) => {
                let through_list = segments
                    .iter()
                    .take(segments.len().saturating_sub(1))
                    .find(|segment| segment.typ.is_list());
                if let Some(list) = through_list {
                    self.problems.push(format!(
                        "The path `{type_name}.{path}` used by {} passes through the list field `{}`.",
                        context(),
                        list.name
                    ));
                    return None;
                }
                Some(segments)
            }
            Err(reason) => {
                self.problems.push(format!(
                    "The path `{type_name}.{path}` used by {} cannot be resolved: {reason}.",
                    context()
                ));
                None
            }
        }
    }
}

fn metadata_params(source_type: &str, relationship: &str) -> BTreeMap<String, Param> {
    BTreeMap::from([
        ("relationship".to_string(), Param::static_value(relationship)),
        ("sourceId".to_string(), Param::dynamic("id")),
        ("sourceType".to_string(), Param::static_value(source_type)),
        ("version".to_string(), Param::dynamic("__version")),
    ])
}

/// Derivation scripts are identified by what they do, so that identical declarations share a
/// script.
fn derived_indexed_type_script_id(source_type: &str, derived: &DerivedIndexedType) -> String {
    let mut description = format!("{}<-{source_type}:{}", derived.destination_type, derived.from_id);
    for derivation in &derived.derivations {
        description.push_str(&format!(
            ";{}:{}<-{}",
            derivation.kind.name(),
            derivation.destination_field,
            derivation.source_field
        ));
    }

    let digest = format!("{:x}", Sha256::digest(description.as_bytes()));
    format!(
        "update_{}_from_{source_type}_{}",
        derived.destination_type,
        &digest[..32]
    )
}
