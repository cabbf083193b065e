// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolves the declared type graph: the fields of abstract types, embedded cycles, and which
//! types are indexed.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use schema_model::{
    field::FieldDef,
    index::IndexDefinition,
    type_def::{TypeDef, TypeDefKind},
};

use crate::{error::SchemaBuildingError, registry::TypeRegistry};

/// The registry plus everything derived from the shape of its type graph.
#[derive(Debug)]
pub struct ResolvedSchema {
    registry: TypeRegistry,
    /// Effective fields of objects, interfaces and unions.
    fields: BTreeMap<String, Vec<FieldDef>>,
    /// Concrete object types each type stands for (itself, for objects).
    leaves: BTreeMap<String, Vec<String>>,
    /// Abstract types each type is (transitively) a subtype of.
    ancestors: BTreeMap<String, BTreeSet<String>>,
}

impl ResolvedSchema {
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.registry.get(name)
    }

    /// The fields of a composite type. For abstract types this is the union of the fields of the
    /// type itself and all of its subtypes.
    pub fn fields(&self, type_name: &str) -> &[FieldDef] {
        self.fields
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        self.fields(type_name).iter().find(|field| field.name == field_name)
    }

    pub fn leaves(&self, type_name: &str) -> &[String] {
        self.leaves
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn own_index(&self, type_name: &str) -> Option<&IndexDefinition> {
        self.type_def(type_name)
            .and_then(|type_def| type_def.index.as_ref())
    }

    /// The index documents of this type are stored in: its own, or that of an abstract supertype.
    pub fn storing_index(&self, type_name: &str) -> Option<&IndexDefinition> {
        self.own_index(type_name).or_else(|| {
            self.ancestors
                .get(type_name)?
                .iter()
                .find_map(|ancestor| self.own_index(ancestor))
        })
    }

    /// Whether the type can be queried on its own: it has an index, or it is abstract and every
    /// concrete subtype is stored in one.
    pub fn is_indexed(&self, type_name: &str) -> bool {
        if self.own_index(type_name).is_some() {
            return true;
        }

        let is_abstract = self.type_def(type_name).is_some_and(TypeDef::is_abstract);
        let leaves = self.leaves(type_name);
        is_abstract
            && !leaves.is_empty()
            && leaves.iter().all(|leaf| self.storing_index(leaf).is_some())
    }

    /// Whether documents of the type live in an index (directly or through a supertype).
    pub fn is_stored(&self, type_name: &str) -> bool {
        self.is_indexed(type_name) || self.storing_index(type_name).is_some()
    }

    pub fn is_composite(&self, type_name: &str) -> bool {
        self.type_def(type_name).is_some_and(TypeDef::is_composite)
    }

    /// Index names queried for a type: its own index, or those of its concrete subtypes.
    pub fn index_names(&self, type_name: &str) -> Vec<String> {
        if let Some(index) = self.own_index(type_name) {
            return vec![index.name.clone()];
        }
        if !self.type_def(type_name).is_some_and(TypeDef::is_abstract) || !self.is_indexed(type_name) {
            return vec![];
        }

        let names: BTreeSet<_> = self
            .leaves(type_name)
            .iter()
            .filter_map(|leaf| self.storing_index(leaf))
            .map(|index| index.name.clone())
            .collect();
        names.into_iter().collect()
    }

    /// Resolves a dotted field path, returning the field for each segment.
    pub fn resolve_path(&self, type_name: &str, path: &str) -> Result<Vec<&FieldDef>, String> {
        let mut current_type = type_name;
        let mut resolved = vec![];

        for segment in path.split('.') {
            let field = self
                .field(current_type, segment)
                .ok_or_else(|| format!("`{current_type}.{segment}` does not exist"))?;
            resolved.push(field);
            current_type = field.typ.type_name();
        }

        Ok(resolved)
    }

    /// Translates a dotted field path into the path of the same value in the index.
    pub fn index_path(&self, type_name: &str, path: &str) -> Result<String, String> {
        Ok(index_path(&self.resolve_path(type_name, path)?))
    }
}

/// The index path of resolved path segments.
pub(crate) fn index_path(segments: &[&FieldDef]) -> String {
    segments
        .iter()
        .map(|field| field.name_in_index.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

pub fn resolve(registry: TypeRegistry) -> Result<ResolvedSchema, SchemaBuildingError> {
    check_references(&registry)?;

    let fields = FieldUnion::new(&registry).compute()?;
    check_interface_conformance(&registry)?;
    check_embedded_cycles(&registry, &fields)?;

    let (leaves, ancestors) = subtype_closure(&registry);
    let resolved = ResolvedSchema {
        registry,
        fields,
        leaves,
        ancestors,
    };
    check_indexing_consistency(&resolved)?;

    debug!(
        types = resolved.fields.len(),
        "resolved fields of composite types"
    );
    Ok(resolved)
}

fn check_references(registry: &TypeRegistry) -> Result<(), SchemaBuildingError> {
    let unknown = |type_name: &str, referenced: &str, context: String| {
        Err(SchemaBuildingError::UnknownType {
            type_name: type_name.to_string(),
            referenced: referenced.to_string(),
            context,
        })
    };

    for type_def in registry.declared_types() {
        let name = type_def.name.as_str();
        match &type_def.kind {
            TypeDefKind::Object(composite) | TypeDefKind::Interface(composite) => {
                for field in &composite.fields {
                    let referenced = field.typ.type_name();
                    if registry.get(referenced).is_none() {
                        return unknown(name, referenced, format!("type of field `{}`", field.name));
                    }
                    if field.relation.is_some()
                        && !registry.get(referenced).is_some_and(TypeDef::is_composite)
                    {
                        return unknown(
                            name,
                            referenced,
                            format!(
                                "relationship `{}` must refer to an object, interface or union type",
                                field.name
                            ),
                        );
                    }
                }

                for interface in &composite.implements {
                    let is_interface = registry
                        .get(interface)
                        .is_some_and(|i| matches!(i.kind, TypeDefKind::Interface(_)));
                    if !is_interface {
                        return unknown(name, interface, "implemented interface".to_string());
                    }
                }
            }
            TypeDefKind::Union(union) => {
                for subtype in &union.subtypes {
                    if !registry.get(subtype).is_some_and(TypeDef::is_composite) {
                        return unknown(name, subtype, "union subtype".to_string());
                    }
                }
            }
            TypeDefKind::Enum(_) | TypeDefKind::Scalar(_) => {}
        }
    }

    Ok(())
}

/// Computes the union of fields of abstract types, memoized by type name.
struct FieldUnion<'a> {
    registry: &'a TypeRegistry,
    memo: BTreeMap<String, Vec<FieldDef>>,
}

impl<'a> FieldUnion<'a> {
    fn new(registry: &'a TypeRegistry) -> Self {
        FieldUnion {
            registry,
            memo: BTreeMap::new(),
        }
    }

    fn compute(mut self) -> Result<BTreeMap<String, Vec<FieldDef>>, SchemaBuildingError> {
        for type_def in self.registry.iter().filter(|t| t.is_composite()) {
            self.fields_of(&type_def.name, &mut vec![])?;
        }
        Ok(self.memo)
    }

    fn fields_of(
        &mut self,
        type_name: &str,
        stack: &mut Vec<String>,
    ) -> Result<Vec<FieldDef>, SchemaBuildingError> {
        if let Some(fields) = self.memo.get(type_name) {
            return Ok(fields.clone());
        }

        if let Some(position) = stack.iter().position(|entry| entry == type_name) {
            let mut cycle = stack[position..].to_vec();
            cycle.push(type_name.to_string());
            return Err(SchemaBuildingError::AbstractTypeCycle(cycle));
        }

        let Some(type_def) = self.registry.get(type_name) else {
            return Ok(vec![]);
        };

        let fields = match &type_def.kind {
            TypeDefKind::Object(composite) => composite.fields.clone(),
            TypeDefKind::Interface(_) | TypeDefKind::Union(_) => {
                stack.push(type_name.to_string());
                let mut merged = MergedFields::new(type_name);
                merged.add(type_name, type_def.declared_fields())?;

                for subtype in self.registry.subtypes(type_name) {
                    let subtype_fields = self.fields_of(subtype, stack)?;
                    merged.add(subtype, &subtype_fields)?;
                }
                stack.pop();
                merged.into_fields()
            }
            TypeDefKind::Enum(_) | TypeDefKind::Scalar(_) => vec![],
        };

        self.memo.insert(type_name.to_string(), fields.clone());
        Ok(fields)
    }
}

/// Fields merged in first-seen order, remembering which subtype contributed each.
struct MergedFields<'a> {
    abstract_type: &'a str,
    fields: Vec<(FieldDef, String)>,
}

impl<'a> MergedFields<'a> {
    fn new(abstract_type: &'a str) -> Self {
        MergedFields {
            abstract_type,
            fields: vec![],
        }
    }

    fn add(&mut self, subtype: &str, fields: &[FieldDef]) -> Result<(), SchemaBuildingError> {
        for field in fields {
            match self.fields.iter_mut().find(|(f, _)| f.name == field.name) {
                Some((existing, first_subtype)) => {
                    existing.typ = existing.typ.unify(&field.typ).ok_or_else(|| {
                        SchemaBuildingError::FieldTypeConflict {
                            abstract_type: self.abstract_type.to_string(),
                            field: field.name.clone(),
                            first_subtype: first_subtype.clone(),
                            first_type: existing.typ.to_string(),
                            second_subtype: subtype.to_string(),
                            second_type: field.typ.to_string(),
                        }
                    })?;
                }
                None => self.fields.push((field.clone(), subtype.to_string())),
            }
        }
        Ok(())
    }

    fn into_fields(self) -> Vec<FieldDef> {
        self.fields.into_iter().map(|(field, _)| field).collect()
    }
}

fn check_interface_conformance(registry: &TypeRegistry) -> Result<(), SchemaBuildingError> {
    for type_def in registry.declared_types() {
        let Some(composite) = type_def.as_composite() else {
            continue;
        };

        for interface_name in &composite.implements {
            let Some(interface) = registry.get(interface_name) else {
                continue;
            };

            for interface_field in interface.declared_fields() {
                let not_implemented = |reason: String| SchemaBuildingError::InterfaceNotImplemented {
                    type_name: type_def.name.clone(),
                    interface: interface_name.clone(),
                    reason,
                };

                let field = composite
                    .fields
                    .iter()
                    .find(|field| field.name == interface_field.name)
                    .ok_or_else(|| {
                        not_implemented(format!("it does not declare `{}`", interface_field.name))
                    })?;

                if field.typ.unify(&interface_field.typ).as_ref() != Some(&interface_field.typ) {
                    return Err(not_implemented(format!(
                        "`{}: {}` is not compatible with `{}: {}`",
                        field.name, field.typ, interface_field.name, interface_field.typ
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Embedded fields nest documents inside each other, so they must not form a cycle. Relationships
/// are resolved by id and may.
fn check_embedded_cycles(
    registry: &TypeRegistry,
    fields: &BTreeMap<String, Vec<FieldDef>>,
) -> Result<(), SchemaBuildingError> {
    let edges: BTreeMap<&str, Vec<&str>> = registry
        .iter()
        .filter(|type_def| type_def.is_composite())
        .map(|type_def| {
            let targets: Vec<&str> = if type_def.is_abstract() {
                registry.subtypes(&type_def.name)
            } else {
                fields
                    .get(&type_def.name)
                    .into_iter()
                    .flatten()
                    .filter(|field| field.relation.is_none() && !field.graphql_only)
                    .map(|field| field.typ.type_name())
                    .filter(|target| registry.get(target).is_some_and(TypeDef::is_composite))
                    .collect()
            };
            (type_def.name.as_str(), targets)
        })
        .collect();

    let mut finished = BTreeSet::new();
    for start in edges.keys().copied() {
        let mut stack = vec![];
        if let Some(cycle) = find_cycle(start, &edges, &mut stack, &mut finished) {
            return Err(SchemaBuildingError::SelfReferentialTypes(cycle));
        }
    }
    Ok(())
}

fn find_cycle<'a>(
    node: &'a str,
    edges: &BTreeMap<&'a str, Vec<&'a str>>,
    stack: &mut Vec<&'a str>,
    finished: &mut BTreeSet<&'a str>,
) -> Option<Vec<String>> {
    if finished.contains(node) {
        return None;
    }
    if let Some(position) = stack.iter().position(|entry| *entry == node) {
        return Some(stack[position..].iter().map(|s| s.to_string()).collect());
    }

    stack.push(node);
    for target in edges.get(node).into_iter().flatten() {
        if let Some(cycle) = find_cycle(*target, edges, stack, finished) {
            return Some(cycle);
        }
    }
    stack.pop();
    finished.insert(node);
    None
}

type SubtypeClosure = (
    BTreeMap<String, Vec<String>>,
    BTreeMap<String, BTreeSet<String>>,
);

fn subtype_closure(registry: &TypeRegistry) -> SubtypeClosure {
    fn leaves_of(registry: &TypeRegistry, name: &str, leaves: &mut BTreeSet<String>) {
        match registry.get(name).map(|type_def| &type_def.kind) {
            Some(TypeDefKind::Object(_)) => {
                leaves.insert(name.to_string());
            }
            Some(TypeDefKind::Interface(_) | TypeDefKind::Union(_)) => {
                for subtype in registry.subtypes(name) {
                    leaves_of(registry, subtype, leaves);
                }
            }
            _ => {}
        }
    }

    fn descendants_of(registry: &TypeRegistry, name: &str, descendants: &mut BTreeSet<String>) {
        for subtype in registry.subtypes(name) {
            if descendants.insert(subtype.to_string()) {
                descendants_of(registry, subtype, descendants);
            }
        }
    }

    let mut leaves = BTreeMap::new();
    let mut ancestors: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for type_def in registry.iter().filter(|t| t.is_composite()) {
        let mut type_leaves = BTreeSet::new();
        leaves_of(registry, &type_def.name, &mut type_leaves);
        leaves.insert(type_def.name.clone(), type_leaves.into_iter().collect());

        if type_def.is_abstract() {
            let mut descendants = BTreeSet::new();
            descendants_of(registry, &type_def.name, &mut descendants);
            for descendant in descendants {
                ancestors
                    .entry(descendant)
                    .or_default()
                    .insert(type_def.name.clone());
            }
        }
    }

    (leaves, ancestors)
}

fn check_indexing_consistency(resolved: &ResolvedSchema) -> Result<(), SchemaBuildingError> {
    for type_def in resolved.registry.iter().filter(|t| t.is_abstract()) {
        if resolved.storing_index(&type_def.name).is_some() {
            continue;
        }

        let (indexed, not_indexed): (Vec<String>, Vec<String>) = resolved
            .leaves(&type_def.name)
            .iter()
            .cloned()
            .partition(|leaf| resolved.storing_index(leaf).is_some());

        if !indexed.is_empty() && !not_indexed.is_empty() {
            return Err(SchemaBuildingError::InconsistentIndexing {
                abstract_type: type_def.name.clone(),
                indexed,
                not_indexed,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use runtime_metadata::Direction;
    use schema_model::types::TypeReference;

    use super::*;
    use crate::definition::{IndexedTypeApi, SchemaApi};

    fn resolve_with(
        declare: impl FnOnce(&mut SchemaApi<'_>) -> Result<(), SchemaBuildingError>,
    ) -> Result<ResolvedSchema, SchemaBuildingError> {
        let mut registry = TypeRegistry::new();
        declare(&mut SchemaApi::new(&mut registry))?;
        resolve(registry)
    }

    fn field_types(resolved: &ResolvedSchema, type_name: &str) -> Vec<String> {
        resolved
            .fields(type_name)
            .iter()
            .map(|field| format!("{}: {}", field.name, field.typ))
            .collect()
    }

    #[test]
    fn abstract_types_union_their_subtype_fields() {
        let resolved = resolve_with(|schema| {
            schema.object_type("Person", |t| {
                t.implements("Inventor")?;
                t.field("name", "String!")?;
                t.field("age", "Int")?;
                t.field("nationality", "String")?;
                Ok(())
            })?;
            schema.object_type("Company", |t| {
                t.implements("Inventor")?;
                t.field("name", "String!")?;
                t.field("age", "Int!")?;
                t.field("stock_ticker", "String")?;
                Ok(())
            })?;
            schema.interface_type("Inventor", |t| {
                t.field("name", "String!")?;
                Ok(())
            })?;
            schema.union_type("Entity", |t| {
                t.subtypes(&["Person", "Company"])?;
                Ok(())
            })
        })
        .unwrap();

        // Interface fields first, then implementers in name order.
        assert_eq!(
            field_types(&resolved, "Inventor"),
            vec!["name: String!", "age: Int", "stock_ticker: String", "nationality: String"]
        );
        // Union members in declared order.
        assert_eq!(
            field_types(&resolved, "Entity"),
            vec!["name: String!", "age: Int", "nationality: String", "stock_ticker: String"]
        );
    }

    #[test]
    fn conflicting_subtype_fields_are_rejected() {
        for (person_type, company_type) in [("Int", "[Int]"), ("Int", "Float"), ("[Int!]", "[[Int]]")] {
            let result = resolve_with(|schema| {
                schema.object_type("Person", |t| {
                    t.field("age", person_type)?;
                    Ok(())
                })?;
                schema.object_type("Company", |t| {
                    t.field("age", company_type)?;
                    Ok(())
                })?;
                schema.union_type("Inventor", |t| {
                    t.subtypes(&["Person", "Company"])?;
                    Ok(())
                })
            });

            let Err(error) = result else {
                panic!("`{person_type}` and `{company_type}` should conflict");
            };
            assert!(matches!(
                &error,
                SchemaBuildingError::FieldTypeConflict { abstract_type, field, first_subtype, second_subtype, .. }
                    if abstract_type == "Inventor" && field == "age" && first_subtype == "Person" && second_subtype == "Company"
            ), "{error}");
        }
    }

    #[test]
    fn embedded_cycles_are_rejected_with_their_chain() {
        let result = resolve_with(|schema| {
            schema.object_type("Type1", |t| {
                t.field("t2", "Type2")?;
                Ok(())
            })?;
            schema.object_type("Type2", |t| {
                t.field("t3", "Type3")?;
                Ok(())
            })?;
            schema.object_type("Type3", |t| {
                t.field("t1", "Type1")?;
                Ok(())
            })
        });

        let error = result.unwrap_err();
        assert!(matches!(&error, SchemaBuildingError::SelfReferentialTypes(chain)
            if chain == &["Type1", "Type2", "Type3"]));
        assert!(error.to_string().contains("Type1, Type2, Type3"), "{error}");
    }

    #[test]
    fn cycles_through_lists_and_unions_are_rejected() {
        let result = resolve_with(|schema| {
            schema.object_type("Part", |t| {
                t.field("children", "[Thing!]!")?;
                Ok(())
            })?;
            schema.union_type("Thing", |t| {
                t.subtype("Part")?;
                Ok(())
            })
        });

        assert!(matches!(
            result,
            Err(SchemaBuildingError::SelfReferentialTypes(chain)) if chain == ["Part", "Thing"]
        ));
    }

    #[test]
    fn relationship_cycles_are_allowed() {
        let resolved = resolve_with(|schema| {
            schema.object_type("Person", |t| {
                t.field("id", "ID!")?;
                t.field("manager_id", "ID")?;
                t.relates_to_one("manager", "Person", "manager_id", Direction::Out)?;
                t.index("people")?;
                Ok(())
            })
        })
        .unwrap();

        assert!(resolved.is_indexed("Person"));
        assert_eq!(
            resolved.field("Person", "manager").map(|f| &f.typ),
            Some(&TypeReference::named("Person"))
        );
    }

    #[test]
    fn abstract_type_cycles_are_rejected() {
        let result = resolve_with(|schema| {
            schema.interface_type("A", |t| {
                t.implements("B")?;
                Ok(())
            })?;
            schema.interface_type("B", |t| {
                t.implements("A")?;
                Ok(())
            })
        });

        assert!(matches!(result, Err(SchemaBuildingError::AbstractTypeCycle(_))));
    }

    #[test]
    fn subtypes_must_be_uniformly_indexed() {
        let result = resolve_with(|schema| {
            schema.object_type("Person", |t| {
                t.field("id", "ID!")?;
                t.index("people")?;
                Ok(())
            })?;
            schema.object_type("Company", |t| {
                t.field("id", "ID!")?;
                Ok(())
            })?;
            schema.union_type("Inventor", |t| {
                t.subtypes(&["Person", "Company"])?;
                Ok(())
            })
        });

        assert!(matches!(
            result,
            Err(SchemaBuildingError::InconsistentIndexing { abstract_type, indexed, not_indexed })
                if abstract_type == "Inventor" && indexed == ["Person"] && not_indexed == ["Company"]
        ));
    }

    #[test]
    fn indexed_abstract_types_index_their_subtypes() {
        let resolved = resolve_with(|schema| {
            schema.object_type("Person", |t| {
                t.field("id", "ID!")?;
                Ok(())
            })?;
            schema.object_type("Company", |t| {
                t.field("id", "ID!")?;
                Ok(())
            })?;
            schema.union_type("Inventor", |t| {
                t.subtypes(&["Person", "Company"])?;
                t.index("inventors")?;
                Ok(())
            })
        })
        .unwrap();

        assert!(resolved.is_indexed("Inventor"));
        assert!(!resolved.is_indexed("Person"));
        assert!(resolved.is_stored("Person"));
        assert_eq!(
            resolved.storing_index("Company").map(|index| index.name.as_str()),
            Some("inventors")
        );
        assert_eq!(resolved.index_names("Inventor"), vec!["inventors"]);
    }

    #[test]
    fn implementers_must_declare_interface_fields() {
        let result = resolve_with(|schema| {
            schema.interface_type("Named", |t| {
                t.field("name", "String!")?;
                Ok(())
            })?;
            schema.object_type("Widget", |t| {
                t.implements("Named")?;
                t.field("name", "String")?;
                Ok(())
            })
        });

        assert!(matches!(
            result,
            Err(SchemaBuildingError::InterfaceNotImplemented { type_name, interface, .. })
                if type_name == "Widget" && interface == "Named"
        ));
    }

    #[test]
    fn unknown_references_are_rejected() {
        let result = resolve_with(|schema| {
            schema.object_type("Widget", |t| {
                t.field("owner", "Persn")?;
                Ok(())
            })
        });

        assert!(matches!(
            result,
            Err(SchemaBuildingError::UnknownType { type_name, referenced, .. })
                if type_name == "Widget" && referenced == "Persn"
        ));
    }

    #[test]
    fn paths_resolve_through_embedded_fields() {
        let resolved = resolve_with(|schema| {
            schema.object_type("Options", |t| {
                t.field("size", "Int")?;
                Ok(())
            })?;
            schema.object_type("Widget", |t| {
                t.field("options", "Options")?;
                Ok(())
            })
        })
        .unwrap();

        let path = resolved.resolve_path("Widget", "options.size").unwrap();
        assert_eq!(path.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), ["options", "size"]);
        assert_eq!(
            resolved.resolve_path("Widget", "options.color").unwrap_err(),
            "`Options.color` does not exist"
        );
    }
}
