// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The GraphQL type graph produced by a build: declared, built-in and derived types alike.
//!
//! Everything downstream of derivation (customizations, extensions, naming, SDL emission and
//! runtime metadata) works on these types rather than on the declarations.

use async_graphql_value::ConstValue;
use runtime_metadata::{ComputationDetail, ElasticGraphCategory, RelationMetadata, SortField};

use crate::{directive::Directive, naming::DerivedTypeFamily, types::TypeReference};

#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLType {
    pub name: String,
    pub kind: GraphQLTypeKind,
    /// Fields of object and interface types, or input fields of input object types.
    pub fields: Vec<GraphQLField>,
    pub enum_values: Vec<GraphQLEnumValue>,
    pub documentation: Option<String>,
    pub directives: Vec<Directive>,
    pub origin: TypeOrigin,
    pub category: Option<ElasticGraphCategory>,
    pub graphql_only_return_type: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphQLTypeKind {
    Object { implements: Vec<String> },
    Interface { implements: Vec<String> },
    Union { members: Vec<String> },
    Enum,
    InputObject,
    Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeOrigin {
    BuiltIn,
    Declared,
    Derived {
        /// Logical name of the type whose declaration's customizations apply.
        source_type: String,
        family: DerivedTypeFamily,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLField {
    pub name: String,
    pub typ: TypeReference,
    pub arguments: Vec<GraphQLArgument>,
    /// Default value of an input field.
    pub default_value: Option<ConstValue>,
    pub documentation: Option<String>,
    pub directives: Vec<Directive>,
    /// The index field this field reads, when it reads one.
    pub name_in_index: Option<String>,
    pub relation: Option<RelationMetadata>,
    pub computation: Option<ComputationDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLArgument {
    pub name: String,
    pub typ: TypeReference,
    pub default_value: Option<ConstValue>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLEnumValue {
    pub name: String,
    pub documentation: Option<String>,
    pub directives: Vec<Directive>,
    pub sort_field: Option<SortField>,
}

impl GraphQLType {
    fn new(name: impl Into<String>, kind: GraphQLTypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: vec![],
            enum_values: vec![],
            documentation: None,
            directives: vec![],
            origin: TypeOrigin::BuiltIn,
            category: None,
            graphql_only_return_type: false,
        }
    }

    pub fn object(name: impl Into<String>, fields: Vec<GraphQLField>) -> Self {
        Self {
            fields,
            ..Self::new(name, GraphQLTypeKind::Object { implements: vec![] })
        }
    }

    pub fn interface(name: impl Into<String>, fields: Vec<GraphQLField>) -> Self {
        Self {
            fields,
            ..Self::new(name, GraphQLTypeKind::Interface { implements: vec![] })
        }
    }

    pub fn union(name: impl Into<String>, members: Vec<String>) -> Self {
        Self::new(name, GraphQLTypeKind::Union { members })
    }

    pub fn input_object(name: impl Into<String>, fields: Vec<GraphQLField>) -> Self {
        Self {
            fields,
            ..Self::new(name, GraphQLTypeKind::InputObject)
        }
    }

    pub fn enum_type(name: impl Into<String>, enum_values: Vec<GraphQLEnumValue>) -> Self {
        Self {
            enum_values,
            ..Self::new(name, GraphQLTypeKind::Enum)
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, GraphQLTypeKind::Scalar)
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn with_origin(mut self, origin: TypeOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn derived_from(self, source_type: &str, family: DerivedTypeFamily) -> Self {
        self.with_origin(TypeOrigin::Derived {
            source_type: source_type.to_string(),
            family,
        })
    }

    pub fn with_category(mut self, category: ElasticGraphCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn field(&self, name: &str) -> Option<&GraphQLField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut GraphQLField> {
        self.fields.iter_mut().find(|field| field.name == name)
    }

    /// The names that `customize_derived_type_fields` can address: fields, or enum values.
    pub fn member_names(&self) -> Vec<&str> {
        match self.kind {
            GraphQLTypeKind::Enum => self.enum_values.iter().map(|v| v.name.as_str()).collect(),
            _ => self.fields.iter().map(|f| f.name.as_str()).collect(),
        }
    }

    pub fn source_type(&self) -> Option<&str> {
        match &self.origin {
            TypeOrigin::Derived { source_type, .. } => Some(source_type),
            _ => None,
        }
    }

    pub fn is_built_in(&self) -> bool {
        self.origin == TypeOrigin::BuiltIn
    }
}

impl GraphQLField {
    pub fn new(name: impl Into<String>, typ: TypeReference) -> Self {
        Self {
            name: name.into(),
            typ,
            arguments: vec![],
            default_value: None,
            documentation: None,
            directives: vec![],
            name_in_index: None,
            relation: None,
            computation: None,
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Sets the documentation unless `documentation` is `None`.
    pub fn with_documentation_opt(mut self, documentation: Option<String>) -> Self {
        if documentation.is_some() {
            self.documentation = documentation;
        }
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<GraphQLArgument>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_default_value(mut self, value: impl Into<ConstValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_name_in_index(mut self, name_in_index: impl Into<String>) -> Self {
        self.name_in_index = Some(name_in_index.into());
        self
    }

    pub fn with_computation(mut self, computation: ComputationDetail) -> Self {
        self.computation = Some(computation);
        self
    }
}

impl GraphQLArgument {
    pub fn new(name: impl Into<String>, typ: TypeReference) -> Self {
        Self {
            name: name.into(),
            typ,
            default_value: None,
            documentation: None,
        }
    }

    pub fn with_default_value(mut self, value: impl Into<ConstValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

impl GraphQLEnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            directives: vec![],
            sort_field: None,
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}
