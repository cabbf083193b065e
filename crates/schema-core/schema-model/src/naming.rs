// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The closed set of derived-type families and the name formats they are generated with.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const BASE_PLACEHOLDER: &str = "{base}";
pub const PARENT_TYPES_PLACEHOLDER: &str = "{parent_types}";

static GRAPHQL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[_A-Za-z][_0-9A-Za-z]*$").unwrap());

pub fn is_valid_graphql_name(name: &str) -> bool {
    GRAPHQL_NAME.is_match(name)
}

/// Every kind of type the builder derives from a declared (or built-in) type.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DerivedTypeFamily {
    /// Input-side copy of an enum.
    InputEnum,
    FilterInput,
    ListFilterInput,
    ListElementFilterInput,
    FieldsListFilterInput,
    SortOrderInput,
    GroupedBy,
    AggregatedValues,
    Aggregation,
    Connection,
    Edge,
    SubAggregation,
    SubAggregations,
}

impl DerivedTypeFamily {
    pub const ALL: [DerivedTypeFamily; 13] = [
        DerivedTypeFamily::InputEnum,
        DerivedTypeFamily::FilterInput,
        DerivedTypeFamily::ListFilterInput,
        DerivedTypeFamily::ListElementFilterInput,
        DerivedTypeFamily::FieldsListFilterInput,
        DerivedTypeFamily::SortOrderInput,
        DerivedTypeFamily::GroupedBy,
        DerivedTypeFamily::AggregatedValues,
        DerivedTypeFamily::Aggregation,
        DerivedTypeFamily::Connection,
        DerivedTypeFamily::Edge,
        DerivedTypeFamily::SubAggregation,
        DerivedTypeFamily::SubAggregations,
    ];

    /// The key used for this family in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            DerivedTypeFamily::InputEnum => "InputEnum",
            DerivedTypeFamily::FilterInput => "FilterInput",
            DerivedTypeFamily::ListFilterInput => "ListFilterInput",
            DerivedTypeFamily::ListElementFilterInput => "ListElementFilterInput",
            DerivedTypeFamily::FieldsListFilterInput => "FieldsListFilterInput",
            DerivedTypeFamily::SortOrderInput => "SortOrderInput",
            DerivedTypeFamily::GroupedBy => "GroupedBy",
            DerivedTypeFamily::AggregatedValues => "AggregatedValues",
            DerivedTypeFamily::Aggregation => "Aggregation",
            DerivedTypeFamily::Connection => "Connection",
            DerivedTypeFamily::Edge => "Edge",
            DerivedTypeFamily::SubAggregation => "SubAggregation",
            DerivedTypeFamily::SubAggregations => "SubAggregations",
        }
    }

    pub fn default_format(&self) -> &'static str {
        match self {
            DerivedTypeFamily::InputEnum => "{base}Input",
            DerivedTypeFamily::FilterInput => "{base}FilterInput",
            DerivedTypeFamily::ListFilterInput => "{base}ListFilterInput",
            DerivedTypeFamily::ListElementFilterInput => "{base}ListElementFilterInput",
            DerivedTypeFamily::FieldsListFilterInput => "{base}FieldsListFilterInput",
            DerivedTypeFamily::SortOrderInput => "{base}SortOrderInput",
            DerivedTypeFamily::GroupedBy => "{base}GroupedBy",
            DerivedTypeFamily::AggregatedValues => "{base}AggregatedValues",
            DerivedTypeFamily::Aggregation => "{base}Aggregation",
            DerivedTypeFamily::Connection => "{base}Connection",
            DerivedTypeFamily::Edge => "{base}Edge",
            DerivedTypeFamily::SubAggregation => "{parent_types}{base}SubAggregation",
            DerivedTypeFamily::SubAggregations => "{base}SubAggregations",
        }
    }

    /// Placeholders a format for this family must contain.
    pub fn required_placeholders(&self) -> &'static [&'static str] {
        match self {
            DerivedTypeFamily::SubAggregation => &[PARENT_TYPES_PLACEHOLDER, BASE_PLACEHOLDER],
            _ => &[BASE_PLACEHOLDER],
        }
    }
}

impl fmt::Display for DerivedTypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DerivedTypeFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DerivedTypeFamily::ALL
            .into_iter()
            .find(|family| family.key() == s)
            .ok_or_else(|| {
                let known: Vec<_> = DerivedTypeFamily::ALL.iter().map(|f| f.key()).collect();
                format!(
                    "Unknown derived type family `{s}`. Known families: {}",
                    known.join(", ")
                )
            })
    }
}

/// Applies a name format.
pub fn apply_format(format: &str, base: &str, parent_types: &str) -> String {
    format
        .replace(PARENT_TYPES_PLACEHOLDER, parent_types)
        .replace(BASE_PLACEHOLDER, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiplatform_test::multiplatform_test;

    #[multiplatform_test]
    fn graphql_names() {
        assert!(is_valid_graphql_name("Widget"));
        assert!(is_valid_graphql_name("_private2"));
        assert!(!is_valid_graphql_name("2Widget"));
        assert!(!is_valid_graphql_name("[Widget]"));
        assert!(!is_valid_graphql_name("Widget!"));
        assert!(!is_valid_graphql_name(""));
    }

    #[multiplatform_test]
    fn family_keys_round_trip() {
        for family in DerivedTypeFamily::ALL {
            assert_eq!(family.key().parse::<DerivedTypeFamily>(), Ok(family));
            for placeholder in family.required_placeholders() {
                assert!(family.default_format().contains(placeholder));
            }
        }
        assert!("Filter".parse::<DerivedTypeFamily>().is_err());
    }

    #[multiplatform_test]
    fn formats() {
        assert_eq!(
            apply_format(DerivedTypeFamily::SubAggregation.default_format(), "Player", "Team"),
            "TeamPlayerSubAggregation"
        );
        assert_eq!(apply_format("{base}Filter", "Widget", ""), "WidgetFilter");
    }
}
