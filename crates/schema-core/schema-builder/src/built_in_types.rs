// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Scalars, enums and helper types every schema starts with.

use async_graphql_value::ConstValue;
use runtime_metadata::{AggregationFunction, ComputationDetail, ElasticGraphCategory};
use schema_model::{
    graphql::{GraphQLArgument, GraphQLEnumValue, GraphQLField, GraphQLType},
    naming::DerivedTypeFamily,
    type_def::{EnumTypeDef, EnumValueDef, ScalarAggregation, ScalarTypeDef, TypeDef, TypeDefKind},
    types::TypeReference,
};

use crate::{config::NamingConfig, registry::TypeRegistry};

pub const ID: &str = "ID";
pub const STRING: &str = "String";
pub const INT: &str = "Int";
pub const FLOAT: &str = "Float";
pub const BOOLEAN: &str = "Boolean";
pub const CURSOR: &str = "Cursor";
pub const DATE: &str = "Date";
pub const DATE_TIME: &str = "DateTime";
pub const LOCAL_TIME: &str = "LocalTime";
pub const TIME_ZONE: &str = "TimeZone";
pub const JSON_SAFE_LONG: &str = "JsonSafeLong";
pub const LONG_STRING: &str = "LongString";
pub const UNTYPED: &str = "Untyped";

pub const PAGE_INFO: &str = "PageInfo";
pub const NON_NUMERIC_AGGREGATED_VALUES: &str = "NonNumericAggregatedValues";
pub const TEXT_FILTER_INPUT: &str = "TextFilterInput";
pub const TEXT_LIST_FILTER_INPUT: &str = "TextListFilterInput";
pub const TEXT_LIST_ELEMENT_FILTER_INPUT: &str = "TextListElementFilterInput";
pub const MATCHES_QUERY_FILTER_INPUT: &str = "MatchesQueryFilterInput";
pub const MATCHES_PHRASE_FILTER_INPUT: &str = "MatchesPhraseFilterInput";
pub const DATE_TIME_TIME_OF_DAY_FILTER_INPUT: &str = "DateTimeTimeOfDayFilterInput";
pub const DATE_GROUPING_OFFSET_INPUT: &str = "DateGroupingOffsetInput";
pub const DATE_TIME_GROUPING_OFFSET_INPUT: &str = "DateTimeGroupingOffsetInput";
pub const DAY_OF_WEEK_GROUPING_OFFSET_INPUT: &str = "DayOfWeekGroupingOffsetInput";
pub const LOCAL_TIME_GROUPING_OFFSET_INPUT: &str = "LocalTimeGroupingOffsetInput";

pub const DAY_OF_WEEK: &str = "DayOfWeek";
pub const DATE_UNIT: &str = "DateUnit";
pub const DATE_TIME_UNIT: &str = "DateTimeUnit";
pub const LOCAL_TIME_UNIT: &str = "LocalTimeUnit";
pub const DATE_GROUPING_TRUNCATION_UNIT: &str = "DateGroupingTruncationUnit";
pub const DATE_TIME_GROUPING_TRUNCATION_UNIT: &str = "DateTimeGroupingTruncationUnit";
pub const LOCAL_TIME_GROUPING_TRUNCATION_UNIT: &str = "LocalTimeGroupingTruncationUnit";
pub const DATE_GROUPING_GRANULARITY: &str = "DateGroupingGranularity";
pub const DATE_TIME_GROUPING_GRANULARITY: &str = "DateTimeGroupingGranularity";
pub const MATCHES_QUERY_ALLOWED_EDITS_PER_TERM: &str = "MatchesQueryAllowedEditsPerTerm";

/// Scalars defined by GraphQL itself; never printed.
pub const STANDARD_SCALARS: [&str; 5] = [ID, STRING, INT, FLOAT, BOOLEAN];

const GRAPHQL_ONLY_TYPES: [&str; 13] = [
    PAGE_INFO,
    NON_NUMERIC_AGGREGATED_VALUES,
    TEXT_FILTER_INPUT,
    TEXT_LIST_FILTER_INPUT,
    TEXT_LIST_ELEMENT_FILTER_INPUT,
    MATCHES_QUERY_FILTER_INPUT,
    MATCHES_PHRASE_FILTER_INPUT,
    DATE_TIME_TIME_OF_DAY_FILTER_INPUT,
    DATE_GROUPING_OFFSET_INPUT,
    DATE_TIME_GROUPING_OFFSET_INPUT,
    DAY_OF_WEEK_GROUPING_OFFSET_INPUT,
    LOCAL_TIME_GROUPING_OFFSET_INPUT,
    crate::derived::query_builder::QUERY_TYPE,
];

pub(crate) fn register_built_in_types(registry: &mut TypeRegistry) {
    let scalars = [
        scalar(ID, "keyword", |_| {}),
        scalar(STRING, "keyword", |_| {}),
        scalar(INT, "integer", |s| {
            s.ordered = true;
            s.aggregation = ScalarAggregation::Integer;
        }),
        scalar(FLOAT, "double", |s| {
            s.ordered = true;
            s.aggregation = ScalarAggregation::Float;
        }),
        scalar(BOOLEAN, "boolean", |_| {}),
        scalar(CURSOR, "keyword", |s| s.indexable = false)
            .with_documentation("An opaque string value representing a specific location in a paginated connection type."),
        scalar(DATE, "date", |s| {
            s.ordered = true;
            s.aggregation = ScalarAggregation::Temporal;
        })
        .with_documentation("A date, represented as an ISO 8601 date string (`YYYY-MM-DD`)."),
        scalar(DATE_TIME, "date", |s| {
            s.ordered = true;
            s.aggregation = ScalarAggregation::Temporal;
            s.time_of_day_filter = true;
        })
        .with_documentation("A timestamp, represented as an ISO 8601 time string."),
        scalar(LOCAL_TIME, "date", |s| {
            s.ordered = true;
            s.aggregation = ScalarAggregation::Temporal;
        })
        .with_documentation("A local time such as `\"23:59:33\"` or `\"07:20:47.454\"` without a time zone or offset."),
        scalar(TIME_ZONE, "keyword", |_| {})
            .with_documentation("An IANA time zone identifier, such as `America/Los_Angeles` or `UTC`."),
        scalar(JSON_SAFE_LONG, "long", |s| {
            s.ordered = true;
            s.aggregation = ScalarAggregation::SafeLong;
        })
        .with_documentation("A numeric type for large integer values that can be serialized as a JSON number without loss of precision."),
        scalar(LONG_STRING, "long", |s| {
            s.ordered = true;
            s.aggregation = ScalarAggregation::LongString;
        })
        .with_documentation("A numeric type for large integer values, serialized as strings to avoid loss of precision."),
        scalar(UNTYPED, "keyword", |_| {})
            .with_documentation("A custom scalar type that allows any type of data, including arbitrary JSON."),
    ];

    let enums = [
        enum_type(
            DAY_OF_WEEK,
            "Indicates the specific day of the week.",
            &["MONDAY", "TUESDAY", "WEDNESDAY", "THURSDAY", "FRIDAY", "SATURDAY", "SUNDAY"],
        ),
        enum_type(DATE_UNIT, "Enumeration of `Date` units.", &["DAY"]),
        enum_type(
            DATE_TIME_UNIT,
            "Enumeration of `DateTime` units.",
            &["DAY", "HOUR", "MINUTE", "SECOND", "MILLISECOND"],
        ),
        enum_type(
            LOCAL_TIME_UNIT,
            "Enumeration of `LocalTime` units.",
            &["HOUR", "MINUTE", "SECOND", "MILLISECOND"],
        ),
        enum_type(
            DATE_GROUPING_TRUNCATION_UNIT,
            "Enumerates the supported truncation units of a `Date`.",
            &["YEAR", "QUARTER", "MONTH", "WEEK", "DAY"],
        ),
        enum_type(
            DATE_TIME_GROUPING_TRUNCATION_UNIT,
            "Enumerates the supported truncation units of a `DateTime`.",
            &["YEAR", "QUARTER", "MONTH", "WEEK", "DAY", "HOUR", "MINUTE", "SECOND"],
        ),
        enum_type(
            LOCAL_TIME_GROUPING_TRUNCATION_UNIT,
            "Enumerates the supported truncation units of a `LocalTime`.",
            &["HOUR", "MINUTE", "SECOND"],
        ),
        enum_type(
            DATE_GROUPING_GRANULARITY,
            "Enumerates the supported granularities of a `Date`.",
            &["YEAR", "QUARTER", "MONTH", "WEEK", "DAY"],
        ),
        enum_type(
            DATE_TIME_GROUPING_GRANULARITY,
            "Enumerates the supported granularities of a `DateTime`.",
            &["YEAR", "QUARTER", "MONTH", "WEEK", "DAY", "HOUR", "MINUTE", "SECOND"],
        ),
        enum_type(
            MATCHES_QUERY_ALLOWED_EDITS_PER_TERM,
            "Enumeration of allowed values for the `matches_query: {allowed_edits_per_term: ...}` filter option.",
            &["NONE", "ONE", "TWO", "DYNAMIC"],
        ),
    ];

    // Built-in names are distinct constants, so registration cannot collide.
    for type_def in scalars.into_iter().chain(enums) {
        let _ = registry.register(type_def.built_in());
    }

    for name in GRAPHQL_ONLY_TYPES {
        registry.reserve_name(name);
    }
}

fn scalar(name: &str, mapping_type: &str, configure: impl FnOnce(&mut ScalarTypeDef)) -> TypeDef {
    let mut scalar = ScalarTypeDef::new(mapping_type);
    configure(&mut scalar);
    TypeDef::new(name, TypeDefKind::Scalar(scalar))
}

fn enum_type(name: &str, documentation: &str, values: &[&str]) -> TypeDef {
    let values = values
        .iter()
        .map(|value| EnumValueDef {
            name: value.to_string(),
            documentation: None,
            directives: vec![],
        })
        .collect();

    TypeDef::new(name, TypeDefKind::Enum(EnumTypeDef { values })).with_documentation(documentation)
}

/// GraphQL-only helper types, referenced by derived types and root fields.
pub(crate) fn built_in_graphql_types(naming: &NamingConfig) -> Vec<GraphQLType> {
    let input = |enum_name: &str| naming.derived_name(DerivedTypeFamily::InputEnum, enum_name);
    let int_filter = naming.derived_name(DerivedTypeFamily::FilterInput, INT);
    let offset_input = |name: &str, unit_enum: &str, documentation: &str| {
        GraphQLType::input_object(
            name,
            vec![
                GraphQLField::new("amount", TypeReference::non_null_named(INT))
                    .with_documentation("Number (positive or negative) of the given `unit` to offset the boundaries of the groupings."),
                GraphQLField::new("unit", TypeReference::non_null_named(&input(unit_enum)))
                    .with_documentation("Unit of offsetting to apply to the boundaries of the groupings."),
            ],
        )
        .with_documentation(documentation)
    };

    let mut text_filter_fields = vec![
        any_of(TEXT_FILTER_INPUT),
        not(TEXT_FILTER_INPUT),
        GraphQLField::new(
            "equal_to_any_of",
            TypeReference::list_of(TypeReference::named(STRING)),
        )
        .with_documentation("Matches records where the field value is equal to any of the provided values."),
    ];
    text_filter_fields.extend(text_match_fields());

    let mut text_list_element_fields = vec![
        any_of(TEXT_LIST_ELEMENT_FILTER_INPUT),
        GraphQLField::new(
            "equal_to_any_of",
            TypeReference::list_of(TypeReference::non_null_named(STRING)),
        )
        .with_documentation("Matches records where the field value is equal to any of the provided values."),
    ];
    text_list_element_fields.extend(text_match_fields());

    vec![
        GraphQLType::object(
            PAGE_INFO,
            vec![
                GraphQLField::new("has_next_page", TypeReference::non_null_named(BOOLEAN))
                    .with_documentation("Indicates if there is another page of results available after the current one."),
                GraphQLField::new("has_previous_page", TypeReference::non_null_named(BOOLEAN))
                    .with_documentation("Indicates if there is another page of results available before the current one."),
                GraphQLField::new("start_cursor", TypeReference::named(CURSOR))
                    .with_documentation("The `Cursor` of the first edge of the current page."),
                GraphQLField::new("end_cursor", TypeReference::named(CURSOR))
                    .with_documentation("The `Cursor` of the last edge of the current page."),
            ],
        )
        .with_documentation("Provides information about the specific fetched page."),
        GraphQLType::object(
            NON_NUMERIC_AGGREGATED_VALUES,
            vec![approximate_distinct_value_count()],
        )
        .with_documentation("A return type used from aggregations to provided aggregated values over non-numeric fields.")
        .with_category(ElasticGraphCategory::ScalarAggregatedValues),
        GraphQLType::input_object(TEXT_FILTER_INPUT, text_filter_fields)
            .with_documentation("Input type used to specify filters on `String` fields that have been indexed for full text search."),
        GraphQLType::input_object(TEXT_LIST_ELEMENT_FILTER_INPUT, text_list_element_fields)
            .with_documentation("Input type used to specify filters on elements of a `[String]` field that has been indexed for full text search."),
        GraphQLType::input_object(
            TEXT_LIST_FILTER_INPUT,
            list_filter_fields(TEXT_LIST_FILTER_INPUT, TEXT_LIST_ELEMENT_FILTER_INPUT, &int_filter),
        )
        .with_documentation("Input type used to specify filters on `[String]` fields that have been indexed for full text search."),
        GraphQLType::input_object(
            MATCHES_QUERY_FILTER_INPUT,
            vec![
                GraphQLField::new("query", TypeReference::non_null_named(STRING))
                    .with_documentation("The input query to search for."),
                GraphQLField::new(
                    "allowed_edits_per_term",
                    TypeReference::non_null_named(&input(MATCHES_QUERY_ALLOWED_EDITS_PER_TERM)),
                )
                .with_default_value(ConstValue::Enum(async_graphql_value::Name::new("DYNAMIC")))
                .with_documentation("Number of allowed modifications per term to arrive at a match."),
                GraphQLField::new("require_all_terms", TypeReference::non_null_named(BOOLEAN))
                    .with_default_value(false)
                    .with_documentation("Set to `true` to match only if all terms in `query` are found."),
            ],
        )
        .with_documentation("Input type used to specify parameters for the `matches_query` filtering operator."),
        GraphQLType::input_object(
            MATCHES_PHRASE_FILTER_INPUT,
            vec![
                GraphQLField::new("phrase", TypeReference::non_null_named(STRING))
                    .with_documentation("The input phrase to search for."),
            ],
        )
        .with_documentation("Input type used to specify parameters for the `matches_phrase` filtering operator."),
        GraphQLType::input_object(DATE_TIME_TIME_OF_DAY_FILTER_INPUT, {
            let mut fields = vec![
                GraphQLField::new(
                    "equal_to_any_of",
                    TypeReference::list_of(TypeReference::non_null_named(LOCAL_TIME)),
                )
                .with_documentation("Matches records where the time of day of the `DateTime` field value is equal to any of the provided values."),
            ];
            fields.extend(range_fields(LOCAL_TIME));
            fields.push(
                GraphQLField::new("time_zone", TypeReference::named(TIME_ZONE))
                    .with_default_value("UTC")
                    .with_documentation("TimeZone to use when comparing the `DateTime` values against the provided `LocalTime` values."),
            );
            fields
        })
        .with_documentation("Input type used to specify filters on the time of day of `DateTime` fields."),
        offset_input(
            DATE_GROUPING_OFFSET_INPUT,
            DATE_UNIT,
            "Input type offered when grouping on `Date` fields, representing the amount of offset (positive or negative) to shift the `Date` boundaries of each grouping bucket.",
        ),
        offset_input(
            DATE_TIME_GROUPING_OFFSET_INPUT,
            DATE_TIME_UNIT,
            "Input type offered when grouping on `DateTime` fields, representing the amount of offset (positive or negative) to shift the `DateTime` boundaries of each grouping bucket.",
        ),
        offset_input(
            DAY_OF_WEEK_GROUPING_OFFSET_INPUT,
            DATE_TIME_UNIT,
            "Input type offered when grouping on `DayOfWeek` fields, representing the amount of offset (positive or negative) to shift the `DayOfWeek` boundaries of each grouping bucket.",
        ),
        offset_input(
            LOCAL_TIME_GROUPING_OFFSET_INPUT,
            LOCAL_TIME_UNIT,
            "Input type offered when grouping on `LocalTime` fields, representing the amount of offset (positive or negative) to shift the `LocalTime` boundaries of each grouping bucket.",
        ),
    ]
}

fn text_match_fields() -> Vec<GraphQLField> {
    vec![
        GraphQLField::new("matches_query", TypeReference::named(MATCHES_QUERY_FILTER_INPUT))
            .with_documentation("Matches records where the field value matches the provided query using full text search."),
        GraphQLField::new("matches_phrase", TypeReference::named(MATCHES_PHRASE_FILTER_INPUT))
            .with_documentation("Matches records where the field value has a phrase matching the provided phrase using full text search."),
    ]
}

pub(crate) fn any_of(filter_type: &str) -> GraphQLField {
    GraphQLField::new(
        "any_of",
        TypeReference::list_of(TypeReference::non_null_named(filter_type)),
    )
    .with_documentation(
        "Matches records where any of the provided sub-filters evaluate to true.\n\nWhen `null` is passed, matches all documents. When an empty list is passed, matches no documents.",
    )
}

pub(crate) fn not(filter_type: &str) -> GraphQLField {
    GraphQLField::new("not", TypeReference::named(filter_type))
        .with_documentation("Matches records where the provided sub-filter evaluates to false.")
}

/// `gt`, `gte`, `lt` and `lte` operators on `scalar` values.
pub(crate) fn range_fields(scalar: &str) -> Vec<GraphQLField> {
    [
        ("gt", "greater than"),
        ("gte", "greater than or equal to"),
        ("lt", "less than"),
        ("lte", "less than or equal to"),
    ]
    .into_iter()
    .map(|(name, description)| {
        GraphQLField::new(name, TypeReference::named(scalar)).with_documentation(format!(
            "Matches records where the field value is {description} the provided value."
        ))
    })
    .collect()
}

/// Operators of a `*ListFilterInput` type filtering lists through `element_filter`.
pub(crate) fn list_filter_fields(
    list_filter: &str,
    element_filter: &str,
    int_filter: &str,
) -> Vec<GraphQLField> {
    vec![
        any_of(list_filter),
        not(list_filter),
        GraphQLField::new("any_satisfy", TypeReference::named(element_filter))
            .with_documentation("Matches records where any of the list elements match the provided sub-filter."),
        GraphQLField::new(
            "all_of",
            TypeReference::list_of(TypeReference::non_null_named(list_filter)),
        )
        .with_documentation("Matches records where all of the provided sub-filters evaluate to true. This works just like an AND operator in SQL."),
        count_filter(int_filter),
    ]
}

pub(crate) fn count_filter(int_filter: &str) -> GraphQLField {
    GraphQLField::new("count", TypeReference::named(int_filter))
        .with_name_in_index("__counts")
        .with_documentation("Used to filter on the number of non-null elements in this list field.")
}

pub(crate) fn approximate_distinct_value_count() -> GraphQLField {
    GraphQLField::new(
        "approximate_distinct_value_count",
        TypeReference::named(JSON_SAFE_LONG),
    )
    .with_computation(ComputationDetail {
        function: AggregationFunction::Cardinality,
        empty_bucket_value: Some(0),
    })
    .with_documentation("An approximation of the number of unique values for this field within this grouping.")
}

/// `time_zone` argument of date grouping fields.
pub(crate) fn time_zone_argument() -> GraphQLArgument {
    GraphQLArgument::new("time_zone", TypeReference::named(TIME_ZONE))
        .with_default_value("UTC")
        .with_documentation("The time zone to use when determining which grouping a `DateTime` value falls in.")
}

pub(crate) fn is_standard_scalar(name: &str) -> bool {
    STANDARD_SCALARS.contains(&name)
}

/// The `GraphQLEnumValue`s of a built-in or declared enum.
pub(crate) fn enum_values(values: &[EnumValueDef]) -> Vec<GraphQLEnumValue> {
    values
        .iter()
        .map(|value| GraphQLEnumValue {
            name: value.name.clone(),
            documentation: value.documentation.clone(),
            directives: value.directives.clone(),
            sort_field: None,
        })
        .collect()
}
