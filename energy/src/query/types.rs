//! Elasticsearch Query DSL types
//!
//! These types represent the subset of the ES Query DSL the explorer sends:
//! bool/must filters, match, multi_match, terms aggregations with nested
//! sum metrics, sort and from/size pagination.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Root ES search request body
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchRequest {
    /// The query to execute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<EsQuery>,

    /// Starting offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<usize>,

    /// Maximum number of hits returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    /// Aggregations
    #[serde(
        default,
        alias = "aggregations",
        skip_serializing_if = "Option::is_none"
    )]
    pub aggs: Option<HashMap<String, EsAggregation>>,

    /// Sort order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortClause>>,
}

/// ES Query types
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EsQuery {
    /// Match query (analyzed full-text, single field)
    Match(HashMap<String, Value>),

    /// Multi-match across multiple fields
    MultiMatch(MultiMatchQuery),

    /// Bool query
    Bool(BoolQuery),
}

impl EsQuery {
    /// Single-field match query
    pub fn matching(field: &str, value: impl Into<Value>) -> Self {
        EsQuery::Match(HashMap::from([(field.to_string(), value.into())]))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BoolQuery {
    /// Clauses that must all match. An empty list matches every document.
    #[serde(default)]
    pub must: Vec<EsQuery>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// `{ "<field>": { "order": "asc" } }`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SortClause(pub HashMap<String, FieldSort>);

impl SortClause {
    pub fn new(field: &str, order: SortOrder) -> Self {
        SortClause(HashMap::from([(field.to_string(), FieldSort { order })]))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldSort {
    pub order: SortOrder,
}

/// ES Aggregation types
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EsAggregation {
    // Metric aggregations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<FieldAgg>,

    // Bucket aggregations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<TermsAgg>,

    // Nested aggregations
    #[serde(
        default,
        alias = "aggregations",
        skip_serializing_if = "Option::is_none"
    )]
    pub aggs: Option<HashMap<String, EsAggregation>>,
}

impl EsAggregation {
    pub fn sum(field: &str) -> Self {
        Self {
            sum: Some(FieldAgg {
                field: field.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn terms(terms: TermsAgg) -> Self {
        Self {
            terms: Some(terms),
            ..Default::default()
        }
    }

    /// Attach a named sub-aggregation
    pub fn with_sub_agg(mut self, name: &str, agg: EsAggregation) -> Self {
        self.aggs
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), agg);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldAgg {
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TermsAgg {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<HashMap<String, SortOrder>>,
}

impl TermsAgg {
    pub fn field(field: &str) -> Self {
        Self {
            field: field.to_string(),
            size: None,
            order: None,
        }
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Order buckets by their key instead of document count
    pub fn order_by_key(mut self, order: SortOrder) -> Self {
        self.order = Some(HashMap::from([("_key".to_string(), order)]));
        self
    }
}
