//! Backend response types and the flattening into client shapes

use crate::error::EnergyError;
use crate::query::fields;
use crate::query::params::SearchQuery;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// ES search response, reduced to the parts the explorer reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default)]
    pub hits: Option<HitsResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<HashMap<String, EsAggregationResult>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitsResponse {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// `hits.total` is an object since ES 7 and a bare number before
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
    Count(u64),
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Object { value, .. } => *value,
            TotalHits::Count(value) => *value,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EsAggregationResult {
    Buckets { buckets: Vec<EsBucket> },
    Value { value: Value },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsBucket {
    pub key: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_as_string: Option<String>,
    #[serde(default)]
    pub doc_count: u64,
    #[serde(flatten)]
    pub sub_aggs: HashMap<String, EsAggregationResult>,
}

impl EsBucket {
    /// Value of a metric sub-aggregation, `null` when absent
    pub fn metric(&self, name: &str) -> Value {
        match self.sub_aggs.get(name) {
            Some(EsAggregationResult::Value { value }) => value.clone(),
            _ => Value::Null,
        }
    }
}

impl SearchResponse {
    /// Buckets of a named bucket aggregation
    pub fn buckets(&self, name: &str) -> Result<&[EsBucket]> {
        match self.aggregations.as_ref().and_then(|aggs| aggs.get(name)) {
            Some(EsAggregationResult::Buckets { buckets }) => Ok(buckets.as_slice()),
            Some(EsAggregationResult::Value { .. }) => Err(EnergyError::BackendResponseShape(
                format!("aggregation '{}' has no buckets", name),
            )),
            None => Err(EnergyError::BackendResponseShape(format!(
                "aggregation '{}' missing from response",
                name
            ))),
        }
    }

    /// Hit list and total match count
    pub fn into_hits(self) -> Result<(Vec<Hit>, u64)> {
        let hits = self.hits.ok_or_else(|| {
            EnergyError::BackendResponseShape("hits missing from response".to_string())
        })?;
        let total = hits.total.map(|t| t.value()).ok_or_else(|| {
            EnergyError::BackendResponseShape("hits.total missing from response".to_string())
        })?;
        Ok((hits.hits, total))
    }
}

/// One flattened bucket: its key and the value of its metric
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBucket {
    pub key: Value,
    pub metric: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionEntry {
    pub energy_type: Value,
    pub production: Value,
}

impl From<FlatBucket> for ProductionEntry {
    fn from(bucket: FlatBucket) -> Self {
        Self {
            energy_type: bucket.key,
            production: bucket.metric,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionEntry {
    pub countries: Value,
    pub consumption: Value,
}

impl From<FlatBucket> for ConsumptionEntry {
    fn from(bucket: FlatBucket) -> Self {
        Self {
            countries: bucket.key,
            consumption: bucket.metric,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetListing {
    pub countries: Vec<Value>,
    pub years: Vec<Value>,
}

/// A hit projected onto the fields the client displays.
/// Fields missing from the document are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumption: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electricity_exports: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electricity_imports: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2_emissions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultPage {
    pub search_results: Vec<SearchResultRecord>,
    pub total_results: u64,
    pub current_page: u32,
    pub total_pages: u64,
}

/// Flattens backend responses
pub struct ResultNormalizer;

impl ResultNormalizer {
    /// One record per bucket, in backend order
    pub fn normalize_aggregation(buckets: &[EsBucket], metric_name: &str) -> Vec<FlatBucket> {
        buckets
            .iter()
            .map(|bucket| FlatBucket {
                key: bucket.key.clone(),
                metric: bucket.metric(metric_name),
            })
            .collect()
    }

    /// Bucket keys only, document counts dropped
    pub fn normalize_facet_listing(countries: &[EsBucket], years: &[EsBucket]) -> FacetListing {
        FacetListing {
            countries: countries.iter().map(|b| b.key.clone()).collect(),
            years: years.iter().map(|b| b.key.clone()).collect(),
        }
    }

    pub fn normalize_search_page(
        hits: Vec<Hit>,
        total: u64,
        query: &SearchQuery,
    ) -> SearchResultPage {
        SearchResultPage {
            search_results: hits.into_iter().map(Self::project_hit).collect(),
            total_results: total,
            current_page: query.page,
            total_pages: query.total_pages(total),
        }
    }

    fn project_hit(hit: Hit) -> SearchResultRecord {
        let mut source = hit.source;
        let mut take = |field: &str| source.remove(field);

        SearchResultRecord {
            country: take(fields::COUNTRY),
            production: take(fields::PRODUCTION),
            consumption: take(fields::CONSUMPTION),
            gdp: take(fields::GDP),
            electricity_exports: take(fields::EXPORTS),
            electricity_imports: take(fields::IMPORTS),
            co2_emissions: take(fields::CO2_EMISSIONS),
            year: take(fields::YEAR),
        }
    }
}
