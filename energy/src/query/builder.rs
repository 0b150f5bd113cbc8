//! Builds the backend request bodies for each report

use crate::error::EnergyError;
use crate::query::fields;
use crate::query::params::{ConsumptionParams, ProductionParams, SearchQuery};
use crate::query::types::*;
use crate::Result;
use serde_json::Value;
use std::collections::HashMap;

/// Documents returned alongside an aggregation report
pub const AGGREGATION_DOC_LIMIT: usize = 1000;

/// Distinct values returned per facet
pub const FACET_BUCKET_LIMIT: usize = 1000;

pub const PRODUCTION_AGG: &str = "energy_types";
pub const PRODUCTION_METRIC: &str = "total_production";
pub const CONSUMPTION_AGG: &str = "countries_data";
pub const CONSUMPTION_METRIC: &str = "consumption";
pub const COUNTRY_FACET: &str = "countries";
pub const YEAR_FACET: &str = "years";

/// A filtered two-level report: terms bucket on `group_by`, summing
/// `metric_field` inside each bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRequest {
    /// Name of the terms aggregation in request and response
    pub name: &'static str,
    /// Equality filters, all of which must match
    pub filters: Vec<(&'static str, Value)>,
    pub group_by: &'static str,
    /// Name of the sum sub-aggregation
    pub metric_name: &'static str,
    pub metric_field: &'static str,
}

impl AggregationRequest {
    pub fn to_search_request(&self) -> SearchRequest {
        let must = self
            .filters
            .iter()
            .map(|(field, value)| EsQuery::matching(field, value.clone()))
            .collect();

        let agg = EsAggregation::terms(TermsAgg::field(self.group_by))
            .with_sub_agg(self.metric_name, EsAggregation::sum(self.metric_field));

        SearchRequest {
            query: Some(EsQuery::Bool(BoolQuery { must })),
            size: Some(AGGREGATION_DOC_LIMIT),
            aggs: Some(HashMap::from([(self.name.to_string(), agg)])),
            ..Default::default()
        }
    }
}

/// Translates validated parameters into backend requests
pub struct QueryBuilder;

impl QueryBuilder {
    /// Production per energy type, optionally narrowed to a country and year
    pub fn production_aggregation(params: &ProductionParams) -> AggregationRequest {
        let mut filters = Vec::new();
        if let Some(country) = &params.country {
            filters.push((fields::COUNTRY, Value::from(country.as_str())));
        }
        if let Some(year) = params.year {
            filters.push((fields::YEAR, Value::from(year)));
        }

        AggregationRequest {
            name: PRODUCTION_AGG,
            filters,
            group_by: fields::ENERGY_TYPE,
            metric_name: PRODUCTION_METRIC,
            metric_field: fields::PRODUCTION,
        }
    }

    /// Consumption per country, optionally narrowed to a year
    pub fn consumption_aggregation(params: &ConsumptionParams) -> AggregationRequest {
        let filters = params
            .year
            .map(|year| vec![(fields::YEAR, Value::from(year))])
            .unwrap_or_default();

        AggregationRequest {
            name: CONSUMPTION_AGG,
            filters,
            group_by: fields::COUNTRY,
            metric_name: CONSUMPTION_METRIC,
            metric_field: fields::CONSUMPTION,
        }
    }

    /// Distinct countries and years (ascending) over the whole index.
    /// Aggregation-only: no hits are returned.
    pub fn facet_listing() -> SearchRequest {
        let aggs = HashMap::from([
            (
                COUNTRY_FACET.to_string(),
                EsAggregation::terms(TermsAgg::field(fields::COUNTRY).size(FACET_BUCKET_LIMIT)),
            ),
            (
                YEAR_FACET.to_string(),
                EsAggregation::terms(
                    TermsAgg::field(fields::YEAR)
                        .order_by_key(SortOrder::Asc)
                        .size(FACET_BUCKET_LIMIT),
                ),
            ),
        ]);

        SearchRequest {
            size: Some(0),
            aggs: Some(aggs),
            ..Default::default()
        }
    }

    /// Multi-field match with sort and offset pagination
    pub fn search(query: &SearchQuery) -> Result<SearchRequest> {
        if query.page == 0 || query.limit == 0 {
            return Err(EnergyError::InvalidQueryParameters(format!(
                "page and limit must be positive (page={}, limit={})",
                query.page, query.limit
            )));
        }

        Ok(SearchRequest {
            query: Some(EsQuery::MultiMatch(MultiMatchQuery {
                query: query.query.clone(),
                fields: query.fields.clone(),
            })),
            from: Some(query.start_index()),
            size: Some(query.limit as usize),
            sort: Some(vec![SortClause::new(&query.sort_field, query.sort_order)]),
            ..Default::default()
        })
    }
}
