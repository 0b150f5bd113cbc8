//! Validation of loosely-typed HTTP parameters
//!
//! Query strings and bodies arrive as optional strings. Each `Raw*` type is
//! deserialized straight from the request and `validate()`d into the typed
//! value the query builder consumes, so the builder never sees malformed input.

use crate::error::EnergyError;
use crate::query::fields;
use crate::query::types::SortOrder;
use crate::Result;
use serde::Deserialize;

/// Backend result window: `from + size` may not exceed this
pub const MAX_RESULT_WINDOW: u64 = 10_000;

/// Sort field used when the caller gives none
pub const DEFAULT_SORT_FIELD: &str = fields::YEAR;

/// `GET /api/production-data?country=..&year=..`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProductionParams {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionParams {
    pub country: Option<String>,
    pub year: Option<i64>,
}

impl RawProductionParams {
    pub fn validate(self) -> Result<ProductionParams> {
        Ok(ProductionParams {
            country: non_blank(self.country),
            year: parse_year(self.year)?,
        })
    }
}

/// `GET /api/consumption-data?year=..`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConsumptionParams {
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumptionParams {
    pub year: Option<i64>,
}

impl RawConsumptionParams {
    pub fn validate(self) -> Result<ConsumptionParams> {
        Ok(ConsumptionParams {
            year: parse_year(self.year)?,
        })
    }
}

/// Query string of `POST /api/search`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub sort_field: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

/// JSON body of `POST /api/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchBody {
    #[serde(default)]
    pub query: Option<String>,
}

/// A validated full-text search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub fields: Vec<String>,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    pub sort_field: String,
    pub sort_order: SortOrder,
}

impl SearchQuery {
    /// Offset of the first hit on this page
    pub fn start_index(&self) -> usize {
        (self.page as usize).saturating_sub(1) * self.limit as usize
    }

    /// Number of pages needed to show `total` hits
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

impl RawSearchParams {
    pub fn validate(self, body: RawSearchBody) -> Result<SearchQuery> {
        let query = non_blank(body.query).ok_or_else(|| {
            EnergyError::InvalidQueryParameters("search query must not be empty".to_string())
        })?;

        let page = parse_positive("page", self.page)?;
        let limit = parse_positive("limit", self.limit)?;

        if u64::from(page) * u64::from(limit) > MAX_RESULT_WINDOW {
            return Err(EnergyError::InvalidQueryParameters(format!(
                "page {} with limit {} exceeds the result window of {}",
                page, limit, MAX_RESULT_WINDOW
            )));
        }

        let sort_field =
            non_blank(self.sort_field).unwrap_or_else(|| DEFAULT_SORT_FIELD.to_string());
        let sort_order = match non_blank(self.sort_order) {
            Some(order) => parse_sort_order(&order)?,
            None => SortOrder::default(),
        };

        Ok(SearchQuery {
            query,
            fields: vec![fields::COUNTRY.to_string()],
            page,
            limit,
            sort_field,
            sort_order,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_year(value: Option<String>) -> Result<Option<i64>> {
    non_blank(value)
        .map(|year| {
            year.parse::<i64>().map_err(|_| {
                EnergyError::InvalidQueryParameters(format!(
                    "year must be an integer, got '{}'",
                    year
                ))
            })
        })
        .transpose()
}

fn parse_positive(name: &str, value: Option<String>) -> Result<u32> {
    let raw = non_blank(value).ok_or_else(|| {
        EnergyError::InvalidQueryParameters(format!("{} is required", name))
    })?;

    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(EnergyError::InvalidQueryParameters(format!(
            "{} must be a positive integer, got '{}'",
            name, raw
        ))),
    }
}

fn parse_sort_order(order: &str) -> Result<SortOrder> {
    match order.to_ascii_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        other => Err(EnergyError::InvalidQueryParameters(format!(
            "sortOrder must be 'asc' or 'desc', got '{}'",
            other
        ))),
    }
}
