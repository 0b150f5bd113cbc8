//! The four report operations: build, connect, search, normalize

use crate::backend::{Connector, ElasticConnector};
use crate::config::BackendConfig;
use crate::query::builder::{COUNTRY_FACET, YEAR_FACET};
use crate::query::{
    AggregationRequest, ConsumptionParams, ProductionParams, QueryBuilder, SearchQuery,
};
use crate::response::{
    ConsumptionEntry, FacetListing, FlatBucket, ProductionEntry, ResultNormalizer,
    SearchResultPage,
};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

pub struct EnergyService {
    connector: Arc<dyn Connector>,
    index: String,
}

impl EnergyService {
    pub fn new(connector: Arc<dyn Connector>, index: impl Into<String>) -> Self {
        Self {
            connector,
            index: index.into(),
        }
    }

    /// Service backed by the Elasticsearch cluster described in `config`
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let connector = ElasticConnector::new(config.clone())?;
        Ok(Self::new(Arc::new(connector), config.index.clone()))
    }

    /// Production summed per energy type
    pub async fn production(&self, params: &ProductionParams) -> Result<Vec<ProductionEntry>> {
        let request = QueryBuilder::production_aggregation(params);
        let buckets = self.aggregate(&request).await?;
        Ok(buckets.into_iter().map(ProductionEntry::from).collect())
    }

    /// Consumption summed per country
    pub async fn consumption(&self, params: &ConsumptionParams) -> Result<Vec<ConsumptionEntry>> {
        let request = QueryBuilder::consumption_aggregation(params);
        let buckets = self.aggregate(&request).await?;
        Ok(buckets.into_iter().map(ConsumptionEntry::from).collect())
    }

    /// Distinct countries and years across the index
    pub async fn facets(&self) -> Result<FacetListing> {
        let backend = self.connector.connect()?;
        let response = backend
            .search(&self.index, &QueryBuilder::facet_listing())
            .await?;

        Ok(ResultNormalizer::normalize_facet_listing(
            response.buckets(COUNTRY_FACET)?,
            response.buckets(YEAR_FACET)?,
        ))
    }

    /// One page of full-text search results
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage> {
        let request = QueryBuilder::search(query)?;
        let backend = self.connector.connect()?;
        let response = backend.search(&self.index, &request).await?;

        let (hits, total) = response.into_hits()?;
        debug!(
            total,
            page = query.page,
            returned = hits.len(),
            "Search page fetched"
        );

        Ok(ResultNormalizer::normalize_search_page(hits, total, query))
    }

    async fn aggregate(&self, request: &AggregationRequest) -> Result<Vec<FlatBucket>> {
        let backend = self.connector.connect()?;
        let response = backend
            .search(&self.index, &request.to_search_request())
            .await?;

        let buckets = response.buckets(request.name)?;
        debug!(
            aggregation = request.name,
            buckets = buckets.len(),
            "Aggregation fetched"
        );

        Ok(ResultNormalizer::normalize_aggregation(
            buckets,
            request.metric_name,
        ))
    }
}
