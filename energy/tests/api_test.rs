//! HTTP API tests for the energy explorer.
//!
//! The router is driven with `tower::ServiceExt::oneshot` against an
//! in-memory backend that records every request body it receives and
//! replies with a canned Elasticsearch response.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use energy::api::energy_router;
use energy::backend::{Connector, SearchBackend};
use energy::config::BackendConfig;
use energy::query::{ProductionParams, SearchRequest};
use energy::response::SearchResponse;
use energy::{EnergyError, EnergyService};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct RecordingBackend {
    response: Option<Value>,
    requests: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl SearchBackend for RecordingBackend {
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> energy::Result<SearchResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((index.to_string(), serde_json::to_value(request).unwrap()));

        match &self.response {
            Some(body) => Ok(serde_json::from_value(body.clone())?),
            None => Err(EnergyError::BackendUnavailable(
                "connection refused".to_string(),
            )),
        }
    }
}

struct RecordingConnector {
    backend: Arc<RecordingBackend>,
    connects: AtomicUsize,
}

impl Connector for RecordingConnector {
    fn connect(&self) -> energy::Result<Arc<dyn SearchBackend>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let backend: Arc<dyn SearchBackend> = self.backend.clone();
        Ok(backend)
    }
}

impl RecordingConnector {
    fn requests(&self) -> Vec<(String, Value)> {
        self.backend.requests.lock().unwrap().clone()
    }
}

/// Router plus the connector it talks to; `None` makes the backend fail.
fn setup(response: Option<Value>) -> (Router, Arc<RecordingConnector>) {
    let connector = Arc::new(RecordingConnector {
        backend: Arc::new(RecordingBackend {
            response,
            requests: Mutex::new(Vec::new()),
        }),
        connects: AtomicUsize::new(0),
    });
    let service = Arc::new(EnergyService::new(connector.clone(), "energy"));
    (energy_router(service), connector)
}

async fn send(
    router: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn hit(country: &str, year: i64) -> Value {
    json!({
        "_id": format!("{country}-{year}"),
        "_source": {
            "Country": country,
            "Year": year,
            "Production (GWh)": 10,
            "Energy Consumption": 8,
            "GDP": 100,
            "Energy Exports": 2,
            "Energy Imports": 1,
            "CO2 Emissions": 3
        }
    })
}

// ===================================================================
// Production report
// ===================================================================

#[tokio::test]
async fn test_production_flattens_buckets() {
    let (router, connector) = setup(Some(json!({
        "hits": {"total": {"value": 2, "relation": "eq"}, "hits": []},
        "aggregations": {"energy_types": {"buckets": [
            {"key": "Solar", "doc_count": 1, "total_production": {"value": 120}},
            {"key": "Wind", "doc_count": 1, "total_production": {"value": 80}}
        ]}}
    })));

    let (status, body) = send(router, "GET", "/api/production-data", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"[{"energyType":"Solar","production":120},{"energyType":"Wind","production":80}]"#
    );

    let requests = connector.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "energy");
    assert_eq!(requests[0].1["query"], json!({"bool": {"must": []}}));
}

#[tokio::test]
async fn test_production_sends_country_and_year_filters() {
    let (router, connector) = setup(Some(json!({
        "aggregations": {"energy_types": {"buckets": []}}
    })));

    let (status, body) = send(
        router,
        "GET",
        "/api/production-data?country=Norway&year=2020",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
    assert_eq!(
        connector.requests()[0].1["query"]["bool"]["must"],
        json!([{"match": {"Country": "Norway"}}, {"match": {"Year": 2020}}])
    );
}

#[tokio::test]
async fn test_production_bad_year_never_reaches_backend() {
    let (router, connector) = setup(Some(json!({})));

    let (status, body) = send(router, "GET", "/api/production-data?year=abc", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
    assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_duplicate_query_parameter_fails_through_boundary() {
    let cases = [
        ("GET", "/api/production-data?year=2020&year=2021", "Internal Server Error"),
        ("GET", "/api/consumption-data?year=2020&year=2021", "Internal Server Error"),
        ("POST", "/api/search?page=1&page=2&limit=10", "Search failed"),
    ];

    for (method, uri, message) in cases {
        let (router, connector) = setup(Some(json!({})));
        let (status, body) = send(router, method, uri, Some(json!({"query": "x"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, message, "{uri}");
        assert_eq!(connector.connects.load(Ordering::SeqCst), 0, "{uri}");
    }
}

// ===================================================================
// Consumption report
// ===================================================================

#[tokio::test]
async fn test_consumption_by_country() {
    let (router, connector) = setup(Some(json!({
        "aggregations": {"countries_data": {"buckets": [
            {"key": "Brazil", "doc_count": 3, "consumption": {"value": 55.5}},
            {"key": "Chad", "doc_count": 1, "consumption": {"value": null}}
        ]}}
    })));

    let (status, body) = send(router, "GET", "/api/consumption-data?year=2018", None).await;

    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        parsed,
        json!([
            {"countries": "Brazil", "consumption": 55.5},
            {"countries": "Chad", "consumption": null}
        ])
    );
    assert_eq!(
        connector.requests()[0].1["aggs"]["countries_data"]["aggs"]["consumption"],
        json!({"sum": {"field": "Energy Consumption"}})
    );
}

#[tokio::test]
async fn test_consumption_missing_aggregation_is_500() {
    let (router, _) = setup(Some(json!({"hits": {"total": {"value": 0}, "hits": []}})));

    let (status, body) = send(router, "GET", "/api/consumption-data", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

// ===================================================================
// Facet listing
// ===================================================================

#[tokio::test]
async fn test_countries_and_years() {
    let (router, connector) = setup(Some(json!({
        "hits": {"total": {"value": 4, "relation": "eq"}, "hits": []},
        "aggregations": {
            "countries": {"buckets": [
                {"key": "Norway", "doc_count": 2},
                {"key": "Chile", "doc_count": 2}
            ]},
            "years": {"buckets": [
                {"key": 2019, "doc_count": 2},
                {"key": 2020, "doc_count": 2}
            ]}
        }
    })));

    let (status, body) = send(router, "GET", "/api/countries-data", None).await;

    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        parsed,
        json!({"countries": ["Norway", "Chile"], "years": [2019, 2020]})
    );

    let request = &connector.requests()[0].1;
    assert_eq!(request["size"], json!(0));
    assert_eq!(
        request["aggs"]["years"]["terms"]["order"],
        json!({"_key": "asc"})
    );
}

#[tokio::test]
async fn test_countries_backend_failure_uses_same_boundary() {
    let (router, _) = setup(None);

    let (status, body) = send(router, "GET", "/api/countries-data", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

// ===================================================================
// Search
// ===================================================================

#[tokio::test]
async fn test_search_second_page() {
    let hits: Vec<Value> = (0..5).map(|i| hit("Norway", 2000 + i)).collect();
    let (router, connector) = setup(Some(json!({
        "hits": {"total": {"value": 25, "relation": "eq"}, "hits": hits}
    })));

    let (status, body) = send(
        router,
        "POST",
        "/api/search?page=2&limit=10",
        Some(json!({"query": "Norway"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["currentPage"], json!(2));
    assert_eq!(parsed["totalPages"], json!(3));
    assert_eq!(parsed["totalResults"], json!(25));
    let results = parsed["searchResults"].as_array().unwrap();
    assert!(results.len() <= 10);
    assert_eq!(
        results[0],
        json!({
            "country": "Norway",
            "production": 10,
            "consumption": 8,
            "gdp": 100,
            "electricityExports": 2,
            "electricityImports": 1,
            "co2Emissions": 3,
            "year": 2000
        })
    );

    assert_eq!(
        connector.requests()[0].1,
        json!({
            "from": 10,
            "size": 10,
            "query": {"multi_match": {"query": "Norway", "fields": ["Country"]}},
            "sort": [{"Year": {"order": "asc"}}]
        })
    );
}

#[tokio::test]
async fn test_search_custom_sort() {
    let (router, connector) = setup(Some(json!({
        "hits": {"total": {"value": 0, "relation": "eq"}, "hits": []}
    })));

    let (status, body) = send(
        router,
        "POST",
        "/api/search?page=1&limit=5&sortField=GDP&sortOrder=desc",
        Some(json!({"query": "Chile"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        parsed,
        json!({"searchResults": [], "totalResults": 0, "currentPage": 1, "totalPages": 0})
    );
    assert_eq!(
        connector.requests()[0].1["sort"],
        json!([{"GDP": {"order": "desc"}}])
    );
}

#[tokio::test]
async fn test_search_invalid_pagination_rejected_before_backend() {
    for uri in [
        "/api/search?page=0&limit=10",
        "/api/search?page=1&limit=0",
        "/api/search?page=-2&limit=10",
        "/api/search?page=abc&limit=10",
        "/api/search?limit=10",
    ] {
        let (router, connector) = setup(Some(json!({})));
        let (status, body) = send(router, "POST", uri, Some(json!({"query": "x"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, "Search failed");
        assert_eq!(connector.connects.load(Ordering::SeqCst), 0, "{uri}");
    }
}

#[tokio::test]
async fn test_search_without_body_fails_cleanly() {
    let (router, connector) = setup(Some(json!({})));

    let (status, body) = send(router, "POST", "/api/search?page=1&limit=10", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Search failed");
    assert!(connector.requests().is_empty());
}

#[tokio::test]
async fn test_search_backend_failure() {
    let (router, _) = setup(None);

    let (status, body) = send(
        router,
        "POST",
        "/api/search?page=1&limit=10",
        Some(json!({"query": "Norway"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Search failed");
}

// ===================================================================
// Configuration
// ===================================================================

#[tokio::test]
async fn test_missing_credentials_is_configuration_error() {
    let service = EnergyService::from_config(&BackendConfig::default()).unwrap();

    let result = service.production(&ProductionParams::default()).await;

    assert!(matches!(result, Err(EnergyError::Configuration(_))));
}

#[tokio::test]
async fn test_missing_credentials_over_http() {
    let service = Arc::new(EnergyService::from_config(&BackendConfig::default()).unwrap());

    let (status, body) = send(energy_router(service), "GET", "/api/countries-data", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (router, _) = setup(Some(json!({})));
    let (status, _) = send(router, "GET", "/api/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
