//! Energy statistics explorer
//!
//! A small HTTP API over an Elasticsearch index of per-country, per-year
//! energy records. Requests are validated into typed parameters, translated
//! into fixed aggregation or search bodies, sent to the backend, and the
//! nested bucket/hit responses are flattened into client-friendly JSON.
//!
//! # Endpoints
//!
//! - `GET /api/production-data` - Production summed per energy type
//! - `GET /api/consumption-data` - Consumption summed per country
//! - `GET /api/countries-data` - Distinct countries and years
//! - `POST /api/search` - Paginated, sorted full-text search on country

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod service;

pub use error::EnergyError;
pub use service::EnergyService;

/// Result type for energy explorer operations
pub type Result<T> = std::result::Result<T, EnergyError>;
