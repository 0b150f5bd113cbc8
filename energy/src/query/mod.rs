//! Query construction for the four report shapes

pub mod builder;
pub mod params;
pub mod types;

pub use builder::{AggregationRequest, QueryBuilder};
pub use params::{
    ConsumptionParams, ProductionParams, RawConsumptionParams, RawProductionParams,
    RawSearchBody, RawSearchParams, SearchQuery,
};
pub use types::*;

/// Field names of the indexed energy documents
pub mod fields {
    pub const COUNTRY: &str = "Country";
    pub const YEAR: &str = "Year";
    pub const ENERGY_TYPE: &str = "Energy Type";
    pub const PRODUCTION: &str = "Production (GWh)";
    pub const CONSUMPTION: &str = "Energy Consumption";
    pub const GDP: &str = "GDP";
    pub const EXPORTS: &str = "Energy Exports";
    pub const IMPORTS: &str = "Energy Imports";
    pub const CO2_EMISSIONS: &str = "CO2 Emissions";
}
