//! HTTP surface

pub mod error;
pub mod routes;
pub mod server;

pub use error::{guarded, ApiError};
pub use routes::{energy_router, AppState};
pub use server::ApiServer;
