use thiserror::Error;

/// Errors raised while serving an energy report
#[derive(Error, Debug)]
pub enum EnergyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Invalid query parameters: {0}")]
    InvalidQueryParameters(String),

    #[error("Unexpected backend response: {0}")]
    BackendResponseShape(String),
}

impl From<reqwest::Error> for EnergyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EnergyError::BackendResponseShape(err.to_string())
        } else {
            EnergyError::BackendUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EnergyError {
    fn from(err: serde_json::Error) -> Self {
        EnergyError::BackendResponseShape(err.to_string())
    }
}
