use thiserror::Error;

pub type PicolyticsResult<T> = Result<T, PicolyticsError>;

#[derive(Error, Debug)]
pub enum PicolyticsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid scenario step: {0}")]
    InvalidStep(String),

    #[error("Invalid visibility state: {0}")]
    InvalidVisibility(String),

    #[error("Beacon transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for PicolyticsError {
    fn from(err: config::ConfigError) -> Self {
        PicolyticsError::Config(err.to_string())
    }
}
