use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

impl RelayError {
    /// Short error code string for log lines and HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "CONFIG_ERROR",
            RelayError::InvalidSetting { .. } => "INVALID_SETTING",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
