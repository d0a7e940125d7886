use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// Missing or unusable credentials. Fatal until the environment is fixed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API rate limit reached on {endpoint}. Free tier allows 60 calls/minute, try again later.")]
    RateLimited { endpoint: String },

    #[error("This endpoint requires a premium Finnhub subscription ({endpoint}).")]
    PremiumRequired { endpoint: String },

    #[error("{message}")]
    NotFound { endpoint: String, message: String },

    #[error("API request failed ({status}) on {endpoint}: {message}")]
    Status {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response format: {0}")]
    Decode(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ValuationError {
    pub fn not_found(endpoint: &str, message: impl Into<String>) -> Self {
        ValuationError::NotFound {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    /// Text shown to the user when a search fails.
    pub fn user_message(&self) -> String {
        match self {
            ValuationError::NotFound { message, .. } => message.clone(),
            ValuationError::InvalidData(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Quota exhaustion, as opposed to a request that will keep failing.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ValuationError::RateLimited { .. })
    }

    /// Endpoint the error came from, when it came from an upstream call.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ValuationError::RateLimited { endpoint }
            | ValuationError::PremiumRequired { endpoint }
            | ValuationError::NotFound { endpoint, .. }
            | ValuationError::Status { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ValuationError {
    fn from(err: serde_json::Error) -> Self {
        ValuationError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_is_shown_verbatim() {
        let err = ValuationError::not_found("/quote", "No quote data found for this ticker symbol");
        assert_eq!(err.user_message(), "No quote data found for this ticker symbol");
        assert_eq!(err.endpoint(), Some("/quote"));
    }

    #[test]
    fn test_rate_limit_is_distinguishable() {
        let err = ValuationError::RateLimited { endpoint: "/stock/metric".to_string() };
        assert!(err.is_rate_limited());
        assert!(err.user_message().contains("try again later"));

        let other = ValuationError::Status {
            status: 500,
            endpoint: "/quote".to_string(),
            message: "Internal Server Error".to_string(),
        };
        assert!(!other.is_rate_limited());
        assert!(other.user_message().contains("Internal Server Error"));
    }
}
