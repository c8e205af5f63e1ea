use thiserror::Error;

#[derive(Error, Debug)]
pub enum TravelError {
    #[error("Missing credential: {field}")]
    MissingCredential { field: String, env_var: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    DateParse {
        input: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Upstream returned status {status}")]
    UpstreamStatus {
        status: String,
        payload: serde_json::Value,
    },

    #[error("Could not find location: {location}")]
    LocationNotFound { location: String, status: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidation { field: String, message: String },
}

/// 錯誤分類，對應上游呼叫的處理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    UpstreamTransport,
    UpstreamLogical,
    InvalidInput,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TravelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TravelError::MissingCredential { .. }
            | TravelError::MissingField { .. }
            | TravelError::InvalidField { .. }
            | TravelError::ConfigValidation { .. } => ErrorCategory::Configuration,
            TravelError::DateParse { .. } => ErrorCategory::InvalidInput,
            TravelError::Transport(_) | TravelError::HttpStatus { .. } => {
                ErrorCategory::UpstreamTransport
            }
            TravelError::UpstreamStatus { .. } | TravelError::LocationNotFound { .. } => {
                ErrorCategory::UpstreamLogical
            }
            TravelError::Serialization(_) | TravelError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::UpstreamLogical => ErrorSeverity::Low,
            ErrorCategory::UpstreamTransport => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::InvalidInput => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給呼叫端（推理層或使用者）的修復建議
    pub fn recovery_suggestion(&self) -> String {
        match self {
            TravelError::MissingCredential { field, env_var } => format!(
                "Set the {} environment variable (or `{}` in the config file) and try again.",
                env_var, field
            ),
            TravelError::MissingField { field } => {
                format!("Provide the '{}' argument by name.", field)
            }
            TravelError::InvalidField { field, .. } => {
                format!("Correct the '{}' argument and call the tool again.", field)
            }
            TravelError::DateParse { .. } => {
                "Use calendar dates in YYYY-MM-DD form, e.g. 2026-05-14.".to_string()
            }
            TravelError::Transport(_) | TravelError::HttpStatus { .. } => {
                "The search provider could not be reached; try again later.".to_string()
            }
            TravelError::UpstreamStatus { .. } => {
                "Inspect the provider payload in `details` and adjust the query.".to_string()
            }
            TravelError::LocationNotFound { .. } => {
                "Check the spelling of the location or add the city and country.".to_string()
            }
            TravelError::ConfigValidation { field, .. } => {
                format!("Fix '{}' in the configuration file.", field)
            }
            TravelError::Serialization(_) | TravelError::Io(_) => {
                "Check the input files and provider responses for malformed data.".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::InvalidInput => format!("Invalid input: {}", self),
            ErrorCategory::UpstreamTransport => format!("Search provider unavailable: {}", self),
            ErrorCategory::UpstreamLogical => format!("Search provider rejected the query: {}", self),
            ErrorCategory::System => format!("Internal error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, TravelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_is_configuration() {
        let err = TravelError::MissingCredential {
            field: "search_api_key".to_string(),
            env_var: "SERPAPI_API_KEY".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("SERPAPI_API_KEY"));
    }

    #[test]
    fn test_upstream_status_is_soft() {
        let err = TravelError::UpstreamStatus {
            status: "OVER_QUERY_LIMIT".to_string(),
            payload: serde_json::json!({"status": "OVER_QUERY_LIMIT"}),
        };
        assert_eq!(err.category(), ErrorCategory::UpstreamLogical);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.to_string(), "Upstream returned status OVER_QUERY_LIMIT");
    }

    #[test]
    fn test_http_status_message_carries_cause() {
        let err = TravelError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::UpstreamTransport);
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert!(err.user_friendly_message().starts_with("Search provider unavailable"));
    }
}
