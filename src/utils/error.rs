use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Repository request failed: {message}")]
    RepositoryError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Request superseded by a newer one (generation {generation})")]
    Superseded { generation: u64 },

    #[error("Background task failed: {message}")]
    TaskError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Repository,
    Data,
    Cancellation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EngineError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn repository(message: impl Into<String>) -> Self {
        EngineError::RepositoryError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::ConfigError { .. }
            | EngineError::ConfigValidationError { .. }
            | EngineError::InvalidConfigValueError { .. }
            | EngineError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EngineError::NotFound { .. }
            | EngineError::RepositoryError { .. }
            | EngineError::ApiError(_) => ErrorCategory::Repository,
            EngineError::SerializationError(_) => ErrorCategory::Data,
            EngineError::Superseded { .. } => ErrorCategory::Cancellation,
            EngineError::IoError(_) | EngineError::TaskError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::Superseded { .. } => ErrorSeverity::Low,
            EngineError::NotFound { .. }
            | EngineError::RepositoryError { .. }
            | EngineError::ApiError(_) => ErrorSeverity::Medium,
            EngineError::SerializationError(_)
            | EngineError::ConfigError { .. }
            | EngineError::ConfigValidationError { .. }
            | EngineError::InvalidConfigValueError { .. }
            | EngineError::MissingConfigError { .. } => ErrorSeverity::High,
            EngineError::IoError(_) | EngineError::TaskError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the configuration file and command-line flags",
            ErrorCategory::Repository => {
                "Verify the repository base_url is reachable and the requested id exists"
            }
            ErrorCategory::Data => "The backend returned data in an unexpected shape",
            ErrorCategory::Cancellation => "A newer request replaced this one; no action needed",
            ErrorCategory::System => "Retry the command; if it keeps failing, check system resources",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EngineError::NotFound { entity, id } => format!("No {} with id '{}'", entity, id),
            EngineError::Superseded { .. } => "Report request was replaced by a newer one".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_severity() {
        let err = EngineError::not_found("student", "s-9");
        assert_eq!(err.category(), ErrorCategory::Repository);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.user_friendly_message(), "No student with id 's-9'");

        let err = EngineError::Superseded { generation: 3 };
        assert_eq!(err.severity(), ErrorSeverity::Low);

        let err = EngineError::MissingConfigError {
            field: "repository.base_url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
