use thiserror::Error;

/// Library errors using thiserror for structured error handling.
///
/// Validation problems never show up here: the wizard engine turns them into
/// step flags and notifications. Only submission transport and configuration
/// failures cross the library boundary.

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server rejected the claim ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode claim: {0}")]
    Encode(String),
}

impl SubmitError {
    /// Message suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Network(detail) => format!(
                "Could not reach the claims service ({}). Check your connection and try again.",
                detail
            ),
            SubmitError::Rejected { message, .. } => message.clone(),
            SubmitError::InvalidResponse(_) | SubmitError::Encode(_) => self.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("A wizard needs at least one step")]
    NoSteps,

    #[error("Step definitions out of order: expected step {expected}, found {found}")]
    OutOfOrder { expected: usize, found: usize },

    #[error("Step {step} reads from unknown step {target}")]
    UnknownDependency { step: usize, target: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("At most {0} files can be attached")]
    TooMany(usize),

    #[error("{name} is larger than {limit} bytes")]
    TooLarge { name: String, limit: u64 },

    #[error("{0} is already attached")]
    Duplicate(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine the platform config directory")]
    NoConfigDir,
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = SubmitError::Rejected {
            status: 422,
            message: "Policy number not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Server rejected the claim (422): Policy number not found"
        );

        let err = ConfigError::Invalid("request_timeout_secs must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: request_timeout_secs must be > 0"
        );
    }

    #[test]
    fn test_user_message() {
        let err = SubmitError::Network("connection refused".to_string());
        assert_eq!(
            err.user_message(),
            "Could not reach the claims service (connection refused). Check your connection and try again."
        );

        let err = SubmitError::Rejected {
            status: 400,
            message: "Duplicate claim".to_string(),
        };
        assert_eq!(err.user_message(), "Duplicate claim");
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_err = ConfigError::LoadFailed {
            path: "/test/config.json".to_string(),
            source: Box::new(io_err),
        };

        assert!(config_err.source().is_some());
        assert_eq!(
            config_err.to_string(),
            "Failed to load configuration from /test/config.json"
        );
    }
}
