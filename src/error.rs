use thiserror::Error;

use crate::client::ErrorJson;

#[derive(Debug, Error)]
pub enum AppError {
    // -- General error
    #[error("{0}")]
    Error(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Can't set tracing Global Default")]
    SetGlobalDefaultError(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Can't set the logger")]
    SetLoggerError(#[from] tracing_log::log::SetLoggerError),

    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] config::ConfigError),

    // -- Command construction (programming errors, caught before the tree is exposed)
    #[error("Invalid command definition: {0}")]
    Construction(String),

    // -- Argument and flag errors
    #[error("{0}")]
    Usage(#[from] clap::Error),

    #[error("Required flag {0} not set")]
    MissingFlag(String),

    #[error("Invalid value {value:?} for --{name}: {reason}")]
    InvalidFlag {
        name: String,
        value: String,
        reason: String,
    },

    // -- Payload errors
    #[error("--data and --from-file are mutually exclusive")]
    PayloadConflict,

    #[error("A payload is required: pass --data '<json>' or --from-file <path|->")]
    PayloadMissing,

    #[error("Payload exceeds the maximum size of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Payload must be a JSON object")]
    PayloadNotObject,

    #[error("I/O error: {0}")]
    FileError(#[from] std::io::Error),

    // -- Identifier dispatch errors
    #[error("Unknown id {id:?}: supported prefixes are {supported}")]
    UnknownId { id: String, supported: String },

    #[error("Unknown composite id {id:?}: expected one of {expected}")]
    UnknownCompositeId { id: String, expected: String },

    #[error("Cannot cancel {id:?}: only ids starting with {supported} can be cancelled")]
    NotCancelable { id: String, supported: String },

    #[error("Unknown resource {noun:?}. Try one of: {known}")]
    UnknownNoun { noun: String, known: String },

    #[error("{noun} does not support `{verb}`")]
    UnsupportedVerb { verb: String, noun: String },

    // -- Server error
    #[error("API error: {0}")]
    Api(#[from] ErrorJson),

    #[error("Reqwest error: {0}")]
    ReqwestError(String),

    #[error("Failed to serialise output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error("No API key configured: set PAY_API__API_KEY or api.api_key in configuration.yaml")]
    MissingApiKey,

    // -- Command error
    #[error("Confirmation required but stdin is not a terminal: pass --yes to skip the prompt")]
    NotATerminal,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Input error")]
    InputError(#[from] dialoguer::Error),
}

impl AppError {
    /// Process exit status for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(e) => e.exit_code(),
            AppError::MissingFlag(_) | AppError::InvalidFlag { .. } => 2,
            AppError::Context { source, .. } => source.exit_code(),
            _ => 1,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::ReqwestError(error.to_string())
    }
}

/// Attach a description of what was being processed to an error.
pub trait ResultExt<T> {
    /// # Errors
    /// Returns the original error wrapped in [`AppError::Context`].
    fn context<C, F>(self, f: F) -> Result<T, AppError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E: Into<AppError>> ResultExt<T> for Result<T, E> {
    fn context<C, F>(self, f: F) -> Result<T, AppError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| AppError::Context {
            context: f().into(),
            source: Box::new(e.into()),
        })
    }
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_wraps_source() {
        // Arrange
        let result: Result<(), AppError> = Err(AppError::PayloadNotObject);

        // Act
        let err = result.context(|| "reading --data").unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "reading --data: Payload must be a JSON object");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn flag_errors_are_usage_errors() {
        let err = AppError::MissingFlag("--account".to_string());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn general_errors_carry_no_prefix_of_their_own() {
        let err = AppError::Error("an id is required".to_string());

        assert_eq!(err.to_string(), "an id is required");
    }
}
