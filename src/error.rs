use thiserror::Error;

/// Fields of a traveler form that must be filled before checkout can proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelerField {
    Name,
    Age,
    Gender,
    DocumentNumber,
}

impl std::fmt::Display for TravelerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TravelerField::Name => "name",
            TravelerField::Age => "age",
            TravelerField::Gender => "gender",
            TravelerField::DocumentNumber => "document number",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Please fill all required fields for Traveler {position} (missing {field})")]
    TravelerIncomplete {
        position: usize,
        field: TravelerField,
    },
    #[error("{0}")]
    RequestFailed(String),
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Payment gateway failed to load: {0}")]
    GatewayUnavailable(String),
    #[error("Payment cancelled")]
    PaymentCancelled,
    #[error("Payment verification failed. Please contact support.")]
    VerificationFailed,
    #[error("Invalid checkout state: {0}")]
    InvalidState(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorefrontError {
    /// The message the server put in its error payload, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            StorefrontError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            StorefrontError::RequestFailed(message) => Some(message),
            _ => None,
        }
    }

    /// Collapses a failed request into the single message shown to the user.
    pub fn into_request_failure(self, fallback: &str) -> StorefrontError {
        let message = self
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        StorefrontError::RequestFailed(message)
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
