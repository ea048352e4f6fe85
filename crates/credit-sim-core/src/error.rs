use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreditSimError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Malformed JSON: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CreditSimError {
    fn from(e: serde_json::Error) -> Self {
        CreditSimError::SerializationError(e.to_string())
    }
}
