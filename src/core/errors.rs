use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: &str, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.to_string(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize)]
pub enum FinanceError {
    #[error("Transaction {0} not found")]
    TransactionNotFound(String),
    #[error("Transaction {0} is not an expense")]
    NotAnExpense(String),
    #[error("Transaction {0} already paid")]
    TransactionAlreadyPaid(String),
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
    #[error("Delivery error: {0}")]
    DeliveryError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Amount total overflowed: {0}")]
    AmountOverflow(String),
}

impl FinanceError {
    pub fn invalid_input(field: &str, title: &str, description: impl Into<String>) -> Self {
        FinanceError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    }
}
