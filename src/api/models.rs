use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::FinanceError;
use crate::core::models::message::{IncomingUpdate, UserInput};

/// One inbound chat turn. Exactly one of `text` or `choice` must be set.
#[derive(Deserialize, ToSchema)]
pub struct UpdateRequest {
    pub user_id: String,
    pub display_name: Option<String>,
    /// Where replies are delivered, e.g. a Telegram chat id.
    pub endpoint: Option<String>,
    pub text: Option<String>,
    /// Value of a selected reply option.
    pub choice: Option<String>,
}

impl TryFrom<UpdateRequest> for IncomingUpdate {
    type Error = FinanceError;

    fn try_from(req: UpdateRequest) -> Result<Self, Self::Error> {
        if req.user_id.trim().is_empty() {
            return Err(FinanceError::invalid_input(
                "user_id",
                "Invalid user_id",
                "user_id cannot be empty",
            ));
        }
        let input = match (req.text, req.choice) {
            (Some(text), None) => UserInput::parse_text(&text),
            (None, Some(choice)) => UserInput::Choice(choice),
            _ => {
                return Err(FinanceError::invalid_input(
                    "text",
                    "Invalid update",
                    "Exactly one of text or choice must be provided",
                ));
            }
        };
        Ok(IncomingUpdate {
            user_id: req.user_id,
            display_name: req.display_name,
            endpoint: req.endpoint,
            input,
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for FinanceError to implement IntoResponse
pub struct ApiError(pub FinanceError);

impl From<FinanceError> for ApiError {
    fn from(err: FinanceError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FinanceError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            FinanceError::NotAnExpense(_) | FinanceError::InvalidInput(_, _) => StatusCode::BAD_REQUEST,
            FinanceError::TransactionAlreadyPaid(_) => StatusCode::CONFLICT,
            FinanceError::DeliveryError(_) => StatusCode::BAD_GATEWAY,
            FinanceError::StorageError(_)
            | FinanceError::LoggingError(_)
            | FinanceError::ConfigError(_)
            | FinanceError::AmountOverflow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error = match self.0 {
            FinanceError::InvalidInput(field, detail) => {
                format!("Invalid input for {}: {}", field, detail.description)
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
