//! HTTP error mapping for the restaurant API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use restaurant_search_repository::RestaurantServiceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A service error on its way out of a handler.
///
/// Handlers return `Result<_, ApiError>` and use `?` on service calls. The
/// status code and public message are decided here so every endpoint reports
/// the same failure the same way.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] RestaurantServiceError);

/// Error body: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self(RestaurantServiceError::invalid_input(msg))
    }

    pub fn inner(&self) -> &RestaurantServiceError {
        &self.0
    }

    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            RestaurantServiceError::InvalidInput(_)
            | RestaurantServiceError::MissingLocation
            | RestaurantServiceError::IngestionFailed(_) => StatusCode::BAD_REQUEST,
            RestaurantServiceError::QueryFailed(_)
            | RestaurantServiceError::SchemaInitFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client. Engine details stay in the logs.
    pub fn public_message(&self) -> String {
        match &self.0 {
            RestaurantServiceError::InvalidInput(msg) => msg.clone(),
            RestaurantServiceError::MissingLocation => "No location params".to_string(),
            RestaurantServiceError::IngestionFailed(_) => "Restaurant creation failed".to_string(),
            RestaurantServiceError::QueryFailed(_) => "Query failed".to_string(),
            RestaurantServiceError::SchemaInitFailed(_) => "Search index unavailable".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(
                error = ?self.0,
                error_msg = %self.0,
                status_code = %status_code,
                "Internal API error",
            );
        } else {
            tracing::warn!(
                error = ?self.0,
                error_msg = %self.0,
                status_code = %status_code,
                "API error",
            );
        }

        let body = Json(ApiErrorResponse {
            error: self.public_message(),
        });

        (status_code, body).into_response()
    }
}
