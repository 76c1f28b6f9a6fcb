//! JSON extractor with `{ "error": ... }` rejections
//!
//! Wraps Axum's `Json` extractor so malformed bodies get the same error
//! shape as every other failure the API returns.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

/// JSON extraction error
///
/// - JSON syntax errors → 400 Bad Request
/// - Data errors (wrong shape or types) → 422 Unprocessable Entity
/// - Missing content type → 415 Unsupported Media Type
/// - Body over the configured limit → 413 Payload Too Large
#[derive(Debug)]
pub struct JsonBodyRejection(JsonRejection);

impl JsonBodyRejection {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            JsonRejection::JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
            JsonRejection::JsonDataError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            // Body read failures, including the length limit (413)
            other => other.status(),
        }
    }
}

impl IntoResponse for JsonBodyRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            JsonRejection::MissingJsonContentType(_) => {
                "Content-Type must be application/json".to_string()
            }
            other => other.body_text(),
        };

        tracing::debug!(status = status.as_u16(), error = %message, "Rejected request body");

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// `Json` replacement producing [`JsonBodyRejection`] on failure
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = JsonBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(JsonBodyRejection(rejection)),
        }
    }
}
