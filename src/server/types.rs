/*!
 * Request and response bodies of the HTTP API, and the mapping of
 * application errors onto HTTP responses.
 */

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::alignment::AlignmentReport;
use crate::database::SubmissionRecord;
use crate::errors::AppError;

/// JSON request body, parsed whatever the declared content type
///
/// Failures are reported as `InvalidRequest` so they share the error body
/// of every other route.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?;

        parse_json_body(&body).map(JsonBody)
    }
}

/// Parse a request body as JSON
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid JSON body: {}", e)))
}

/// Error body returned by every failing route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /api/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// POST /api/evaluate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub transcript: String,
}

/// POST /api/transcribe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// POST /api/assignments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    #[serde(default)]
    pub teacher_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub passage: String,
}

/// Query string of GET /api/assignments
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentQuery {
    pub teacher_id: Option<String>,
}

/// POST /api/assignments/:id/submissions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitReadingRequest {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub transcript: String,
}

/// Stored submission together with the full word-level report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub submission: SubmissionRecord,
    pub report: AlignmentReport,
}

fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for(error: &AppError) -> String {
    match error {
        AppError::InvalidRequest(message) | AppError::NotFound(message) => message.clone(),
        AppError::Provider(e) => e.to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = message_for(&self);

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
