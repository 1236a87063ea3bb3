use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use empresas_core::{EmpresasError, ValidationError};

/// An [`EmpresasError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub EmpresasError);

impl From<EmpresasError> for ApiError {
    fn from(err: EmpresasError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            EmpresasError::Validation(_) => StatusCode::BAD_REQUEST,
            EmpresasError::NotFound(_) => StatusCode::NOT_FOUND,
            EmpresasError::Unauthorized => StatusCode::UNAUTHORIZED,
            EmpresasError::Storage(_) | EmpresasError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            EmpresasError::Validation(v) => json!({
                "error": v.to_string(),
                "field": v.field,
                "index": v.index,
            }),
            EmpresasError::Storage(_) | EmpresasError::Serialization(_) => {
                // Paths and parser details stay in the server log.
                error!("request failed: {}", self.0);
                json!({ "error": "internal storage error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
