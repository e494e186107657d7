use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::facade::FacadeError;
use crate::pipeline::PipelineError;
use crate::vectordb::VectorDbError;

use super::envelope::{ApiCode, ApiResponse, ErrorDetail, RequestId};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> ApiCode {
        match self {
            GatewayError::Validation(_) => ApiCode::InvalidParam,
            GatewayError::NotFound(_) => ApiCode::NotFound,
            GatewayError::Unavailable(_) => ApiCode::Unavailable,
            GatewayError::Internal(_) => ApiCode::Internal,
        }
    }

    /// Builds the error envelope. Backend error text is logged, never returned.
    pub fn into_response_with_id(self, request_id: &RequestId) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, detail) = match &self {
            GatewayError::Validation(detail) => ("invalid request parameters", Some(detail.clone())),
            GatewayError::NotFound(detail) => ("cache entry not found", Some(detail.clone())),
            GatewayError::Unavailable(cause) => {
                warn!(request_id = request_id.as_str(), cause = %cause, "backend unavailable");
                ("service unavailable", None)
            }
            GatewayError::Internal(cause) => {
                error!(request_id = request_id.as_str(), cause = %cause, "request failed");
                ("internal error", None)
            }
        };

        let data = detail.map(|message| ErrorDetail {
            message,
            code: code.as_str(),
        });
        ApiResponse::failure(code, message, data, request_id).into_response_with_status(status)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.into_response_with_id(&RequestId::generate())
    }
}

fn is_connection_error(err: &VectorDbError) -> bool {
    matches!(err, VectorDbError::ConnectionFailed { .. })
}

impl From<PipelineError> for GatewayError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(message) => GatewayError::Validation(message),
            PipelineError::Timeout { .. } => GatewayError::Unavailable(err.to_string()),
            PipelineError::VectorDb(ref e) if is_connection_error(e) => {
                GatewayError::Unavailable(err.to_string())
            }
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl From<FacadeError> for GatewayError {
    fn from(err: FacadeError) -> Self {
        match err {
            FacadeError::NotFound { .. } => GatewayError::NotFound(err.to_string()),
            FacadeError::Timeout { .. } => GatewayError::Unavailable(err.to_string()),
            FacadeError::Backend(ref e) if is_connection_error(e) => {
                GatewayError::Unavailable(err.to_string())
            }
            other => GatewayError::Internal(other.to_string()),
        }
    }
}
