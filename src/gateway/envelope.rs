use std::convert::Infallible;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Inbound ids longer than this are replaced with a fresh one.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Business status carried in every response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCode {
    Ok = 0,
    InvalidParam = 1001,
    Internal = 1002,
    Unavailable = 1003,
    NotFound = 1004,
}

impl ApiCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApiCode::Ok => "OK",
            ApiCode::InvalidParam => "INVALID_PARAM",
            ApiCode::Internal => "INTERNAL_ERROR",
            ApiCode::Unavailable => "SERVICE_UNAVAILABLE",
            ApiCode::NotFound => "NOT_FOUND",
        }
    }
}

impl Serialize for ApiCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

/// Per-request correlation id: the inbound `X-Request-ID`, or a new UUID v4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_header(value: &HeaderValue) -> Option<Self> {
        value
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
            .map(|v| Self(v.to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(RequestId::from_header)
            .unwrap_or_else(RequestId::generate))
    }
}

/// `{success, code, message, data, request_id, timestamp}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub code: ApiCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub request_id: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>, request_id: &RequestId) -> Self {
        Self {
            success: true,
            code: ApiCode::Ok,
            message: message.into(),
            data: Some(data),
            request_id: request_id.as_str().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn failure(
        code: ApiCode,
        message: impl Into<String>,
        data: Option<T>,
        request_id: &RequestId,
    ) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
            data,
            request_id: request_id.as_str().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Serializes with `status` and echoes the request id as a header.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        let header = HeaderValue::from_str(&self.request_id).ok();
        let mut response = (status, Json(self)).into_response();
        if let Some(value) = header {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub code: &'static str,
}
