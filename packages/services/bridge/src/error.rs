//! Bridge 에러 타입

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Bridge 에러
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// 라이브러리에 닿기 전 HTTP 계층에서 걸러진 요청
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("core error: {0}")]
    Core(#[from] tk_core::Error),
}

/// 에러 응답 JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl BridgeError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        BridgeError::BadRequest {
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for BridgeError {
    fn from(rejection: JsonRejection) -> Self {
        BridgeError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for BridgeError {
    fn from(rejection: QueryRejection) -> Self {
        BridgeError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for BridgeError {
    fn from(rejection: PathRejection) -> Self {
        BridgeError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            BridgeError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message, Vec::new())
            }
            BridgeError::Core(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!("Request failed: {:?}", e);
                }
                (status, e.code(), e.to_string(), e.fields().to_vec())
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                fields,
                request_id: crate::middleware::current_request_id(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
