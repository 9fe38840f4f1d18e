//! 공통 에러 타입
//!
//! Tablekit 전체에서 사용되는 에러 타입을 정의합니다.
//! 어떤 에러도 내부에서 복구하거나 재시도하지 않고 호출자에게 그대로 전달합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Tablekit 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Request Errors
    // ─────────────────────────────────────────────────────────────────────────────
    /// 저장소에 닿기 전에 걸러진 입력 오류. `fields`는 문제가 된 필드 경로입니다.
    #[error("{message}")]
    Validation { message: String, fields: Vec<String> },

    /// id로 지정한 행이 없음
    #[error("{message}")]
    NotFound { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Store Errors
    // ─────────────────────────────────────────────────────────────────────────────
    /// 저장소가 반환한 에러 (번역하지 않음)
    #[error("{}", store_message(.0))]
    Store(sqlx::Error),

    /// 커넥션 풀 acquire 타임아웃
    #[error("database connection pool exhausted")]
    PoolExhausted,

    // ─────────────────────────────────────────────────────────────────────────────
    // Auth Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Provider / Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    /// 외부 메일 프로바이더 호출 실패
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Error::PoolExhausted,
            other => Error::Store(other),
        }
    }
}

/// DB 에러는 메시지 원문만 노출합니다 (예: `relation "x" does not exist`).
fn store_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}

impl Error {
    /// 필드에 귀속되는 검증 에러
    pub fn validation(message: impl Into<String>, fields: &[&str]) -> Self {
        Error::Validation {
            message: message.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// encoded-scalar 디코딩 실패
    pub fn invalid_field_value(field_name: &str) -> Self {
        Error::validation(
            format!("Invalid json string field value for '{}'", field_name),
            &[field_name],
        )
    }

    /// 대상 행 없음
    pub fn not_found(object_type: &str, id: impl std::fmt::Display) -> Self {
        Error::NotFound {
            message: format!("Could not find {} by id {}", object_type, id),
        }
    }

    /// 검증 에러의 필드 경로 (다른 종류는 빈 슬라이스)
    pub fn fields(&self) -> &[String] {
        match self {
            Error::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::Validation { .. } | Error::Json(_) => 400,

            // 401 Unauthorized
            Error::Unauthorized { .. } => 401,

            // 403 Forbidden
            Error::Forbidden { .. } => 403,

            // 404 Not Found
            Error::NotFound { .. } => 404,

            // 503 Service Unavailable
            Error::PoolExhausted => 503,

            Error::Provider { status, .. } => *status,

            // 500 Internal Server Error
            Error::Store(_) => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "VALIDATION_ERROR",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Store(_) => "STORE_ERROR",
            Error::PoolExhausted => "POOL_EXHAUSTED",
            Error::Unauthorized { .. } => "UNAUTHORIZED",
            Error::Forbidden { .. } => "FORBIDDEN",
            Error::Provider { .. } => "PROVIDER_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
