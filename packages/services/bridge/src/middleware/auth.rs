//! 라우트별 역할 확인

use axum::http::{header::AUTHORIZATION, HeaderMap};

use tk_core::auth::{AccessClaims, UserRole};
use tk_core::Error;

use crate::error::Result;
use crate::state::AppState;

/// `Authorization` 헤더를 검증하고 허용 역할과 대조
///
/// 인증이 비활성화되어 있으면 `super-admin`으로 취급합니다.
pub fn authorize(state: &AppState, headers: &HeaderMap, allowed: &[UserRole]) -> Result<AccessClaims> {
    if state.config.disable_auth {
        return Ok(AccessClaims::with_roles(&[UserRole::SuperAdmin]));
    }

    let validator = state.auth.as_ref().ok_or_else(|| Error::Unauthorized {
        message: "UnauthorizedError".to_string(),
    })?;

    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let claims = validator.authorize(header, allowed)?;
    tracing::debug!(sub = ?claims.sub, roles = ?claims.roles, "authorized");
    Ok(claims)
}
