//! 토큰 검증
//!
//! Bridge가 `Authorization` 헤더의 JWT를 검증하는 로직입니다.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::error::{Error, Result};

use super::claims::{AccessClaims, UserRole};

/// 헤더가 없거나 Bearer 형식이 아님
const MISSING_TOKEN: &str = "UnauthorizedError";

/// 서명/만료/페이로드 검증 실패
const INVALID_TOKEN: &str = "Failed to authenticate jwt token.";

/// 역할 불일치
const NOT_ALLOWED: &str = "You are not allowed to perform this action!";

/// `Authorization` 헤더 값에서 Bearer 토큰 추출
///
/// 스킴 비교는 대소문자를 구분하지 않습니다.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// 토큰 검증기 (HS256, 공유 시크릿)
#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp가 없는 토큰도 허용. 있으면 검증됩니다.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Bearer 토큰 검증 및 Claims 추출
    pub fn validate(&self, token: &str) -> Result<AccessClaims> {
        decode::<AccessClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "jwt validation failed");
                Error::Unauthorized {
                    message: INVALID_TOKEN.to_string(),
                }
            })
    }

    /// 헤더부터 역할 확인까지 한 번에
    pub fn authorize(&self, header: Option<&str>, allowed: &[UserRole]) -> Result<AccessClaims> {
        let token = bearer_token(header).ok_or_else(|| Error::Unauthorized {
            message: MISSING_TOKEN.to_string(),
        })?;
        let claims = self.validate(token)?;
        if !claims.has_any_role(allowed) {
            return Err(Error::Forbidden {
                message: NOT_ALLOWED.to_string(),
            });
        }
        Ok(claims)
    }
}
