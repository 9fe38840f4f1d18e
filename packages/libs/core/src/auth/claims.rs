//! 토큰 Claims
//!
//! Access Token 페이로드와 역할 정의입니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 사용자 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    User,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// 모든 역할 (읽기 라우트)
    pub const ANY: &'static [UserRole] = &[UserRole::User, UserRole::Admin, UserRole::SuperAdmin];

    /// 관리자 역할 (쓰기 라우트)
    pub const ADMINS: &'static [UserRole] = &[UserRole::Admin, UserRole::SuperAdmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super-admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            "super-admin" => Ok(UserRole::SuperAdmin),
            _ => Err(()),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access Token Claims (JWT 페이로드)
///
/// `roles`에는 알 수 없는 문자열이 섞여 있을 수 있으므로 원문 그대로 보관합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Role 목록 (없으면 빈 목록)
    #[serde(default)]
    pub roles: Vec<String>,

    /// 발급 시각 (unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// 만료 시각 (unix seconds). 있으면 검증 시 확인
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl AccessClaims {
    pub fn with_roles(roles: &[UserRole]) -> Self {
        Self {
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
            ..Default::default()
        }
    }

    /// 인식 가능한 역할만
    pub fn user_roles(&self) -> impl Iterator<Item = UserRole> + '_ {
        self.roles.iter().filter_map(|r| r.parse().ok())
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.user_roles().any(|r| r == role)
    }

    /// 허용 목록과 교집합이 있는지
    pub fn has_any_role(&self, allowed: &[UserRole]) -> bool {
        self.user_roles().any(|r| allowed.contains(&r))
    }
}
