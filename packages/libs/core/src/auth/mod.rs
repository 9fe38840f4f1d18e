//! 인증 관련 타입 및 로직
//!
//! # 개요
//!
//! Tablekit API 호출자는 `Authorization: Bearer <jwt>` 헤더로 인증합니다.
//! 토큰은 공유 시크릿(HS256)으로 서명되며, 페이로드의 `roles` 배열로 라우트 접근을 판단합니다.
//!
//! # 역할
//!
//! - `user`: 조회/검색, 메일 기능
//! - `admin`, `super-admin`: 위 권한 + 생성/수정/삭제

mod claims;
mod token;

pub use claims::{AccessClaims, UserRole};
pub use token::{bearer_token, TokenValidator};
