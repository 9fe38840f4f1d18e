//! tk-sql: 동적 SQL 생성 및 CRUD 엔진
//!
//! 정적 스키마 없이 런타임에 SQL을 생성합니다.
//! 식별자는 검증 후 따옴표로 감싸고, 값은 모두 파라미터로 바인딩합니다.
//!
//! # 모듈 구조
//!
//! - `ident`: 식별자 이스케이프 (`quote`/`unquote`/`Ident`)
//! - `builder`: CRUD/검색 SQL 빌더
//! - `plan`: 컴파일된 쿼리와 값 바인딩
//! - `catalog`: 라이브 컬럼 카탈로그 조회
//! - `row`: 결과 행 → `Field` 변환
//! - `request`: 닫힌 요청 enum과 입력 검증
//! - `engine`: 오케스트레이터

pub mod builder;
pub mod catalog;
pub mod engine;
pub mod ident;
pub mod plan;
pub mod request;
pub mod row;

pub use builder::{DeleteBuilder, InsertBuilder, SearchBuilder, SelectBuilder, UpdateBuilder};
pub use engine::CrudEngine;
pub use ident::{quote, unquote, Ident};
pub use plan::{QueryPlan, SearchPlan};
pub use request::{CrudRequest, CrudResponse, Operation};
