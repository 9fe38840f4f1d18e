//! tk-core: Tablekit 공통 핵심 라이브러리
//!
//! 이 크레이트는 SQL 엔진(`tk-sql`)과 Bridge 서비스가 공유하는 타입과 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `field`: `Field` 타입과 encoded-scalar(JSON 텍스트) 변환
//! - `id`: 행 ID(`ObjectId`) 파싱 및 범위 검증
//! - `search`: 검색 조건(`SearchCriteria`)과 검색 결과 타입
//! - `schema`: 라이브 카탈로그에서 읽어온 컬럼 메타데이터
//! - `auth`: JWT Bearer 토큰 검증과 Role
//! - `error`: 공통 에러 타입

pub mod auth;
pub mod error;
pub mod field;
pub mod id;
pub mod schema;
pub mod search;

pub use error::{Error, Result};
pub use field::Field;
pub use id::ObjectId;
pub use schema::{ColumnCatalog, ColumnDescriptor, Comparability};
pub use search::{
    MatchCriterion, MatchType, Page, SearchCriteria, SearchItem, SearchResult, SortOrder,
};
