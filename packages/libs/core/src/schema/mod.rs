//! 라이브 컬럼 메타데이터
//!
//! # 개요
//!
//! Tablekit은 정적 스키마 모델을 갖지 않습니다.
//! 검색 요청마다 저장소 카탈로그에서 컬럼 목록을 새로 읽어 `ColumnCatalog`로 만들고,
//! 컴파일 단계에 불변 값으로 넘깁니다. 캐시하지 않습니다.
//!
//! # 모듈 구조
//!
//! - `column`: 컬럼 디스크립터와 비교 가능성(comparability) 분류

mod column;

pub use column::{ColumnCatalog, ColumnDescriptor, Comparability};
