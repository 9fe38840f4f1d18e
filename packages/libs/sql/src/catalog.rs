//! 컬럼 카탈로그 조회
//!
//! `information_schema.columns`를 한 번 읽어 `ColumnCatalog`를 만듭니다.
//! 테이블이 없으면 빈 카탈로그를 반환하고, 판단은 이후 쿼리에서 저장소에 맡깁니다.

use sqlx::{PgPool, Row};

use tk_core::{ColumnCatalog, ColumnDescriptor, Result};

use crate::ident::Ident;

/// 테이블 이름은 바인딩하며, information_schema 도메인 타입은 text로 캐스트합니다
pub const CATALOG_SQL: &str = "SELECT column_name::text AS column_name, \
     data_type::text AS data_type, \
     udt_name::text AS udt_name \
     FROM information_schema.columns \
     WHERE table_name = $1 \
     ORDER BY ordinal_position";

/// 테이블의 컬럼 목록 조회 (읽기 전용, 1회 왕복)
pub async fn load(pool: &PgPool, table: &Ident) -> Result<ColumnCatalog> {
    let rows = sqlx::query(CATALOG_SQL)
        .bind(table.as_str())
        .fetch_all(pool)
        .await?;

    let columns = rows
        .iter()
        .map(|row| {
            Ok(ColumnDescriptor::new(
                row.try_get::<String, _>("column_name")?,
                row.try_get::<String, _>("data_type")?,
                row.try_get::<String, _>("udt_name")?,
            ))
        })
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

    tracing::debug!(table = table.as_str(), columns = columns.len(), "catalog loaded");
    Ok(ColumnCatalog::new(table.as_str(), columns))
}
