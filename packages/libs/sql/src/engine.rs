//! CRUD 엔진
//!
//! 검증 → (검색이면 카탈로그 조회) → 컴파일 → 실행 → 결과 변환 순서로 다섯 연산을 처리합니다.
//! 요청 사이에 유지하는 상태는 커넥션 풀뿐입니다.

use std::future::Future;
use std::time::Instant;

use sqlx::{PgPool, Row};
use tracing::Instrument;

use tk_core::{Error, Field, ObjectId, Result, SearchCriteria, SearchItem, SearchResult};

use crate::builder::{DeleteBuilder, InsertBuilder, SearchBuilder, SelectBuilder, UpdateBuilder};
use crate::catalog;
use crate::ident::Ident;
use crate::request::{
    validate_get_one, validate_mutation, validate_object_type, validate_search, CrudRequest,
    CrudResponse, Operation,
};
use crate::row::{read_id, row_id, row_to_fields};

/// CRUD 엔진
#[derive(Debug, Clone)]
pub struct CrudEngine {
    pool: PgPool,
}

impl CrudEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 요청 실행 (다섯 연산 전체를 처리)
    pub async fn execute(&self, request: CrudRequest) -> Result<CrudResponse> {
        match request {
            CrudRequest::Create {
                object_type,
                fields,
            } => self
                .create(&object_type, &fields)
                .await
                .map(CrudResponse::Created),
            CrudRequest::Search {
                object_type,
                criteria,
            } => self
                .search(&object_type, &criteria)
                .await
                .map(CrudResponse::Page),
            CrudRequest::GetOne {
                object_type,
                id,
                fields,
            } => self
                .get_one(&object_type, id, &fields)
                .await
                .map(CrudResponse::Found),
            CrudRequest::UpdateOne {
                object_type,
                id,
                fields,
            } => self
                .update_one(&object_type, id, &fields)
                .await
                .map(|_| CrudResponse::Updated),
            CrudRequest::DeleteOne { object_type, id } => self
                .delete_one(&object_type, id)
                .await
                .map(|_| CrudResponse::Deleted),
        }
    }

    /// 행 생성 후 새 id 반환
    pub async fn create(&self, object_type: &str, fields: &[Field]) -> Result<i64> {
        observed(Operation::Create, object_type, async {
            validate_mutation(object_type, fields)?;
            let table = Ident::parse(object_type)?;
            let plan = InsertBuilder::new(&table).build(fields)?;

            let row = plan.query().fetch_one(&self.pool).await?;
            read_id(&row)
        })
        .await
    }

    /// 검색
    ///
    /// 행 조회와 COUNT 조회는 별도 문장으로 실행되므로, 동시 쓰기가 있으면
    /// `totalRecords`와 `items`가 서로 다른 시점을 반영할 수 있습니다.
    pub async fn search(&self, object_type: &str, criteria: &SearchCriteria) -> Result<SearchResult> {
        observed(Operation::Search, object_type, async {
            validate_search(object_type, criteria)?;
            let table = Ident::parse(object_type)?;
            let catalog = catalog::load(&self.pool, &table).await?;
            let plan = SearchBuilder::new(&table, &catalog).build(criteria)?;

            let rows = plan.rows.query().fetch_all(&self.pool).await?;
            let total_records: i64 = plan.total.query().fetch_one(&self.pool).await?.try_get(0)?;

            let items = rows
                .iter()
                .map(|row| {
                    Ok(SearchItem {
                        object_type: object_type.to_string(),
                        id: row_id(row)?,
                        fields: row_to_fields(row)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(SearchResult {
                total_records,
                total_pages: criteria.total_pages(total_records),
                items,
            })
        })
        .await
    }

    /// 단건 조회. `fields`가 비어 있으면 모든 컬럼
    pub async fn get_one(
        &self,
        object_type: &str,
        id: ObjectId,
        fields: &[String],
    ) -> Result<Vec<Field>> {
        observed(Operation::GetOne, object_type, async {
            validate_get_one(object_type, fields)?;
            let table = Ident::parse(object_type)?;
            let plan = SelectBuilder::new(&table).build(id, fields)?;

            let row = plan
                .query()
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::not_found(object_type, id))?;
            row_to_fields(&row)
        })
        .await
    }

    /// 단건 수정. 대상 행이 없으면 NotFound
    pub async fn update_one(&self, object_type: &str, id: ObjectId, fields: &[Field]) -> Result<()> {
        observed(Operation::UpdateOne, object_type, async {
            validate_mutation(object_type, fields)?;
            let table = Ident::parse(object_type)?;
            let plan = UpdateBuilder::new(&table).build(id, fields)?;

            let result = plan.query().execute(&self.pool).await?;
            if result.rows_affected() == 0 {
                return Err(Error::not_found(object_type, id));
            }
            Ok(())
        })
        .await
    }

    /// 단건 삭제. 대상 행이 없으면 NotFound
    pub async fn delete_one(&self, object_type: &str, id: ObjectId) -> Result<()> {
        observed(Operation::DeleteOne, object_type, async {
            validate_object_type(object_type)?;
            let table = Ident::parse(object_type)?;
            let plan = DeleteBuilder::new(&table).build(id);

            let result = plan.query().execute(&self.pool).await?;
            if result.rows_affected() == 0 {
                return Err(Error::not_found(object_type, id));
            }
            Ok(())
        })
        .await
    }
}

/// 연산을 스팬으로 감싸고 결과/소요 시간을 기록
async fn observed<T, F>(operation: Operation, object_type: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let span = tracing::debug_span!("crud", op = operation.as_str(), table = object_type);
    async move {
        let started = Instant::now();
        let result = fut.await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::debug!(elapsed_ms, "completed"),
            Err(err @ (Error::Validation { .. } | Error::NotFound { .. })) => {
                tracing::warn!(elapsed_ms, code = err.code(), error = %err, "rejected")
            }
            Err(err) => tracing::error!(elapsed_ms, code = err.code(), error = %err, "failed"),
        }
        result
    }
    .instrument(span)
    .await
}
