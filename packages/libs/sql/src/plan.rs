//! 컴파일된 쿼리
//!
//! SQL 문자열과 바인딩 값의 쌍입니다. 요청마다 새로 만들고 재사용하지 않습니다.

use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// SQL + 바인딩 값
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub sql: String,
    pub values: Vec<Value>,
}

impl QueryPlan {
    /// SeaQuery 빌드 결과에서 생성
    pub(crate) fn from_built((sql, values): (String, sea_query::Values)) -> Self {
        Self {
            sql,
            values: values.0.into_iter().map(sea_value_to_json).collect(),
        }
    }

    /// 값이 바인딩된 sqlx 쿼리
    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        bind_values(sqlx::query::<Postgres>(&self.sql), self.values.clone())
    }
}

/// 검색용 쿼리 쌍
///
/// 두 쿼리는 같은 WHERE 절을 공유합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    /// 행 조회 (ORDER BY / LIMIT / OFFSET 포함)
    pub rows: QueryPlan,

    /// `COUNT(*)` 조회
    pub total: QueryPlan,
}

fn sea_value_to_json(value: sea_query::Value) -> Value {
    use sea_query::Value as V;

    match value {
        V::Bool(v) => v.map(Value::Bool),
        V::TinyInt(v) => v.map(Value::from),
        V::SmallInt(v) => v.map(Value::from),
        V::Int(v) => v.map(Value::from),
        V::BigInt(v) => v.map(Value::from),
        V::TinyUnsigned(v) => v.map(Value::from),
        V::SmallUnsigned(v) => v.map(Value::from),
        V::Unsigned(v) => v.map(Value::from),
        V::BigUnsigned(v) => v.map(Value::from),
        V::Float(v) => v.map(Value::from),
        V::Double(v) => v.map(Value::from),
        V::String(v) => v.map(|s| Value::String(*s)),
        V::Char(v) => v.map(|c| Value::String(c.to_string())),
        V::Json(v) => v.map(|j| *j),
        other => {
            tracing::warn!(value = ?other, "unsupported bind value type");
            None
        }
    }
    .unwrap_or(Value::Null)
}

/// JSON 값을 종류에 맞는 Postgres 타입으로 바인딩
///
/// 배열/객체는 JSONB로, 나머지 스칼라는 네이티브 타입으로 바인딩합니다.
pub(crate) fn bind_values<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    values: Vec<Value>,
) -> Query<'q, Postgres, PgArguments> {
    for value in values {
        match value {
            Value::Null => {
                let v: Option<String> = None;
                query = query.bind(v);
            }
            Value::Bool(b) => query = query.bind(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query = query.bind(i);
                } else if let Some(f) = n.as_f64() {
                    query = query.bind(f);
                } else {
                    query = query.bind(n.to_string());
                }
            }
            Value::String(s) => query = query.bind(s),
            Value::Array(_) | Value::Object(_) => {
                query = query.bind(sqlx::types::Json(value));
            }
        }
    }
    query
}
