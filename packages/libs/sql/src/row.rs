//! 결과 행 변환
//!
//! Postgres 행을 `Field` 목록으로 평탄화합니다.
//! 각 컬럼 값은 네이티브 타입으로 디코딩한 뒤 JSON 텍스트로 인코딩합니다.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::{PgRow, PgTypeKind};
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo};

use tk_core::{Field, Result};

use crate::ident::ID_COLUMN;

/// 행 → Field 목록 (컬럼 순서 유지)
pub fn row_to_fields(row: &PgRow) -> Result<Vec<Field>> {
    row.columns()
        .iter()
        .map(|column| {
            let value = column_value(row, column.ordinal())?;
            Ok(Field::encode(column.name(), &value))
        })
        .collect()
}

/// `id` 컬럼 값 (없으면 null)
pub fn row_id(row: &PgRow) -> Result<Value> {
    match row.columns().iter().find(|c| c.name() == ID_COLUMN) {
        Some(c) => column_value(row, c.ordinal()),
        None => Ok(Value::Null),
    }
}

/// `RETURNING id` 결과 읽기
///
/// PK가 int2/int4/int8 중 무엇이든 i64로 돌려줍니다.
pub fn read_id(row: &PgRow) -> Result<i64> {
    if let Ok(id) = row.try_get::<i64, _>(0) {
        return Ok(id);
    }
    if let Ok(id) = row.try_get::<i32, _>(0) {
        return Ok(id.into());
    }
    Ok(row.try_get::<i16, _>(0)?.into())
}

/// 1차원 배열 → JSON 배열 (NULL 원소는 null)
fn array<T, F>(row: &PgRow, index: usize, to_json: F) -> std::result::Result<Option<Value>, sqlx::Error>
where
    Vec<Option<T>>: for<'r> Decode<'r, Postgres> + Type<Postgres>,
    F: Fn(T) -> Value,
{
    row.try_get::<Option<Vec<Option<T>>>, _>(index).map(|v| {
        v.map(|items| {
            Value::Array(
                items
                    .into_iter()
                    .map(|item| item.map_or(Value::Null, &to_json))
                    .collect(),
            )
        })
    })
}

/// 컬럼 하나를 타입 이름에 따라 디코딩
///
/// 텍스트로 옮길 방법이 없는 타입(`inet`, `interval` 등)은 컬럼 디코딩 에러입니다.
pub fn column_value(row: &PgRow, index: usize) -> Result<Value> {
    let column = &row.columns()[index];
    let type_info = column.type_info();
    let type_name = type_info.name().to_ascii_uppercase();

    let decoded: std::result::Result<Option<Value>, sqlx::Error> = match type_name.as_str() {
        "INT2" => row.try_get::<Option<i16>, _>(index).map(|v| v.map(Value::from)),
        "INT4" => row.try_get::<Option<i32>, _>(index).map(|v| v.map(Value::from)),
        "INT8" => row.try_get::<Option<i64>, _>(index).map(|v| v.map(Value::from)),
        "FLOAT4" => row.try_get::<Option<f32>, _>(index).map(|v| v.map(Value::from)),
        "FLOAT8" => row.try_get::<Option<f64>, _>(index).map(|v| v.map(Value::from)),
        // 정밀도 유지를 위해 문자열
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(index)
            .map(|v| v.map(|d| Value::String(d.to_string()))),
        "BOOL" => row.try_get::<Option<bool>, _>(index).map(|v| v.map(Value::Bool)),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => row
            .try_get::<Option<String>, _>(index)
            .map(|v| v.map(Value::String)),
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index),
        "UUID" => row
            .try_get::<Option<uuid::Uuid>, _>(index)
            .map(|v| v.map(|u| Value::String(u.to_string()))),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .map(|v| v.map(|d| Value::String(d.to_string()))),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(index)
            .map(|v| v.map(|t| Value::String(t.to_string()))),
        "TIMESTAMP" => row.try_get::<Option<NaiveDateTime>, _>(index).map(|v| {
            v.map(|t| Value::String(t.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()))
        }),
        "TIMESTAMPTZ" => row.try_get::<Option<DateTime<Utc>>, _>(index).map(|v| {
            v.map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true)))
        }),
        "_INT2" => array::<i16, _>(row, index, Value::from),
        "_INT4" => array::<i32, _>(row, index, Value::from),
        "_INT8" => array::<i64, _>(row, index, Value::from),
        "_FLOAT4" => array::<f32, _>(row, index, Value::from),
        "_FLOAT8" => array::<f64, _>(row, index, Value::from),
        "_BOOL" => array::<bool, _>(row, index, Value::Bool),
        "_NUMERIC" => array::<Decimal, _>(row, index, |d| Value::String(d.to_string())),
        "_TEXT" | "_VARCHAR" | "_BPCHAR" | "_NAME" => {
            array::<String, _>(row, index, Value::String)
        }
        "_UUID" => array::<uuid::Uuid, _>(row, index, |u| Value::String(u.to_string())),
        // enum의 바이너리 표현은 라벨 텍스트
        _ if matches!(type_info.kind(), PgTypeKind::Enum(_)) => row
            .try_get_unchecked::<Option<String>, _>(index)
            .map(|v| v.map(Value::String)),
        _ => {
            return Err(sqlx::Error::ColumnDecode {
                index: column.name().to_string(),
                source: format!("unsupported column type {}", type_info.name()).into(),
            }
            .into())
        }
    };

    match decoded {
        Ok(value) => Ok(value.unwrap_or(Value::Null)),
        Err(err) => {
            tracing::warn!(
                column = column.name(),
                type_name = %type_name,
                error = %err,
                "undecodable column value, returning null"
            );
            Ok(Value::Null)
        }
    }
}
