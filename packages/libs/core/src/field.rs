//! Field 타입과 encoded-scalar 변환
//!
//! 모든 필드 값은 "JSON 리터럴 텍스트"로 주고받습니다.
//! `"5"`는 문자열 `5`, `5`는 숫자 `5`, `"null"`은 문자열 `null`을 뜻합니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// 필드 이름/값 쌍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Field {
    /// 컬럼 이름 (따옴표로 감싸져 있을 수 있음)
    pub field_name: String,

    /// encoded-scalar (JSON 텍스트)
    pub field_value: String,
}

impl Field {
    pub fn new(field_name: impl Into<String>, field_value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            field_value: field_value.into(),
        }
    }

    /// 네이티브 값을 encoded-scalar로 감싸서 생성
    pub fn encode(field_name: impl Into<String>, value: &Value) -> Self {
        Self::new(field_name, encode_scalar(value))
    }

    /// 값 디코딩. 실패 시 이 필드 이름을 지목하는 검증 에러
    pub fn decode(&self) -> Result<Value> {
        decode_scalar(&self.field_name, &self.field_value)
    }
}

/// JSON 텍스트 → 타입이 있는 값
pub fn decode_scalar(field_name: &str, encoded: &str) -> Result<Value> {
    serde_json::from_str(encoded).map_err(|_| Error::invalid_field_value(field_name))
}

/// 값 → JSON 텍스트
pub fn encode_scalar(value: &Value) -> String {
    value.to_string()
}
