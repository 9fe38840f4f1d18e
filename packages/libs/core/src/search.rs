//! 검색 조건과 검색 결과
//!
//! `GET /objects/{objectType}`의 쿼리 파라미터가 이 타입들로 변환됩니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::field::{decode_scalar, Field};
use crate::schema::Comparability;

/// 매칭 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// 부분 문자열 (ILIKE `%v%`)
    PartialMatching,
    /// 문자열 일치
    ExactMatching,
    Greater,
    GreaterOrEqual,
    Equal,
    Less,
    LessOrEqual,
}

impl MatchType {
    pub const ALL: [MatchType; 7] = [
        MatchType::PartialMatching,
        MatchType::ExactMatching,
        MatchType::Greater,
        MatchType::GreaterOrEqual,
        MatchType::Equal,
        MatchType::Less,
        MatchType::LessOrEqual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::PartialMatching => "PartialMatching",
            MatchType::ExactMatching => "ExactMatching",
            MatchType::Greater => "Greater",
            MatchType::GreaterOrEqual => "GreaterOrEqual",
            MatchType::Equal => "Equal",
            MatchType::Less => "Less",
            MatchType::LessOrEqual => "LessOrEqual",
        }
    }

    /// 이 매칭 방식이 해당 분류의 컬럼에 허용되는지
    ///
    /// 문자열 매칭은 텍스트 컬럼에만, 범위/동등 비교는 텍스트가 아닌 컬럼에만 허용됩니다.
    pub fn accepts(&self, class: Comparability) -> bool {
        let textual_match = matches!(self, MatchType::PartialMatching | MatchType::ExactMatching);
        textual_match == (class == Comparability::Textual)
    }
}

impl FromStr for MatchType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MatchType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                Error::validation(
                    "\"matchType\" must be one of [PartialMatching, ExactMatching, Greater, GreaterOrEqual, Equal, Less, LessOrEqual]",
                    &["matchType"],
                )
            })
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 정렬 순서
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Ascending" => Ok(SortOrder::Ascending),
            "Descending" => Ok(SortOrder::Descending),
            _ => Err(Error::validation(
                "\"sortOrder\" must be one of [Ascending, Descending]",
                &["sortOrder"],
            )),
        }
    }
}

/// 단일 매칭 조건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCriterion {
    pub field_name: String,

    /// encoded-scalar
    pub value: String,

    pub match_type: MatchType,
}

impl MatchCriterion {
    pub fn new(field_name: impl Into<String>, value: impl Into<String>, match_type: MatchType) -> Self {
        Self {
            field_name: field_name.into(),
            value: value.into(),
            match_type,
        }
    }

    /// 바인딩할 값
    ///
    /// `PartialMatching`이면 디코딩한 값을 `%value%`로 감쌉니다.
    pub fn bind_value(&self) -> Result<Value> {
        let value = decode_scalar(&self.field_name, &self.value)?;
        if self.match_type != MatchType::PartialMatching {
            return Ok(value);
        }
        let inner = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Ok(Value::String(format!("%{}%", inner)))
    }
}

/// 검색 조건
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// AND로 결합되는 조건들 (같은 필드의 중복도 모두 적용)
    #[serde(default)]
    pub match_criteria: Vec<MatchCriterion>,

    #[serde(default)]
    pub page_size: Option<i64>,

    #[serde(default)]
    pub page_number: Option<i64>,

    #[serde(default)]
    pub sort_by: Option<String>,

    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

/// LIMIT / OFFSET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl SearchCriteria {
    /// 구조 검증 (카탈로그가 필요 없는 부분)
    pub fn validate(&self) -> Result<()> {
        let max = i32::MAX as i64;

        if let Some(size) = self.page_size {
            if size < 1 {
                return Err(Error::validation(
                    "\"pageSize\" must be larger than or equal to 1",
                    &["pageSize"],
                ));
            }
            if size > max {
                return Err(Error::validation(
                    format!("\"pageSize\" must be less than or equal to {}", max),
                    &["pageSize"],
                ));
            }
        }

        if let Some(number) = self.page_number {
            if number < 0 {
                return Err(Error::validation(
                    "\"pageNumber\" must be larger than or equal to 0",
                    &["pageNumber"],
                ));
            }
            if number > max {
                return Err(Error::validation(
                    format!("\"pageNumber\" must be less than or equal to {}", max),
                    &["pageNumber"],
                ));
            }
            if number > 0 && self.page_size.is_none() {
                return Err(Error::validation("\"pageSize\" is required", &["pageSize"]));
            }
        }

        for criterion in &self.match_criteria {
            if criterion.field_name.is_empty() {
                return Err(Error::validation(
                    "\"fieldName\" is not allowed to be empty",
                    &["matchCriteria", "fieldName"],
                ));
            }
        }

        if matches!(self.sort_by.as_deref(), Some("")) {
            return Err(Error::validation(
                "\"sortBy\" is not allowed to be empty",
                &["sortBy"],
            ));
        }

        Ok(())
    }

    /// 페이지네이션은 `pageNumber`가 1 이상일 때만 적용됩니다 (0은 없는 것과 같음)
    pub fn page(&self) -> Option<Page> {
        let number = self.page_number?;
        let size = self.page_size?;
        if number < 1 || size < 1 {
            return None;
        }
        Some(Page {
            limit: size as u64,
            offset: ((number - 1) * size) as u64,
        })
    }

    /// 전체 페이지 수
    ///
    /// 페이지네이션이면 `ceil(total / pageSize)`, 아니면 레코드가 있을 때 1.
    pub fn total_pages(&self, total_records: i64) -> i64 {
        match (self.page_number, self.page_size) {
            (Some(number), Some(size)) if number > 0 && size > 0 => {
                (total_records + size - 1) / size
            }
            _ => {
                if total_records > 0 {
                    1
                } else {
                    0
                }
            }
        }
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }
}

/// 검색 결과 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub object_type: String,

    /// 행의 `id` 컬럼 값 (없으면 null)
    pub id: Value,

    pub fields: Vec<Field>,
}

/// 검색 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub total_records: i64,
    pub total_pages: i64,
    pub items: Vec<SearchItem>,
}
