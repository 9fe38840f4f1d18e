//! 컬럼 디스크립터
//!
//! `information_schema.columns`에서 읽은 컬럼 이름/타입입니다.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 컬럼 디스크립터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// 컬럼 이름
    pub name: String,

    /// 선언 타입 (`data_type`, 예: `integer`, `character varying`)
    #[serde(rename = "type")]
    pub data_type: String,

    /// 기반 타입 이름 (`udt_name`, 예: `int4`, `varchar`). CAST 대상으로 사용
    #[serde(default)]
    pub udt_name: String,
}

/// 비교 가능성 분류
///
/// 어떤 매칭 연산자가 허용되는지를 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparability {
    /// `text` 또는 이름에 `char`가 들어간 타입
    Textual,
    /// 그 외 모든 타입
    NonTextual,
}

impl ColumnDescriptor {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        udt_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            udt_name: udt_name.into(),
        }
    }

    /// 요청마다 다시 계산합니다
    pub fn comparability(&self) -> Comparability {
        let data_type = self.data_type.to_ascii_lowercase();
        if data_type == "text" || data_type.contains("char") {
            Comparability::Textual
        } else {
            Comparability::NonTextual
        }
    }

    /// 값 바인딩 시 CAST할 타입 이름
    ///
    /// 식별자 문자만으로 이루어진 경우에만 반환합니다.
    pub fn cast_type(&self) -> Option<&str> {
        let name = if self.udt_name.is_empty() {
            self.data_type.as_str()
        } else {
            self.udt_name.as_str()
        };
        let plain = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ');
        plain.then_some(name)
    }
}

/// 한 테이블의 컬럼 목록
///
/// 요청 스코프 값입니다. 테이블이 없으면 빈 목록이 됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnCatalog {
    table: String,
    columns: Vec<ColumnDescriptor>,
}

impl ColumnCatalog {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// 컬럼 조회. 없으면 테이블과 필드를 지목하는 검증 에러
    pub fn require(&self, name: &str) -> Result<&ColumnDescriptor> {
        self.find(name).ok_or_else(|| {
            Error::validation(
                format!(
                    "There is no such column called '{}' for '{}'",
                    name, self.table
                ),
                &[name],
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparability_classification() {
        let textual = [
            ("name", "text"),
            ("title", "character varying"),
            ("code", "character"),
            ("upper", "TEXT"),
        ];
        for (name, ty) in textual {
            assert_eq!(
                ColumnDescriptor::new(name, ty, "").comparability(),
                Comparability::Textual,
                "{ty}"
            );
        }

        let non_textual = ["integer", "bigint", "boolean", "numeric", "jsonb", "uuid", "date"];
        for ty in non_textual {
            assert_eq!(
                ColumnDescriptor::new("c", ty, "").comparability(),
                Comparability::NonTextual,
                "{ty}"
            );
        }
    }

    #[test]
    fn test_cast_type() {
        assert_eq!(ColumnDescriptor::new("rank", "integer", "int4").cast_type(), Some("int4"));
        assert_eq!(
            ColumnDescriptor::new("at", "timestamp without time zone", "").cast_type(),
            Some("timestamp without time zone")
        );
        assert_eq!(ColumnDescriptor::new("x", "integer", "in\"t4").cast_type(), None);
    }

    #[test]
    fn test_require_unknown_column() {
        let catalog = ColumnCatalog::new(
            "games",
            vec![ColumnDescriptor::new("name", "text", "text")],
        );
        assert!(catalog.require("name").is_ok());

        let err = catalog.require("notexist").unwrap_err();
        assert_eq!(
            err.to_string(),
            "There is no such column called 'notexist' for 'games'"
        );
        assert_eq!(err.status_code(), 400);
    }
}
