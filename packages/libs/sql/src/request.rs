//! CRUD 요청/응답
//!
//! 엔진이 처리하는 다섯 가지 연산을 닫힌 enum으로 표현합니다.
//! `validate()`는 저장소에 닿기 전에 연산별 입력 구조를 검사합니다.

use tk_core::{Error, Field, ObjectId, Result, SearchCriteria, SearchResult};

use crate::ident::Ident;

/// 연산 종류 (로그/스팬 이름)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Search,
    GetOne,
    UpdateOne,
    DeleteOne,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Search => "search",
            Operation::GetOne => "getOne",
            Operation::UpdateOne => "updateOne",
            Operation::DeleteOne => "deleteOne",
        }
    }
}

/// CRUD 요청
#[derive(Debug, Clone, PartialEq)]
pub enum CrudRequest {
    Create {
        object_type: String,
        fields: Vec<Field>,
    },
    Search {
        object_type: String,
        criteria: SearchCriteria,
    },
    GetOne {
        object_type: String,
        id: ObjectId,
        /// 비어 있으면 모든 컬럼
        fields: Vec<String>,
    },
    UpdateOne {
        object_type: String,
        id: ObjectId,
        fields: Vec<Field>,
    },
    DeleteOne {
        object_type: String,
        id: ObjectId,
    },
}

/// CRUD 응답
#[derive(Debug, Clone, PartialEq)]
pub enum CrudResponse {
    /// 새 행의 id
    Created(i64),
    Page(SearchResult),
    Found(Vec<Field>),
    Updated,
    Deleted,
}

impl CrudRequest {
    pub fn operation(&self) -> Operation {
        match self {
            CrudRequest::Create { .. } => Operation::Create,
            CrudRequest::Search { .. } => Operation::Search,
            CrudRequest::GetOne { .. } => Operation::GetOne,
            CrudRequest::UpdateOne { .. } => Operation::UpdateOne,
            CrudRequest::DeleteOne { .. } => Operation::DeleteOne,
        }
    }

    pub fn object_type(&self) -> &str {
        match self {
            CrudRequest::Create { object_type, .. }
            | CrudRequest::Search { object_type, .. }
            | CrudRequest::GetOne { object_type, .. }
            | CrudRequest::UpdateOne { object_type, .. }
            | CrudRequest::DeleteOne { object_type, .. } => object_type,
        }
    }

    /// 연산별 입력 구조 검증
    pub fn validate(&self) -> Result<()> {
        match self {
            CrudRequest::Create {
                object_type,
                fields,
            }
            | CrudRequest::UpdateOne {
                object_type,
                fields,
                ..
            } => validate_mutation(object_type, fields),
            CrudRequest::Search {
                object_type,
                criteria,
            } => validate_search(object_type, criteria),
            CrudRequest::GetOne {
                object_type,
                fields,
                ..
            } => validate_get_one(object_type, fields),
            CrudRequest::DeleteOne { object_type, .. } => validate_object_type(object_type),
        }
    }
}

pub(crate) fn validate_object_type(object_type: &str) -> Result<()> {
    if object_type.is_empty() {
        return Err(Error::validation(
            "\"objectType\" is not allowed to be empty",
            &["objectType"],
        ));
    }
    Ident::parse(object_type).map(|_| ())
}

/// create / updateOne
pub(crate) fn validate_mutation(object_type: &str, fields: &[Field]) -> Result<()> {
    validate_object_type(object_type)?;
    if fields.is_empty() {
        return Err(Error::validation(
            "\"fields\" must contain at least 1 items",
            &["fields"],
        ));
    }
    for field in fields {
        if field.field_name.is_empty() {
            return Err(Error::validation(
                "\"fieldName\" is not allowed to be empty",
                &["fields", "fieldName"],
            ));
        }
    }
    Ok(())
}

pub(crate) fn validate_search(object_type: &str, criteria: &SearchCriteria) -> Result<()> {
    validate_object_type(object_type)?;
    criteria.validate()
}

pub(crate) fn validate_get_one(object_type: &str, fields: &[String]) -> Result<()> {
    validate_object_type(object_type)?;
    for name in fields {
        Ident::parse(name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_create() {
        let ok = CrudRequest::Create {
            object_type: "games".to_string(),
            fields: vec![Field::new("name", "\"Catan\"")],
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.operation().as_str(), "create");

        let empty = CrudRequest::Create {
            object_type: "games".to_string(),
            fields: vec![],
        };
        assert_eq!(
            empty.validate().unwrap_err().to_string(),
            "\"fields\" must contain at least 1 items"
        );

        let no_table = CrudRequest::Create {
            object_type: String::new(),
            fields: vec![Field::new("name", "\"Catan\"")],
        };
        assert_eq!(no_table.validate().unwrap_err().fields(), &["objectType".to_string()]);
    }

    #[test]
    fn test_validate_search_and_get_one() {
        let search = CrudRequest::Search {
            object_type: "games".to_string(),
            criteria: SearchCriteria {
                page_size: Some(0),
                page_number: Some(1),
                ..Default::default()
            },
        };
        assert_eq!(
            search.validate().unwrap_err().to_string(),
            "\"pageSize\" must be larger than or equal to 1"
        );

        let get_one = CrudRequest::GetOne {
            object_type: "games".to_string(),
            id: ObjectId::new(1).unwrap(),
            fields: vec!["name".to_string(), "bad\"col".to_string()],
        };
        assert_eq!(get_one.validate().unwrap_err().status_code(), 400);

        let delete = CrudRequest::DeleteOne {
            object_type: "\"games\"".to_string(),
            id: ObjectId::new(1).unwrap(),
        };
        assert!(delete.validate().is_ok());
        assert_eq!(delete.object_type(), "\"games\"");
    }
}
