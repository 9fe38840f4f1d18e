//! `/objects` 핸들러
//!
//! HTTP 요청을 `CrudRequest`로 바꿔 엔진에 넘기고, `CrudResponse`를 HTTP 응답으로 바꿉니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use tk_core::auth::UserRole;
use tk_core::{Error, Field, MatchCriterion, ObjectId, SearchCriteria};
use tk_sql::{CrudRequest, CrudResponse};

use crate::error::Result;
use crate::middleware::authorize;
use crate::state::AppState;

type QueryPairs = std::result::Result<Query<Vec<(String, String)>>, QueryRejection>;
type FieldsBody = std::result::Result<Json<Vec<Field>>, JsonRejection>;

/// `CrudResponse` → HTTP 응답
pub struct CrudReply(pub CrudResponse);

impl IntoResponse for CrudReply {
    fn into_response(self) -> Response {
        match self.0 {
            CrudResponse::Created(id) => (StatusCode::CREATED, Json(id)).into_response(),
            CrudResponse::Page(result) => Json(result).into_response(),
            CrudResponse::Found(fields) => Json(fields).into_response(),
            CrudResponse::Updated | CrudResponse::Deleted => StatusCode::OK.into_response(),
        }
    }
}

async fn run(state: &AppState, request: CrudRequest) -> Result<CrudReply> {
    tracing::debug!(
        operation = request.operation().as_str(),
        object_type = request.object_type(),
        "dispatching"
    );
    Ok(CrudReply(state.engine.execute(request).await?))
}

/// GET /objects/{objectType}
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(object_type): Path<String>,
    headers: HeaderMap,
    query: QueryPairs,
) -> Result<CrudReply> {
    authorize(&state, &headers, UserRole::ANY)?;
    let Query(pairs) = query?;
    let criteria = parse_search_query(&pairs)?;
    run(&state, CrudRequest::Search { object_type, criteria }).await
}

/// POST /objects/{objectType}
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(object_type): Path<String>,
    headers: HeaderMap,
    body: FieldsBody,
) -> Result<CrudReply> {
    authorize(&state, &headers, UserRole::ADMINS)?;
    let Json(fields) = body?;
    run(&state, CrudRequest::Create { object_type, fields }).await
}

/// GET /objects/{objectType}/{id}
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path((object_type, id)): Path<(String, String)>,
    headers: HeaderMap,
    query: QueryPairs,
) -> Result<CrudReply> {
    authorize(&state, &headers, UserRole::ANY)?;
    let id: ObjectId = id.parse()?;
    let Query(pairs) = query?;
    let fields = parse_field_names(&pairs)?;
    run(
        &state,
        CrudRequest::GetOne {
            object_type,
            id,
            fields,
        },
    )
    .await
}

/// PUT /objects/{objectType}/{id}
pub async fn update_one(
    State(state): State<Arc<AppState>>,
    Path((object_type, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: FieldsBody,
) -> Result<CrudReply> {
    authorize(&state, &headers, UserRole::ADMINS)?;
    let id: ObjectId = id.parse()?;
    let Json(fields) = body?;
    run(
        &state,
        CrudRequest::UpdateOne {
            object_type,
            id,
            fields,
        },
    )
    .await
}

/// DELETE /objects/{objectType}/{id}
pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path((object_type, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<CrudReply> {
    authorize(&state, &headers, UserRole::ADMINS)?;
    let id: ObjectId = id.parse()?;
    run(&state, CrudRequest::DeleteOne { object_type, id }).await
}

fn not_allowed(key: &str) -> Error {
    Error::validation(format!("\"{}\" is not allowed", key), &[key])
}

fn parse_int(key: &str, value: &str) -> tk_core::Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("\"{}\" must be a number", key), &[key]))
}

/// `name[a][b]` → `("name", ["a", "b"])`
fn split_brackets(key: &str) -> Option<(&str, Vec<&str>)> {
    let open = key.find('[')?;
    let (name, mut rest) = key.split_at(open);
    let mut parts = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        parts.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    Some((name, parts))
}

#[derive(Default)]
struct PartialCriterion {
    field_name: Option<String>,
    value: Option<String>,
    match_type: Option<String>,
}

impl PartialCriterion {
    fn slot(&mut self, prop: &str) -> Option<&mut Option<String>> {
        match prop {
            "fieldName" => Some(&mut self.field_name),
            "value" => Some(&mut self.value),
            "matchType" => Some(&mut self.match_type),
            _ => None,
        }
    }

    fn finish(self) -> tk_core::Result<MatchCriterion> {
        let required = |v: Option<String>, name: &str| {
            v.ok_or_else(|| {
                Error::validation(format!("\"{}\" is required", name), &["matchCriteria", name])
            })
        };
        let field_name = required(self.field_name, "fieldName")?;
        let value = required(self.value, "value")?;
        let match_type = required(self.match_type, "matchType")?.parse()?;
        Ok(MatchCriterion {
            field_name,
            value,
            match_type,
        })
    }
}

/// 검색 쿼리 스트링 → `SearchCriteria`
///
/// 매칭 조건은 `matchCriteria[i][prop]`(인덱스 순) 또는 `matchCriteria[][prop]`
/// (같은 prop이 다시 나오면 다음 조건)으로 받습니다.
pub fn parse_search_query(pairs: &[(String, String)]) -> tk_core::Result<SearchCriteria> {
    let mut criteria = SearchCriteria::default();
    let mut indexed: BTreeMap<usize, PartialCriterion> = BTreeMap::new();
    let mut appended: Vec<PartialCriterion> = Vec::new();

    for (key, value) in pairs {
        match key.as_str() {
            "pageSize" => criteria.page_size = Some(parse_int(key, value)?),
            "pageNumber" => criteria.page_number = Some(parse_int(key, value)?),
            "sortBy" => criteria.sort_by = Some(value.clone()),
            "sortOrder" => criteria.sort_order = Some(value.parse()?),
            _ => {
                let Some(("matchCriteria", parts)) = split_brackets(key) else {
                    return Err(not_allowed(key));
                };
                let [index, prop] = parts.as_slice() else {
                    return Err(not_allowed(key));
                };

                let target = if index.is_empty() {
                    let starts_new = appended
                        .last_mut()
                        .and_then(|c| c.slot(prop))
                        .map_or(true, |slot| slot.is_some());
                    if starts_new {
                        appended.push(PartialCriterion::default());
                    }
                    appended.last_mut()
                } else {
                    let i: usize = index.parse().map_err(|_| not_allowed(key))?;
                    Some(indexed.entry(i).or_default())
                };

                let slot = target
                    .and_then(|c| c.slot(prop))
                    .ok_or_else(|| not_allowed(key))?;
                *slot = Some(value.clone());
            }
        }
    }

    criteria.match_criteria = indexed
        .into_values()
        .chain(appended)
        .map(PartialCriterion::finish)
        .collect::<tk_core::Result<_>>()?;
    Ok(criteria)
}

/// `fieldNames` 쿼리 → 컬럼 목록
///
/// `fieldNames=a`, `fieldNames[]=a`, `fieldNames[i]=a`를 모두 받습니다.
/// 인덱스 표기는 인덱스 순으로 정렬됩니다.
pub fn parse_field_names(pairs: &[(String, String)]) -> tk_core::Result<Vec<String>> {
    let mut plain = Vec::new();
    let mut indexed = BTreeMap::new();

    for (key, value) in pairs {
        if key == "fieldNames" {
            plain.push(value.clone());
            continue;
        }
        match split_brackets(key) {
            Some(("fieldNames", parts)) if parts.len() == 1 => {
                if parts[0].is_empty() {
                    plain.push(value.clone());
                } else {
                    let i: usize = parts[0].parse().map_err(|_| not_allowed(key))?;
                    indexed.insert(i, value.clone());
                }
            }
            _ => return Err(not_allowed(key)),
        }
    }

    Ok(indexed.into_values().chain(plain).collect())
}
