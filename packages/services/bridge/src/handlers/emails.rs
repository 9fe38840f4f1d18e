//! `/emails` 핸들러
//!
//! 프로바이더 실패는 `{code, message}` 본문과 해당 상태 코드로 그대로 전달합니다.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use tk_core::auth::UserRole;
use tk_core::{Error, ObjectId};

use crate::error::Result;
use crate::mail::SendMailRequest;
use crate::middleware::authorize;
use crate::state::AppState;

fn reply<T: Serialize>(result: tk_core::Result<T>) -> Result<Response> {
    match result {
        Ok(body) => Ok(Json(body).into_response()),
        Err(Error::Provider { status, message }) => {
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok((code, Json(json!({ "code": status, "message": message }))).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /emails
pub async fn send_mail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: std::result::Result<Json<SendMailRequest>, JsonRejection>,
) -> Result<Response> {
    authorize(&state, &headers, UserRole::ANY)?;
    let Json(request) = body?;
    reply(state.mail.send_mail(request.email).await)
}

/// GET /emails/stats
pub async fn get_mail_statistics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    authorize(&state, &headers, UserRole::ANY)?;
    reply(state.mail.get_mail_statistics().await)
}

/// GET /emails/{id}
pub async fn get_mail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    authorize(&state, &headers, UserRole::ANY)?;
    let id: ObjectId = id.parse()?;
    reply(state.mail.get_mail(id).await)
}

/// GET /emails/{id}/deliveryStatus
pub async fn get_mail_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    authorize(&state, &headers, UserRole::ANY)?;
    let id: ObjectId = id.parse()?;
    reply(state.mail.get_mail_status(id).await)
}

/// DELETE /emails/{id}
pub async fn delete_mail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    authorize(&state, &headers, UserRole::ANY)?;
    let id: ObjectId = id.parse()?;
    reply(state.mail.delete_mail(id).await)
}
