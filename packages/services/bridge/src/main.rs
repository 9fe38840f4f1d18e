//! Tablekit Bridge
//!
//! `/api/<version>/objects` 아래에서 스키마에 무관한 CRUD를,
//! `/api/<version>/emails` 아래에서 트랜잭션 메일을 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod mail;
mod middleware;
mod state;

use config::Config;
use handlers::{emails, health, objects};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "tk_bridge=debug,tk_sql=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("Starting Bridge with config: {:?}", config);

    // 앱 상태 초기화
    let state = AppState::new(&config).await?;
    let state = Arc::new(state);

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Bridge listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Objects
        .route(
            "/objects/{object_type}",
            get(objects::search).post(objects::create),
        )
        .route(
            "/objects/{object_type}/{id}",
            get(objects::get_one)
                .put(objects::update_one)
                .delete(objects::delete_one),
        )
        // Emails
        .route("/emails", post(emails::send_mail))
        .route("/emails/stats", get(emails::get_mail_statistics))
        .route(
            "/emails/{id}",
            get(emails::get_mail).delete(emails::delete_mail),
        )
        .route("/emails/{id}/deliveryStatus", get(emails::get_mail_status));

    let prefix = format!("/api/{}", state.config.api_version);

    Router::new()
        .nest(&prefix, api)
        // Health check
        .route("/health", get(health::health_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}
