//! Bridge 앱 상태

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use tk_core::auth::TokenValidator;
use tk_sql::CrudEngine;

use crate::config::Config;
use crate::mail::{MailProvider, MailService, MailgunProvider};

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다.
/// 요청 사이에 유지되는 것은 커넥션 풀과 불변 설정뿐입니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// CRUD 엔진 (커넥션 풀 소유)
    pub engine: CrudEngine,

    /// 메일 서비스
    pub mail: MailService,

    /// JWT 검증기. `None`이면 인증 비활성화
    pub auth: Option<TokenValidator>,
}

impl AppState {
    /// 새 상태 생성
    ///
    /// 풀은 첫 요청 때 연결하므로 DB 없이도 기동됩니다.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let options: PgConnectOptions = config.database_url.parse()?;
        let pool = PgPoolOptions::new()
            .max_connections(config.db_pool_size)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout_secs))
            .connect_lazy_with(options);

        let provider = Arc::new(MailgunProvider::new(
            &config.mailgun_base_url,
            &config.mailgun_domain,
            &config.mailgun_api_key,
        ));

        Ok(Self::with_parts(config.clone(), pool, provider))
    }

    /// 풀과 메일 프로바이더를 직접 지정
    pub fn with_parts(config: Config, pool: PgPool, provider: Arc<dyn MailProvider>) -> Self {
        let engine = CrudEngine::new(pool);
        let mail = MailService::new(engine.clone(), provider);
        let auth = if config.disable_auth {
            tracing::warn!("authentication is disabled; every request acts as super-admin");
            None
        } else {
            config.auth_secret.as_deref().map(TokenValidator::new)
        };

        Self {
            config,
            engine,
            mail,
            auth,
        }
    }
}
