//! Bridge 설정

use std::env;

/// Bridge 설정
#[derive(Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// 라우트 prefix (`/api/<version>`)
    pub api_version: String,

    /// Postgres 연결 문자열
    pub database_url: String,

    /// 최대 커넥션 수
    pub db_pool_size: u32,

    /// 커넥션 대기 한도 (초). 넘으면 PoolExhausted
    pub db_acquire_timeout_secs: u64,

    /// 유휴 커넥션 정리 시간 (초)
    pub db_idle_timeout_secs: u64,

    /// HS256 JWT 시크릿
    pub auth_secret: Option<String>,

    /// Auth 비활성화 (개발용)
    pub disable_auth: bool,

    pub mailgun_api_key: String,
    pub mailgun_domain: String,
    pub mailgun_base_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("api_version", &self.api_version)
            .field("db_pool_size", &self.db_pool_size)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("db_idle_timeout_secs", &self.db_idle_timeout_secs)
            .field("disable_auth", &self.disable_auth)
            .field("mailgun_domain", &self.mailgun_domain)
            .field("mailgun_base_url", &self.mailgun_base_url)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            api_version: "v1".to_string(),
            database_url: "postgres://localhost/tablekit".to_string(),
            db_pool_size: 10,
            db_acquire_timeout_secs: 30,
            db_idle_timeout_secs: 30,
            auth_secret: None,
            disable_auth: false,
            mailgun_api_key: String::new(),
            mailgun_domain: String::new(),
            mailgun_base_url: "https://api.mailgun.net/v3".to_string(),
        }
    }
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            port: env::var("TK_BRIDGE_PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()?,

            api_version: env::var("TK_API_VERSION").unwrap_or(defaults.api_version),

            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),

            db_pool_size: env::var("TK_DB_POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_pool_size),

            db_acquire_timeout_secs: env::var("TK_DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_acquire_timeout_secs),

            db_idle_timeout_secs: env::var("TK_DB_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_idle_timeout_secs),

            auth_secret: env::var("TK_AUTH_SECRET").ok().filter(|s| !s.is_empty()),

            disable_auth: env::var("TK_DISABLE_AUTH")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),

            mailgun_api_key: env::var("MAILGUN_API_KEY").unwrap_or_default(),
            mailgun_domain: env::var("MAILGUN_DOMAIN").unwrap_or_default(),
            mailgun_base_url: env::var("MAILGUN_BASE_URL").unwrap_or(defaults.mailgun_base_url),
        };

        if config.auth_secret.is_none() && !config.disable_auth {
            anyhow::bail!("TK_AUTH_SECRET is required unless TK_DISABLE_AUTH=true");
        }

        Ok(config)
    }
}
