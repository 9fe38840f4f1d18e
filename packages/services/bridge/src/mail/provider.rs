//! 메일 프로바이더 추상화
//!
//! 서비스 로직은 이 trait만 알고, 실제 HTTP 호출은 구현체(`MailgunProvider`)가 담당합니다.

use async_trait::async_trait;
use serde::Deserialize;

use tk_core::Result;

use super::model::FilePart;

/// 프로바이더로 보낼 메시지 (폼 필드 단위)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub from: String,
    /// 쉼표로 이어 붙인 수신자
    pub to: String,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub attachments: Vec<FilePart>,
    pub inline: Vec<FilePart>,
    /// `h:<name>`으로 전송
    pub headers: Vec<(String, String)>,
    /// `o:deliverytime`
    pub delivery_time: Option<String>,
}

/// 메시지 이벤트 로그 항목
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MailEvent {
    pub event: String,
    /// unix 초
    pub timestamp: f64,
}

/// 이벤트별 통계 항목
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatsItem {
    pub event: String,
    #[serde(default)]
    pub total_count: i64,
    /// RFC 2822 시각
    #[serde(default)]
    pub created_at: String,
}

/// 메일 프로바이더
///
/// 실패는 `Error::Provider { status, message }`로 반환합니다.
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// 발송 후 프로바이더 메시지 id (`<...>` 형태) 반환
    async fn send(&self, message: OutgoingMessage) -> Result<String>;

    /// 메시지 id로 이벤트 조회
    async fn events(&self, message_id: &str) -> Result<Vec<MailEvent>>;

    /// 이벤트 종류별 통계 조회
    async fn stats(&self, events: &[&str], duration: &str) -> Result<Vec<StatsItem>>;
}
