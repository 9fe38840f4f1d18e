//! 메일 서비스
//!
//! 프로바이더로 발송하고, 성공한 메일만 CRUD 엔진을 통해 `emails` 테이블에 기록합니다.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use tk_core::{Error, Field, ObjectId, Result};
use tk_sql::CrudEngine;

use super::model::{
    parse_iso_date, split_header, DeleteMailResponse, DeleteResult, DeliveryStatus, Email,
    MailStatistics, SendMailResponse, SendResult,
};
use super::provider::{MailEvent, MailProvider, OutgoingMessage, StatsItem};

/// 메일 기록 테이블
pub const EMAILS_TABLE: &str = "emails";

const ACCEPTED: &str = "accepted";
const DELIVERED: &str = "delivered";
const FAILED: &str = "failed";

/// 통계 조회 기간 (한 달)
const STATS_DURATION: &str = "1m";

/// 메일 서비스
#[derive(Clone)]
pub struct MailService {
    engine: CrudEngine,
    provider: Arc<dyn MailProvider>,
}

impl MailService {
    pub fn new(engine: CrudEngine, provider: Arc<dyn MailProvider>) -> Self {
        Self { engine, provider }
    }

    /// 발송 후 기록
    pub async fn send_mail(&self, mut email: Email) -> Result<SendMailResponse> {
        email.validate()?;

        let scheduled = schedule_delivery(&mut email, Utc::now());
        let message = build_message(&email, scheduled)?;

        let mgid = self.provider.send(message).await?;

        let record = [
            Field::encode("data", &serde_json::to_value(&email)?),
            Field::encode("mgid", &Value::String(mgid)),
        ];
        let id = self.engine.create(EMAILS_TABLE, &record).await?;

        Ok(SendMailResponse {
            result: SendResult {
                success: true,
                code: 200,
            },
            id,
        })
    }

    /// 저장된 메일 원문
    pub async fn get_mail(&self, id: ObjectId) -> Result<Value> {
        let value = self.stored_value(id, "data").await?;
        match value {
            // text 컬럼에 저장된 경우
            Value::String(text) => Ok(serde_json::from_str(&text)?),
            other => Ok(other),
        }
    }

    /// 프로바이더 이벤트 로그 기준 전달 상태
    pub async fn get_mail_status(&self, id: ObjectId) -> Result<DeliveryStatus> {
        let mgid = match self.stored_value(id, "mgid").await? {
            Value::String(s) => s,
            other => other.to_string(),
        };

        let events = self.provider.events(strip_brackets(&mgid)).await?;
        latest_status(&events).ok_or_else(|| Error::Provider {
            status: 404,
            message: format!(
                "mail id {} not found from mailgun event logs. could be deleted from mailgun event logs.",
                id
            ),
        })
    }

    pub async fn delete_mail(&self, id: ObjectId) -> Result<DeleteMailResponse> {
        self.engine.delete_one(EMAILS_TABLE, id).await?;
        Ok(DeleteMailResponse {
            id: id.get(),
            result: DeleteResult {
                success: true,
                message: format!("email id {} successfully deleted.", id),
            },
        })
    }

    /// 최근 한 달 accepted / failed / delivered 합계
    pub async fn get_mail_statistics(&self) -> Result<MailStatistics> {
        let items = self
            .provider
            .stats(&[ACCEPTED, FAILED, DELIVERED], STATS_DURATION)
            .await?;
        Ok(summarize_stats(items))
    }

    async fn stored_value(&self, id: ObjectId, column: &str) -> Result<Value> {
        let fields = self
            .engine
            .get_one(EMAILS_TABLE, id, &[column.to_string()])
            .await?;
        fields
            .first()
            .map(Field::decode)
            .transpose()?
            .ok_or_else(|| Error::not_found(EMAILS_TABLE, id))
    }
}

/// `Tue, 01 Jan 2030 00:00:00 GMT`
fn utc_string(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// 예약 발송 시각 결정
///
/// `delivery_time`이 미래면 프로바이더 형식(`... 0000`)으로 바꿔 반환하고,
/// 아니면 지금 시각을 기록하고 `None`을 반환합니다.
pub fn schedule_delivery(email: &mut Email, now: DateTime<Utc>) -> Option<String> {
    let requested = email.delivery_time.as_deref().and_then(parse_iso_date);
    match requested {
        Some(at) if at > now => {
            let formatted = utc_string(at).replace(" GMT", " 0000");
            email.delivery_time = Some(formatted.clone());
            Some(formatted)
        }
        _ => {
            email.delivery_time = Some(utc_string(now));
            None
        }
    }
}

/// 프로바이더 메시지 구성
pub fn build_message(email: &Email, delivery_time: Option<String>) -> Result<OutgoingMessage> {
    let headers = email
        .headers
        .iter()
        .flatten()
        .filter_map(|h| split_header(h))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    Ok(OutgoingMessage {
        from: email.sender.clone(),
        to: email.recipients.join(","),
        cc: email.cc_recipients.as_ref().map(|v| v.join(",")),
        bcc: email.bcc_recipients.as_ref().map(|v| v.join(",")),
        subject: email.subject.clone(),
        text: email.text_body.clone(),
        html: email.html_body.clone(),
        attachments: email.attachment_parts()?,
        inline: email.inline_parts()?,
        headers,
        delivery_time,
    })
}

/// 저장된 메시지 id는 `<...>`로 감싸져 있음
fn strip_brackets(mgid: &str) -> &str {
    mgid.strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(mgid)
}

/// 가장 최근 이벤트로 전달 상태 결정
pub fn latest_status(events: &[MailEvent]) -> Option<DeliveryStatus> {
    let latest = events
        .iter()
        .max_by(|a, b| a.timestamp.total_cmp(&b.timestamp))?;

    if latest.event == DELIVERED {
        let millis = (latest.timestamp * 1000.0) as i64;
        let delivery_time = DateTime::from_timestamp_millis(millis)
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true));
        Some(DeliveryStatus {
            delivered: true,
            delivery_time,
            delivery_status: None,
        })
    } else {
        Some(DeliveryStatus {
            delivered: false,
            delivery_time: None,
            delivery_status: Some(latest.event.clone()),
        })
    }
}

/// 이벤트별 가장 최근 항목의 합계
pub fn summarize_stats(mut items: Vec<StatsItem>) -> MailStatistics {
    items.sort_by_key(|i| std::cmp::Reverse(DateTime::parse_from_rfc2822(&i.created_at).ok()));

    let latest = |event: &str| items.iter().find(|i| i.event == event).map(|i| i.total_count);
    MailStatistics {
        delivered: latest(DELIVERED),
        failed: latest(FAILED),
        accepted: latest(ACCEPTED),
    }
}
