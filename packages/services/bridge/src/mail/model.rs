//! 메일 요청/응답 타입과 입력 검증

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tk_core::{Error, Result};

/// `POST /emails` 본문
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMailRequest {
    pub email: Email,
}

/// 발송할 메일
///
/// 발송 후 `delivery_time`이 채워진 형태로 `emails` 테이블에 저장됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Email {
    pub sender: String,
    pub recipients: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc_recipients: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc_recipients: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image>>,

    /// `name:value` 형식
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,

    /// 요청 시 ISO 8601, 저장 시 프로바이더 형식
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Attachment {
    pub file_name: String,
    pub file_type: String,
    /// base64
    pub content_bytes: String,
}

/// 본문에 인라인으로 들어가는 이미지
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Image {
    pub name: String,
    #[serde(rename = "type")]
    pub image_type: String,
    /// base64
    pub content_bytes: String,
}

/// 프로바이더로 보낼 첨부 파일
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// `local@domain.tld` 형태인지만 확인
pub fn is_email(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !address.chars().any(char::is_whitespace)
}

/// `name:value`를 첫 콜론 기준으로 분리
pub fn split_header(header: &str) -> Option<(&str, &str)> {
    let (name, value) = header.split_once(':')?;
    (!name.is_empty() && !value.is_empty()).then_some((name, value))
}

/// ISO 8601 날짜 또는 날짜-시간
pub fn parse_iso_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

fn invalid(path: String, message: &str) -> Error {
    Error::Validation {
        message: format!("\"{}\" {}", path, message),
        fields: vec!["email".to_string(), path],
    }
}

fn check_addresses(name: &str, addresses: &[String]) -> Result<()> {
    for (i, address) in addresses.iter().enumerate() {
        if !is_email(address) {
            return Err(invalid(format!("{name}[{i}]"), "must be a valid email"));
        }
    }
    Ok(())
}

fn decode_base64(path: String, content: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(content)
        .map_err(|_| invalid(path, "must be a valid base64 string"))
}

impl Email {
    pub fn validate(&self) -> Result<()> {
        if !is_email(&self.sender) {
            return Err(invalid("sender".to_string(), "must be a valid email"));
        }
        if self.recipients.is_empty() {
            return Err(invalid(
                "recipients".to_string(),
                "must contain at least 1 items",
            ));
        }
        check_addresses("recipients", &self.recipients)?;
        check_addresses("cc_recipients", self.cc_recipients.as_deref().unwrap_or_default())?;
        check_addresses("bcc_recipients", self.bcc_recipients.as_deref().unwrap_or_default())?;

        for (i, header) in self.headers.iter().flatten().enumerate() {
            if split_header(header).is_none() {
                return Err(invalid(
                    format!("headers[{i}]"),
                    "must be in \"name:value\" format",
                ));
            }
        }

        self.attachment_parts()?;
        self.inline_parts()?;

        if let Some(time) = &self.delivery_time {
            if parse_iso_date(time).is_none() {
                return Err(invalid(
                    "delivery_time".to_string(),
                    "must be a valid ISO 8601 date",
                ));
            }
        }
        Ok(())
    }

    /// 첨부 파일 디코딩
    pub fn attachment_parts(&self) -> Result<Vec<FilePart>> {
        self.attachments
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, a)| {
                Ok(FilePart {
                    file_name: a.file_name.clone(),
                    content_type: a.file_type.clone(),
                    bytes: decode_base64(
                        format!("attachments[{i}].content_bytes"),
                        &a.content_bytes,
                    )?,
                })
            })
            .collect()
    }

    /// 인라인 이미지 디코딩
    pub fn inline_parts(&self) -> Result<Vec<FilePart>> {
        self.images
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, img)| {
                Ok(FilePart {
                    file_name: img.name.clone(),
                    content_type: img.image_type.clone(),
                    bytes: decode_base64(format!("images[{i}].content_bytes"), &img.content_bytes)?,
                })
            })
            .collect()
    }
}

/// 발송 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMailResponse {
    pub result: SendResult,
    /// 저장된 `emails` 행 id
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendResult {
    pub success: bool,
    pub code: u16,
}

/// 전달 상태
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryStatus {
    pub delivered: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<String>,
}

/// 삭제 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteMailResponse {
    pub id: i64,
    pub result: DeleteResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteResult {
    pub success: bool,
    pub message: String,
}

/// 최근 한 달 통계. 프로바이더가 주지 않은 항목은 생략
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MailStatistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        serde_json::from_value(serde_json::json!({
            "sender": "from@example.com",
            "recipients": ["to@example.com"],
            "subject": "test email",
            "text_body": "test-test-test",
            "headers": ["x-test-header:1234"]
        }))
        .unwrap()
    }

    #[test]
    fn test_is_email() {
        assert!(is_email("a@b.io"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.io"));
        assert!(!is_email("a b@c.io"));
        assert!(!is_email("a@@b.io"));
    }

    #[test]
    fn test_split_header() {
        assert_eq!(split_header("x-test:1:2"), Some(("x-test", "1:2")));
        assert_eq!(split_header(":1"), None);
        assert_eq!(split_header("x-test:"), None);
        assert_eq!(split_header("x-test"), None);
    }

    #[test]
    fn test_validate() {
        assert!(email().validate().is_ok());

        let mut bad = email();
        bad.recipients.push("nope".to_string());
        let err = bad.validate().unwrap_err();
        assert_eq!(err.to_string(), "\"recipients[1]\" must be a valid email");
        assert_eq!(err.status_code(), 400);

        let mut bad = email();
        bad.recipients.clear();
        assert!(bad.validate().is_err());

        let mut bad = email();
        bad.headers = Some(vec!["no-colon".to_string()]);
        assert!(bad.validate().is_err());

        let mut bad = email();
        bad.attachments = Some(vec![Attachment {
            file_name: "a.txt".to_string(),
            file_type: "text/plain".to_string(),
            content_bytes: "***".to_string(),
        }]);
        assert_eq!(
            bad.validate().unwrap_err().to_string(),
            "\"attachments[0].content_bytes\" must be a valid base64 string"
        );

        let mut bad = email();
        bad.delivery_time = Some("tomorrow".to_string());
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let parsed = serde_json::from_value::<Email>(serde_json::json!({
            "sender": "from@example.com",
            "recipients": ["to@example.com"],
            "priority": "high"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_iso_date() {
        assert!(parse_iso_date("2030-01-01T00:00:00Z").is_some());
        assert!(parse_iso_date("2030-01-01").is_some());
        assert!(parse_iso_date("01/01/2030").is_none());
    }
}
