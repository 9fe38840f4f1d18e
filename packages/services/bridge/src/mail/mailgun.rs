//! Mailgun HTTP API 구현

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use tk_core::{Error, Result};

use super::model::FilePart;
use super::provider::{MailEvent, MailProvider, OutgoingMessage, StatsItem};

/// Mailgun 프로바이더
#[derive(Debug, Clone)]
pub struct MailgunProvider {
    client: Client,
    base_url: String,
    domain: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Deserialize)]
struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

impl MailgunProvider {
    pub fn new(
        base_url: impl Into<String>,
        domain: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            domain: domain.into(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.domain, resource)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth("api", Some(&self.api_key))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = self.authorized(req).send().await.map_err(unreachable_provider)?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            tracing::info!(status = status.as_u16(), %message, "mailgun request failed");
            return Err(Error::Provider {
                status: status.as_u16(),
                message,
            });
        }
        resp.json::<T>().await.map_err(|e| Error::Provider {
            status: 502,
            message: format!("invalid mailgun response: {}", e),
        })
    }
}

fn unreachable_provider(err: reqwest::Error) -> Error {
    tracing::warn!(error = %err, "mailgun request error");
    Error::Provider {
        status: 502,
        message: err.to_string(),
    }
}

fn file_part(file: FilePart) -> Result<Part> {
    Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.content_type)
        .map_err(|_| {
            Error::validation(
                format!("Invalid content type '{}'", file.content_type),
                &["email"],
            )
        })
}

/// 메시지를 multipart 폼으로 변환
fn to_form(message: OutgoingMessage) -> Result<Form> {
    let mut form = Form::new()
        .text("from", message.from)
        .text("to", message.to);

    let optional = [
        ("cc", message.cc),
        ("bcc", message.bcc),
        ("subject", message.subject),
        ("text", message.text),
        ("html", message.html),
        ("o:deliverytime", message.delivery_time),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            form = form.text(key, value);
        }
    }

    for (name, value) in message.headers {
        form = form.text(format!("h:{}", name), value);
    }
    for file in message.attachments {
        form = form.part("attachment", file_part(file)?);
    }
    for file in message.inline {
        form = form.part("inline", file_part(file)?);
    }
    Ok(form)
}

#[async_trait]
impl MailProvider for MailgunProvider {
    async fn send(&self, message: OutgoingMessage) -> Result<String> {
        tracing::info!(to = %message.to, "request mailgun send");
        let form = to_form(message)?;
        let req = self.client.post(self.url("messages")).multipart(form);
        let body: SendResponse = self.send_json(req).await?;
        tracing::info!(id = %body.id, "mailgun accepted message");
        Ok(body.id)
    }

    async fn events(&self, message_id: &str) -> Result<Vec<MailEvent>> {
        let req = self
            .client
            .get(self.url("events"))
            .query(&[("message-id", message_id)]);
        let body: ItemsResponse<MailEvent> = self.send_json(req).await?;
        Ok(body.items)
    }

    async fn stats(&self, events: &[&str], duration: &str) -> Result<Vec<StatsItem>> {
        let mut query: Vec<(&str, &str)> = events.iter().map(|e| ("event", *e)).collect();
        query.push(("duration", duration));
        let req = self.client.get(self.url("stats")).query(&query);
        let body: ItemsResponse<StatsItem> = self.send_json(req).await?;
        Ok(body.items)
    }
}
