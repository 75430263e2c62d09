//! Telegram Bot API client
//!
//! Only one call is needed: `sendDocument`, which uploads a file as an
//! attachment so Telegram does not recompress the image.

use crate::config::{ChatId, Config};
use crate::error::{Error, Result};
use crate::fetcher::build_http_client;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

/// Something that can deliver a file to a chat
///
/// Implementations must report transport failures and gateway or flood-control
/// replies in a way [`IsRetryable`](crate::retry::IsRetryable) classifies as
/// retryable, and everything else (rejections, missing files) as permanent.
#[async_trait]
pub trait DocumentSender: Send + Sync {
    /// Upload the file at `path` to `chat` as a document
    async fn send_document(&self, chat: &ChatId, path: &Path) -> Result<()>;
}

/// Envelope of every Bot API reply
#[derive(Debug, Deserialize)]
struct BotApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

// The token is a credential; keep it out of debug output.
impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a client from the configuration; fails if no bot token is set
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.http_timeout)?,
            api_url: config.telegram_api_url.trim_end_matches('/').to_string(),
            token: config.telegram_token()?.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }
}

#[async_trait]
impl DocumentSender for TelegramClient {
    async fn send_document(&self, chat: &ChatId, path: &Path) -> Result<()> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat.as_str().to_string())
            .part(
                "document",
                reqwest::multipart::Part::bytes(content).file_name(file_name),
            );

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await
            // reqwest errors embed the URL, which contains the token
            .map_err(|e| Error::Network(e.without_url()))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| Error::Network(e.without_url()))?;

        match serde_json::from_slice::<BotApiReply>(&body) {
            Ok(reply) if reply.ok && status.is_success() => Ok(()),
            Ok(reply) => Err(Error::Telegram {
                code: reply.error_code.or(Some(i64::from(status.as_u16()))),
                description: reply
                    .description
                    .unwrap_or_else(|| format!("request failed with status {status}")),
            }),
            Err(_) => Err(Error::Telegram {
                code: Some(i64::from(status.as_u16())),
                description: format!("unexpected reply with status {status}"),
            }),
        }
    }
}
