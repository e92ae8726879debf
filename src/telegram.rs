//! Bot API dispatcher
//!
//! One HTTPS call per send. The client holds the resolved credentials and
//! nothing else; concurrent callers construct independent requests and call
//! `send` without coordination.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::message::{MessageKind, MessageRequest};

/// Bot API URL prefix; the token is appended directly after `bot`.
pub const BOT_API_URL: &str = "https://api.telegram.org/bot";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for sending messages through a Telegram bot.
#[derive(Debug, Clone)]
pub struct Telegram {
    http: Client,
    credentials: Credentials,
    base_url: String,
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Message id assigned by Telegram, when the response carries one.
    pub message_id: Option<i64>,
}

/// Basic bot identity returned by `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotInfo {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Response envelope shared by all Bot API methods.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

impl Telegram {
    /// Create a client for the given credentials.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, BOT_API_URL)
    }

    /// Create a client with a custom API base URL (primarily for tests).
    pub fn with_base_url<S: Into<String>>(credentials: Credentials, base_url: S) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("tgsend/{}", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            credentials,
            base_url: base_url.into(),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}{}/{}", self.base_url, self.credentials.token, method)
    }

    /// Send one message. Exactly one network call; no retries.
    pub async fn send(&self, request: &MessageRequest) -> Result<Dispatch> {
        let url = self.method_url(request.kind.api_method());
        debug!(method = request.kind.api_method(), "dispatching message");

        let response = match &request.kind {
            MessageKind::Text {
                disable_preview, ..
            } => {
                let mut payload = json!({
                    "chat_id": self.credentials.chat_id,
                    "text": request.composed_text(),
                    "disable_notification": request.silent,
                    "disable_web_page_preview": disable_preview,
                });
                if let Some(mode) = request.parse_mode.as_api_value() {
                    payload["parse_mode"] = json!(mode);
                }
                self.http.post(&url).json(&payload).send().await?
            }
            MessageKind::Photo { path } => self.upload(&url, request, "photo", path, None).await?,
            MessageKind::Document { path, thumb } => {
                self.upload(&url, request, "document", path, thumb.as_deref())
                    .await?
            }
            MessageKind::Audio { path, thumb } => {
                self.upload(&url, request, "audio", path, thumb.as_deref())
                    .await?
            }
            MessageKind::Video { path, thumb } => {
                self.upload(&url, request, "video", path, thumb.as_deref())
                    .await?
            }
            MessageKind::Animation { path, thumb } => {
                self.upload(&url, request, "animation", path, thumb.as_deref())
                    .await?
            }
            MessageKind::Voice { path } => self.upload(&url, request, "voice", path, None).await?,
            MessageKind::Sticker { path } => {
                self.upload(&url, request, "sticker", path, None).await?
            }
        };

        let envelope = Self::read_envelope(response).await?;
        let message_id = envelope
            .result
            .as_ref()
            .and_then(|r| r.get("message_id"))
            .and_then(|v| v.as_i64());
        Ok(Dispatch { message_id })
    }

    /// Get basic information about the bot itself.
    pub async fn get_me(&self) -> Result<BotInfo> {
        let response = self.http.get(self.method_url("getMe")).send().await?;
        let envelope = Self::read_envelope(response).await?;
        let result = envelope
            .result
            .ok_or_else(|| Error::MalformedResponse("getMe returned no result".to_string()))?;
        serde_json::from_value(result)
            .map_err(|e| Error::MalformedResponse(format!("getMe result: {}", e)))
    }

    /// Build and send the multipart upload for a media kind.
    ///
    /// Sources are read from disk before any network traffic happens.
    async fn upload(
        &self,
        url: &str,
        request: &MessageRequest,
        field: &'static str,
        path: &Path,
        thumb: Option<&Path>,
    ) -> Result<reqwest::Response> {
        let file = file_part(path).await?;
        let thumb_part = match thumb {
            Some(t) => Some(file_part(t).await?),
            None => None,
        };

        let mut form = Form::new()
            .text("chat_id", self.credentials.chat_id.clone())
            .text("disable_notification", request.silent.to_string());

        if request.kind.supports_caption() {
            let caption = request.composed_text();
            if !caption.is_empty() {
                form = form.text("caption", caption);
            }
            if let Some(mode) = request.parse_mode.as_api_value() {
                form = form.text("parse_mode", mode);
            }
        } else if !request.body.is_empty() || !request.title.is_empty() {
            // sendSticker has no caption field; the text is dropped, loudly.
            warn!("Stickers do not support captions; caption and title are ignored");
        }

        form = form.part(field, file);
        if let Some(part) = thumb_part {
            form = form.part("thumb", part);
        }

        Ok(self.http.post(url).multipart(form).send().await?)
    }

    async fn read_envelope(response: reqwest::Response) -> Result<ApiEnvelope> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {}", e)))?;

        match serde_json::from_str::<ApiEnvelope>(&text) {
            Ok(envelope) if envelope.ok => Ok(envelope),
            Ok(envelope) => Err(Error::Api {
                code: envelope.error_code.unwrap_or_else(|| status.as_u16().into()),
                description: envelope
                    .description
                    .unwrap_or_else(|| status.to_string()),
            }),
            Err(_) if !status.is_success() => Err(Error::Api {
                code: status.as_u16().into(),
                description: text,
            }),
            Err(e) => Err(Error::MalformedResponse(format!("{}: {}", e, text))),
        }
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::SourceUnavailable {
            path: path.to_path_buf(),
            source: e,
        })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();

    Ok(Part::bytes(bytes).file_name(file_name))
}
