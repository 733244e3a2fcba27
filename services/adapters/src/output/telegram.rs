//! Telegram Bot API messaging client
//!
//! The bot token is part of the request path, so endpoint labels used in
//! errors and logs are the bare method names and transport errors are
//! stripped of their URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use movers_types::DeliveryReceipt;

use crate::common::{endpoint_url, send_json};
use crate::output::{truncate_message, Messenger};
use crate::{AdapterError, Result};

const SEND_MESSAGE: &str = "sendMessage";
const GET_UPDATES: &str = "getUpdates";

/// Telegram messaging client
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    bot_token: String,
    max_chars: usize,
    disable_web_page_preview: bool,
    timeout_ms: u64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Bot API envelope `{ok, result, description}`
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    #[serde(default)]
    message_id: Option<i64>,
    #[serde(default)]
    chat: Option<Chat>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Update {
    #[serde(default)]
    message: Option<UpdateMessage>,
    #[serde(default)]
    channel_post: Option<UpdateMessage>,
}

#[derive(Debug, Deserialize)]
struct UpdateMessage {
    #[serde(default)]
    chat: Option<Chat>,
}

impl TelegramClient {
    /// Create a client; an empty token makes every call fail with
    /// [`AdapterError::Disabled`]
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        max_chars: usize,
        timeout_ms: u64,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            bot_token: bot_token.into(),
            max_chars,
            disable_web_page_preview: true,
            timeout_ms,
        }
    }

    /// Toggle link previews in delivered messages
    pub fn with_web_page_preview(mut self, enabled: bool) -> Self {
        self.disable_web_page_preview = !enabled;
        self
    }

    fn method_url(&self, method: &str) -> Result<url::Url> {
        if self.bot_token.trim().is_empty() {
            return Err(AdapterError::Disabled("telegram".to_string()));
        }
        endpoint_url(&self.base_url, &format!("bot{}/{}", self.bot_token, method))
    }

    fn unwrap_envelope<T>(method: &str, response: ApiResponse<T>) -> Result<Option<T>> {
        if response.ok {
            Ok(response.result)
        } else {
            Err(AdapterError::Rejected {
                endpoint: method.to_string(),
                description: response
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            })
        }
    }

    /// Distinct chat ids seen in pending updates (`message` and `channel_post`)
    ///
    /// Setup helper for finding the id to configure as `telegram.chat_id`.
    pub async fn chat_ids(&self) -> Result<Vec<i64>> {
        let url = self.method_url(GET_UPDATES)?;
        let response: ApiResponse<Vec<Update>> =
            send_json(GET_UPDATES, self.http.get(url), self.timeout_ms)
                .await
                .map_err(AdapterError::without_url)?;

        let updates = Self::unwrap_envelope(GET_UPDATES, response)?.unwrap_or_default();
        let ids: BTreeSet<i64> = updates
            .iter()
            .flat_map(|u| [u.message.as_ref(), u.channel_post.as_ref()])
            .flatten()
            .filter_map(|m| m.chat.as_ref().map(|c| c.id))
            .collect();

        debug!(updates = updates.len(), chats = ids.len(), "Scanned bot updates");
        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<DeliveryReceipt> {
        let url = self.method_url(SEND_MESSAGE)?;
        let text = truncate_message(text, self.max_chars);
        let body = SendMessageRequest {
            chat_id,
            text: &text,
            disable_web_page_preview: self.disable_web_page_preview,
        };

        let response: ApiResponse<SentMessage> =
            send_json(SEND_MESSAGE, self.http.post(url).json(&body), self.timeout_ms)
                .await
                .map_err(AdapterError::without_url)?;

        let sent = Self::unwrap_envelope(SEND_MESSAGE, response)?;
        let receipt = DeliveryReceipt {
            message_id: sent.as_ref().and_then(|m| m.message_id),
            chat_id: sent.as_ref().and_then(|m| m.chat.as_ref()).map(|c| c.id),
            chars_sent: text.chars().count(),
        };

        info!(message_id = ?receipt.message_id, chars = receipt.chars_sent, "Message delivered");
        Ok(receipt)
    }
}
