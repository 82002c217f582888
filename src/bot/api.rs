//! Minimal Telegram Bot API client: just the calls the bot makes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Telegram request {method} failed: {source}")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Telegram rejected {method}: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

// ── Incoming ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

// ── Outgoing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardButton {
    pub fn new(text: &str, callback_data: &str) -> Self {
        Self {
            text: text.to_string(),
            callback_data: callback_data.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkPreviewOptions {
    pub is_disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_preview_options: Option<LinkPreviewOptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditMessageText {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_preview_options: Option<LinkPreviewOptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackQuery {
    pub callback_query_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub show_alert: bool,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 2],
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct TelegramApi {
    http: reqwest::Client,
    base: String,
    poll_timeout_secs: u64,
}

impl TelegramApi {
    pub fn new(token: &str, poll_timeout_secs: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            // long polls must not trip the client timeout
            .timeout(Duration::from_secs(poll_timeout_secs + 15))
            .build()?;
        Ok(Self {
            http,
            base: format!("{}/bot{}", API_BASE, token),
            poll_timeout_secs,
        })
    }

    async fn call<P, T>(&self, method: &'static str, params: &P) -> Result<T, BotError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("Telegram {}", method);
        let http_err = |source| BotError::Http { method, source };

        let resp: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.base, method))
            .json(params)
            .send()
            .await
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)?;

        match resp {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(BotError::Api {
                method,
                description: description.unwrap_or_else(|| "no result".to_string()),
            }),
        }
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        let params = GetUpdates {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: ["message", "callback_query"],
        };
        self.call("getUpdates", &params).await
    }

    pub async fn send_message(&self, params: &SendMessage) -> Result<Message, BotError> {
        self.call("sendMessage", params).await
    }

    /// Telegram answers with the edited message or `true`; callers only care about success.
    pub async fn edit_message_text(&self, params: &EditMessageText) -> Result<(), BotError> {
        self.call::<_, serde_json::Value>("editMessageText", params)
            .await
            .map(|_| ())
    }

    pub async fn answer_callback_query(&self, params: &AnswerCallbackQuery) -> Result<(), BotError> {
        self.call::<_, bool>("answerCallbackQuery", params)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_with_callback() {
        let raw = r#"{
            "update_id": 42,
            "callback_query": {
                "id": "cb1",
                "from": {"id": 7, "is_bot": false, "first_name": "A", "username": "Alice"},
                "message": {"message_id": 99, "date": 0, "chat": {"id": 7, "type": "private"}},
                "data": "afisha_ballet"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let cb = update.callback_query.unwrap();
        assert_eq!(update.update_id, 42);
        assert_eq!(cb.from.username.as_deref(), Some("Alice"));
        assert_eq!(cb.message.unwrap().message_id, 99);
        assert_eq!(cb.data.as_deref(), Some("afisha_ballet"));
        assert!(update.message.is_none());
    }

    #[test]
    fn test_send_message_skips_empty_fields() {
        let msg = SendMessage {
            chat_id: 1,
            text: "hi".into(),
            parse_mode: None,
            reply_markup: None,
            link_preview_options: Some(LinkPreviewOptions { is_disabled: true }),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "chat_id": 1,
                "text": "hi",
                "link_preview_options": {"is_disabled": true}
            })
        );
    }

    #[test]
    fn test_error_response() {
        let raw = r#"{"ok": false, "error_code": 400, "description": "Bad Request: message is not modified"}"#;
        let resp: ApiResponse<serde_json::Value> = serde_json::from_str(raw).unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert!(resp.description.unwrap().contains("not modified"));
    }
}
