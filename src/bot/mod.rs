//! Telegram front-end: an inline-keyboard menu over the two listing sources.
//!
//! Any message opens the menu. Pressing a source button edits the menu
//! message into that source's listing with "refresh" and "back" buttons.

pub mod api;

use crate::config::BotConfig;
use crate::pipeline::Pipeline;
use crate::render::{escape_markdown, listings_markdown, shows_markdown, truncate_message};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use self::api::{
    AnswerCallbackQuery, CallbackQuery, EditMessageText, InlineKeyboardButton,
    InlineKeyboardMarkup, LinkPreviewOptions, Message, SendMessage, TelegramApi, Update,
};

const PARSE_MODE: &str = "MarkdownV2";
const MENU_TEXT: &str = "Посмотреть афишу в:";
const MENU_PROMPT: &str = "Выберите афишу:";
const ACCESS_DENIED_MESSAGE: &str =
    "⛔️ Доступ запрещен. Бот работает только для авторизованных пользователей.";
const ACCESS_DENIED_ALERT: &str = "⛔️ Доступ запрещен / Access denied";
const SHOWS_ERROR: &str = "Ошибка загрузки афиши. Попробуйте позже.";
const BALLET_ERROR: &str = "Ошибка загрузки афиши балета. Попробуйте позже.";
const MSK_OFFSET_SECS: i32 = 3 * 60 * 60;
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Callback payloads carried by the inline buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Vakhtangov,
    Ballet,
    Menu,
}

impl Action {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "afisha_theatre_vakhtangov" => Some(Action::Vakhtangov),
            "afisha_ballet" => Some(Action::Ballet),
            "afisha_update" => Some(Action::Menu),
            _ => None,
        }
    }

    pub fn callback_data(self) -> &'static str {
        match self {
            Action::Vakhtangov => "afisha_theatre_vakhtangov",
            Action::Ballet => "afisha_ballet",
            Action::Menu => "afisha_update",
        }
    }
}

pub fn menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![
            InlineKeyboardButton::new("Театр Вахтангова", Action::Vakhtangov.callback_data()),
            InlineKeyboardButton::new("Балет", Action::Ballet.callback_data()),
        ]],
    }
}

pub fn refresh_keyboard(action: Action) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![InlineKeyboardButton::new("🔄 Обновить", action.callback_data())],
            vec![InlineKeyboardButton::new("⬅️ Назад", Action::Menu.callback_data())],
        ],
    }
}

/// Footer that also keeps Telegram from rejecting an unchanged edit.
pub fn updated_footer(now: DateTime<Utc>) -> String {
    let msk = FixedOffset::east_opt(MSK_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    format!("\n\n_Обновлено: {}_", now.with_timezone(&msk).format("%H:%M:%S"))
}

fn no_preview() -> Option<LinkPreviewOptions> {
    Some(LinkPreviewOptions { is_disabled: true })
}

/// Listing edit of an existing message, rendered as MarkdownV2.
fn edit_request(
    chat_id: i64,
    message_id: i64,
    text: String,
    keyboard: InlineKeyboardMarkup,
) -> EditMessageText {
    EditMessageText {
        chat_id,
        message_id,
        text,
        parse_mode: Some(PARSE_MODE),
        reply_markup: Some(keyboard),
        link_preview_options: no_preview(),
    }
}

/// Fresh listing message, rendered as MarkdownV2.
fn send_request(chat_id: i64, text: String, keyboard: InlineKeyboardMarkup) -> SendMessage {
    SendMessage {
        chat_id,
        text,
        parse_mode: Some(PARSE_MODE),
        reply_markup: Some(keyboard),
        link_preview_options: no_preview(),
    }
}

pub struct Bot {
    api: TelegramApi,
    pipeline: Pipeline,
    config: BotConfig,
}

impl Bot {
    pub fn new(pipeline: Pipeline) -> Result<Self> {
        let config = pipeline.config().bot.clone();
        let token = config
            .token
            .clone()
            .context("TELEGRAM_BOT_TOKEN is not set")?;
        let api = TelegramApi::new(&token, config.poll_timeout_secs)
            .context("Failed to build Telegram client")?;
        Ok(Self {
            api,
            pipeline,
            config,
        })
    }

    /// Long-poll until Ctrl-C. Each update is handled on its own task.
    pub async fn run(self) -> Result<()> {
        let bot = Arc::new(self);
        let mut offset = 0i64;
        info!(
            "Bot started ({} allowed users)",
            if bot.config.allowed_users.is_empty() {
                "all".to_string()
            } else {
                bot.config.allowed_users.len().to_string()
            }
        );

        loop {
            let updates = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down bot");
                    return Ok(());
                }
                polled = bot.api.get_updates(offset) => polled,
            };

            let updates = match updates {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("{}", e);
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let bot = Arc::clone(&bot);
                tokio::spawn(async move { bot.handle_update(update).await });
            }
        }
    }

    async fn handle_update(&self, update: Update) {
        if let Some(cb) = update.callback_query {
            self.handle_callback(cb).await;
        } else if let Some(msg) = update.message {
            self.handle_message(msg).await;
        }
    }

    async fn handle_message(&self, msg: Message) {
        let Some(from) = msg.from.as_ref() else {
            return;
        };
        debug!("Message from {:?}: {:?}", from.username, msg.text);

        let text = if self.config.is_allowed(from.username.as_deref()) {
            MENU_TEXT
        } else {
            ACCESS_DENIED_MESSAGE
        };
        let keyboard = (text == MENU_TEXT).then(menu_keyboard);

        let reply = SendMessage {
            chat_id: msg.chat.id,
            text: text.to_string(),
            parse_mode: None,
            reply_markup: keyboard,
            link_preview_options: no_preview(),
        };
        if let Err(e) = self.api.send_message(&reply).await {
            error!("{}", e);
        }
    }

    async fn handle_callback(&self, cb: CallbackQuery) {
        let allowed = self.config.is_allowed(cb.from.username.as_deref());
        let answer = AnswerCallbackQuery {
            callback_query_id: cb.id.clone(),
            text: (!allowed).then(|| ACCESS_DENIED_ALERT.to_string()),
            show_alert: !allowed,
        };
        if let Err(e) = self.api.answer_callback_query(&answer).await {
            warn!("{}", e);
        }
        if !allowed {
            return;
        }

        let Some(action) = cb.data.as_deref().and_then(Action::parse) else {
            warn!("Unknown callback data {:?}", cb.data);
            return;
        };

        let (text, keyboard) = match action {
            Action::Menu => (MENU_PROMPT.to_string(), menu_keyboard()),
            Action::Vakhtangov | Action::Ballet => {
                let title = if action == Action::Vakhtangov {
                    "*Афиша театра Вахтангова:*\n\n"
                } else {
                    "*Афиша балета:*\n\n"
                };
                let body = self.build_message(action).await;
                (
                    format!("{}{}{}", title, body, updated_footer(Utc::now())),
                    refresh_keyboard(action),
                )
            }
        };

        let chat_id = cb.message.as_ref().map_or(cb.from.id, |m| m.chat.id);
        self.edit_or_send(chat_id, cb.message.as_ref(), text, keyboard)
            .await;
    }

    async fn build_message(&self, action: Action) -> String {
        let limit = self.config.message_limit;
        match action {
            Action::Vakhtangov => match self.pipeline.run_vakhtangov().await {
                Ok(shows) => truncate_message(&shows_markdown(&shows), limit),
                Err(e) => {
                    error!("{:#}", e);
                    escape_markdown(SHOWS_ERROR)
                }
            },
            Action::Ballet => match self.pipeline.run_ballet().await {
                Ok(listings) => truncate_message(&listings_markdown(&listings), limit),
                Err(e) => {
                    error!("{:#}", e);
                    escape_markdown(BALLET_ERROR)
                }
            },
            Action::Menu => MENU_PROMPT.to_string(),
        }
    }

    /// Edit the menu message in place; fall back to a fresh message.
    async fn edit_or_send(
        &self,
        chat_id: i64,
        original: Option<&Message>,
        text: String,
        keyboard: InlineKeyboardMarkup,
    ) {
        if let Some(original) = original {
            let edit = edit_request(chat_id, original.message_id, text.clone(), keyboard.clone());
            match self.api.edit_message_text(&edit).await {
                Ok(()) => return,
                Err(e) => error!("Error editing message: {}", e),
            }
        }

        let send = send_request(chat_id, text, keyboard);
        if let Err(e) = self.api.send_message(&send).await {
            error!("{}", e);
        }
    }
}
