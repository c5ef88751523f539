//! Telegram adapter (teloxide).
//!
//! This crate implements the `als-core` MessagingPort over the Telegram Bot API.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{ParseMode, UpdateKind},
    ApiError, RequestError,
};

use tokio::time::sleep;

use als_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{BotIdentity, DiscoveredChat, TextFormat},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    // Legacy Markdown is what the report layout is written in.
    #[allow(deprecated)]
    fn parse_mode(format: TextFormat) -> Option<ParseMode> {
        match format {
            TextFormat::Markdown => Some(ParseMode::Markdown),
            TextFormat::Plain => None,
        }
    }

    fn map_err(e: RequestError) -> Error {
        match &e {
            RequestError::Api(ApiError::CantParseEntities) => Error::MarkupRejected(e.to_string()),
            // teloxide-core 0.9 names the invalid-token ("Unauthorized") variant `NotFound`.
            RequestError::Api(ApiError::NotFound) => Error::InvalidCredential(e.to_string()),
            RequestError::Api(ApiError::ChatNotFound) => Error::ChatNotFound(e.to_string()),
            _ => classify_description(&e.to_string()),
        }
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(RequestError::RetryAfter(d)) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    tracing::debug!(wait = ?d, "telegram asked to retry later");
                    sleep(d).await;
                }
                Err(other) => return Err(Self::map_err(other)),
            }
        }
    }
}

/// Maps a Bot API error description onto the core error kinds.
///
/// Telegram reports several failures only as free-form text (`Unknown`
/// variants), so the description is matched as a last resort.
pub fn classify_description(desc: &str) -> Error {
    let lower = desc.to_lowercase();
    if lower.contains("can't parse entities") {
        Error::MarkupRejected(desc.to_string())
    } else if lower.contains("chat not found") {
        Error::ChatNotFound(desc.to_string())
    } else if lower.contains("unauthorized") || lower.contains("invalid token") {
        Error::InvalidCredential(desc.to_string())
    } else {
        Error::External(format!("telegram error: {desc}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        disable_link_preview: bool,
    ) -> Result<MessageRef> {
        let mode = Self::parse_mode(format);
        let msg = self
            .with_retry(|| {
                let mut req = self
                    .bot
                    .send_message(Self::tg_chat(chat_id), text.to_string())
                    .disable_web_page_preview(disable_link_preview);
                if let Some(mode) = mode {
                    req = req.parse_mode(mode);
                }
                req
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn get_me(&self) -> Result<BotIdentity> {
        let me = self.with_retry(|| self.bot.get_me()).await?;
        Ok(BotIdentity {
            username: me.username().to_string(),
        })
    }

    async fn recent_chat(&self) -> Result<Option<DiscoveredChat>> {
        let updates = self.with_retry(|| self.bot.get_updates()).await?;
        tracing::debug!(count = updates.len(), "fetched pending updates");

        let found = updates.iter().rev().find_map(|update| match &update.kind {
            UpdateKind::Message(msg) => Some(DiscoveredChat {
                chat_id: ChatId(msg.chat.id.0),
                user_name: msg.from().map(|u| u.first_name.clone()),
            }),
            _ => None,
        });
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_failures_are_recognised() {
        let err = classify_description(
            "Bad Request: can't parse entities: Can't find end of the entity starting at byte offset 120",
        );
        assert!(matches!(err, Error::MarkupRejected(_)));
    }

    #[test]
    fn missing_chat_is_recognised() {
        let err = classify_description("Bad Request: chat not found");
        assert!(matches!(err, Error::ChatNotFound(_)));
    }

    #[test]
    fn unauthorized_means_bad_token() {
        let err = classify_description("Unauthorized");
        assert!(matches!(err, Error::InvalidCredential(_)));
    }

    #[test]
    fn anything_else_is_external() {
        let err = classify_description("Forbidden: bot was blocked by the user");
        match err {
            Error::External(msg) => assert!(msg.contains("blocked")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn typed_api_errors_map_to_core_kinds() {
        let err = TelegramMessenger::map_err(RequestError::Api(ApiError::CantParseEntities));
        assert!(matches!(err, Error::MarkupRejected(_)));

        let err = TelegramMessenger::map_err(RequestError::Api(ApiError::ChatNotFound));
        assert!(matches!(err, Error::ChatNotFound(_)));

        let err = TelegramMessenger::map_err(RequestError::Api(ApiError::NotFound));
        assert!(matches!(err, Error::InvalidCredential(_)));
    }

    #[test]
    fn plain_text_sends_without_parse_mode() {
        assert!(TelegramMessenger::parse_mode(TextFormat::Plain).is_none());
        assert!(TelegramMessenger::parse_mode(TextFormat::Markdown).is_some());
    }
}
