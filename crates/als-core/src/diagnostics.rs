//! Connection test: verifies the bot credential and that the chat is reachable.
//!
//! Advisory tooling only; delivery does not depend on it.

use chrono::Local;
use tracing::{error, info};

use crate::{
    domain::{ChatId, MessageRef},
    messaging::{port::MessagingPort, types::TextFormat},
    Error,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected {
        bot_username: String,
        test_message: MessageRef,
    },
    InvalidCredential,
    ChatNotReachable {
        chat_id: ChatId,
    },
    Failed {
        reason: String,
    },
}

impl ConnectionStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }

    /// What the operator should do about it.
    pub fn remediation_hint(&self) -> Option<&'static str> {
        match self {
            ConnectionStatus::Connected { .. } => None,
            ConnectionStatus::InvalidCredential => {
                Some("Check TELEGRAM_BOT_TOKEN: copy the token again from @BotFather.")
            }
            ConnectionStatus::ChatNotReachable { .. } => Some(
                "Send /start to the bot, then set TELEGRAM_CHAT_ID to the correct chat id (or AUTO_DETECT).",
            ),
            ConnectionStatus::Failed { .. } => {
                Some("Check network access to api.telegram.org and retry.")
            }
        }
    }
}

fn classify(e: Error, chat_id: ChatId) -> ConnectionStatus {
    match e {
        Error::InvalidCredential(_) => ConnectionStatus::InvalidCredential,
        Error::ChatNotFound(_) => ConnectionStatus::ChatNotReachable { chat_id },
        other => ConnectionStatus::Failed {
            reason: other.to_string(),
        },
    }
}

pub async fn test_connection(messenger: &dyn MessagingPort, chat_id: ChatId) -> ConnectionStatus {
    let me = match messenger.get_me().await {
        Ok(me) => me,
        Err(e) => {
            error!(error = %e, "bot identity check failed");
            return classify(e, chat_id);
        }
    };
    info!(bot = %me.username, "bot connection successful");

    let text = format!("🔧 Test message - {}", Local::now().format("%H:%M:%S"));
    match messenger
        .send_text(chat_id, &text, TextFormat::Plain, false)
        .await
    {
        Ok(test_message) => {
            info!(message_id = test_message.message_id.0, "test message sent");
            ConnectionStatus::Connected {
                bot_username: me.username,
                test_message,
            }
        }
        Err(e) => {
            error!(chat_id = chat_id.0, error = %e, "test message failed");
            classify(e, chat_id)
        }
    }
}
