use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{BotIdentity, DiscoveredChat, TextFormat},
    Result,
};

/// Outbound messaging port.
///
/// Failures caused by unparsable markup must surface as
/// [`crate::Error::MarkupRejected`] so the dispatcher can retry in plain text.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        disable_link_preview: bool,
    ) -> Result<MessageRef>;

    /// Identity of the bot behind the credential.
    async fn get_me(&self) -> Result<BotIdentity>;

    /// Chat of the most recent update the bot received, if any.
    async fn recent_chat(&self) -> Result<Option<DiscoveredChat>>;
}
