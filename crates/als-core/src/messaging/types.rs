use crate::domain::ChatId;

/// How the messenger should interpret outgoing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFormat {
    /// Telegram legacy Markdown (`*bold*`, `[text](url)`).
    Markdown,
    Plain,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotIdentity {
    pub username: String,
}

/// A chat found through the bot's recent updates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredChat {
    pub chat_id: ChatId,
    pub user_name: Option<String>,
}
