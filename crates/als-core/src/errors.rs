/// Core error type for the scanner.
///
/// Adapter crates map their specific errors into this type so the core can
/// tell recoverable delivery failures (markup rejected, chat missing) apart
/// from everything else.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("feed error: {url}: {reason}")]
    Feed { url: String, reason: String },

    #[error("completion error: {0}")]
    Completion(String),

    /// The messenger could not parse the rich-text markup of an outgoing message.
    #[error("markup rejected: {0}")]
    MarkupRejected(String),

    #[error("invalid bot credential: {0}")]
    InvalidCredential(String),

    #[error("chat not found: {0}")]
    ChatNotFound(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
