//! Hexagonal ports for the non-messaging capabilities (feeds, language model).
//!
//! Messaging lives in [`crate::messaging::port`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;

/// One entry of a syndication feed, reduced to the generic fields we use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

/// A fetched and parsed feed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedDocument {
    pub entries: Vec<FeedEntry>,
}

/// Fetch + parse a syndication feed.
///
/// Implementations return `Err` for network and parse failures; they never
/// return a partially parsed document.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FeedDocument>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Text completion backend (OpenAI today).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, req: CompletionRequest) -> Result<String>;
}
