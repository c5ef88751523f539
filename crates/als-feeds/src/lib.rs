//! Feed adapter (`reqwest` + `feed-rs`).
//!
//! Implements the `als-core` FeedFetcher port for RSS 0.9x/2.0, Atom and JSON Feed.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use als_core::{
    errors::Error,
    ports::{FeedDocument, FeedEntry, FeedFetcher},
    Result,
};

const USER_AGENT: &str = concat!("als/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct HttpFeedFetcher {
    http: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<FeedDocument> {
        let feed_err = |reason: String| Error::Feed {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| feed_err(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(feed_err(format!("http status {status}")));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| feed_err(format!("body read failed: {e}")))?;
        debug!(%url, bytes = body.len(), "feed downloaded");

        parse_feed(&body).map_err(feed_err)
    }
}

/// Parse a feed document. All-or-nothing: malformed input yields no entries.
pub fn parse_feed(body: &[u8]) -> std::result::Result<FeedDocument, String> {
    let feed = feed_rs::parser::parse(body).map_err(|e| format!("parse failed: {e}"))?;
    Ok(FeedDocument {
        entries: feed.entries.into_iter().map(entry_from_feed_rs).collect(),
    })
}

fn entry_from_feed_rs(entry: feed_rs::model::Entry) -> FeedEntry {
    let author = Some(
        entry
            .authors
            .iter()
            .map(|a| a.name.trim())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    )
    .filter(|a| !a.is_empty());

    // Prefer the summary; some feeds only ship full content.
    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body));

    FeedEntry {
        title: entry.title.map(|t| t.content),
        author,
        summary,
        link: entry.links.first().map(|l| l.href.clone()),
        published: entry.published,
    }
}
