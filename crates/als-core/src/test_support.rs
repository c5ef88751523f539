//! Hand-written fakes for the ports, shared by the unit tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicI32, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::{
        port::MessagingPort,
        types::{BotIdentity, DiscoveredChat, TextFormat},
    },
    ports::{CompletionClient, CompletionRequest, FeedDocument, FeedEntry, FeedFetcher},
    Error, Result,
};

pub fn at_noon(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

pub fn entry(title: &str, published: Option<DateTime<Utc>>) -> FeedEntry {
    FeedEntry {
        title: Some(title.to_string()),
        author: Some("A. Author".to_string()),
        summary: Some(format!("Summary of {title}")),
        link: Some(format!("https://example.org/{title}")),
        published,
    }
}

#[derive(Default)]
pub struct FakeFetcher {
    feeds: HashMap<String, FeedDocument>,
    failing: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with_feed(mut self, url: &str, entries: Vec<FeedEntry>) -> Self {
        self.feeds.insert(url.to_string(), FeedDocument { entries });
        self
    }

    pub fn with_failure(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }
}

#[async_trait]
impl FeedFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FeedDocument> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            return Err(Error::Feed {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.feeds.get(url).cloned().unwrap_or_default())
    }
}

/// Completion fake: echoes a canned digest or fails every call.
#[derive(Default)]
pub struct FakeCompletion {
    pub fail: bool,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletion {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(&self, req: CompletionRequest) -> Result<String> {
        let n = {
            let mut reqs = self.requests.lock().unwrap();
            reqs.push(req);
            reqs.len()
        };
        if self.fail {
            return Err(Error::Completion("quota exceeded".to_string()));
        }
        Ok(format!("digest #{n}"))
    }
}

#[derive(Clone, Debug)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub format: TextFormat,
    pub disable_link_preview: bool,
    pub at: tokio::time::Instant,
    pub ok: bool,
}

/// Messenger fake recording every send attempt (successful or not).
#[derive(Default)]
pub struct FakeMessenger {
    next_id: AtomicI32,
    failures: Mutex<HashMap<usize, Error>>,
    pub get_me_error: Mutex<Option<Error>>,
    pub recent: Mutex<Option<DiscoveredChat>>,
    pub attempts: Mutex<Vec<SentMessage>>,
}

impl FakeMessenger {
    /// Make the `n`-th send attempt (0-based) fail with `err`.
    pub fn fail_attempt(&self, n: usize, err: Error) {
        self.failures.lock().unwrap().insert(n, err);
    }

    pub fn attempts(&self) -> Vec<SentMessage> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn delivered(&self) -> Vec<SentMessage> {
        self.attempts().into_iter().filter(|m| m.ok).collect()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        disable_link_preview: bool,
    ) -> Result<MessageRef> {
        let mut attempts = self.attempts.lock().unwrap();
        let n = attempts.len();
        let failure = self.failures.lock().unwrap().remove(&n);
        attempts.push(SentMessage {
            chat_id,
            text: text.to_string(),
            format,
            disable_link_preview,
            at: tokio::time::Instant::now(),
            ok: failure.is_none(),
        });
        if let Some(err) = failure {
            return Err(err);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(id),
        })
    }

    async fn get_me(&self) -> Result<BotIdentity> {
        if let Some(err) = self.get_me_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(BotIdentity {
            username: "scanner_bot".to_string(),
        })
    }

    async fn recent_chat(&self) -> Result<Option<DiscoveredChat>> {
        Ok(self.recent.lock().unwrap().clone())
    }
}
