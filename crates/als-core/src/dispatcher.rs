//! Splits the report into Telegram-sized chunks and delivers them in order.
//!
//! Sizes are measured in characters (Unicode scalar values). Chunks only
//! break at line ends, so a chunk holding a single line may exceed the limit:
//! either the line alone is longer than the limit, or it fits the limit but
//! not the limit minus the continuation header of a later chunk. Lines are
//! never cut.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{
    domain::{ChatId, MessageRef},
    messaging::{port::MessagingPort, types::TextFormat},
    Error,
};

/// Per-message budget, below Telegram's 4096 hard limit.
pub const TELEGRAM_SAFE_LIMIT: usize = 4000;
/// Pause between consecutive sends (Telegram allows ~1 msg/sec per chat).
pub const SEND_DELAY: Duration = Duration::from_secs(1);

const MAX_SPLIT_PASSES: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageChunk {
    /// 1-based position.
    pub index: usize,
    pub total: usize,
    /// Continuation header; `None` for the first chunk.
    pub header: Option<String>,
    pub body: String,
}

impl MessageChunk {
    pub fn text(&self) -> String {
        match &self.header {
            Some(h) => format!("{h}{}", self.body),
            None => self.body.clone(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.header.as_deref().map(char_len).unwrap_or(0) + char_len(&self.body)
    }
}

pub fn section_header(index: usize, total: usize) -> String {
    format!("📋 Report Section {index}/{total}\n\n")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Partition `text` into chunks of at most `limit` characters, headers included.
///
/// The header of chunk `i` depends on the final chunk count, so packing is
/// repeated with the header width reserved for the current count estimate
/// until the count stops growing.
pub fn split_into_chunks(text: &str, limit: usize) -> Vec<MessageChunk> {
    if char_len(text) <= limit {
        return vec![MessageChunk {
            index: 1,
            total: 1,
            header: None,
            body: text.to_string(),
        }];
    }

    let mut estimate = 1usize;
    let mut bodies = Vec::new();
    for _ in 0..MAX_SPLIT_PASSES {
        let reserved = char_len(&section_header(estimate, estimate));
        bodies = pack_lines(text, limit, limit.saturating_sub(reserved));
        if bodies.len() <= estimate {
            break;
        }
        estimate = bodies.len();
    }

    let total = bodies.len();
    bodies
        .into_iter()
        .enumerate()
        .map(|(i, body)| MessageChunk {
            index: i + 1,
            total,
            header: (i > 0).then(|| section_header(i + 1, total)),
            body,
        })
        .collect()
}

/// Greedy line packing; lines keep their trailing `\n`.
fn pack_lines(text: &str, first_budget: usize, rest_budget: usize) -> Vec<String> {
    let mut bodies: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split_inclusive('\n') {
        let line_len = char_len(line);
        let budget = if bodies.is_empty() {
            first_budget
        } else {
            rest_budget
        };
        if !current.is_empty() && current_len + line_len > budget {
            bodies.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        bodies.push(current);
    }
    bodies
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent {
        message: MessageRef,
        /// The Markdown send was rejected and the chunk went out as plain text.
        plain_text: bool,
    },
    Failed {
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkOutcome {
    pub index: usize,
    pub total: usize,
    pub status: DeliveryStatus,
}

impl ChunkOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self.status, DeliveryStatus::Sent { .. })
    }
}

pub struct Dispatcher {
    messenger: Arc<dyn MessagingPort>,
    chat_id: ChatId,
    limit: usize,
    send_delay: Duration,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn MessagingPort>, chat_id: ChatId) -> Self {
        Self {
            messenger,
            chat_id,
            limit: TELEGRAM_SAFE_LIMIT,
            send_delay: SEND_DELAY,
        }
    }

    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Send `report` as one or more messages. Best-effort: failures are
    /// logged and reported per chunk, never raised.
    pub async fn deliver(&self, report: &str) -> Vec<ChunkOutcome> {
        let chunks = split_into_chunks(report, self.limit);
        if chunks.len() > 1 {
            info!(chunks = chunks.len(), chars = char_len(report), "report split for delivery");
        }

        let mut outcomes = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                sleep(self.send_delay).await;
            }
            outcomes.push(ChunkOutcome {
                index: chunk.index,
                total: chunk.total,
                status: self.send_chunk(chunk).await,
            });
        }
        outcomes
    }

    async fn send_chunk(&self, chunk: &MessageChunk) -> DeliveryStatus {
        let text = chunk.text();
        let first = self
            .messenger
            .send_text(self.chat_id, &text, TextFormat::Markdown, true)
            .await;

        match first {
            Ok(message) => {
                info!(
                    part = chunk.index,
                    total = chunk.total,
                    message_id = message.message_id.0,
                    "report part sent"
                );
                DeliveryStatus::Sent {
                    message,
                    plain_text: false,
                }
            }
            Err(Error::MarkupRejected(reason)) => {
                warn!(part = chunk.index, %reason, "markdown rejected, resending as plain text");
                match self
                    .messenger
                    .send_text(self.chat_id, &text, TextFormat::Plain, true)
                    .await
                {
                    Ok(message) => {
                        info!(
                            part = chunk.index,
                            total = chunk.total,
                            message_id = message.message_id.0,
                            "report part sent as plain text"
                        );
                        DeliveryStatus::Sent {
                            message,
                            plain_text: true,
                        }
                    }
                    Err(e) => self.failed(chunk, e),
                }
            }
            Err(e) => self.failed(chunk, e),
        }
    }

    fn failed(&self, chunk: &MessageChunk, e: Error) -> DeliveryStatus {
        error!(part = chunk.index, total = chunk.total, error = %e, "report part not delivered");
        match &e {
            Error::ChatNotFound(_) => warn!(
                chat_id = self.chat_id.0,
                "chat id might be incorrect: send /start to the bot and check TELEGRAM_CHAT_ID"
            ),
            Error::InvalidCredential(_) => {
                warn!("bot token rejected: check TELEGRAM_BOT_TOKEN")
            }
            _ => {}
        }
        DeliveryStatus::Failed {
            reason: e.to_string(),
        }
    }
}
