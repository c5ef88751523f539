use std::{env, fs, path::Path, time::Duration};

use tracing::{info, warn};

use crate::{
    domain::ChatId, errors::Error, messaging::port::MessagingPort,
    scheduler::DEFAULT_REPORT_CRON, Result,
};

/// Sentinel for `TELEGRAM_CHAT_ID` asking for discovery via recent updates.
pub const AUTO_DETECT: &str = "AUTO_DETECT";

/// Where reports go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatTarget {
    Id(ChatId),
    AutoDetect,
}

impl ChatTarget {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(AUTO_DETECT) {
            return Ok(ChatTarget::AutoDetect);
        }
        raw.parse::<i64>()
            .map(|id| ChatTarget::Id(ChatId(id)))
            .map_err(|_| {
                Error::Config(format!(
                    "TELEGRAM_CHAT_ID must be a numeric chat id or {AUTO_DETECT}, got {raw:?}"
                ))
            })
    }

    /// Concrete chat for delivery. `AutoDetect` takes the chat of the most
    /// recent update the bot received.
    pub async fn resolve(self, messenger: &dyn MessagingPort) -> Result<ChatId> {
        match self {
            ChatTarget::Id(chat_id) => Ok(chat_id),
            ChatTarget::AutoDetect => match messenger.recent_chat().await? {
                Some(chat) => {
                    info!(
                        chat_id = chat.chat_id.0,
                        user = chat.user_name.as_deref().unwrap_or("-"),
                        "chat detected"
                    );
                    Ok(chat.chat_id)
                }
                None => {
                    warn!("no recent messages found: send /start to the bot, then restart");
                    Err(Error::Config(
                        "TELEGRAM_CHAT_ID could not be auto-detected".to_string(),
                    ))
                }
            },
        }
    }
}

/// Typed, immutable configuration. Built once at startup and shared by `Arc`.
#[derive(Clone, Debug)]
pub struct Config {
    // Secrets
    pub telegram_bot_token: String,
    pub chat_target: ChatTarget,
    pub openai_api_key: String,

    // Completion
    pub openai_model: String,
    pub openai_base_url: String,
    pub completion_timeout: Duration,
    pub summary_language: String,

    // Feeds
    pub feed_timeout: Duration,

    // Schedule
    pub report_cron: String,
    pub run_on_startup: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let chat_target = ChatTarget::parse(&required("TELEGRAM_CHAT_ID")?)?;
        let openai_api_key = required("OPENAI_API_KEY")?;

        let openai_model = env_str("OPENAI_MODEL")
            .and_then(non_empty)
            .unwrap_or_else(|| "gpt-3.5-turbo".to_string());
        let openai_base_url = env_str("OPENAI_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();
        let completion_timeout =
            Duration::from_secs(env_u64("COMPLETION_TIMEOUT_SECS").unwrap_or(60));
        let summary_language = env_str("SUMMARY_LANGUAGE")
            .and_then(non_empty)
            .unwrap_or_else(|| "Turkish".to_string());

        let feed_timeout = Duration::from_secs(env_u64("FEED_TIMEOUT_SECS").unwrap_or(30));

        let report_cron = env_str("REPORT_CRON")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_REPORT_CRON.to_string());
        let run_on_startup = env_bool("RUN_ON_STARTUP").unwrap_or(true);

        Ok(Self {
            telegram_bot_token,
            chat_target,
            openai_api_key,
            openai_model,
            openai_base_url,
            completion_timeout,
            summary_language,
            feed_timeout,
            report_cron,
            run_on_startup,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env_str(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }
        out.push((key.to_string(), val));
    }
    out
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
