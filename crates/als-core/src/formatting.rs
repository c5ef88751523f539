//! Text helpers shared by the aggregator, summarizer and pipeline.

use std::sync::OnceLock;

use regex::Regex;

/// Marker appended to text cut short by [`truncate_chars`].
pub const TRUNCATION_MARKER: &str = "...";

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

fn ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Turn feed-provided HTML-ish text into a single plain line.
///
/// Tags are dropped, the handful of entities feeds actually emit are decoded
/// and runs of whitespace (including newlines) collapse to one space, so a
/// cleaned value never breaks a report line.
pub fn clean_feed_text(raw: &str) -> String {
    let without_tags = tag_re().replace_all(raw, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&");
    ws_re().replace_all(&decoded, " ").trim().to_string()
}

/// First `max_chars` characters of `text` followed by [`TRUNCATION_MARKER`].
///
/// The marker is always appended, even when nothing was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Like [`truncate_chars`] but leaves short text untouched.
pub fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    truncate_chars(text, max_chars)
}
