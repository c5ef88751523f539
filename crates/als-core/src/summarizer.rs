//! Condenses one paper or news item into a short digest via the completion port.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    domain::{NewsItem, Paper},
    formatting::truncate_chars,
    ports::{CompletionClient, CompletionRequest},
};

pub const PAPER_MAX_WORDS: u32 = 150;
pub const NEWS_MAX_WORDS: u32 = 100;
pub const MAX_OUTPUT_TOKENS: u32 = 300;
pub const TEMPERATURE: f32 = 0.3;
/// Characters of source text kept when the model is unavailable.
pub const FALLBACK_CHARS: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Paper,
    News,
}

/// The item a digest is requested for.
#[derive(Clone, Copy, Debug)]
pub enum DigestSubject<'a> {
    Paper(&'a Paper),
    News(&'a NewsItem),
}

impl DigestSubject<'_> {
    pub fn kind(&self) -> ItemKind {
        match self {
            DigestSubject::Paper(_) => ItemKind::Paper,
            DigestSubject::News(_) => ItemKind::News,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            DigestSubject::Paper(p) => &p.title,
            DigestSubject::News(n) => &n.title,
        }
    }

    /// Abstract for papers, summary for news.
    pub fn source_text(&self) -> &str {
        match self {
            DigestSubject::Paper(p) => &p.abstract_text,
            DigestSubject::News(n) => &n.summary,
        }
    }
}

pub struct Summarizer {
    client: Arc<dyn CompletionClient>,
    language: String,
}

impl Summarizer {
    pub fn new(client: Arc<dyn CompletionClient>, language: impl Into<String>) -> Self {
        Self {
            client,
            language: language.into(),
        }
    }

    /// Digest for one item. Never fails: on any completion error the
    /// truncated source text is returned instead.
    pub async fn summarize(&self, subject: DigestSubject<'_>) -> String {
        let req = CompletionRequest {
            prompt: build_prompt(subject, &self.language),
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        };

        match self.client.complete(req).await {
            Ok(text) => {
                debug!(kind = ?subject.kind(), title = subject.title(), "summarized");
                text.trim().to_string()
            }
            Err(e) => {
                warn!(
                    kind = ?subject.kind(),
                    title = subject.title(),
                    error = %e,
                    "summarization failed, using excerpt"
                );
                fallback_digest(subject)
            }
        }
    }
}

pub fn fallback_digest(subject: DigestSubject<'_>) -> String {
    truncate_chars(subject.source_text(), FALLBACK_CHARS)
}

pub fn build_prompt(subject: DigestSubject<'_>, language: &str) -> String {
    match subject {
        DigestSubject::Paper(p) => format!(
            "Summarize the following academic paper in {language}:\n\
             \n\
             Title: {title}\n\
             Authors: {authors}\n\
             Abstract: {abstract_text}\n\
             \n\
             Please summarize in this format:\n\
             - Main topic and novelty\n\
             - Used methods\n\
             - Results obtained\n\
             - Practical applications\n\
             \n\
             Maximum {PAPER_MAX_WORDS} words.",
            title = p.title,
            authors = p.authors,
            abstract_text = p.abstract_text,
        ),
        DigestSubject::News(n) => format!(
            "Summarize the following AI news in {language}:\n\
             \n\
             Title: {title}\n\
             Content: {summary}\n\
             \n\
             Highlight the main points and importance for the AI world.\n\
             Maximum {NEWS_MAX_WORDS} words.",
            title = n.title,
            summary = n.summary,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Category, test_support::FakeCompletion};
    use chrono::NaiveDate;

    fn paper(abstract_text: &str) -> Paper {
        Paper {
            title: "Sparse Experts".to_string(),
            authors: "Ada, Alan".to_string(),
            abstract_text: abstract_text.to_string(),
            link: "https://arxiv.org/abs/1".to_string(),
            source: "ArXiv",
            category: Category::MachineLearning,
        }
    }

    fn news(summary: &str) -> NewsItem {
        NewsItem {
            title: "Lab ships model".to_string(),
            summary: summary.to_string(),
            link: "https://news/1".to_string(),
            source: "AI News".to_string(),
            published_on: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        }
    }

    #[test]
    fn paper_prompt_has_outline_and_word_cap() {
        let p = paper("We study routing.");
        let prompt = build_prompt(DigestSubject::Paper(&p), "Turkish");
        assert!(prompt.starts_with("Summarize the following academic paper in Turkish:"));
        assert!(prompt.contains("Title: Sparse Experts"));
        assert!(prompt.contains("Authors: Ada, Alan"));
        assert!(prompt.contains("Abstract: We study routing."));
        for point in [
            "Main topic and novelty",
            "Used methods",
            "Results obtained",
            "Practical applications",
        ] {
            assert!(prompt.contains(point), "{point}");
        }
        assert!(prompt.ends_with("Maximum 150 words."));
        // Deterministic.
        assert_eq!(prompt, build_prompt(DigestSubject::Paper(&p), "Turkish"));
    }

    #[test]
    fn news_prompt_is_free_form_with_word_cap() {
        let n = news("A new model was released.");
        let prompt = build_prompt(DigestSubject::News(&n), "English");
        assert!(prompt.contains("AI news in English"));
        assert!(prompt.contains("Content: A new model was released."));
        assert!(!prompt.contains("Used methods"));
        assert!(prompt.ends_with("Maximum 100 words."));
    }

    #[tokio::test]
    async fn uses_bounded_low_temperature_request() {
        let client = Arc::new(FakeCompletion::default());
        let s = Summarizer::new(client.clone(), "Turkish");
        let p = paper("abstract");

        let digest = s.summarize(DigestSubject::Paper(&p)).await;
        assert_eq!(digest, "digest #1");

        let reqs = client.requests.lock().unwrap();
        assert_eq!(reqs[0].max_tokens, 300);
        assert!((reqs[0].temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn failure_falls_back_to_first_200_chars_for_both_kinds() {
        let client = Arc::new(FakeCompletion::failing());
        let s = Summarizer::new(client, "Turkish");
        let long: String = (0..300).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let expected = format!("{}...", &long[..200]);

        let p = paper(&long);
        assert_eq!(s.summarize(DigestSubject::Paper(&p)).await, expected);

        let n = news(&long);
        assert_eq!(s.summarize(DigestSubject::News(&n)).await, expected);
    }

    #[tokio::test]
    async fn failure_on_short_text_still_marks_truncation() {
        let s = Summarizer::new(Arc::new(FakeCompletion::failing()), "Turkish");
        let n = news("tiny");
        assert_eq!(s.summarize(DigestSubject::News(&n)).await, "tiny...");
    }
}
