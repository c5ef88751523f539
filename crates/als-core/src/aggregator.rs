//! Collects today's papers and recent news from the feed registry.
//!
//! Ordering contract: results follow registry order (academic feeds for
//! papers; news sources then blog sources for news), and entry order within
//! each feed. The report builder truncates to the first N items, so this
//! order decides what readers see.

use std::sync::Arc;

use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::{
    domain::{Category, NewsItem, Paper, PAPER_SOURCE, UNKNOWN_AUTHORS},
    formatting::clean_feed_text,
    ports::{FeedDocument, FeedEntry, FeedFetcher},
    sources::{FeedRegistry, FeedSource},
};

const UNTITLED: &str = "Untitled";

pub struct Aggregator {
    registry: FeedRegistry,
    fetcher: Arc<dyn FeedFetcher>,
}

impl Aggregator {
    pub fn new(registry: FeedRegistry, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self { registry, fetcher }
    }

    pub async fn collect_papers(&self) -> Vec<Paper> {
        self.collect_papers_on(Local::now().date_naive()).await
    }

    pub async fn collect_news(&self) -> Vec<NewsItem> {
        self.collect_news_on(Local::now().date_naive()).await
    }

    /// Papers whose publish date equals `today`.
    pub async fn collect_papers_on(&self, today: NaiveDate) -> Vec<Paper> {
        let mut papers = Vec::new();

        for source in self.registry.academic() {
            let Some(doc) = self.fetch_or_skip(source).await else {
                continue;
            };
            let category = Category::from_feed_url(&source.url);
            let before = papers.len();

            for entry in doc.entries {
                let Some(published) = entry.published else {
                    warn!(
                        feed = %source.url,
                        title = entry.title.as_deref().unwrap_or(UNTITLED),
                        "paper entry has no publish timestamp, skipping"
                    );
                    continue;
                };
                if publish_date(&published) == today {
                    papers.push(paper_from_entry(entry, category));
                }
            }

            info!(
                feed = %source.url,
                kept = papers.len() - before,
                "collected papers"
            );
        }

        papers
    }

    /// News/blog posts published on `today` or the day before.
    pub async fn collect_news_on(&self, today: NaiveDate) -> Vec<NewsItem> {
        let earliest = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let mut items = Vec::new();

        for source in self.registry.news_and_blogs() {
            let Some(doc) = self.fetch_or_skip(source).await else {
                continue;
            };
            let before = items.len();

            for entry in doc.entries {
                // Undated entries cannot be tested for recency.
                let Some(published) = entry.published else {
                    continue;
                };
                let published_on = publish_date(&published);
                if published_on >= earliest {
                    items.push(news_from_entry(entry, &source.name, published_on));
                }
            }

            info!(
                source = %source.name,
                kept = items.len() - before,
                "collected news"
            );
        }

        items
    }

    async fn fetch_or_skip(&self, source: &FeedSource) -> Option<FeedDocument> {
        match self.fetcher.fetch(&source.url).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(
                    source = %source.name,
                    feed = %source.url,
                    error = %e,
                    "feed read failed, skipping"
                );
                None
            }
        }
    }
}

/// Calendar date of a publish timestamp, taken as published by the feed.
///
/// The feed's date is compared with the local run date without conversion.
/// When the two calendars disagree for this timestamp it is logged, not corrected.
fn publish_date(published: &DateTime<Utc>) -> NaiveDate {
    let date = published.date_naive();
    let local = published.with_timezone(&Local).date_naive();
    if local != date {
        debug!(
            %published,
            feed_date = %date,
            local_date = %local,
            "publish date differs in local time"
        );
    }
    date
}

fn cleaned(value: Option<String>) -> Option<String> {
    value
        .map(|v| clean_feed_text(&v))
        .filter(|v| !v.is_empty())
}

fn paper_from_entry(entry: FeedEntry, category: Category) -> Paper {
    Paper {
        title: cleaned(entry.title).unwrap_or_else(|| UNTITLED.to_string()),
        authors: cleaned(entry.author).unwrap_or_else(|| UNKNOWN_AUTHORS.to_string()),
        abstract_text: cleaned(entry.summary).unwrap_or_default(),
        link: entry.link.unwrap_or_default(),
        source: PAPER_SOURCE,
        category,
    }
}

fn news_from_entry(entry: FeedEntry, source_name: &str, published_on: NaiveDate) -> NewsItem {
    let title = cleaned(entry.title).unwrap_or_else(|| UNTITLED.to_string());
    let summary = cleaned(entry.summary).unwrap_or_else(|| title.clone());
    NewsItem {
        title,
        summary,
        link: entry.link.unwrap_or_default(),
        source: source_name.to_string(),
        published_on,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sources::FeedRole,
        test_support::{at_noon, entry, FakeFetcher},
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn aggregator(sources: Vec<FeedSource>, fetcher: FakeFetcher) -> Aggregator {
        Aggregator::new(FeedRegistry::new(sources), Arc::new(fetcher))
    }

    #[tokio::test]
    async fn papers_only_from_today() {
        let today = date(2026, 3, 10);
        let fetcher = FakeFetcher::default().with_feed(
            "http://export.arxiv.org/rss/cs.CL",
            vec![
                entry("today-1", Some(at_noon(today))),
                entry("yesterday", Some(at_noon(date(2026, 3, 9)))),
                entry("today-2", Some(at_noon(today))),
                entry("last-year", Some(at_noon(date(2025, 3, 10)))),
            ],
        );
        let agg = aggregator(
            vec![FeedSource::new(
                "cl",
                "http://export.arxiv.org/rss/cs.CL",
                FeedRole::Academic,
            )],
            fetcher,
        );

        let papers = agg.collect_papers_on(today).await;
        let titles: Vec<_> = papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["today-1", "today-2"]);
        assert!(papers.iter().all(|p| p.category == Category::Nlp));
        assert!(papers.iter().all(|p| p.source == "ArXiv"));
    }

    #[tokio::test]
    async fn paper_without_timestamp_is_skipped_not_fatal() {
        let today = date(2026, 3, 10);
        let fetcher = FakeFetcher::default().with_feed(
            "http://export.arxiv.org/rss/cs.AI",
            vec![entry("undated", None), entry("dated", Some(at_noon(today)))],
        );
        let agg = aggregator(
            vec![FeedSource::new(
                "ai",
                "http://export.arxiv.org/rss/cs.AI",
                FeedRole::Academic,
            )],
            fetcher,
        );

        let papers = agg.collect_papers_on(today).await;
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "dated");
    }

    #[tokio::test]
    async fn paper_defaults_for_missing_fields() {
        let today = date(2026, 3, 10);
        let bare = FeedEntry {
            published: Some(at_noon(today)),
            ..FeedEntry::default()
        };
        let fetcher = FakeFetcher::default().with_feed("https://example.org/feed", vec![bare]);
        let agg = aggregator(
            vec![FeedSource::new(
                "other",
                "https://example.org/feed",
                FeedRole::Academic,
            )],
            fetcher,
        );

        let papers = agg.collect_papers_on(today).await;
        assert_eq!(papers[0].authors, "Unknown");
        assert_eq!(papers[0].title, "Untitled");
        assert_eq!(papers[0].category, Category::General);
    }

    #[tokio::test]
    async fn news_window_includes_yesterday_excludes_two_days_ago() {
        let today = date(2026, 3, 10);
        let fetcher = FakeFetcher::default().with_feed(
            "https://news/feed",
            vec![
                entry("today", Some(at_noon(today))),
                entry("yesterday", Some(at_noon(date(2026, 3, 9)))),
                entry("two-days-ago", Some(at_noon(date(2026, 3, 8)))),
                entry("undated", None),
            ],
        );
        let agg = aggregator(
            vec![FeedSource::new("News", "https://news/feed", FeedRole::News)],
            fetcher,
        );

        let news = agg.collect_news_on(today).await;
        let titles: Vec<_> = news.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["today", "yesterday"]);
        assert_eq!(news[1].published_on, date(2026, 3, 9));
        assert_eq!(news[0].source, "News");
    }

    #[tokio::test]
    async fn news_summary_falls_back_to_title() {
        let today = date(2026, 3, 10);
        let mut e = entry("Headline", Some(at_noon(today)));
        e.summary = None;
        let fetcher = FakeFetcher::default().with_feed("https://news/feed", vec![e]);
        let agg = aggregator(
            vec![FeedSource::new("News", "https://news/feed", FeedRole::News)],
            fetcher,
        );

        let news = agg.collect_news_on(today).await;
        assert_eq!(news[0].summary, "Headline");
    }

    #[tokio::test]
    async fn failing_feed_is_skipped_and_order_is_kept() {
        let today = date(2026, 3, 10);
        let fetcher = Arc::new(
            FakeFetcher::default()
                .with_feed("https://blog/feed", vec![entry("blog-post", Some(at_noon(today)))])
                .with_failure("https://broken/feed")
                .with_feed("https://news/feed", vec![entry("news-post", Some(at_noon(today)))]),
        );
        let agg = Aggregator::new(
            FeedRegistry::new(vec![
                FeedSource::new("Blog", "https://blog/feed", FeedRole::Blog),
                FeedSource::new("Broken", "https://broken/feed", FeedRole::News),
                FeedSource::new("News", "https://news/feed", FeedRole::News),
            ]),
            fetcher.clone(),
        );

        let news = agg.collect_news_on(today).await;
        let titles: Vec<_> = news.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["news-post", "blog-post"]);

        // Every source is tried once, in order, even after a failure.
        assert_eq!(
            *fetcher.calls.lock().unwrap(),
            vec!["https://broken/feed", "https://news/feed", "https://blog/feed"]
        );
    }
}
