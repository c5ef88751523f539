//! Assembles the daily report (Telegram legacy Markdown).

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::info;

use crate::{
    aggregator::Aggregator,
    domain::{NewsItem, Paper},
    summarizer::{DigestSubject, Summarizer},
};

/// Hard caps; items beyond these are dropped for this run.
pub const MAX_PAPERS: usize = 5;
pub const MAX_NEWS: usize = 8;

pub const NO_PAPERS_LINE: &str = "📚 *No new academic papers today*";
pub const NO_NEWS_LINE: &str = "📰 *No AI news today*";
const NEXT_REPORT_LINE: &str = "🔄 Next report will be sent at the next scheduled time...";

pub struct ReportBuilder {
    aggregator: Arc<Aggregator>,
    summarizer: Arc<Summarizer>,
}

impl ReportBuilder {
    pub fn new(aggregator: Arc<Aggregator>, summarizer: Arc<Summarizer>) -> Self {
        Self {
            aggregator,
            summarizer,
        }
    }

    pub async fn build(&self) -> String {
        self.build_at(Local::now()).await
    }

    /// Build the report as of `now` (date in the header, time in the footer,
    /// and the reference day for the feed filters).
    pub async fn build_at(&self, now: DateTime<Local>) -> String {
        let today = now.date_naive();
        let papers = self.aggregator.collect_papers_on(today).await;
        let news = self.aggregator.collect_news_on(today).await;
        info!(papers = papers.len(), news = news.len(), "building report");

        let mut report = header(now);

        if papers.is_empty() {
            push_line(&mut report, NO_PAPERS_LINE);
            report.push('\n');
        } else {
            push_line(
                &mut report,
                &format!("📚 *New Academic Papers ({} papers)*", papers.len()),
            );
            report.push('\n');
            for (i, paper) in papers.iter().take(MAX_PAPERS).enumerate() {
                let digest = self.summarizer.summarize(DigestSubject::Paper(paper)).await;
                report.push_str(&paper_block(i + 1, paper, &digest));
            }
        }

        if news.is_empty() {
            push_line(&mut report, NO_NEWS_LINE);
            report.push('\n');
        } else {
            push_line(
                &mut report,
                &format!("📰 *AI News ({} articles)*", news.len()),
            );
            report.push('\n');
            for (i, item) in news.iter().take(MAX_NEWS).enumerate() {
                let digest = self.summarizer.summarize(DigestSubject::News(item)).await;
                report.push_str(&news_block(i + 1, item, &digest));
            }
        }

        report.push_str(&footer(now));
        report
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn header(now: DateTime<Local>) -> String {
    format!("🤖 *AI Daily Report - {}*\n\n", now.format("%d.%m.%Y"))
}

fn footer(now: DateTime<Local>) -> String {
    format!(
        "⏰ Report generation time: {}\n{NEXT_REPORT_LINE}\n",
        now.format("%H:%M")
    )
}

pub fn paper_block(index: usize, paper: &Paper, digest: &str) -> String {
    format!(
        "*{index}. {title}*\n\
         👥 Authors: {authors}\n\
         📂 Category: {category}\n\
         📄 Abstract: {digest}\n\
         🔗 [Read Paper]({link})\n\n",
        title = paper.title,
        authors = paper.authors,
        category = paper.category,
        link = paper.link,
    )
}

pub fn news_block(index: usize, item: &NewsItem, digest: &str) -> String {
    format!(
        "*{index}. {title}*\n\
         📰 Source: {source}\n\
         📝 Summary: {digest}\n\
         🔗 [Read News]({link})\n\n",
        title = item.title,
        source = item.source,
        link = item.link,
    )
}
