use std::fmt;

use chrono::NaiveDate;

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Source label carried by every paper.
pub const PAPER_SOURCE: &str = "ArXiv";

/// Author line used when a feed entry names nobody.
pub const UNKNOWN_AUTHORS: &str = "Unknown";

/// Subject area of an academic feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    ArtificialIntelligence,
    Nlp,
    ComputerVision,
    MachineLearning,
    NeuralNetworks,
    General,
}

impl Category {
    const TABLE: [(&'static str, Category); 5] = [
        ("cs.AI", Category::ArtificialIntelligence),
        ("cs.CL", Category::Nlp),
        ("cs.CV", Category::ComputerVision),
        ("cs.LG", Category::MachineLearning),
        ("cs.NE", Category::NeuralNetworks),
    ];

    /// Derive the category from the identifying part of a feed URL.
    ///
    /// First match in table order wins; unknown feeds map to [`Category::General`].
    pub fn from_feed_url(url: &str) -> Self {
        Self::TABLE
            .iter()
            .find(|(needle, _)| url.contains(needle))
            .map(|(_, cat)| *cat)
            .unwrap_or(Category::General)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::ArtificialIntelligence => "AI",
            Category::Nlp => "NLP",
            Category::ComputerVision => "CV",
            Category::MachineLearning => "ML",
            Category::NeuralNetworks => "Neural-Networks",
            Category::General => "AI General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An academic paper published today on one of the academic feeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paper {
    pub title: String,
    pub authors: String,
    pub abstract_text: String,
    pub link: String,
    pub source: &'static str,
    pub category: Category,
}

/// A news or blog post from the last two calendar days.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub published_on: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_known_feed_urls() {
        let cases = [
            ("http://export.arxiv.org/rss/cs.AI", "AI"),
            ("http://export.arxiv.org/rss/cs.CL", "NLP"),
            ("http://export.arxiv.org/rss/cs.CV", "CV"),
            ("http://export.arxiv.org/rss/cs.LG", "ML"),
            ("http://export.arxiv.org/rss/cs.NE", "Neural-Networks"),
        ];
        for (url, label) in cases {
            assert_eq!(Category::from_feed_url(url).label(), label, "{url}");
            // Pure function: same input, same answer.
            assert_eq!(Category::from_feed_url(url), Category::from_feed_url(url));
        }
    }

    #[test]
    fn category_defaults_for_unknown_feed() {
        let cat = Category::from_feed_url("https://example.com/rss/q-bio.NC");
        assert_eq!(cat, Category::General);
        assert_eq!(cat.to_string(), "AI General");
    }
}
