//! Static registry of the syndication feeds the scanner reads.

/// What a feed is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedRole {
    Academic,
    News,
    Blog,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub role: FeedRole,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, role: FeedRole) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            role,
        }
    }
}

const ACADEMIC_FEEDS: [(&str, &str); 5] = [
    ("ArXiv cs.AI", "http://export.arxiv.org/rss/cs.AI"),
    ("ArXiv cs.CL", "http://export.arxiv.org/rss/cs.CL"),
    ("ArXiv cs.CV", "http://export.arxiv.org/rss/cs.CV"),
    ("ArXiv cs.LG", "http://export.arxiv.org/rss/cs.LG"),
    ("ArXiv cs.NE", "http://export.arxiv.org/rss/cs.NE"),
];

const NEWS_FEEDS: [(&str, &str); 3] = [
    ("AI News", "https://www.artificialintelligence-news.com/feed/"),
    ("VentureBeat AI", "https://venturebeat.com/ai/feed/"),
    ("The Batch", "https://www.deeplearning.ai/the-batch/feed/"),
];

const BLOG_FEEDS: [(&str, &str); 4] = [
    ("OpenAI Blog", "https://openai.com/blog/rss.xml"),
    ("Google AI Blog", "https://ai.googleblog.com/feeds/posts/default"),
    ("DeepMind Blog", "https://deepmind.com/blog/rss.xml"),
    ("Anthropic Blog", "https://www.anthropic.com/news/rss.xml"),
];

/// Feed list grouped by role.
///
/// Order matters: the report keeps only the first N items, so the order of
/// sources here is the order items reach the reader.
#[derive(Clone, Debug)]
pub struct FeedRegistry {
    sources: Vec<FeedSource>,
}

impl Default for FeedRegistry {
    fn default() -> Self {
        let mut sources = Vec::new();
        let groups = [
            (&ACADEMIC_FEEDS[..], FeedRole::Academic),
            (&NEWS_FEEDS[..], FeedRole::News),
            (&BLOG_FEEDS[..], FeedRole::Blog),
        ];
        for (feeds, role) in groups {
            sources.extend(
                feeds
                    .iter()
                    .map(|(name, url)| FeedSource::new(*name, *url, role)),
            );
        }
        Self { sources }
    }
}

impl FeedRegistry {
    pub fn new(sources: Vec<FeedSource>) -> Self {
        Self { sources }
    }

    pub fn academic(&self) -> impl Iterator<Item = &FeedSource> {
        self.with_role(FeedRole::Academic)
    }

    /// News sources first, then blog sources, each in registry order.
    pub fn news_and_blogs(&self) -> impl Iterator<Item = &FeedSource> {
        self.with_role(FeedRole::News)
            .chain(self.with_role(FeedRole::Blog))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn with_role(&self, role: FeedRole) -> impl Iterator<Item = &FeedSource> {
        self.sources.iter().filter(move |s| s.role == role)
    }
}
