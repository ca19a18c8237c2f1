use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use interfaces::{DeliveryGuarantee, DeliveryOutcome, FeedSpec, HistoryStore, Notification, Notifier};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "RSS-Relay/1.0".to_string(),
            timeout_seconds: 30,
            max_feed_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedPost>,
}

/// One feed entry, reduced to what the relay needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    /// Explicit entry id, or the link when the feed has none. Empty when
    /// the entry has neither.
    pub id: String,
    pub title: String,
    pub link: String,
    /// Date text exactly as the feed wrote it.
    pub published: String,
    pub tags: Vec<String>,
    /// HTML body; the summary when there is no dedicated content.
    pub content: String,
}

/// Lists and images pulled out of a post body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub detected_lists: Vec<Vec<String>>,
    pub images: Vec<String>,
}

/// The JSON payload embedded in a report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReport {
    pub title: String,
    pub link: String,
    pub published: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub content_lists: Vec<Vec<String>>,
    pub full_content: String,
}

impl PostReport {
    pub fn new(post: &FeedPost, extracted: ExtractedContent) -> Self {
        Self {
            title: post.title.clone(),
            link: post.link.clone(),
            published: post.published.clone(),
            tags: post.tags.clone(),
            images: extracted.images,
            content_lists: extracted.detected_lists,
            full_content: post.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The feed came back without entries.
    NoEntries,
    /// The newest entry is already in the history.
    AlreadyProcessed { id: String },
    /// The newest entry has neither an id nor a link to key history on.
    Unidentified { title: String },
    Processed {
        id: String,
        report: PathBuf,
        /// Whether the post was written to the history.
        recorded: bool,
        delivery: std::result::Result<DeliveryOutcome, String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("History store error: {0}")]
    History(anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tick exceeded its {seconds}s deadline")]
    Timeout { seconds: u64 },
}

pub type Result<T> = std::result::Result<T, RelayError>;
