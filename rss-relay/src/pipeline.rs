use crate::config::RelayConfig;
use crate::extractor::extract_content;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::report::write_report;
use crate::types::{
    DeliveryGuarantee, FeedPost, FeedSpec, HistoryStore, Notification, Notifier, PostReport, RelayError, Result,
    TickOutcome,
};
use chrono::Utc;
use email_notifier::SmtpNotifier;
use interfaces::FileHistoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One feed, one recipient list: fetch, diff against history, report, notify.
pub struct Pipeline {
    feed: FeedSpec,
    fetcher: Fetcher,
    parser: FeedParser,
    history: Arc<dyn HistoryStore>,
    notifier: Arc<dyn Notifier>,
    output_dir: PathBuf,
    delivery: DeliveryGuarantee,
}

impl Pipeline {
    pub fn new(
        feed: FeedSpec,
        fetcher: Fetcher,
        history: Arc<dyn HistoryStore>,
        notifier: Arc<dyn Notifier>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            feed,
            fetcher,
            parser: FeedParser::new(),
            history,
            notifier,
            output_dir: output_dir.into(),
            delivery: DeliveryGuarantee::default(),
        }
    }

    /// Wire the production pieces: HTTP fetcher, flat-file history, SMTP.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let fetcher = Fetcher::new(config.fetch.clone())?;
        let history = Arc::new(FileHistoryStore::new(&config.history_file));
        let notifier = Arc::new(SmtpNotifier::new(config.smtp.clone()));

        Ok(Self::new(config.feed.clone(), fetcher, history, notifier, &config.output_dir)
            .with_delivery(config.delivery))
    }

    pub fn with_delivery(mut self, delivery: DeliveryGuarantee) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn feed(&self) -> &FeedSpec {
        &self.feed
    }

    /// Run the whole job once.
    ///
    /// Only the newest entry is considered. Fetch, parse, history and report
    /// failures abort the tick before anything is recorded.
    pub async fn run_tick(&self) -> Result<TickOutcome> {
        info!("Checking feed {}", self.feed.uri);

        let content = self.fetcher.fetch_feed(&self.feed.uri).await.map_err(|e| {
            error!("Failed to fetch feed {}: {}", self.feed.uri, e);
            e
        })?;
        let parsed = self.parser.parse_feed(&content)?;

        let Some(latest) = parsed.entries.into_iter().next() else {
            warn!("No entries found in {}. Check URL.", self.feed.uri);
            return Ok(TickOutcome::NoEntries);
        };

        if latest.id.is_empty() {
            warn!(
                "Newest entry '{}' in {} has no id or link; cannot track it",
                latest.title, self.feed.uri
            );
            return Ok(TickOutcome::Unidentified { title: latest.title });
        }

        if self.history.contains(&latest.id).map_err(RelayError::History)? {
            info!("No new posts found.");
            return Ok(TickOutcome::AlreadyProcessed { id: latest.id });
        }

        info!("New post found: {}", latest.title);
        self.process(latest).await
    }

    async fn process(&self, post: FeedPost) -> Result<TickOutcome> {
        let extracted = extract_content(&post.content);
        info!(
            "Extracted {} lists and {} images from '{}'",
            extracted.detected_lists.len(),
            extracted.images.len(),
            post.title
        );

        let report = PostReport::new(&post, extracted);
        let report_path = write_report(&self.output_dir, &report, Utc::now().timestamp()).await?;

        let notification = Notification {
            subject: format!("New RSS Post: {}", post.title),
            body: format!(
                "A new post '{}' has been published. Please find the JSON extraction attached.",
                post.title
            ),
            attachment: report_path.clone(),
        };

        let delivery = self.notifier.notify(&notification).await.map_err(|e| format!("{:#}", e));

        let record = match (&delivery, self.delivery) {
            (Ok(_), _) => true,
            (Err(_), DeliveryGuarantee::AtMostOnce) => {
                warn!("Notification for '{}' failed; marking it processed anyway", post.id);
                true
            }
            (Err(e), DeliveryGuarantee::AtLeastOnce) => {
                warn!("Notification for '{}' failed ({}); will retry next tick", post.id, e);
                false
            }
        };

        if record {
            self.history.record(&post.id).map_err(RelayError::History)?;
        }

        Ok(TickOutcome::Processed {
            id: post.id,
            report: report_path,
            recorded: record,
            delivery,
        })
    }
}
