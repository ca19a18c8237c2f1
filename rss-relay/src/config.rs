use crate::scheduler::Scheduler;
use crate::types::{DeliveryGuarantee, FeedSpec, FetchConfig, RelayError, Result};
use clap::Parser;
use email_notifier::smtp_notifier::{DEFAULT_SMTP_PORT, DEFAULT_SMTP_RELAY};
use email_notifier::{parse_recipient_list, SmtpConfig};
use interfaces::DEFAULT_HISTORY_FILE;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str = "https://jumitech.co.ke/feeds/posts/default?alt=rss";

/// Poll a blog feed and mail the newest post's extracted data to editors.
///
/// Every option can also come from the environment (or a `.env` file).
#[derive(Parser)]
#[command(name = "rss-relay", version)]
pub struct Cli {
    /// RSS or Atom feed to watch
    #[arg(long, env = "FEED_URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Sender address, also the SMTP login
    #[arg(long, env = "EMAIL_SENDER")]
    pub sender: String,

    /// SMTP password or app token
    #[arg(long, env = "EMAIL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Comma separated recipient addresses
    #[arg(long, env = "RECIPIENT_LIST")]
    pub recipients: String,

    #[arg(long, env = "HISTORY_FILE", default_value = DEFAULT_HISTORY_FILE)]
    pub history_file: PathBuf,

    /// Directory receiving the generated report files
    #[arg(long, env = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 300)]
    pub interval_secs: u64,

    /// Deadline for one complete check, network calls included
    #[arg(long, env = "TICK_TIMEOUT_SECS", default_value_t = 120)]
    pub tick_timeout_secs: u64,

    #[arg(long, env = "SMTP_RELAY", default_value = DEFAULT_SMTP_RELAY)]
    pub smtp_relay: String,

    #[arg(long, env = "SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    pub smtp_port: u16,

    /// at-least-once: retry posts whose email failed; at-most-once: never retry
    #[arg(long, env = "DELIVERY_GUARANTEE", default_value = "at-least-once")]
    pub delivery: DeliveryGuarantee,

    /// Check the feed a single time and exit
    #[arg(long)]
    pub once: bool,
}

/// Everything the relay needs, resolved once at startup.
#[derive(Clone)]
pub struct RelayConfig {
    pub feed: FeedSpec,
    pub fetch: FetchConfig,
    pub smtp: SmtpConfig,
    pub history_file: PathBuf,
    pub output_dir: PathBuf,
    pub interval: Duration,
    pub tick_timeout: Duration,
    pub delivery: DeliveryGuarantee,
    pub once: bool,
}

impl RelayConfig {
    /// Read `.env` if present, then the command line and environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Result<Self> {
        if !is_valid_feed_url(&cli.feed_url) {
            return Err(RelayError::Config(format!(
                "FEED_URL must be an http(s) URL, got '{}'",
                cli.feed_url
            )));
        }
        if cli.interval_secs == 0 {
            return Err(RelayError::Config("POLL_INTERVAL_SECS must be positive".to_string()));
        }
        if cli.tick_timeout_secs == 0 {
            return Err(RelayError::Config("TICK_TIMEOUT_SECS must be positive".to_string()));
        }

        let tick_timeout = Duration::from_secs(cli.tick_timeout_secs);

        let mut smtp = SmtpConfig::new(cli.sender, cli.password, parse_recipient_list(&cli.recipients));
        smtp.relay = cli.smtp_relay;
        smtp.port = cli.smtp_port;
        smtp.timeout = smtp.timeout.min(tick_timeout);
        smtp.validate().map_err(|e| RelayError::Config(e.to_string()))?;

        let mut fetch = FetchConfig::default();
        fetch.timeout_seconds = fetch.timeout_seconds.min(cli.tick_timeout_secs);

        Ok(Self {
            feed: FeedSpec { uri: cli.feed_url },
            fetch,
            smtp,
            history_file: cli.history_file,
            output_dir: cli.output_dir,
            interval: Duration::from_secs(cli.interval_secs),
            tick_timeout,
            delivery: cli.delivery,
            once: cli.once,
        })
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.interval, self.tick_timeout)
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("feed", &self.feed.uri)
            .field("smtp", &self.smtp)
            .field("history_file", &self.history_file)
            .field("output_dir", &self.output_dir)
            .field("interval", &self.interval)
            .field("tick_timeout", &self.tick_timeout)
            .field("delivery", &self.delivery)
            .field("once", &self.once)
            .finish()
    }
}

/// Validate RSS feed URL format
pub fn is_valid_feed_url(url_str: &str) -> bool {
    match url::Url::parse(url_str) {
        Ok(url) => url.scheme() == "http" || url.scheme() == "https",
        Err(_) => false,
    }
}
