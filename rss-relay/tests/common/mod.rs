#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::header;
use axum::routing::get;
use axum::Router;
use interfaces::FileHistoryStore;
use rss_relay::{DeliveryOutcome, FeedSpec, FetchConfig, Fetcher, Notification, Notifier, Pipeline};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();
    });
}

pub const NEWEST_POST_ID: &str = "tag:blogger.com,1999:blog-1.post-2";
pub const NEWEST_POST_LINK: &str = "https://jumitech.co.ke/2026/10/best-budget-phones.html";
pub const NEWEST_POST_CONTENT: &str =
    r#"<p>Intro</p><ul><li>A</li><li>B</li></ul><p>text</p><ol><li>C</li></ol><img src="x.png">"#;

/// Two posts, newest first, shaped like a Blogger RSS export.
pub const BLOG_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Jumitech</title>
    <link>https://jumitech.co.ke/</link>
    <description>Tech news and reviews</description>
    <item>
      <guid isPermaLink="false">tag:blogger.com,1999:blog-1.post-2</guid>
      <title>Best Budget Phones</title>
      <link>https://jumitech.co.ke/2026/10/best-budget-phones.html</link>
      <pubDate>Fri, 16 Oct 2026 09:30:00 +0000</pubDate>
      <category>Phones</category>
      <category>Reviews</category>
      <description><![CDATA[<p>Intro</p><ul><li>A</li><li>B</li></ul><p>text</p><ol><li>C</li></ol><img src="x.png">]]></description>
    </item>
    <item>
      <guid isPermaLink="false">tag:blogger.com,1999:blog-1.post-1</guid>
      <title>Older Post</title>
      <link>https://jumitech.co.ke/2026/10/older-post.html</link>
      <pubDate>Fri, 09 Oct 2026 09:30:00 +0000</pubDate>
      <description><![CDATA[<p>Old news</p>]]></description>
    </item>
  </channel>
</rss>"#;

pub const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Jumitech</title>
    <link>https://jumitech.co.ke/</link>
    <description>Nothing yet</description>
  </channel>
</rss>"#;

/// In-process HTTP server handing out a feed document that tests can swap.
pub struct FeedServer {
    pub base_url: String,
    body: Arc<Mutex<String>>,
    hits: Arc<AtomicUsize>,
}

impl FeedServer {
    pub async fn start(feed: &str) -> Self {
        let body = Arc::new(Mutex::new(feed.to_string()));
        let hits = Arc::new(AtomicUsize::new(0));

        let feed_body = body.clone();
        let feed_hits = hits.clone();
        let app = Router::new()
            .route(
                "/feed.xml",
                get(move || {
                    let body = feed_body.clone();
                    let hits = feed_hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        let body = body.lock().unwrap().clone();
                        ([(header::CONTENT_TYPE, "application/rss+xml")], body)
                    }
                }),
            )
            .route(
                "/slow.xml",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    "too late"
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            body,
            hits,
        }
    }

    pub fn feed_url(&self) -> String {
        format!("{}/feed.xml", self.base_url)
    }

    pub fn set_feed(&self, feed: &str) {
        *self.body.lock().unwrap() = feed.to_string();
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Notifier that remembers every notification instead of sending mail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn attempts(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<DeliveryOutcome> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            anyhow::bail!("smtp relay unreachable");
        }
        Ok(DeliveryOutcome::Delivered { recipients: 2 })
    }
}

pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rss-relay-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn report_files(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

pub fn test_fetcher() -> Fetcher {
    Fetcher::new(FetchConfig {
        user_agent: "RSS-Relay-Test/1.0".to_string(),
        timeout_seconds: 10,
        ..FetchConfig::default()
    })
    .unwrap()
}

pub fn test_pipeline(feed_url: String, workdir: &Path, notifier: Arc<RecordingNotifier>) -> Pipeline {
    Pipeline::new(
        FeedSpec { uri: feed_url },
        test_fetcher(),
        Arc::new(FileHistoryStore::new(workdir.join("sent_posts.txt"))),
        notifier,
        workdir.join("reports"),
    )
}
