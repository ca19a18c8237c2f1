#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

pub use email_notifier::{SmtpConfig, SmtpNotifier, SmtpSecurity};
pub use interfaces::{DeliveryOutcome, Notification, Notifier};

/// Test configuration constants
pub const TEST_SENDER: &str = "relay@localhost";
pub const TEST_RECIPIENT: &str = "test@localhost";
pub const GREENMAIL_SMTP_PORT: u16 = 3025;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();
    });
}

/// Write `content` to a fresh file under the temp dir and return its path.
pub fn write_attachment(file_name: &str, content: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("email-notifier-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    let path = dir.join(file_name);
    std::fs::write(&path, content).expect("write attachment");
    path
}

pub fn test_notification(attachment: PathBuf) -> Notification {
    Notification {
        subject: "New RSS Post: Hello".to_string(),
        body: "A new post 'Hello' has been published.".to_string(),
        attachment,
    }
}

pub fn greenmail_config(recipients: Vec<String>) -> SmtpConfig {
    let mut config = SmtpConfig::new(TEST_SENDER, "", recipients);
    config.relay = "localhost".to_string();
    config.port = GREENMAIL_SMTP_PORT;
    config.security = SmtpSecurity::None;
    config.timeout = std::time::Duration::from_secs(10);
    config
}
