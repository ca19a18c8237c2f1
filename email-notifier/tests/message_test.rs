mod common;

use common::*;
use email_notifier::{parse_recipient_list, NotifierError};

#[test]
fn test_recipient_list_parsing() {
    assert_eq!(
        parse_recipient_list(" a@x.com, b@y.com ,"),
        vec!["a@x.com".to_string(), "b@y.com".to_string()]
    );
    assert!(parse_recipient_list("").is_empty());
    assert!(parse_recipient_list(" , ,, ").is_empty());
    assert_eq!(parse_recipient_list("solo@x.com"), vec!["solo@x.com".to_string()]);
}

#[test]
fn test_config_validation_rejects_malformed_addresses() {
    let good = SmtpConfig::new("me@example.com", "secret", vec!["a@x.com".to_string()]);
    assert!(good.validate().is_ok());

    let bad_recipient = SmtpConfig::new("me@example.com", "secret", vec!["not-an-address".to_string()]);
    match bad_recipient.validate() {
        Err(NotifierError::InvalidAddress { address, .. }) => assert_eq!(address, "not-an-address"),
        other => panic!("expected InvalidAddress, got {:?}", other.map(|_| ())),
    }

    let bad_sender = SmtpConfig::new("nobody", "secret", Vec::new());
    assert!(bad_sender.validate().is_err());
}

#[test]
fn test_debug_output_hides_password() {
    let config = SmtpConfig::new("me@example.com", "hunter2", Vec::new());
    let printed = format!("{:?}", config);
    assert!(!printed.contains("hunter2"));
    assert!(printed.contains("smtp.gmail.com"));
    assert!(printed.contains("587"));
}

#[tokio::test]
async fn test_message_carries_text_part_and_base64_attachment() {
    init_tracing();

    let attachment = write_attachment("post_update_1700000000.html", b"hello");
    let notifier = SmtpNotifier::new(SmtpConfig::new(
        "me@example.com",
        "secret",
        vec!["a@x.com".to_string(), "b@y.com".to_string()],
    ));

    let message = notifier.build_message(&test_notification(attachment)).await.unwrap();
    let raw = String::from_utf8(message.formatted()).unwrap();

    assert!(raw.contains("From: me@example.com"));
    assert!(raw.contains("To: a@x.com, b@y.com"));
    assert!(raw.contains("Subject: New RSS Post: Hello"));
    assert!(raw.contains("multipart/mixed"));
    assert!(raw.contains("Content-Type: text/plain"));
    assert!(raw.contains("A new post 'Hello' has been published."));
    assert!(raw.contains("Content-Type: application/octet-stream"));
    assert!(raw.contains("Content-Disposition: attachment; filename=\"post_update_1700000000.html\""));
    assert!(raw.contains("Content-Transfer-Encoding: base64"));
    // base64("hello")
    assert!(raw.contains("aGVsbG8="));

    let envelope = message.envelope();
    assert_eq!(envelope.to().len(), 2);
}

#[tokio::test]
async fn test_missing_attachment_is_an_error() {
    let notifier = SmtpNotifier::new(SmtpConfig::new("me@example.com", "secret", vec!["a@x.com".to_string()]));
    let missing = std::env::temp_dir().join(format!("missing-{}.html", uuid::Uuid::new_v4()));

    let result = notifier.build_message(&test_notification(missing.clone())).await;
    match result {
        Err(NotifierError::Attachment { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected Attachment error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_empty_recipient_list_skips_send() {
    init_tracing();

    // Unroutable relay: a send attempt would fail, a skip never touches it.
    let mut config = SmtpConfig::new("me@example.com", "secret", Vec::new());
    config.relay = "invalid.invalid".to_string();
    let notifier = SmtpNotifier::new(config);

    let attachment = write_attachment("post_update_1.html", b"{}");
    let outcome = notifier.notify(&test_notification(attachment)).await.unwrap();
    assert_eq!(outcome, DeliveryOutcome::Skipped);
}

#[tokio::test]
async fn test_unreachable_relay_reports_failure() {
    init_tracing();

    let mut config = greenmail_config(vec![TEST_RECIPIENT.to_string()]);
    // Nothing listens on port 1 locally.
    config.port = 1;
    config.timeout = std::time::Duration::from_secs(5);
    let notifier = SmtpNotifier::new(config);

    let attachment = write_attachment("post_update_2.html", b"{}");
    assert!(notifier.notify(&test_notification(attachment)).await.is_err());
}
