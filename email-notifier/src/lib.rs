pub mod error;
pub mod recipients;
pub mod smtp_notifier;

pub use error::{NotifierError, Result};
pub use recipients::parse_recipient_list;
pub use smtp_notifier::{SmtpConfig, SmtpNotifier, SmtpSecurity};
