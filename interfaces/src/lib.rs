pub mod defs;
pub mod state;

pub use defs::{DeliveryGuarantee, DeliveryOutcome, FeedSpec, HistoryStore, Notification, Notifier};
pub use state::{FileHistoryStore, HistoryError, DEFAULT_HISTORY_FILE};
