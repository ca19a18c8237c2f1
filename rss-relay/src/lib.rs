pub mod types;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod extractor;
pub mod report;
pub mod pipeline;
pub mod scheduler;

pub use types::*;
pub use config::{Cli, RelayConfig};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use extractor::extract_content;
pub use pipeline::Pipeline;
pub use scheduler::Scheduler;
