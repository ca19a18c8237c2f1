use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::defs::HistoryStore;

pub const DEFAULT_HISTORY_FILE: &str = "sent_posts.txt";

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("post id {0:?} contains a line break")]
    InvalidId(String),
}

/// Append-only history, one post id per line.
#[derive(Clone, Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileHistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_FILE)
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> anyhow::Result<HashSet<String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(self.io_error(e).into()),
        };

        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn record(&self, id: &str) -> anyhow::Result<()> {
        if id.contains('\n') || id.contains('\r') {
            return Err(HistoryError::InvalidId(id.to_string()).into());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{}", id).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}
