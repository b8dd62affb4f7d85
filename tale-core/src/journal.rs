//! Scene journal persistence.
//!
//! Every compaction (and the quit-time flush) appends one self-describing
//! JSON record, newline terminated, so the journal reads back as
//! line-delimited JSON no matter how many runs have appended to it. The
//! engine never reads the journal; it is an export, not a save file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Default journal path, relative to the working directory.
pub const DEFAULT_JOURNAL_PATH: &str = "scenes.json";

/// Errors from journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One flushed window of scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Id of the run that wrote the record; distinguishes interleaved runs
    /// appending to one file.
    pub session: Uuid,

    /// When the record was written (unix seconds).
    pub written_at: String,

    /// The scenes flushed in this window, in story order.
    pub scenes: Vec<String>,
}

/// Append-only journal of flushed scene windows.
#[derive(Debug, Clone)]
pub struct SceneJournal {
    path: PathBuf,
    session: Uuid,
}

impl SceneJournal {
    /// Create a journal writing to the given path.
    ///
    /// The file is created on first append; an existing file is appended
    /// to, never truncated.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session: Uuid::new_v4(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record holding the given scenes.
    pub async fn append(&self, scenes: &[String]) -> Result<(), JournalError> {
        let record = SceneRecord {
            session: self.session,
            written_at: unix_timestamp(),
            scenes: scenes.to_vec(),
        };

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::info!(
            scenes = scenes.len(),
            path = %self.path.display(),
            "journaled scene window"
        );
        Ok(())
    }
}

impl Default for SceneJournal {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_PATH)
    }
}

/// Get current timestamp as unix seconds.
fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    // Simple timestamp without a chrono dependency
    format!("{}", now.as_secs())
}
