use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::{DailyRecord, RecordEntries, UserConfig, ChatMessage};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to access store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("malformed store document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("store unavailable: {0}")]
    Unavailable(String)
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Document store holding the settings and one record per day.
///
/// Writes are last-write-wins; nothing here coordinates concurrent writers.
pub trait LedgerStore {
    /// All records, most recent day first.
    fn read_records(&self) -> Result<RecordEntries>;
    fn read_record(&self, date: NaiveDate) -> Result<Option<DailyRecord>>;
    fn upsert_record(&self, date: NaiveDate, record: DailyRecord) -> Result<()>;
    fn delete_record(&self, date: NaiveDate) -> Result<()>;

    /// Records on or after `date`, most recent first.
    fn records_since(&self, date: NaiveDate) -> Result<RecordEntries> {
        let records = self.read_records()?;
        return Ok(records.into_iter().filter(|(day, _)| *day >= date).collect());
    }

    fn read_config(&self) -> Result<Option<UserConfig>>;
    /// Writes the fields set on `patch`, keeping the others.
    fn merge_config(&self, patch: &UserConfig) -> Result<()>;
}

/// Append-only message collection backing the chat.
pub trait MessageStore {
    fn append_message(&self, message: &ChatMessage) -> Result<()>;
    /// All messages, oldest first.
    fn read_messages(&self) -> Result<Vec<ChatMessage>>;
}
