use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;
use serde::{Serialize, Deserialize};

use crate::core::{DailyRecord, RecordEntries, UserConfig, ChatMessage};
use crate::core::record::{day_key, parse_day_key};
use crate::core::message::sort_by_timestamp;
use crate::backend::interface::{LedgerStore, MessageStore, Result};

/// Everything the store holds, laid out as its three collections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_config: Option<UserConfig>,
    /// Day records keyed by `YYYY-MM-DD`.
    #[serde(default)]
    pub records: BTreeMap<String, DailyRecord>,
    /// Chat messages.
    #[serde(default)]
    pub groups: Vec<ChatMessage>
}

impl StoreDocument {
    /// Records with a readable key, most recent first.
    pub fn records_desc(&self) -> RecordEntries {
        let mut entries: RecordEntries = self.records.iter()
            .filter_map(|(key, record)| match parse_day_key(key) {
                Ok(date) => Some((date, *record)),
                Err(_) => {
                    warn!("skipping record with unreadable key {:?}", key);
                    None
                }
            })
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        return entries;
    }

    pub fn record(&self, date: NaiveDate) -> Option<DailyRecord> {
        self.records.get(&day_key(date)).copied()
    }
}

/// Read and write access to a whole `StoreDocument`.
///
/// Anything implementing this gets `LedgerStore` and `MessageStore`.
pub trait DocumentAccess {
    fn view<T>(&self, f: impl FnOnce(&StoreDocument) -> T) -> Result<T>;
    fn update<T>(&self, f: impl FnOnce(&mut StoreDocument) -> T) -> Result<T>;
}

impl<D: DocumentAccess> LedgerStore for D {
    fn read_records(&self) -> Result<RecordEntries> {
        self.view(|doc| doc.records_desc())
    }

    fn read_record(&self, date: NaiveDate) -> Result<Option<DailyRecord>> {
        self.view(|doc| doc.record(date))
    }

    fn upsert_record(&self, date: NaiveDate, record: DailyRecord) -> Result<()> {
        self.update(|doc| {
            doc.records.insert(day_key(date), record);
        })
    }

    fn delete_record(&self, date: NaiveDate) -> Result<()> {
        self.update(|doc| {
            doc.records.remove(&day_key(date));
        })
    }

    fn read_config(&self) -> Result<Option<UserConfig>> {
        self.view(|doc| doc.user_config.clone())
    }

    fn merge_config(&self, patch: &UserConfig) -> Result<()> {
        self.update(|doc| {
            doc.user_config.get_or_insert_with(UserConfig::default).merge(patch);
        })
    }
}

impl<D: DocumentAccess> MessageStore for D {
    fn append_message(&self, message: &ChatMessage) -> Result<()> {
        self.update(|doc| doc.groups.push(message.clone()))
    }

    fn read_messages(&self) -> Result<Vec<ChatMessage>> {
        let mut messages = self.view(|doc| doc.groups.clone())?;
        sort_by_timestamp(&mut messages);
        return Ok(messages);
    }
}
