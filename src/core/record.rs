use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use serde_with::{serde_as, DefaultOnError};

use crate::core::error::InputError;

/// Format of the day keys, e.g. `2024-01-31`.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// One day's outcome. `success` is true when the day passed without smoking.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub success: bool
}

/// Records paired with the day they belong to.
pub type RecordEntries = Vec<(NaiveDate, DailyRecord)>;

impl DailyRecord {
    pub fn abstained() -> DailyRecord {
        DailyRecord { success: true }
    }

    pub fn smoked() -> DailyRecord {
        DailyRecord { success: false }
    }

    pub fn from_outcome(smoked: bool) -> DailyRecord {
        DailyRecord { success: !smoked }
    }
}

impl std::fmt::Display for DailyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = if self.success { "smoke-free" } else { "smoked" };
        write!(f, "{}", disp)
    }
}

pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(key.trim(), DAY_KEY_FORMAT)
}

/// Parses a day typed in by the user.
pub fn parse_day(input: &str) -> Result<NaiveDate, InputError> {
    parse_day_key(input).map_err(|_| InputError::InvalidDate(input.to_owned()))
}
