use chrono::NaiveDate;
use thiserror::Error;

use crate::core::config::Price;

/// Input rejected before anything is written to the store.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    /// Days can only be marked, or picked as quit date, up to today.
    #[error("{date} is after today ({today})")]
    FutureDate {
        date: NaiveDate,
        today: NaiveDate
    },
    #[error("not a usable price: {0}")]
    InvalidPrice(Price),
    #[error("not a date: {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("not a number: {0:?}")]
    NotANumber(String)
}
