use std::sync::Arc;

use chrono::{Local, NaiveDate};
use log::{info, warn};
use serde::Serialize;

use crate::backend::{LedgerStore, BackendError};
use crate::core::{DailyRecord, UserConfig, StreakSummary, InputError, Price};
use crate::core::config::{DEFAULT_PRICE, check_price};
use crate::core::money::{format_money, DEFAULT_CURRENCY};
use crate::core::streak::{summarize, money_saved};

/// Source of "today".
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Transient message shown to the user after an action.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notification {
    Success(String),
    Error(String)
}

impl Notification {
    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::Success(msg) | Notification::Error(msg) => msg
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// What the dashboard page displays.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub today: NaiveDate,
    pub quit_date: Option<NaiveDate>,
    pub price: Price,
    pub streak_days: u32,
    pub money_saved: Price,
    pub money_display: String,
    pub today_record: Option<DailyRecord>
}

/// State behind the dashboard page and the actions that change it.
///
/// Mutations update the local fields first and then write to the store.
/// A failed write is reported as a notification and the local state is
/// left as it is, so the two can disagree until the next `load`.
pub struct Dashboard<S, C = SystemClock> {
    store: Arc<S>,
    clock: C,
    currency: String,
    quit_date: Option<NaiveDate>,
    price: Price,
    summary: StreakSummary,
    today_record: Option<DailyRecord>
}

impl<S: LedgerStore, C: Clock> Dashboard<S, C> {
    pub fn new(store: Arc<S>, clock: C) -> Dashboard<S, C> {
        Dashboard {
            store,
            clock,
            currency: DEFAULT_CURRENCY.to_owned(),
            quit_date: None,
            price: DEFAULT_PRICE,
            summary: StreakSummary::default(),
            today_record: None
        }
    }

    pub fn with_currency(mut self, symbol: &str) -> Dashboard<S, C> {
        self.currency = symbol.to_owned();
        self
    }

    pub fn quit_date(&self) -> Option<NaiveDate> {
        self.quit_date
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn summary(&self) -> StreakSummary {
        self.summary
    }

    /// Reads the settings and, once a quit date is known, the streak.
    ///
    /// Returns a notification only when something could not be read; the
    /// fields that were not read keep their previous values.
    pub fn load(&mut self) -> Option<Notification> {
        let config = match self.store.read_config() {
            Ok(config) => config,
            Err(err) => return Some(self.failure("Failed to load settings", err))
        };
        if let Some(config) = config {
            if config.quit_date.is_some() {
                self.quit_date = config.quit_date;
            }
            self.price = config.effective_price();
        }

        if self.quit_date.is_none() {
            return None;
        }
        return self.refresh().err()
            .map(|err| self.failure("Failed to load records", err));
    }

    /// Recomputes streak and savings from the store's records.
    pub fn refresh(&mut self) -> Result<(), BackendError> {
        let records = self.store.read_records()?;
        let today = self.clock.today();

        self.summary = summarize(&records, today, self.price);
        self.today_record = records.iter()
            .find(|(date, _)| *date == today)
            .map(|(_, record)| *record);
        return Ok(());
    }

    /// Marks `date` as smoked or smoke-free, then recomputes the streak.
    pub fn record_outcome(&mut self, date: NaiveDate, smoked: bool) -> Notification {
        let today = self.clock.today();
        if date > today {
            return Notification::Error(InputError::FutureDate { date, today }.to_string());
        }

        let record = DailyRecord::from_outcome(smoked);
        if date == today {
            self.today_record = Some(record);
        }
        if let Err(err) = self.store.upsert_record(date, record) {
            return self.failure("Failed to save record", err);
        }
        info!("recorded {} as {}", date, record);

        if let Err(err) = self.refresh() {
            return self.failure("Saved, but failed to update the streak", err);
        }

        let msg = if smoked { "Take a deep breath and calm down" } else { "Recorded!" };
        return Notification::Success(msg.to_owned());
    }

    /// Moves the quit date and drops every record on or after it.
    ///
    /// Applying the same date twice leaves the same records behind.
    pub fn set_quit_date(&mut self, date: NaiveDate) -> Notification {
        let today = self.clock.today();
        if date > today {
            return Notification::Error(InputError::FutureDate { date, today }.to_string());
        }

        self.quit_date = Some(date);
        if let Err(err) = self.store.merge_config(&UserConfig::with_quit_date(date)) {
            return self.failure("Failed to save quit date", err);
        }

        let stale = match self.store.records_since(date) {
            Ok(stale) => stale,
            Err(err) => return self.failure("Failed to look up records to clear", err)
        };
        for (day, _) in &stale {
            if let Err(err) = self.store.delete_record(*day) {
                return self.failure("Failed to clear records", err);
            }
        }
        info!("quit date set to {}, cleared {} records", date, stale.len());

        if let Err(err) = self.refresh() {
            return self.failure("Saved, but failed to update the streak", err);
        }
        return Notification::Success(format!("Quit date set to {}", date));
    }

    pub fn set_price(&mut self, price: Price) -> Notification {
        let price = match check_price(price) {
            Ok(price) => price,
            Err(err) => return Notification::Error(err.to_string())
        };

        self.price = price;
        self.summary.money_saved = money_saved(self.summary.streak_days, price);
        if let Err(err) = self.store.merge_config(&UserConfig::with_price(price)) {
            return self.failure("Failed to save price", err);
        }
        return Notification::Success("Price updated".to_owned());
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            today: self.clock.today(),
            quit_date: self.quit_date,
            price: self.price,
            streak_days: self.summary.streak_days,
            money_saved: self.summary.money_saved,
            money_display: format_money(self.summary.money_saved, &self.currency),
            today_record: self.today_record
        }
    }

    fn failure(&self, context: &str, err: BackendError) -> Notification {
        warn!("{}: {}", context, err);
        Notification::Error(format!("{}: {}", context, err))
    }
}
