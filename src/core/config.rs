use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};

use crate::core::error::InputError;

pub type Price = f64;

/// Price of one pack, used when none has been stored yet.
pub const DEFAULT_PRICE: Price = 600.0;

/// The singleton settings document.
///
/// Both fields are optional so the same type doubles as a merge patch:
/// writing a config with only `price` set leaves the stored `quit_date` alone.
/// Unreadable fields deserialize as absent instead of failing the document,
/// and the price also accepts numeric strings.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quit_date: Option<NaiveDate>,

    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>
}

impl UserConfig {
    pub fn with_quit_date(date: NaiveDate) -> UserConfig {
        UserConfig { quit_date: Some(date), price: None }
    }

    pub fn with_price(price: Price) -> UserConfig {
        UserConfig { quit_date: None, price: Some(price) }
    }

    /// Copies every field set on `patch` over this config.
    pub fn merge(&mut self, patch: &UserConfig) {
        if let Some(date) = patch.quit_date {
            self.quit_date = Some(date);
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
    }

    /// Stored price, falling back to the default when it is missing, zero
    /// or not a usable number.
    pub fn effective_price(&self) -> Price {
        return match self.price {
            Some(price) if price.is_finite() && price > 0.0 => price,
            _ => DEFAULT_PRICE
        };
    }
}

/// Reads a price typed in by the user. Negative or non-finite values are refused.
pub fn parse_price(input: &str) -> Result<Price, InputError> {
    let price: Price = input.trim().parse()
        .map_err(|_| InputError::NotANumber(input.to_owned()))?;
    return check_price(price);
}

pub fn check_price(price: Price) -> Result<Price, InputError> {
    if !price.is_finite() || price < 0.0 {
        return Err(InputError::InvalidPrice(price));
    }
    return Ok(price);
}
