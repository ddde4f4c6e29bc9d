pub mod record;
pub mod config;
pub mod streak;
pub mod money;
pub mod message;
pub mod error;

pub use record::{DailyRecord, RecordEntries};
pub use config::{UserConfig, Price};
pub use streak::StreakSummary;
pub use message::ChatMessage;
pub use error::InputError;
