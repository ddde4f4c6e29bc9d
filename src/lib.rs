mod core;
pub mod backend;
pub mod dashboard;
pub mod chat;

pub use crate::core::{DailyRecord, UserConfig, StreakSummary, ChatMessage, InputError, Price};
pub use crate::core::{record, config, streak, money, message};
pub use crate::dashboard::{Dashboard, DashboardView, Notification, Clock, SystemClock, FixedClock};
pub use crate::chat::{ChatRoom, Subscription, Snapshot};
