use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// A message posted to the community chat. Messages are only ever appended.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>
}

impl ChatMessage {
    pub fn new(text: &str, timestamp: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            text: text.to_owned(),
            timestamp
        }
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%Y-%m-%d %H:%M"), self.text)
    }
}

/// Orders messages oldest first. Ties keep their insertion order.
pub fn sort_by_timestamp(messages: &mut Vec<ChatMessage>) {
    messages.sort_by_key(|message| message.timestamp);
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn oldest_first() {
        let early = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let mut messages = vec![ChatMessage::new("second", late), ChatMessage::new("first", early)];

        sort_by_timestamp(&mut messages);

        let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(messages[0].to_string(), "[2024-05-01 08:00] first");
    }

    #[test]
    fn ids_are_unique() {
        let now = Utc::now();
        assert_ne!(ChatMessage::new("a", now).id, ChatMessage::new("a", now).id);
    }
}
