//! Pagination cursor.
//!
//! Messages are totally ordered by `(timestamp, id)`. A cursor marks a
//! position in that order; the next page holds messages strictly before it.
//! Encoded as `<millis>_<message id>`. A bare `<millis>` or an RFC 3339
//! timestamp is also accepted and bounds on the timestamp alone.

use std::{fmt, str::FromStr};

use tegami_shared::time::rfc3339_to_timestamp;

use super::{
    error::ValueObjectError,
    value_object::{MessageId, Timestamp},
};

const CURSOR_SEPARATOR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    timestamp: Timestamp,
    message_id: Option<MessageId>,
}

impl Cursor {
    /// Cursor positioned exactly at a message.
    pub fn at(timestamp: Timestamp, message_id: MessageId) -> Self {
        Self {
            timestamp,
            message_id: Some(message_id),
        }
    }

    /// Cursor bounding on a timestamp only.
    pub fn before(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            message_id: None,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn message_id(&self) -> Option<MessageId> {
        self.message_id
    }

    /// Whether a message at `(timestamp, id)` sorts strictly before this cursor.
    pub fn admits(&self, timestamp: Timestamp, id: MessageId) -> bool {
        match self.message_id {
            Some(cursor_id) => (timestamp, id) < (self.timestamp, cursor_id),
            None => timestamp < self.timestamp,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message_id {
            Some(id) => write!(f, "{}{CURSOR_SEPARATOR}{}", self.timestamp.value(), id),
            None => write!(f, "{}", self.timestamp.value()),
        }
    }
}

impl FromStr for Cursor {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueObjectError::InvalidCursor(s.to_string());

        if let Some((millis, id)) = s.split_once(CURSOR_SEPARATOR) {
            let millis = millis.parse::<i64>().map_err(|_| invalid())?;
            let id = MessageId::parse(id).map_err(|_| invalid())?;
            return Ok(Self::at(Timestamp::new(millis), id));
        }

        if let Ok(millis) = s.parse::<i64>() {
            return Ok(Self::before(Timestamp::new(millis)));
        }

        rfc3339_to_timestamp(s)
            .map(|millis| Self::before(Timestamp::new(millis)))
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_string_round_trip() {
        // テスト項目: カーソルを文字列化して再度パースすると同じ値になる
        // given (前提条件):
        let cursor = Cursor::at(Timestamp::new(1_700_000_000_123), MessageId::generate());

        // when (操作):
        let parsed: Cursor = cursor.to_string().parse().unwrap();

        // then (期待する結果):
        assert_eq!(parsed, cursor);
    }

    #[test]
    fn test_cursor_accepts_timestamp_only_forms() {
        // テスト項目: ミリ秒のみ、または RFC 3339 形式のカーソルを受け付ける
        let millis: Cursor = "1672531200123".parse().unwrap();
        let rfc3339: Cursor = "2023-01-01T00:00:00.123Z".parse().unwrap();

        assert_eq!(millis, Cursor::before(Timestamp::new(1672531200123)));
        assert_eq!(rfc3339, millis);
        assert!("yesterday".parse::<Cursor>().is_err());
        assert!("12_not-a-uuid".parse::<Cursor>().is_err());
    }

    #[test]
    fn test_admits_breaks_ties_by_message_id() {
        // テスト項目: 同一タイムスタンプのメッセージは ID で前後関係が決まる
        // given (前提条件):
        let ts = Timestamp::new(1000);
        let mut ids = [MessageId::generate(), MessageId::generate()];
        ids.sort();
        let cursor = Cursor::at(ts, ids[1]);

        // when (操作) / then (期待する結果):
        assert!(cursor.admits(ts, ids[0]));
        assert!(!cursor.admits(ts, ids[1]));
        assert!(cursor.admits(Timestamp::new(999), ids[1]));
        assert!(!cursor.admits(Timestamp::new(1001), ids[0]));
    }

    #[test]
    fn test_timestamp_only_cursor_is_strict() {
        // テスト項目: タイムスタンプのみのカーソルは同時刻のメッセージを含まない
        let cursor = Cursor::before(Timestamp::new(1000));

        assert!(cursor.admits(Timestamp::new(999), MessageId::generate()));
        assert!(!cursor.admits(Timestamp::new(1000), MessageId::generate()));
    }
}
