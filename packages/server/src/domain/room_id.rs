//! Deterministic room addressing.
//!
//! A room is shared by exactly two users and its identifier is derived from
//! their ids: `room:<min>:<max>`. Derivation is symmetric, and the identifier
//! parses back into the two participants.

use std::fmt;

use super::{error::RoomIdError, value_object::UserId};

pub const ROOM_PREFIX: &str = "room";
pub const ROOM_DELIMITER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId {
    value: String,
    first: UserId,
    second: UserId,
}

impl RoomId {
    /// Derive the room shared by `a` and `b`.
    ///
    /// Fails with [`RoomIdError::SelfChat`] when both ids are equal.
    pub fn derive(a: &UserId, b: &UserId) -> Result<Self, RoomIdError> {
        if a == b {
            return Err(RoomIdError::SelfChat);
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self::from_sorted(first.clone(), second.clone()))
    }

    /// Parse an identifier produced by [`RoomId::derive`].
    ///
    /// Only the canonical form is accepted: the `room` prefix, exactly two
    /// valid and distinct participant ids, in ascending order.
    pub fn parse(value: &str) -> Result<Self, RoomIdError> {
        let parts: Vec<&str> = value.split(ROOM_DELIMITER).collect();
        let [prefix, first, second] = parts.as_slice() else {
            return Err(RoomIdError::Malformed(value.to_string()));
        };
        if *prefix != ROOM_PREFIX {
            return Err(RoomIdError::Malformed(value.to_string()));
        }

        let first =
            UserId::new(*first).map_err(|_| RoomIdError::Malformed(value.to_string()))?;
        let second =
            UserId::new(*second).map_err(|_| RoomIdError::Malformed(value.to_string()))?;
        if first >= second {
            return Err(RoomIdError::Malformed(value.to_string()));
        }

        Ok(Self::from_sorted(first, second))
    }

    fn from_sorted(first: UserId, second: UserId) -> Self {
        let value = format!(
            "{ROOM_PREFIX}{ROOM_DELIMITER}{}{ROOM_DELIMITER}{}",
            first.as_str(),
            second.as_str()
        );
        Self {
            value,
            first,
            second,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Both participants, in canonical order.
    pub fn participants(&self) -> (&UserId, &UserId) {
        (&self.first, &self.second)
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        &self.first == user_id || &self.second == user_id
    }

    /// The participant that is not `user_id`, or `None` if `user_id` is not in the room.
    pub fn other_participant(&self, user_id: &UserId) -> Option<&UserId> {
        if &self.first == user_id {
            Some(&self.second)
        } else if &self.second == user_id {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[test]
    fn test_derive_is_symmetric() {
        // テスト項目: 引数の順序に関わらず同じルーム ID が導出される
        // given (前提条件):
        let pairs = [("u1", "u2"), ("bob", "alice"), ("Z9", "a0"), ("x", "xy")];

        for (a, b) in pairs {
            // when (操作):
            let ab = RoomId::derive(&user(a), &user(b)).unwrap();
            let ba = RoomId::derive(&user(b), &user(a)).unwrap();

            // then (期待する結果):
            assert_eq!(ab, ba);
            assert_eq!(ab.as_str(), ba.as_str());
        }
    }

    #[test]
    fn test_derive_uses_canonical_format() {
        // テスト項目: ルーム ID は "room:<小さい方>:<大きい方>" 形式になる
        // given (前提条件):
        let a = user("u2");
        let b = user("u1");

        // when (操作):
        let room_id = RoomId::derive(&a, &b).unwrap();

        // then (期待する結果):
        assert_eq!(room_id.as_str(), "room:u1:u2");
    }

    #[test]
    fn test_derive_rejects_self_chat() {
        // テスト項目: 同一ユーザー同士のルームは導出できない
        // given (前提条件):
        let a = user("u1");

        // when (操作):
        let result = RoomId::derive(&a, &a);

        // then (期待する結果):
        assert_eq!(result, Err(RoomIdError::SelfChat));
    }

    #[test]
    fn test_parse_recovers_exact_participants() {
        // テスト項目: 導出したルーム ID をパースすると元の 2 人の参加者が得られる
        // given (前提条件):
        let a = user("alice");
        let b = user("bob");
        let derived = RoomId::derive(&b, &a).unwrap();

        // when (操作):
        let parsed = RoomId::parse(derived.as_str()).unwrap();

        // then (期待する結果):
        assert_eq!(parsed, derived);
        assert_eq!(parsed.participants(), (&a, &b));
        assert!(parsed.contains(&a));
        assert!(parsed.contains(&b));
        assert!(!parsed.contains(&user("carol")));
        assert_eq!(parsed.other_participant(&a), Some(&b));
        assert_eq!(parsed.other_participant(&user("carol")), None);
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        // テスト項目: 形式に従わないルーム ID はパースできない
        let malformed = [
            "",
            "room",
            "room:u1",
            "room:u1:u2:u3",
            "chat:u1:u2",
            "room::u2",
            "room:u1:u1",
            "room:u2:u1",
        ];

        for value in malformed {
            assert!(
                matches!(RoomId::parse(value), Err(RoomIdError::Malformed(_))),
                "expected '{value}' to be rejected"
            );
        }
    }
}
