//! Domain entities.

use std::{fmt, str::FromStr};

use super::{
    cursor::Cursor,
    error::ValueObjectError,
    room_id::RoomId,
    value_object::{Handle, MessageContent, MessageId, Timestamp, UserId},
};

/// Upper bound (in characters) of a text message summary cached on a room.
pub const SUMMARY_MAX_CHARS: usize = 100;

/// Kind of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Video,
    File,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Video => "video",
            MessageKind::File => "file",
        }
    }

    /// Label used in room summaries, e.g. `IMAGE`.
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::Text => "TEXT",
            MessageKind::Image => "IMAGE",
            MessageKind::Video => "VIDEO",
            MessageKind::File => "FILE",
        }
    }
}

impl FromStr for MessageKind {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "video" => Ok(MessageKind::Video),
            "file" => Ok(MessageKind::File),
            other => Err(ValueObjectError::UnknownMessageKind(other.to_string())),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse MIME category of an uploaded object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    Image,
    Video,
    File,
}

impl MediaCategory {
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.starts_with("image/") {
            MediaCategory::Image
        } else if mime.starts_with("video/") {
            MediaCategory::Video
        } else {
            MediaCategory::File
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::Video => "video",
            MediaCategory::File => "file",
        }
    }
}

impl FromStr for MediaCategory {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaCategory::Image),
            "video" => Ok(MediaCategory::Video),
            "file" => Ok(MediaCategory::File),
            other => Err(ValueObjectError::UnknownMessageKind(other.to_string())),
        }
    }
}

impl From<MediaCategory> for MessageKind {
    fn from(category: MediaCategory) -> Self {
        match category {
            MediaCategory::Image => MessageKind::Image,
            MediaCategory::Video => MessageKind::Video,
            MediaCategory::File => MessageKind::File,
        }
    }
}

/// Delivery status of a message.
///
/// `Sent → Delivered` happens only when the receiver fetches the room history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryStatus {
    Sent,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Delivered => "delivered",
        }
    }
}

/// Attachment descriptor produced by the object storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub category: MediaCategory,
    pub file_name: String,
    pub size_bytes: u64,
}

/// Public profile fields of a user, owned by the user directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicProfile {
    pub id: UserId,
    pub name: String,
    pub handle: Handle,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// Authenticated identity handed off by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub handle: Handle,
}

/// Fields of a message before the store assigns its id and status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: MessageContent,
    pub kind: MessageKind,
    pub attachment: Option<Attachment>,
    pub timestamp: Timestamp,
}

/// Persisted message. Immutable apart from `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub kind: MessageKind,
    pub attachment: Option<Attachment>,
    pub timestamp: Timestamp,
    pub status: DeliveryStatus,
}

impl Message {
    /// Materialize a new message with status `Sent`.
    pub fn create(id: MessageId, new: NewMessage) -> Self {
        Self {
            id,
            room_id: new.room_id,
            sender_id: new.sender_id,
            receiver_id: new.receiver_id,
            content: new.content.into_string(),
            kind: new.kind,
            attachment: new.attachment,
            timestamp: new.timestamp,
            status: DeliveryStatus::Sent,
        }
    }

    /// Position of this message in the `(timestamp, id)` order.
    pub fn cursor(&self) -> Cursor {
        Cursor::at(self.timestamp, self.id)
    }

    pub fn summary(&self) -> String {
        summarize_content(self.kind, &self.content, self.attachment.as_ref())
    }
}

/// Summary cached on a room for its last message.
///
/// Text is truncated to [`SUMMARY_MAX_CHARS`]; other kinds become a label
/// such as `[IMAGE] cat.png`.
pub fn summarize_content(
    kind: MessageKind,
    content: &str,
    attachment: Option<&Attachment>,
) -> String {
    match (kind, attachment) {
        (MessageKind::Text, _) => {
            if content.chars().count() > SUMMARY_MAX_CHARS {
                let truncated: String = content.chars().take(SUMMARY_MAX_CHARS).collect();
                format!("{truncated}...")
            } else {
                content.to_string()
            }
        }
        (kind, Some(attachment)) => format!("[{}] {}", kind.label(), attachment.file_name),
        (kind, None) => format!("[{}]", kind.label()),
    }
}

/// Conversation scope of exactly two users, upserted lazily on first send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub last_activity: Timestamp,
    pub last_message_id: Option<MessageId>,
    pub last_message_summary: Option<String>,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            last_activity: created_at,
            last_message_id: None,
            last_message_summary: None,
        }
    }

    /// Apply the fields set in `patch`. Unset fields are left untouched.
    pub fn apply(&mut self, patch: &RoomPatch) {
        if let Some(last_activity) = patch.last_activity {
            self.last_activity = last_activity;
        }
        if let Some((id, summary)) = &patch.last_message {
            self.last_message_id = Some(*id);
            self.last_message_summary = Some(summary.clone());
        }
    }
}

/// Partial room update. Never clears fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomPatch {
    pub last_activity: Option<Timestamp>,
    pub last_message: Option<(MessageId, String)>,
}

impl RoomPatch {
    /// Only bump the last activity.
    pub fn touch(at: Timestamp) -> Self {
        Self {
            last_activity: Some(at),
            last_message: None,
        }
    }

    /// Record `message` as the room's last message.
    pub fn last_message(message: &Message) -> Self {
        Self {
            last_activity: Some(message.timestamp),
            last_message: Some((message.id, message.summary())),
        }
    }
}

/// Message paired with its sender's public profile, when the directory knows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratedMessage {
    pub message: Message,
    pub sender: Option<PublicProfile>,
}

/// One row of a user's chat list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatListEntry {
    pub room_id: RoomId,
    pub peer: PublicProfile,
    pub last_message: String,
    pub last_message_at: Timestamp,
    pub unread_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(kind: MessageKind, content: &str, attachment: Option<Attachment>) -> Message {
        let sender = UserId::new("u1").unwrap();
        let receiver = UserId::new("u2").unwrap();
        Message::create(
            MessageId::generate(),
            NewMessage {
                room_id: RoomId::derive(&sender, &receiver).unwrap(),
                sender_id: sender,
                receiver_id: receiver,
                content: MessageContent::new(content).unwrap(),
                kind,
                attachment,
                timestamp: Timestamp::new(1000),
            },
        )
    }

    #[test]
    fn test_new_message_starts_as_sent() {
        // テスト項目: 作成直後のメッセージは sent 状態になる
        let msg = message(MessageKind::Text, "hi", None);

        assert_eq!(msg.status, DeliveryStatus::Sent);
        assert_eq!(msg.room_id.as_str(), "room:u1:u2");
    }

    #[test]
    fn test_summary_for_text_is_truncated() {
        // テスト項目: 長いテキストメッセージの要約は切り詰められる
        // given (前提条件):
        let long = "a".repeat(SUMMARY_MAX_CHARS + 20);

        // when (操作):
        let summary = message(MessageKind::Text, &long, None).summary();

        // then (期待する結果):
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_summary_for_attachment_is_labeled() {
        // テスト項目: 添付ファイル付きメッセージの要約は種別ラベルとファイル名になる
        // given (前提条件):
        let attachment = Attachment {
            url: "http://localhost/media/1".to_string(),
            category: MediaCategory::Image,
            file_name: "cat.png".to_string(),
            size_bytes: 42,
        };

        // when (操作):
        let summary = message(MessageKind::Image, "", Some(attachment)).summary();

        // then (期待する結果):
        assert_eq!(summary, "[IMAGE] cat.png");
    }

    #[test]
    fn test_room_patch_never_clears_last_message() {
        // テスト項目: touch パッチは既存の最終メッセージ情報を消さない
        // given (前提条件):
        let msg = message(MessageKind::Text, "hello", None);
        let mut room = Room::new(msg.room_id.clone(), Timestamp::new(500));
        room.apply(&RoomPatch::last_message(&msg));

        // when (操作):
        room.apply(&RoomPatch::touch(Timestamp::new(2000)));

        // then (期待する結果):
        assert_eq!(room.last_activity, Timestamp::new(2000));
        assert_eq!(room.last_message_id, Some(msg.id));
        assert_eq!(room.last_message_summary.as_deref(), Some("hello"));
    }

    #[test]
    fn test_media_category_from_mime() {
        // テスト項目: MIME タイプから添付カテゴリが判定される
        assert_eq!(MediaCategory::from_mime("image/png"), MediaCategory::Image);
        assert_eq!(MediaCategory::from_mime("VIDEO/mp4"), MediaCategory::Video);
        assert_eq!(MediaCategory::from_mime("application/pdf"), MediaCategory::File);
        assert_eq!(MessageKind::from(MediaCategory::Video), MessageKind::Video);
    }
}
