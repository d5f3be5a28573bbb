//! Domain layer
//!
//! 値オブジェクト、エンティティ、そして外部コラボレータ（メッセージストア、
//! ユーザーディレクトリ、認証、オブジェクトストレージ、プレゼンス、通知）の
//! インターフェースを定義します。具体的な実装は Infrastructure 層が提供します。

pub mod cursor;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod presence;
pub mod pusher;
pub mod repository;
pub mod room_id;
pub mod value_object;

pub use cursor::Cursor;
pub use entity::{
    Attachment, ChatListEntry, DeliveryStatus, HydratedMessage, Identity, MediaCategory, Message,
    MessageKind, NewMessage, PublicProfile, Room, RoomPatch, summarize_content,
};
pub use error::{
    AuthError, DirectoryError, MessagePushError, RepositoryError, RoomIdError, StorageError,
    ValueObjectError,
};
pub use gateway::{Authenticator, ObjectStorage, StoredObject};
pub use presence::{ConnectionHandle, PresenceRegistry, PusherChannel};
pub use pusher::{MessagePusher, Notification};
pub use repository::{MessageRepository, UserDirectory};
pub use room_id::RoomId;
pub use value_object::{ConnectionId, Handle, MessageContent, MessageId, Timestamp, UserId};

#[cfg(test)]
pub use gateway::{MockAuthenticator, MockObjectStorage};
#[cfg(test)]
pub use pusher::MockMessagePusher;
#[cfg(test)]
pub use repository::{MockMessageRepository, MockUserDirectory};
