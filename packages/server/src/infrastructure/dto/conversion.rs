//! Conversion logic between DTOs and domain entities.

use tegami_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    Attachment, ChatListEntry, HydratedMessage, MediaCategory, Message, Notification,
    PublicProfile, ValueObjectError,
};
use crate::infrastructure::dto::{
    http::ChatListEntryDto,
    websocket::{AttachmentDto, MessageDto, ProfileDto, ServerEvent},
};

fn render_timestamp(millis: i64) -> String {
    timestamp_to_rfc3339(millis).unwrap_or_default()
}

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<AttachmentDto> for Attachment {
    type Error = ValueObjectError;

    fn try_from(dto: AttachmentDto) -> Result<Self, Self::Error> {
        Ok(Self {
            url: dto.url,
            category: dto.mime_category.parse::<MediaCategory>()?,
            file_name: dto.file_name,
            size_bytes: dto.size,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<PublicProfile> for ProfileDto {
    fn from(model: PublicProfile) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name,
            handle: model.handle.into_string(),
            avatar_url: model.avatar_url,
            bio: model.bio,
        }
    }
}

impl From<Attachment> for AttachmentDto {
    fn from(model: Attachment) -> Self {
        Self {
            url: model.url,
            mime_category: model.category.as_str().to_string(),
            file_name: model.file_name,
            size: model.size_bytes,
        }
    }
}

impl From<Message> for MessageDto {
    fn from(model: Message) -> Self {
        Self {
            id: model.id.to_string(),
            room_id: model.room_id.as_str().to_string(),
            sender_id: model.sender_id.into_string(),
            receiver_id: model.receiver_id.into_string(),
            content: model.content,
            kind: model.kind.as_str().to_string(),
            attachment: model.attachment.map(AttachmentDto::from),
            timestamp: model.timestamp.value(),
            created_at: render_timestamp(model.timestamp.value()),
            status: model.status.as_str().to_string(),
            sender: None,
        }
    }
}

impl From<HydratedMessage> for MessageDto {
    fn from(model: HydratedMessage) -> Self {
        Self {
            sender: model.sender.map(ProfileDto::from),
            ..MessageDto::from(model.message)
        }
    }
}

impl From<Notification> for ServerEvent {
    fn from(model: Notification) -> Self {
        match model {
            Notification::UserOnline(identity) => ServerEvent::UserOnline {
                user_id: identity.user_id.into_string(),
                handle: identity.handle.into_string(),
            },
            Notification::UserOffline(identity) => ServerEvent::UserOffline {
                user_id: identity.user_id.into_string(),
                handle: identity.handle.into_string(),
            },
            Notification::MessageReceived(message) => ServerEvent::MessageReceived {
                message: message.into(),
            },
        }
    }
}

impl From<ChatListEntry> for ChatListEntryDto {
    fn from(model: ChatListEntry) -> Self {
        Self {
            room_id: model.room_id.as_str().to_string(),
            user: model.peer.into(),
            last_message: model.last_message,
            last_message_time: render_timestamp(model.last_message_at.value()),
            last_message_timestamp: model.last_message_at.value(),
            unread_count: model.unread_count,
        }
    }
}
