//! UseCase: チャット一覧の取得
//!
//! 閲覧者が参加している全ルームを最終アクティビティの新しい順に並べ、
//! 相手のプロフィール、最終メッセージ、未読件数を添えて返します。
//!
//! 最終メッセージはメッセージテーブルを優先し、ルームにキャッシュされた要約は
//! その取得に失敗したときだけ使います（要約の更新は送信と非アトミックなため）。

use std::sync::Arc;

use crate::domain::{ChatListEntry, MessageRepository, Room, UserDirectory, UserId};

use super::error::GetChatListError;

/// メッセージがまだないルームの表示文言
pub const NO_MESSAGES_PLACEHOLDER: &str = "Start chatting...";

/// チャット一覧取得のユースケース
pub struct GetChatListUseCase {
    repository: Arc<dyn MessageRepository>,
    directory: Arc<dyn UserDirectory>,
}

impl GetChatListUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            repository,
            directory,
        }
    }

    pub async fn execute(&self, viewer_id: &UserId) -> Result<Vec<ChatListEntry>, GetChatListError> {
        let rooms = self
            .repository
            .rooms_for_user(viewer_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load rooms of '{}': {}", viewer_id, e);
                GetChatListError::Persistence(e.to_string())
            })?;

        let mut entries = Vec::with_capacity(rooms.len());
        for room in rooms {
            if let Some(entry) = self.build_entry(viewer_id, room).await {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn build_entry(&self, viewer_id: &UserId, room: Room) -> Option<ChatListEntry> {
        let peer_id = room.id.other_participant(viewer_id)?;
        let peer = match self.directory.find_by_id(peer_id).await {
            Ok(Some(peer)) => peer,
            Ok(None) => {
                tracing::debug!("Skipping {}: '{}' is unknown to the directory", room.id, peer_id);
                return None;
            }
            Err(e) => {
                tracing::warn!("Skipping {}: failed to load '{}': {}", room.id, peer_id, e);
                return None;
            }
        };

        let latest = match self.repository.query_messages(&room.id, 1, None).await {
            Ok(mut messages) => messages.pop(),
            Err(e) => {
                tracing::warn!("Failed to load last message of {}: {}", room.id, e);
                None
            }
        };
        let (last_message, last_message_at) = match latest {
            Some(message) => (message.summary(), message.timestamp),
            None => (
                room.last_message_summary
                    .clone()
                    .unwrap_or_else(|| NO_MESSAGES_PLACEHOLDER.to_string()),
                room.last_activity,
            ),
        };

        let unread_count = self
            .repository
            .count_undelivered(&room.id, viewer_id)
            .await
            .inspect_err(|e| tracing::warn!("Failed to count unread messages of {}: {}", room.id, e))
            .unwrap_or(0);

        Some(ChatListEntry {
            room_id: room.id,
            peer,
            last_message,
            last_message_at,
            unread_count,
        })
    }
}
