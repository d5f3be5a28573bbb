//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! 1 回の呼び出しは 1 回のロック取得で完結するため、単一の書き込み
//! （メッセージ作成、ルーム更新、一括既読化）はそれぞれアトミックです。

use std::collections::HashMap;

use async_trait::async_trait;
use tegami_shared::time::get_timestamp;
use tokio::sync::Mutex;

use crate::domain::{
    Cursor, DeliveryStatus, Message, MessageId, MessageRepository, NewMessage, RepositoryError,
    Room, RoomId, RoomPatch, Timestamp, UserId,
};

#[derive(Default)]
struct Store {
    rooms: HashMap<RoomId, Room>,
    messages: HashMap<RoomId, Vec<Message>>,
}

#[derive(Default)]
pub struct InMemoryMessageRepository {
    store: Mutex<Store>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn upsert_room(
        &self,
        room_id: &RoomId,
        patch: RoomPatch,
    ) -> Result<Room, RepositoryError> {
        let mut store = self.store.lock().await;
        let room = store.rooms.entry(room_id.clone()).or_insert_with(|| {
            let created_at = patch
                .last_activity
                .unwrap_or_else(|| Timestamp::new(get_timestamp()));
            tracing::debug!("Room {} created", room_id);
            Room::new(room_id.clone(), created_at)
        });
        room.apply(&patch);
        Ok(room.clone())
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.rooms.get(room_id).cloned())
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let message = Message::create(MessageId::generate(), message);
        let mut store = self.store.lock().await;
        store
            .messages
            .entry(message.room_id.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn query_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
        before: Option<Cursor>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let store = self.store.lock().await;
        let Some(messages) = store.messages.get(room_id) else {
            return Ok(Vec::new());
        };

        let mut page: Vec<Message> = messages
            .iter()
            .filter(|m| before.is_none_or(|cursor| cursor.admits(m.timestamp, m.id)))
            .cloned()
            .collect();
        page.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        page.truncate(limit);
        Ok(page)
    }

    async fn bulk_mark_delivered(
        &self,
        room_id: &RoomId,
        receiver_id: &UserId,
    ) -> Result<usize, RepositoryError> {
        let mut store = self.store.lock().await;
        let Some(messages) = store.messages.get_mut(room_id) else {
            return Ok(0);
        };

        let mut updated = 0;
        for message in messages
            .iter_mut()
            .filter(|m| &m.receiver_id == receiver_id && m.status == DeliveryStatus::Sent)
        {
            message.status = DeliveryStatus::Delivered;
            updated += 1;
        }
        Ok(updated)
    }

    async fn rooms_for_user(&self, user_id: &UserId) -> Result<Vec<Room>, RepositoryError> {
        let store = self.store.lock().await;
        let mut rooms: Vec<Room> = store
            .rooms
            .values()
            .filter(|room| room.id.contains(user_id))
            .cloned()
            .collect();
        rooms.sort_by(|a, b| {
            b.last_activity
                .cmp(&a.last_activity)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(rooms)
    }

    async fn count_undelivered(
        &self,
        room_id: &RoomId,
        receiver_id: &UserId,
    ) -> Result<usize, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .messages
            .get(room_id)
            .map(|messages| {
                messages
                    .iter()
                    .filter(|m| &m.receiver_id == receiver_id && m.status == DeliveryStatus::Sent)
                    .count()
            })
            .unwrap_or(0))
    }
}
