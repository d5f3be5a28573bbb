//! 外部コラボレータ呼び出しのタイムアウト
//!
//! メッセージストア、ユーザーディレクトリ、オブジェクトストレージの各 trait を
//! ラップし、全ての呼び出しに同じ上限時間を適用するデコレータです。
//! 上限を超えた呼び出しは各ゲートウェイの `Timeout` エラーになります。

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::domain::{
    Cursor, DirectoryError, Handle, Message, MessageRepository, NewMessage, ObjectStorage,
    PublicProfile, RepositoryError, Room, RoomId, RoomPatch, StorageError, StoredObject,
    UserDirectory, UserId,
};

async fn bounded<T, E>(
    limit: Duration,
    call: impl Future<Output = Result<T, E>>,
    on_timeout: fn(Duration) -> E,
) -> Result<T, E> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Gateway call timed out after {:?}", limit);
            Err(on_timeout(limit))
        }
    }
}

pub struct TimeoutMessageRepository {
    inner: Arc<dyn MessageRepository>,
    limit: Duration,
}

impl TimeoutMessageRepository {
    pub fn new(inner: Arc<dyn MessageRepository>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl MessageRepository for TimeoutMessageRepository {
    async fn upsert_room(
        &self,
        room_id: &RoomId,
        patch: RoomPatch,
    ) -> Result<Room, RepositoryError> {
        bounded(
            self.limit,
            self.inner.upsert_room(room_id, patch),
            RepositoryError::Timeout,
        )
        .await
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        bounded(self.limit, self.inner.get_room(room_id), RepositoryError::Timeout).await
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        bounded(
            self.limit,
            self.inner.create_message(message),
            RepositoryError::Timeout,
        )
        .await
    }

    async fn query_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
        before: Option<Cursor>,
    ) -> Result<Vec<Message>, RepositoryError> {
        bounded(
            self.limit,
            self.inner.query_messages(room_id, limit, before),
            RepositoryError::Timeout,
        )
        .await
    }

    async fn bulk_mark_delivered(
        &self,
        room_id: &RoomId,
        receiver_id: &UserId,
    ) -> Result<usize, RepositoryError> {
        bounded(
            self.limit,
            self.inner.bulk_mark_delivered(room_id, receiver_id),
            RepositoryError::Timeout,
        )
        .await
    }

    async fn rooms_for_user(&self, user_id: &UserId) -> Result<Vec<Room>, RepositoryError> {
        bounded(
            self.limit,
            self.inner.rooms_for_user(user_id),
            RepositoryError::Timeout,
        )
        .await
    }

    async fn count_undelivered(
        &self,
        room_id: &RoomId,
        receiver_id: &UserId,
    ) -> Result<usize, RepositoryError> {
        bounded(
            self.limit,
            self.inner.count_undelivered(room_id, receiver_id),
            RepositoryError::Timeout,
        )
        .await
    }
}

pub struct TimeoutUserDirectory {
    inner: Arc<dyn UserDirectory>,
    limit: Duration,
}

impl TimeoutUserDirectory {
    pub fn new(inner: Arc<dyn UserDirectory>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl UserDirectory for TimeoutUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<PublicProfile>, DirectoryError> {
        bounded(self.limit, self.inner.find_by_id(id), DirectoryError::Timeout).await
    }

    async fn find_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<PublicProfile>, DirectoryError> {
        bounded(
            self.limit,
            self.inner.find_by_handle(handle),
            DirectoryError::Timeout,
        )
        .await
    }
}

pub struct TimeoutObjectStorage {
    inner: Arc<dyn ObjectStorage>,
    limit: Duration,
}

impl TimeoutObjectStorage {
    pub fn new(inner: Arc<dyn ObjectStorage>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl ObjectStorage for TimeoutObjectStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        bounded(
            self.limit,
            self.inner.upload(bytes, file_name, content_type),
            StorageError::Timeout,
        )
        .await
    }
}
