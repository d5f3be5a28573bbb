//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    Cursor, DirectoryError, Handle, Message, NewMessage, PublicProfile, RepositoryError, Room,
    RoomId, RoomPatch, UserId,
};

/// Message Store Gateway
///
/// メッセージとルームの要約状態を永続化するストア。
/// 1 回の書き込み（メッセージ作成、ルーム更新）単位のアトミック性のみを要求し、
/// 「メッセージ作成」と「ルーム要約更新」をまたぐトランザクションは要求しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// ルームを作成、または既存ルームに `patch` で指定されたフィールドだけを反映
    async fn upsert_room(&self, room_id: &RoomId, patch: RoomPatch)
    -> Result<Room, RepositoryError>;

    /// ルームを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError>;

    /// メッセージを `sent` 状態で永続化
    async fn create_message(&self, message: NewMessage) -> Result<Message, RepositoryError>;

    /// `(timestamp, id)` の降順で最大 `limit` 件を取得（`before` より厳密に古いもののみ）
    async fn query_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
        before: Option<Cursor>,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// ルーム内で `receiver_id` 宛ての `sent` メッセージを全て `delivered` に更新
    ///
    /// 更新した件数を返す
    async fn bulk_mark_delivered(
        &self,
        room_id: &RoomId,
        receiver_id: &UserId,
    ) -> Result<usize, RepositoryError>;

    /// ユーザーが参加しているルームを最終アクティビティの降順で取得
    async fn rooms_for_user(&self, user_id: &UserId) -> Result<Vec<Room>, RepositoryError>;

    /// ルーム内で `receiver_id` 宛ての未配信メッセージ数
    async fn count_undelivered(
        &self,
        room_id: &RoomId,
        receiver_id: &UserId,
    ) -> Result<usize, RepositoryError>;
}

/// User Directory Gateway（読み取り専用）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<PublicProfile>, DirectoryError>;

    async fn find_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<PublicProfile>, DirectoryError>;
}
