//! Presence Registry trait 定義
//!
//! オンラインのユーザーと、そのユーザーのアクティブな接続を対応付けます。
//! 1 ユーザーにつき保持する接続は 1 つだけで、新しい接続は古い接続を置き換えます。
//! 永続化はされず、プロセス再起動後は全ユーザーがオフラインから始まります。
//!
//! 共有キャッシュなど分散実装に差し替えられるよう trait として定義しています。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, UserId};

/// Channel feeding one connection's outbound frames
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Handle to one live connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    channel: PusherChannel,
}

impl ConnectionHandle {
    pub fn new(channel: PusherChannel) -> Self {
        Self {
            id: ConnectionId::generate(),
            channel,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a frame for this connection. Fails once the connection is gone.
    pub fn send(&self, payload: String) -> Result<(), MessagePushError> {
        self.channel
            .send(payload)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }
}

#[async_trait]
pub trait PresenceRegistry: Send + Sync {
    /// 接続を登録。既存の接続があれば置き換え、置き換えられた接続を返す
    async fn set_online(
        &self,
        user_id: UserId,
        connection: ConnectionHandle,
    ) -> Option<ConnectionHandle>;

    /// ユーザーの現在の接続を取得
    async fn connection(&self, user_id: &UserId) -> Option<ConnectionHandle>;

    /// 登録中の接続が `connection_id` の場合のみ削除し、削除したかどうかを返す
    async fn set_offline(&self, user_id: &UserId, connection_id: ConnectionId) -> bool;

    /// オンラインの全ユーザー ID
    async fn online_user_ids(&self) -> Vec<UserId>;
}
