//! MessagePusher trait 定義
//!
//! ユーザーのライブ接続へ通知を送るためのインターフェース。
//! 送信は fire-and-forget で、受信側の確認応答は扱いません。

use async_trait::async_trait;

use super::{HydratedMessage, Identity, MessagePushError, UserId};

/// Server-initiated notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    UserOnline(Identity),
    UserOffline(Identity),
    MessageReceived(HydratedMessage),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 特定のユーザーの接続に通知を送信
    async fn push_to(
        &self,
        user_id: &UserId,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;

    /// 複数ユーザーに通知を送信（一部の送信失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<UserId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;
}
