//! UseCase: ユーザー切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUserUseCase::execute() メソッド
//! - Presence Registry からの登録解除と userOffline 通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：切断すると残りのユーザーに userOffline が届く
//! - エッジケース：置き換え済みの古い接続の切断（オフライン扱いにしない）

use std::sync::Arc;

use crate::domain::{ConnectionId, Identity, MessagePusher, Notification, PresenceRegistry};

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    presence: Arc<dyn PresenceRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUserUseCase {
    pub fn new(presence: Arc<dyn PresenceRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            presence,
            message_pusher,
        }
    }

    /// 接続の登録を解除し、解除できた場合のみ userOffline を通知
    ///
    /// 登録中の接続が `connection_id` と異なる（新しい接続に置き換えられている）
    /// 場合は何もせず `false` を返す。
    pub async fn execute(&self, identity: &Identity, connection_id: ConnectionId) -> bool {
        if !self
            .presence
            .set_offline(&identity.user_id, connection_id)
            .await
        {
            tracing::debug!(
                "Connection {} of '{}' was already replaced, user stays online",
                connection_id,
                identity.user_id
            );
            return false;
        }

        let targets = self.presence.online_user_ids().await;
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &Notification::UserOffline(identity.clone()))
            .await
        {
            tracing::warn!("Failed to broadcast userOffline for '{}': {}", identity.user_id, e);
        }

        true
    }
}
