//! UseCase: ユーザー接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectUserUseCase::execute() メソッド
//! - Presence Registry への登録と、他のオンラインユーザーへの userOnline 通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続が登録され、自分以外に通知される
//! - エッジケース：同じユーザーの再接続（古い接続を置き換える）

use std::sync::Arc;

use crate::domain::{
    ConnectionHandle, ConnectionId, Identity, MessagePusher, Notification, PresenceRegistry,
    PusherChannel,
};

/// ユーザー接続のユースケース
pub struct ConnectUserUseCase {
    presence: Arc<dyn PresenceRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectUserUseCase {
    pub fn new(presence: Arc<dyn PresenceRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            presence,
            message_pusher,
        }
    }

    /// 接続を登録し、他の全オンラインユーザーに userOnline を通知
    ///
    /// 登録した接続の ID を返す。切断時はこの ID で登録解除する。
    pub async fn execute(&self, identity: &Identity, channel: PusherChannel) -> ConnectionId {
        let connection = ConnectionHandle::new(channel);
        let connection_id = connection.id();

        if let Some(replaced) = self
            .presence
            .set_online(identity.user_id.clone(), connection)
            .await
        {
            tracing::info!(
                "User '{}' reconnected, replacing connection {}",
                identity.user_id,
                replaced.id()
            );
        }

        let targets = self
            .presence
            .online_user_ids()
            .await
            .into_iter()
            .filter(|id| id != &identity.user_id)
            .collect();

        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &Notification::UserOnline(identity.clone()))
            .await
        {
            tracing::warn!("Failed to broadcast userOnline for '{}': {}", identity.user_id, e);
        }

        connection_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Handle, MockMessagePusher, UserId},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, presence::InMemoryPresenceRegistry,
        },
    };
    use tokio::sync::mpsc;

    fn identity(id: &str, handle: &str) -> Identity {
        Identity {
            user_id: UserId::new(id).unwrap(),
            handle: Handle::new(handle).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_connect_notifies_other_users_only() {
        // テスト項目: 接続すると自分以外のオンラインユーザーに userOnline が届く
        // given (前提条件):
        let registry = Arc::new(InMemoryPresenceRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));
        let usecase = ConnectUserUseCase::new(registry.clone(), pusher);

        let (tx_bob, mut rx_bob) = mpsc::unbounded_channel();
        usecase.execute(&identity("u2", "bob"), tx_bob).await;

        // when (操作):
        let (tx_alice, mut rx_alice) = mpsc::unbounded_channel();
        let connection_id = usecase.execute(&identity("u1", "alice"), tx_alice).await;

        // then (期待する結果):
        let frame: serde_json::Value = serde_json::from_str(&rx_bob.recv().await.unwrap()).unwrap();
        assert_eq!(frame["type"], "userOnline");
        assert_eq!(frame["userId"], "u1");
        assert!(rx_alice.try_recv().is_err());

        let registered = registry.connection(&UserId::new("u1").unwrap()).await;
        assert_eq!(registered.map(|c| c.id()), Some(connection_id));
    }

    #[tokio::test]
    async fn test_reconnect_replaces_previous_connection() {
        // テスト項目: 同じユーザーが再接続すると新しい接続が有効になる（last connection wins）
        // given (前提条件):
        let registry = Arc::new(InMemoryPresenceRegistry::new());
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().times(2).returning(|_, _| Ok(()));
        let usecase = ConnectUserUseCase::new(registry.clone(), Arc::new(pusher));
        let alice = identity("u1", "alice");

        let (tx1, _rx1) = mpsc::unbounded_channel();
        let first = usecase.execute(&alice, tx1).await;

        // when (操作):
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let second = usecase.execute(&alice, tx2).await;

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(registry.online_user_ids().await.len(), 1);
        assert_eq!(
            registry.connection(&alice.user_id).await.map(|c| c.id()),
            Some(second)
        );
    }
}
