//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 通知（ドメインモデル）を ServerEvent DTO の JSON に変換
//! - Presence Registry から宛先ユーザーの接続を引き、フレームを送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成と `UnboundedSender` の作成は UI 層で行われ、
//! 接続ハンドルとして Presence Registry に登録されます。
//! この実装は登録済みの接続を使ってメッセージを送るだけです。

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{MessagePushError, MessagePusher, Notification, PresenceRegistry, UserId},
    infrastructure::dto::websocket::ServerEvent,
};

pub struct WebSocketMessagePusher {
    presence: Arc<dyn PresenceRegistry>,
}

impl WebSocketMessagePusher {
    pub fn new(presence: Arc<dyn PresenceRegistry>) -> Self {
        Self { presence }
    }

    fn encode(notification: &Notification) -> Result<String, MessagePushError> {
        let event = ServerEvent::from(notification.clone());
        serde_json::to_string(&event).map_err(|e| MessagePushError::Encode(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn push_to(
        &self,
        user_id: &UserId,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let Some(connection) = self.presence.connection(user_id).await else {
            return Err(MessagePushError::ClientNotFound(user_id.to_string()));
        };

        connection.send(Self::encode(notification)?)?;
        tracing::debug!("Pushed notification to '{}'", user_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<UserId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let payload = Self::encode(notification)?;

        for target in targets {
            let Some(connection) = self.presence.connection(&target).await else {
                tracing::warn!("Client '{}' not found during broadcast, skipping", target);
                continue;
            };
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = connection.send(payload.clone()) {
                tracing::warn!("Failed to push notification to '{}': {}", target, e);
            } else {
                tracing::debug!("Broadcasted notification to '{}'", target);
            }
        }

        Ok(())
    }
}
