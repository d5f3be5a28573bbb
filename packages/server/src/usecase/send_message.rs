//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 入力検証、ルームの導出と upsert、メッセージの永続化、ルーム要約の更新、
//!   受信者へのプッシュと送信者へのエコー
//!
//! ### なぜこのテストが必要か
//! - 永続化に失敗した場合に部分的な配信が起きないことを保証
//! - 自分宛ての送信ではルームもメッセージも作られないことを保証
//! - 受信者がオフラインでも送信が成功し、メッセージが保存されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：オンラインの相手への送信、オフラインの相手への送信、添付ファイル付き送信
//! - 異常系：自分宛て、本文も添付もない、種別と添付のカテゴリの不一致、永続化の失敗
//! - エッジケース：ルーム要約の更新だけが失敗した場合（配信は続行）

use std::{collections::HashSet, sync::Arc};

use tegami_shared::time::Clock;

use crate::domain::{
    Attachment, HydratedMessage, Message, MessageContent, MessageKind, MessagePushError,
    MessagePusher, MessageRepository, NewMessage, Notification, PublicProfile, RoomId, RoomPatch,
    Timestamp, UserDirectory, UserId,
};

use super::error::SendMessageError;

/// 送信リクエスト（クライアントから受け取った未検証の値）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub receiver_id: String,
    pub content: Option<String>,
    pub kind: Option<String>,
    pub attachment: Option<Attachment>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    directory: Arc<dyn UserDirectory>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        directory: Arc<dyn UserDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            directory,
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 永続化されたメッセージ（ID とサーバー時刻を含む）
    /// * `Err(SendMessageError)` - 検証または永続化の失敗。この場合は誰にも配信されない
    pub async fn execute(
        &self,
        sender_id: &UserId,
        request: SendMessageRequest,
    ) -> Result<Message, SendMessageError> {
        // 1. 入力検証とルームの導出
        let new_message = self.validate(sender_id, request)?;
        let room_id = new_message.room_id.clone();

        // 2. ルームを upsert（既存ルームの要約はここでは変更しない）
        self.repository
            .upsert_room(&room_id, RoomPatch::touch(new_message.timestamp))
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert room {}: {}", room_id, e);
                SendMessageError::Persistence(e.to_string())
            })?;

        // 3. メッセージを sent 状態で永続化
        let message = self
            .repository
            .create_message(new_message)
            .await
            .map_err(|e| {
                tracing::error!("Failed to persist message in {}: {}", room_id, e);
                SendMessageError::Persistence(e.to_string())
            })?;
        tracing::info!(
            "Message {} persisted in {} ({} -> {})",
            message.id,
            room_id,
            message.sender_id,
            message.receiver_id
        );

        // 4. ルームの要約を更新（失敗しても配信は続行し、要約は次の送信で追いつく）
        if let Err(e) = self
            .repository
            .upsert_room(&room_id, RoomPatch::last_message(&message))
            .await
        {
            tracing::warn!("Failed to update summary of room {}: {}", room_id, e);
        }

        // 5. 受信者（オンラインの場合）と送信者自身にプッシュ
        self.deliver(&message).await;

        Ok(message)
    }

    fn validate(
        &self,
        sender_id: &UserId,
        request: SendMessageRequest,
    ) -> Result<NewMessage, SendMessageError> {
        let receiver_id = UserId::new(request.receiver_id.trim())
            .map_err(|e| SendMessageError::InvalidRecipient(e.to_string()))?;
        if &receiver_id == sender_id {
            return Err(SendMessageError::InvalidRecipient(
                "cannot send a message to yourself".to_string(),
            ));
        }

        let kind = match (request.kind.as_deref(), &request.attachment) {
            (Some(kind), _) => kind
                .parse::<MessageKind>()
                .map_err(|e| SendMessageError::InvalidContent(e.to_string()))?,
            (None, Some(attachment)) => attachment.category.into(),
            (None, None) => MessageKind::default(),
        };

        let content = MessageContent::new(request.content.unwrap_or_default())
            .map_err(|e| SendMessageError::InvalidContent(e.to_string()))?;
        if content.is_empty() && request.attachment.is_none() {
            return Err(SendMessageError::InvalidContent(
                "message needs content or an attachment".to_string(),
            ));
        }
        match &request.attachment {
            None if kind != MessageKind::Text => {
                return Err(SendMessageError::InvalidContent(format!(
                    "{kind} message needs an attachment"
                )));
            }
            Some(attachment) if MessageKind::from(attachment.category) != kind => {
                return Err(SendMessageError::InvalidContent(format!(
                    "{kind} message cannot carry a {} attachment",
                    attachment.category.as_str()
                )));
            }
            _ => {}
        }

        let room_id = RoomId::derive(sender_id, &receiver_id)
            .map_err(|e| SendMessageError::InvalidRecipient(e.to_string()))?;

        Ok(NewMessage {
            room_id,
            sender_id: sender_id.clone(),
            receiver_id,
            content,
            kind,
            attachment: request.attachment,
            timestamp: Timestamp::new(self.clock.now_millis()),
        })
    }

    async fn deliver(&self, message: &Message) {
        let notification = Notification::MessageReceived(HydratedMessage {
            message: message.clone(),
            sender: self.sender_profile(&message.sender_id).await,
        });

        let recipients: HashSet<&UserId> = [&message.receiver_id, &message.sender_id].into();
        for recipient in recipients {
            match self.message_pusher.push_to(recipient, &notification).await {
                Ok(()) => {}
                Err(MessagePushError::ClientNotFound(_)) => {
                    tracing::debug!(
                        "'{}' is offline, message {} waits for the next history fetch",
                        recipient,
                        message.id
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to push message {} to '{}': {}", message.id, recipient, e);
                }
            }
        }
    }

    async fn sender_profile(&self, sender_id: &UserId) -> Option<PublicProfile> {
        self.directory
            .find_by_id(sender_id)
            .await
            .inspect_err(|e| tracing::warn!("Failed to load profile of '{}': {}", sender_id, e))
            .ok()
            .flatten()
    }
}
