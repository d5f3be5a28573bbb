//! UseCase: ルームのメッセージ履歴取得
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - GetHistoryUseCase::execute() メソッド
//! - 認可（ルーム参加者のみ）、カーソルによるページング、
//!   閲覧者宛ての未配信メッセージの delivered への遷移
//!
//! ### なぜこのテストが必要か
//! - ページングを繰り返したときに重複・欠落がないことを保証
//! - 既読化の失敗が履歴の取得を妨げないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信後に受信者が取得すると delivered になる
//! - 異常系：参加者以外のアクセス、不正なルーム ID、不正なカーソル
//! - エッジケース：ページサイズちょうどの件数、既読化の失敗

use std::{collections::HashMap, sync::Arc};

use crate::domain::{
    Cursor, HydratedMessage, Message, MessageRepository, PublicProfile, RoomId, UserDirectory,
    UserId,
};

use super::error::GetHistoryError;

/// ページサイズの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySettings {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl HistorySettings {
    /// 要求されたページサイズを `1..=max_limit` に丸める
    pub fn clamp(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

/// 履歴の 1 ページ（古い順）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub messages: Vec<HydratedMessage>,
    /// ページが満杯だった場合に true（残り件数がちょうど 0 でも true になりうる）
    pub has_more: bool,
    /// ページ内で最も古いメッセージの位置。次のページの取得に使う
    pub next_cursor: Option<Cursor>,
}

/// 履歴取得のユースケース
pub struct GetHistoryUseCase {
    repository: Arc<dyn MessageRepository>,
    directory: Arc<dyn UserDirectory>,
    settings: HistorySettings,
}

impl GetHistoryUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        directory: Arc<dyn UserDirectory>,
        settings: HistorySettings,
    ) -> Self {
        Self {
            repository,
            directory,
            settings,
        }
    }

    /// 履歴を取得し、閲覧者宛ての未配信メッセージを delivered に更新
    ///
    /// 返すページは更新前の状態のスナップショット。更新の失敗はログに残すだけで、
    /// 呼び出し元には返さない。
    pub async fn execute(
        &self,
        viewer_id: &UserId,
        room_id: &str,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<HistoryPage, GetHistoryError> {
        // 1. 認可
        let room_id =
            RoomId::parse(room_id).map_err(|e| GetHistoryError::InvalidRoom(e.to_string()))?;
        if !room_id.contains(viewer_id) {
            tracing::warn!("'{}' tried to read {}", viewer_id, room_id);
            return Err(GetHistoryError::AccessDenied(viewer_id.to_string()));
        }

        let cursor = cursor
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.trim().parse::<Cursor>())
            .transpose()
            .map_err(|e| GetHistoryError::InvalidCursor(e.to_string()))?;
        let limit = self.settings.clamp(limit);

        // 2. 新しい順に取得して古い順に並べ替え
        let mut messages = self
            .repository
            .query_messages(&room_id, limit, cursor)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query history of {}: {}", room_id, e);
                GetHistoryError::Persistence(e.to_string())
            })?;
        let has_more = messages.len() == limit;
        messages.reverse();
        let next_cursor = messages.first().map(Message::cursor);

        let page = HistoryPage {
            messages: self.hydrate(messages).await,
            has_more,
            next_cursor,
        };

        // 3. 閲覧者宛ての未配信メッセージを delivered に（ベストエフォート）
        match self.repository.bulk_mark_delivered(&room_id, viewer_id).await {
            Ok(0) => {}
            Ok(updated) => {
                tracing::debug!("Marked {} message(s) in {} delivered to '{}'", updated, room_id, viewer_id)
            }
            Err(e) => tracing::warn!(
                "Failed to mark messages in {} delivered to '{}': {}",
                room_id,
                viewer_id,
                e
            ),
        }

        Ok(page)
    }

    /// 送信者のプロフィールを付与（ディレクトリが返せない場合は None）
    async fn hydrate(&self, messages: Vec<Message>) -> Vec<HydratedMessage> {
        let mut profiles: HashMap<UserId, Option<PublicProfile>> = HashMap::new();
        let mut hydrated = Vec::with_capacity(messages.len());

        for message in messages {
            if !profiles.contains_key(&message.sender_id) {
                let profile = self
                    .directory
                    .find_by_id(&message.sender_id)
                    .await
                    .inspect_err(|e| {
                        tracing::warn!("Failed to load profile of '{}': {}", message.sender_id, e)
                    })
                    .ok()
                    .flatten();
                profiles.insert(message.sender_id.clone(), profile);
            }
            let sender = profiles.get(&message.sender_id).cloned().flatten();
            hydrated.push(HydratedMessage { message, sender });
        }

        hydrated
    }
}
