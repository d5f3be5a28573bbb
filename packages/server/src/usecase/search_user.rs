//! UseCase: ハンドルによるユーザー検索
//!
//! ディレクトリの障害は検索機能だけを劣化させ（「見つからない」として扱う）、
//! 接続自体は維持します。

use std::sync::Arc;

use crate::domain::{Handle, PublicProfile, UserDirectory, UserId};

/// ユーザー検索のユースケース
pub struct SearchUserUseCase {
    directory: Arc<dyn UserDirectory>,
}

impl SearchUserUseCase {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// `handle` のユーザーを検索。検索者自身は結果から除外する
    pub async fn execute(&self, searcher: &UserId, handle: &str) -> Option<PublicProfile> {
        let handle = match Handle::new(handle.trim()) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::debug!("Search by '{}' with invalid handle: {}", searcher, e);
                return None;
            }
        };

        match self.directory.find_by_handle(&handle).await {
            Ok(Some(profile)) if &profile.id != searcher => Some(profile),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("User directory lookup for '{}' failed: {}", handle, e);
                None
            }
        }
    }
}
