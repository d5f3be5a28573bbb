//! InMemory User Directory 実装
//!
//! 起動時にシードされたプロフィールを ID とハンドルの両方で引けるように保持します。
//! 読み取り専用のため、ロックは使いません。

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{DirectoryError, Handle, PublicProfile, UserDirectory, UserId};

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    by_id: HashMap<UserId, PublicProfile>,
    by_handle: HashMap<String, UserId>,
}

impl InMemoryUserDirectory {
    pub fn new(profiles: Vec<PublicProfile>) -> Self {
        let mut by_id = HashMap::with_capacity(profiles.len());
        let mut by_handle = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            // ハンドルは大文字小文字を区別しない
            by_handle.insert(profile.handle.as_str().to_ascii_lowercase(), profile.id.clone());
            by_id.insert(profile.id.clone(), profile);
        }
        Self { by_id, by_handle }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<PublicProfile>, DirectoryError> {
        Ok(self.by_id.get(id).cloned())
    }

    async fn find_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<PublicProfile>, DirectoryError> {
        Ok(self
            .by_handle
            .get(&handle.as_str().to_ascii_lowercase())
            .and_then(|id| self.by_id.get(id))
            .cloned())
    }
}
