//! InMemory Presence Registry 実装
//!
//! HashMap でユーザー ID と接続ハンドルを対応付けます。
//! 単一プロセス内でのみ有効で、再起動すると全ユーザーがオフラインになります。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionHandle, ConnectionId, PresenceRegistry, UserId};

#[derive(Default)]
pub struct InMemoryPresenceRegistry {
    connections: Mutex<HashMap<UserId, ConnectionHandle>>,
}

impl InMemoryPresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceRegistry for InMemoryPresenceRegistry {
    async fn set_online(
        &self,
        user_id: UserId,
        connection: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        let mut connections = self.connections.lock().await;
        connections.insert(user_id, connection)
    }

    async fn connection(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        let connections = self.connections.lock().await;
        connections.get(user_id).cloned()
    }

    async fn set_offline(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        match connections.get(user_id) {
            Some(current) if current.id() == connection_id => {
                connections.remove(user_id);
                true
            }
            Some(_) => {
                tracing::debug!(
                    "Stale connection {} of '{}' closed; newer connection kept",
                    connection_id,
                    user_id
                );
                false
            }
            None => false,
        }
    }

    async fn online_user_ids(&self) -> Vec<UserId> {
        let connections = self.connections.lock().await;
        let mut ids: Vec<UserId> = connections.keys().cloned().collect();
        ids.sort();
        ids
    }
}
