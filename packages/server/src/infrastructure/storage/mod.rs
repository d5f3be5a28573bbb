//! ObjectStorage の実装
//!
//! - `InMemoryObjectStorage`: アップロードされたバイト列をプロセス内に保持し、
//!   `{public_base_url}/media/{object_id}` の URL を払い出す実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{MediaCategory, ObjectStorage, StorageError, StoredObject};

/// Path segment under which stored objects are served
pub const MEDIA_PATH: &str = "media";

/// One stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

pub struct InMemoryObjectStorage {
    public_base_url: String,
    objects: RwLock<HashMap<Uuid, StoredBlob>>,
}

impl InMemoryObjectStorage {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Look up an object by the id embedded in its URL.
    pub async fn get(&self, object_id: &str) -> Option<StoredBlob> {
        let id = Uuid::parse_str(object_id).ok()?;
        self.objects.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let id = Uuid::new_v4();
        let size_bytes = bytes.len() as u64;
        let stored = StoredObject {
            url: format!("{}/{MEDIA_PATH}/{id}", self.public_base_url),
            category: MediaCategory::from_mime(content_type),
            size_bytes,
        };

        self.objects.write().await.insert(
            id,
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
                file_name: file_name.to_string(),
            },
        );
        tracing::debug!("Stored object {} ({} bytes) as '{}'", id, size_bytes, file_name);

        Ok(stored)
    }
}
