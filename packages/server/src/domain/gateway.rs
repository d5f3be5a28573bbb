//! External collaborators consumed by the core: authentication and object storage.

use async_trait::async_trait;

use super::{AuthError, Identity, MediaCategory, StorageError};

/// Auth collaborator: exchanges a bearer credential for an identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credential: &str) -> Result<Identity, AuthError>;
}

/// Result of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub category: MediaCategory,
    pub size_bytes: u64,
}

/// Object storage collaborator used before non-text sends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;
}
