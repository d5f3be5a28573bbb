//! UseCase: 添付ファイルのアップロード
//!
//! 送信前に呼ばれ、オブジェクトストレージが返した URL・サイズ・カテゴリを
//! メッセージの添付ファイル記述子として返します。

use std::sync::Arc;

use crate::domain::{Attachment, ObjectStorage};

use super::error::UploadError;

/// アップロードを受け付ける Content-Type
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "video/mp4",
    "application/pdf",
    "application/zip",
];

/// 既定のサイズ上限（10 MiB）
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct UploadAttachmentUseCase {
    storage: Arc<dyn ObjectStorage>,
    max_bytes: usize,
}

impl UploadAttachmentUseCase {
    pub fn new(storage: Arc<dyn ObjectStorage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn execute(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Attachment, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::EmptyFile);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                max: self.max_bytes,
            });
        }

        let file_name = base_name(file_name).ok_or(UploadError::MissingFileName)?;
        let content_type = normalize_content_type(content_type);
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(UploadError::UnsupportedType(content_type));
        }

        let stored = self
            .storage
            .upload(bytes, file_name, &content_type)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store '{}': {}", file_name, e);
                UploadError::Storage(e.to_string())
            })?;
        tracing::info!("Uploaded '{}' ({} bytes) to {}", file_name, stored.size_bytes, stored.url);

        Ok(Attachment {
            url: stored.url,
            category: stored.category,
            file_name: file_name.to_string(),
            size_bytes: stored.size_bytes,
        })
    }
}

/// `image/PNG; charset=binary` → `image/png`
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Strip any directory part the client sent along with the file name.
fn base_name(file_name: &str) -> Option<&str> {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MediaCategory, MockObjectStorage, StorageError},
        infrastructure::storage::InMemoryObjectStorage,
    };

    fn usecase(max_bytes: usize) -> UploadAttachmentUseCase {
        UploadAttachmentUseCase::new(
            Arc::new(InMemoryObjectStorage::new("http://localhost:8080")),
            max_bytes,
        )
    }

    #[tokio::test]
    async fn test_upload_returns_attachment() {
        // テスト項目: 許可された形式のファイルをアップロードすると添付ファイル記述子が返る
        // when (操作):
        let attachment = usecase(1024)
            .execute("photos/cat.png", "image/PNG", vec![0; 16])
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(attachment.category, MediaCategory::Image);
        assert_eq!(attachment.file_name, "cat.png");
        assert_eq!(attachment.size_bytes, 16);
        assert!(attachment.url.starts_with("http://localhost:8080/media/"));
    }

    #[tokio::test]
    async fn test_upload_rejects_invalid_input() {
        // テスト項目: 空のファイル、サイズ超過、未許可の形式、ファイル名なしは拒否される
        let usecase = usecase(8);

        assert_eq!(
            usecase.execute("a.png", "image/png", vec![]).await,
            Err(UploadError::EmptyFile)
        );
        assert_eq!(
            usecase.execute("a.png", "image/png", vec![0; 9]).await,
            Err(UploadError::TooLarge { max: 8 })
        );
        assert_eq!(
            usecase.execute("a.exe", "application/x-msdownload", vec![0; 4]).await,
            Err(UploadError::UnsupportedType("application/x-msdownload".to_string()))
        );
        assert_eq!(
            usecase.execute("dir/", "image/png", vec![0; 4]).await,
            Err(UploadError::MissingFileName)
        );
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        // テスト項目: ストレージの障害は Storage エラーになる
        let mut storage = MockObjectStorage::new();
        storage
            .expect_upload()
            .returning(|_, _, _| Err(StorageError::Unavailable("bucket gone".to_string())));
        let usecase = UploadAttachmentUseCase::new(Arc::new(storage), 1024);

        let result = usecase.execute("a.pdf", "application/pdf", vec![1]).await;

        assert!(matches!(result, Err(UploadError::Storage(_))));
    }
}
