//! シードユーザーの読み込み
//!
//! JSON ファイル（`[{id, name, handle, avatarUrl?, bio?, token}]`）から
//! ユーザーディレクトリのプロフィールと、認証用のトークン表を作ります。

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Handle, Identity, PublicProfile, UserId, ValueObjectError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid seed user '{id}': {source}")]
    InvalidUser {
        id: String,
        source: ValueObjectError,
    },

    #[error("duplicate {field} in seed file: {value}")]
    Duplicate { field: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedUser {
    id: String,
    name: String,
    handle: String,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    token: String,
}

/// Users loaded from a seed file
#[derive(Debug, Default)]
pub struct SeedData {
    pub profiles: Vec<PublicProfile>,
    pub tokens: HashMap<String, Identity>,
}

impl SeedData {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        let users: Vec<SeedUser> = serde_json::from_str(raw)?;
        let mut data = SeedData::default();
        let mut seen_ids = HashSet::new();
        let mut seen_handles = HashSet::new();

        for user in users {
            let invalid = |source| SeedError::InvalidUser {
                id: user.id.clone(),
                source,
            };
            let id = UserId::new(user.id.clone()).map_err(invalid)?;
            let handle = Handle::new(user.handle.clone()).map_err(invalid)?;

            if !seen_ids.insert(id.clone()) {
                return Err(SeedError::Duplicate {
                    field: "id",
                    value: id.into_string(),
                });
            }
            if !seen_handles.insert(handle.as_str().to_ascii_lowercase()) {
                return Err(SeedError::Duplicate {
                    field: "handle",
                    value: handle.into_string(),
                });
            }
            if data.tokens.contains_key(&user.token) {
                return Err(SeedError::Duplicate {
                    field: "token",
                    value: format!("token of '{}'", id),
                });
            }

            data.tokens.insert(
                user.token,
                Identity {
                    user_id: id.clone(),
                    handle: handle.clone(),
                },
            );
            data.profiles.push(PublicProfile {
                id,
                name: user.name,
                handle,
                avatar_url: user.avatar_url,
                bio: user.bio,
            });
        }

        Ok(data)
    }
}
