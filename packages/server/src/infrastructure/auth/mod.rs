//! Authenticator の実装
//!
//! 起動時にシードされた「トークン → ID」の対応表で認証する静的な実装です。
//! 外部の認証基盤に置き換える場合はこの trait 実装を差し替えます。

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{AuthError, Authenticator, Identity};

#[derive(Debug, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenAuthenticator {
    pub fn new(tokens: HashMap<String, Identity>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, credential: &str) -> Result<Identity, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        self.tokens
            .get(credential)
            .cloned()
            .ok_or(AuthError::InvalidCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Handle, UserId};

    fn authenticator() -> StaticTokenAuthenticator {
        let identity = Identity {
            user_id: UserId::new("u1").unwrap(),
            handle: Handle::new("alice").unwrap(),
        };
        StaticTokenAuthenticator::new(HashMap::from([("token-alice".to_string(), identity)]))
    }

    #[tokio::test]
    async fn test_authenticate_known_token() {
        // テスト項目: 登録済みトークンで ID が得られる
        let result = authenticator().authenticate("token-alice").await;

        assert_eq!(result.map(|i| i.user_id.into_string()), Ok("u1".to_string()));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_unknown_or_empty_token() {
        // テスト項目: 未知のトークンと空のトークンは拒否される
        let auth = authenticator();

        assert_eq!(
            auth.authenticate("nope").await,
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(auth.authenticate("  ").await, Err(AuthError::MissingCredential));
    }
}
