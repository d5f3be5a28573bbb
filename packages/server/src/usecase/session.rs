//! 接続セッションの状態機械
//!
//! 1 本のリアルタイム接続のライフサイクルを、トランスポートから独立した
//! 有限状態機械として表します。
//!
//! ```text
//! Connecting --authenticate--> Authenticated --activate--> Active --close--> Closed
//!     |                                                                        ^
//!     +----------------------- 認証失敗 ----------------------------------------+
//! ```
//!
//! - 認証に失敗した接続は Active に到達せず、Presence Registry も変更しない
//! - Active に入ると Presence Registry に登録し、他の全ユーザーに userOnline を通知する
//! - Active からの close では、自分の接続がまだ登録されている場合のみ登録解除と
//!   userOffline 通知を行う
//! - イベント（検索、送信、ルーム参加）は Active のときだけ受け付ける

use std::{collections::HashSet, sync::Arc};

use crate::domain::{
    Authenticator, ConnectionId, Identity, Message, PublicProfile, PusherChannel, RoomId,
};

use super::{
    ConnectUserUseCase, DisconnectUserUseCase, SearchUserUseCase, SendMessageRequest,
    SendMessageUseCase, error::SessionError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authenticated,
    Active,
    Closed,
}

/// Active なセッションが受け付けるイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SearchUser { handle: String },
    SendMessage(SendMessageRequest),
    JoinRoom { room_id: String },
}

/// イベントの処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    UserFound(PublicProfile),
    UserNotFound,
    /// 送信済み。送信者へのエコーは配信パイプラインがプッシュ済み
    MessageSent(Message),
    RoomJoined(RoomId),
}

/// セッションが依存する UseCase 群（全接続で共有）
pub struct SessionContext {
    pub authenticator: Arc<dyn Authenticator>,
    pub connect_user: Arc<ConnectUserUseCase>,
    pub disconnect_user: Arc<DisconnectUserUseCase>,
    pub search_user: Arc<SearchUserUseCase>,
    pub send_message: Arc<SendMessageUseCase>,
}

pub struct ConnectionSession {
    context: Arc<SessionContext>,
    state: SessionState,
    identity: Option<Identity>,
    connection_id: Option<ConnectionId>,
    joined_rooms: HashSet<RoomId>,
}

impl ConnectionSession {
    pub fn new(context: Arc<SessionContext>) -> Self {
        Self {
            context,
            state: SessionState::Connecting,
            identity: None,
            connection_id: None,
            joined_rooms: HashSet::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection_id
    }

    /// `JoinRoom` で参加したルーム（この接続内だけの情報）
    pub fn joined_rooms(&self) -> &HashSet<RoomId> {
        &self.joined_rooms
    }

    /// Connecting → Authenticated
    ///
    /// 失敗した場合は Closed に遷移する。
    pub async fn authenticate(&mut self, credential: Option<&str>) -> Result<Identity, SessionError> {
        self.expect_state(SessionState::Connecting)?;

        let result = match credential {
            Some(credential) => self.context.authenticator.authenticate(credential).await,
            None => Err(crate::domain::AuthError::MissingCredential),
        };

        match result {
            Ok(identity) => {
                tracing::info!("Session authenticated as '{}'", identity.user_id);
                self.state = SessionState::Authenticated;
                self.identity = Some(identity.clone());
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!("Session authentication failed: {}", e);
                self.state = SessionState::Closed;
                Err(SessionError::Authentication(e))
            }
        }
    }

    /// Authenticated → Active
    ///
    /// `channel` は接続への送信キュー。Presence Registry に登録される。
    pub async fn activate(&mut self, channel: PusherChannel) -> Result<ConnectionId, SessionError> {
        self.expect_state(SessionState::Authenticated)?;
        let identity = self.identity.as_ref().ok_or(SessionError::InvalidState {
            expected: SessionState::Authenticated,
            actual: self.state,
        })?;

        let connection_id = self.context.connect_user.execute(identity, channel).await;
        tracing::info!("'{}' is online (connection {})", identity.user_id, connection_id);

        self.connection_id = Some(connection_id);
        self.state = SessionState::Active;
        Ok(connection_id)
    }

    /// Active なセッションでイベントを処理
    pub async fn handle(&mut self, command: SessionCommand) -> Result<SessionReply, SessionError> {
        self.expect_state(SessionState::Active)?;
        let identity = self.identity.clone().ok_or(SessionError::InvalidState {
            expected: SessionState::Active,
            actual: self.state,
        })?;

        match command {
            SessionCommand::SearchUser { handle } => {
                Ok(match self.context.search_user.execute(&identity.user_id, &handle).await {
                    Some(profile) => SessionReply::UserFound(profile),
                    None => SessionReply::UserNotFound,
                })
            }
            SessionCommand::SendMessage(request) => {
                let message = self
                    .context
                    .send_message
                    .execute(&identity.user_id, request)
                    .await?;
                Ok(SessionReply::MessageSent(message))
            }
            SessionCommand::JoinRoom { room_id } => {
                let room_id = RoomId::parse(&room_id)
                    .map_err(|e| SessionError::InvalidRoom(e.to_string()))?;
                if !room_id.contains(&identity.user_id) {
                    return Err(SessionError::AccessDenied(identity.user_id.into_string()));
                }
                tracing::debug!("'{}' joined {}", identity.user_id, room_id);
                self.joined_rooms.insert(room_id.clone());
                Ok(SessionReply::RoomJoined(room_id))
            }
        }
    }

    /// 任意の状態 → Closed
    ///
    /// Active 以外からの close は Presence Registry を変更しない。何度呼んでもよい。
    pub async fn close(&mut self) {
        let previous = std::mem::replace(&mut self.state, SessionState::Closed);
        if previous != SessionState::Active {
            return;
        }

        if let (Some(identity), Some(connection_id)) = (&self.identity, self.connection_id) {
            if self
                .context
                .disconnect_user
                .execute(identity, connection_id)
                .await
            {
                tracing::info!("'{}' is offline", identity.user_id);
            }
        }
        self.joined_rooms.clear();
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{AuthError, Handle, MockAuthenticator, PresenceRegistry, UserId},
        infrastructure::{
            auth::StaticTokenAuthenticator,
            message_pusher::WebSocketMessagePusher,
            presence::InMemoryPresenceRegistry,
            repository::{InMemoryMessageRepository, InMemoryUserDirectory},
        },
        usecase::SendMessageError,
    };
    use std::collections::HashMap;
    use tegami_shared::time::SteppingClock;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 状態遷移 Connecting → Authenticated → Active → Closed
    // - 認証失敗時に Active へ到達せず、Presence Registry が変更されないこと
    // - Active でのイベント処理（検索、送信、ルーム参加）
    // - 古い接続の close で新しい接続が登録解除されないこと
    // ========================================

    fn identity(id: &str, handle: &str) -> Identity {
        Identity {
            user_id: UserId::new(id).unwrap(),
            handle: Handle::new(handle).unwrap(),
        }
    }

    fn profile(id: &str, handle: &str) -> PublicProfile {
        PublicProfile {
            id: UserId::new(id).unwrap(),
            name: handle.to_string(),
            handle: Handle::new(handle).unwrap(),
            avatar_url: None,
            bio: None,
        }
    }

    struct Fixture {
        context: Arc<SessionContext>,
        registry: Arc<InMemoryPresenceRegistry>,
    }

    fn fixture_with(authenticator: Arc<dyn Authenticator>) -> Fixture {
        let registry = Arc::new(InMemoryPresenceRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));
        let directory = Arc::new(InMemoryUserDirectory::new(vec![
            profile("u1", "alice"),
            profile("u2", "bob"),
        ]));
        let context = Arc::new(SessionContext {
            authenticator,
            connect_user: Arc::new(ConnectUserUseCase::new(registry.clone(), pusher.clone())),
            disconnect_user: Arc::new(DisconnectUserUseCase::new(registry.clone(), pusher.clone())),
            search_user: Arc::new(SearchUserUseCase::new(directory.clone())),
            send_message: Arc::new(SendMessageUseCase::new(
                Arc::new(InMemoryMessageRepository::new()),
                directory,
                pusher,
                Arc::new(SteppingClock::new(1_000, 1)),
            )),
        });
        Fixture { context, registry }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(StaticTokenAuthenticator::new(HashMap::from([
            ("t1".to_string(), identity("u1", "alice")),
            ("t2".to_string(), identity("u2", "bob")),
        ]))))
    }

    async fn active_session(
        f: &Fixture,
        token: &str,
    ) -> (ConnectionSession, mpsc::UnboundedReceiver<String>) {
        let mut session = ConnectionSession::new(f.context.clone());
        session.authenticate(Some(token)).await.unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        session.activate(tx).await.unwrap();
        (session, rx)
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        // テスト項目: 認証 → 有効化 → 切断の順に状態が遷移し、プレゼンスが更新される
        // given (前提条件):
        let f = fixture();
        let mut session = ConnectionSession::new(f.context.clone());
        assert_eq!(session.state(), SessionState::Connecting);

        // when (操作) / then (期待する結果):
        let identity = session.authenticate(Some("t1")).await.unwrap();
        assert_eq!(identity.user_id.as_str(), "u1");
        assert_eq!(session.state(), SessionState::Authenticated);
        assert!(f.registry.connection(&identity.user_id).await.is_none());

        let (tx, _rx) = mpsc::unbounded_channel();
        session.activate(tx).await.unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert!(f.registry.connection(&identity.user_id).await.is_some());

        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
        assert!(f.registry.connection(&identity.user_id).await.is_none());
    }

    #[tokio::test]
    async fn test_authentication_failure_never_reaches_active() {
        // テスト項目: 認証に失敗すると Closed になり、以降の有効化もプレゼンス登録も行われない
        // given (前提条件):
        let mut authenticator = MockAuthenticator::new();
        authenticator
            .expect_authenticate()
            .returning(|_| Err(AuthError::InvalidCredential));
        let f = fixture_with(Arc::new(authenticator));
        let mut session = ConnectionSession::new(f.context.clone());

        // when (操作):
        let result = session.authenticate(Some("forged")).await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let activation = session.activate(tx).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SessionError::Authentication(AuthError::InvalidCredential))
        );
        assert_eq!(session.state(), SessionState::Closed);
        assert!(matches!(activation, Err(SessionError::InvalidState { .. })));
        assert!(f.registry.online_user_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_is_rejected() {
        // テスト項目: 認証情報がない接続は MissingCredential で拒否される
        let f = fixture();
        let mut session = ConnectionSession::new(f.context.clone());

        let result = session.authenticate(None).await;

        assert_eq!(
            result,
            Err(SessionError::Authentication(AuthError::MissingCredential))
        );
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_events_are_rejected_before_active() {
        // テスト項目: Active になる前のイベントは InvalidState で拒否される
        let f = fixture();
        let mut session = ConnectionSession::new(f.context.clone());
        session.authenticate(Some("t1")).await.unwrap();

        let result = session
            .handle(SessionCommand::SearchUser {
                handle: "bob".to_string(),
            })
            .await;

        assert_eq!(
            result,
            Err(SessionError::InvalidState {
                expected: SessionState::Active,
                actual: SessionState::Authenticated,
            })
        );
    }

    #[tokio::test]
    async fn test_presence_broadcast_between_sessions() {
        // テスト項目: 接続・切断がもう一方のセッションに userOnline / userOffline として届く
        // given (前提条件):
        let f = fixture();
        let (_bob, mut rx_bob) = active_session(&f, "t2").await;

        // when (操作):
        let (mut alice, _rx_alice) = active_session(&f, "t1").await;
        alice.close().await;

        // then (期待する結果):
        let online: serde_json::Value = serde_json::from_str(&rx_bob.recv().await.unwrap()).unwrap();
        let offline: serde_json::Value = serde_json::from_str(&rx_bob.recv().await.unwrap()).unwrap();
        assert_eq!(online["type"], "userOnline");
        assert_eq!(online["userId"], "u1");
        assert_eq!(offline["type"], "userOffline");
        assert_eq!(offline["userId"], "u1");
    }

    #[tokio::test]
    async fn test_replaced_session_close_keeps_user_online() {
        // テスト項目: 同じユーザーの新しい接続がある場合、古い接続の close でオフラインにならない
        // given (前提条件):
        let f = fixture();
        let (mut old, _rx_old) = active_session(&f, "t1").await;
        let (new, _rx_new) = active_session(&f, "t1").await;
        let (_bob, mut rx_bob) = active_session(&f, "t2").await;

        // when (操作):
        old.close().await;

        // then (期待する結果):
        let alice = UserId::new("u1").unwrap();
        assert_eq!(
            f.registry.connection(&alice).await.map(|c| c.id()),
            new.connection_id()
        );
        assert!(rx_bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_search_and_send_through_session() {
        // テスト項目: Active なセッションで検索と送信ができる
        // given (前提条件):
        let f = fixture();
        let (mut alice, mut rx_alice) = active_session(&f, "t1").await;

        // when (操作):
        let found = alice
            .handle(SessionCommand::SearchUser {
                handle: "bob".to_string(),
            })
            .await
            .unwrap();
        let self_search = alice
            .handle(SessionCommand::SearchUser {
                handle: "alice".to_string(),
            })
            .await
            .unwrap();
        let sent = alice
            .handle(SessionCommand::SendMessage(SendMessageRequest {
                receiver_id: "u2".to_string(),
                content: Some("hi".to_string()),
                kind: None,
                attachment: None,
            }))
            .await
            .unwrap();
        let to_self = alice
            .handle(SessionCommand::SendMessage(SendMessageRequest {
                receiver_id: "u1".to_string(),
                content: Some("me".to_string()),
                kind: None,
                attachment: None,
            }))
            .await;

        // then (期待する結果):
        assert_eq!(found, SessionReply::UserFound(profile("u2", "bob")));
        assert_eq!(self_search, SessionReply::UserNotFound);
        assert!(matches!(sent, SessionReply::MessageSent(ref m) if m.room_id.as_str() == "room:u1:u2"));
        assert!(rx_alice.recv().await.unwrap().contains("messageReceived"));
        assert!(matches!(
            to_self,
            Err(SessionError::Send(SendMessageError::InvalidRecipient(_)))
        ));
    }

    #[tokio::test]
    async fn test_join_room_checks_membership() {
        // テスト項目: ルーム参加は参加者のルームのみ許可され、接続内のセットに記録される
        // given (前提条件):
        let f = fixture();
        let (mut alice, _rx) = active_session(&f, "t1").await;

        // when (操作):
        let joined = alice
            .handle(SessionCommand::JoinRoom {
                room_id: "room:u1:u2".to_string(),
            })
            .await;
        let foreign = alice
            .handle(SessionCommand::JoinRoom {
                room_id: "room:u2:u3".to_string(),
            })
            .await;
        let malformed = alice
            .handle(SessionCommand::JoinRoom {
                room_id: "lobby".to_string(),
            })
            .await;

        // then (期待する結果):
        assert!(matches!(joined, Ok(SessionReply::RoomJoined(_))));
        assert!(matches!(foreign, Err(SessionError::AccessDenied(_))));
        assert!(matches!(malformed, Err(SessionError::InvalidRoom(_))));
        assert_eq!(alice.joined_rooms().len(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        // テスト項目: close を複数回呼んでも問題なく、未認証のセッションの close はプレゼンスを変更しない
        let f = fixture();
        let (mut alice, _rx) = active_session(&f, "t1").await;
        let mut pending = ConnectionSession::new(f.context.clone());

        alice.close().await;
        alice.close().await;
        pending.close().await;

        assert_eq!(alice.state(), SessionState::Closed);
        assert_eq!(pending.state(), SessionState::Closed);
        assert!(f.registry.online_user_ids().await.is_empty());
    }
}
