//! Shared application state and dependency wiring.

use std::sync::Arc;

use tegami_shared::time::{Clock, SystemClock};

use crate::{
    domain::{Authenticator, MessageRepository, ObjectStorage, PresenceRegistry, UserDirectory},
    infrastructure::{
        auth::StaticTokenAuthenticator,
        message_pusher::WebSocketMessagePusher,
        presence::InMemoryPresenceRegistry,
        repository::{InMemoryMessageRepository, InMemoryUserDirectory},
        seed::SeedData,
        storage::InMemoryObjectStorage,
        timeout::{TimeoutMessageRepository, TimeoutObjectStorage, TimeoutUserDirectory},
    },
    usecase::{
        ConnectUserUseCase, DisconnectUserUseCase, GetChatListUseCase, GetHistoryUseCase,
        SearchUserUseCase, SendMessageUseCase, SessionContext, UploadAttachmentUseCase,
    },
};

use super::config::ServerConfig;

/// Shared application state
pub struct AppState {
    /// 接続セッションが使う UseCase 群
    pub session_context: Arc<SessionContext>,
    pub get_history_usecase: Arc<GetHistoryUseCase>,
    pub get_chat_list_usecase: Arc<GetChatListUseCase>,
    pub upload_attachment_usecase: Arc<UploadAttachmentUseCase>,
    /// `/media/{object_id}` で配信するオブジェクトストア
    pub media: Arc<InMemoryObjectStorage>,
    pub presence: Arc<dyn PresenceRegistry>,
}

impl AppState {
    /// Wire every use case against the in-memory collaborators.
    ///
    /// Initialization order:
    /// 1. Gateways (message store, user directory, object storage), each bounded
    ///    by the configured gateway timeout
    /// 2. Presence registry and MessagePusher
    /// 3. UseCases
    pub fn in_memory(config: &ServerConfig, seed: SeedData, public_base_url: &str) -> Self {
        let limit = config.gateway_timeout();

        // 1. Gateways
        let repository: Arc<dyn MessageRepository> = Arc::new(TimeoutMessageRepository::new(
            Arc::new(InMemoryMessageRepository::new()),
            limit,
        ));
        tracing::info!("Loaded {} seeded user(s)", seed.profiles.len());
        let directory: Arc<dyn UserDirectory> = Arc::new(TimeoutUserDirectory::new(
            Arc::new(InMemoryUserDirectory::new(seed.profiles)),
            limit,
        ));
        let authenticator: Arc<dyn Authenticator> =
            Arc::new(StaticTokenAuthenticator::new(seed.tokens));
        let media = Arc::new(InMemoryObjectStorage::new(public_base_url));
        let storage: Arc<dyn ObjectStorage> =
            Arc::new(TimeoutObjectStorage::new(media.clone(), limit));

        // 2. Presence registry and MessagePusher
        let presence: Arc<dyn PresenceRegistry> = Arc::new(InMemoryPresenceRegistry::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new(presence.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 3. UseCases
        let session_context = Arc::new(SessionContext {
            authenticator,
            connect_user: Arc::new(ConnectUserUseCase::new(
                presence.clone(),
                message_pusher.clone(),
            )),
            disconnect_user: Arc::new(DisconnectUserUseCase::new(
                presence.clone(),
                message_pusher.clone(),
            )),
            search_user: Arc::new(SearchUserUseCase::new(directory.clone())),
            send_message: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                directory.clone(),
                message_pusher,
                clock,
            )),
        });

        Self {
            session_context,
            get_history_usecase: Arc::new(GetHistoryUseCase::new(
                repository.clone(),
                directory.clone(),
                config.history_settings(),
            )),
            get_chat_list_usecase: Arc::new(GetChatListUseCase::new(repository, directory)),
            upload_attachment_usecase: Arc::new(UploadAttachmentUseCase::new(
                storage,
                config.uploads.max_bytes,
            )),
            media,
            presence,
        }
    }
}
