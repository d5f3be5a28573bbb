//! UseCase layer
//!
//! 1 つの操作につき 1 つの UseCase 構造体を定義します。
//! UseCase はドメイン層の trait（Repository、Gateway、MessagePusher）にだけ依存し、
//! 具体的な実装は起動時に注入されます。

pub mod connect_user;
pub mod disconnect_user;
pub mod error;
pub mod get_chat_list;
pub mod get_history;
pub mod search_user;
pub mod send_message;
pub mod session;
pub mod upload_attachment;

pub use connect_user::ConnectUserUseCase;
pub use disconnect_user::DisconnectUserUseCase;
pub use error::{GetChatListError, GetHistoryError, SendMessageError, SessionError, UploadError};
pub use get_chat_list::{GetChatListUseCase, NO_MESSAGES_PLACEHOLDER};
pub use get_history::{GetHistoryUseCase, HistoryPage, HistorySettings};
pub use search_user::SearchUserUseCase;
pub use send_message::{SendMessageRequest, SendMessageUseCase};
pub use session::{ConnectionSession, SessionCommand, SessionContext, SessionReply, SessionState};
pub use upload_attachment::{ALLOWED_CONTENT_TYPES, DEFAULT_MAX_UPLOAD_BYTES, UploadAttachmentUseCase};
