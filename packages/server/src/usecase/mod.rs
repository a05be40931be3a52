//! UseCase 層
//!
//! Hub のビジネスロジックを実装するレイヤー。
//! UI 層（WebSocket / HTTP ハンドラ）から呼び出され、Repository を通して Hub の状態を操作します。

pub mod broadcast;
pub mod connect_client;
pub mod disconnect_client;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod notification;
pub mod send_message;
pub mod send_message_to_room;

pub use broadcast::BroadcastUseCase;
pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{ConnectError, DisconnectError, RoomError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use send_message::SendMessageUseCase;
pub use send_message_to_room::SendMessageToRoomUseCase;
