//! UseCase: ルーム内メッセージ送信

use std::sync::Arc;

use crate::domain::{GroupName, HubRepository};

use super::{error::RoomError, notification::chat_message};

/// ルーム内メッセージ送信のユースケース
pub struct SendMessageToRoomUseCase {
    repository: Arc<dyn HubRepository>,
}

impl SendMessageToRoomUseCase {
    pub fn new(repository: Arc<dyn HubRepository>) -> Self {
        Self { repository }
    }

    /// `ReceiveMessage [display_name, text]` をルームのメンバーにだけ配信する
    ///
    /// 送信者がメンバーである必要はない。存在しないルームへの送信は誰にも届かない。
    pub async fn execute(
        &self,
        group_name: String,
        display_name: &str,
        text: &str,
    ) -> Result<usize, RoomError> {
        let group = GroupName::new(group_name)?;
        Ok(self
            .repository
            .send_to_group(&group, chat_message(display_name, text))
            .await)
    }
}
