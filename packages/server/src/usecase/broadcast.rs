//! UseCase: 管理者ブロードキャスト
//!
//! 接続の受信ループではなく外部（HTTP）から呼び出される唯一の入口。
//! 他の配信と同じく Repository のロックを通って全接続に届きます。

use std::sync::Arc;

use crate::domain::HubRepository;

use super::notification::{admin_text, system_notification};

/// 管理者ブロードキャストのユースケース
pub struct BroadcastUseCase {
    repository: Arc<dyn HubRepository>,
}

impl BroadcastUseCase {
    pub fn new(repository: Arc<dyn HubRepository>) -> Self {
        Self { repository }
    }

    /// `ReceiveSystemNotification ["[System Admin]: " + message]` を全接続に配信する
    pub async fn execute(&self, message: &str) -> usize {
        self.repository
            .broadcast_all(system_notification(admin_text(message)))
            .await
    }
}
