//! UseCase: メッセージ送信処理（全体配信）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - SendMessage はグループに関係なく送信者を含む全接続に届くことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数接続への配信（グループ未参加の接続を含む）
//! - エッジケース：接続がない状態での送信

use std::sync::Arc;

use crate::domain::HubRepository;

use super::notification::chat_message;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn HubRepository>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(repository: Arc<dyn HubRepository>) -> Self {
        Self { repository }
    }

    /// `ReceiveMessage [display_name, text]` を全接続に配信する
    ///
    /// # Returns
    ///
    /// 配信した接続の数
    pub async fn execute(&self, display_name: &str, text: &str) -> usize {
        tracing::debug!(display_name, text, "Processing chat message");
        self.repository
            .broadcast_all(chat_message(display_name, text))
            .await
    }
}
