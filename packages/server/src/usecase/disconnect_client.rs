//! UseCase: クライアント切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - レジストリと全グループからの削除、切断通知
//!
//! ### なぜこのテストが必要か
//! - 切断通知は残りの接続に 1 回だけ届き、本人には届かないことを保証
//! - 二重の切断で通知が重複しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と通知
//! - エッジケース：最後の接続の切断（通知対象なし）
//! - 異常系：ハンドシェイク前の切断

use std::sync::Arc;

use crate::domain::{Connection, HubRepository};

use super::{
    error::DisconnectError,
    notification::{disconnected_text, system_notification},
};

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn HubRepository>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(repository: Arc<dyn HubRepository>) -> Self {
        Self { repository }
    }

    /// 接続を削除し、残りの接続に切断通知を送る
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 通知を届けた接続の数
    /// * `Err(DisconnectError)` - 登録されていなかった（通知なし）
    pub async fn execute(&self, connection: &Connection) -> Result<usize, DisconnectError> {
        let notification = system_notification(disconnected_text(connection.id()));

        self.repository
            .remove_connection(connection, notification)
            .await
            .map_err(|_| DisconnectError::NotRegistered(connection.id().to_string()))
    }
}
