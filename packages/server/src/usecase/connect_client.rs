//! UseCase: クライアント接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//! - ハンドシェイク完了後の登録と接続通知
//!
//! ### なぜこのテストが必要か
//! - 接続通知は既存の接続にだけ届き、本人には届かないことを保証
//! - ハンドシェイク中に閉じられた接続が登録されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存の接続がある状態での新規接続
//! - エッジケース：最初の接続（通知対象なし）
//! - 異常系：close が始まった接続の登録

use std::sync::Arc;

use crate::domain::{Connection, HubRepository, RepositoryError};

use super::{
    error::ConnectError,
    notification::{connected_text, system_notification},
};

/// クライアント接続のユースケース
pub struct ConnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn HubRepository>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(repository: Arc<dyn HubRepository>) -> Self {
        Self { repository }
    }

    /// 接続を登録し、他の接続に接続通知を送る
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 通知を届けた接続の数
    /// * `Err(ConnectError)` - 登録前に接続が閉じられた、または ID が重複した
    pub async fn execute(&self, connection: Arc<Connection>) -> Result<usize, ConnectError> {
        let id = connection.id().clone();
        let notification = system_notification(connected_text(&id));

        self.repository
            .add_connection(connection, notification)
            .await
            .map_err(|error| match error {
                RepositoryError::ConnectionAlreadyRegistered(id) => {
                    ConnectError::DuplicateConnectionId(id)
                }
                _ => ConnectError::ConnectionClosed(id.into_string()),
            })
    }
}
