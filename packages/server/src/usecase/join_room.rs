//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 参加者本人が自分の参加通知を受け取ることを保証
//! - 既存メンバーは自分の通知の後に新しい参加者の通知を受け取ることを確認
//! - グループ外の接続には通知が届かないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 人が順に同じルームに参加
//! - 異常系：空のルーム名

use std::sync::Arc;

use crate::domain::{ConnectionId, GroupName, HubRepository};

use super::{
    error::RoomError,
    notification::{joined_text, system_notification},
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn HubRepository>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(repository: Arc<dyn HubRepository>) -> Self {
        Self { repository }
    }

    /// ルームに参加し、参加者本人を含む全メンバーに通知する
    ///
    /// メンバー追加と通知は同じロックの中で行われるため、この呼び出しが返った後に
    /// ルームへ送られたメッセージを参加者が取りこぼすことはない。
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 通知を届けたメンバーの数
    /// * `Err(RoomError)` - ルーム名が不正、または接続が登録されていない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        group_name: String,
    ) -> Result<usize, RoomError> {
        let group = GroupName::new(group_name)?;
        let notification = system_notification(joined_text(connection_id, &group));

        Ok(self
            .repository
            .join_group(&group, connection_id, notification)
            .await?)
    }
}
