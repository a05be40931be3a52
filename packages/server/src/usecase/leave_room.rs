//! UseCase: ルーム退出処理

use std::sync::Arc;

use crate::domain::{ConnectionId, GroupName, HubRepository};

use super::{
    error::RoomError,
    notification::{left_text, system_notification},
};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn HubRepository>,
}

impl LeaveRoomUseCase {
    pub fn new(repository: Arc<dyn HubRepository>) -> Self {
        Self { repository }
    }

    /// ルームから退出し、残りのメンバーに通知する
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        group_name: String,
    ) -> Result<usize, RoomError> {
        let group = GroupName::new(group_name)?;
        let notification = system_notification(left_text(connection_id, &group));

        Ok(self
            .repository
            .leave_group(&group, connection_id, notification)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::repository::InMemoryHubRepository,
        test_support::{drain_invocations, register},
        usecase::JoinRoomUseCase,
    };
    use serde_json::Value;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_leave_room_notifies_remaining_members() {
        // テスト項目: 退出通知は残りのメンバーに届き、退出者には届かない
        // given (前提条件):
        let repository = Arc::new(InMemoryHubRepository::new());
        let join = JoinRoomUseCase::new(repository.clone());
        let usecase = LeaveRoomUseCase::new(repository.clone());
        let shutdown = CancellationToken::new();
        let (alice, mut alice_rx) = register(&repository, &shutdown).await;
        let (bob, mut bob_rx) = register(&repository, &shutdown).await;
        join.execute(alice.id(), "r".to_string()).await.unwrap();
        join.execute(bob.id(), "r".to_string()).await.unwrap();
        drain_invocations(&mut alice_rx);
        drain_invocations(&mut bob_rx);

        // when (操作):
        let delivered = usecase.execute(bob.id(), "r".to_string()).await.unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(
            drain_invocations(&mut alice_rx),
            vec![(
                "ReceiveSystemNotification".to_string(),
                vec![Value::from(format!("User {} left r", bob.id()))]
            )]
        );
        assert!(drain_invocations(&mut bob_rx).is_empty());
        assert_eq!(
            repository
                .group_members(&GroupName::new("r".to_string()).unwrap())
                .await,
            vec![alice.id().clone()]
        );
    }

    #[tokio::test]
    async fn test_leave_room_not_member_still_notifies() {
        // テスト項目: 参加していないルームからの退出も成功し、メンバーに退出通知が届く
        // given (前提条件):
        let repository = Arc::new(InMemoryHubRepository::new());
        let join = JoinRoomUseCase::new(repository.clone());
        let usecase = LeaveRoomUseCase::new(repository.clone());
        let shutdown = CancellationToken::new();
        let (alice, mut alice_rx) = register(&repository, &shutdown).await;
        let (bob, mut bob_rx) = register(&repository, &shutdown).await;
        join.execute(alice.id(), "r".to_string()).await.unwrap();
        drain_invocations(&mut alice_rx);
        drain_invocations(&mut bob_rx);

        // when (操作):
        let result = usecase.execute(bob.id(), "r".to_string()).await;

        // then (期待する結果):
        assert_eq!(result, Ok(1));
        assert_eq!(
            drain_invocations(&mut alice_rx),
            vec![(
                "ReceiveSystemNotification".to_string(),
                vec![Value::from(format!("User {} left r", bob.id()))]
            )]
        );
        assert!(drain_invocations(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_leave_room_rejects_empty_name() {
        // テスト項目: 空のルーム名はエラー
        let repository = Arc::new(InMemoryHubRepository::new());
        let usecase = LeaveRoomUseCase::new(repository.clone());
        let shutdown = CancellationToken::new();
        let (alice, _rx) = register(&repository, &shutdown).await;

        let result = usecase.execute(alice.id(), String::new()).await;

        assert!(matches!(result, Err(RoomError::InvalidGroupName(_))));
    }
}
