//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// 接続登録のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// ハンドシェイク完了前に接続が閉じられた
    #[error("Connection '{0}' closed before it could be registered")]
    ConnectionClosed(String),

    /// 同じ ID の接続がすでに登録されている
    #[error("Connection '{0}' is already registered")]
    DuplicateConnectionId(String),
}

/// 接続解除のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DisconnectError {
    /// 一度も登録されなかった接続（ハンドシェイク前の切断）
    #[error("Connection '{0}' was never registered")]
    NotRegistered(String),
}

/// グループ（ルーム）操作のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("Invalid group name: {0}")]
    InvalidGroupName(#[from] ValueObjectError),

    #[error("Connection '{0}' is not registered")]
    ConnectionNotRegistered(String),
}

impl From<RepositoryError> for RoomError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::ConnectionNotRegistered(id)
            | RepositoryError::ConnectionNotHandshaking(id)
            | RepositoryError::ConnectionAlreadyRegistered(id) => {
                Self::ConnectionNotRegistered(id)
            }
        }
    }
}
