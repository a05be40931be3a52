//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// ConnectionId too long error
    #[error("ConnectionId cannot exceed {max} characters (got {actual})")]
    ConnectionIdTooLong { max: usize, actual: usize },

    /// GroupName validation error
    #[error("Group name cannot be empty")]
    GroupNameEmpty,

    /// GroupName too long error
    #[error("Group name cannot exceed {max} characters (got {actual})")]
    GroupNameTooLong { max: usize, actual: usize },
}

/// Errors returned by a [`HubRepository`](super::HubRepository)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The connection left the Handshaking state before it could be registered
    #[error("Connection '{0}' is no longer handshaking and cannot be registered")]
    ConnectionNotHandshaking(String),

    /// The connection is not (or no longer) in the registry
    #[error("Connection '{0}' is not registered")]
    ConnectionNotRegistered(String),

    /// Another connection with the same id is already registered
    #[error("Connection '{0}' is already registered")]
    ConnectionAlreadyRegistered(String),
}
