//! Repository abstraction over hub state.
//!
//! The connection registry and the group registry are one consistency unit:
//! every method mutates and fans out under the same boundary, so a
//! notification never observes a half-applied membership change. Fan-out only
//! enqueues onto each connection's outbound queue and never waits on I/O.

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    entity::{Connection, HubSnapshot},
    error::RepositoryError,
    value_object::{ConnectionId, GroupName, OutboundFrame},
};

/// Hub state repository.
///
/// Every method returns the number of connections the frame was enqueued to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HubRepository: Send + Sync {
    /// Move a handshaking connection to Open and register it, delivering
    /// `notification` to every connection registered *before* it. Fails
    /// without touching the state if the id is already registered.
    async fn add_connection(
        &self,
        connection: Arc<Connection>,
        notification: OutboundFrame,
    ) -> Result<usize, RepositoryError>;

    /// Deregister a connection from the registry and every group, mark it
    /// Closed and deliver `notification` to every connection still registered.
    ///
    /// The connection is marked Closed even when it was never registered; the
    /// error then tells the caller no notification went out.
    async fn remove_connection(
        &self,
        connection: &Connection,
        notification: OutboundFrame,
    ) -> Result<usize, RepositoryError>;

    /// Deliver a frame to every registered connection.
    async fn broadcast_all(&self, frame: OutboundFrame) -> usize;

    /// Add a registered connection to a group (creating it if absent), then
    /// deliver `notification` to every member, the joiner included.
    async fn join_group(
        &self,
        group: &GroupName,
        connection_id: &ConnectionId,
        notification: OutboundFrame,
    ) -> Result<usize, RepositoryError>;

    /// Remove a registered connection from a group, then deliver
    /// `notification` to the remaining members. A connection that was not a
    /// member still notifies them.
    async fn leave_group(
        &self,
        group: &GroupName,
        connection_id: &ConnectionId,
        notification: OutboundFrame,
    ) -> Result<usize, RepositoryError>;

    /// Deliver a frame to the current members of a group. Unknown or empty
    /// groups deliver to nobody.
    async fn send_to_group(&self, group: &GroupName, frame: OutboundFrame) -> usize;

    async fn count_connections(&self) -> usize;

    /// Members of a group, sorted. Empty for unknown groups.
    async fn group_members(&self, group: &GroupName) -> Vec<ConnectionId>;

    async fn snapshot(&self) -> HubSnapshot;
}
