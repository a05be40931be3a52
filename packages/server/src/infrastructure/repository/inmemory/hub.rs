//! InMemory Hub Repository 実装
//!
//! ドメイン層が定義する HubRepository trait の具体的な実装。
//! 接続レジストリとグループレジストリを 1 つの Mutex で保護し、
//! 状態の変更とその通知の配信を同じロックの中で行います。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ConnectionRegistry, GroupRegistry};
use crate::domain::{
    Connection, ConnectionId, GroupName, HubRepository, HubSnapshot, OutboundFrame,
    RepositoryError,
};

#[derive(Debug, Default)]
struct HubState {
    connections: ConnectionRegistry,
    groups: GroupRegistry,
}

/// インメモリ Hub Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryHubRepository {
    state: Mutex<HubState>,
}

impl InMemoryHubRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HubRepository for InMemoryHubRepository {
    async fn add_connection(
        &self,
        connection: Arc<Connection>,
        notification: OutboundFrame,
    ) -> Result<usize, RepositoryError> {
        let mut state = self.state.lock().await;

        if state.connections.contains(connection.id()) {
            return Err(RepositoryError::ConnectionAlreadyRegistered(
                connection.id().to_string(),
            ));
        }
        // Open and insert under the lock, so a concurrent close either
        // prevents the insert or removes it afterwards.
        if !connection.mark_open() {
            return Err(RepositoryError::ConnectionNotHandshaking(
                connection.id().to_string(),
            ));
        }

        let inserted = state.connections.insert(connection.clone());
        debug_assert!(inserted);
        Ok(state
            .connections
            .broadcast_except(Some(connection.id()), &notification))
    }

    async fn remove_connection(
        &self,
        connection: &Connection,
        notification: OutboundFrame,
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let removed = state.connections.remove(connection.id());
        let left = state.groups.remove_connection(connection.id());
        connection.mark_closed();

        if removed.is_none() {
            return Err(RepositoryError::ConnectionNotRegistered(
                connection.id().to_string(),
            ));
        }
        tracing::debug!(
            connection_id = %connection.id(),
            groups_left = left.len(),
            "Connection removed from registry"
        );
        Ok(state.connections.broadcast_except(None, &notification))
    }

    async fn broadcast_all(&self, frame: OutboundFrame) -> usize {
        let state = self.state.lock().await;
        state.connections.broadcast_except(None, &frame)
    }

    async fn join_group(
        &self,
        group: &GroupName,
        connection_id: &ConnectionId,
        notification: OutboundFrame,
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if !state.connections.contains(connection_id) {
            return Err(RepositoryError::ConnectionNotRegistered(
                connection_id.to_string(),
            ));
        }
        state.groups.join(group, connection_id);
        Ok(state
            .connections
            .deliver(state.groups.members(group), &notification))
    }

    async fn leave_group(
        &self,
        group: &GroupName,
        connection_id: &ConnectionId,
        notification: OutboundFrame,
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if !state.connections.contains(connection_id) {
            return Err(RepositoryError::ConnectionNotRegistered(
                connection_id.to_string(),
            ));
        }
        // Leaving a group the connection is not in still notifies the members.
        if !state.groups.leave(group, connection_id) {
            tracing::debug!(
                connection_id = %connection_id,
                group = %group,
                "Leave from a group the connection was not a member of"
            );
        }
        Ok(state
            .connections
            .deliver(state.groups.members(group), &notification))
    }

    async fn send_to_group(&self, group: &GroupName, frame: OutboundFrame) -> usize {
        let state = self.state.lock().await;
        state.connections.deliver(state.groups.members(group), &frame)
    }

    async fn count_connections(&self) -> usize {
        let state = self.state.lock().await;
        state.connections.len()
    }

    async fn group_members(&self, group: &GroupName) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        let mut members: Vec<ConnectionId> = state.groups.members(group).cloned().collect();
        members.sort();
        members
    }

    async fn snapshot(&self) -> HubSnapshot {
        let state = self.state.lock().await;
        let mut connections: Vec<_> = state.connections.values().map(|c| c.summary()).collect();
        connections.sort_by(|a, b| {
            a.connected_at
                .cmp(&b.connected_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        HubSnapshot {
            connections,
            groups: state.groups.summaries(),
        }
    }
}
