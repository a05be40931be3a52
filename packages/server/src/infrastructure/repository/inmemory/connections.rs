//! Connection registry: the set of live (Open or Closing) connections.

use std::{collections::HashMap, sync::Arc};

use crate::domain::{Connection, ConnectionId, OutboundFrame};

/// Live connections indexed by id. Not synchronized on its own; it is only
/// reached through [`InMemoryHubRepository`](super::InMemoryHubRepository).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Arc<Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a connection. Returns `false` if the id was already present.
    pub fn insert(&mut self, connection: Arc<Connection>) -> bool {
        let id = connection.id().clone();
        match self.connections.entry(id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(connection);
                true
            }
        }
    }

    pub fn remove(&mut self, id: &ConnectionId) -> Option<Arc<Connection>> {
        self.connections.remove(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Enqueue a frame to every connection except `excluded`.
    pub fn broadcast_except(&self, excluded: Option<&ConnectionId>, frame: &OutboundFrame) -> usize {
        self.connections
            .values()
            .filter(|connection| Some(connection.id()) != excluded)
            .filter(|connection| connection.send(frame.clone()))
            .count()
    }

    /// Enqueue a frame to the given ids that are registered.
    pub fn deliver<'a>(
        &self,
        targets: impl IntoIterator<Item = &'a ConnectionId>,
        frame: &OutboundFrame,
    ) -> usize {
        targets
            .into_iter()
            .filter_map(|id| self.connections.get(id))
            .filter(|connection| connection.send(frame.clone()))
            .count()
    }

    pub fn values(&self) -> impl Iterator<Item = &Arc<Connection>> {
        self.connections.values()
    }
}
