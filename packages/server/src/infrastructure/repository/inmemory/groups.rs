//! Group registry: group name -> member connection ids.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::{ConnectionId, GroupName, GroupSummary};

/// Group membership, indexed both ways so a disconnect does not scan every
/// group. Empty groups are dropped as soon as their last member leaves.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: HashMap<GroupName, HashSet<ConnectionId>>,
    memberships: HashMap<ConnectionId, HashSet<GroupName>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member. Returns `false` if it already was one.
    pub fn join(&mut self, group: &GroupName, id: &ConnectionId) -> bool {
        let added = self
            .groups
            .entry(group.clone())
            .or_default()
            .insert(id.clone());
        if added {
            self.memberships
                .entry(id.clone())
                .or_default()
                .insert(group.clone());
        }
        added
    }

    /// Remove a member. Returns `false` if it was not one.
    pub fn leave(&mut self, group: &GroupName, id: &ConnectionId) -> bool {
        let Some(members) = self.groups.get_mut(group) else {
            return false;
        };
        if !members.remove(id) {
            return false;
        }
        if members.is_empty() {
            self.groups.remove(group);
        }
        if let Some(joined) = self.memberships.get_mut(id) {
            joined.remove(group);
            if joined.is_empty() {
                self.memberships.remove(id);
            }
        }
        true
    }

    /// Remove a connection from every group it belongs to, returning those
    /// groups.
    pub fn remove_connection(&mut self, id: &ConnectionId) -> Vec<GroupName> {
        let joined = self.memberships.remove(id).unwrap_or_default();
        for group in &joined {
            if let Some(members) = self.groups.get_mut(group) {
                members.remove(id);
                if members.is_empty() {
                    self.groups.remove(group);
                }
            }
        }
        joined.into_iter().collect()
    }

    pub fn members(&self, group: &GroupName) -> impl Iterator<Item = &ConnectionId> {
        self.groups.get(group).into_iter().flatten()
    }

    #[cfg(test)]
    pub fn is_member(&self, group: &GroupName, id: &ConnectionId) -> bool {
        self.groups
            .get(group)
            .is_some_and(|members| members.contains(id))
    }

    #[cfg(test)]
    pub fn groups_of(&self, id: &ConnectionId) -> impl Iterator<Item = &GroupName> {
        self.memberships.get(id).into_iter().flatten()
    }

    #[cfg(test)]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Sorted view of every group.
    pub fn summaries(&self) -> Vec<GroupSummary> {
        let mut summaries: Vec<GroupSummary> = self
            .groups
            .iter()
            .map(|(name, members)| GroupSummary {
                name: name.clone(),
                members: members
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}
