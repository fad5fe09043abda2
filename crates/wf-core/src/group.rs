use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::ActorId;

/// Unique identifier for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub Uuid);

impl GroupId {
    /// Generate a new random group ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Standing of an actor within a group. Invited actors do not follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    /// Asked to join but not yet following.
    Invited,
    /// Full member; follows the leader.
    Member,
    /// Leads the group.
    Leader,
}

/// An adventuring party led by one actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Actor whose moves the group follows.
    pub leader: ActorId,
    /// Members other than the leader, in join order.
    pub members: Vec<(ActorId, GroupStatus)>,
}

impl Group {
    /// A group with only its leader.
    pub fn new(name: impl Into<String>, leader: ActorId) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            leader,
            members: Vec::new(),
        }
    }

    /// Add or update a member.
    pub fn add(&mut self, id: ActorId, status: GroupStatus) {
        if id == self.leader {
            return;
        }
        match self.members.iter_mut().find(|(m, _)| *m == id) {
            Some(entry) => entry.1 = status,
            None => self.members.push((id, status)),
        }
    }

    /// Drop an actor from the group.
    pub fn remove(&mut self, id: ActorId) {
        self.members.retain(|(m, _)| *m != id);
    }

    /// Membership status of an actor, if any.
    pub fn status_of(&self, id: ActorId) -> Option<GroupStatus> {
        if id == self.leader {
            return Some(GroupStatus::Leader);
        }
        self.members
            .iter()
            .find(|(m, _)| *m == id)
            .map(|(_, s)| *s)
    }

    /// Members who follow the leader (status member or better), in join order.
    pub fn followers(&self) -> Vec<ActorId> {
        self.members
            .iter()
            .filter(|(_, s)| *s >= GroupStatus::Member)
            .map(|(m, _)| *m)
            .collect()
    }
}
