//! In-memory collection of tracked members.
//!
//! The registry is an ordered `Vec` with linear lookup. Insertion order is
//! the snapshot order and the leaderboard tie-break order.

mod member;

pub use member::TrackedMember;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::RegistryError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentRegistry {
    members: Vec<TrackedMember>,
}

impl StudentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from loaded records.
    ///
    /// Later duplicates of an id are dropped so a hand-edited snapshot
    /// cannot break the one-entry-per-id invariant.
    pub fn from_members(members: Vec<TrackedMember>) -> Self {
        let mut registry = Self::new();
        for member in members {
            let id = member.id.clone();
            if registry.insert(member).is_err() {
                tracing::warn!(member = %id, "dropping duplicate snapshot record");
            }
        }
        registry
    }

    pub fn find(&self, id: &str) -> Option<&TrackedMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TrackedMember> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    /// Append a member. Rejects ids that are already tracked.
    pub fn insert(&mut self, member: TrackedMember) -> Result<(), RegistryError> {
        if self.find(&member.id).is_some() {
            return Err(RegistryError::DuplicateMember(member.id));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn all(&self) -> &[TrackedMember] {
        &self.members
    }

    pub(crate) fn all_mut(&mut self) -> &mut [TrackedMember] {
        &mut self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Owned copy of every record, for handing to the snapshot writer.
    pub fn snapshot(&self) -> Vec<TrackedMember> {
        self.members.clone()
    }
}

/// Handle to the one registry instance shared by the ticker, the presence
/// adapter and the command facade.
///
/// Every component locks the same mutex, so a tick's read-mutate-decide
/// pass over all members is atomic with respect to events and commands.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry(Arc<Mutex<StudentRegistry>>);

impl SharedRegistry {
    pub fn new(registry: StudentRegistry) -> Self {
        Self(Arc::new(Mutex::new(registry)))
    }

    /// Lock the registry, recovering from poisoning. Every mutation is a
    /// plain field store, so a panicking holder cannot leave a member
    /// half-updated.
    pub fn lock(&self) -> MutexGuard<'_, StudentRegistry> {
        self.0.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("registry lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_find() {
        let mut reg = StudentRegistry::new();
        reg.insert(TrackedMember::new("a", 0)).unwrap();
        reg.insert(TrackedMember::new("b", 0)).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.find("b").map(|m| m.id.as_str()), Some("b"));
        assert!(reg.find("c").is_none());
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let mut reg = StudentRegistry::new();
        reg.insert(TrackedMember::new("a", 0)).unwrap();
        let err = reg.insert(TrackedMember::new("a", 5)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateMember("a".into()));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.find("a").unwrap().last_seen_ms, Some(0));
    }

    #[test]
    fn from_members_keeps_first_of_duplicates_and_order() {
        let mut first = TrackedMember::new("x", 0);
        first.total_time = 10;
        let mut dup = TrackedMember::new("x", 0);
        dup.total_time = 99;
        let reg = StudentRegistry::from_members(vec![
            first,
            TrackedMember::new("y", 0),
            dup,
        ]);
        let ids: Vec<_> = reg.all().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["x", "y"]);
        assert_eq!(reg.find("x").unwrap().total_time, 10);
    }

    #[test]
    fn shared_registry_clones_share_state() {
        let shared = SharedRegistry::default();
        let other = shared.clone();
        shared.lock().insert(TrackedMember::new("a", 0)).unwrap();
        assert!(other.lock().find("a").is_some());
    }
}
