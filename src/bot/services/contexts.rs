//! Per-actor "awaiting evidence" mappings with an inactivity window.

use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Evidence the router expects from an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEvidence {
    /// Task awaiting evidence.
    pub task_id: TaskId,
    /// When the mapping was created.
    pub since: DateTime<Utc>,
}

/// Map from actor to the task they are expected to submit evidence for.
///
/// Entries are created on request-completion and removed on successful
/// submission, when the task turns out to be gone, or once older than the
/// configured time to live. Expired entries are evicted lazily on lookup and
/// in bulk by [`purge_expired`](Self::purge_expired).
#[derive(Debug)]
pub struct EvidenceContexts<C>
where
    C: Clock + Send + Sync,
{
    entries: Mutex<HashMap<UserId, PendingEvidence>>,
    ttl: TimeDelta,
    clock: Arc<C>,
}

impl<C> EvidenceContexts<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty map whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<C>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, PendingEvidence>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &PendingEvidence, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.since) > self.ttl
    }

    /// Records that `actor` owes evidence for `task_id`, replacing any
    /// earlier mapping.
    pub fn begin(&self, actor: UserId, task_id: TaskId) {
        let since = self.clock.utc();
        self.entries().insert(actor, PendingEvidence { task_id, since });
    }

    /// Returns the task `actor` owes evidence for, evicting the mapping if it
    /// has expired.
    #[must_use]
    pub fn pending(&self, actor: UserId) -> Option<TaskId> {
        let now = self.clock.utc();
        let mut entries = self.entries();
        let entry = *entries.get(&actor)?;
        if self.is_expired(&entry, now) {
            entries.remove(&actor);
            return None;
        }
        Some(entry.task_id)
    }

    /// Removes the mapping for `actor`.
    pub fn clear(&self, actor: UserId) {
        self.entries().remove(&actor);
    }

    /// Evicts every expired mapping and returns how many were removed.
    #[must_use]
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.utc();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }

    /// Returns the number of live or not yet evicted mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns whether no mapping is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
