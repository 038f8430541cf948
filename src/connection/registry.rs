//! Connection registry
//!
//! The set of live connections, keyed by id. This is the only shared mutable
//! state in the relay; every operation takes the internal lock for its own
//! duration only, so callers need no extra synchronization.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::RwLock;

use crate::connection::ConnectionId;
use crate::error::RegistryError;

/// Registry of live connections and their outbound handles
pub struct ConnectionRegistry<H> {
    entries: RwLock<HashMap<ConnectionId, H>>,
}

impl<H: Clone> ConnectionRegistry<H> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `handle` under `id`. An id already present is rejected and
    /// the existing entry is left untouched.
    pub async fn add(&self, id: ConnectionId, handle: H) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().await;
        match entries.entry(id) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateId(id)),
            Entry::Vacant(slot) => {
                slot.insert(handle);
                Ok(())
            }
        }
    }

    /// Removes `id` and returns its handle. Absent ids are a no-op: a
    /// disconnect can race with a failed delivery removing the same entry.
    pub async fn remove(&self, id: &ConnectionId) -> Option<H> {
        self.entries.write().await.remove(id)
    }

    /// Point-in-time copy of every entry except `id`.
    ///
    /// The lock is released before returning, so the caller can iterate
    /// while other tasks add and remove connections.
    pub async fn snapshot_excluding(&self, id: &ConnectionId) -> Vec<(ConnectionId, H)> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|(entry_id, _)| *entry_id != id)
            .map(|(entry_id, handle)| (*entry_id, handle.clone()))
            .collect()
    }

    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.entries.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<H: Clone> Default for ConnectionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn rejects_duplicate_id() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::new();

        registry.add(id, "first").await.unwrap();
        let err = registry.add(id, "second").await.unwrap_err();

        assert_eq!(err, RegistryError::DuplicateId(id));
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.snapshot_excluding(&ConnectionId::new()).await, vec![(id, "first")]);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::new();
        registry.add(id, ()).await.unwrap();

        assert_eq!(registry.remove(&id).await, Some(()));
        assert_eq!(registry.remove(&id).await, None);
        assert_eq!(registry.remove(&ConnectionId::new()).await, None);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn snapshot_never_contains_excluded_id() {
        let registry = ConnectionRegistry::new();
        let ids: Vec<ConnectionId> = (0..5).map(|_| ConnectionId::new()).collect();
        for id in &ids {
            registry.add(*id, *id).await.unwrap();
        }

        for id in &ids {
            let snapshot = registry.snapshot_excluding(id).await;
            assert_eq!(snapshot.len(), ids.len() - 1);
            assert!(snapshot.iter().all(|(entry_id, _)| entry_id != id));
        }
    }

    #[tokio::test]
    async fn snapshot_is_stable_across_later_mutation() {
        let registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.add(a, 'a').await.unwrap();
        registry.add(b, 'b').await.unwrap();

        let snapshot = registry.snapshot_excluding(&a).await;
        registry.remove(&b).await;
        registry.add(ConnectionId::new(), 'c').await.unwrap();

        assert_eq!(snapshot, vec![(b, 'b')]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_add_and_remove() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut tasks = Vec::new();

        for n in 0..16 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let id = ConnectionId::new();
                registry.add(id, n).await.unwrap();
                let _ = registry.snapshot_excluding(&id).await;
                if n % 2 == 0 {
                    registry.remove(&id).await;
                    registry.remove(&id).await;
                }
                id
            }));
        }

        let mut kept = HashSet::new();
        for (n, task) in tasks.into_iter().enumerate() {
            let id = task.await.unwrap();
            if n % 2 == 1 {
                kept.insert(id);
            }
        }

        let snapshot = registry.snapshot_excluding(&ConnectionId::new()).await;
        let seen: HashSet<ConnectionId> = snapshot.iter().map(|(id, _)| *id).collect();
        assert_eq!(snapshot.len(), seen.len());
        assert_eq!(seen, kept);
    }
}
