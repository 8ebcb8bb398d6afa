//! The replica registry: alias to endpoint pair.

use std::collections::HashMap;

use parking_lot::RwLock;

/// One registered replica.
///
/// `private_addr` is dialed by the coordinator; `public_addr` by clients and
/// peer replicas pulling bootstrap data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaInfo {
    pub alias: String,
    pub private_addr: String,
    pub public_addr: String,
}

/// Alias-keyed registry. The most recent registration for an alias wins.
///
/// Reads take the lock too; placement and discovery work on snapshots so no
/// lock is held across RPC calls.
#[derive(Default)]
pub struct ReplicaRegistry {
    inner: RwLock<HashMap<String, ReplicaInfo>>,
}

impl ReplicaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `info.alias`.
    pub fn upsert(&self, info: ReplicaInfo) {
        self.inner.write().insert(info.alias.clone(), info);
    }

    pub fn get(&self, alias: &str) -> Option<ReplicaInfo> {
        self.inner.read().get(alias).cloned()
    }

    /// All entries at this instant.
    pub fn snapshot(&self) -> Vec<ReplicaInfo> {
        self.inner.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
