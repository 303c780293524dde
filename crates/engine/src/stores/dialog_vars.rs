//! Free-text answers remembered for reuse in later dialogs.

use std::time::Duration;

use iobj_domain::{ObjectId, PlayerId};

use crate::infrastructure::cache::TtlCache;

type DialogVarKey = (PlayerId, ObjectId, String);

/// Dialog variables scoped by `(player, owning object, name)`.
///
/// Entries expire after the TTL, the store never holds more than its capacity,
/// and everything for a player is dropped when their session ends.
pub struct DialogVarStore {
    entries: TtlCache<DialogVarKey, String>,
}

impl DialogVarStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: TtlCache::with_capacity(ttl, capacity),
        }
    }

    pub async fn get(&self, player_id: &PlayerId, owner: &ObjectId, name: &str) -> Option<String> {
        self.entries
            .get(&(player_id.clone(), owner.clone(), name.to_string()))
            .await
    }

    pub async fn set(&self, player_id: &PlayerId, owner: &ObjectId, name: &str, value: String) {
        self.entries
            .insert((player_id.clone(), owner.clone(), name.to_string()), value)
            .await;
    }

    /// Forget everything stored for a player.
    pub async fn end_session(&self, player_id: &PlayerId) -> usize {
        let removed = self
            .entries
            .remove_where(|(player, _, _)| player == player_id)
            .await;
        if removed > 0 {
            tracing::debug!(player_id = %player_id, removed, "Dropped dialog variables");
        }
        removed
    }

    pub async fn cleanup_expired(&self) -> usize {
        self.entries.cleanup_expired().await
    }
}

impl Default for DialogVarStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), 10_000)
    }
}
