use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod handlers;
pub mod message_types;

/// Fan-out hub for live connections.
///
/// One outbound channel per connection; delivery is best-effort. A send to a
/// connection whose receiver has been dropped is ignored and never blocks
/// delivery to the rest.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    // connection_id -> outbound channel sender
    inner: Arc<RwLock<HashMap<Uuid, UnboundedSender<String>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and hand back the receiving end of its
    /// outbound channel.
    pub async fn register(&self, connection_id: Uuid) -> UnboundedReceiver<String> {
        let (tx, rx) = unbounded_channel();
        self.inner.write().await.insert(connection_id, tx);
        rx
    }

    pub async fn unregister(&self, connection_id: Uuid) {
        self.inner.write().await.remove(&connection_id);
    }

    /// Deliver to every connection, the originator included.
    pub async fn broadcast_all(&self, text: &str) {
        let guard = self.inner.read().await;
        for sender in guard.values() {
            let _ = sender.send(text.to_string());
        }
    }

    /// Deliver to every connection except `origin`.
    pub async fn broadcast_others(&self, origin: Uuid, text: &str) {
        let guard = self.inner.read().await;
        for (id, sender) in guard.iter() {
            if *id != origin {
                let _ = sender.send(text.to_string());
            }
        }
    }

    /// Deliver to a single connection. Used for history replay on join.
    pub async fn emit_to(&self, connection_id: Uuid, text: &str) {
        let guard = self.inner.read().await;
        if let Some(sender) = guard.get(&connection_id) {
            let _ = sender.send(text.to_string());
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Mapping from live connection to chosen nickname.
///
/// A connection only appears here once it has set a nickname, so the value
/// snapshot is exactly the roster broadcast to clients.
#[derive(Default, Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, String>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Nickname content is not validated; the protocol
    /// is deliberately permissive here.
    pub async fn set(&self, connection_id: Uuid, nickname: String) {
        self.inner.write().await.insert(connection_id, nickname);
    }

    /// Returns the removed nickname so the caller knows whether the
    /// connection was ever named. No-op for unnamed connections.
    pub async fn remove(&self, connection_id: Uuid) -> Option<String> {
        self.inner.write().await.remove(&connection_id)
    }

    pub async fn get(&self, connection_id: Uuid) -> Option<String> {
        self.inner.read().await.get(&connection_id).cloned()
    }

    pub async fn list_nicknames(&self) -> Vec<String> {
        self.inner.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_all_reaches_every_connection() {
        let registry = ConnectionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = registry.register(a).await;
        let mut rx_b = registry.register(b).await;

        registry.broadcast_all("hello").await;

        assert_eq!(rx_a.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx_b.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn broadcast_others_skips_originator() {
        let registry = ConnectionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = registry.register(a).await;
        let mut rx_b = registry.register(b).await;

        registry.broadcast_others(a, "typing").await;

        assert_eq!(rx_b.recv().await.as_deref(), Some("typing"));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn emit_to_targets_one_connection() {
        let registry = ConnectionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = registry.register(a).await;
        let mut rx_b = registry.register(b).await;

        registry.emit_to(a, "history").await;

        assert_eq!(rx_a.recv().await.as_deref(), Some("history"));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_block_others() {
        let registry = ConnectionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rx_a = registry.register(a).await;
        let mut rx_b = registry.register(b).await;
        drop(rx_a);

        registry.broadcast_all("still delivered").await;

        assert_eq!(rx_b.recv().await.as_deref(), Some("still delivered"));
    }

    #[tokio::test]
    async fn unregister_removes_connection() {
        let registry = ConnectionRegistry::new();
        let a = Uuid::new_v4();
        let _rx = registry.register(a).await;
        assert_eq!(registry.len().await, 1);
        registry.unregister(a).await;
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn roster_returns_after_disconnect_to_prior_state() {
        let sessions = SessionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        sessions.set(a, "Ann".into()).await;
        let before = {
            let mut v = sessions.list_nicknames().await;
            v.sort();
            v
        };

        sessions.set(b, "Ben".into()).await;
        assert_eq!(sessions.remove(b).await.as_deref(), Some("Ben"));

        let mut after = sessions.list_nicknames().await;
        after.sort();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn remove_of_unnamed_connection_is_noop() {
        let sessions = SessionRegistry::new();
        assert_eq!(sessions.remove(Uuid::new_v4()).await, None);
        assert!(sessions.list_nicknames().await.is_empty());
    }

    #[tokio::test]
    async fn each_named_session_contributes_one_roster_entry() {
        let sessions = SessionRegistry::new();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            sessions.set(*id, format!("user-{i}")).await;
        }
        assert_eq!(sessions.list_nicknames().await.len(), 5);

        // Renaming overwrites, it never duplicates.
        sessions.set(ids[0], "renamed".into()).await;
        let roster = sessions.list_nicknames().await;
        assert_eq!(roster.len(), 5);
        assert!(roster.contains(&"renamed".to_string()));
        assert!(!roster.contains(&"user-0".to_string()));
    }
}
