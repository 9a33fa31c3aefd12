//! Hub registry keyed by server port
//!
//! Created once by the binary and shared by `Arc`. A hub stays registered
//! until its web server shuts down and calls [`HubRegistry::unregister`];
//! tasks still holding an `Arc` to it keep it alive until they finish.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;

use super::events::LiveEvent;
use super::hub::BroadcastHub;

#[derive(Default)]
pub struct HubRegistry {
    hubs: RwLock<HashMap<u16, Arc<BroadcastHub>>>,
}

impl HubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hub registered for `port`, creating it on first use
    pub fn get_or_create(&self, port: u16) -> Arc<BroadcastHub> {
        if let Some(hub) = self.hubs.read().get(&port) {
            return Arc::clone(hub);
        }
        Arc::clone(self.hubs.write().entry(port).or_default())
    }

    pub fn get(&self, port: u16) -> Option<Arc<BroadcastHub>> {
        self.hubs.read().get(&port).cloned()
    }

    pub fn unregister(&self, port: u16) -> Option<Arc<BroadcastHub>> {
        self.hubs.write().remove(&port)
    }

    pub fn len(&self) -> usize {
        self.hubs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.read().is_empty()
    }

    /// Broadcast `event` through every registered hub
    pub fn broadcast_all(&self, event: &LiveEvent) -> Vec<JoinHandle<()>> {
        let hubs: Vec<Arc<BroadcastHub>> = self.hubs.read().values().cloned().collect();
        hubs.iter().flat_map(|hub| hub.broadcast(event)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatsSnapshot;

    #[test]
    fn test_get_or_create_reuses_hub() {
        let registry = HubRegistry::new();
        let first = registry.get_or_create(8080);
        let second = registry.get_or_create(8080);
        let other = registry.get_or_create(9090);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister() {
        let registry = HubRegistry::new();
        registry.get_or_create(8080);

        assert!(registry.unregister(8080).is_some());
        assert!(registry.get(8080).is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_all_without_subscribers() {
        let registry = HubRegistry::new();
        registry.get_or_create(8080);
        let handles = registry.broadcast_all(&LiveEvent::StatsUpdate(StatsSnapshot::default()));
        assert!(handles.is_empty());
    }
}
