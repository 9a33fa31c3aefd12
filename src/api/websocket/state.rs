//! Shared state for the HTTP and WebSocket handlers

use std::sync::Arc;

use super::hub::BroadcastHub;
use crate::store::SharedStore;

/// Shared application state for the router
pub struct AppState {
    /// The globals store, also written by the watcher
    pub store: SharedStore,

    /// Hub live connections subscribe to
    pub hub: Arc<BroadcastHub>,
}

impl AppState {
    pub fn new(store: SharedStore, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }
}
