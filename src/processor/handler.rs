//! Side effects of newly ingested globals
//!
//! Live events go out through every hub in the registry. Screenshots run in
//! their own tasks after a delay and may still finish after the watcher
//! stopped.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::websocket::{HubRegistry, LiveEvent};
use crate::capture::ScreenshotManager;
use crate::store::SharedStore;
use crate::types::GlobalEntry;

pub struct NewRecordHandler {
    store: SharedStore,
    registry: Arc<HubRegistry>,
    store_path: Option<PathBuf>,
    screenshots: Option<Arc<ScreenshotManager>>,
    screenshot_delay: Duration,
}

impl NewRecordHandler {
    pub fn new(store: SharedStore, registry: Arc<HubRegistry>) -> Self {
        Self {
            store,
            registry,
            store_path: None,
            screenshots: None,
            screenshot_delay: Duration::ZERO,
        }
    }

    /// Persist the store here after a screenshot updated a location
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn with_screenshots(mut self, manager: Arc<ScreenshotManager>, delay: Duration) -> Self {
        self.screenshots = Some(manager);
        self.screenshot_delay = delay;
        self
    }

    /// Announce each new record followed by fresh stats, and schedule
    /// screenshots for the ones that qualify.
    ///
    /// Must be called inside a tokio runtime.
    pub fn handle(&self, added: &[GlobalEntry]) {
        if added.is_empty() {
            return;
        }

        let filters = self.store.read().filters();

        for entry in added {
            if let Some(manager) = self.screenshots.as_ref().filter(|m| m.is_enabled()) {
                if entry.is_hof || filters.is_empty() || filters.accepts(entry) {
                    self.schedule_screenshot(Arc::clone(manager), entry.clone());
                }
            }

            self.registry.broadcast_all(&LiveEvent::for_entry(entry.clone()));
            let stats = self.store.read().stats();
            self.registry.broadcast_all(&LiveEvent::StatsUpdate(stats));
        }
    }

    fn schedule_screenshot(&self, manager: Arc<ScreenshotManager>, entry: GlobalEntry) {
        let store = self.store.clone();
        let registry = Arc::clone(&self.registry);
        let store_path = self.store_path.clone();
        let delay = self.screenshot_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let shot = match manager.capture_for(&entry).await {
                Ok(shot) => shot,
                Err(e) => {
                    warn!(error = %e, item = %entry.target, "screenshot failed");
                    return;
                }
            };
            info!(path = %shot.path.display(), "screenshot taken");

            let Some(location) = shot.location() else {
                return;
            };
            if !store.write().update_location(&entry.raw_message, &location) {
                return;
            }
            debug!(%location, raw = %entry.raw_message, "location taken from window title");

            if let Some(path) = &store_path {
                let saved = store.read().save(path);
                if let Err(e) = saved {
                    warn!(error = %e, "failed to save store after location update");
                }
            }

            let stats = store.read().stats();
            registry.broadcast_all(&LiveEvent::StatsUpdate(stats));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::websocket::LiveSink;
    use crate::capture::ScreenCapture;
    use crate::error::{CaptureError, DeliveryError};
    use crate::store::GlobalStore;
    use crate::types::GlobalKind;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct Collect(Arc<parking_lot::Mutex<Vec<String>>>);

    #[async_trait]
    impl LiveSink for Collect {
        async fn send_text(&mut self, text: String) -> Result<(), DeliveryError> {
            self.0.lock().push(text);
            Ok(())
        }

        async fn close(&mut self) {}
    }

    struct TitleCapture;

    #[async_trait]
    impl ScreenCapture for TitleCapture {
        async fn capture(&self, _: &str, _: &Path) -> Result<String, CaptureError> {
            Ok("Entropia Universe Client (Twin Peaks)".to_string())
        }
    }

    struct CountingCapture(Arc<AtomicUsize>);

    #[async_trait]
    impl ScreenCapture for CountingCapture {
        async fn capture(&self, _: &str, _: &Path) -> Result<String, CaptureError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok("Entropia Universe Client".to_string())
        }
    }

    fn event_types(received: &parking_lot::Mutex<Vec<String>>) -> Vec<String> {
        received
            .lock()
            .iter()
            .map(|text| {
                let json: serde_json::Value = serde_json::from_str(text).unwrap();
                json["type"].as_str().unwrap().to_string()
            })
            .collect()
    }

    fn hof_entry() -> GlobalEntry {
        let mut entry = GlobalEntry::new(Utc::now(), GlobalKind::Kill, "Atrox", 900.0, "hof line");
        entry.player = "John Doe".to_string();
        entry.is_hof = true;
        entry
    }

    async fn wait_until(done: impl Fn() -> bool) {
        for _ in 0..200 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_events_are_broadcast_in_order() {
        let store = GlobalStore::default().into_shared();
        let registry = Arc::new(HubRegistry::new());
        let received = Arc::new(parking_lot::Mutex::new(Vec::new()));
        registry
            .get_or_create(8080)
            .subscribe(Box::new(Collect(Arc::clone(&received))));

        let mut global = hof_entry();
        global.is_hof = false;
        global.raw_message = "global line".to_string();
        let added = vec![global, hof_entry()];
        for entry in &added {
            store.write().append(entry.clone());
        }

        NewRecordHandler::new(store, registry).handle(&added);
        wait_until(|| received.lock().len() == 4).await;

        assert_eq!(
            event_types(&received),
            ["new_global", "stats_update", "new_hof", "stats_update"]
        );
    }

    #[tokio::test]
    async fn test_screenshot_location_updates_store() {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("db.yaml");
        let store = GlobalStore::default().into_shared();
        let entry = hof_entry();
        store.write().append(entry.clone());

        let manager = Arc::new(ScreenshotManager::new(
            Box::new(TitleCapture),
            dir.path().join("shots"),
            "Entropia Universe Client",
        ));
        let handler = NewRecordHandler::new(store.clone(), Arc::new(HubRegistry::new()))
            .with_store_path(&store_path)
            .with_screenshots(manager, Duration::ZERO);

        handler.handle(&[entry]);
        wait_until(|| store_path.exists()).await;

        assert_eq!(store.read().entries()[0].location, "Twin Peaks");
        let saved = GlobalStore::load(&store_path).unwrap();
        assert_eq!(saved.entries()[0].location, "Twin Peaks");
    }

    #[tokio::test]
    async fn test_disabled_manager_schedules_nothing() {
        let dir = TempDir::new().unwrap();
        let captures = Arc::new(AtomicUsize::new(0));
        let mut manager = ScreenshotManager::new(
            Box::new(CountingCapture(Arc::clone(&captures))),
            dir.path().join("shots"),
            "Entropia Universe Client",
        );
        manager.set_enabled(false);
        assert!(!manager.is_enabled());
        let shots = manager.directory().to_path_buf();

        let store = GlobalStore::default().into_shared();
        let handler = NewRecordHandler::new(store, Arc::new(HubRegistry::new()))
            .with_screenshots(Arc::new(manager), Duration::ZERO);

        handler.handle(&[hof_entry()]);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(captures.load(Ordering::SeqCst), 0);
        assert!(!shots.exists());
    }
}
