//! Watch loop driving the processor
//!
//! ```text
//! Idle -> Scanning -> Watching -> Stopped
//! ```
//!
//! The first pass scans the whole log when the store has never seen it and
//! resumes from the stored offset otherwise. Every tick then runs an
//! offset-based pass, persists the store and hands new records to the
//! [`NewRecordHandler`]. A failed pass is logged and retried on the next tick.
//!
//! Stopping cancels a [`CancellationToken`], so any number of stop requests
//! from any task are safe.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{LogProcessor, NewRecordHandler, PassOutcome, ProgressSink};
use crate::error::{GlobalsError, GlobalsResult, ProcessError};
use crate::store::{Filters, SharedStore};

/// Default poll interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Scanning,
    Watching,
    Stopped,
}

pub struct Watcher {
    log_path: PathBuf,
    processor: LogProcessor,
    store_path: Option<PathBuf>,
    interval: Duration,
    handler: Option<Arc<NewRecordHandler>>,
    state: Mutex<WatchState>,
    cancel: CancellationToken,
}

impl Watcher {
    pub fn new(log_path: impl Into<PathBuf>, store: SharedStore) -> Self {
        Self {
            log_path: log_path.into(),
            processor: LogProcessor::new(store),
            store_path: None,
            interval: DEFAULT_INTERVAL,
            handler: None,
            state: Mutex::new(WatchState::Idle),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Save the store to `path` after every pass
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.processor = self.processor.with_progress(sink);
        self
    }

    /// Stop when `token` is cancelled
    pub fn with_stop_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_handler(mut self, handler: Arc<NewRecordHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn state(&self) -> WatchState {
        *self.state.lock()
    }

    /// Token cancelled when the watcher stops; clones can stop it too
    pub fn stop_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request a stop. Calling this again has no effect.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!(path = %self.log_path.display(), "stopping chat log watcher");
        }
        self.cancel.cancel();
    }

    /// Replace the store's player/team filters.
    ///
    /// Applies to records ingested from now on; the stored records and the
    /// offset are left as they are.
    pub fn update_filters(&self, player: Option<&str>, team: Option<&str>) {
        let filters = Filters::new(player, team);
        debug!(?filters, "updating filters");
        self.processor.store().write().set_filters(filters);
    }

    /// Import mode: one pass over whatever is new, then persist.
    ///
    /// Returns the number of records added. No live events or screenshots.
    pub async fn process_once(&self) -> GlobalsResult<usize> {
        let outcome = self.run_pass().await?;
        self.persist().await;
        info!(added = outcome.added.len(), "import finished");
        Ok(outcome.added.len())
    }

    /// Run until [`stop`](Self::stop) is called
    pub async fn run(&self) -> GlobalsResult<()> {
        if self.cancel.is_cancelled() {
            self.set_state(WatchState::Stopped);
            return Ok(());
        }

        self.set_state(WatchState::Scanning);
        info!(path = %self.log_path.display(), "initial scan of chat log");
        match self.run_pass().await {
            Ok(outcome) => {
                info!(added = outcome.added.len(), offset = outcome.offset, "initial scan finished");
                self.persist().await;
            }
            Err(e) => error!(error = %e, "initial scan failed, will retry"),
        }

        self.set_state(WatchState::Watching);
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately and the initial scan just ran
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.run_pass().await {
                        Ok(outcome) => {
                            self.persist().await;
                            if !outcome.added.is_empty() {
                                info!(added = outcome.added.len(), "new globals");
                                if let Some(handler) = &self.handler {
                                    handler.handle(&outcome.added);
                                }
                            }
                        }
                        Err(e) => warn!(error = %e, "chat log pass failed, retrying next tick"),
                    }
                }
            }
        }

        self.set_state(WatchState::Stopped);
        info!("chat log watcher stopped");
        Ok(())
    }

    fn set_state(&self, state: WatchState) {
        *self.state.lock() = state;
    }

    /// Full scan for a store that never saw the log, offset-based otherwise
    async fn run_pass(&self) -> GlobalsResult<PassOutcome> {
        let processor = self.processor.clone();
        let path = self.log_path.clone();

        let outcome = task::spawn_blocking(move || -> Result<PassOutcome, ProcessError> {
            let never_scanned = processor.store().read().is_never_scanned();
            if never_scanned {
                let before = processor.store().read().len();
                processor.process_full(&path)?;
                let store = processor.store().read();
                Ok(PassOutcome {
                    added: store.entries()[before..].to_vec(),
                    offset: store.last_processed_offset(),
                    rescanned: false,
                })
            } else {
                processor.process_new(&path)
            }
        })
        .await
        .map_err(|e| GlobalsError::Io(std::io::Error::other(e)))??;

        Ok(outcome)
    }

    async fn persist(&self) {
        let Some(path) = self.store_path.clone() else {
            return;
        };
        let store = self.processor.store().clone();

        let result = task::spawn_blocking(move || store.read().save(&path)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "failed to save store"),
            Err(e) => error!(error = %e, "store save task failed"),
        }
    }
}
