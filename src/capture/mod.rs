//! Screenshot capture for new globals
//!
//! The actual window grab is platform specific and lives behind
//! [`ScreenCapture`]. [`ScreenshotManager`] adds the parts that are the same
//! everywhere: file naming, the enabled switch and a minimum gap between
//! two captures.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Local;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::CaptureError;
use crate::types::GlobalEntry;

/// Two captures closer together than this are refused
pub const MIN_CAPTURE_GAP: Duration = Duration::from_secs(2);

/// Platform backend that grabs a window and writes it to `output`.
///
/// Returns the full title of the captured window.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    async fn capture(&self, window_title_prefix: &str, output: &Path)
        -> Result<String, CaptureError>;
}

/// Backend for platforms without window capture
pub struct UnsupportedCapture;

#[async_trait]
impl ScreenCapture for UnsupportedCapture {
    async fn capture(&self, _: &str, _: &Path) -> Result<String, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

/// A saved screenshot
#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    pub path: PathBuf,
    pub window_title: String,
}

impl Screenshot {
    /// Location shown in the window title, if any
    pub fn location(&self) -> Option<String> {
        extract_location_from_title(&self.window_title)
    }
}

pub struct ScreenshotManager {
    backend: Box<dyn ScreenCapture>,
    directory: PathBuf,
    window_title: String,
    enabled: bool,
    last_capture: Mutex<Option<Instant>>,
}

impl ScreenshotManager {
    pub fn new(
        backend: Box<dyn ScreenCapture>,
        directory: impl Into<PathBuf>,
        window_title: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            directory: directory.into(),
            window_title: window_title.into(),
            enabled: true,
            last_capture: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Capture the game window for `entry`
    pub async fn capture_for(&self, entry: &GlobalEntry) -> Result<Screenshot, CaptureError> {
        if !self.enabled {
            return Err(CaptureError::Disabled);
        }

        if matches!(*self.last_capture.lock(), Some(at) if at.elapsed() < MIN_CAPTURE_GAP) {
            return Err(CaptureError::RateLimited);
        }

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| CaptureError::Failed(e.to_string()))?;

        let file_name = format!(
            "{}_{}.png",
            file_prefix(entry),
            Local::now().format("%Y-%m-%d_%H-%M-%S")
        );
        let path = self.directory.join(file_name);
        let window_title = self.backend.capture(&self.window_title, &path).await?;

        *self.last_capture.lock() = Some(Instant::now());
        debug!(path = %path.display(), title = %window_title, "screenshot saved");

        Ok(Screenshot { path, window_title })
    }
}

/// `{hof|global}_{kind}_{actor}` with spaces in the actor replaced by `_`
pub fn file_prefix(entry: &GlobalEntry) -> String {
    let category = if entry.is_hof { "hof" } else { "global" };
    format!(
        "{category}_{}_{}",
        entry.kind,
        entry.actor().replace(' ', "_")
    )
}

/// Text inside the last pair of parentheses of a window title.
///
/// `Entropia Universe Client (64 bit) [Calypso] (Twin Peaks)` yields
/// `Twin Peaks`.
pub fn extract_location_from_title(title: &str) -> Option<String> {
    let close = title.rfind(')')?;
    let open = title[..close].rfind('(')?;
    let location = title[open + 1..close].trim();
    (!location.is_empty()).then(|| location.to_string())
}
