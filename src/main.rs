//! Globals Watch - Binary Entry Point
//!
//! ```text
//! globals-server [monitor|import|stats] [config.yaml]
//! ```
//!
//! - `monitor` (default): watch the chat log, optionally serving the web API
//! - `import`: ingest what is new in the chat log once and exit
//! - `stats`: print the stats report for the configured player

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use globals_watch::api;
use globals_watch::capture::{ScreenshotManager, UnsupportedCapture};
use globals_watch::logging::init_logging;
use globals_watch::{
    Config, GlobalStore, GlobalsResult, HubRegistry, NewRecordHandler, SharedStore, Watcher,
};

const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Monitor,
    Import,
    Stats,
}

fn parse_args() -> (Mode, PathBuf) {
    let mut mode = Mode::Monitor;
    let mut config = PathBuf::from(DEFAULT_CONFIG);

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "monitor" => mode = Mode::Monitor,
            "import" => mode = Mode::Import,
            "stats" => mode = Mode::Stats,
            path => config = PathBuf::from(path),
        }
    }
    (mode, config)
}

#[tokio::main]
async fn main() -> GlobalsResult<()> {
    init_logging();

    let (mode, config_path) = parse_args();
    let config = Config::load(&config_path)?;
    info!(
        name = globals_watch::NAME,
        version = globals_watch::VERSION,
        ?mode,
        config = %config_path.display(),
        "starting"
    );

    let store = load_store(&config)?;

    match mode {
        Mode::Stats => print_stats(&config, &store),
        Mode::Import => import(&config, store).await,
        Mode::Monitor => monitor(&config, store).await,
    }
}

/// Load the persisted store and scope it to the configured player/team
fn load_store(config: &Config) -> GlobalsResult<SharedStore> {
    let mut store = GlobalStore::load(&config.database_path)?;
    store.set_filters(globals_watch::Filters::new(config.player(), config.team()));
    info!(
        globals = store.len(),
        offset = store.last_processed_offset(),
        "store loaded"
    );
    Ok(store.into_shared())
}

fn print_stats(config: &Config, store: &SharedStore) -> GlobalsResult<()> {
    let player = config.require_player()?;
    let stats = store.read().stats();
    println!("{}", stats.format_report(player, config.team().unwrap_or("")));
    Ok(())
}

async fn import(config: &Config, store: SharedStore) -> GlobalsResult<()> {
    let chat_log = config.require_chat_log()?;
    let watcher = Watcher::new(chat_log, store).with_store_path(&config.database_path);
    let added = watcher.process_once().await?;
    println!("Imported {added} new globals from {}", chat_log.display());
    Ok(())
}

async fn monitor(config: &Config, store: SharedStore) -> GlobalsResult<()> {
    let chat_log = config.require_chat_log()?;
    let shutdown = CancellationToken::new();

    let on_signal = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || on_signal.cancel()) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let registry = Arc::new(HubRegistry::new());

    let server = config.enable_web_server.then(|| {
        let port = config.web_server_port;
        let store = store.clone();
        let registry = Arc::clone(&registry);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = api::serve(port, store, registry, shutdown).await {
                error!(port, error = %e, "web server failed");
            }
        })
    });

    let mut handler = NewRecordHandler::new(store.clone(), Arc::clone(&registry))
        .with_store_path(&config.database_path);
    if config.enable_screenshots {
        let manager = ScreenshotManager::new(
            Box::new(UnsupportedCapture),
            &config.screenshot_directory,
            &config.game_window_title,
        );
        info!(
            enabled = manager.is_enabled(),
            directory = %manager.directory().display(),
            delay = config.screenshot_delay,
            "screenshots on; this build has no capture backend, captures will be skipped"
        );
        handler = handler.with_screenshots(Arc::new(manager), config.screenshot_delay());
    }

    let (progress_tx, mut progress_rx) = mpsc::channel(8);
    tokio::spawn(async move {
        while let Some(fraction) = progress_rx.recv().await {
            debug!(progress = fraction, "scanning chat log");
        }
    });

    let watcher = Watcher::new(chat_log, store)
        .with_interval(config.watch_interval())
        .with_store_path(&config.database_path)
        .with_progress(progress_tx)
        .with_handler(Arc::new(handler))
        .with_stop_token(shutdown.clone());

    watcher.run().await?;
    shutdown.cancel();

    if let Some(server) = server {
        let _ = server.await;
    }
    Ok(())
}
