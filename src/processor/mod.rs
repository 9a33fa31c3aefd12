//! Incremental chat log processor
//!
//! A pass reads the log from a byte offset up to the file size observed when
//! the pass started, parses each line and keeps the records accepted by the
//! store's filters. A trailing line without its newline is still being
//! written; the pass stops before it and the stored offset points at its
//! first byte. Parsing happens without holding the store lock; the lock
//! is only taken to commit the records and the new offset.
//!
//! # Offsets
//!
//! - `process_full` always starts at byte 0 and appends.
//! - `process_from_offset` trusts the caller that `offset` is a line boundary.
//! - `process_new` resumes from the store's own offset. When the file shrank
//!   below that offset it is treated as rotated: the whole file is rescanned
//!   and only records not already stored are inserted.

mod handler;
mod watcher;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::parser::parse_line;
use crate::store::SharedStore;
use crate::types::GlobalEntry;

pub use handler::NewRecordHandler;
pub use watcher::{WatchState, Watcher};

/// Best-effort progress channel; values are fractions in `0.0..=1.0`
pub type ProgressSink = mpsc::Sender<f64>;

/// Lines between two progress updates
const PROGRESS_EVERY: usize = 200;

/// Result of one offset-based pass
#[derive(Debug, Default)]
pub struct PassOutcome {
    /// Records committed to the store, in log order
    pub added: Vec<GlobalEntry>,
    /// Offset stored after the pass
    pub offset: u64,
    /// True when the file had shrunk and was rescanned from the start
    pub rescanned: bool,
}

/// Parsed records of one scan, not yet committed
struct Scan {
    entries: Vec<GlobalEntry>,
    end: u64,
}

/// Feeds chat log lines into a shared store
#[derive(Clone)]
pub struct LogProcessor {
    store: SharedStore,
    progress: Option<ProgressSink>,
}

impl LogProcessor {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            progress: None,
        }
    }

    /// Report scan progress to `sink`; updates are dropped when it is full
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Scan the whole file and append every accepted record.
    ///
    /// Returns the number of records appended.
    pub fn process_full<P: AsRef<Path>>(&self, path: P) -> Result<usize, ProcessError> {
        self.process_from_offset(path, 0)
    }

    /// Scan from `offset` to the end of the file and append accepted records.
    ///
    /// Returns the number of records appended.
    pub fn process_from_offset<P: AsRef<Path>>(
        &self,
        path: P,
        offset: u64,
    ) -> Result<usize, ProcessError> {
        let scan = self.scan(path.as_ref(), offset)?;
        let count = scan.entries.len();

        let mut store = self.store.write();
        for entry in scan.entries {
            store.append(entry);
        }
        store.mark_processed(scan.end);

        Ok(count)
    }

    /// Resume from the store's offset, handling truncated logs
    pub fn process_new<P: AsRef<Path>>(&self, path: P) -> Result<PassOutcome, ProcessError> {
        let path = path.as_ref();
        let offset = self.store.read().last_processed_offset();
        let size = file_size(path)?;

        if size < offset {
            warn!(
                path = %path.display(),
                size,
                offset,
                "chat log is smaller than the last processed offset, rescanning"
            );
            let scan = self.scan(path, 0)?;
            let mut store = self.store.write();
            let added = store.insert_unique(scan.entries);
            store.mark_processed(scan.end);
            return Ok(PassOutcome {
                added,
                offset: scan.end,
                rescanned: true,
            });
        }

        let scan = self.scan(path, offset)?;
        let mut store = self.store.write();
        for entry in &scan.entries {
            store.append(entry.clone());
        }
        store.mark_processed(scan.end);

        Ok(PassOutcome {
            added: scan.entries,
            offset: scan.end,
            rescanned: false,
        })
    }

    /// Parse `[offset, size)` of the file without touching the store
    fn scan(&self, path: &Path, offset: u64) -> Result<Scan, ProcessError> {
        let size = file_size(path)?;
        let filters = self.store.read().filters();

        if offset >= size {
            return Ok(Scan {
                entries: Vec::new(),
                end: size,
            });
        }

        let mut file = File::open(path).map_err(|source| ProcessError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|source| ProcessError::Seek { offset, source })?;

        let total = size - offset;
        let mut reader = BufReader::new(file.take(total));
        let mut buf = Vec::new();
        let mut consumed = 0u64;
        let mut line_no = 0usize;
        let mut entries = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(ProcessError::Read)?;
            if read == 0 {
                break;
            }
            if buf.last() != Some(&b'\n') {
                debug!(offset = offset + consumed, "leaving unterminated line for the next pass");
                break;
            }
            consumed += read as u64;
            line_no += 1;

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);

            match parse_line(line) {
                Ok(Some(entry)) if filters.accepts(&entry) => entries.push(entry),
                Ok(_) => {}
                Err(e) => warn!(line = line_no, error = %e, "skipping malformed global"),
            }

            if line_no % PROGRESS_EVERY == 0 {
                self.report_progress(consumed, total);
            }
        }

        self.report_progress(consumed, total);
        debug!(
            path = %path.display(),
            offset,
            lines = line_no,
            accepted = entries.len(),
            "scan finished"
        );

        Ok(Scan {
            entries,
            end: offset + consumed,
        })
    }

    fn report_progress(&self, consumed: u64, total: u64) {
        if let Some(sink) = &self.progress {
            let fraction = if total == 0 {
                1.0
            } else {
                consumed as f64 / total as f64
            };
            let _ = sink.try_send(fraction.min(1.0));
        }
    }
}

fn file_size(path: &Path) -> Result<u64, ProcessError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ProcessError::NotFound(PathBuf::from(path)))
        }
        Err(source) => Err(ProcessError::Stat {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GlobalStore;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEAM_KILL: &str = "2025-05-16 10:00:00 [Globals] [] Team \"Alpha Team\" killed a creature (Atrox) with a value of 100 PED";
    const PLAYER_KILL: &str = "2025-05-16 10:01:00 [Globals] [] John Doe killed a creature (Argonaut) with a value of 55 PED at Cape Corinth!";
    const CHAT: &str = "2025-05-16 10:02:00 [Main] [John Doe] hello";

    fn log_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_process_full_counts_and_offset() {
        let file = log_file(&[TEAM_KILL, CHAT, PLAYER_KILL]);
        let store = GlobalStore::default().into_shared();
        let processor = LogProcessor::new(store.clone());

        assert_eq!(processor.process_full(file.path()).unwrap(), 2);

        let store = store.read();
        assert_eq!(store.len(), 2);
        let size = fs::metadata(file.path()).unwrap().len();
        assert_eq!(store.last_processed_offset(), size);
        assert!(store.last_processed_at().is_some());
    }

    #[test]
    fn test_crlf_lines() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{TEAM_KILL}\r\n{PLAYER_KILL}\r\n").unwrap();
        let store = GlobalStore::default().into_shared();

        LogProcessor::new(store.clone()).process_full(file.path()).unwrap();
        let store = store.read();
        assert_eq!(store.entries()[1].location, "Cape Corinth");
        assert_eq!(store.entries()[0].raw_message, TEAM_KILL);
    }

    #[test]
    fn test_malformed_timestamp_is_skipped() {
        let file = log_file(&[
            "yesterday noon [Globals] [] John Doe killed a creature (Atrox) with a value of 5 PED",
            PLAYER_KILL,
        ]);
        let store = GlobalStore::default().into_shared();
        assert_eq!(LogProcessor::new(store).process_full(file.path()).unwrap(), 1);
    }

    #[test]
    fn test_player_filter_applies_at_ingestion() {
        let file = log_file(&[TEAM_KILL, PLAYER_KILL]);
        let store = GlobalStore::new(Some("john doe"), None).into_shared();

        LogProcessor::new(store.clone()).process_full(file.path()).unwrap();
        let store = store.read();
        assert_eq!(store.len(), 1);
        assert!(store.entries().iter().all(|e| !e.player.is_empty()));
    }

    #[test]
    fn test_process_new_only_reads_appended_lines() {
        let mut file = log_file(&[TEAM_KILL]);
        let store = GlobalStore::default().into_shared();
        let processor = LogProcessor::new(store.clone());

        assert_eq!(processor.process_new(file.path()).unwrap().added.len(), 1);
        assert!(processor.process_new(file.path()).unwrap().added.is_empty());

        writeln!(file, "{PLAYER_KILL}").unwrap();
        file.flush().unwrap();

        let outcome = processor.process_new(file.path()).unwrap();
        assert_eq!(outcome.added.len(), 1);
        assert_eq!(outcome.added[0].player, "John Doe");
        assert!(!outcome.rescanned);
        assert_eq!(store.read().len(), 2);
    }

    #[test]
    fn test_truncated_log_is_rescanned_without_duplicates() {
        let file = log_file(&[TEAM_KILL, PLAYER_KILL, CHAT]);
        let store = GlobalStore::default().into_shared();
        let processor = LogProcessor::new(store.clone());
        processor.process_new(file.path()).unwrap();

        fs::write(file.path(), format!("{PLAYER_KILL}\n")).unwrap();
        let outcome = processor.process_new(file.path()).unwrap();

        assert!(outcome.rescanned);
        assert!(outcome.added.is_empty());
        assert_eq!(store.read().len(), 2);
        assert_eq!(outcome.offset, fs::metadata(file.path()).unwrap().len());
    }

    #[test]
    fn test_offset_past_end_stores_file_size() {
        let file = log_file(&[TEAM_KILL, PLAYER_KILL]);
        let size = fs::metadata(file.path()).unwrap().len();
        let store = GlobalStore::default().into_shared();
        let processor = LogProcessor::new(store.clone());

        assert_eq!(processor.process_from_offset(file.path(), 10_000).unwrap(), 0);
        assert_eq!(store.read().last_processed_offset(), size);

        let outcome = processor.process_new(file.path()).unwrap();
        assert!(!outcome.rescanned);
        assert!(outcome.added.is_empty());
    }

    #[test]
    fn test_unterminated_line_waits_for_next_pass() {
        let (head, tail) = PLAYER_KILL.split_at(PLAYER_KILL.find("55 PED").unwrap() + 1);
        let mut file = log_file(&[TEAM_KILL]);
        write!(file, "{head}").unwrap();
        file.flush().unwrap();

        let store = GlobalStore::default().into_shared();
        let processor = LogProcessor::new(store.clone());
        let first = processor.process_new(file.path()).unwrap();
        assert_eq!(first.added.len(), 1);
        assert_eq!(first.offset, TEAM_KILL.len() as u64 + 1);

        writeln!(file, "{tail}").unwrap();
        file.flush().unwrap();

        let second = processor.process_new(file.path()).unwrap();
        assert_eq!(second.added.len(), 1);
        assert_eq!(second.added[0].raw_message, PLAYER_KILL);
        assert_eq!(second.added[0].value, 55.0);
        assert_eq!(second.offset, fs::metadata(file.path()).unwrap().len());
    }

    #[test]
    fn test_full_progress_sink_does_not_block() {
        let lines: Vec<&str> = std::iter::repeat(CHAT)
            .take(PROGRESS_EVERY * 3)
            .chain([PLAYER_KILL])
            .collect();
        let file = log_file(&lines);
        let (tx, mut rx) = mpsc::channel(1);
        let store = GlobalStore::default().into_shared();

        let added = LogProcessor::new(store)
            .with_progress(tx)
            .process_full(file.path())
            .unwrap();

        assert_eq!(added, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_missing_file() {
        let store = GlobalStore::default().into_shared();
        let err = LogProcessor::new(store)
            .process_full("/nonexistent/chat.log")
            .unwrap_err();
        assert!(matches!(err, ProcessError::NotFound(_)));
    }

    #[test]
    fn test_progress_reaches_one() {
        let file = log_file(&[TEAM_KILL, PLAYER_KILL]);
        let (tx, mut rx) = mpsc::channel(1);
        let store = GlobalStore::default().into_shared();

        LogProcessor::new(store)
            .with_progress(tx)
            .process_full(file.path())
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), 1.0);
    }
}
