//! Background cleanup of manifest records whose component source has disappeared.
//!
//! The poller never touches the manifest file directly. It scans, then sends a prune command
//! through the same [`ManifestHandle`] the generator uses, so both writers are serialized by
//! the writer actor.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::foundation::error::{FramegateError, FramegateResult};
use crate::manifest::writer::{ManifestHandle, WriteOutcome};

/// Header every generated component starts with.
pub const COMPONENT_HEADER: &str = "// framegate:composition ";

/// A composition source found on disk.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedScene {
    /// Composition id.
    pub name: String,
    /// Source file.
    pub path: PathBuf,
    /// Length in frames.
    pub duration: u64,
    /// Whether the module exports `schema`.
    pub has_schema: bool,
}

/// Source of truth for which compositions still exist.
pub trait SceneScanner: Send + Sync {
    /// List present compositions. An error means "unknown", and nothing is pruned.
    fn scan(&self) -> FramegateResult<Vec<ScannedScene>>;
}

/// Scans `<root>/compositions/**.tsx` for generated component headers.
#[derive(Clone, Debug)]
pub struct DirectoryScanner {
    dir: PathBuf,
}

impl DirectoryScanner {
    /// Scanner for the workspace rooted at `root` (the manifest's directory).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join("compositions"),
        }
    }
}

impl SceneScanner for DirectoryScanner {
    fn scan(&self) -> FramegateResult<Vec<ScannedScene>> {
        if !self.dir.is_dir() {
            return Err(FramegateError::manifest(format!(
                "composition directory '{}' does not exist",
                self.dir.display()
            )));
        }
        let mut out = Vec::new();
        for entry in walkdir::WalkDir::new(&self.dir).sort_by_file_name() {
            let entry = entry.map_err(|e| FramegateError::manifest(format!("scan: {e}")))?;
            if !entry.file_type().is_file()
                || entry.path().extension().and_then(|x| x.to_str()) != Some("tsx")
            {
                continue;
            }
            let text = std::fs::read_to_string(entry.path()).map_err(|e| {
                FramegateError::manifest(format!("read '{}': {e}", entry.path().display()))
            })?;
            match parse_header(text.lines().next().unwrap_or("")) {
                Some((name, duration, has_schema)) => out.push(ScannedScene {
                    name,
                    path: entry.path().to_path_buf(),
                    duration,
                    has_schema,
                }),
                None => {
                    tracing::debug!(path = %entry.path().display(), "skipping file without header")
                }
            }
        }
        Ok(out)
    }
}

/// Parse `// framegate:composition <id> duration=<n> schema=<bool>`.
pub fn parse_header(line: &str) -> Option<(String, u64, bool)> {
    let rest = line.trim().strip_prefix(COMPONENT_HEADER.trim_end())?;
    let mut parts = rest.split_whitespace();
    let name = parts.next()?.to_string();
    let mut duration = None;
    let mut schema = false;
    for part in parts {
        match part.split_once('=') {
            Some(("duration", v)) => duration = v.parse().ok(),
            Some(("schema", v)) => schema = v == "true",
            _ => {}
        }
    }
    Some((name, duration?, schema))
}

/// Result of one cleanup pass.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PollOutcome {
    /// Compositions found by the scanner.
    pub scanned: usize,
    /// Records pruned from the manifest.
    pub removed: Vec<String>,
    /// Whether the manifest file changed.
    pub write: WriteOutcome,
}

/// One cleanup pass: scan, then prune every record the scan did not find.
pub fn run_once(scanner: &dyn SceneScanner, handle: &ManifestHandle) -> FramegateResult<PollOutcome> {
    let scenes = scanner.scan()?;
    let keep: BTreeSet<String> = scenes.iter().map(|s| s.name.clone()).collect();
    let (write, removed) = handle.prune(keep)?;
    if !removed.is_empty() {
        tracing::info!(?removed, "pruned stale compositions");
    }
    Ok(PollOutcome {
        scanned: scenes.len(),
        removed,
        write,
    })
}

/// Poller timing.
#[derive(Clone, Copy, Debug)]
pub struct PollerOpts {
    /// Wall-clock interval between ticks.
    pub interval: Duration,
    /// How long a tick waits on its cleanup before moving on.
    pub cleanup_timeout: Duration,
}

impl Default for PollerOpts {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            cleanup_timeout: Duration::from_secs(5),
        }
    }
}

/// Tick counters.
#[derive(Debug, Default)]
pub struct PollerStats {
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    skipped: AtomicU64,
}

impl PollerStats {
    /// Cleanups that finished in time.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Cleanups that returned an error.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Ticks that gave up waiting on their cleanup.
    pub fn timed_out(&self) -> u64 {
        self.timed_out.load(Ordering::Relaxed)
    }

    /// Ticks skipped because an earlier cleanup was still running.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Background thread running [`run_once`] every `interval`.
#[derive(Debug)]
pub struct ManifestPoller {
    stop_tx: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
    stats: Arc<PollerStats>,
}

impl ManifestPoller {
    /// Start polling.
    pub fn spawn(
        scanner: Arc<dyn SceneScanner>,
        handle: ManifestHandle,
        opts: PollerOpts,
    ) -> FramegateResult<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let stats = Arc::new(PollerStats::default());
        let thread_stats = Arc::clone(&stats);
        let worker = std::thread::Builder::new()
            .name("framegate-poller".to_string())
            .spawn(move || poll_loop(scanner, handle, opts, stop_rx, thread_stats))
            .map_err(|e| FramegateError::manifest(format!("spawn manifest poller: {e}")))?;
        Ok(Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
            stats,
        })
    }

    /// Counters shared with the polling thread.
    pub fn stats(&self) -> &PollerStats {
        &self.stats
    }

    /// Stop after the current tick.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        drop(self.stop_tx.take());
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("manifest poller panicked");
        }
    }
}

impl Drop for ManifestPoller {
    fn drop(&mut self) {
        self.halt();
    }
}

fn poll_loop(
    scanner: Arc<dyn SceneScanner>,
    handle: ManifestHandle,
    opts: PollerOpts,
    stop_rx: mpsc::Receiver<()>,
    stats: Arc<PollerStats>,
) {
    let in_flight = Arc::new(AtomicBool::new(false));
    loop {
        match stop_rx.recv_timeout(opts.interval) {
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if in_flight.swap(true, Ordering::AcqRel) {
            stats.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("previous cleanup still running; skipping tick");
            continue;
        }

        let (done_tx, done_rx) = mpsc::channel();
        let scanner = Arc::clone(&scanner);
        let handle = handle.clone();
        let flag = Arc::clone(&in_flight);
        let spawned = std::thread::Builder::new()
            .name("framegate-cleanup".to_string())
            .spawn(move || {
                let res = run_once(scanner.as_ref(), &handle);
                flag.store(false, Ordering::Release);
                let _ = done_tx.send(res);
            });
        if let Err(e) = spawned {
            in_flight.store(false, Ordering::Release);
            stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "could not spawn cleanup");
            continue;
        }

        match done_rx.recv_timeout(opts.cleanup_timeout) {
            Ok(Ok(_)) => {
                stats.completed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "manifest cleanup failed");
            }
            Err(_) => {
                stats.timed_out.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    timeout_ms = opts.cleanup_timeout.as_millis() as u64,
                    "manifest cleanup timed out"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/poller.rs"]
mod tests;
