//! Single-writer actor for one workspace manifest.
//!
//! Every mutation goes through one thread that owns the file. Each command is a full
//! read-modify-write: read the current text, parse it into records, apply the change, render,
//! and only when the rendered text differs write it to a temp file and rename it into place.

use std::collections::BTreeSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;

use crate::foundation::error::{FramegateError, FramegateResult};
use crate::manifest::record::{CompositionRecord, Manifest};

/// Whether a command changed the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    /// New content was written.
    Written,
    /// The rendered content matched the file; nothing was written.
    Unchanged,
}

type Reply<T> = mpsc::Sender<FramegateResult<T>>;

enum Command {
    Register(Vec<CompositionRecord>, Reply<WriteOutcome>),
    Prune(BTreeSet<String>, Reply<(WriteOutcome, Vec<String>)>),
    Replace(Vec<CompositionRecord>, Reply<WriteOutcome>),
    Remove(String, Reply<WriteOutcome>),
    Read(Reply<Manifest>),
    Shutdown,
}

/// Cloneable sender side of a [`ManifestWriter`].
#[derive(Clone, Debug)]
pub struct ManifestHandle {
    tx: mpsc::Sender<Command>,
    path: PathBuf,
}

impl ManifestHandle {
    /// Manifest file this handle writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace records by name.
    pub fn upsert(&self, records: Vec<CompositionRecord>) -> FramegateResult<WriteOutcome> {
        self.call(|reply| Command::Register(records, reply))
    }

    /// Drop every record whose name is not in `keep` and whose source file is gone.
    /// Returns the removed names.
    ///
    /// The existence check runs inside the writer, so a component registered after the
    /// caller's scan survives the prune.
    pub fn prune(&self, keep: BTreeSet<String>) -> FramegateResult<(WriteOutcome, Vec<String>)> {
        self.call(|reply| Command::Prune(keep, reply))
    }

    /// Replace the whole record list.
    pub fn replace(&self, records: Vec<CompositionRecord>) -> FramegateResult<WriteOutcome> {
        self.call(|reply| Command::Replace(records, reply))
    }

    /// Remove one record by name.
    pub fn remove(&self, name: &str) -> FramegateResult<WriteOutcome> {
        let name = name.to_string();
        self.call(|reply| Command::Remove(name, reply))
    }

    /// Current manifest as seen by the writer.
    pub fn read(&self) -> FramegateResult<Manifest> {
        self.call(Command::Read)
    }

    fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> FramegateResult<T> {
        let (tx, rx) = mpsc::channel();
        self.tx
            .send(make(tx))
            .map_err(|_| FramegateError::manifest("manifest writer has shut down"))?;
        rx.recv()
            .map_err(|_| FramegateError::manifest("manifest writer dropped the reply"))?
    }
}

/// Owns the writer thread. Dropping it shuts the thread down after queued commands drain.
///
/// Writes are serialized within one process only. Run at most one writer per manifest at a
/// time; two processes editing the same manifest can lose each other's changes.
#[derive(Debug)]
pub struct ManifestWriter {
    handle: ManifestHandle,
    worker: Option<JoinHandle<()>>,
}

impl ManifestWriter {
    /// Start the writer for `path`. `defaults` is used when the file is missing or empty.
    pub fn spawn(path: impl Into<PathBuf>, defaults: Manifest) -> FramegateResult<Self> {
        let path = path.into();
        let (tx, rx) = mpsc::channel::<Command>();
        let worker_path = path.clone();
        let worker = std::thread::Builder::new()
            .name("framegate-manifest".to_string())
            .spawn(move || run(&worker_path, &defaults, rx))
            .map_err(|e| FramegateError::manifest(format!("spawn manifest writer: {e}")))?;
        Ok(Self {
            handle: ManifestHandle { tx, path },
            worker: Some(worker),
        })
    }

    /// A new sender for this writer.
    pub fn handle(&self) -> ManifestHandle {
        self.handle.clone()
    }

    /// Stop accepting commands and wait for the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.handle.tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!(path = %self.handle.path.display(), "manifest writer panicked");
        }
    }
}

impl Drop for ManifestWriter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(path: &Path, defaults: &Manifest, rx: mpsc::Receiver<Command>) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            Command::Register(records, reply) => {
                let _ = reply.send(modify(path, defaults, |m| m.upsert(records)));
            }
            Command::Replace(records, reply) => {
                let _ = reply.send(modify(path, defaults, |m| {
                    m.records.clear();
                    m.upsert(records)
                }));
            }
            Command::Remove(name, reply) => {
                let _ = reply.send(modify(path, defaults, |m| {
                    m.remove(&name);
                    Ok(())
                }));
            }
            Command::Prune(keep, reply) => {
                let mut removed = Vec::new();
                let root = path.parent().unwrap_or(Path::new("."));
                let res = modify(path, defaults, |m| {
                    removed = m.retain(|r| {
                        keep.contains(&r.name) || root.join(&r.template_path).exists()
                    });
                    Ok(())
                });
                if !removed.is_empty() {
                    tracing::debug!(path = %path.display(), ?removed, "pruned manifest records");
                }
                let _ = reply.send(res.map(|outcome| (outcome, removed)));
            }
            Command::Read(reply) => {
                let _ = reply.send(load(path, defaults).map(|(m, _)| m));
            }
            Command::Shutdown => break,
        }
    }
}

fn load(path: &Path, defaults: &Manifest) -> FramegateResult<(Manifest, String)> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(FramegateError::manifest(format!(
                "read '{}': {e}",
                path.display()
            )));
        }
    };
    let manifest = Manifest::parse(&text, defaults)?;
    Ok((manifest, text))
}

fn modify(
    path: &Path,
    defaults: &Manifest,
    edit: impl FnOnce(&mut Manifest) -> FramegateResult<()>,
) -> FramegateResult<WriteOutcome> {
    let (mut manifest, before) = load(path, defaults)?;
    edit(&mut manifest)?;
    let after = manifest.render()?;
    if after == before {
        tracing::debug!(path = %path.display(), "manifest unchanged");
        return Ok(WriteOutcome::Unchanged);
    }
    write_atomic(path, &after)?;
    Ok(WriteOutcome::Written)
}

/// Write `contents` to a sibling temp file, fsync it, then rename over `path`.
///
/// The temp name carries the process id, so concurrent processes never share a temp file.
pub fn write_atomic(path: &Path, contents: &str) -> FramegateResult<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| FramegateError::manifest(format!("'{}' has no file name", path.display())))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    let tmp = path.with_file_name(tmp_name);

    let io_err = |what: &str, p: &Path, e: std::io::Error| {
        FramegateError::manifest(format!("{what} '{}': {e}", p.display()))
    };
    let mut f = std::fs::File::create(&tmp).map_err(|e| io_err("create", &tmp, e))?;
    f.write_all(contents.as_bytes())
        .map_err(|e| io_err("write", &tmp, e))?;
    f.sync_all().map_err(|e| io_err("sync", &tmp, e))?;
    drop(f);
    std::fs::rename(&tmp, path).map_err(|e| io_err("rename into", path, e))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/writer.rs"]
mod tests;
