//! Workspace manifest: the registration file shared by the generator and the cleanup poller.
//!
//! All writes for one workspace go through a single [`writer::ManifestWriter`].

/// Background pruning of stale compositions.
pub mod poller;
/// Records and the manifest source format.
pub mod record;
/// Single-writer actor with atomic, idempotent writes.
pub mod writer;
