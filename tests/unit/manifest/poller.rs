use super::*;
use crate::manifest::record::{CompositionRecord, Manifest};
use crate::manifest::writer::ManifestWriter;
use std::time::Instant;

fn record(name: &str) -> CompositionRecord {
    CompositionRecord {
        name: name.to_string(),
        template_path: format!("./compositions/{name}.tsx"),
        duration: 30,
        has_schema: false,
    }
}

fn write_component(root: &Path, rel: &str, name: &str) {
    let path = root.join("compositions").join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        path,
        format!("{COMPONENT_HEADER}{name} duration=30 schema=true\nexport const Component = () => null;\n"),
    )
    .unwrap();
}

fn wait_until(timeout: Duration, mut ok: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if ok() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    ok()
}

#[test]
fn header_parsing() {
    assert_eq!(
        parse_header("// framegate:composition promo duration=255 schema=true"),
        Some(("promo".to_string(), 255, true))
    );
    assert_eq!(
        parse_header("// framegate:composition promo duration=10"),
        Some(("promo".to_string(), 10, false))
    );
    assert_eq!(parse_header("// framegate:composition promo schema=true"), None);
    assert_eq!(parse_header("// framegate:composition"), None);
    assert_eq!(parse_header("import React from 'react';"), None);
}

#[test]
fn directory_scanner_reads_headers() {
    let dir = tempfile::tempdir().unwrap();
    write_component(dir.path(), "kinetic-promo/b.tsx", "b");
    write_component(dir.path(), "data-story/a.tsx", "a");
    std::fs::write(dir.path().join("compositions/notes.tsx"), "// hand written\n").unwrap();
    std::fs::write(dir.path().join("compositions/readme.md"), "# hi\n").unwrap();

    let scenes = DirectoryScanner::new(dir.path()).scan().unwrap();
    let names: Vec<&str> = scenes.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(scenes.iter().all(|s| s.duration == 30 && s.has_schema));
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(DirectoryScanner::new(dir.path()).scan().is_err());
}

#[test]
fn run_once_prunes_stale_records() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ManifestWriter::spawn(dir.path().join("Root.tsx"), Manifest::default()).unwrap();
    let h = writer.handle();
    h.upsert(vec![record("kept"), record("stale")]).unwrap();
    write_component(dir.path(), "kept.tsx", "kept");

    let out = run_once(&DirectoryScanner::new(dir.path()), &h).unwrap();
    assert_eq!(out.scanned, 1);
    assert_eq!(out.removed, vec!["stale".to_string()]);
    assert_eq!(out.write, WriteOutcome::Written);
    assert!(h.read().unwrap().get("kept").is_some());
}

#[test]
fn scan_failure_prunes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ManifestWriter::spawn(dir.path().join("Root.tsx"), Manifest::default()).unwrap();
    let h = writer.handle();
    h.upsert(vec![record("a")]).unwrap();

    assert!(run_once(&DirectoryScanner::new(dir.path()), &h).is_err());
    assert_eq!(h.read().unwrap().records.len(), 1);
}

#[test]
fn background_poller_prunes_deleted_components() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ManifestWriter::spawn(dir.path().join("Root.tsx"), Manifest::default()).unwrap();
    let h = writer.handle();
    h.upsert(vec![record("a"), record("b")]).unwrap();
    write_component(dir.path(), "a.tsx", "a");
    write_component(dir.path(), "b.tsx", "b");

    let poller = ManifestPoller::spawn(
        Arc::new(DirectoryScanner::new(dir.path())),
        h.clone(),
        PollerOpts {
            interval: Duration::from_millis(20),
            cleanup_timeout: Duration::from_secs(1),
        },
    )
    .unwrap();

    std::fs::remove_file(dir.path().join("compositions/b.tsx")).unwrap();
    let pruned = wait_until(Duration::from_secs(5), || {
        h.read().unwrap().get("b").is_none()
    });
    assert!(pruned);
    assert!(h.read().unwrap().get("a").is_some());
    assert!(poller.stats().completed() >= 1);
    poller.stop();
}

struct SlowScanner(Duration);

impl SceneScanner for SlowScanner {
    fn scan(&self) -> FramegateResult<Vec<ScannedScene>> {
        std::thread::sleep(self.0);
        Ok(Vec::new())
    }
}

#[test]
fn slow_cleanup_times_out_and_skips_overlapping_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ManifestWriter::spawn(dir.path().join("Root.tsx"), Manifest::default()).unwrap();
    let poller = ManifestPoller::spawn(
        Arc::new(SlowScanner(Duration::from_millis(400))),
        writer.handle(),
        PollerOpts {
            interval: Duration::from_millis(10),
            cleanup_timeout: Duration::from_millis(20),
        },
    )
    .unwrap();

    let stats_ok = wait_until(Duration::from_secs(5), || {
        poller.stats().timed_out() >= 1 && poller.stats().skipped() >= 1
    });
    assert!(stats_ok);
    poller.stop();
}
