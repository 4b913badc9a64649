use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::assets::bundle::{BUNDLED_IMAGE_ID, BUNDLED_IMAGE_SVG, EmbeddedAssets};

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_stage").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

struct CountingSource {
    inner: EmbeddedAssets,
    opens: AtomicUsize,
}

impl CountingSource {
    fn new() -> Self {
        Self {
            inner: EmbeddedAssets::bundled(),
            opens: AtomicUsize::new(0),
        }
    }
}

impl AssetSource for CountingSource {
    fn open(&self, id: &str) -> io::Result<Box<dyn Read + '_>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.inner.open(id)
    }
}

/// Yields a few bytes, then fails.
struct BrokenSource;

struct BrokenReader {
    sent: bool,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::other("bundle truncated"));
        }
        self.sent = true;
        let n = buf.len().min(4);
        buf[..n].copy_from_slice(&b"<svg"[..n]);
        Ok(n)
    }
}

impl AssetSource for BrokenSource {
    fn open(&self, _id: &str) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(BrokenReader { sent: false }))
    }
}

#[test]
fn fresh_install_copies_exactly_one_file() {
    let dir = scratch("fresh");
    let dirs = StageDirs::new(Some(dir.clone()), dir.join("fallback"));
    let stager = AssetStager::new();

    let staged = stager
        .ensure_staged(&EmbeddedAssets::bundled(), BUNDLED_IMAGE_ID, &dirs)
        .unwrap();

    assert!(staged.path.is_absolute());
    assert!(staged.path.ends_with(STAGED_FILE_NAME));
    assert_eq!(
        staged.outcome,
        StageOutcome::Copied {
            bytes: BUNDLED_IMAGE_SVG.len() as u64
        }
    );

    let entries: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from(STAGED_FILE_NAME)]);
    assert_eq!(
        std::fs::metadata(&staged.path).unwrap().len(),
        BUNDLED_IMAGE_SVG.len() as u64
    );
    assert!(stager.is_staged(&staged.path));
}

#[test]
fn second_call_performs_no_copy() {
    let dir = scratch("idempotent");
    let dirs = StageDirs::new(Some(dir.clone()), dir.join("fallback"));
    let source = CountingSource::new();
    let stager = AssetStager::new();

    let first = stager.ensure_staged(&source, BUNDLED_IMAGE_ID, &dirs).unwrap();
    let second = stager.ensure_staged(&source, BUNDLED_IMAGE_ID, &dirs).unwrap();

    assert_eq!(source.opens.load(Ordering::SeqCst), 1);
    assert_eq!(first.path, second.path);
    assert_eq!(second.outcome, StageOutcome::AlreadyPresent);
}

#[test]
fn existing_file_is_trusted_without_revalidation() {
    let dir = scratch("trusted");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(STAGED_FILE_NAME), b"not an svg").unwrap();

    let dirs = StageDirs::new(Some(dir.clone()), dir.join("fallback"));
    let source = CountingSource::new();
    let staged = AssetStager::new()
        .ensure_staged(&source, BUNDLED_IMAGE_ID, &dirs)
        .unwrap();

    assert_eq!(staged.outcome, StageOutcome::AlreadyPresent);
    assert_eq!(source.opens.load(Ordering::SeqCst), 0);
    assert_eq!(std::fs::read(&staged.path).unwrap(), b"not an svg");
}

#[test]
fn unusable_preferred_dir_falls_back() {
    let dir = scratch("fallback");
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, b"file, not a dir").unwrap();

    let fallback = dir.join("internal");
    let dirs = StageDirs::new(Some(blocker.join("external")), &fallback);
    let staged = AssetStager::new()
        .ensure_staged(&EmbeddedAssets::bundled(), BUNDLED_IMAGE_ID, &dirs)
        .unwrap();

    assert_eq!(
        staged.path,
        std::path::absolute(fallback.join(STAGED_FILE_NAME)).unwrap()
    );
    assert!(staged.path.is_file());
}

#[test]
fn missing_preferred_dir_uses_fallback() {
    let dir = scratch("no_preferred");
    let dirs = StageDirs::new(None, &dir);
    let staged = AssetStager::new()
        .ensure_staged(&EmbeddedAssets::bundled(), BUNDLED_IMAGE_ID, &dirs)
        .unwrap();
    assert!(staged.path.starts_with(std::path::absolute(&dir).unwrap()));
}

#[test]
fn unknown_resource_is_a_staging_error() {
    let dir = scratch("unknown");
    let dirs = StageDirs::new(Some(dir.clone()), dir.join("fallback"));
    let err = AssetStager::new()
        .ensure_staged(&EmbeddedAssets::new(), "image", &dirs)
        .unwrap_err();

    assert!(err.is_staging());
    assert!(!dir.join(STAGED_FILE_NAME).exists());
}

#[test]
fn interrupted_copy_leaves_nothing_behind() {
    let dir = scratch("interrupted");
    let dirs = StageDirs::new(Some(dir.clone()), dir.join("fallback"));
    let stager = AssetStager::new();

    let err = stager
        .ensure_staged(&BrokenSource, BUNDLED_IMAGE_ID, &dirs)
        .unwrap_err();
    assert!(err.is_staging());
    assert!(err.to_string().contains("copy bundled asset"));
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

    // A later run with a healthy bundle stages normally.
    let staged = stager
        .ensure_staged(&EmbeddedAssets::bundled(), BUNDLED_IMAGE_ID, &dirs)
        .unwrap();
    assert!(matches!(staged.outcome, StageOutcome::Copied { .. }));
}

#[test]
fn concurrent_callers_copy_once() {
    let dir = scratch("concurrent");
    let dirs = StageDirs::new(Some(dir.clone()), dir.join("fallback"));
    let source = Arc::new(CountingSource::new());
    let stager = Arc::new(AssetStager::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let source = Arc::clone(&source);
            let stager = Arc::clone(&stager);
            let dirs = dirs.clone();
            std::thread::spawn(move || {
                stager
                    .ensure_staged(source.as_ref(), BUNDLED_IMAGE_ID, &dirs)
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(source.opens.load(Ordering::SeqCst), 1);
    assert_eq!(
        results
            .iter()
            .filter(|s| matches!(s.outcome, StageOutcome::Copied { .. }))
            .count(),
        1
    );
    assert!(results.iter().all(|s| s.path == results[0].path));
}

#[test]
fn separate_stagers_racing_on_fresh_dir_both_succeed() {
    for round in 0..20 {
        let dir = scratch(&format!("race_{round}"));
        let dirs = StageDirs::new(Some(dir.clone()), dir.join("fallback"));
        let barrier = std::sync::Barrier::new(2);

        let results = std::thread::scope(|s| {
            let handles = [(); 2].map(|()| {
                let (dirs, barrier) = (&dirs, &barrier);
                s.spawn(move || {
                    let stager = AssetStager::new();
                    barrier.wait();
                    stager.ensure_staged(&EmbeddedAssets::bundled(), BUNDLED_IMAGE_ID, dirs)
                })
            });
            handles.map(|h| h.join().unwrap().unwrap())
        });

        assert_eq!(results[0].path, results[1].path);
        assert!(
            results
                .iter()
                .any(|s| matches!(s.outcome, StageOutcome::Copied { .. }))
        );
        assert_eq!(std::fs::read(&results[0].path).unwrap(), BUNDLED_IMAGE_SVG);

        let entries: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(STAGED_FILE_NAME)]);
    }
}
