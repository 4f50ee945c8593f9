//! Public entry points: compose the unit wrapper, the adapter, and the
//! arbiter into one parse request.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, UNIX_EPOCH};

use files::{Snapshot, canonicalize_path, language_of};
use frontend::{FrontendIndex, SourceFile, TranslationUnit, run_safely};
use rustc_hash::FxHashMap;

use crate::IndexFile;
use crate::adapter::IndexParam;
use crate::consumer::FileConsumerSharedState;

/// Wall-clock cost of one import, split into the frontend parse and the
/// projection of its events.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexPerf {
    pub index_parse: Duration,
    pub index_build: Duration,
}

/// Parses `file` from scratch and returns every `IndexFile` this worker
/// owns. A frontend crash yields an empty vector; no partial results
/// surface.
pub fn parse(
    shared: &FileConsumerSharedState,
    index: &FrontendIndex,
    file: &Path,
    args: &[String],
    snapshot: &Snapshot,
    perf: &mut IndexPerf,
) -> Vec<IndexFile> {
    let started = Instant::now();
    let path = canonicalize_path(file);
    let unit = match run_safely(|| TranslationUnit::create(index, &path, args, snapshot)) {
        Some(Ok(unit)) => unit,
        Some(Err(error)) => {
            tracing::warn!(%error, path = %path.display(), "failed to parse translation unit");
            return Vec::new();
        }
        None => {
            tracing::warn!(path = %path.display(), "frontend crashed while parsing");
            return Vec::new();
        }
    };
    perf.index_parse = started.elapsed();
    parse_with_tu(shared, perf, &unit, &path, args, snapshot)
}

/// Indexes an already-parsed unit; the reparse path.
pub fn parse_with_tu(
    shared: &FileConsumerSharedState,
    perf: &mut IndexPerf,
    unit: &TranslationUnit,
    file: &Path,
    args: &[String],
    snapshot: &Snapshot,
) -> Vec<IndexFile> {
    let started = Instant::now();
    let root = SourceFile::new(file);
    let import_file = root.path.clone();

    let mut param = IndexParam::new(shared, &root);
    match run_safely(|| unit.index(&mut param)) {
        Some(Ok(())) => {}
        Some(Err(error)) => {
            tracing::warn!(%error, path = %import_file.display(), "frontend failed to index");
            return Vec::new();
        }
        None => {
            tracing::warn!(path = %import_file.display(), "frontend crashed while indexing");
            return Vec::new();
        }
    }

    let mut harvested = param.finish();
    for file in &mut harvested {
        file.import_file = import_file.clone();
        file.args = args.to_vec();
        file.language = language_of(&file.path);
        file.last_modification_time = modification_time(&file.path);
        file.file_contents = snapshot
            .get(&file.path)
            .map(str::to_owned)
            .or_else(|| std::fs::read_to_string(&file.path).ok())
            .unwrap_or_default();
    }
    perf.index_build = started.elapsed();
    tracing::debug!(
        root = %import_file.display(),
        files = harvested.len(),
        "harvested index files"
    );
    harvested
}

fn modification_time(path: &Path) -> i64 {
    std::fs::metadata(path)
        .ok()
        .and_then(|metadata| metadata.modified().ok())
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .map(|since_epoch| since_epoch.as_secs() as i64)
        .unwrap_or(0)
}

/// Abstracts the indexing process for dispatcher layers. One instance per
/// worker thread; construction may be extremely expensive.
pub trait Indexer {
    fn index(
        &mut self,
        shared: &FileConsumerSharedState,
        file: &Path,
        args: &[String],
        snapshot: &Snapshot,
        perf: &mut IndexPerf,
    ) -> Vec<IndexFile>;
}

/// The production indexer, backed by a pooled frontend handle.
pub struct FrontendIndexer {
    pub index: FrontendIndex,
}

impl Indexer for FrontendIndexer {
    fn index(
        &mut self,
        shared: &FileConsumerSharedState,
        file: &Path,
        args: &[String],
        snapshot: &Snapshot,
        perf: &mut IndexPerf,
    ) -> Vec<IndexFile> {
        parse(shared, &self.index, file, args, snapshot, perf)
    }
}

#[derive(Debug, Clone)]
pub struct TestEntry {
    pub path: PathBuf,
    pub num_indexes: usize,
}

/// Pretends to index a fixed set of paths, returning empty records and
/// counting calls. Exercises dispatcher layers without a compiler.
pub struct TestIndexer {
    entries: FxHashMap<PathBuf, usize>,
    calls: FxHashMap<PathBuf, usize>,
}

impl TestIndexer {
    pub fn new(entries: impl IntoIterator<Item = TestEntry>) -> TestIndexer {
        let entries = entries
            .into_iter()
            .map(|entry| (canonicalize_path(&entry.path), entry.num_indexes))
            .collect();
        TestIndexer { entries, calls: FxHashMap::default() }
    }

    pub fn call_count(&self, path: &Path) -> usize {
        self.calls.get(&canonicalize_path(path)).copied().unwrap_or(0)
    }
}

impl Indexer for TestIndexer {
    fn index(
        &mut self,
        _shared: &FileConsumerSharedState,
        file: &Path,
        _args: &[String],
        _snapshot: &Snapshot,
        _perf: &mut IndexPerf,
    ) -> Vec<IndexFile> {
        let path = canonicalize_path(file);
        let Some(&count) = self.entries.get(&path) else {
            return Vec::new();
        };
        *self.calls.entry(path.clone()).or_default() += 1;
        (0..count).map(|_| IndexFile::new(path.clone(), String::new())).collect()
    }
}
