//! Arbitration of header ownership across parallel workers.
//!
//! When many translation units share one header, each parse would produce
//! an `IndexFile` for it. [`FileConsumerSharedState`] is the process-wide
//! arbiter granting each file to exactly one worker; it is the only shared
//! mutable state in the core. [`FileConsumer`] is one parse's local view.

use std::path::PathBuf;

use files::FileUniqueId;
use frontend::SourceFile;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::IndexFile;
use crate::id::FileId;

/// Keyed on the inode-like unique id, not the textual path, so symlink
/// aliases collapse onto one entry.
#[derive(Debug, Default)]
pub struct FileConsumerSharedState {
    used: Mutex<FxHashSet<FileUniqueId>>,
}

impl FileConsumerSharedState {
    pub fn new() -> FileConsumerSharedState {
        FileConsumerSharedState::default()
    }

    /// The first caller per file receives `true` and must index it; every
    /// later caller receives `false` and must drop its record.
    pub fn mark(&self, id: FileUniqueId) -> bool {
        self.used.lock().insert(id)
    }

    /// Releases a claim so the next parse can take it, e.g. before
    /// re-indexing a translation unit whose root was claimed earlier.
    pub fn reset(&self, id: FileUniqueId) {
        self.used.lock().remove(&id);
    }
}

pub(crate) struct FileEntry {
    pub(crate) file: IndexFile,
    pub(crate) claimed: bool,
}

/// The per-parse working set of `IndexFile`s, with parse-wide file ids
/// allocated in first-touch order. Unclaimed files are materialized so
/// cross-file references can resolve, then dropped at [`finish`].
///
/// [`finish`]: FileConsumer::finish
pub(crate) struct FileConsumer<'a> {
    shared: &'a FileConsumerSharedState,
    local: FxHashMap<FileUniqueId, FileId>,
    entries: Vec<FileEntry>,
}

impl<'a> FileConsumer<'a> {
    /// The root file is always claimed by its own parse.
    pub(crate) fn new(shared: &'a FileConsumerSharedState, root: &SourceFile) -> FileConsumer<'a> {
        shared.reset(root.unique_id);
        let mut consumer =
            FileConsumer { shared, local: FxHashMap::default(), entries: Vec::new() };
        consumer.enter(root);
        consumer
    }

    pub(crate) fn enter(&mut self, file: &SourceFile) -> FileId {
        if let Some(&id) = self.local.get(&file.unique_id) {
            return id;
        }
        let claimed = self.shared.mark(file.unique_id);
        let id = FileId::from_raw(self.entries.len() as u32);
        self.entries
            .push(FileEntry { file: IndexFile::new(file.path.clone(), String::new()), claimed });
        self.local.insert(file.unique_id, id);
        id
    }

    pub(crate) fn get_mut(&mut self, id: FileId) -> &mut IndexFile {
        &mut self.entries[id.raw() as usize].file
    }

    /// Harvests the claimed files, stamping each with the dependency set of
    /// the whole parse.
    pub(crate) fn finish(self) -> Vec<IndexFile> {
        let touched: Vec<PathBuf> =
            self.entries.iter().map(|entry| entry.file.path.clone()).collect();
        let mut harvested = Vec::new();
        for entry in self.entries {
            if !entry.claimed {
                continue;
            }
            let mut file = entry.file;
            file.dependencies =
                touched.iter().filter(|path| **path != file.path).cloned().collect();
            harvested.push(file);
        }
        harvested
    }
}

#[cfg(test)]
mod tests {
    use frontend::SourceFile;

    use crate::consumer::{FileConsumer, FileConsumerSharedState};

    #[test]
    fn mark_grants_each_file_once() {
        let shared = FileConsumerSharedState::new();
        let header = SourceFile::new("/proj/util.h");
        assert!(shared.mark(header.unique_id));
        assert!(!shared.mark(header.unique_id));

        shared.reset(header.unique_id);
        assert!(shared.mark(header.unique_id));
    }

    #[test]
    fn the_root_is_always_claimed() {
        let shared = FileConsumerSharedState::new();
        let root = SourceFile::new("/proj/a.cc");
        // Claimed by an earlier parse of the same unit.
        shared.mark(root.unique_id);

        let consumer = FileConsumer::new(&shared, &root);
        let files = consumer.finish();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, root.path);
    }

    #[test]
    fn unclaimed_files_are_dropped_at_finish() {
        let shared = FileConsumerSharedState::new();
        let header = SourceFile::new("/proj/util.h");
        shared.mark(header.unique_id);

        let root = SourceFile::new("/proj/a.cc");
        let mut consumer = FileConsumer::new(&shared, &root);
        consumer.enter(&header);

        let files = consumer.finish();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, root.path);
        // The dropped header still counts as a dependency of the parse.
        assert_eq!(files[0].dependencies, vec![header.path]);
    }
}
