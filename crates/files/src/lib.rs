//! Unsaved-buffer snapshots and file identity.
//!
//! A parse sees the editor's unsaved buffers in place of on-disk contents.
//! [`Snapshot`] is the immutable bundle of those overlays, taken once at
//! parse start. [`FileUniqueId`] is the inode-like identity used wherever
//! two textual paths may alias the same file.

mod language;

pub use language::{LanguageId, language_of};

use std::env;
use std::fs;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHasher;

/// One overlaid file: an absolute path and the buffer that replaces its
/// on-disk contents during a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    pub path: PathBuf,
    pub content: String,
}

impl FileContents {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> FileContents {
        FileContents { path: path.into(), content: content.into() }
    }
}

/// An immutable set of overlays, keyed by canonical absolute path.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    overlays: IndexMap<PathBuf, String, BuildHasherDefault<FxHasher>>,
}

impl Snapshot {
    pub fn new(files: Vec<FileContents>) -> Snapshot {
        let mut overlays = IndexMap::default();
        for file in files {
            overlays.insert(canonicalize_path(&file.path), file.content);
        }
        Snapshot { overlays }
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.overlays.get(&canonicalize_path(path)).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.overlays.iter().map(|(path, content)| (path.as_path(), content.as_str()))
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

/// Inode-like file identity.
///
/// Keying shared state on this rather than on the textual path collapses
/// symlink aliases. Overlay-only paths that do not exist on disk fall back
/// to a hash of the canonical path, with the device field saturated so the
/// two namespaces cannot collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileUniqueId {
    device: u64,
    inode: u64,
}

impl FileUniqueId {
    pub fn of(path: &Path) -> FileUniqueId {
        #[cfg(unix)]
        if let Ok(metadata) = fs::metadata(path) {
            use std::os::unix::fs::MetadataExt;
            return FileUniqueId { device: metadata.dev(), inode: metadata.ino() };
        }
        FileUniqueId::from_path_hash(path)
    }

    /// Identity for a path with no backing file.
    pub fn from_path_hash(path: &Path) -> FileUniqueId {
        let mut hasher = FxHasher::default();
        canonicalize_path(path).hash(&mut hasher);
        FileUniqueId { device: u64::MAX, inode: hasher.finish() }
    }
}

/// Returns an absolute, symlink-free path when the file exists; otherwise a
/// lexically normalized absolute path.
pub fn canonicalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
