use std::path::Path;
use std::sync::Arc;

use files::{FileContents, Snapshot};
use parking_lot::Mutex;

use crate::{Frontend, FrontendError, IndexSink, ParsedUnit, ReparseError};

static CONSTRUCTION_LOCK: Mutex<()> = Mutex::new(());

/// A per-worker handle onto the frontend.
///
/// Construction serializes on a process-wide lock, so instances are
/// long-lived and pooled, one per worker thread, never created per request.
pub struct FrontendIndex {
    frontend: Arc<dyn Frontend>,
}

impl FrontendIndex {
    pub fn new(frontend: Arc<dyn Frontend>) -> FrontendIndex {
        let _guard = CONSTRUCTION_LOCK.lock();
        tracing::debug!("constructed frontend index");
        FrontendIndex { frontend }
    }

    pub fn frontend(&self) -> &dyn Frontend {
        self.frontend.as_ref()
    }
}

/// Owns one parsed unit and its lifecycle.
///
/// Dropping the wrapper releases the unit's AST storage on every exit path;
/// there is no resurrection after drop.
pub struct TranslationUnit {
    unit: Box<dyn ParsedUnit>,
}

impl TranslationUnit {
    pub fn create(
        index: &FrontendIndex,
        path: &Path,
        args: &[String],
        snapshot: &Snapshot,
    ) -> Result<TranslationUnit, FrontendError> {
        let remapped = remapped_files(snapshot);
        let unit = index.frontend().parse(path, args, &remapped)?;
        tracing::debug!(path = %path.display(), overlays = remapped.len(), "parsed unit");
        Ok(TranslationUnit { unit })
    }

    /// Recomputes the unit against a fresh snapshot.
    ///
    /// Much cheaper than [`TranslationUnit::create`]; completion and
    /// code-action call sites depend on reparse being preferred whenever a
    /// unit already exists.
    pub fn reparse(&mut self, snapshot: &Snapshot) -> Result<(), ReparseError> {
        self.unit.reparse(&remapped_files(snapshot))
    }

    pub fn index(&self, sink: &mut dyn IndexSink) -> Result<(), FrontendError> {
        self.unit.index(sink)
    }
}

/// Converts a snapshot into the remap set handed to the frontend: one
/// synthetic in-memory buffer per overlaid path.
pub fn remapped_files(snapshot: &Snapshot) -> Vec<FileContents> {
    snapshot.iter().map(|(path, content)| FileContents::new(path, content)).collect()
}
