//! The compiler-frontend boundary of the indexer.
//!
//! The frontend performing lexing, preprocessing, parsing, and semantic
//! analysis is an external collaborator. This crate names the surface the
//! core drives it through: a [`Frontend`] produces [`ParsedUnit`]s, a
//! parsed unit replays its indexing events into an [`IndexSink`], and the
//! [`TranslationUnit`] wrapper manages the unit's lifecycle, unsaved-buffer
//! remapping, and reparse. Any frontend that exposes an equivalent
//! cursor-based indexing callback can back this core; [`fake`] provides a
//! scripted one for tests.

pub mod fake;

mod event;
mod recovery;
mod tu;

pub use event::{
    ContainerId, DeclEvent, Diag, DiagnosticSeverity, EntityKind, IncludeEvent, IndexSink, Loc,
    RefEvent, Role, SourceFile, StorageClass,
};
pub use recovery::run_safely;
pub use tu::{FrontendIndex, TranslationUnit, remapped_files};

use std::path::{Path, PathBuf};

use files::FileContents;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("frontend failed to parse `{}`", path.display())]
    ParseFailed { path: PathBuf },
    #[error("frontend fault: {0}")]
    Fault(String),
}

/// Non-fatal reparse failure, carrying the frontend's error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frontend reparse failed with code {0}")]
pub struct ReparseError(pub i32);

/// A compiler frontend capable of parsing translation units.
pub trait Frontend: Send + Sync {
    /// Parses `path` with `args`, seeing `remapped` buffers in place of
    /// on-disk contents. The first parse of a unit is coarse and slow.
    fn parse(
        &self,
        path: &Path,
        args: &[String],
        remapped: &[FileContents],
    ) -> Result<Box<dyn ParsedUnit>, FrontendError>;
}

/// One parsed translation unit held by the frontend.
///
/// Holds a large in-memory AST; scope explicitly and drop as soon as the
/// unit is no longer needed. `index` may raise an asynchronous fault on
/// malformed input; drive it under [`run_safely`].
pub trait ParsedUnit: Send {
    /// Recomputes the unit against fresh buffer contents. Cheap compared to
    /// the initial parse.
    fn reparse(&mut self, remapped: &[FileContents]) -> Result<(), ReparseError>;

    /// Replays the unit's indexing events, serially and in traversal order.
    fn index(&self, sink: &mut dyn IndexSink) -> Result<(), FrontendError>;
}
