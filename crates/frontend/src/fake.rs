//! A scripted frontend for exercising the indexer without a compiler.
//!
//! A [`UnitScript`] records the sink calls one parsed unit would deliver;
//! [`FakeFrontend`] hands them out by root path. Scripts can swap their
//! event list on reparse, fail reparse with a fixed code, or panic
//! mid-stream to exercise the crash shield.

use std::path::{Path, PathBuf};

use files::{FileContents, canonicalize_path};
use parking_lot::Mutex;
use position::Range;
use rustc_hash::FxHashMap;

use crate::event::{Diag, DeclEvent, IncludeEvent, IndexSink, RefEvent, SourceFile};
use crate::{Frontend, FrontendError, ParsedUnit, ReparseError};

#[derive(Debug, Clone)]
enum ScriptEvent {
    EnteredMainFile(SourceFile),
    Include(IncludeEvent),
    ImportedUnit(SourceFile),
    Declaration(DeclEvent),
    Reference(RefEvent),
    Skipped(SourceFile, Range),
    Diagnostic(SourceFile, Diag),
    Panic(String),
}

/// The recorded event stream of one parsed unit.
#[derive(Debug, Clone, Default)]
pub struct UnitScript {
    events: Vec<ScriptEvent>,
    on_reparse: Option<Vec<ScriptEvent>>,
    reparse_failure: Option<i32>,
}

impl UnitScript {
    pub fn new() -> UnitScript {
        UnitScript::default()
    }

    pub fn entered_main_file(mut self, file: SourceFile) -> Self {
        self.events.push(ScriptEvent::EnteredMainFile(file));
        self
    }

    pub fn include(mut self, include: IncludeEvent) -> Self {
        self.events.push(ScriptEvent::Include(include));
        self
    }

    pub fn imported_unit(mut self, file: SourceFile) -> Self {
        self.events.push(ScriptEvent::ImportedUnit(file));
        self
    }

    pub fn declaration(mut self, decl: DeclEvent) -> Self {
        self.events.push(ScriptEvent::Declaration(decl));
        self
    }

    pub fn reference(mut self, reference: RefEvent) -> Self {
        self.events.push(ScriptEvent::Reference(reference));
        self
    }

    pub fn skipped(mut self, file: SourceFile, range: Range) -> Self {
        self.events.push(ScriptEvent::Skipped(file, range));
        self
    }

    pub fn diagnostic(mut self, file: SourceFile, diag: Diag) -> Self {
        self.events.push(ScriptEvent::Diagnostic(file, diag));
        self
    }

    /// Raises a fault at this point of the stream.
    pub fn panic(mut self, message: impl Into<String>) -> Self {
        self.events.push(ScriptEvent::Panic(message.into()));
        self
    }

    /// After a successful reparse, replay `script`'s events instead.
    pub fn on_reparse(mut self, script: UnitScript) -> Self {
        self.on_reparse = Some(script.events);
        self
    }

    pub fn fail_reparse(mut self, code: i32) -> Self {
        self.reparse_failure = Some(code);
        self
    }
}

#[derive(Default)]
pub struct FakeFrontend {
    units: Mutex<FxHashMap<PathBuf, UnitScript>>,
}

impl FakeFrontend {
    pub fn new() -> FakeFrontend {
        FakeFrontend::default()
    }

    pub fn script(&self, path: impl AsRef<Path>, script: UnitScript) {
        self.units.lock().insert(canonicalize_path(path.as_ref()), script);
    }
}

impl Frontend for FakeFrontend {
    fn parse(
        &self,
        path: &Path,
        _args: &[String],
        _remapped: &[FileContents],
    ) -> Result<Box<dyn ParsedUnit>, FrontendError> {
        let key = canonicalize_path(path);
        let script = self
            .units
            .lock()
            .get(&key)
            .cloned()
            .ok_or(FrontendError::ParseFailed { path: key })?;
        Ok(Box::new(FakeUnit { script }))
    }
}

struct FakeUnit {
    script: UnitScript,
}

impl ParsedUnit for FakeUnit {
    fn reparse(&mut self, _remapped: &[FileContents]) -> Result<(), ReparseError> {
        if let Some(code) = self.script.reparse_failure {
            return Err(ReparseError(code));
        }
        if let Some(events) = self.script.on_reparse.take() {
            self.script.events = events;
        }
        Ok(())
    }

    fn index(&self, sink: &mut dyn IndexSink) -> Result<(), FrontendError> {
        sink.started_translation_unit();
        for event in &self.script.events {
            match event {
                ScriptEvent::EnteredMainFile(file) => sink.entered_main_file(file),
                ScriptEvent::Include(include) => sink.included_file(include),
                ScriptEvent::ImportedUnit(file) => sink.imported_unit(file),
                ScriptEvent::Declaration(decl) => sink.declaration(decl),
                ScriptEvent::Reference(reference) => sink.reference(reference),
                ScriptEvent::Skipped(file, range) => sink.skipped_range(file, *range),
                ScriptEvent::Diagnostic(file, diag) => sink.diagnostic(file, diag),
                ScriptEvent::Panic(message) => panic!("{message}"),
            }
        }
        Ok(())
    }
}
