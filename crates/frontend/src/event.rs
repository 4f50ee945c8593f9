//! The indexing event surface delivered by a compiler frontend.
//!
//! Events arrive serially, in traversal order, for one parsed translation
//! unit. Every location has already been resolved by the frontend to an
//! absolute canonical path plus its inode-like unique id; the consumer
//! never touches the file system to attribute an event.

use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::path::Path;

use files::{FileUniqueId, canonicalize_path};
use position::Range;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A source file as the frontend sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    pub path: std::path::PathBuf,
    pub unique_id: FileUniqueId,
}

impl SourceFile {
    pub fn new(path: impl AsRef<Path>) -> SourceFile {
        let path = canonicalize_path(path.as_ref());
        let unique_id = FileUniqueId::of(&path);
        SourceFile { path, unique_id }
    }
}

/// A resolved source location: which file, and where in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    pub file: SourceFile,
    pub range: Range,
}

impl Loc {
    pub fn new(file: SourceFile, range: Range) -> Loc {
        Loc { file, range }
    }
}

/// Opaque frontend cursor handle naming a lexical container.
///
/// Stable within one parse only; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub u64);

/// The frontend's declaration taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Unknown,
    File,
    Module,
    Namespace,
    Class,
    Struct,
    Union,
    Enum,
    EnumMember,
    TypeAlias,
    Function,
    Method,
    Constructor,
    Destructor,
    Field,
    Variable,
    Parameter,
    Macro,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageClass {
    #[default]
    Invalid,
    None,
    Extern,
    Static,
    PrivateExtern,
    Auto,
    Register,
}

/// What kind of occurrence a reference is, as a bitset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Role(pub u16);

impl Role {
    pub const NONE: Role = Role(0);
    pub const DECLARATION: Role = Role(1 << 0);
    pub const DEFINITION: Role = Role(1 << 1);
    pub const REFERENCE: Role = Role(1 << 2);
    pub const READ: Role = Role(1 << 3);
    pub const WRITE: Role = Role(1 << 4);
    pub const CALL: Role = Role(1 << 5);
    pub const DYNAMIC: Role = Role(1 << 6);
    pub const ADDRESS: Role = Role(1 << 7);
    pub const IMPLICIT: Role = Role(1 << 8);

    pub fn contains(self, other: Role) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Role {
    type Output = Role;

    fn bitor(self, rhs: Role) -> Role {
        Role(self.0 | rhs.0)
    }
}

impl BitOrAssign for Role {
    fn bitor_assign(&mut self, rhs: Role) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Role {
    type Output = Role;

    fn bitand(self, rhs: Role) -> Role {
        Role(self.0 & rhs.0)
    }
}

/// One declaration observed by the frontend.
///
/// `bases` carries the unified symbol names of direct base types for a type
/// declaration, or of directly overridden methods for a method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclEvent {
    pub usr_name: String,
    pub short_name: SmolStr,
    pub kind: EntityKind,
    pub storage: StorageClass,
    /// Location of the name token.
    pub spell: Loc,
    /// Range of the whole declaration. For macro-expanded declarations the
    /// frontend reports the expansion site.
    pub extent: Range,
    pub is_definition: bool,
    pub is_implicit: bool,
    /// This declaration as a container for nested events.
    pub cursor: ContainerId,
    pub lexical_container: Option<ContainerId>,
    /// Declaring type for out-of-line member definitions.
    pub semantic_container: Option<ContainerId>,
    pub bases: Vec<String>,
    /// Typedef/using target.
    pub alias_target: Option<String>,
    /// A variable's type.
    pub type_usr: Option<String>,
    /// Textual type, e.g. `int` or `void (int, char *) const`.
    pub type_desc: Option<String>,
    pub hover: Option<String>,
    pub comments: Option<String>,
    /// Ranges of parameter-name spellings for a function declaration.
    pub param_spellings: Vec<Range>,
}

impl DeclEvent {
    pub fn new(
        usr_name: impl Into<String>,
        short_name: impl Into<SmolStr>,
        kind: EntityKind,
        cursor: u64,
        spell: Loc,
    ) -> DeclEvent {
        let extent = spell.range;
        DeclEvent {
            usr_name: usr_name.into(),
            short_name: short_name.into(),
            kind,
            storage: StorageClass::Invalid,
            spell,
            extent,
            is_definition: false,
            is_implicit: false,
            cursor: ContainerId(cursor),
            lexical_container: None,
            semantic_container: None,
            bases: Vec::new(),
            alias_target: None,
            type_usr: None,
            type_desc: None,
            hover: None,
            comments: None,
            param_spellings: Vec::new(),
        }
    }
}

/// One reference observed by the frontend. Macro expansions report the
/// expansion site in the including file.
#[derive(Debug, Clone, PartialEq)]
pub struct RefEvent {
    pub usr_name: String,
    pub short_name: SmolStr,
    pub kind: EntityKind,
    pub loc: Loc,
    pub role: Role,
    /// Lexical parent of the occurrence.
    pub container: Option<ContainerId>,
}

impl RefEvent {
    pub fn new(
        usr_name: impl Into<String>,
        short_name: impl Into<SmolStr>,
        kind: EntityKind,
        loc: Loc,
        role: Role,
    ) -> RefEvent {
        RefEvent {
            usr_name: usr_name.into(),
            short_name: short_name.into(),
            kind,
            loc,
            role,
            container: None,
        }
    }
}

/// One `#include` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeEvent {
    /// The including file.
    pub file: SourceFile,
    /// Line of the directive; a line is enough for navigation.
    pub line: u32,
    pub resolved: SourceFile,
}

impl IncludeEvent {
    pub fn new(file: SourceFile, line: u32, resolved: SourceFile) -> IncludeEvent {
        IncludeEvent { file, line, resolved }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Information,
    Hint,
}

/// A diagnostic reported during the parse. Data, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub message: String,
}

/// Receives the serial event stream of one parse.
///
/// Implementations need no internal locking: the frontend may parallelize
/// internally but delivers events from a single thread.
pub trait IndexSink {
    fn started_translation_unit(&mut self) {}
    fn entered_main_file(&mut self, _file: &SourceFile) {}
    fn included_file(&mut self, _include: &IncludeEvent) {}
    fn imported_unit(&mut self, _file: &SourceFile) {}
    fn declaration(&mut self, _decl: &DeclEvent) {}
    fn reference(&mut self, _reference: &RefEvent) {}
    fn skipped_range(&mut self, _file: &SourceFile, _range: Range) {}
    fn diagnostic(&mut self, _file: &SourceFile, _diag: &Diag) {}
}
