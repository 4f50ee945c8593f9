//! Symbol taxonomies and occurrence records.

use frontend::{EntityKind, Role};
use position::Range;
use serde::{Deserialize, Serialize};

use crate::id::{AnyKind, Id};

/// Coarse entity discriminant, switching between the three entity arrays.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SymbolKind {
    #[default]
    Invalid,
    File,
    Type,
    Func,
    Var,
}

/// The richer editor-facing taxonomy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LsSymbolKind {
    #[default]
    Unknown,
    File,
    Module,
    Namespace,
    Package,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    String,
    Number,
    Boolean,
    Array,
    Object,
    Key,
    Null,
    EnumMember,
    Struct,
    Event,
    Operator,
    TypeParameter,
    TypeAlias,
    Parameter,
    Macro,
}

impl From<EntityKind> for LsSymbolKind {
    fn from(kind: EntityKind) -> LsSymbolKind {
        match kind {
            EntityKind::Unknown => LsSymbolKind::Unknown,
            EntityKind::File => LsSymbolKind::File,
            EntityKind::Module => LsSymbolKind::Module,
            EntityKind::Namespace => LsSymbolKind::Namespace,
            EntityKind::Class => LsSymbolKind::Class,
            EntityKind::Struct | EntityKind::Union => LsSymbolKind::Struct,
            EntityKind::Enum => LsSymbolKind::Enum,
            EntityKind::EnumMember => LsSymbolKind::EnumMember,
            EntityKind::TypeAlias => LsSymbolKind::TypeAlias,
            EntityKind::Function => LsSymbolKind::Function,
            EntityKind::Method | EntityKind::Destructor => LsSymbolKind::Method,
            EntityKind::Constructor => LsSymbolKind::Constructor,
            EntityKind::Field => LsSymbolKind::Field,
            EntityKind::Variable => LsSymbolKind::Variable,
            EntityKind::Parameter => LsSymbolKind::Parameter,
            EntityKind::Macro => LsSymbolKind::Macro,
        }
    }
}

/// Which entity array a frontend declaration lands in. Namespaces are
/// handled before this mapping; files and modules are not entities.
pub fn symbol_kind_of(kind: EntityKind) -> SymbolKind {
    match kind {
        EntityKind::Class
        | EntityKind::Struct
        | EntityKind::Union
        | EntityKind::Enum
        | EntityKind::TypeAlias => SymbolKind::Type,
        EntityKind::Function
        | EntityKind::Method
        | EntityKind::Constructor
        | EntityKind::Destructor => SymbolKind::Func,
        EntityKind::Field
        | EntityKind::Variable
        | EntityKind::Parameter
        | EntityKind::EnumMember
        | EntityKind::Macro => SymbolKind::Var,
        EntityKind::Unknown | EntityKind::File | EntityKind::Module | EntityKind::Namespace => {
            SymbolKind::Invalid
        }
    }
}

/// An occurrence: a range plus a kind-erased id and its discriminant.
///
/// The derived order (range, id, kind, role) is the sort and dedup key for
/// declaration and use lists.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Reference {
    pub range: Range,
    pub id: Id<AnyKind>,
    pub kind: SymbolKind,
    pub role: Role,
}

/// An occurrence whose id/kind denote the *referenced* entity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SymbolRef(pub Reference);

impl SymbolRef {
    pub fn new(range: Range, id: Id<AnyKind>, kind: SymbolKind, role: Role) -> SymbolRef {
        SymbolRef(Reference { range, id, kind, role })
    }
}

/// An occurrence whose id/kind denote the *lexical parent*. The owning file
/// is implicit inside an `IndexFile`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Use(pub Reference);

impl Use {
    pub fn new(range: Range, id: Id<AnyKind>, kind: SymbolKind, role: Role) -> Use {
        Use(Reference { range, id, kind, role })
    }
}
