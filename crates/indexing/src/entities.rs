//! The entity records: types, functions, variables.
//!
//! Each record is a shared name header ([`NameData`]) plus a kind-specific
//! definition tail, composed rather than inherited. Cross-entity links are
//! ids, never owning pointers; cycles exist only in the logical graph.

use frontend::StorageClass;
use position::Range;
use serde::{Deserialize, Serialize};

use crate::Usr;
use crate::id::{FileId, FuncId, TypeId, VarId};
use crate::symbol::{LsSymbolKind, SymbolRef, Use};

/// Name and location metadata shared by every definition record.
///
/// `detailed_name` is the fully-qualified declaration string; the three
/// offsets carve out the qualified-name and short-name substrings so they
/// are computed once during indexing and never rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameData {
    pub detailed_name: String,
    pub qual_name_offset: u16,
    pub short_name_offset: u16,
    pub short_name_size: u16,
    pub hover: Option<String>,
    pub comments: Option<String>,
    /// The name token. Set only by a definition.
    pub spell: Option<Use>,
    /// The whole declaration; `spell` is contained in it.
    pub extent: Option<Use>,
    pub file: FileId,
}

impl NameData {
    /// The class-qualified form, past any pure-namespace prefix.
    pub fn qualified_name(&self) -> &str {
        let end = usize::from(self.short_name_offset) + usize::from(self.short_name_size);
        &self.detailed_name[usize::from(self.qual_name_offset)..end]
    }

    pub fn short_name(&self) -> &str {
        let begin = usize::from(self.short_name_offset);
        &self.detailed_name[begin..begin + usize::from(self.short_name_size)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDef {
    pub name: NameData,
    pub kind: LsSymbolKind,
    /// Immediate parent types.
    pub bases: Vec<TypeId>,
    /// Types, functions, and variables declared inside this type.
    pub types: Vec<TypeId>,
    pub funcs: Vec<FuncId>,
    pub vars: Vec<VarId>,
    /// Set iff this type comes from a typedef or using statement.
    pub alias_of: Option<TypeId>,
}

/// A type, with its definition collapsed into the declaration record: a
/// forward `class Foo;` carries nothing worth navigating to on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexType {
    pub usr: Usr,
    pub id: TypeId,
    pub def: TypeDef,
    pub declarations: Vec<Use>,
    /// Immediate derived types observed in this translation unit.
    pub derived: Vec<TypeId>,
    /// Declared variables of this type.
    pub instances: Vec<VarId>,
    pub uses: Vec<Use>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuncDef {
    pub name: NameData,
    pub kind: LsSymbolKind,
    pub storage: StorageClass,
    /// Methods this method overrides.
    pub bases: Vec<FuncId>,
    /// Local variables and parameters.
    pub vars: Vec<VarId>,
    pub callees: Vec<SymbolRef>,
    /// Set iff this is a method.
    pub declaring_type: Option<TypeId>,
}

/// One forward declaration of a function: the name spelling plus the
/// parameter-name spellings.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(default)]
pub struct FuncDeclaration {
    pub spell: Use,
    pub param_spellings: Vec<Range>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexFunc {
    pub usr: Usr,
    pub id: FuncId,
    pub def: FuncDef,
    pub declarations: Vec<FuncDeclaration>,
    /// Methods which directly override this one.
    pub derived: Vec<FuncId>,
    /// Non-call references; calls live in the caller's `callees`.
    pub uses: Vec<Use>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarDef {
    pub name: NameData,
    pub kind: LsSymbolKind,
    /// A variable may carry both `None` (definition) and `Extern`
    /// (declaration) over its lifetime; the definition wins.
    pub storage: StorageClass,
    /// Type of the variable, if known.
    pub ty: Option<TypeId>,
}

impl VarDef {
    pub fn is_local(&self) -> bool {
        self.kind == LsSymbolKind::Variable
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexVar {
    pub usr: Usr,
    pub id: VarId,
    pub def: VarDef,
    pub declarations: Vec<Use>,
    pub uses: Vec<Use>,
}

/// Inserts into a sorted vector, dropping exact duplicates.
pub(crate) fn add_sorted<T: Ord>(items: &mut Vec<T>, item: T) {
    if let Err(slot) = items.binary_search(&item) {
        items.insert(slot, item);
    }
}

/// Appends unless already present, keeping first-seen order.
pub(crate) fn add_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
