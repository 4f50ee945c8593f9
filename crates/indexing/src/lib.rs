//! The indexing core: one parse in, per-file entity records out.
//!
//! Given a translation unit (root file, argument vector, unsaved-buffer
//! snapshot), the indexer drives the compiler frontend once and fans the
//! event stream out into one [`IndexFile`] per distinct source file
//! touched. Entities are deduplicated across translation units by [`Usr`]
//! and referenced within one file by compact typed [`Id`]s.
//!
//! [`Id`]: id::Id

mod adapter;
mod consumer;
mod entities;
mod id;
mod indexer;
mod namespace;
mod serialize;
mod symbol;

pub use consumer::FileConsumerSharedState;
pub use entities::{
    FuncDeclaration, FuncDef, IndexFunc, IndexType, IndexVar, NameData, TypeDef, VarDef,
};
pub use frontend::{Role, StorageClass};
pub use id::{AnyKind, FileId, FileKind, FuncId, FuncKind, Id, TypeId, TypeKind, VarId, VarKind};
pub use indexer::{
    FrontendIndexer, IndexPerf, Indexer, TestEntry, TestIndexer, parse, parse_with_tu,
};
pub use namespace::{NamespaceHelper, concat_type_and_name};
pub use serialize::{CacheError, from_binary, from_json_str, to_binary, to_json_string};
pub use symbol::{LsSymbolKind, Reference, SymbolKind, SymbolRef, Use, symbol_kind_of};

use std::hash::Hasher;
use std::ops;
use std::path::PathBuf;

use files::LanguageId;
use frontend::Diag;
use position::Range;
use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};

/// Cache format versions. The major version gates both formats; the minor
/// version gates only the compact binary format, which makes no
/// compatibility effort across field changes.
pub const MAJOR_VERSION: i32 = 4;
pub const MINOR_VERSION: i32 = 0;

/// Universal Symbol Reference: a fixed-width hash of the frontend's
/// unified symbol name, the only cross-translation-unit identifier.
/// Collisions are treated as identity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Usr(pub u64);

impl Usr {
    pub fn of(unified_name: &str) -> Usr {
        let mut hasher = FxHasher::default();
        hasher.write(unified_name.as_bytes());
        Usr(hasher.finish())
    }
}

/// The bijection `Usr` ↔ `Id` local to one [`IndexFile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdCache {
    pub primary_file: PathBuf,
    pub usr_to_type_id: FxHashMap<Usr, TypeId>,
    pub usr_to_func_id: FxHashMap<Usr, FuncId>,
    pub usr_to_var_id: FxHashMap<Usr, VarId>,
    pub type_id_to_usr: FxHashMap<TypeId, Usr>,
    pub func_id_to_usr: FxHashMap<FuncId, Usr>,
    pub var_id_to_usr: FxHashMap<VarId, Usr>,
}

/// One `#include` edge: the directive line and where it resolved to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexInclude {
    pub line: u32,
    pub resolved_path: PathBuf,
}

/// The per-source-file output record of one parse.
///
/// Frozen once the parse ends and ownership transfers to the caller;
/// never mutated after return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexFile {
    #[serde(skip)]
    pub id_cache: IdCache,

    pub path: PathBuf,
    pub args: Vec<String>,
    pub last_modification_time: i64,
    pub language: LanguageId,

    /// The translation-unit file whose parse created this record; differs
    /// from `path` for headers. Editing a header reindexes this file.
    pub import_file: PathBuf,

    /// Source ranges the preprocessor elided.
    pub skipped_by_preprocessor: Vec<Range>,

    pub includes: Vec<IndexInclude>,
    pub dependencies: Vec<PathBuf>,
    pub types: Vec<IndexType>,
    pub funcs: Vec<IndexFunc>,
    pub vars: Vec<IndexVar>,

    /// Diagnostics observed while indexing this file. Not serialized.
    #[serde(skip)]
    pub diagnostics: Vec<Diag>,
    /// Contents at the time of indexing. Not serialized.
    #[serde(skip)]
    pub file_contents: String,
}

impl IndexFile {
    pub fn new(path: PathBuf, contents: String) -> IndexFile {
        IndexFile {
            id_cache: IdCache { primary_file: path.clone(), ..IdCache::default() },
            path,
            file_contents: contents,
            ..IndexFile::default()
        }
    }

    /// Interns a USR, allocating a fresh default-initialized record on
    /// first sight. A declaration-first, definition-later stream is the
    /// normal case: the declaration allocates the slot and the definition
    /// later fills in `def` without invalidating outstanding ids.
    pub fn to_type_id(&mut self, usr: Usr) -> TypeId {
        if let Some(&id) = self.id_cache.usr_to_type_id.get(&usr) {
            return id;
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(IndexType { usr, id, ..IndexType::default() });
        self.id_cache.usr_to_type_id.insert(usr, id);
        self.id_cache.type_id_to_usr.insert(id, usr);
        id
    }

    pub fn to_func_id(&mut self, usr: Usr) -> FuncId {
        if let Some(&id) = self.id_cache.usr_to_func_id.get(&usr) {
            return id;
        }
        let id = FuncId::from_raw(self.funcs.len() as u32);
        self.funcs.push(IndexFunc { usr, id, ..IndexFunc::default() });
        self.id_cache.usr_to_func_id.insert(usr, id);
        self.id_cache.func_id_to_usr.insert(id, usr);
        id
    }

    pub fn to_var_id(&mut self, usr: Usr) -> VarId {
        if let Some(&id) = self.id_cache.usr_to_var_id.get(&usr) {
            return id;
        }
        let id = VarId::from_raw(self.vars.len() as u32);
        self.vars.push(IndexVar { usr, id, ..IndexVar::default() });
        self.id_cache.usr_to_var_id.insert(usr, id);
        self.id_cache.var_id_to_usr.insert(id, usr);
        id
    }

    pub fn resolve_type(&mut self, id: TypeId) -> &mut IndexType {
        &mut self.types[id.raw() as usize]
    }

    pub fn resolve_func(&mut self, id: FuncId) -> &mut IndexFunc {
        &mut self.funcs[id.raw() as usize]
    }

    pub fn resolve_var(&mut self, id: VarId) -> &mut IndexVar {
        &mut self.vars[id.raw() as usize]
    }

    /// Rebuilds the id cache from the entity arrays, e.g. after
    /// deserialization. Relies on every record carrying its own usr/id.
    pub fn rebuild_cache(&mut self) {
        self.id_cache = IdCache { primary_file: self.path.clone(), ..IdCache::default() };
        for ty in &self.types {
            self.id_cache.usr_to_type_id.insert(ty.usr, ty.id);
            self.id_cache.type_id_to_usr.insert(ty.id, ty.usr);
        }
        for func in &self.funcs {
            self.id_cache.usr_to_func_id.insert(func.usr, func.id);
            self.id_cache.func_id_to_usr.insert(func.id, func.usr);
        }
        for var in &self.vars {
            self.id_cache.usr_to_var_id.insert(var.usr, var.id);
            self.id_cache.var_id_to_usr.insert(var.id, var.usr);
        }
    }
}

impl ops::Index<TypeId> for IndexFile {
    type Output = IndexType;

    fn index(&self, id: TypeId) -> &IndexType {
        &self.types[id.raw() as usize]
    }
}

impl ops::Index<FuncId> for IndexFile {
    type Output = IndexFunc;

    fn index(&self, id: FuncId) -> &IndexFunc {
        &self.funcs[id.raw() as usize]
    }
}

impl ops::Index<VarId> for IndexFile {
    type Output = IndexVar;

    fn index(&self, id: VarId) -> &IndexVar {
        &self.vars[id.raw() as usize]
    }
}
