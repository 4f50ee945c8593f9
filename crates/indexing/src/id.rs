//! Typed compact handles.
//!
//! An [`Id`] is a 32-bit index paired with a compile-time entity kind; it
//! is meaningful only within one `IndexFile`. Widening to the kind-erased
//! [`Id<AnyKind>`] is free; narrowing is explicit and unchecked.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind-erased; used for heterogeneous storage next to a discriminant.
pub enum AnyKind {}
pub enum FileKind {}
pub enum TypeKind {}
pub enum FuncKind {}
pub enum VarKind {}

pub type FileId = Id<FileKind>;
pub type TypeId = Id<TypeKind>;
pub type FuncId = Id<FuncKind>;
pub type VarId = Id<VarKind>;

const INVALID: u32 = u32::MAX;

/// An index associated with an entity kind.
pub struct Id<K> {
    raw: u32,
    _marker: PhantomData<fn() -> K>,
}

impl<K> Id<K> {
    pub fn from_raw(raw: u32) -> Id<K> {
        Id { raw, _marker: PhantomData }
    }

    pub fn invalid() -> Id<K> {
        Id::from_raw(INVALID)
    }

    pub fn valid(self) -> bool {
        self.raw != INVALID
    }

    pub fn raw(self) -> u32 {
        self.raw
    }

    /// Widens to the kind-erased form.
    pub fn erase(self) -> Id<AnyKind> {
        Id::from_raw(self.raw)
    }

    /// Narrows a kind-erased id. Unchecked: the caller vouches, usually by
    /// having switched on the accompanying `SymbolKind` discriminant.
    pub fn from_erased(id: Id<AnyKind>) -> Id<K> {
        Id::from_raw(id.raw)
    }
}

impl From<FileId> for Id<AnyKind> {
    fn from(id: FileId) -> Id<AnyKind> {
        id.erase()
    }
}

impl From<TypeId> for Id<AnyKind> {
    fn from(id: TypeId) -> Id<AnyKind> {
        id.erase()
    }
}

impl From<FuncId> for Id<AnyKind> {
    fn from(id: FuncId) -> Id<AnyKind> {
        id.erase()
    }
}

impl From<VarId> for Id<AnyKind> {
    fn from(id: VarId) -> Id<AnyKind> {
        id.erase()
    }
}

impl<K> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid() {
            f.debug_tuple("Id").field(&self.raw).finish()
        } else {
            f.write_str("Id(invalid)")
        }
    }
}

impl<K> Clone for Id<K> {
    fn clone(&self) -> Id<K> {
        *self
    }
}

impl<K> Copy for Id<K> {}

impl<K> Default for Id<K> {
    fn default() -> Id<K> {
        Id::invalid()
    }
}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Id<K>) -> bool {
        self.raw == other.raw
    }
}

impl<K> Eq for Id<K> {}

impl<K> PartialOrd for Id<K> {
    fn partial_cmp(&self, other: &Id<K>) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Id<K> {
    fn cmp(&self, other: &Id<K>) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<K> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.raw)
    }
}

impl<'de, K> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Id<K>, D::Error> {
        u32::deserialize(deserializer).map(Id::from_raw)
    }
}
