use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source language of a translation unit, derived from the file extension.
///
/// Headers deliberately map to `Unknown`: they are indexed through the
/// translation units that include them, never on their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageId {
    #[default]
    Unknown,
    C,
    Cpp,
    ObjC,
    ObjCpp,
}

pub fn language_of(path: &Path) -> LanguageId {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("c") => LanguageId::C,
        Some("cc" | "cpp" | "cxx" | "c++") => LanguageId::Cpp,
        Some("m") => LanguageId::ObjC,
        Some("mm") => LanguageId::ObjCpp,
        _ => LanguageId::Unknown,
    }
}
