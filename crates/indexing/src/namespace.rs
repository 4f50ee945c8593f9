//! Qualified-name synthesis.
//!
//! The frontend reports only unqualified spellings; qualified names are
//! built by walking the chain of enclosing containers, with the cumulative
//! prefix memoized per container cursor. Offsets are chosen so the
//! qualified span begins *after* any pure-namespace prefix: the editor
//! usually wants `C::m`, not `ns::C::m`.

use frontend::ContainerId;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
struct ContainerPrefix {
    /// Cumulative prefix including a trailing `::`.
    text: String,
    /// Byte length of the leading pure-namespace portion of `text`.
    namespace_len: u16,
}

#[derive(Debug, Default)]
pub struct NamespaceHelper {
    prefixes: FxHashMap<ContainerId, ContainerPrefix>,
}

impl NamespaceHelper {
    /// Records `cursor` as a container nested in `parent`. Must be called
    /// in traversal order so the parent prefix is already memoized.
    pub fn register(
        &mut self,
        cursor: ContainerId,
        parent: Option<ContainerId>,
        short_name: &str,
        is_namespace: bool,
    ) {
        let (mut text, mut namespace_len) = match parent.and_then(|p| self.prefixes.get(&p)) {
            Some(prefix) => (prefix.text.clone(), prefix.namespace_len),
            None => (String::new(), 0),
        };
        let pure_namespaces_so_far = usize::from(namespace_len) == text.len();
        if short_name.is_empty() {
            text.push_str(if is_namespace { "(anonymous namespace)" } else { "(anon)" });
        } else {
            text.push_str(short_name);
        }
        text.push_str("::");
        if is_namespace && pure_namespaces_so_far {
            namespace_len = text.len() as u16;
        }
        self.prefixes.insert(cursor, ContainerPrefix { text, namespace_len });
    }

    /// Returns `(qualified_string, qual_name_offset, short_name_offset)`
    /// for an unqualified name declared in `container`.
    pub fn qualified_name(
        &self,
        container: Option<ContainerId>,
        short_name: &str,
    ) -> (String, u16, u16) {
        match container.and_then(|c| self.prefixes.get(&c)) {
            None => (short_name.to_string(), 0, 0),
            Some(prefix) => {
                let mut text = prefix.text.clone();
                let qual_name_offset = prefix.namespace_len;
                let short_name_offset = text.len() as u16;
                text.push_str(short_name);
                (text, qual_name_offset, short_name_offset)
            }
        }
    }
}

/// Splices a declarator name into a textual type, returning the byte
/// offset where the name begins.
///
/// `int` + `x` gives `int x`; `void (int) const` + `ns::f` gives
/// `void ns::f(int) const`. Function-pointer types keep the appended form.
pub fn concat_type_and_name(type_desc: &mut String, name: &str) -> u16 {
    if let Some(paren) = type_desc.find('(') {
        let next = type_desc.as_bytes().get(paren + 1);
        if next != Some(&b'*') && next != Some(&b'&') {
            let mut at = paren;
            while at > 0 && type_desc.as_bytes()[at - 1] == b' ' {
                at -= 1;
            }
            let separated = if at > 0 { at + 1 } else { 0 };
            type_desc.replace_range(separated..paren, "");
            type_desc.insert_str(separated, name);
            return separated as u16;
        }
    }
    if !type_desc.is_empty() && !type_desc.ends_with([' ', '*', '&']) {
        type_desc.push(' ');
    }
    let offset = type_desc.len() as u16;
    type_desc.push_str(name);
    offset
}
