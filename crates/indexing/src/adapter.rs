//! The indexing callback adapter.
//!
//! [`IndexParam`] implements the frontend's [`IndexSink`], projecting the
//! serial event stream of one parse onto the entity model: every event is
//! attributed to the file it occurs in, every id it mentions is interned
//! into that file's cache, and lexical parents are resolved through the
//! container map. Domain errors never fail the parse; the offending event
//! is logged and skipped.

use frontend::{
    ContainerId, DeclEvent, Diag, EntityKind, IncludeEvent, IndexSink, RefEvent, Role, SourceFile,
};
use position::Range;
use rustc_hash::FxHashMap;

use crate::consumer::{FileConsumer, FileConsumerSharedState};
use crate::entities::{FuncDeclaration, add_sorted, add_unique};
use crate::id::{AnyKind, FileId, FuncId, Id, TypeId};
use crate::namespace::{NamespaceHelper, concat_type_and_name};
use crate::symbol::{LsSymbolKind, SymbolKind, SymbolRef, Use, symbol_kind_of};
use crate::{IndexFile, IndexInclude, Usr};

#[derive(Debug, Clone, Copy)]
struct Container {
    usr: Usr,
    kind: SymbolKind,
}

/// Per-parse adapter state. Thread-local to the owning worker; the event
/// stream is serial, so no internal locking.
pub(crate) struct IndexParam<'a> {
    consumer: FileConsumer<'a>,
    ns: NamespaceHelper,
    containers: FxHashMap<ContainerId, Container>,
}

impl<'a> IndexParam<'a> {
    pub(crate) fn new(shared: &'a FileConsumerSharedState, root: &SourceFile) -> IndexParam<'a> {
        IndexParam {
            consumer: FileConsumer::new(shared, root),
            ns: NamespaceHelper::default(),
            containers: FxHashMap::default(),
        }
    }

    pub(crate) fn finish(self) -> Vec<IndexFile> {
        self.consumer.finish()
    }

    /// Resolves a lexical container to `(id, kind)` interned in `file`.
    /// Events outside any container belong to the file itself.
    fn lexical_parent(
        containers: &FxHashMap<ContainerId, Container>,
        file: &mut IndexFile,
        file_id: FileId,
        container: Option<ContainerId>,
    ) -> (Id<AnyKind>, SymbolKind) {
        match container.and_then(|cursor| containers.get(&cursor)) {
            Some(parent) => match parent.kind {
                SymbolKind::Type => (file.to_type_id(parent.usr).erase(), SymbolKind::Type),
                SymbolKind::Func => (file.to_func_id(parent.usr).erase(), SymbolKind::Func),
                SymbolKind::Var => (file.to_var_id(parent.usr).erase(), SymbolKind::Var),
                SymbolKind::Invalid | SymbolKind::File => (file_id.erase(), SymbolKind::File),
            },
            None => (file_id.erase(), SymbolKind::File),
        }
    }
}

impl IndexSink for IndexParam<'_> {
    fn started_translation_unit(&mut self) {
        tracing::trace!("started translation unit");
    }

    fn entered_main_file(&mut self, file: &SourceFile) {
        self.consumer.enter(file);
    }

    fn included_file(&mut self, include: &IncludeEvent) {
        let file_id = self.consumer.enter(&include.file);
        self.consumer.enter(&include.resolved);
        let file = self.consumer.get_mut(file_id);
        file.includes.push(IndexInclude {
            line: include.line,
            resolved_path: include.resolved.path.clone(),
        });
    }

    fn imported_unit(&mut self, file: &SourceFile) {
        self.consumer.enter(file);
    }

    fn declaration(&mut self, decl: &DeclEvent) {
        let name_parent = decl.semantic_container.or(decl.lexical_container);

        // Namespaces shape qualified names and containment but get no
        // entity record of their own.
        if decl.kind == EntityKind::Namespace {
            self.ns.register(decl.cursor, name_parent, &decl.short_name, true);
            return;
        }

        let kind = symbol_kind_of(decl.kind);
        if kind == SymbolKind::Invalid {
            tracing::warn!(
                usr = %decl.usr_name,
                kind = ?decl.kind,
                "skipping declaration of unsupported kind"
            );
            return;
        }

        let usr = Usr::of(&decl.usr_name);
        let (qualified, qual_in_name, short_in_name) =
            self.ns.qualified_name(name_parent, &decl.short_name);
        self.ns.register(decl.cursor, name_parent, &decl.short_name, false);
        self.containers.insert(decl.cursor, Container { usr, kind });

        let file_id = self.consumer.enter(&decl.spell.file);
        let containers = &self.containers;
        let file = self.consumer.get_mut(file_id);
        let (parent_id, parent_kind) =
            Self::lexical_parent(containers, file, file_id, decl.lexical_container);

        let mut role = if decl.is_definition { Role::DEFINITION } else { Role::DECLARATION };
        if decl.is_implicit {
            role |= Role::IMPLICIT;
        }
        let spell = Use::new(decl.spell.range, parent_id, parent_kind, role);
        let extent = Use::new(decl.extent, parent_id, parent_kind, role);

        match kind {
            SymbolKind::Type => {
                let id = file.to_type_id(usr);
                {
                    let ty = file.resolve_type(id);
                    if decl.is_definition || ty.def.name.detailed_name.is_empty() {
                        ty.def.name.detailed_name = qualified;
                        ty.def.name.qual_name_offset = qual_in_name;
                        ty.def.name.short_name_offset = short_in_name;
                        ty.def.name.short_name_size = decl.short_name.len() as u16;
                        ty.def.name.file = file_id;
                        ty.def.kind = LsSymbolKind::from(decl.kind);
                    }
                    if let Some(hover) = &decl.hover {
                        ty.def.name.hover = Some(hover.clone());
                    }
                    if let Some(comments) = &decl.comments {
                        ty.def.name.comments = Some(comments.clone());
                    }
                    if decl.is_definition {
                        ty.def.name.spell = Some(spell);
                        ty.def.name.extent = Some(extent);
                    } else {
                        add_sorted(&mut ty.declarations, spell);
                    }
                }
                if let Some(target) = &decl.alias_target {
                    let target_id = file.to_type_id(Usr::of(target));
                    file.resolve_type(id).def.alias_of = Some(target_id);
                }
                for base in &decl.bases {
                    let base_id = file.to_type_id(Usr::of(base));
                    add_unique(&mut file.resolve_type(id).def.bases, base_id);
                    add_unique(&mut file.resolve_type(base_id).derived, id);
                }
                if parent_kind == SymbolKind::Type {
                    let parent = TypeId::from_erased(parent_id);
                    add_unique(&mut file.resolve_type(parent).def.types, id);
                }
            }
            SymbolKind::Func => {
                let id = file.to_func_id(usr);
                let mut detailed = decl.type_desc.clone().unwrap_or_default();
                let name_offset = concat_type_and_name(&mut detailed, &qualified);
                {
                    let func = file.resolve_func(id);
                    if decl.is_definition || func.def.name.detailed_name.is_empty() {
                        func.def.name.detailed_name = detailed;
                        func.def.name.qual_name_offset = name_offset + qual_in_name;
                        func.def.name.short_name_offset = name_offset + short_in_name;
                        func.def.name.short_name_size = decl.short_name.len() as u16;
                        func.def.name.file = file_id;
                        func.def.kind = LsSymbolKind::from(decl.kind);
                        func.def.storage = decl.storage;
                    }
                    if let Some(hover) = &decl.hover {
                        func.def.name.hover = Some(hover.clone());
                    }
                    if let Some(comments) = &decl.comments {
                        func.def.name.comments = Some(comments.clone());
                    }
                    if decl.is_definition {
                        func.def.name.spell = Some(spell);
                        func.def.name.extent = Some(extent);
                    } else {
                        add_sorted(
                            &mut func.declarations,
                            FuncDeclaration {
                                spell,
                                param_spellings: decl.param_spellings.clone(),
                            },
                        );
                    }
                }
                for base in &decl.bases {
                    let base_id = file.to_func_id(Usr::of(base));
                    add_unique(&mut file.resolve_func(id).def.bases, base_id);
                    add_unique(&mut file.resolve_func(base_id).derived, id);
                }
                if let Some(Container { usr: type_usr, kind: SymbolKind::Type }) =
                    name_parent.and_then(|cursor| containers.get(&cursor))
                {
                    let declaring = file.to_type_id(*type_usr);
                    file.resolve_func(id).def.declaring_type = Some(declaring);
                    add_unique(&mut file.resolve_type(declaring).def.funcs, id);
                }
            }
            SymbolKind::Var => {
                let id = file.to_var_id(usr);
                let mut detailed = decl.type_desc.clone().unwrap_or_default();
                let name_offset = concat_type_and_name(&mut detailed, &qualified);
                {
                    let var = file.resolve_var(id);
                    if decl.is_definition || var.def.name.detailed_name.is_empty() {
                        var.def.name.detailed_name = detailed;
                        var.def.name.qual_name_offset = name_offset + qual_in_name;
                        var.def.name.short_name_offset = name_offset + short_in_name;
                        var.def.name.short_name_size = decl.short_name.len() as u16;
                        var.def.name.file = file_id;
                        var.def.kind = LsSymbolKind::from(decl.kind);
                        var.def.storage = decl.storage;
                    }
                    if let Some(hover) = &decl.hover {
                        var.def.name.hover = Some(hover.clone());
                    }
                    if let Some(comments) = &decl.comments {
                        var.def.name.comments = Some(comments.clone());
                    }
                    if decl.is_definition {
                        var.def.name.spell = Some(spell);
                        var.def.name.extent = Some(extent);
                    } else {
                        add_sorted(&mut var.declarations, spell);
                    }
                }
                if let Some(type_usr) = &decl.type_usr {
                    let ty = file.to_type_id(Usr::of(type_usr));
                    file.resolve_var(id).def.ty = Some(ty);
                    add_unique(&mut file.resolve_type(ty).instances, id);
                }
                match parent_kind {
                    SymbolKind::Type => {
                        let parent = TypeId::from_erased(parent_id);
                        add_unique(&mut file.resolve_type(parent).def.vars, id);
                    }
                    SymbolKind::Func => {
                        let parent = FuncId::from_erased(parent_id);
                        add_unique(&mut file.resolve_func(parent).def.vars, id);
                    }
                    _ => {}
                }
            }
            SymbolKind::Invalid | SymbolKind::File => unreachable!(),
        }
    }

    fn reference(&mut self, reference: &RefEvent) {
        let kind = symbol_kind_of(reference.kind);
        if kind == SymbolKind::Invalid {
            if reference.kind == EntityKind::Unknown {
                tracing::warn!(usr = %reference.usr_name, "skipping reference of unknown kind");
            }
            return;
        }

        let usr = Usr::of(&reference.usr_name);
        let file_id = self.consumer.enter(&reference.loc.file);
        let containers = &self.containers;
        let file = self.consumer.get_mut(file_id);
        let (parent_id, parent_kind) =
            Self::lexical_parent(containers, file, file_id, reference.container);
        let occurrence = Use::new(reference.loc.range, parent_id, parent_kind, reference.role);

        match kind {
            SymbolKind::Type => {
                let id = file.to_type_id(usr);
                add_sorted(&mut file.resolve_type(id).uses, occurrence);
            }
            SymbolKind::Func => {
                let id = file.to_func_id(usr);
                if reference.role.contains(Role::CALL) && parent_kind == SymbolKind::Func {
                    let caller = FuncId::from_erased(parent_id);
                    let callee = SymbolRef::new(
                        reference.loc.range,
                        id.erase(),
                        SymbolKind::Func,
                        reference.role,
                    );
                    add_unique(&mut file.resolve_func(caller).def.callees, callee);
                } else {
                    add_sorted(&mut file.resolve_func(id).uses, occurrence);
                }
            }
            SymbolKind::Var => {
                let id = file.to_var_id(usr);
                add_sorted(&mut file.resolve_var(id).uses, occurrence);
            }
            SymbolKind::Invalid | SymbolKind::File => unreachable!(),
        }
    }

    fn skipped_range(&mut self, file: &SourceFile, range: Range) {
        let file_id = self.consumer.enter(file);
        self.consumer.get_mut(file_id).skipped_by_preprocessor.push(range);
    }

    fn diagnostic(&mut self, file: &SourceFile, diag: &Diag) {
        let file_id = self.consumer.enter(file);
        self.consumer.get_mut(file_id).diagnostics.push(diag.clone());
    }
}
