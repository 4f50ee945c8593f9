//! End-to-end scenarios driving the full parse pipeline over a scripted
//! frontend: façade → crash shim → adapter → arbiter → harvested files.

use std::path::Path;
use std::sync::Arc;

use frontend::fake::{FakeFrontend, UnitScript};
use frontend::{
    DeclEvent, Diag, DiagnosticSeverity, EntityKind, FrontendIndex, IncludeEvent, Loc, RefEvent,
    Role, SourceFile, TranslationUnit,
};
use files::Snapshot;
use indexing::{
    FileConsumerSharedState, IndexFile, IndexPerf, LsSymbolKind, from_json_str, parse,
    parse_with_tu, to_json_string,
};
use position::{Position, Range};

fn range(line: u32, begin: u32, end: u32) -> Range {
    Range::new(Position::new(line, begin), Position::new(line, end))
}

fn span(begin_line: u32, begin: u32, end_line: u32, end: u32) -> Range {
    Range::new(Position::new(begin_line, begin), Position::new(end_line, end))
}

fn at(file: &SourceFile, line: u32, begin: u32, end: u32) -> Loc {
    Loc::new(file.clone(), range(line, begin, end))
}

fn run(frontend: FakeFrontend, root: &str, shared: &FileConsumerSharedState) -> Vec<IndexFile> {
    let index = FrontendIndex::new(Arc::new(frontend));
    let mut perf = IndexPerf::default();
    parse(shared, &index, Path::new(root), &[], &Snapshot::default(), &mut perf)
}

/// `namespace n { class C { void m(); }; void n::C::m() {} }` in one file.
fn class_with_method(root: &SourceFile) -> UnitScript {
    UnitScript::new()
        .entered_main_file(root.clone())
        .declaration(DeclEvent {
            is_definition: true,
            ..DeclEvent::new("c:@N@n", "n", EntityKind::Namespace, 1, at(root, 1, 11, 12))
        })
        .declaration(DeclEvent {
            is_definition: true,
            extent: span(1, 15, 1, 38),
            lexical_container: Some(frontend::ContainerId(1)),
            ..DeclEvent::new("c:@N@n@S@C", "C", EntityKind::Class, 2, at(root, 1, 21, 22))
        })
        .declaration(DeclEvent {
            lexical_container: Some(frontend::ContainerId(2)),
            type_desc: Some("void ()".to_string()),
            ..DeclEvent::new("c:@N@n@S@C@F@m#", "m", EntityKind::Method, 3, at(root, 1, 30, 31))
        })
        .declaration(DeclEvent {
            is_definition: true,
            extent: span(1, 40, 1, 58),
            lexical_container: Some(frontend::ContainerId(1)),
            semantic_container: Some(frontend::ContainerId(2)),
            type_desc: Some("void ()".to_string()),
            ..DeclEvent::new("c:@N@n@S@C@F@m#", "m", EntityKind::Method, 4, at(root, 1, 51, 52))
        })
}

#[test]
fn single_file_class_and_method() {
    let root = SourceFile::new("/proj/a.cc");
    let frontend = FakeFrontend::new();
    frontend.script("/proj/a.cc", class_with_method(&root));

    let shared = FileConsumerSharedState::new();
    let files = run(frontend, "/proj/a.cc", &shared);
    assert_eq!(files.len(), 1);
    let file = &files[0];
    assert_eq!(file.path, root.path);
    assert_eq!(file.import_file, root.path);

    assert_eq!(file.types.len(), 1);
    assert_eq!(file.funcs.len(), 1);
    assert!(file.vars.is_empty());

    let class = &file.types[0];
    assert_eq!(class.def.name.detailed_name, "n::C");
    assert_eq!(class.def.name.qualified_name(), "C");
    assert_eq!(class.def.name.short_name(), "C");
    assert_eq!(class.def.kind, LsSymbolKind::Class);
    assert_eq!(class.def.funcs, vec![file.funcs[0].id]);

    let method = &file.funcs[0];
    assert_eq!(method.def.name.detailed_name, "void n::C::m()");
    assert_eq!(method.def.name.qualified_name(), "C::m");
    assert_eq!(method.def.name.short_name(), "m");
    assert_eq!(method.def.declaring_type, Some(class.id));
    assert!(method.def.bases.is_empty());
    assert_eq!(method.declarations.len(), 1);

    let spell = method.def.name.spell.expect("definition spell");
    let extent = method.def.name.extent.expect("definition extent");
    assert!(extent.0.range.contains_range(spell.0.range));
    assert!(spell.0.role.contains(indexing::Role::DEFINITION));
}

#[test]
fn header_declaration_and_source_definition() {
    let root = SourceFile::new("/proj/main.cc");
    let header = SourceFile::new("/proj/util.h");

    let frontend = FakeFrontend::new();
    frontend.script(
        "/proj/main.cc",
        UnitScript::new()
            .entered_main_file(root.clone())
            .include(IncludeEvent::new(root.clone(), 1, header.clone()))
            .declaration(DeclEvent {
                type_desc: Some("int (int, int)".to_string()),
                param_spellings: vec![range(1, 9, 10), range(1, 14, 15)],
                ..DeclEvent::new("c:@F@add#I#I#", "add", EntityKind::Function, 1, at(&header, 1, 5, 8))
            })
            .declaration(DeclEvent {
                is_definition: true,
                extent: span(3, 1, 5, 2),
                type_desc: Some("int (int, int)".to_string()),
                ..DeclEvent::new("c:@F@add#I#I#", "add", EntityKind::Function, 2, at(&root, 3, 5, 8))
            }),
    );

    let shared = FileConsumerSharedState::new();
    let mut files = run(frontend, "/proj/main.cc", &shared);
    files.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(files.len(), 2);

    let main = files.iter().find(|file| file.path == root.path).unwrap();
    let util = files.iter().find(|file| file.path == header.path).unwrap();

    // The entity exists in both files, linked by an identical USR.
    assert_eq!(main.funcs.len(), 1);
    assert_eq!(util.funcs.len(), 1);
    assert_eq!(main.funcs[0].usr, util.funcs[0].usr);

    assert!(main.funcs[0].def.name.spell.is_some());
    assert!(main.funcs[0].declarations.is_empty());
    assert!(util.funcs[0].def.name.spell.is_none());
    assert_eq!(util.funcs[0].declarations.len(), 1);
    assert_eq!(util.funcs[0].declarations[0].param_spellings.len(), 2);

    assert_eq!(main.includes.len(), 1);
    assert_eq!(main.includes[0].line, 1);
    assert_eq!(main.includes[0].resolved_path, header.path);
    assert!(main.dependencies.contains(&header.path));

    // Headers are imported through the translation unit that parsed them.
    assert_eq!(main.import_file, root.path);
    assert_eq!(util.import_file, root.path);
}

#[test]
fn one_worker_wins_each_header() {
    let a = SourceFile::new("/proj/a.cc");
    let b = SourceFile::new("/proj/b.cc");
    let header = SourceFile::new("/proj/util.h");

    let declares_in_header = |root: &SourceFile, cursor: u64| {
        UnitScript::new()
            .entered_main_file(root.clone())
            .include(IncludeEvent::new(root.clone(), 1, header.clone()))
            .declaration(DeclEvent {
                type_desc: Some("int".to_string()),
                ..DeclEvent::new("c:@limit", "limit", EntityKind::Variable, cursor, at(&header, 2, 5, 10))
            })
    };

    let frontend = Arc::new(FakeFrontend::new());
    frontend.script("/proj/a.cc", declares_in_header(&a, 1));
    frontend.script("/proj/b.cc", declares_in_header(&b, 1));

    let shared = FileConsumerSharedState::new();
    let (from_a, from_b) = std::thread::scope(|scope| {
        let worker = |root: &'static str| {
            let frontend = Arc::clone(&frontend);
            let shared = &shared;
            scope.spawn(move || {
                let index = FrontendIndex::new(frontend);
                let mut perf = IndexPerf::default();
                parse(shared, &index, Path::new(root), &[], &Snapshot::default(), &mut perf)
            })
        };
        let a = worker("/proj/a.cc");
        let b = worker("/proj/b.cc");
        (a.join().unwrap(), b.join().unwrap())
    });

    // Each root belongs to its own parse.
    assert!(from_a.iter().any(|file| file.path == a.path));
    assert!(from_b.iter().any(|file| file.path == b.path));

    // The shared header appears exactly once across both bundles.
    let header_copies = from_a
        .iter()
        .chain(from_b.iter())
        .filter(|file| file.path == header.path)
        .count();
    assert_eq!(header_copies, 1);
}

#[test]
fn override_edges_connect_both_directions() {
    let root = SourceFile::new("/proj/virt.cc");
    let frontend = FakeFrontend::new();
    frontend.script(
        "/proj/virt.cc",
        UnitScript::new()
            .entered_main_file(root.clone())
            .declaration(DeclEvent {
                is_definition: true,
                extent: span(1, 1, 1, 40),
                ..DeclEvent::new("c:@S@A", "A", EntityKind::Struct, 1, at(&root, 1, 8, 9))
            })
            .declaration(DeclEvent {
                is_definition: true,
                lexical_container: Some(frontend::ContainerId(1)),
                type_desc: Some("void ()".to_string()),
                ..DeclEvent::new("c:@S@A@F@f#", "f", EntityKind::Method, 2, at(&root, 1, 25, 26))
            })
            .declaration(DeclEvent {
                is_definition: true,
                extent: span(2, 1, 2, 44),
                bases: vec!["c:@S@A".to_string()],
                ..DeclEvent::new("c:@S@B", "B", EntityKind::Struct, 3, at(&root, 2, 8, 9))
            })
            .declaration(DeclEvent {
                is_definition: true,
                lexical_container: Some(frontend::ContainerId(3)),
                bases: vec!["c:@S@A@F@f#".to_string()],
                type_desc: Some("void ()".to_string()),
                ..DeclEvent::new("c:@S@B@F@f#", "f", EntityKind::Method, 4, at(&root, 2, 20, 21))
            }),
    );

    let shared = FileConsumerSharedState::new();
    let files = run(frontend, "/proj/virt.cc", &shared);
    let file = &files[0];

    let a = file.types.iter().find(|ty| ty.def.name.short_name() == "A").unwrap();
    let b = file.types.iter().find(|ty| ty.def.name.short_name() == "B").unwrap();
    assert_eq!(b.def.bases, vec![a.id]);
    assert_eq!(a.derived, vec![b.id]);

    let a_f = file.funcs.iter().find(|func| func.def.declaring_type == Some(a.id)).unwrap();
    let b_f = file.funcs.iter().find(|func| func.def.declaring_type == Some(b.id)).unwrap();
    assert_eq!(b_f.def.bases, vec![a_f.id]);
    assert_eq!(a_f.derived, vec![b_f.id]);
}

#[test]
fn typedefs_alias_their_target() {
    let root = SourceFile::new("/proj/alias.cc");
    let frontend = FakeFrontend::new();
    frontend.script(
        "/proj/alias.cc",
        UnitScript::new().entered_main_file(root.clone()).declaration(DeclEvent {
            is_definition: true,
            alias_target: Some("c:@N@std@ST>2#T#T@vector".to_string()),
            ..DeclEvent::new("c:@U", "U", EntityKind::TypeAlias, 1, at(&root, 1, 7, 8))
        }),
    );

    let shared = FileConsumerSharedState::new();
    let files = run(frontend, "/proj/alias.cc", &shared);
    let file = &files[0];

    let alias = file.types.iter().find(|ty| ty.def.name.short_name() == "U").unwrap();
    let target = alias.def.alias_of.expect("alias target");
    assert_eq!(file[target].usr, indexing::Usr::of("c:@N@std@ST>2#T#T@vector"));
    assert_eq!(alias.def.kind, LsSymbolKind::TypeAlias);
}

#[test]
fn reparse_refreshes_callees() {
    let root = SourceFile::new("/proj/calls.cc");
    let caller = |callee_usr: &str, callee_name: &str| {
        UnitScript::new()
            .entered_main_file(root.clone())
            .declaration(DeclEvent {
                is_definition: true,
                extent: span(1, 1, 3, 2),
                type_desc: Some("void ()".to_string()),
                ..DeclEvent::new("c:@F@caller#", "caller", EntityKind::Function, 1, at(&root, 1, 6, 12))
            })
            .reference(RefEvent {
                container: Some(frontend::ContainerId(1)),
                ..RefEvent::new(
                    callee_usr,
                    callee_name,
                    EntityKind::Function,
                    at(&root, 2, 3, 3 + callee_name.len() as u32),
                    Role::REFERENCE | Role::CALL,
                )
            })
    };

    let frontend = FakeFrontend::new();
    frontend.script("/proj/calls.cc", caller("c:@F@g#", "g").on_reparse(caller("c:@F@h#", "h")));
    let index = FrontendIndex::new(Arc::new(frontend));

    let shared = FileConsumerSharedState::new();
    let snapshot = Snapshot::default();
    let mut perf = IndexPerf::default();
    let mut unit =
        TranslationUnit::create(&index, Path::new("/proj/calls.cc"), &[], &snapshot).unwrap();

    let before = parse_with_tu(&shared, &mut perf, &unit, Path::new("/proj/calls.cc"), &[], &snapshot);
    let callee_usrs = |files: &[IndexFile]| -> Vec<indexing::Usr> {
        let file = files.iter().find(|file| file.path == root.path).unwrap();
        let caller = file.funcs.iter().find(|func| func.def.name.short_name() == "caller").unwrap();
        caller
            .def
            .callees
            .iter()
            .map(|callee| {
                let id = indexing::FuncId::from_erased(callee.0.id);
                file[id].usr
            })
            .collect()
    };
    assert_eq!(callee_usrs(&before), vec![indexing::Usr::of("c:@F@g#")]);

    unit.reparse(&snapshot).unwrap();
    let after = parse_with_tu(&shared, &mut perf, &unit, Path::new("/proj/calls.cc"), &[], &snapshot);
    assert_eq!(callee_usrs(&after), vec![indexing::Usr::of("c:@F@h#")]);
}

#[test]
fn skipped_ranges_and_diagnostics_are_attributed() {
    let root = SourceFile::new("/proj/pp.cc");
    let frontend = FakeFrontend::new();
    frontend.script(
        "/proj/pp.cc",
        UnitScript::new()
            .entered_main_file(root.clone())
            .skipped(root.clone(), span(3, 1, 7, 7))
            .diagnostic(
                root.clone(),
                Diag {
                    range: range(9, 1, 4),
                    severity: DiagnosticSeverity::Warning,
                    message: "unused variable 'x'".to_string(),
                },
            ),
    );

    let shared = FileConsumerSharedState::new();
    let files = run(frontend, "/proj/pp.cc", &shared);
    let file = &files[0];
    assert_eq!(file.skipped_by_preprocessor, vec![span(3, 1, 7, 7)]);
    assert_eq!(file.diagnostics.len(), 1);
    assert_eq!(file.diagnostics[0].message, "unused variable 'x'");

    // Diagnostics are data local to this parse, never serialized.
    let restored = from_json_str(&to_json_string(file).unwrap()).unwrap();
    assert!(restored.diagnostics.is_empty());
    assert_eq!(restored.skipped_by_preprocessor, file.skipped_by_preprocessor);
}

#[test]
fn a_crash_yields_no_partial_results() {
    let root = SourceFile::new("/proj/crash.cc");
    let frontend = FakeFrontend::new();
    frontend.script(
        "/proj/crash.cc",
        UnitScript::new()
            .entered_main_file(root.clone())
            .declaration(DeclEvent {
                is_definition: true,
                ..DeclEvent::new("c:@S@Ok", "Ok", EntityKind::Struct, 1, at(&root, 1, 8, 10))
            })
            .panic("simulated frontend fault"),
    );

    let shared = FileConsumerSharedState::new();
    let files = run(frontend, "/proj/crash.cc", &shared);
    assert!(files.is_empty());
}

#[test]
fn declaration_after_definition_is_recorded() {
    let root = SourceFile::new("/proj/late.cc");
    let frontend = FakeFrontend::new();
    frontend.script(
        "/proj/late.cc",
        UnitScript::new()
            .entered_main_file(root.clone())
            .declaration(DeclEvent {
                is_definition: true,
                extent: span(1, 1, 1, 20),
                type_desc: Some("void ()".to_string()),
                ..DeclEvent::new("c:@F@f#", "f", EntityKind::Function, 1, at(&root, 1, 6, 7))
            })
            .declaration(DeclEvent {
                type_desc: Some("void ()".to_string()),
                ..DeclEvent::new("c:@F@f#", "f", EntityKind::Function, 2, at(&root, 5, 6, 7))
            }),
    );

    let shared = FileConsumerSharedState::new();
    let files = run(frontend, "/proj/late.cc", &shared);
    let func = &files[0].funcs[0];
    // A declaration seen after the definition is appended, not dropped.
    assert!(func.def.name.spell.is_some());
    assert_eq!(func.declarations.len(), 1);
}

#[test]
fn reindexing_the_same_unit_is_idempotent() {
    let root = SourceFile::new("/proj/a.cc");
    let frontend = FakeFrontend::new();
    frontend.script("/proj/a.cc", class_with_method(&root));
    let index = FrontendIndex::new(Arc::new(frontend));

    let shared = FileConsumerSharedState::new();
    let mut perf = IndexPerf::default();
    let first =
        parse(&shared, &index, Path::new("/proj/a.cc"), &[], &Snapshot::default(), &mut perf);
    let second =
        parse(&shared, &index, Path::new("/proj/a.cc"), &[], &Snapshot::default(), &mut perf);
    assert_eq!(first, second);
}

#[test]
fn round_trip_preserves_a_full_scenario() {
    let root = SourceFile::new("/proj/a.cc");
    let frontend = FakeFrontend::new();
    frontend.script("/proj/a.cc", class_with_method(&root));

    let shared = FileConsumerSharedState::new();
    let files = run(frontend, "/proj/a.cc", &shared);
    let original = &files[0];

    let text = to_json_string(original).unwrap();
    let restored = from_json_str(&text).unwrap();
    assert_eq!(&restored, original);

    let bytes = indexing::to_binary(original).unwrap();
    assert_eq!(&indexing::from_binary(&bytes).unwrap(), original);
}

#[test]
fn implicit_declarations_carry_the_implicit_role() {
    let root = SourceFile::new("/proj/ctor.cc");
    let frontend = FakeFrontend::new();
    frontend.script(
        "/proj/ctor.cc",
        UnitScript::new()
            .entered_main_file(root.clone())
            .declaration(DeclEvent {
                is_definition: true,
                extent: span(1, 1, 1, 20),
                ..DeclEvent::new("c:@S@S", "S", EntityKind::Struct, 1, at(&root, 1, 8, 9))
            })
            .declaration(DeclEvent {
                is_definition: true,
                is_implicit: true,
                lexical_container: Some(frontend::ContainerId(1)),
                type_desc: Some("void ()".to_string()),
                ..DeclEvent::new("c:@S@S@F@S#", "S", EntityKind::Constructor, 2, at(&root, 1, 8, 9))
            }),
    );

    let shared = FileConsumerSharedState::new();
    let files = run(frontend, "/proj/ctor.cc", &shared);
    let file = &files[0];
    let ctor = file.funcs.iter().find(|func| func.def.kind == LsSymbolKind::Constructor).unwrap();
    let spell = ctor.def.name.spell.expect("implicit definition spell");
    assert!(spell.0.role.contains(indexing::Role::IMPLICIT));
    assert!(spell.0.role.contains(indexing::Role::DEFINITION));
}

#[test]
fn field_and_local_membership() {
    let root = SourceFile::new("/proj/vars.cc");
    let frontend = FakeFrontend::new();
    frontend.script(
        "/proj/vars.cc",
        UnitScript::new()
            .entered_main_file(root.clone())
            .declaration(DeclEvent {
                is_definition: true,
                extent: span(1, 1, 3, 2),
                ..DeclEvent::new("c:@S@Box", "Box", EntityKind::Struct, 1, at(&root, 1, 8, 11))
            })
            .declaration(DeclEvent {
                is_definition: true,
                lexical_container: Some(frontend::ContainerId(1)),
                type_usr: Some("c:@S@Box".to_string()),
                type_desc: Some("Box".to_string()),
                ..DeclEvent::new("c:@S@Box@FI@next", "next", EntityKind::Field, 2, at(&root, 2, 7, 11))
            })
            .declaration(DeclEvent {
                is_definition: true,
                extent: span(5, 1, 7, 2),
                type_desc: Some("void ()".to_string()),
                ..DeclEvent::new("c:@F@use#", "use", EntityKind::Function, 3, at(&root, 5, 6, 9))
            })
            .declaration(DeclEvent {
                is_definition: true,
                lexical_container: Some(frontend::ContainerId(3)),
                type_usr: Some("c:@S@Box".to_string()),
                type_desc: Some("Box".to_string()),
                ..DeclEvent::new("c:@F@use#@b", "b", EntityKind::Variable, 4, at(&root, 6, 7, 8))
            }),
    );

    let shared = FileConsumerSharedState::new();
    let files = run(frontend, "/proj/vars.cc", &shared);
    let file = &files[0];

    let class = file.types.iter().find(|ty| ty.def.name.short_name() == "Box").unwrap();
    let field = file.vars.iter().find(|var| var.def.name.short_name() == "next").unwrap();
    let local = file.vars.iter().find(|var| var.def.name.short_name() == "b").unwrap();
    let func = file.funcs.iter().find(|f| f.def.name.short_name() == "use").unwrap();

    // Fields belong to their type, locals to their function; both are
    // instances of the type they are declared with.
    assert!(class.def.vars.contains(&field.id));
    assert!(func.def.vars.contains(&local.id));
    assert_eq!(field.def.ty, Some(class.id));
    assert_eq!(local.def.ty, Some(class.id));
    assert!(class.instances.contains(&field.id));
    assert!(class.instances.contains(&local.id));

    assert!(!field.def.is_local());
    assert!(local.def.is_local());
}
