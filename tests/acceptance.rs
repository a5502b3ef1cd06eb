//! End-to-end generation against on-disk fixture crates.

use std::fs;
use std::path::Path;

use stubgen::{generate_monitor, generate_stub, trait_report, Error, Locator, SourceCache};
use tempfile::tempdir;

fn write_crate(root: &Path, files: &[(&str, &str)]) {
    let src = root.join("src");
    for (name, content) in files {
        let path = src.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn locator_for(files: &[(&str, &str)]) -> (tempfile::TempDir, Locator) {
    let dir = tempdir().unwrap();
    write_crate(dir.path(), files);
    let mut cache = SourceCache::new();
    cache.add_root("demo", dir.path());
    (dir, Locator::new(cache))
}

fn stub(locator: &Locator, trait_path: &str) -> String {
    let text = generate_stub(locator, trait_path, None).unwrap();
    syn::parse_file(&text).unwrap_or_else(|err| panic!("unparseable output: {err}\n{text}"));
    text
}

#[test]
fn primitive_params_and_returns() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod calc;"),
        (
            "calc.rs",
            "pub trait Calc {\n\
                 fn add(&self, lhs: i64, rhs: i64) -> i64;\n\
                 fn describe(&self) -> String;\n\
                 fn reset(&mut self);\n\
             }",
        ),
    ]);
    let text = stub(&locator, "demo::calc::Calc");
    assert!(text.starts_with("// Code generated by stubgen. DO NOT EDIT.\n"));
    assert!(text.contains("pub struct CalcStub"));
    assert!(text.contains("add_call: sync::RwLock<CalcStubAddCall>"));
    assert!(text.contains("pub fn add_args_for_call(&self, index: usize) -> (i64, i64)"));
    assert!(text.contains("pub fn set_add_returns(&self, result1: i64)"));
    // no params, so no history accessor; no results, so no returns setter
    assert!(!text.contains("describe_args_for_call"));
    assert!(!text.contains("set_reset_returns"));
    assert!(text.contains("fn reset(&mut self)"));
    assert!(text.contains("impl calc::Calc for CalcStub"));
}

#[test]
fn anonymous_and_repeated_params_get_positional_names() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod t;"),
        ("t.rs", "pub trait T { fn f(&self, _: u32, _: u32, flag: bool) -> (u32, bool); }"),
    ]);
    let text = stub(&locator, "demo::t::T");
    assert!(text.contains("fn f(&self, arg1: u32, arg2: u32, arg3: bool) -> (u32, bool)"));
    assert!(text.contains("pub fn set_f_returns(&self, result1: u32, result2: bool)"));
    assert!(text.contains("args_for_call: Vec<(u32, u32, bool)>"));
}

#[test]
fn collection_and_array_types_survive_resolution() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod t;"),
        (
            "t.rs",
            "use std::collections::HashMap;\n\
             pub trait T {\n\
                 fn index(&self, keys: Vec<String>, window: [u8; 4]) -> HashMap<String, u64>;\n\
             }",
        ),
    ]);
    let text = stub(&locator, "demo::t::T");
    assert!(text.contains("use std::collections;"));
    assert!(text.contains("collections::HashMap<String, u64>"));
    assert!(text.contains("Vec<String>"));
    assert!(text.contains("[u8; 4]"));
}

#[test]
fn function_and_trait_object_params() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod t;"),
        (
            "t.rs",
            "pub struct Record { pub id: u64 }\n\
             pub trait Sink { fn accept(&self, record: Record); }\n\
             pub trait T {\n\
                 fn visit(&self, pred: fn(u64) -> bool, sink: Box<dyn Sink + Send>) -> Record;\n\
             }",
        ),
    ]);
    let text = stub(&locator, "demo::t::T");
    assert!(text.contains("fn(u64) -> bool"));
    assert!(text.contains("Box<dyn t::Sink + Send>"));
    assert!(text.contains("-> t::Record"));
}

#[test]
fn cross_module_types_import_their_parent_module() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod store;\npub mod api;"),
        ("store.rs", "pub struct Address { pub street: String }"),
        (
            "api.rs",
            "use crate::store::Address;\n\
             pub trait Resolver { fn resolve(&self, raw: String) -> Address; }",
        ),
    ]);
    let text = stub(&locator, "demo::api::Resolver");
    assert!(text.contains("use demo::store;"));
    assert!(text.contains("-> store::Address"));
}

#[test]
fn supertrait_methods_flatten_across_modules() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod a;\npub mod b;\npub mod c;"),
        ("a.rs", "pub trait A { fn fa(&self) -> u32; }"),
        ("b.rs", "use crate::a::A;\npub trait B: A { fn fb(&self); }"),
        ("c.rs", "use crate::b::B;\npub trait C: B { fn fc(&self, tag: String); }"),
    ]);
    let text = stub(&locator, "demo::c::C");
    // one impl block per declaring trait, every method backed by shared state
    assert!(text.contains("impl a::A for CStub"));
    assert!(text.contains("impl b::B for CStub"));
    assert!(text.contains("impl c::C for CStub"));
    assert!(text.contains("pub fn fa_call_count"));
    assert!(text.contains("pub fn fc_args_for_call"));
}

#[test]
fn inherited_method_types_resolve_against_their_declaring_module() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod a;\npub mod b;"),
        (
            "a.rs",
            "pub struct Payload;\n\
             pub trait A { fn fa(&self, payload: Payload) -> Payload; }",
        ),
        ("b.rs", "use crate::a::A;\npub trait B: A { fn fb(&self); }"),
    ]);
    let text = stub(&locator, "demo::b::B");
    // Payload is in scope of a.rs, not b.rs; the inherited method must still
    // qualify it against the module that declared it
    assert!(text.contains("use demo::a;"));
    assert!(text.contains("fn fa(&self, arg1: a::Payload) -> a::Payload"));
    assert!(text.contains("pub fn fa_args_for_call(&self, index: usize) -> a::Payload"));
    assert!(text.contains("pub fn set_fa_returns(&self, result1: a::Payload)"));
}

#[test]
fn derivable_supertrait_bounds_do_not_block_generation() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod t;"),
        ("t.rs", "pub trait A: Clone { fn fa(&self); }"),
    ]);
    let text = stub(&locator, "demo::t::A");
    assert!(text.contains("impl t::A for AStub"));
    assert!(text.contains("pub fn fa_call_count"));
}

#[test]
fn aliased_supertrait_reference_resolves() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod a;\npub mod b;"),
        ("a.rs", "pub trait A { fn fa(&self); }"),
        ("b.rs", "use crate::a as base;\npub trait B: base::A { fn fb(&self); }"),
    ]);
    let text = stub(&locator, "demo::b::B");
    assert!(text.contains("impl a::A for BStub"));
    assert!(text.contains("impl b::B for BStub"));
}

#[test]
fn colliding_module_names_get_numbered_aliases() {
    let (_dir, locator) = locator_for(&[
        (
            "lib.rs",
            "pub mod left { pub mod external { pub struct L; } }\n\
             pub mod right { pub mod external { pub struct R; } }\n\
             pub mod t;",
        ),
        (
            "t.rs",
            "use crate::left::external::L;\n\
             use crate::right::external::R;\n\
             pub trait T { fn pair(&self, l: L, r: R); }",
        ),
    ]);
    let text = stub(&locator, "demo::t::T");
    assert!(text.contains("use demo::left::external;"));
    assert!(text.contains("use demo::right::external as alias1;"));
    assert!(text.contains("external::L"));
    assert!(text.contains("alias1::R"));
}

#[test]
fn diamond_embedding_keeps_one_state_per_method() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod t;"),
        (
            "t.rs",
            "pub trait A { fn fa(&self); }\n\
             pub trait B: A { fn fb(&self); }\n\
             pub trait C: A { fn fc(&self); }\n\
             pub trait D: B + C { fn fd(&self); }",
        ),
    ]);
    let text = stub(&locator, "demo::t::D");
    // fa appears in both A impl requirements but gets one guard and one accessor set
    assert_eq!(text.matches("fa_call: sync::RwLock<DStubFaCall>").count(), 1);
    assert_eq!(text.matches("pub fn fa_call_count").count(), 1);
    assert!(text.contains("impl t::A for DStub"));
    assert!(text.contains("impl t::D for DStub"));
}

#[test]
fn generation_is_deterministic() {
    let files: &[(&str, &str)] = &[
        ("lib.rs", "pub mod a;\npub mod b;"),
        ("a.rs", "pub struct X;\npub trait A { fn fa(&self, x: X) -> X; }"),
        ("b.rs", "use crate::a::A;\npub trait B: A { fn fb(&self) -> Vec<u8>; }"),
    ];
    let (_dir, locator) = locator_for(files);
    let first = stub(&locator, "demo::b::B");
    let (_dir2, locator2) = locator_for(files);
    let second = stub(&locator2, "demo::b::B");
    assert_eq!(first, second);
}

#[test]
fn mod_rs_and_file_module_layouts_both_resolve() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod store;"),
        ("store/mod.rs", "pub mod inner;\npub trait Store { fn get(&self) -> u8; }"),
        ("store/inner.rs", "pub trait Inner { fn touch(&mut self); }"),
    ]);
    stub(&locator, "demo::store::Store");
    stub(&locator, "demo::store::inner::Inner");
}

#[test]
fn missing_trait_and_module_report_clean_errors() {
    let (_dir, locator) = locator_for(&[("lib.rs", "pub mod t;"), ("t.rs", "")]);
    assert!(matches!(
        generate_stub(&locator, "demo::t::Nope", None).unwrap_err(),
        Error::TypeNotFound { .. }
    ));
    assert!(matches!(
        generate_stub(&locator, "demo::missing::Nope", None).unwrap_err(),
        Error::ModuleNotFound(_)
    ));
}

#[test]
fn monitor_wraps_the_whole_flattened_surface() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod a;\npub mod b;"),
        ("a.rs", "pub trait A { fn fa(&self) -> Result<u32, String>; }"),
        ("b.rs", "use crate::a::A;\npub trait B: A { fn fb(&mut self, n: u64); }"),
    ]);
    let text = generate_monitor(&locator, "demo::b::B", None).unwrap();
    syn::parse_file(&text).unwrap();
    assert!(text.contains("pub struct BMonitor"));
    assert!(text.contains("next: Box<dyn b::B + Send + Sync>"));
    assert!(text.contains("impl a::A for BMonitor"));
    assert!(text.contains("impl b::B for BMonitor"));
    assert!(text.contains("a::A::fa(self.next.as_ref())"));
    assert!(text.contains("b::B::fb(self.next.as_mut(), arg1)"));
    assert!(text.contains("if result1.is_err()"));
}

#[test]
fn methods_report_lists_flattened_surface_as_json() {
    let (_dir, locator) = locator_for(&[
        ("lib.rs", "pub mod t;"),
        ("t.rs", "pub trait T { fn f(&self, n: u32) -> (bool, String); }"),
    ]);
    let report = trait_report(&locator, "demo::t::T").unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["module"], "demo::t");
    assert_eq!(json["name"], "T");
    assert_eq!(json["methods"][0]["name"], "f");
    assert_eq!(json["methods"][0]["params"][0]["name"], "arg1");
    assert_eq!(json["methods"][0]["results"][1]["name"], "result2");
}

#[test]
fn workspace_discovery_finds_member_crates() {
    let dir = tempdir().unwrap();
    let member = dir.path().join("demo-core");
    fs::create_dir_all(member.join("src")).unwrap();
    fs::write(member.join("Cargo.toml"), "[package]\nname = \"demo-core\"\n").unwrap();
    write_crate(
        &member,
        &[("lib.rs", "pub mod t;"), ("t.rs", "pub trait T { fn f(&self); }")],
    );
    let mut cache = SourceCache::new();
    let found = cache.discover_roots(dir.path()).unwrap();
    assert_eq!(found, 1);
    let locator = Locator::new(cache);
    let text = generate_stub(&locator, "demo_core::t::T", None).unwrap();
    assert!(text.contains("use demo_core::t;"));
}
