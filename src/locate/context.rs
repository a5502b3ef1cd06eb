//! Per-file import tables: what each `use` declaration binds into scope.

use std::collections::HashMap;

/// Maps the local names a source file has in scope to the absolute paths they
/// stand for. Built once per parsed file; qualified type references and
/// supertrait selectors are resolved against the *originating* file's map,
/// never against the destination's.
#[derive(Debug, Default, Clone)]
pub struct ImportMap {
    /// local name -> absolute path segments (root crate name first)
    bindings: HashMap<String, Vec<String>>,
}

impl ImportMap {
    pub fn of_file(file: &syn::File, module_path: &str) -> Self {
        let mut map = ImportMap::default();
        for item in &file.items {
            if let syn::Item::Use(item_use) = item {
                collect_use_tree(&item_use.tree, Vec::new(), module_path, &mut map.bindings);
            }
        }
        map
    }

    pub fn lookup(&self, name: &str) -> Option<&[String]> {
        self.bindings.get(name).map(Vec::as_slice)
    }
}

fn collect_use_tree(
    tree: &syn::UseTree,
    mut prefix: Vec<String>,
    module_path: &str,
    bindings: &mut HashMap<String, Vec<String>>,
) {
    match tree {
        syn::UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            collect_use_tree(&path.tree, prefix, module_path, bindings);
        }
        syn::UseTree::Name(name) => {
            let ident = name.ident.to_string();
            if ident == "self" {
                // `use a::b::{self}` binds `b` to the module itself
                let absolute = normalize_segments(&prefix, module_path);
                if let Some(last) = absolute.last().cloned() {
                    bindings.insert(last, absolute);
                }
            } else {
                prefix.push(ident.clone());
                bindings.insert(ident, normalize_segments(&prefix, module_path));
            }
        }
        syn::UseTree::Rename(rename) => {
            let ident = rename.ident.to_string();
            if ident != "self" {
                prefix.push(ident);
            }
            bindings.insert(rename.rename.to_string(), normalize_segments(&prefix, module_path));
        }
        syn::UseTree::Glob(_) => {
            // Glob imports cannot bind a qualifier name deterministically.
        }
        syn::UseTree::Group(group) => {
            for item in &group.items {
                collect_use_tree(item, prefix.clone(), module_path, bindings);
            }
        }
    }
}

/// Rewrites a `crate`/`self`/`super`-relative prefix into an absolute module
/// path rooted at a crate name. Paths starting with anything else are already
/// absolute (an external crate or another configured root).
pub(crate) fn normalize_segments(segments: &[String], module_path: &str) -> Vec<String> {
    match segments.first().map(String::as_str) {
        Some("crate") => {
            let root = module_path.split("::").next().unwrap_or(module_path);
            let mut out = vec![root.to_string()];
            out.extend(segments[1..].iter().cloned());
            out
        }
        Some("self") | Some("super") => {
            let mut out: Vec<String> = module_path.split("::").map(str::to_string).collect();
            let mut idx = 0;
            while segments.get(idx).map(String::as_str) == Some("super") {
                if out.len() > 1 {
                    out.pop();
                }
                idx += 1;
            }
            if segments.get(idx).map(String::as_str) == Some("self") {
                idx += 1;
            }
            out.extend(segments[idx..].iter().cloned());
            out
        }
        _ => segments.to_vec(),
    }
}
