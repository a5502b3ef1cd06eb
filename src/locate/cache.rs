//! Module-path -> parsed-source cache over a set of named source roots.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use walkdir::WalkDir;

use super::context::ImportMap;
use crate::error::{Error, Result};

/// One parsed source file together with its module identity. Cache entries
/// are immutable once created; later lookups share the same `Arc`.
#[derive(Debug)]
pub struct ModuleSource {
    pub module_path: String,
    pub file_path: PathBuf,
    pub ast: syn::File,
    pub imports: ImportMap,
}

/// Lazily-populated parse cache keyed by module path. Never invalidated
/// within a run; sources are not mutated while generation is in flight.
#[derive(Debug, Default)]
pub struct SourceCache {
    roots: BTreeMap<String, PathBuf>,
    parsed: RefCell<HashMap<String, Arc<ModuleSource>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named source root. `dir` may be the crate directory
    /// (containing `src/`) or the source directory itself.
    pub fn add_root(&mut self, name: impl Into<String>, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        let src = dir.join("src");
        let root = if src.is_dir() { src } else { dir };
        self.roots.insert(name.into(), root);
    }

    /// Scans a workspace directory for member crates (directories holding a
    /// `Cargo.toml`) and registers each as a root named after its directory.
    pub fn discover_roots(&mut self, workspace: &Path) -> Result<usize> {
        let mut found = 0;
        for entry in WalkDir::new(workspace)
            .max_depth(3)
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e.path()))
            .filter_map(|e| e.ok())
        {
            if entry.file_name() != "Cargo.toml" {
                continue;
            }
            let Some(crate_dir) = entry.path().parent() else { continue };
            if !crate_dir.join("src").is_dir() {
                continue;
            }
            let Some(name) = crate_dir.file_name().and_then(|n| n.to_str()) else { continue };
            let root_name = name.replace('-', "_");
            debug!(root = %root_name, dir = %crate_dir.display(), "discovered source root");
            self.add_root(root_name, crate_dir);
            found += 1;
        }
        Ok(found)
    }

    pub fn has_root(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    pub fn has_any_root(&self) -> bool {
        !self.roots.is_empty()
    }

    /// Fetches (parsing on first use) the source file backing a module path.
    pub fn module_source(&self, module_path: &str) -> Result<Arc<ModuleSource>> {
        if let Some(hit) = self.parsed.borrow().get(module_path) {
            return Ok(Arc::clone(hit));
        }

        let file_path = self.locate_file(module_path)?;
        debug!(module = module_path, file = %file_path.display(), "parsing module source");
        let text = std::fs::read_to_string(&file_path)
            .map_err(|source| Error::Io { path: file_path.clone(), source })?;
        let ast = syn::parse_file(&text)
            .map_err(|source| Error::Parse { path: file_path.clone(), source })?;
        let imports = ImportMap::of_file(&ast, module_path);

        let source = Arc::new(ModuleSource {
            module_path: module_path.to_string(),
            file_path,
            ast,
            imports,
        });
        self.parsed
            .borrow_mut()
            .insert(module_path.to_string(), Arc::clone(&source));
        Ok(source)
    }

    fn locate_file(&self, module_path: &str) -> Result<PathBuf> {
        let mut segments = module_path.split("::");
        let root_name = segments.next().unwrap_or(module_path);
        let rest: Vec<&str> = segments.collect();
        let root_dir = self
            .roots
            .get(root_name)
            .ok_or_else(|| Error::ModuleNotFound(module_path.to_string()))?;

        if rest.is_empty() {
            for entry in ["lib.rs", "main.rs"] {
                let candidate = root_dir.join(entry);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
            return Err(Error::ModuleNotFound(module_path.to_string()));
        }

        let mut base = root_dir.clone();
        for segment in &rest[..rest.len() - 1] {
            base.push(segment);
        }
        let last = rest[rest.len() - 1];
        let as_file = base.join(format!("{last}.rs"));
        let as_dir = base.join(last).join("mod.rs");
        match (as_file.is_file(), as_dir.is_file()) {
            (true, true) => Err(Error::AmbiguousModule {
                module: module_path.to_string(),
                first: as_file,
                second: as_dir,
            }),
            (true, false) => Ok(as_file),
            (false, true) => Ok(as_dir),
            (false, false) => Err(Error::ModuleNotFound(module_path.to_string())),
        }
    }
}

fn is_ignored_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| matches!(name, "target" | ".git"))
        .unwrap_or(false)
}
