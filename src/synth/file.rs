//! Destination-file assembly: import table, ordered declarations, rendering.

use std::collections::HashMap;

use crate::error::{Error, Result};

const HEADER: &str = "// Code generated by stubgen. DO NOT EDIT.\n";

/// Bidirectional module-path <-> alias table for one output file. Each path
/// maps to exactly one alias and vice versa; collisions on the natural name
/// allocate `aliasN` with N monotonic from 1.
#[derive(Debug, Default)]
pub struct ImportTable {
    import_to_alias: HashMap<String, String>,
    alias_to_import: HashMap<String, String>,
    order: Vec<String>,
    alias_counter: usize,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures `module_path` is imported and returns the alias to qualify
    /// its members with. Registering the same path twice returns the same
    /// alias.
    pub fn register(&mut self, module_path: &str) -> String {
        if let Some(alias) = self.import_to_alias.get(module_path) {
            return alias.clone();
        }
        let natural = module_path.rsplit("::").next().unwrap_or(module_path).to_string();
        let alias = if self.alias_to_import.contains_key(&natural) {
            self.allocate_unique_alias()
        } else {
            natural
        };
        self.import_to_alias.insert(module_path.to_string(), alias.clone());
        self.alias_to_import.insert(alias.clone(), module_path.to_string());
        self.order.push(module_path.to_string());
        alias
    }

    fn allocate_unique_alias(&mut self) -> String {
        self.alias_counter += 1;
        format!("alias{}", self.alias_counter)
    }

    pub fn alias_for(&self, module_path: &str) -> Option<&str> {
        self.import_to_alias.get(module_path).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(module path, alias)` pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().map(|path| {
            (path.as_str(), self.import_to_alias[path].as_str())
        })
    }
}

/// Owns everything that ends up in the generated file: the import table, the
/// general declarations (stub struct first), and the impl blocks, in
/// registration order.
#[derive(Debug, Default)]
pub struct FileBuilder {
    imports: ImportTable,
    general_items: Vec<syn::Item>,
    impl_items: Vec<syn::Item>,
}

impl FileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imports_mut(&mut self) -> &mut ImportTable {
        &mut self.imports
    }

    pub fn add_general_item(&mut self, item: syn::Item) {
        self.general_items.push(item);
    }

    pub fn add_impl_item(&mut self, item: syn::Item) {
        self.impl_items.push(item);
    }

    /// Assembles the complete file: import block (only if non-empty), general
    /// declarations, then impl blocks.
    pub fn build(&self) -> Result<syn::File> {
        let mut items = Vec::new();
        for (path, alias) in self.imports.entries() {
            let natural = path.rsplit("::").next().unwrap_or(path);
            let text = if alias == natural {
                format!("use {path};")
            } else {
                format!("use {path} as {alias};")
            };
            let item: syn::Item = syn::parse_str(&text).map_err(|source| Error::Parse {
                path: std::path::PathBuf::from("<generated>"),
                source,
            })?;
            items.push(item);
        }
        items.extend(self.general_items.iter().cloned());
        items.extend(self.impl_items.iter().cloned());
        Ok(syn::File { shebang: None, attrs: Vec::new(), items })
    }

    /// Formatted source text, ready to write out.
    pub fn render(&self) -> Result<String> {
        let file = self.build()?;
        Ok(format!("{HEADER}{}", prettyplease::unparse(&file)))
    }
}
