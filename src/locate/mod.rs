//! Cross-file type discovery: follows identifiers and qualified references to
//! the file that declares them.

pub mod cache;
pub mod context;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

pub use cache::{ModuleSource, SourceCache};
pub use context::ImportMap;

use crate::error::{Error, Result};
use crate::util;

/// The lexical surroundings of a type reference: the originating file and the
/// module path it belongs to. Immutable once created.
#[derive(Debug, Clone)]
pub struct LexicalContext {
    source: Arc<ModuleSource>,
}

impl LexicalContext {
    pub fn module_path(&self) -> &str {
        &self.source.module_path
    }

    pub fn file_path(&self) -> &Path {
        &self.source.file_path
    }

    pub fn ast(&self) -> &syn::File {
        &self.source.ast
    }

    pub fn imports(&self) -> &ImportMap {
        &self.source.imports
    }
}

/// The outcome of a successful lookup: the declaration together with the
/// context of its defining file. Consumed immediately, never retained.
#[derive(Debug, Clone)]
pub struct TypeDiscovery {
    pub context: LexicalContext,
    pub item: syn::Item,
}

impl TypeDiscovery {
    pub fn name(&self) -> String {
        match &self.item {
            syn::Item::Trait(t) => t.ident.to_string(),
            syn::Item::Struct(s) => s.ident.to_string(),
            syn::Item::Enum(e) => e.ident.to_string(),
            syn::Item::Type(t) => t.ident.to_string(),
            _ => String::new(),
        }
    }

    /// The discovered item as a trait, or `NotATrait`.
    pub fn as_trait(&self) -> Result<&syn::ItemTrait> {
        match &self.item {
            syn::Item::Trait(t) => Ok(t),
            _ => Err(Error::NotATrait {
                module: self.context.module_path().to_string(),
                name: self.name(),
            }),
        }
    }
}

/// Finds type declarations across files and source roots. Stateless per call;
/// owns the process-wide parse cache.
#[derive(Debug, Default)]
pub struct Locator {
    cache: SourceCache,
}

impl Locator {
    pub fn new(cache: SourceCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    pub fn context_for(&self, module_path: &str) -> Result<LexicalContext> {
        let source = self.cache.module_source(module_path)?;
        Ok(LexicalContext { source })
    }

    /// Resolves an unqualified type name within the module of `ctx`.
    pub fn find_ident_type(&self, ctx: &LexicalContext, name: &str) -> Result<TypeDiscovery> {
        match util::find_type_item(ctx.ast(), name) {
            Some(item) => Ok(TypeDiscovery { context: ctx.clone(), item: item.clone() }),
            None => Err(Error::TypeNotFound {
                module: ctx.module_path().to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Resolves `qualifier::name`, mapping the qualifier through the
    /// originating file's own import declarations.
    pub fn find_selector_type(
        &self,
        ctx: &LexicalContext,
        qualifier: &[String],
        name: &str,
    ) -> Result<TypeDiscovery> {
        let absolute = self.absolute_module_for(ctx, qualifier);
        let module = absolute.join("::");
        debug!(from = ctx.module_path(), module = %module, name, "following selector");
        let target = self.context_for(&module).map_err(|err| match err {
            Error::ModuleNotFound(_) => Error::UnknownQualifier {
                qualifier: qualifier.join("::"),
                file: ctx.file_path().to_path_buf(),
            },
            other => other,
        })?;
        self.find_ident_type(&target, name)
    }

    /// Resolves a bare name the way the surrounding file sees it: a type
    /// import wins over a declaration in the module itself.
    pub fn find_named_type(&self, ctx: &LexicalContext, name: &str) -> Result<TypeDiscovery> {
        if let Some(bound) = ctx.imports().lookup(name) {
            if bound.len() >= 2 {
                let qualifier = &bound[..bound.len() - 1];
                let target = self.context_for(&qualifier.join("::"))?;
                return self.find_ident_type(&target, &bound[bound.len() - 1]);
            }
        }
        self.find_ident_type(ctx, name)
    }

    /// Absolute module path for a qualifier as seen from `ctx`: relative
    /// prefixes normalize against the context, a leading local alias maps
    /// through the file's imports, anything else is already absolute.
    pub fn absolute_module_for(&self, ctx: &LexicalContext, segments: &[String]) -> Vec<String> {
        match segments.first().map(String::as_str) {
            Some("crate") | Some("self") | Some("super") => {
                context::normalize_segments(segments, ctx.module_path())
            }
            Some(first) => {
                if let Some(bound) = ctx.imports().lookup(first) {
                    let mut out = bound.to_vec();
                    out.extend(segments[1..].iter().cloned());
                    out
                } else {
                    segments.to_vec()
                }
            }
            None => Vec::new(),
        }
    }
}
