//! Type resolution: rewrites a type expression found in some originating
//! file into one that is valid inside the generated destination file.

use syn::parse_quote;

use crate::error::{Error, Result};
use crate::locate::{LexicalContext, Locator};
use crate::synth::ImportTable;
use crate::util;

/// Primitive names that pass through untouched.
const BUILTIN: &[&str] = &[
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64",
    "i128", "isize", "f32", "f64",
];

/// Std-prelude names that are in scope of any file, including the generated
/// one. Their generic arguments still recurse. The flattener consults the
/// same list to skip prelude traits appearing as supertrait bounds.
pub(crate) const PRELUDE: &[&str] = &[
    "String", "Vec", "Option", "Result", "Box", "Self", "Fn", "FnMut", "FnOnce", "Send", "Sync",
    "Sized", "Unpin", "Clone", "Copy", "Default", "Drop", "Eq", "PartialEq", "Ord", "PartialOrd",
    "Iterator", "IntoIterator", "ExactSizeIterator", "DoubleEndedIterator", "Extend", "AsRef",
    "AsMut", "From", "Into", "ToOwned", "ToString",
];

/// Rewrites type expressions relative to a destination import table.
/// Stateless; aliasing decisions live in the table, so resolving the same
/// expression twice is deterministic.
pub struct Resolver<'a> {
    locator: &'a Locator,
}

impl<'a> Resolver<'a> {
    pub fn new(locator: &'a Locator) -> Self {
        Self { locator }
    }

    /// Produces an equivalent type valid in the destination file, registering
    /// whatever imports the rewrite needs.
    pub fn resolve(
        &self,
        ctx: &LexicalContext,
        table: &mut ImportTable,
        ty: &syn::Type,
    ) -> Result<syn::Type> {
        match ty {
            syn::Type::Path(type_path) => {
                if type_path.qself.is_some() {
                    return Err(Error::UnsupportedType(
                        "qualified self types (`<T as Trait>::..`)".to_string(),
                    ));
                }
                let path = self.resolve_path(ctx, table, &type_path.path)?;
                Ok(syn::Type::Path(syn::TypePath { qself: None, path }))
            }
            syn::Type::Reference(reference) => {
                let mut out = reference.clone();
                out.elem = Box::new(self.resolve(ctx, table, &reference.elem)?);
                Ok(syn::Type::Reference(out))
            }
            syn::Type::Ptr(ptr) => {
                let mut out = ptr.clone();
                out.elem = Box::new(self.resolve(ctx, table, &ptr.elem)?);
                Ok(syn::Type::Ptr(out))
            }
            syn::Type::Slice(slice) => {
                let mut out = slice.clone();
                out.elem = Box::new(self.resolve(ctx, table, &slice.elem)?);
                Ok(syn::Type::Slice(out))
            }
            syn::Type::Array(array) => {
                // Element resolves; the length expression is left alone.
                let mut out = array.clone();
                out.elem = Box::new(self.resolve(ctx, table, &array.elem)?);
                Ok(syn::Type::Array(out))
            }
            syn::Type::Tuple(tuple) => {
                let mut out = tuple.clone();
                out.elems = tuple
                    .elems
                    .iter()
                    .map(|elem| self.resolve(ctx, table, elem))
                    .collect::<Result<_>>()?;
                Ok(syn::Type::Tuple(out))
            }
            syn::Type::BareFn(bare_fn) => {
                let mut out = bare_fn.clone();
                for input in out.inputs.iter_mut() {
                    input.ty = self.resolve(ctx, table, &input.ty)?;
                }
                if let syn::ReturnType::Type(arrow, ret) = &bare_fn.output {
                    out.output =
                        syn::ReturnType::Type(*arrow, Box::new(self.resolve(ctx, table, ret)?));
                }
                // the variadic marker, if any, is preserved by the clone
                Ok(syn::Type::BareFn(out))
            }
            syn::Type::TraitObject(object) => {
                let mut out = object.clone();
                out.bounds = self.resolve_bounds(ctx, table, &object.bounds)?;
                Ok(syn::Type::TraitObject(out))
            }
            syn::Type::ImplTrait(impl_trait) => {
                let mut out = impl_trait.clone();
                out.bounds = self.resolve_bounds(ctx, table, &impl_trait.bounds)?;
                Ok(syn::Type::ImplTrait(out))
            }
            syn::Type::Paren(paren) => {
                let mut out = paren.clone();
                out.elem = Box::new(self.resolve(ctx, table, &paren.elem)?);
                Ok(syn::Type::Paren(out))
            }
            syn::Type::Group(group) => {
                let mut out = group.clone();
                out.elem = Box::new(self.resolve(ctx, table, &group.elem)?);
                Ok(syn::Type::Group(out))
            }
            // `!`, `_`, and macro invocations carry no resolvable names.
            other => Ok(other.clone()),
        }
    }

    fn resolve_bounds(
        &self,
        ctx: &LexicalContext,
        table: &mut ImportTable,
        bounds: &syn::punctuated::Punctuated<syn::TypeParamBound, syn::Token![+]>,
    ) -> Result<syn::punctuated::Punctuated<syn::TypeParamBound, syn::Token![+]>> {
        bounds
            .iter()
            .map(|bound| match bound {
                syn::TypeParamBound::Trait(trait_bound) => {
                    let mut out = trait_bound.clone();
                    out.path = self.resolve_path(ctx, table, &trait_bound.path)?;
                    Ok(syn::TypeParamBound::Trait(out))
                }
                other => Ok(other.clone()),
            })
            .collect()
    }

    /// Local names qualify against the originating module; qualified names
    /// re-register their module against the destination table.
    pub fn resolve_path(
        &self,
        ctx: &LexicalContext,
        table: &mut ImportTable,
        path: &syn::Path,
    ) -> Result<syn::Path> {
        let segments: Vec<&syn::PathSegment> = path.segments.iter().collect();
        if segments.is_empty() {
            return Ok(path.clone());
        }

        if segments.len() == 1 {
            let segment = segments[0];
            let name = segment.ident.to_string();
            let arguments = self.resolve_arguments(ctx, table, &segment.arguments)?;

            if BUILTIN.contains(&name.as_str()) || PRELUDE.contains(&name.as_str()) {
                let mut out = path.clone();
                out.segments.last_mut().unwrap().arguments = arguments;
                return Ok(out);
            }

            if let Some(bound) = ctx.imports().lookup(&name) {
                if bound.len() >= 2 {
                    let parent = bound[..bound.len() - 1].join("::");
                    let alias = table.register(&parent);
                    return Ok(qualified(&alias, &bound[bound.len() - 1], arguments));
                }
            }

            // must be declared in the originating module itself
            self.locator.find_ident_type(ctx, &name)?;
            let alias = table.register(ctx.module_path());
            return Ok(qualified(&alias, &name, arguments));
        }

        // `Self::Assoc` cannot be improved from outside the trait.
        if segments[0].ident == "Self" {
            return Ok(path.clone());
        }

        let last = segments[segments.len() - 1];
        let arguments = self.resolve_arguments(ctx, table, &last.arguments)?;
        let qualifier: Vec<String> = segments[..segments.len() - 1]
            .iter()
            .map(|seg| seg.ident.to_string())
            .collect();
        let absolute = self.locator.absolute_module_for(ctx, &qualifier);
        if absolute.is_empty() {
            return Err(Error::UnknownQualifier {
                qualifier: qualifier.join("::"),
                file: ctx.file_path().to_path_buf(),
            });
        }
        let alias = table.register(&absolute.join("::"));
        Ok(qualified(&alias, &last.ident.to_string(), arguments))
    }

    fn resolve_arguments(
        &self,
        ctx: &LexicalContext,
        table: &mut ImportTable,
        arguments: &syn::PathArguments,
    ) -> Result<syn::PathArguments> {
        match arguments {
            syn::PathArguments::None => Ok(syn::PathArguments::None),
            syn::PathArguments::AngleBracketed(angle) => {
                let mut out = angle.clone();
                out.args = angle
                    .args
                    .iter()
                    .map(|arg| match arg {
                        syn::GenericArgument::Type(ty) => {
                            Ok(syn::GenericArgument::Type(self.resolve(ctx, table, ty)?))
                        }
                        other => Ok(other.clone()),
                    })
                    .collect::<Result<_>>()?;
                Ok(syn::PathArguments::AngleBracketed(out))
            }
            syn::PathArguments::Parenthesized(paren) => {
                let mut out = paren.clone();
                out.inputs = paren
                    .inputs
                    .iter()
                    .map(|ty| self.resolve(ctx, table, ty))
                    .collect::<Result<_>>()?;
                if let syn::ReturnType::Type(arrow, ret) = &paren.output {
                    out.output =
                        syn::ReturnType::Type(*arrow, Box::new(self.resolve(ctx, table, ret)?));
                }
                Ok(syn::PathArguments::Parenthesized(out))
            }
        }
    }
}

fn qualified(alias: &str, name: &str, arguments: syn::PathArguments) -> syn::Path {
    let alias = util::ident(alias);
    let name = util::ident(name);
    let mut path: syn::Path = parse_quote!(#alias::#name);
    path.segments.last_mut().unwrap().arguments = arguments;
    path
}
