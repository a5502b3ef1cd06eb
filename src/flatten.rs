//! Supertrait flattening and method-signature normalization.
//!
//! The flattened method set is the transitive closure of all supertraits,
//! depth-first and left-to-right, each method paired with the lexical context
//! of the file that actually declared it.

use tracing::debug;

use crate::error::{Error, Result};
use crate::locate::{LexicalContext, Locator, TypeDiscovery};
use crate::resolve::Resolver;
use crate::synth::ImportTable;
use crate::util;

/// The resolved identity of a trait declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitRef {
    pub module_path: String,
    pub name: String,
}

/// One method of the flattened set, still in raw declaration form. The
/// context is the file that declared the method, which for inherited methods
/// differs from the root trait's file.
#[derive(Debug, Clone)]
pub struct FlatMethod {
    pub context: LexicalContext,
    pub declaring: TraitRef,
    pub method: syn::TraitItemFn,
}

/// A parameter or result reduced to exactly one name and a resolved type.
#[derive(Debug, Clone)]
pub struct NormalizedField {
    pub name: syn::Ident,
    pub ty: syn::Type,
}

/// The normalized, resolved representation of one trait method.
#[derive(Debug, Clone)]
pub struct MethodSig {
    pub name: syn::Ident,
    pub mut_receiver: bool,
    pub params: Vec<NormalizedField>,
    pub results: Vec<NormalizedField>,
}

impl MethodSig {
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }
}

/// Flattens a discovered trait into its complete method set.
pub fn flatten(locator: &Locator, discovery: &TypeDiscovery) -> Result<Vec<FlatMethod>> {
    let mut out = Vec::new();
    let mut in_progress = Vec::new();
    expand(locator, discovery, &mut in_progress, &mut out)?;
    Ok(out)
}

fn expand(
    locator: &Locator,
    discovery: &TypeDiscovery,
    in_progress: &mut Vec<TraitRef>,
    out: &mut Vec<FlatMethod>,
) -> Result<()> {
    let item_trait = discovery.as_trait()?;
    let ctx = &discovery.context;
    let declaring = TraitRef {
        module_path: ctx.module_path().to_string(),
        name: item_trait.ident.to_string(),
    };

    if !item_trait.generics.params.is_empty() {
        return Err(Error::UnsupportedGenerics(declaring.name));
    }
    if in_progress.contains(&declaring) {
        return Err(Error::CycleDetected {
            module: declaring.module_path,
            name: declaring.name,
        });
    }
    in_progress.push(declaring.clone());

    for bound in &item_trait.supertraits {
        match bound {
            syn::TypeParamBound::Trait(trait_bound) => {
                if let Some(sub) = locate_supertrait(locator, ctx, &trait_bound.path)? {
                    expand(locator, &sub, in_progress, out)?;
                }
            }
            syn::TypeParamBound::Lifetime(_) => {}
            other => {
                return Err(Error::MalformedMember {
                    trait_name: declaring.name,
                    member: quote::ToTokens::to_token_stream(other).to_string(),
                    detail: "unsupported supertrait bound".to_string(),
                });
            }
        }
    }

    for item in &item_trait.items {
        match item {
            syn::TraitItem::Fn(method) => {
                validate_method(&declaring.name, method)?;
                out.push(FlatMethod {
                    context: ctx.clone(),
                    declaring: declaring.clone(),
                    method: method.clone(),
                });
            }
            other => {
                return Err(Error::MalformedMember {
                    trait_name: declaring.name,
                    member: quote::ToTokens::to_token_stream(other).to_string(),
                    detail: "only methods and supertrait bounds can be stubbed".to_string(),
                });
            }
        }
    }

    in_progress.pop();
    Ok(())
}

/// Locates the trait a supertrait bound refers to. Bounds on prelude traits
/// (markers like `Send`, derivables like `Clone` or `PartialEq`) and traits
/// outside the configured roots are skipped: they contribute no methods the
/// stub could record.
fn locate_supertrait(
    locator: &Locator,
    ctx: &LexicalContext,
    path: &syn::Path,
) -> Result<Option<TypeDiscovery>> {
    let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    match segments.as_slice() {
        [] => Ok(None),
        [single] => match locator.find_named_type(ctx, single) {
            Ok(found) => Ok(Some(found)),
            Err(Error::TypeNotFound { .. })
                if crate::resolve::PRELUDE.contains(&single.as_str()) =>
            {
                debug!(bound = %single, "skipping prelude supertrait bound");
                Ok(None)
            }
            Err(Error::ModuleNotFound(_)) => {
                // bound imported from an external crate; nothing to flatten
                debug!(bound = %single, "skipping external supertrait");
                Ok(None)
            }
            Err(err) => Err(err),
        },
        [qualifier @ .., name] => {
            let absolute = locator.absolute_module_for(ctx, qualifier);
            match absolute.first() {
                Some(root) if locator.cache().has_root(root) => {
                    locator.find_selector_type(ctx, qualifier, name).map(Some)
                }
                _ => {
                    debug!(bound = %segments.join("::"), "skipping external supertrait");
                    Ok(None)
                }
            }
        }
    }
}

fn validate_method(trait_name: &str, method: &syn::TraitItemFn) -> Result<()> {
    let member = method.sig.ident.to_string();
    let reject = |detail: &str| {
        Err(Error::MalformedMember {
            trait_name: trait_name.to_string(),
            member: member.clone(),
            detail: detail.to_string(),
        })
    };
    if !method.sig.generics.params.is_empty() {
        return Err(Error::UnsupportedGenerics(format!("{trait_name}::{member}")));
    }
    if method.sig.asyncness.is_some() {
        return reject("async methods cannot be stubbed");
    }
    match method.sig.receiver() {
        Some(receiver) if receiver.reference.is_some() => Ok(()),
        _ => reject("a `&self` or `&mut self` receiver is required"),
    }
}

/// Expands a raw method into its normalized form: positional `argN` names,
/// `resultN` names (a top-level tuple return is the multi-result case), every
/// type resolved against the destination import table.
pub fn normalize(
    resolver: &Resolver,
    table: &mut ImportTable,
    flat: &FlatMethod,
) -> Result<MethodSig> {
    let sig = &flat.method.sig;
    let mut mut_receiver = false;
    let mut params = Vec::new();
    let mut index = 1usize;
    for input in &sig.inputs {
        match input {
            syn::FnArg::Receiver(receiver) => {
                mut_receiver = receiver.mutability.is_some();
            }
            syn::FnArg::Typed(pat_type) => {
                let ty = resolver.resolve(&flat.context, table, &pat_type.ty)?;
                params.push(NormalizedField {
                    name: util::ident(&format!("arg{index}")),
                    ty,
                });
                index += 1;
            }
        }
    }

    let mut results = Vec::new();
    if let syn::ReturnType::Type(_, ret) = &sig.output {
        let resolved = resolver.resolve(&flat.context, table, ret)?;
        let result_types: Vec<syn::Type> = match resolved {
            syn::Type::Tuple(tuple) => tuple.elems.into_iter().collect(),
            other => vec![other],
        };
        for (i, ty) in result_types.into_iter().enumerate() {
            results.push(NormalizedField {
                name: util::ident(&format!("result{}", i + 1)),
                ty,
            });
        }
    }

    Ok(MethodSig {
        name: sig.ident.clone(),
        mut_receiver,
        params,
        results,
    })
}
