//! Demonstration generator: wraps a trait with call-counting and timing
//! instrumentation. Consumes the same flattened, normalized, resolved method
//! signatures as stub synthesis; adds no resolution logic of its own.

use syn::parse_quote;

use crate::error::Result;
use crate::flatten::{MethodSig, TraitRef};
use crate::synth::{FileBuilder, ImportTable};
use crate::util;

/// Accumulates the monitoring wrapper under construction. The wrapper holds a
/// boxed delegate plus three atomic counters and forwards every method,
/// timing the delegated call and counting `Err` returns as failures.
pub struct MonitorModel {
    monitor_name: syn::Ident,
    builder: FileBuilder,
    next_ty: syn::Type,
    atomic_alias: syn::Ident,
    time_alias: syn::Ident,
    trait_impls: Vec<TraitImplGroup>,
}

struct TraitImplGroup {
    declaring: TraitRef,
    trait_path: syn::Path,
    methods: Vec<syn::ImplItemFn>,
}

impl MonitorModel {
    pub fn new(monitor_name: &str, root: &TraitRef) -> Self {
        let mut builder = FileBuilder::new();
        let root_alias = util::ident(&builder.imports_mut().register(&root.module_path));
        let root_ident = util::ident(&root.name);
        let atomic_alias = util::ident(&builder.imports_mut().register("std::sync::atomic"));
        let time_alias = util::ident(&builder.imports_mut().register("std::time"));
        Self {
            monitor_name: util::ident(monitor_name),
            builder,
            next_ty: parse_quote!(Box<dyn #root_alias::#root_ident + Send + Sync>),
            atomic_alias,
            time_alias,
            trait_impls: Vec::new(),
        }
    }

    pub fn imports_mut(&mut self) -> &mut ImportTable {
        self.builder.imports_mut()
    }

    pub fn add_method(&mut self, declaring: &TraitRef, sig: &MethodSig) -> Result<()> {
        let forward = self.build_forward(declaring, sig);
        if let Some(group) = self.trait_impls.iter_mut().find(|g| g.declaring == *declaring) {
            let name = sig.name.to_string();
            if !group.methods.iter().any(|m| m.sig.ident == name) {
                group.methods.push(forward);
            }
            return Ok(());
        }
        let alias = util::ident(&self.builder.imports_mut().register(&declaring.module_path));
        let trait_ident = util::ident(&declaring.name);
        self.trait_impls.push(TraitImplGroup {
            declaring: declaring.clone(),
            trait_path: parse_quote!(#alias::#trait_ident),
            methods: vec![forward],
        });
        Ok(())
    }

    fn build_forward(&mut self, declaring: &TraitRef, sig: &MethodSig) -> syn::ImplItemFn {
        let method = &sig.name;
        let atomic = &self.atomic_alias;
        let time = &self.time_alias;
        let alias = util::ident(&self.builder.imports_mut().register(&declaring.module_path));
        let trait_ident = util::ident(&declaring.name);

        let receiver: syn::Receiver = if sig.mut_receiver {
            parse_quote!(&mut self)
        } else {
            parse_quote!(&self)
        };
        let delegate: syn::Expr = if sig.mut_receiver {
            parse_quote!(self.next.as_mut())
        } else {
            parse_quote!(self.next.as_ref())
        };
        let param_names: Vec<&syn::Ident> = sig.params.iter().map(|f| &f.name).collect();
        let param_types: Vec<&syn::Type> = sig.params.iter().map(|f| &f.ty).collect();

        let call: syn::Expr =
            parse_quote!(#alias::#trait_ident::#method(#delegate #(, #param_names)*));
        let bind: syn::Stmt = match sig.results.len() {
            0 => parse_quote!(#call;),
            1 => parse_quote!(let result1 = #call;),
            _ => {
                let names: Vec<&syn::Ident> = sig.results.iter().map(|f| &f.name).collect();
                parse_quote!(let (#(#names),*) = #call;)
            }
        };

        // count a failure when some result is an `Err`
        let failure_check: Option<syn::Stmt> = sig
            .results
            .iter()
            .find(|f| util::is_result_type(&f.ty))
            .map(|f| {
                let name = &f.name;
                parse_quote! {
                    if #name.is_err() {
                        self.failed_ops.fetch_add(1, #atomic::Ordering::Relaxed);
                    }
                }
            });

        let output: syn::ReturnType = if sig.has_results() {
            let types: Vec<syn::Type> = sig.results.iter().map(|f| f.ty.clone()).collect();
            let ret = util::tuple_type(&types);
            parse_quote!(-> #ret)
        } else {
            syn::ReturnType::Default
        };
        let tail: Option<syn::Expr> = if sig.has_results() {
            let names: Vec<syn::Expr> = sig
                .results
                .iter()
                .map(|f| {
                    let name = &f.name;
                    parse_quote!(#name)
                })
                .collect();
            Some(util::tuple_expr(&names))
        } else {
            None
        };

        parse_quote! {
            fn #method(#receiver #(, #param_names: #param_types)*) #output {
                self.total_ops.fetch_add(1, #atomic::Ordering::Relaxed);
                let started = #time::Instant::now();
                #bind
                self.ops_duration_micros
                    .fetch_add(started.elapsed().as_micros() as u64, #atomic::Ordering::Relaxed);
                #failure_check
                #tail
            }
        }
    }

    pub fn render(mut self) -> Result<String> {
        let monitor_name = &self.monitor_name;
        let next_ty = &self.next_ty;
        let atomic = &self.atomic_alias;
        let monitor_struct: syn::ItemStruct = parse_quote! {
            pub struct #monitor_name {
                next: #next_ty,
                total_ops: #atomic::AtomicU64,
                failed_ops: #atomic::AtomicU64,
                ops_duration_micros: #atomic::AtomicU64,
            }
        };
        let inherent: syn::ItemImpl = parse_quote! {
            impl #monitor_name {
                pub fn new(next: #next_ty) -> Self {
                    Self {
                        next,
                        total_ops: #atomic::AtomicU64::new(0),
                        failed_ops: #atomic::AtomicU64::new(0),
                        ops_duration_micros: #atomic::AtomicU64::new(0),
                    }
                }
                pub fn total_ops(&self) -> u64 {
                    self.total_ops.load(#atomic::Ordering::Relaxed)
                }
                pub fn failed_ops(&self) -> u64 {
                    self.failed_ops.load(#atomic::Ordering::Relaxed)
                }
                pub fn ops_duration_micros(&self) -> u64 {
                    self.ops_duration_micros.load(#atomic::Ordering::Relaxed)
                }
            }
        };
        self.builder.add_general_item(syn::Item::Struct(monitor_struct));
        self.builder.add_impl_item(syn::Item::Impl(inherent));
        for group in &self.trait_impls {
            let trait_path = &group.trait_path;
            let methods = &group.methods;
            let item: syn::ItemImpl = parse_quote! {
                impl #trait_path for #monitor_name {
                    #(#methods)*
                }
            };
            self.builder.add_impl_item(syn::Item::Impl(item));
        }
        self.builder.render()
    }
}
