//! Stub synthesis: turns normalized method signatures into the generated
//! stub type, its per-method state, and its accessor methods.

pub mod file;

pub use file::{FileBuilder, ImportTable};

use syn::parse_quote;

use crate::error::Result;
use crate::flatten::{MethodSig, TraitRef};
use crate::util;

/// Accumulates the stub type under construction. Method registration order is
/// preserved in the emitted declaration order.
pub struct StubModel {
    stub_name: syn::Ident,
    builder: FileBuilder,
    stub_fields: Vec<(syn::Ident, syn::Type)>,
    state_structs: Vec<syn::ItemStruct>,
    accessor_impls: Vec<syn::ItemImpl>,
    trait_impls: Vec<TraitImplGroup>,
    registered: Vec<String>,
}

struct TraitImplGroup {
    declaring: TraitRef,
    trait_path: syn::Path,
    methods: Vec<syn::ImplItemFn>,
}

impl StubModel {
    pub fn new(stub_name: &str) -> Self {
        Self {
            stub_name: util::ident(stub_name),
            builder: FileBuilder::new(),
            stub_fields: Vec::new(),
            state_structs: Vec::new(),
            accessor_impls: Vec::new(),
            trait_impls: Vec::new(),
            registered: Vec::new(),
        }
    }

    /// The destination file's import table; the resolver registers against
    /// this while normalizing signatures.
    pub fn imports_mut(&mut self) -> &mut ImportTable {
        self.builder.imports_mut()
    }

    /// Registers one normalized method: state struct, guard field, and the
    /// five accessors. A method name seen before (diamond embedding) keeps
    /// its existing state; only the declaring trait's impl gains the method.
    pub fn add_method(&mut self, declaring: &TraitRef, sig: &MethodSig) -> Result<()> {
        let invoke = self.build_invoke(sig);
        self.record_trait_method(declaring, invoke);

        let method_name = sig.name.to_string();
        if self.registered.iter().any(|name| name == &method_name) {
            return Ok(());
        }
        self.registered.push(method_name);

        let guard_field = self.guard_field_ident(sig);
        let state_ident = self.state_struct_ident(sig);
        let sync_alias = util::ident(&self.builder.imports_mut().register("std::sync"));

        let stub_fn_ty = self.stub_fn_type(sig);
        let args_tuple_ty = args_tuple_type(sig);

        let mut state_fields: Vec<syn::Field> = vec![
            parse_quote!(stub: Option<#stub_fn_ty>),
            parse_quote!(args_for_call: Vec<#args_tuple_ty>),
        ];
        if sig.has_results() {
            let ret_ty = return_type(sig);
            state_fields.push(parse_quote!(returns: Option<#ret_ty>));
        }
        self.state_structs.push(parse_quote! {
            #[derive(Default)]
            struct #state_ident {
                #(#state_fields),*
            }
        });
        self.stub_fields
            .push((guard_field, parse_quote!(#sync_alias::RwLock<#state_ident>)));

        let mut accessors = vec![self.build_call_count(sig)];
        if sig.has_params() {
            accessors.push(self.build_args_for_call(sig));
        }
        if sig.has_results() {
            accessors.push(self.build_set_returns(sig));
        }
        accessors.push(self.build_set_stub(sig));
        let stub_name = &self.stub_name;
        self.accessor_impls.push(parse_quote! {
            impl #stub_name {
                #(#accessors)*
            }
        });
        Ok(())
    }

    fn record_trait_method(&mut self, declaring: &TraitRef, invoke: syn::ImplItemFn) {
        if let Some(group) = self.trait_impls.iter_mut().find(|g| g.declaring == *declaring) {
            let name = invoke.sig.ident.to_string();
            if !group.methods.iter().any(|m| m.sig.ident == name) {
                group.methods.push(invoke);
            }
            return;
        }
        let alias = util::ident(&self.builder.imports_mut().register(&declaring.module_path));
        let trait_ident = util::ident(&declaring.name);
        self.trait_impls.push(TraitImplGroup {
            declaring: declaring.clone(),
            trait_path: parse_quote!(#alias::#trait_ident),
            methods: vec![invoke],
        });
    }

    /// Assembles and formats the complete output file.
    pub fn render(mut self) -> Result<String> {
        let stub_name = &self.stub_name;
        let field_names: Vec<&syn::Ident> = self.stub_fields.iter().map(|(name, _)| name).collect();
        let field_types: Vec<&syn::Type> = self.stub_fields.iter().map(|(_, ty)| ty).collect();
        let stub_struct: syn::ItemStruct = parse_quote! {
            #[derive(Default)]
            pub struct #stub_name {
                #(#field_names: #field_types),*
            }
        };
        self.builder.add_general_item(syn::Item::Struct(stub_struct));
        for state in std::mem::take(&mut self.state_structs) {
            self.builder.add_general_item(syn::Item::Struct(state));
        }
        for group in &self.trait_impls {
            let trait_path = &group.trait_path;
            let methods = &group.methods;
            let item: syn::ItemImpl = parse_quote! {
                impl #trait_path for #stub_name {
                    #(#methods)*
                }
            };
            self.builder.add_impl_item(syn::Item::Impl(item));
        }
        for accessors in std::mem::take(&mut self.accessor_impls) {
            self.builder.add_impl_item(syn::Item::Impl(accessors));
        }
        self.builder.render()
    }

    fn guard_field_ident(&self, sig: &MethodSig) -> syn::Ident {
        util::ident(&format!("{}_call", sig.name))
    }

    fn state_struct_ident(&self, sig: &MethodSig) -> syn::Ident {
        util::ident(&format!(
            "{}{}Call",
            self.stub_name,
            util::to_pascal_case(&sig.name.to_string())
        ))
    }

    fn stub_fn_type(&self, sig: &MethodSig) -> syn::Type {
        let param_types: Vec<&syn::Type> = sig.params.iter().map(|f| &f.ty).collect();
        if sig.has_results() {
            let ret_ty = return_type(sig);
            parse_quote!(Box<dyn Fn(#(#param_types),*) -> #ret_ty + Send + Sync>)
        } else {
            parse_quote!(Box<dyn Fn(#(#param_types),*) + Send + Sync>)
        }
    }

    /// The trait method itself: records the call atomically under the write
    /// guard, then delegates to the override or falls back to the configured
    /// returns.
    fn build_invoke(&self, sig: &MethodSig) -> syn::ImplItemFn {
        let method = &sig.name;
        let guard_field = self.guard_field_ident(sig);
        let receiver: syn::Receiver = if sig.mut_receiver {
            parse_quote!(&mut self)
        } else {
            parse_quote!(&self)
        };
        let param_names: Vec<&syn::Ident> = sig.params.iter().map(|f| &f.name).collect();
        let param_types: Vec<&syn::Type> = sig.params.iter().map(|f| &f.ty).collect();
        let recorded: Vec<syn::Expr> = sig
            .params
            .iter()
            .map(|f| {
                let name = &f.name;
                parse_quote!(#name.clone())
            })
            .collect();
        let push_expr = util::tuple_expr(&recorded);

        if sig.has_results() {
            let ret_ty = return_type(sig);
            parse_quote! {
                fn #method(#receiver #(, #param_names: #param_types)*) -> #ret_ty {
                    let mut call = self.#guard_field.write().unwrap();
                    call.args_for_call.push(#push_expr);
                    if let Some(stub) = call.stub.as_ref() {
                        return stub(#(#param_names),*);
                    }
                    call.returns.clone().unwrap_or_default()
                }
            }
        } else {
            parse_quote! {
                fn #method(#receiver #(, #param_names: #param_types)*) {
                    let mut call = self.#guard_field.write().unwrap();
                    call.args_for_call.push(#push_expr);
                    if let Some(stub) = call.stub.as_ref() {
                        stub(#(#param_names),*);
                    }
                }
            }
        }
    }

    fn build_call_count(&self, sig: &MethodSig) -> syn::ImplItemFn {
        let name = util::ident(&format!("{}_call_count", sig.name));
        let guard_field = self.guard_field_ident(sig);
        parse_quote! {
            pub fn #name(&self) -> usize {
                self.#guard_field.read().unwrap().args_for_call.len()
            }
        }
    }

    /// Indexed access mirrors direct slice indexing: out of range panics.
    fn build_args_for_call(&self, sig: &MethodSig) -> syn::ImplItemFn {
        let name = util::ident(&format!("{}_args_for_call", sig.name));
        let guard_field = self.guard_field_ident(sig);
        let args_tuple_ty = args_tuple_type(sig);
        parse_quote! {
            pub fn #name(&self, index: usize) -> #args_tuple_ty {
                self.#guard_field.read().unwrap().args_for_call[index].clone()
            }
        }
    }

    fn build_set_returns(&self, sig: &MethodSig) -> syn::ImplItemFn {
        let name = util::ident(&format!("set_{}_returns", sig.name));
        let guard_field = self.guard_field_ident(sig);
        let result_names: Vec<&syn::Ident> = sig.results.iter().map(|f| &f.name).collect();
        let result_types: Vec<&syn::Type> = sig.results.iter().map(|f| &f.ty).collect();
        let packed: Vec<syn::Expr> = sig
            .results
            .iter()
            .map(|f| {
                let name = &f.name;
                parse_quote!(#name)
            })
            .collect();
        let tuple = util::tuple_expr(&packed);
        parse_quote! {
            pub fn #name(&self #(, #result_names: #result_types)*) {
                self.#guard_field.write().unwrap().returns = Some(#tuple);
            }
        }
    }

    fn build_set_stub(&self, sig: &MethodSig) -> syn::ImplItemFn {
        let name = util::ident(&format!("set_{}_stub", sig.name));
        let guard_field = self.guard_field_ident(sig);
        let stub_fn_ty = self.stub_fn_type(sig);
        parse_quote! {
            pub fn #name(&self, stub: #stub_fn_ty) {
                self.#guard_field.write().unwrap().stub = Some(stub);
            }
        }
    }
}

/// The stored shape of one call's arguments: `()`, the bare type, or a tuple.
fn args_tuple_type(sig: &MethodSig) -> syn::Type {
    let types: Vec<syn::Type> = sig.params.iter().map(|f| f.ty.clone()).collect();
    util::tuple_type(&types)
}

/// The method's return shape: bare type for one result, tuple for several.
fn return_type(sig: &MethodSig) -> syn::Type {
    let types: Vec<syn::Type> = sig.results.iter().map(|f| f.ty.clone()).collect();
    util::tuple_type(&types)
}
