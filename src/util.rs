//! Small AST helpers shared by the locator, flattener, and generators.

use proc_macro2::Span;
use syn::parse_quote;

pub fn ident(name: &str) -> syn::Ident {
    syn::Ident::new(name, Span::call_site())
}

/// Finds a top-level type declaration (trait, struct, enum, or alias) by name.
pub fn find_type_item<'a>(file: &'a syn::File, name: &str) -> Option<&'a syn::Item> {
    file.items.iter().find(|item| match item {
        syn::Item::Trait(t) => t.ident == name,
        syn::Item::Struct(s) => s.ident == name,
        syn::Item::Enum(e) => e.ident == name,
        syn::Item::Type(t) => t.ident == name,
        _ => false,
    })
}

/// Collapses a list of types into the type of one logical value: `()` for an
/// empty list, the type itself for one entry, a tuple otherwise.
pub fn tuple_type(types: &[syn::Type]) -> syn::Type {
    match types {
        [] => parse_quote!(()),
        [single] => single.clone(),
        many => parse_quote!((#(#many),*)),
    }
}

/// Tuple counterpart of [`tuple_type`] for expressions.
pub fn tuple_expr(exprs: &[syn::Expr]) -> syn::Expr {
    match exprs {
        [] => parse_quote!(()),
        [single] => single.clone(),
        many => parse_quote!((#(#many),*)),
    }
}

/// Whether a type is spelled as some `Result<..>`, which is what the
/// instrumentation generator counts as a fallible return.
pub fn is_result_type(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(p) => p
            .path
            .segments
            .last()
            .map(|seg| seg.ident == "Result")
            .unwrap_or(false),
        syn::Type::Paren(p) => is_result_type(&p.elem),
        syn::Type::Group(g) => is_result_type(&g.elem),
        _ => false,
    }
}

pub fn to_pascal_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = true;
    for ch in input.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
