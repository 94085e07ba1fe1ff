//! The `pointcut!` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{LitStr, parse_macro_input};
use weave_core::{Atom, ParamPattern, Pattern, Pointcut};

pub fn pointcut_impl(input: TokenStream) -> TokenStream {
    let lit = parse_macro_input!(input as LitStr);

    match weave_core::parse(&lit.value()) {
        Ok(expr) => TokenStream::from(expand(&expr)),
        Err(err) => syn::Error::new(lit.span(), err.to_string())
            .to_compile_error()
            .into(),
    }
}

fn expand(expr: &Pointcut) -> TokenStream2 {
    match expr {
        Pointcut::Atom(atom) => {
            let atom = expand_atom(atom);
            quote! { ::weave::Pointcut::Atom(#atom) }
        }
        Pointcut::And(l, r) => {
            let (l, r) = (expand(l), expand(r));
            quote! {
                ::weave::Pointcut::And(::std::boxed::Box::new(#l), ::std::boxed::Box::new(#r))
            }
        }
        Pointcut::Or(l, r) => {
            let (l, r) = (expand(l), expand(r));
            quote! {
                ::weave::Pointcut::Or(::std::boxed::Box::new(#l), ::std::boxed::Box::new(#r))
            }
        }
        Pointcut::Not(inner) => {
            let inner = expand(inner);
            quote! { ::weave::Pointcut::Not(::std::boxed::Box::new(#inner)) }
        }
        Pointcut::Named(name) => {
            quote! { ::weave::Pointcut::Named(::std::string::String::from(#name)) }
        }
    }
}

fn expand_atom(atom: &Atom) -> TokenStream2 {
    let package = expand_pattern(&atom.package);
    let type_name = expand_pattern(&atom.type_name);
    let method = expand_pattern(&atom.method);
    let params = match &atom.params {
        ParamPattern::Any => quote! { ::weave::ParamPattern::Any },
        ParamPattern::Exact(patterns) => {
            let patterns = patterns.iter().map(expand_pattern);
            quote! { ::weave::ParamPattern::Exact(::std::vec![#(#patterns),*]) }
        }
        ParamPattern::Leading(patterns) => {
            let patterns = patterns.iter().map(expand_pattern);
            quote! { ::weave::ParamPattern::Leading(::std::vec![#(#patterns),*]) }
        }
    };

    quote! {
        ::weave::Atom {
            package: #package,
            type_name: #type_name,
            method: #method,
            params: #params,
        }
    }
}

fn expand_pattern(pattern: &Pattern) -> TokenStream2 {
    let source = pattern.as_str();
    quote! { ::weave::Pattern::new(#source) }
}
