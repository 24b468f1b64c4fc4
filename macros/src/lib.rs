use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::parse::{Parse, ParseStream, Result};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Expr, Ident, Token};

/// Comma separated parser expressions, trailing comma allowed.
struct Parsers(Vec<Expr>);

impl Parse for Parsers {
    fn parse(input: ParseStream) -> Result<Self> {
        let punc: Punctuated<Expr, Token![,]> = Punctuated::parse_terminated(input)?;
        Ok(Self(punc.into_iter().collect()))
    }
}

/// Folds `parsers` into a balanced tree of calls to the binary `combinator`.
///
/// A balanced tree keeps the nesting depth of the generated types logarithmic
/// in the number of parsers.
fn balanced(parsers: &[Expr], combinator: &TokenStream2) -> TokenStream2 {
    match parsers {
        [single] => quote! { { #single } },
        [first, second] => quote! { { #combinator(#first, #second) } },
        _ => {
            let (left, right) = parsers.split_at(parsers.len() / 2);
            let left = balanced(left, combinator);
            let right = balanced(right, combinator);
            quote! { { #combinator(#left, #right) } }
        }
    }
}

fn elem(idx: usize) -> Ident {
    Ident::new(&format!("__descent_seq_{idx}"), Span::call_site())
}

/// Destructuring pattern matching the nested pairs built by [`balanced`].
fn pair_pattern(start: usize, end: usize) -> TokenStream2 {
    match end - start {
        1 => {
            let var = elem(start);
            quote! { #var }
        }
        2 => {
            let (first, second) = (elem(start), elem(start + 1));
            quote! { (#first, #second) }
        }
        len => {
            let mid = start + len / 2;
            let left = pair_pattern(start, mid);
            let right = pair_pattern(mid, end);
            quote! { (#left, #right) }
        }
    }
}

#[proc_macro]
pub fn seq(args: TokenStream) -> TokenStream {
    let Parsers(parsers) = parse_macro_input!(args as Parsers);
    if parsers.is_empty() {
        return quote! { { ::descent::basic::pure(()) } }.into();
    }

    let tree = balanced(&parsers, &quote! { ::descent::basic::pair });
    let pattern = pair_pattern(0, parsers.len());
    let vars = (0..parsers.len()).map(elem);
    quote! {
        {
            ::descent::basic::map(#tree, |#pattern| (#(#vars,)*))
        }
    }
    .into()
}

#[proc_macro]
pub fn choice(args: TokenStream) -> TokenStream {
    let Parsers(parsers) = parse_macro_input!(args as Parsers);
    if parsers.is_empty() {
        return quote! { { ::descent::basic::fail() } }.into();
    }
    balanced(&parsers, &quote! { ::descent::basic::either }).into()
}
