//! `#[derive(Error)]` expansion.
//!
//! ```ignore
//! #[derive(Debug, Error)]
//! pub enum RouterError {
//!     #[error("caller {caller} is not the bridge for network {network}")]
//!     Unauthorized { caller: Address, network: NetworkId },
//!     #[error("program rejected: {0}")]
//!     Program(#[from] ProgramError),
//! }
//! ```
//!
//! Tuple fields are referenced positionally (`{0}`), named fields by name.
//! Fields the message does not mention are left unbound. A single-field
//! variant whose field carries `#[from]` also gets a `From` impl.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Lit, Meta, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (display_body, from_impls) = match &input.data {
        Data::Enum(data) => {
            let mut arms = Vec::with_capacity(data.variants.len());
            let mut from_impls = Vec::new();
            for variant in &data.variants {
                let message = message(&variant.attrs, &variant.ident)?;
                let ident = &variant.ident;
                arms.push(variant_arm(ident, &variant.fields, &message));

                if let Some(ty) = from_field(&variant.fields)? {
                    from_impls.push(quote! {
                        impl #impl_generics ::std::convert::From<#ty> for #name #ty_generics #where_clause {
                            fn from(source: #ty) -> Self {
                                Self::#ident(source)
                            }
                        }
                    });
                }
            }
            (quote! { match self { #(#arms)* } }, from_impls)
        }
        Data::Struct(data) => {
            let message = message(&input.attrs, &input.ident)?;
            (struct_body(&data.fields, &message), Vec::new())
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Error cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #display_body
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}

        #(#from_impls)*
    })
}

/// Builds the `Display` match arm for one variant.
fn variant_arm(ident: &syn::Ident, fields: &Fields, message: &str) -> TokenStream2 {
    match fields {
        Fields::Unit => quote! { Self::#ident => f.write_str(#message), },
        Fields::Unnamed(unnamed) => {
            let format = positional_to_named(message, unnamed.unnamed.len());
            let mut patterns = Vec::with_capacity(unnamed.unnamed.len());
            let mut args = Vec::new();
            for i in 0..unnamed.unnamed.len() {
                let binding = format_ident!("f{}", i);
                if mentions(&format, &binding.to_string()) {
                    patterns.push(binding.to_token_stream());
                    args.push(quote! { #binding = #binding });
                } else {
                    patterns.push(quote! { _ });
                }
            }
            quote! { Self::#ident(#(#patterns),*) => write!(f, #format #(, #args)*), }
        }
        Fields::Named(named) => {
            let used: Vec<_> = named
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .filter(|ident| mentions(message, &ident.to_string()))
                .collect();
            quote! {
                Self::#ident { #(#used,)* .. } => write!(f, #message #(, #used = #used)*),
            }
        }
    }
}

fn struct_body(fields: &Fields, message: &str) -> TokenStream2 {
    match fields {
        Fields::Unit => quote! { f.write_str(#message) },
        Fields::Unnamed(unnamed) => {
            let format = positional_to_named(message, unnamed.unnamed.len());
            let args = (0..unnamed.unnamed.len()).filter_map(|i| {
                let binding = format_ident!("f{}", i);
                let index = syn::Index::from(i);
                mentions(&format, &binding.to_string())
                    .then(|| quote! { #binding = self.#index })
            });
            quote! { write!(f, #format #(, #args)*) }
        }
        Fields::Named(named) => {
            let args = named
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .filter(|ident| mentions(message, &ident.to_string()))
                .map(|ident| quote! { #ident = self.#ident });
            quote! { write!(f, #message #(, #args)*) }
        }
    }
}

/// Returns the source type of a `#[from]` variant, if any.
fn from_field(fields: &Fields) -> syn::Result<Option<&syn::Type>> {
    let Fields::Unnamed(unnamed) = fields else {
        return Ok(None);
    };
    let Some(field) = unnamed
        .unnamed
        .iter()
        .find(|field| field.attrs.iter().any(|attr| attr.path().is_ident("from")))
    else {
        return Ok(None);
    };
    if unnamed.unnamed.len() != 1 {
        return Err(syn::Error::new_spanned(
            field,
            "#[from] requires a variant with exactly one field",
        ));
    }
    Ok(Some(&field.ty))
}

/// Reads the string literal out of `#[error("...")]`.
fn message<T: ToTokens>(attrs: &[Attribute], target: &T) -> syn::Result<String> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("error")) else {
        return Err(syn::Error::new_spanned(
            target,
            "missing #[error(\"...\")] attribute",
        ));
    };
    let Meta::List(list) = &attr.meta else {
        return Err(syn::Error::new_spanned(
            &attr.meta,
            "expected #[error(\"message\")]",
        ));
    };
    match syn::parse2::<Lit>(list.tokens.clone()) {
        Ok(Lit::Str(lit)) => Ok(lit.value()),
        _ => Err(syn::Error::new_spanned(
            &attr.meta,
            "#[error] message must be a string literal",
        )),
    }
}

/// True when `format` interpolates `name` as `{name}` or `{name:...}`.
fn mentions(format: &str, name: &str) -> bool {
    format.contains(&format!("{{{name}}}")) || format.contains(&format!("{{{name}:"))
}

/// Rewrites `{0}` / `{0:?}` into `{f0}` / `{f0:?}` so tuple fields can be passed by name.
fn positional_to_named(format: &str, field_count: usize) -> String {
    let mut result = format.to_string();
    for i in (0..field_count).rev() {
        result = result
            .replace(&format!("{{{i}}}"), &format!("{{f{i}}}"))
            .replace(&format!("{{{i}:"), &format!("{{f{i}:"));
    }
    result
}
