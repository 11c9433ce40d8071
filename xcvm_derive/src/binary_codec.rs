//! `#[derive(BinaryCodec)]` expansion.
//!
//! Structs encode their fields in declaration order. Enums prefix the variant
//! fields with a one-byte tag; explicit discriminants (`Spawn = 2`) fix the tag
//! on the wire, otherwise tags count up from the previous variant. Decoding an
//! unknown tag yields `DecodeError::UnknownTag` naming the type.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DataEnum, DeriveInput, Fields, parse_macro_input};

pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match &input.data {
        Data::Struct(data) => Ok(struct_impl(&input, &data.fields)),
        Data::Enum(data) => enum_impl(&input, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "BinaryCodec cannot be derived for unions",
        )),
    };

    match expanded {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Wraps encode/decode bodies into the two trait impls.
fn wrap(input: &DeriveInput, encode_body: TokenStream2, decode_body: TokenStream2) -> TokenStream2 {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics crate::types::encoding::Encode for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn encode<S: crate::types::encoding::EncodeSink>(&self, out: &mut S) {
                #encode_body
            }
        }

        impl #impl_generics crate::types::encoding::Decode for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn decode(
                input: &mut &[u8],
            ) -> ::std::result::Result<Self, crate::types::encoding::DecodeError> {
                #decode_body
            }
        }
    }
}

fn struct_impl(input: &DeriveInput, fields: &Fields) -> TokenStream2 {
    let (encode_body, decode_body) = match fields {
        Fields::Named(named) => {
            let idents: Vec<_> = named.named.iter().map(|f| &f.ident).collect();
            (
                quote! { #(crate::types::encoding::Encode::encode(&self.#idents, out);)* },
                quote! {
                    Ok(Self { #(#idents: crate::types::encoding::Decode::decode(input)?,)* })
                },
            )
        }
        Fields::Unnamed(unnamed) => {
            let indices: Vec<_> = (0..unnamed.unnamed.len()).map(syn::Index::from).collect();
            let decoders = indices
                .iter()
                .map(|_| quote! { crate::types::encoding::Decode::decode(input)? });
            (
                quote! { #(crate::types::encoding::Encode::encode(&self.#indices, out);)* },
                quote! { Ok(Self(#(#decoders),*)) },
            )
        }
        Fields::Unit => (quote! {}, quote! { Ok(Self) }),
    };

    wrap(input, encode_body, decode_body)
}

fn enum_impl(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream2> {
    let type_name = input.ident.to_string();
    let tags = variant_tags(data)?;

    let mut encode_arms = Vec::with_capacity(data.variants.len());
    let mut decode_arms = Vec::with_capacity(data.variants.len());

    for (variant, tag) in data.variants.iter().zip(tags) {
        let ident = &variant.ident;
        match &variant.fields {
            Fields::Unit => {
                encode_arms.push(quote! {
                    Self::#ident => crate::types::encoding::Encode::encode(&#tag, out),
                });
                decode_arms.push(quote! { #tag => Ok(Self::#ident), });
            }
            Fields::Unnamed(unnamed) => {
                let bindings: Vec<_> = (0..unnamed.unnamed.len())
                    .map(|i| format_ident!("f{}", i))
                    .collect();
                let decoders = bindings
                    .iter()
                    .map(|_| quote! { crate::types::encoding::Decode::decode(input)? });
                encode_arms.push(quote! {
                    Self::#ident(#(#bindings),*) => {
                        crate::types::encoding::Encode::encode(&#tag, out);
                        #(crate::types::encoding::Encode::encode(#bindings, out);)*
                    }
                });
                decode_arms.push(quote! { #tag => Ok(Self::#ident(#(#decoders),*)), });
            }
            Fields::Named(named) => {
                let idents: Vec<_> = named.named.iter().map(|f| &f.ident).collect();
                encode_arms.push(quote! {
                    Self::#ident { #(#idents),* } => {
                        crate::types::encoding::Encode::encode(&#tag, out);
                        #(crate::types::encoding::Encode::encode(#idents, out);)*
                    }
                });
                decode_arms.push(quote! {
                    #tag => Ok(Self::#ident {
                        #(#idents: crate::types::encoding::Decode::decode(input)?,)*
                    }),
                });
            }
        }
    }

    let encode_body = quote! {
        match self {
            #(#encode_arms)*
        }
    };
    let decode_body = quote! {
        let tag: u8 = crate::types::encoding::Decode::decode(input)?;
        match tag {
            #(#decode_arms)*
            other => Err(crate::types::encoding::DecodeError::UnknownTag {
                ty: #type_name,
                tag: other,
            }),
        }
    };

    Ok(wrap(input, encode_body, decode_body))
}

/// Assigns each variant its one-byte wire tag.
fn variant_tags(data: &DataEnum) -> syn::Result<Vec<u8>> {
    let mut tags = Vec::with_capacity(data.variants.len());
    let mut next: Option<u8> = Some(0);

    for variant in &data.variants {
        let tag = match &variant.discriminant {
            Some((_, expr)) => literal_tag(expr)?,
            None => next.ok_or_else(|| {
                syn::Error::new_spanned(&variant.ident, "enum tag does not fit in a u8")
            })?,
        };
        if tags.contains(&tag) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                format!("duplicate enum tag {tag}"),
            ));
        }
        tags.push(tag);
        next = tag.checked_add(1);
    }

    Ok(tags)
}

fn literal_tag(expr: &syn::Expr) -> syn::Result<u8> {
    if let syn::Expr::Lit(syn::ExprLit {
        lit: syn::Lit::Int(int),
        ..
    }) = expr
    {
        return int.base10_parse::<u8>();
    }
    Err(syn::Error::new_spanned(
        expr,
        "enum tag must be an integer literal in 0..=255",
    ))
}
