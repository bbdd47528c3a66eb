// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::{Parse, Parser};
use syn::{
    DeriveInput, Field, Fields, FieldsNamed, GenericArgument, PathArguments, Type, Variant,
    parse_macro_input, parse_quote,
};

fn boxed_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.first()?;
    if segment.ident != "Box" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    let GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    match inner {
        Type::TraitObject(_) => None,
        _ => Some(inner),
    }
}

fn field_is(field: &Field, name: &str) -> bool {
    field.ident.as_ref().is_some_and(|ident| ident == name)
}

fn add_location(variant: &mut Variant) -> &mut FieldsNamed {
    if matches!(variant.fields, Fields::Unit) {
        let empty = FieldsNamed::parse.parse2(quote! {{}}).unwrap();
        variant.fields = Fields::Named(empty);
    }
    let Fields::Named(fields) = &mut variant.fields else {
        panic!("{}: tuple variants are not supported", variant.ident)
    };
    let location = Field::parse_named
        .parse2(quote! {#[snafu(implicit)] _location: ::snafu::Location})
        .unwrap();
    fields.named.push(location);
    fields
}

pub fn trace_error(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(item as DeriveInput);
    let syn::Data::Enum(enum_data) = &mut input.data else {
        panic!("#[trace_error] only applies to enums")
    };
    for variant in enum_data.variants.iter_mut() {
        let fields = add_location(variant);
        let source = fields
            .named
            .iter_mut()
            .find(|f| field_is(f, "source") || field_is(f, "error"));
        let Some(source) = source else {
            continue;
        };
        let attr = match boxed_inner_type(&source.ty) {
            Some(inner) => parse_quote! {#[snafu(source(from(#inner, Box::new)))]},
            None => parse_quote! {#[snafu(source)]},
        };
        source.attrs.push(attr);
    }
    quote! { #input }.into()
}

fn debug_trace_arm(name: &syn::Ident, variant: &Variant) -> TokenStream2 {
    let Fields::Named(fields) = &variant.fields else {
        panic!("{}: expected named fields", variant.ident)
    };
    let cfg_attrs = variant.attrs.iter().filter(|a| a.path().is_ident("cfg"));
    let has_source = fields.named.iter().any(|f| field_is(f, "source"));
    let has_error = fields.named.iter().any(|f| field_is(f, "error"));
    let variant_name = &variant.ident;
    if has_source {
        quote! {
            #(#cfg_attrs)*
            #name::#variant_name { _location, source, .. } => {
                let level = source.debug_trace(f)?;
                writeln!(f, "{level}: {self}, at {_location}")?;
                Ok(level + 1)
            }
        }
    } else if has_error {
        quote! {
            #(#cfg_attrs)*
            #name::#variant_name { _location, error, .. } => {
                writeln!(f, "0: {error}")?;
                writeln!(f, "1: {self}, at {_location}")?;
                Ok(2)
            }
        }
    } else {
        quote! {
            #(#cfg_attrs)*
            #name::#variant_name { _location, .. } => {
                writeln!(f, "0: {self}, at {_location}")?;
                Ok(1)
            }
        }
    }
}

pub fn derive_debug_trace(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let syn::Data::Enum(enum_data) = &input.data else {
        panic!("DebugTrace can only be derived for enums")
    };
    let arms = enum_data.variants.iter().map(|v| debug_trace_arm(name, v));

    quote! {
        impl DebugTrace for #name {
            #[inline(never)]
            fn debug_trace(
                &self,
                f: &mut ::std::fmt::Formatter<'_>,
            ) -> ::std::result::Result<u32, ::std::fmt::Error> {
                match self {
                    #(#arms)*
                }
            }
        }

        impl ::std::fmt::Debug for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                writeln!(f, "{self}")?;
                DebugTrace::debug_trace(self, f)?;
                Ok(())
            }
        }
    }
    .into()
}
