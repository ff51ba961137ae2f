//! Model derive macro implementation

mod attrs;

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

/// A persisted field.
struct ModelField {
    ident: syn::Ident,
    /// Declared name with any `r#` prefix removed.
    name: String,
    ty: syn::Type,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let ident = &input.ident;
    let type_name = ident.unraw().to_string();
    let struct_attrs = attrs::StructAttrs::parse(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Model can only be derived for structs",
            ));
        }
    };

    let mut persisted = Vec::new();
    for field in fields {
        if attrs::FieldAttrs::parse(&field.attrs)?.skip {
            continue;
        }
        let Some(field_ident) = field.ident.clone() else {
            continue;
        };
        persisted.push(ModelField {
            name: field_ident.unraw().to_string(),
            ident: field_ident,
            ty: field.ty.clone(),
        });
    }

    let table = match &struct_attrs.table {
        Some(table) => quote! { ::core::option::Option::Some(#table) },
        None => quote! { ::core::option::Option::None },
    };

    let field_metas = persisted.iter().map(|f| {
        let name = &f.name;
        let ty = &f.ty;
        quote! {
            chainorm::FieldMeta {
                name: #name,
                kind: <#ty as chainorm::SqlValue>::KIND,
            }
        }
    });

    let get_arms = persisted.iter().map(|f| {
        let name = &f.name;
        let field_ident = &f.ident;
        quote! {
            #name => ::core::option::Option::Some(chainorm::SqlValue::to_value(&self.#field_ident)),
        }
    });

    let set_arms = persisted.iter().map(|f| {
        let name = &f.name;
        let field_ident = &f.ident;
        quote! {
            #name => self.#field_ident = chainorm::decode_field(field, value)?,
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics chainorm::Model for #ident #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
            const TABLE: ::core::option::Option<&'static str> = #table;
            const FIELDS: &'static [chainorm::FieldMeta] = &[#(#field_metas),*];

            fn get(&self, field: &str) -> ::core::option::Option<chainorm::Value> {
                match field {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables, unreachable_code)]
            fn set(
                &mut self,
                field: &str,
                value: chainorm::Value,
            ) -> chainorm::OrmResult<bool> {
                match field {
                    #(#set_arms)*
                    _ => return ::core::result::Result::Ok(false),
                }
                ::core::result::Result::Ok(true)
            }
        }
    })
}
