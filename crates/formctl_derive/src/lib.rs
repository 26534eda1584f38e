use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input};

#[proc_macro_derive(FormModel)]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let form = formctl_path();
    let mut key_methods = Vec::new();
    let mut keys = Vec::new();
    let mut to_entries = Vec::new();
    let mut from_fields = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_ty = field.ty;
        let field_name = field_ident.to_string();

        key_methods.push(quote! {
            pub const fn #field_ident(&self) -> #form::FieldKey {
                #form::FieldKey::new(#field_name)
            }
        });

        keys.push(quote! { #form::FieldKey::new(#field_name) });

        to_entries.push(quote! {
            values.insert(
                #form::FieldKey::new(#field_name),
                #form::ToFieldValue::to_field_value(&self.#field_ident),
            );
        });

        from_fields.push(quote! {
            #field_ident: <#field_ty as #form::FromFieldValue>::from_field_value(
                &#form::FieldKey::new(#field_name),
                values.get(#field_name),
            )?,
        });
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#key_methods)*
        }

        impl #form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn field_keys() -> ::std::vec::Vec<#form::FieldKey> {
                ::std::vec![#(#keys),*]
            }

            #[allow(unused_mut)]
            fn to_values(&self) -> #form::ValueMap {
                let mut values = #form::ValueMap::new();
                #(#to_entries)*
                values
            }

            #[allow(unused_variables)]
            fn from_values(values: &#form::ValueMap) -> #form::FormResult<Self> {
                ::std::result::Result::Ok(Self {
                    #(#from_fields)*
                })
            }
        }
    }
    .into()
}

fn formctl_path() -> TokenStream2 {
    match crate_name("formctl") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident::form)
        }
        Ok(FoundCrate::Itself) => quote!(crate::form),
        Err(_) => quote!(::formctl::form),
    }
}
