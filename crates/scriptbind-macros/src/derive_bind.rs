//! Implementation of the `#[derive(Bind)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DataEnum, DataStruct, DeriveInput, Fields, Ident, parse_macro_input};

use crate::attrs::{MemberAttrs, Repr, TypeAttrs};

pub fn derive_bind_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_bind_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_bind_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Bind cannot be derived for generic types",
        ));
    }

    let attrs = TypeAttrs::from_attrs(&input.attrs)?;
    let repr = Repr::from_attrs(&input.attrs)?;
    let script_name = attrs
        .name
        .clone()
        .unwrap_or_else(|| input.ident.to_string());

    match &input.data {
        Data::Struct(data) => derive_struct(input, data, &attrs, &repr, &script_name),
        Data::Enum(data) => derive_enum(input, data, &attrs, &repr, &script_name),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Bind cannot be derived for unions",
        )),
    }
}

/// Generate the `Describe` implementation shared by structs and enums.
fn generate_describe(name: &Ident, script_name: &str, constructor: TokenStream2) -> TokenStream2 {
    quote! {
        impl ::scriptbind_core::Describe for #name {
            fn describe() -> ::scriptbind_core::TypeRef {
                #[allow(unused_imports)]
                use ::scriptbind_core::__private::{ViaAny as _, ViaCopy as _};

                ::scriptbind_core::intern::<#name>(|| {
                    let is_copy =
                        (&::scriptbind_core::__private::CopyCheck::<#name>::new()).is_copy();
                    ::scriptbind_core::TypeDescriptor::#constructor::<#name>(#script_name, is_copy)
                })
            }
        }
    }
}

fn derive_struct(
    input: &DeriveInput,
    data: &DataStruct,
    attrs: &TypeAttrs,
    repr: &Repr,
    script_name: &str,
) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !repr.c {
        return Err(syn::Error::new_spanned(
            name,
            "Bind requires #[repr(C)] so that field offsets are stable",
        ));
    }
    let fields = match &data.fields {
        Fields::Named(fields) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Bind can only be derived for structs with named fields",
            ));
        }
    };

    let mut field_metas = Vec::new();
    for field in fields {
        let field_attrs = MemberAttrs::from_attrs(&field.attrs, true)?;
        if field_attrs.skip {
            continue;
        }

        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = field_attrs
            .name
            .clone()
            .unwrap_or_else(|| ident.to_string());
        let ty = &field.ty;
        let mode = if field_attrs.read_only {
            quote! { ::scriptbind_core::AccessMode::ReadOnly }
        } else {
            quote! { ::scriptbind_core::AccessMode::ReadWrite }
        };

        field_metas.push(quote! {
            .with_field(::scriptbind_core::FieldMeta::new(
                #field_name,
                ::core::mem::offset_of!(#name, #ident),
                <#ty as ::scriptbind_core::Describe>::describe(),
                #mode,
            ))
        });
    }

    let mut removed = Vec::new();
    if attrs.not_local {
        removed.push(quote! { ::scriptbind_core::Capabilities::LOCAL_ONLY });
    }
    if attrs.no_copy || attrs.no_move {
        removed.push(quote! { ::scriptbind_core::Capabilities::COPYABLE });
    }
    if attrs.no_move {
        removed.push(quote! { ::scriptbind_core::Capabilities::MOVABLE });
    }

    let describe = generate_describe(name, script_name, quote! { structure });

    Ok(quote! {
        #describe

        impl ::scriptbind_core::BindStruct for #name {
            fn struct_meta() -> ::scriptbind_core::StructMeta {
                #[allow(unused_mut)]
                let mut meta = ::scriptbind_core::StructMeta::new(
                    #script_name,
                    <#name as ::scriptbind_core::Describe>::describe(),
                )
                #(#field_metas)*;
                #(meta.capabilities.remove(#removed);)*
                meta
            }
        }
    })
}

fn derive_enum(
    input: &DeriveInput,
    data: &DataEnum,
    attrs: &TypeAttrs,
    repr: &Repr,
    script_name: &str,
) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if attrs.not_local || attrs.no_copy || attrs.no_move {
        return Err(syn::Error::new_spanned(
            name,
            "capability attributes only apply to structs",
        ));
    }
    let underlying = match &repr.int {
        Some(int) if int == "i32" || int == "u32" => int,
        Some(int) => {
            return Err(syn::Error::new_spanned(
                int,
                "Bind supports enums with #[repr(i32)] or #[repr(u32)]",
            ));
        }
        None => {
            return Err(syn::Error::new_spanned(
                name,
                "Bind requires #[repr(i32)] or #[repr(u32)] on enums",
            ));
        }
    };

    let mut values = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Bind can only be derived for enums without fields",
            ));
        }
        let variant_attrs = MemberAttrs::from_attrs(&variant.attrs, false)?;
        if variant_attrs.skip {
            continue;
        }

        let ident = &variant.ident;
        let value_name = variant_attrs
            .name
            .clone()
            .unwrap_or_else(|| ident.to_string());
        values.push(quote! {
            .with_value(#value_name, #name::#ident as i64)
        });
    }

    let describe = generate_describe(name, script_name, quote! { enumeration });

    Ok(quote! {
        #describe

        impl ::scriptbind_core::BindEnum for #name {
            fn enum_meta() -> ::scriptbind_core::EnumMeta {
                ::scriptbind_core::EnumMeta::new(
                    #script_name,
                    <#name as ::scriptbind_core::Describe>::describe(),
                    <#underlying as ::scriptbind_core::Describe>::describe(),
                )
                #(#values)*
            }
        }
    })
}
