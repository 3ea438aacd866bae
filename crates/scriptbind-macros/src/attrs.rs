//! Attribute parsing for `#[derive(Bind)]`.

use proc_macro2::TokenStream as TokenStream2;
use syn::{Attribute, Ident, LitStr};

/// Parsed `#[bind(...)]` attributes on a struct or enum.
#[derive(Debug, Default)]
pub struct TypeAttrs {
    /// Script-visible name (default: Rust type name)
    pub name: Option<String>,
    /// Drop the local-only capability
    pub not_local: bool,
    /// Drop the copyable capability
    pub no_copy: bool,
    /// Drop the movable (and copyable) capability
    pub no_move: bool,
}

/// Parsed `#[bind(...)]` attributes on a field or enum variant.
#[derive(Debug, Default)]
pub struct MemberAttrs {
    /// Script-visible name (default: Rust field or variant name)
    pub name: Option<String>,
    /// Leave the member out of the binding
    pub skip: bool,
    /// Expose the field read-only
    pub read_only: bool,
}

/// The parts of `#[repr(...)]` the derive cares about.
#[derive(Debug, Default)]
pub struct Repr {
    /// `repr(C)`
    pub c: bool,
    /// `repr(i32)` / `repr(u32)` and friends
    pub int: Option<Ident>,
}

fn unknown(meta: &syn::meta::ParseNestedMeta<'_>, what: &str) -> syn::Error {
    meta.error(format!(
        "unknown bind {} attribute: {}",
        what,
        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
    ))
}

impl TypeAttrs {
    /// Parse attributes from a list of `#[bind(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("bind") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("not_local") {
                    result.not_local = true;
                } else if meta.path.is_ident("no_copy") {
                    result.no_copy = true;
                } else if meta.path.is_ident("no_move") {
                    result.no_move = true;
                } else {
                    return Err(unknown(&meta, "type"));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

impl MemberAttrs {
    /// Parse attributes from a list of `#[bind(...)]` attributes.
    ///
    /// `read_only` is only accepted on struct fields.
    pub fn from_attrs(attrs: &[Attribute], allow_read_only: bool) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("bind") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if allow_read_only && meta.path.is_ident("read_only") {
                    result.read_only = true;
                } else {
                    return Err(unknown(&meta, if allow_read_only { "field" } else { "variant" }));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

impl Repr {
    /// Collect every `#[repr(...)]` on the item.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("repr") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("C") {
                    result.c = true;
                } else if let Some(ident) = meta.path.get_ident() {
                    // align(N), packed(N)
                    if meta.input.peek(syn::token::Paren) {
                        let content;
                        syn::parenthesized!(content in meta.input);
                        content.parse::<TokenStream2>()?;
                    } else if ident != "packed" && ident != "transparent" {
                        result.int = Some(ident.clone());
                    }
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}
