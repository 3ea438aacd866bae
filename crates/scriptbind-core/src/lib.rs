//! Core types for ScriptBind.
//!
//! ScriptBind describes native Rust structs and enums to an embedded script
//! runtime so that scripts can construct, read and mutate them with the same
//! memory layout as the host. This crate holds the leaf records:
//!
//! - [`TypeDescriptor`] / [`TypeRef`] - interned size, alignment and kind of a native type
//! - [`FieldBinding`] - name, offset, type and access mode of one struct field
//! - [`EnumBinding`] - symbolic names of an enum mapped to integers and back
//! - [`StructAnnotation`] - fields plus [`Capabilities`] of one struct
//! - [`StructMeta`] / [`EnumMeta`] / [`OpaqueMeta`] - editable drafts adjusted by binding configuration
//! - [`BindError`] - the registration error taxonomy
//!
//! Registries, builders and the linker live in `scriptbind-registry`.

mod capabilities;
mod descriptor;
mod enum_binding;
mod error;
mod field;
mod meta;
mod struct_annotation;
mod type_hash;

#[doc(hidden)]
#[path = "private.rs"]
pub mod __private;

pub use capabilities::Capabilities;
pub use descriptor::{
    describe, intern, Describe, NativeTraits, TypeDescriptor, TypeKind, TypeRef, TypeShape,
};
pub use enum_binding::{EnumBinding, EnumValue};
pub use error::{BindError, BindErrorKind, BindResult, NameScope};
pub use field::{AccessMode, FieldBinding};
pub use meta::{BindEnum, BindStruct, EnumMeta, FieldMeta, OpaqueMeta, StructMeta};
pub use struct_annotation::StructAnnotation;
pub use type_hash::{hash_constants, TypeHash};
