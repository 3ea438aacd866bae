//! Binding configuration hooks.
//!
//! A [`BindingConfig`] sees every derived struct, field and enum, and every
//! opaque type, before it is registered and may rename it, adjust it, or leave
//! it out entirely. Hooks run
//! in declaration order: the struct first, then each of its fields.
//!
//! # Example
//!
//! ```
//! use scriptbind_core::{AccessMode, FieldMeta, StructMeta};
//! use scriptbind_registry::BindingConfig;
//!
//! struct ScriptNames;
//!
//! impl BindingConfig for ScriptNames {
//!     fn configure_struct(&self, meta: &mut StructMeta) {
//!         meta.name = format!("Native{}", meta.name);
//!     }
//!
//!     fn configure_field(&self, _struct_name: &str, field: &mut FieldMeta) {
//!         if field.name.starts_with('_') {
//!             field.ignore();
//!         } else if field.name == "id" {
//!             field.mode = AccessMode::ReadOnly;
//!         }
//!     }
//! }
//! ```

use scriptbind_core::{EnumMeta, FieldMeta, OpaqueMeta, StructMeta};

/// Hooks consulted by [`ModuleLibrary::bind_struct_with`],
/// [`ModuleLibrary::bind_enum_with`] and [`ModuleLibrary::register_opaque_with`].
/// Every hook defaults to a no-op.
///
/// [`ModuleLibrary::bind_struct_with`]: crate::ModuleLibrary::bind_struct_with
/// [`ModuleLibrary::bind_enum_with`]: crate::ModuleLibrary::bind_enum_with
/// [`ModuleLibrary::register_opaque_with`]: crate::ModuleLibrary::register_opaque_with
pub trait BindingConfig {
    /// Adjust or ignore a struct.
    fn configure_struct(&self, _meta: &mut StructMeta) {}

    /// Adjust or ignore one field. `struct_name` is the struct's script name
    /// after [`configure_struct`](Self::configure_struct) ran.
    fn configure_field(&self, _struct_name: &str, _field: &mut FieldMeta) {}

    /// Adjust or ignore an enum.
    fn configure_enum(&self, _meta: &mut EnumMeta) {}

    /// Rename or ignore an opaque type.
    fn configure_opaque(&self, _meta: &mut OpaqueMeta) {}
}

/// Binds everything as derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultConfig;

impl BindingConfig for DefaultConfig {}

impl<C: BindingConfig + ?Sized> BindingConfig for &C {
    fn configure_struct(&self, meta: &mut StructMeta) {
        (**self).configure_struct(meta)
    }

    fn configure_field(&self, struct_name: &str, field: &mut FieldMeta) {
        (**self).configure_field(struct_name, field)
    }

    fn configure_enum(&self, meta: &mut EnumMeta) {
        (**self).configure_enum(meta)
    }

    fn configure_opaque(&self, meta: &mut OpaqueMeta) {
        (**self).configure_opaque(meta)
    }
}
