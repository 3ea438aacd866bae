//! Binding metadata produced by `#[derive(Bind)]`.
//!
//! Metadata is a mutable draft of a binding. Binding configuration hooks may
//! rename items, adjust access modes and capabilities or ignore items before
//! the registry validates and freezes them into [`StructAnnotation`]s and
//! [`EnumBinding`]s.
//!
//! [`StructAnnotation`]: crate::StructAnnotation
//! [`EnumBinding`]: crate::EnumBinding

use crate::{AccessMode, Capabilities, Describe, TypeRef};

/// Draft of one struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    /// Script-visible field name.
    pub name: String,
    /// Byte offset from `core::mem::offset_of!`.
    pub offset: usize,
    /// Field type.
    pub ty: TypeRef,
    /// Script access mode.
    pub mode: AccessMode,
    ignored: bool,
}

impl FieldMeta {
    pub fn new(name: impl Into<String>, offset: usize, ty: TypeRef, mode: AccessMode) -> Self {
        Self {
            name: name.into(),
            offset,
            ty,
            mode,
            ignored: false,
        }
    }

    /// Leave this field out of the binding.
    pub fn ignore(&mut self) {
        self.ignored = true;
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// Draft of a struct binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMeta {
    /// Script-visible struct name.
    pub name: String,
    /// Native layout descriptor.
    pub native: TypeRef,
    /// Fields in declaration order.
    pub fields: Vec<FieldMeta>,
    /// Value-semantics flags.
    pub capabilities: Capabilities,
    ignored: bool,
}

impl StructMeta {
    pub fn new(name: impl Into<String>, native: TypeRef) -> Self {
        Self {
            name: name.into(),
            native,
            fields: Vec::new(),
            capabilities: Capabilities::defaults_for(native),
            ignored: false,
        }
    }

    pub fn with_field(mut self, field: FieldMeta) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Find a field draft by name.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldMeta> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Leave this struct out of the module.
    pub fn ignore(&mut self) {
        self.ignored = true;
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// Draft of an enum binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMeta {
    /// Script-visible enum name.
    pub name: String,
    /// Native layout descriptor of the enum itself.
    pub native: TypeRef,
    /// Integer representation (`#[repr(..)]`).
    pub underlying: TypeRef,
    /// `(name, value)` pairs in declaration order.
    pub values: Vec<(String, i64)>,
    ignored: bool,
}

impl EnumMeta {
    pub fn new(name: impl Into<String>, native: TypeRef, underlying: TypeRef) -> Self {
        Self {
            name: name.into(),
            native,
            underlying,
            values: Vec::new(),
            ignored: false,
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.values.push((name.into(), value));
        self
    }

    /// Leave this enum out of the module.
    pub fn ignore(&mut self) {
        self.ignored = true;
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// Draft of an opaque type registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueMeta {
    /// Script-visible type name.
    pub name: String,
    ignored: bool,
}

impl OpaqueMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ignored: false,
        }
    }

    /// Leave this type out of the module.
    pub fn ignore(&mut self) {
        self.ignored = true;
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// A `#[repr(C)]` struct that can describe its fields.
pub trait BindStruct: Describe {
    fn struct_meta() -> StructMeta;
}

/// A field-less enum that can list its values.
pub trait BindEnum: Describe {
    fn enum_meta() -> EnumMeta;
}
