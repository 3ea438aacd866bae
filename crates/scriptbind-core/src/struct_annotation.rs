//! Struct annotations.
//!
//! A [`StructAnnotation`] is the registry record for one bound struct: its
//! script-visible name, native descriptor, fields in declaration order and
//! capability flags. Field order is significant; it is the order scripts see
//! when iterating fields and the argument order of the default constructor.

use rustc_hash::FxHashSet;

use crate::{BindError, BindResult, Capabilities, FieldBinding, TypeHash, TypeKind, TypeRef};

/// Registry record for a bound struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructAnnotation {
    name: String,
    native: TypeRef,
    fields: Vec<FieldBinding>,
    capabilities: Capabilities,
}

impl StructAnnotation {
    /// Create an annotation with no fields and the default capabilities for `native`.
    pub fn new(name: impl Into<String>, native: TypeRef) -> Self {
        Self {
            name: name.into(),
            native,
            fields: Vec::new(),
            capabilities: Capabilities::defaults_for(native),
        }
    }

    // === Builder Methods ===

    /// Append a field.
    pub fn with_field(mut self, field: FieldBinding) -> Self {
        self.fields.push(field);
        self
    }

    /// Replace the capability flags.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Append a field in place.
    pub fn push_field(&mut self, field: FieldBinding) {
        self.fields.push(field);
    }

    /// Replace the capability flags in place.
    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    // === Query Methods ===

    /// Script-visible name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Native layout descriptor.
    pub fn native(&self) -> TypeRef {
        self.native
    }

    /// Identity hash of the native type.
    pub fn type_hash(&self) -> TypeHash {
        self.native.type_hash()
    }

    /// Native size in bytes.
    pub fn size(&self) -> usize {
        self.native.size()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_local_only(&self) -> bool {
        self.capabilities.is_local_only()
    }

    pub fn is_copyable(&self) -> bool {
        self.capabilities.is_copyable()
    }

    pub fn is_movable(&self) -> bool {
        self.capabilities.is_movable()
    }

    /// Check the native descriptor can back a struct annotation.
    pub fn check_native(module: &str, name: &str, native: TypeRef) -> BindResult<()> {
        if native.kind() != TypeKind::Struct {
            return Err(BindError::InvalidLayout {
                type_name: name.to_string(),
                reason: format!(
                    "module '{}' expects a struct descriptor, found {} '{}'",
                    module,
                    native.kind(),
                    native.name()
                ),
            });
        }
        if native.needs_drop() {
            return Err(BindError::NotPlainData {
                type_name: native.name().to_string(),
            });
        }
        Ok(())
    }

    /// Check everything that does not depend on other registered types:
    /// native kind, field name uniqueness, field extents and capabilities.
    pub fn validate(&self, module: &str) -> BindResult<()> {
        Self::check_native(module, &self.name, self.native)?;
        let mut seen = FxHashSet::default();
        for field in &self.fields {
            if !seen.insert(field.name()) {
                return Err(BindError::duplicate_field(module, &self.name, field.name()));
            }
            field.check_fits(module, &self.name, self.native)?;
        }
        self.capabilities.check(module, &self.name, self.native)
    }
}
