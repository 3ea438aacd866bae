//! Field bindings.

use crate::{BindError, BindResult, TypeRef};

/// Whether scripts may write a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessMode {
    ReadOnly,
    #[default]
    ReadWrite,
}

/// One field of a bound struct: name, byte offset, type and access mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    name: String,
    offset: usize,
    ty: TypeRef,
    mode: AccessMode,
}

impl FieldBinding {
    /// Create a field binding.
    ///
    /// `offset` must come from `core::mem::offset_of!` on the native struct.
    pub fn new(name: impl Into<String>, offset: usize, ty: TypeRef, mode: AccessMode) -> Self {
        Self {
            name: name.into(),
            offset,
            ty,
            mode,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset from the start of the owning struct.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn is_writable(&self) -> bool {
        self.mode == AccessMode::ReadWrite
    }

    /// One past the last byte this field occupies.
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.ty.size())
    }

    /// Check that the field lies within `owner_native`.
    pub fn check_fits(&self, module: &str, owner: &str, owner_native: TypeRef) -> BindResult<()> {
        match self.end() {
            Some(end) if end <= owner_native.size() => Ok(()),
            _ => Err(BindError::LayoutOverflow {
                module: module.to_string(),
                owner: owner.to_string(),
                field: self.name.clone(),
                offset: self.offset,
                size: self.ty.size(),
                owner_size: owner_native.size(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe;

    #[test]
    fn field_accessors() {
        let field = FieldBinding::new("int_field", 4, describe::<i32>(), AccessMode::ReadOnly);
        assert_eq!(field.name(), "int_field");
        assert_eq!(field.offset(), 4);
        assert_eq!(field.ty(), describe::<i32>());
        assert!(!field.is_writable());
        assert_eq!(field.end(), Some(8));
    }

    #[test]
    fn field_fitting_exactly_is_accepted() {
        let owner = describe::<[i32; 3]>();
        let field = FieldBinding::new("last", 8, describe::<i32>(), AccessMode::ReadWrite);
        assert!(field.check_fits("m", "Triple", owner).is_ok());
    }

    #[test]
    fn field_past_end_is_rejected() {
        let owner = describe::<[i32; 3]>();
        let field = FieldBinding::new("beyond", 9, describe::<i32>(), AccessMode::ReadWrite);
        let err = field.check_fits("m", "Triple", owner).unwrap_err();
        assert_eq!(
            err,
            BindError::LayoutOverflow {
                module: "m".to_string(),
                owner: "Triple".to_string(),
                field: "beyond".to_string(),
                offset: 9,
                size: 4,
                owner_size: 12,
            }
        );
    }

    #[test]
    fn offset_overflow_is_rejected() {
        let field = FieldBinding::new("huge", usize::MAX, describe::<i32>(), AccessMode::ReadWrite);
        assert_eq!(field.end(), None);
        let err = field.check_fits("m", "S", describe::<i32>()).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "field 'huge' of struct 'S' in module 'm' spans 4 bytes at offset {} but the struct is 4 bytes",
                usize::MAX
            )
        );
    }

    #[test]
    fn default_mode_is_read_write() {
        assert_eq!(AccessMode::default(), AccessMode::ReadWrite);
    }
}
