//! StructBuilder for describing native structs field by field.
//!
//! Every method checks its input before touching the draft, so a failed call
//! leaves the builder exactly as it was and the caller may carry on or drop
//! it. Nothing reaches the module until [`StructBuilder::finish`].
//!
//! # Example
//!
//! ```ignore
//! let mut header = library.begin_struct(module, "Header", describe::<Header>())?;
//! header
//!     .field("magic", offset_of!(Header, magic), describe::<u32>(), AccessMode::ReadOnly)?
//!     .bit_field("version", offset_of!(Header, bits), describe::<u32>(), 0, 24, AccessMode::ReadWrite)?
//!     .bit_field("flags", offset_of!(Header, bits), describe::<u32>(), 24, 8, AccessMode::ReadWrite)?
//!     .set_capabilities(true, true, true)?;
//! header.finish()?;
//! ```

use scriptbind_core::{
    AccessMode, BindError, BindResult, Capabilities, FieldBinding, StructAnnotation, TypeRef,
};
use tracing::trace;

use crate::library::ModuleLibrary;
use crate::module::ModuleId;

/// Builder for one struct annotation.
///
/// Created by [`ModuleLibrary::begin_struct`]. Holds the library mutably
/// borrowed, so no other registration can interleave.
#[derive(Debug)]
pub struct StructBuilder<'m> {
    library: &'m mut ModuleLibrary,
    module: ModuleId,
    annotation: StructAnnotation,
}

impl<'m> StructBuilder<'m> {
    pub(crate) fn new(
        library: &'m mut ModuleLibrary,
        module: ModuleId,
        annotation: StructAnnotation,
    ) -> Self {
        Self {
            library,
            module,
            annotation,
        }
    }

    /// Script-visible name of the struct being built.
    pub fn name(&self) -> &str {
        self.annotation.name()
    }

    /// Fields added so far.
    pub fn fields(&self) -> &[FieldBinding] {
        self.annotation.fields()
    }

    fn module_name(&self) -> BindResult<&str> {
        Ok(self.library.module(self.module)?.name())
    }

    /// Add a field.
    ///
    /// `offset` must come from `core::mem::offset_of!` on the native struct.
    /// Fails if the name is taken, if the field does not fit in the struct,
    /// or if `ty` is not bound in the module or its dependencies.
    pub fn field(
        &mut self,
        name: &str,
        offset: usize,
        ty: TypeRef,
        mode: AccessMode,
    ) -> BindResult<&mut Self> {
        let module = self.module_name()?;
        if self.annotation.field(name).is_some() {
            return Err(BindError::duplicate_field(module, self.annotation.name(), name));
        }
        let field = FieldBinding::new(name, offset, ty, mode);
        field.check_fits(module, self.annotation.name(), self.annotation.native())?;
        self.library
            .check_bound(self.module, self.annotation.name(), name, ty)?;

        trace!(
            owner = %self.annotation.name(),
            field = name,
            offset,
            ty = %ty.name(),
            "add field"
        );
        self.annotation.push_field(field);
        Ok(self)
    }

    /// Add a `width`-bit field at bit `shift` of the integer stored at `offset`.
    pub fn bit_field(
        &mut self,
        name: &str,
        offset: usize,
        storage: TypeRef,
        shift: u32,
        width: u32,
        mode: AccessMode,
    ) -> BindResult<&mut Self> {
        let ty = TypeRef::bit_field(storage, shift, width)?;
        self.field(name, offset, ty, mode)
    }

    /// Declare how the runtime may pass instances by value.
    pub fn set_capabilities(
        &mut self,
        is_local_only: bool,
        is_copyable: bool,
        is_movable: bool,
    ) -> BindResult<&mut Self> {
        self.capabilities(Capabilities::new(is_local_only, is_copyable, is_movable))
    }

    /// Replace the capability flags.
    pub fn capabilities(&mut self, capabilities: Capabilities) -> BindResult<&mut Self> {
        let module = self.module_name()?;
        capabilities.check(module, self.annotation.name(), self.annotation.native())?;
        self.annotation.set_capabilities(capabilities);
        Ok(self)
    }

    /// Publish the annotation into its module.
    pub fn finish(self) -> BindResult<&'m StructAnnotation> {
        let StructBuilder {
            library,
            module,
            annotation,
        } = self;
        library.register_struct(module, annotation)
    }
}
