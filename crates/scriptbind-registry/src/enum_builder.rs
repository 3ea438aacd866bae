//! EnumBuilder for registering enums with explicit or auto-incremented values.
//!
//! # Example
//!
//! ```ignore
//! let mut direction = library.begin_enum(module, "Direction", describe::<i32>())?;
//! direction
//!     .auto_value("North")?
//!     .auto_value("East")?
//!     .value("South", 10)?
//!     .auto_value("West")?; // 11
//! direction.finish()?;
//! ```

use scriptbind_core::{BindError, BindResult, EnumBinding, TypeRef};
use tracing::trace;

use crate::library::ModuleLibrary;
use crate::module::ModuleId;

/// Builder for one enum binding.
///
/// Created by [`ModuleLibrary::begin_enum`].
#[derive(Debug)]
pub struct EnumBuilder<'m> {
    library: &'m mut ModuleLibrary,
    module: ModuleId,
    binding: EnumBinding,
    /// Next auto-increment value.
    next_value: i64,
}

impl<'m> EnumBuilder<'m> {
    pub(crate) fn new(
        library: &'m mut ModuleLibrary,
        module: ModuleId,
        binding: EnumBinding,
    ) -> Self {
        Self {
            library,
            module,
            binding,
            next_value: 0,
        }
    }

    /// Script-visible name of the enum being built.
    pub fn name(&self) -> &str {
        self.binding.name()
    }

    /// Tie the binding to the descriptor of a native enum, so that struct
    /// fields of that type resolve to it.
    pub fn native(&mut self, native: TypeRef) -> BindResult<&mut Self> {
        self.binding.check_native(native)?;
        self.binding.set_native(native);
        Ok(self)
    }

    /// Add a value.
    ///
    /// Names must be unique; integers may repeat. The next auto-increment
    /// value becomes `value + 1`.
    pub fn value(&mut self, name: &str, value: i64) -> BindResult<&mut Self> {
        if self.binding.contains(name) {
            let module = self.library.module(self.module)?.name();
            return Err(BindError::duplicate_enum_value(module, self.binding.name(), name));
        }
        self.binding.check_range(name, value)?;

        trace!(owner = %self.binding.name(), name, value, "add enum value");
        self.binding.push(name, value);
        self.next_value = value + 1;
        Ok(self)
    }

    /// Add a value one greater than the previous one (0 for the first).
    pub fn auto_value(&mut self, name: &str) -> BindResult<&mut Self> {
        self.value(name, self.next_value)
    }

    /// Publish the binding into its module.
    ///
    /// Fails with `EmptyEnum` if no value was added.
    pub fn finish(self) -> BindResult<&'m EnumBinding> {
        let EnumBuilder {
            library,
            module,
            binding,
            ..
        } = self;
        library.register_enum(module, binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scriptbind_core::{describe, intern, BindErrorKind, TypeDescriptor, TypeHash};

    #[repr(u32)]
    #[derive(Clone, Copy)]
    #[allow(dead_code)]
    enum SecondEnum {
        Zero,
        One,
        Two,
    }

    fn library_with_module() -> (ModuleLibrary, ModuleId) {
        let mut library = ModuleLibrary::new();
        let m = library.create("generatedBindings").unwrap();
        (library, m)
    }

    #[test]
    fn explicit_values() {
        let (mut library, m) = library_with_module();
        let mut builder = library.begin_enum(m, "FirstEnum", describe::<i32>()).unwrap();
        builder
            .value("zero", 0)
            .unwrap()
            .value("one", 1)
            .unwrap()
            .value("two", 2)
            .unwrap();
        let binding = builder.finish().unwrap();
        assert_eq!(binding.len(), 3);
        assert_eq!(binding.value_of("one"), Ok(1));
        assert_eq!(binding.name_of(1), Some("one"));
    }

    #[test]
    fn auto_values_follow_last_explicit() {
        let (mut library, m) = library_with_module();
        let mut builder = library.begin_enum(m, "Direction", describe::<i32>()).unwrap();
        builder
            .auto_value("North")
            .unwrap()
            .auto_value("East")
            .unwrap()
            .value("South", 10)
            .unwrap()
            .auto_value("West")
            .unwrap();
        let binding = builder.finish().unwrap();
        let values: Vec<_> = binding.values().iter().map(|v| (v.name.as_str(), v.value)).collect();
        assert_eq!(values, vec![("North", 0), ("East", 1), ("South", 10), ("West", 11)]);
    }

    #[test]
    fn duplicate_value_name_is_rejected() {
        let (mut library, m) = library_with_module();
        let mut builder = library.begin_enum(m, "FirstEnum", describe::<i32>()).unwrap();
        builder.value("one", 1).unwrap();
        let err = builder.value("one", 2).unwrap_err();
        assert_eq!(
            err,
            BindError::duplicate_enum_value("generatedBindings", "FirstEnum", "one")
        );
        let binding = builder.finish().unwrap();
        assert_eq!(binding.value_of("one"), Ok(1));
    }

    #[test]
    fn aliases_are_allowed() {
        let (mut library, m) = library_with_module();
        let mut builder = library.begin_enum(m, "Level", describe::<i32>()).unwrap();
        builder.value("Warn", 2).unwrap().value("Warning", 2).unwrap();
        let binding = builder.finish().unwrap();
        assert_eq!(binding.name_of(2), Some("Warn"));
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let (mut library, m) = library_with_module();
        let mut builder = library.begin_enum(m, "Flags", describe::<u32>()).unwrap();
        assert_eq!(
            builder.value("Neg", -1).unwrap_err().kind(),
            BindErrorKind::InvalidLayout
        );
        builder.value("Max", i64::from(u32::MAX)).unwrap();
        assert!(builder.auto_value("Overflow").is_err());
    }

    #[test]
    fn empty_enum_is_rejected() {
        let (mut library, m) = library_with_module();
        let builder = library.begin_enum(m, "Empty", describe::<i32>()).unwrap();
        assert_eq!(builder.finish().unwrap_err().kind(), BindErrorKind::EmptyEnum);
        assert!(library.module(m).unwrap().is_empty());
    }

    #[test]
    fn native_descriptor_sets_identity() {
        let (mut library, m) = library_with_module();
        let native =
            intern::<SecondEnum>(|| TypeDescriptor::enumeration::<SecondEnum>("SecondEnum", true));
        let mut builder = library.begin_enum(m, "Renamed", describe::<u32>()).unwrap();
        builder.native(native).unwrap().auto_value("zero").unwrap();
        assert!(builder.native(describe::<u32>()).is_err());
        let binding = builder.finish().unwrap();
        assert_eq!(binding.type_hash(), native.type_hash());
        assert_ne!(binding.type_hash(), TypeHash::from_name("Renamed"));
        assert_eq!(binding.underlying(), describe::<u32>());
    }
}
