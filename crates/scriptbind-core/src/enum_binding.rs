//! Enum bindings.
//!
//! An [`EnumBinding`] maps an enum's symbolic names to integer values and back.
//! Values may be sparse and may alias (two names, one integer); when they do,
//! [`EnumBinding::name_of`] answers with the first-declared name.

use rustc_hash::FxHashMap;

use crate::{BindError, BindResult, TypeHash, TypeKind, TypeRef};

/// One named value of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Value name.
    pub name: String,
    /// Integer value.
    pub value: i64,
}

impl EnumValue {
    /// Create a new enum value.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Registry record for an enumeration type.
///
/// Records are plain data: [`with_value`](Self::with_value) never fails, and
/// [`validate`](Self::validate) reports duplicate names, out-of-range values
/// and empty enums when the binding is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumBinding {
    name: String,
    type_hash: TypeHash,
    underlying: TypeRef,
    native: Option<TypeRef>,
    values: Vec<EnumValue>,
    /// Value name -> index of its first declaration.
    by_name: FxHashMap<String, usize>,
    /// Integer -> index of the first-declared value carrying it.
    by_value: FxHashMap<i64, usize>,
}

impl EnumBinding {
    /// Create an empty enum binding.
    ///
    /// Its identity hash is derived from `name`; use [`with_native`](Self::with_native)
    /// when the binding describes a native enum type so that struct fields of
    /// that type resolve to it.
    pub fn new(name: impl Into<String>, underlying: TypeRef) -> Self {
        let name = name.into();
        Self {
            type_hash: TypeHash::from_name(&name),
            name,
            underlying,
            native: None,
            values: Vec::new(),
            by_name: FxHashMap::default(),
            by_value: FxHashMap::default(),
        }
    }

    /// Tie this binding to a native enum descriptor.
    pub fn with_native(mut self, native: TypeRef) -> Self {
        self.set_native(native);
        self
    }

    /// Tie this binding to a native enum descriptor in place.
    ///
    /// The descriptor is checked by [`validate`](Self::validate).
    pub fn set_native(&mut self, native: TypeRef) {
        self.type_hash = native.type_hash();
        self.native = Some(native);
    }

    /// Add a value.
    pub fn with_value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.push(name, value);
        self
    }

    /// Add a value in place.
    pub fn push(&mut self, name: impl Into<String>, value: i64) {
        let name = name.into();
        let index = self.values.len();
        self.by_name.entry(name.clone()).or_insert(index);
        self.by_value.entry(value).or_insert(index);
        self.values.push(EnumValue::new(name, value));
    }

    /// Script-visible name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity hash, shared with the native descriptor when there is one.
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Integer representation.
    pub fn underlying(&self) -> TypeRef {
        self.underlying
    }

    /// Native enum descriptor, if the binding describes one.
    pub fn native(&self) -> Option<TypeRef> {
        self.native
    }

    /// Check that `native` can back this binding: an enum descriptor as wide
    /// as the underlying integer.
    pub fn check_native(&self, native: TypeRef) -> BindResult<()> {
        if native.kind() != TypeKind::Enum {
            return Err(BindError::InvalidLayout {
                type_name: self.name.clone(),
                reason: format!(
                    "native type '{}' is {}, not an enum",
                    native.name(),
                    native.kind()
                ),
            });
        }
        if native.size() != self.underlying.size() || native.align() != self.underlying.align() {
            return Err(BindError::InvalidLayout {
                type_name: self.name.clone(),
                reason: format!(
                    "native type '{}' is {} bytes but underlying type '{}' is {} bytes",
                    native.name(),
                    native.size(),
                    self.underlying.name(),
                    self.underlying.size()
                ),
            });
        }
        Ok(())
    }

    /// Values in declaration order.
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if a value name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Integer value of `name`.
    pub fn value_of(&self, name: &str) -> BindResult<i64> {
        self.by_name
            .get(name)
            .map(|&index| self.values[index].value)
            .ok_or_else(|| BindError::UnknownEnumValue {
                enum_name: self.name.clone(),
                value_name: name.to_string(),
            })
    }

    /// First-declared name carrying `value`.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.by_value
            .get(&value)
            .map(|&index| self.values[index].name.as_str())
    }

    /// Check that `value` is representable in the underlying integer type.
    pub fn check_range(&self, value_name: &str, value: i64) -> BindResult<()> {
        let fits = match self.underlying.kind() {
            TypeKind::Int32 => i32::try_from(value).is_ok(),
            TypeKind::UInt32 => u32::try_from(value).is_ok(),
            _ => false,
        };
        if fits {
            Ok(())
        } else {
            Err(BindError::InvalidLayout {
                type_name: self.name.clone(),
                reason: format!(
                    "value '{}' = {} does not fit in {}",
                    value_name,
                    value,
                    self.underlying.name()
                ),
            })
        }
    }

    /// Check the binding before it is registered in `module`.
    pub fn validate(&self, module: &str) -> BindResult<()> {
        if !self.underlying.kind().is_integer() {
            return Err(BindError::InvalidLayout {
                type_name: self.name.clone(),
                reason: format!(
                    "underlying type '{}' is not an integer",
                    self.underlying.name()
                ),
            });
        }
        if let Some(native) = self.native {
            self.check_native(native)?;
        }
        if self.values.is_empty() {
            return Err(BindError::EmptyEnum {
                module: module.to_string(),
                enum_name: self.name.clone(),
            });
        }
        for (index, value) in self.values.iter().enumerate() {
            if self.by_name.get(&value.name) != Some(&index) {
                return Err(BindError::duplicate_enum_value(module, &self.name, &value.name));
            }
            self.check_range(&value.name, value.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{describe, intern, BindErrorKind, TypeDescriptor};

    fn first_enum() -> EnumBinding {
        EnumBinding::new("FirstEnum", describe::<i32>())
            .with_value("zero", 0)
            .with_value("one", 1)
            .with_value("two", 2)
    }

    #[test]
    fn enum_binding_creation() {
        let binding = first_enum();
        assert_eq!(binding.name(), "FirstEnum");
        assert_eq!(binding.len(), 3);
        assert_eq!(binding.type_hash(), TypeHash::from_name("FirstEnum"));
        assert!(binding.validate("m").is_ok());
    }

    #[test]
    fn value_of_and_name_of() {
        let binding = first_enum();
        assert_eq!(binding.value_of("one"), Ok(1));
        assert_eq!(binding.name_of(1), Some("one"));
        assert_eq!(binding.name_of(99), None);
    }

    #[test]
    fn value_of_unknown_name() {
        let err = first_enum().value_of("three").unwrap_err();
        assert_eq!(err.kind(), BindErrorKind::UnknownEnumValue);
        assert_eq!(
            err.to_string(),
            "unknown enum value name 'three' in enum 'FirstEnum'"
        );
    }

    #[test]
    fn aliased_values_resolve_to_first_declared() {
        let binding = EnumBinding::new("Level", describe::<i32>())
            .with_value("Warn", 2)
            .with_value("Warning", 2)
            .with_value("Error", 3);
        assert!(binding.validate("m").is_ok());
        assert_eq!(binding.name_of(2), Some("Warn"));
        assert_eq!(binding.value_of("Warning"), Ok(2));
    }

    #[test]
    fn round_trip_shares_value() {
        let binding = EnumBinding::new("Sparse", describe::<i32>())
            .with_value("A", -5)
            .with_value("B", 100)
            .with_value("C", -5);
        for value in binding.values() {
            let integer = binding.value_of(&value.name).unwrap();
            let canonical = binding.name_of(integer).unwrap();
            assert_eq!(binding.value_of(canonical), Ok(integer));
        }
    }

    #[test]
    fn duplicate_name_fails_validation() {
        let binding = first_enum().with_value("one", 7);
        let err = binding.validate("m").unwrap_err();
        assert_eq!(err, BindError::duplicate_enum_value("m", "FirstEnum", "one"));
        assert_eq!(binding.value_of("one"), Ok(1));
    }

    #[test]
    fn empty_enum_fails_validation() {
        let err = EnumBinding::new("Empty", describe::<i32>())
            .validate("m")
            .unwrap_err();
        assert_eq!(err.kind(), BindErrorKind::EmptyEnum);
    }

    #[test]
    fn out_of_range_value_fails_validation() {
        let binding = EnumBinding::new("Flags", describe::<u32>()).with_value("Neg", -1);
        assert_eq!(binding.validate("m").unwrap_err().kind(), BindErrorKind::InvalidLayout);

        let binding = EnumBinding::new("Wide", describe::<i32>()).with_value("Big", 1 << 40);
        assert!(binding.validate("m").is_err());
    }

    #[test]
    fn non_integer_underlying_fails_validation() {
        let binding = EnumBinding::new("Floaty", describe::<f32>()).with_value("A", 0);
        assert!(binding.validate("m").unwrap_err().to_string().contains("not an integer"));
    }

    #[repr(i32)]
    #[derive(Clone, Copy)]
    #[allow(dead_code)]
    enum NativeLevel {
        Low,
        High,
    }

    #[repr(u8)]
    #[derive(Clone, Copy)]
    #[allow(dead_code)]
    enum NarrowLevel {
        Low,
    }

    fn native_level() -> TypeRef {
        intern::<NativeLevel>(|| TypeDescriptor::enumeration::<NativeLevel>("NativeLevel", true))
    }

    #[test]
    fn with_native_adopts_descriptor() {
        let binding = EnumBinding::new("Renamed", describe::<i32>())
            .with_native(native_level())
            .with_value("Low", 0);
        assert_eq!(binding.type_hash(), native_level().type_hash());
        assert_eq!(binding.native(), Some(native_level()));
        assert!(binding.validate("m").is_ok());
    }

    #[test]
    fn native_must_be_an_enum() {
        let binding = EnumBinding::new("Renamed", describe::<i32>())
            .with_native(describe::<u32>())
            .with_value("Low", 0);
        let err = binding.validate("m").unwrap_err();
        assert_eq!(err.kind(), BindErrorKind::InvalidLayout);
        assert!(err.to_string().contains("not an enum"));
    }

    #[test]
    fn native_must_match_underlying_width() {
        let narrow = intern::<NarrowLevel>(|| {
            TypeDescriptor::enumeration::<NarrowLevel>("NarrowLevel", true)
        });
        let binding = EnumBinding::new("Narrow", describe::<i32>())
            .with_native(narrow)
            .with_value("Low", 0);
        let err = binding.validate("m").unwrap_err();
        assert_eq!(err.kind(), BindErrorKind::InvalidLayout);
        assert!(err.to_string().contains("1 bytes"));
    }
}
