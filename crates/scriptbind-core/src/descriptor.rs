//! Type descriptors for native types.
//!
//! A [`TypeDescriptor`] records the shape of one native type: its script-visible
//! name, byte size, byte alignment and semantic [`TypeKind`]. Size and alignment
//! are never written by hand; they come from `std::mem::size_of` /
//! `std::mem::align_of` on the native type itself, so a descriptor cannot drift
//! from the Rust definition it describes.
//!
//! Descriptors are interned for the lifetime of the process. Every call to
//! [`describe::<T>()`](describe) returns the same [`TypeRef`], and two `TypeRef`s
//! compare equal only when they point at the same interned descriptor.
//!
//! # Example
//!
//! ```
//! use scriptbind_core::{describe, TypeKind};
//!
//! let int = describe::<i32>();
//! assert_eq!(int.name(), "int");
//! assert_eq!(int.size(), 4);
//! assert_eq!(int.kind(), TypeKind::Int32);
//! assert_eq!(int, describe::<i32>());
//!
//! let ints = describe::<[i32; 10]>();
//! assert_eq!(ints.size(), 40);
//! assert_eq!(ints.kind(), TypeKind::Array);
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use bitflags::bitflags;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{BindError, BindResult, TypeHash};

/// Semantic kind of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `bool`
    Bool,
    /// `i32`, exposed to scripts as `int`.
    Int32,
    /// `u32`, exposed to scripts as `uint`. Also the storage unit of bit fields.
    UInt32,
    /// `f32`, exposed to scripts as `float`.
    Float32,
    /// A field-less enum with a primitive integer representation.
    Enum,
    /// A `#[repr(C)]` aggregate.
    Struct,
    /// A fixed-length array of another described type.
    Array,
    /// A run of bits inside an integer storage unit.
    BitField,
    /// A handle-like type whose contents are not exposed (size and alignment only).
    Opaque,
}

impl TypeKind {
    /// Returns a human-readable name for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Int32 => "int32",
            TypeKind::UInt32 => "uint32",
            TypeKind::Float32 => "float32",
            TypeKind::Enum => "enum",
            TypeKind::Struct => "struct",
            TypeKind::Array => "array",
            TypeKind::BitField => "bit field",
            TypeKind::Opaque => "opaque",
        }
    }

    /// Built-in scalar kinds that need no registration to be used as a field type.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            TypeKind::Bool | TypeKind::Int32 | TypeKind::UInt32 | TypeKind::Float32
        )
    }

    /// Kinds usable as an enum's underlying type or a bit field's storage.
    pub fn is_integer(self) -> bool {
        matches!(self, TypeKind::Int32 | TypeKind::UInt32)
    }

    /// Kinds that must be registered in a module before a field may refer to them.
    pub fn requires_binding(self) -> bool {
        matches!(self, TypeKind::Enum | TypeKind::Struct | TypeKind::Opaque)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Facts about a native type that the compiler knows and binding authors
    /// could otherwise misreport.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NativeTraits: u8 {
        /// The type implements `Copy`.
        const COPY = 1 << 0;
        /// Dropping a value runs code (`std::mem::needs_drop`).
        const NEEDS_DROP = 1 << 1;
    }
}

impl NativeTraits {
    /// Collect the traits of `T`.
    ///
    /// `is_copy` must come from the compiler (a `T: Copy` bound or the autoref
    /// check in derived code); drop glue is queried directly.
    pub fn of<T: 'static>(is_copy: bool) -> Self {
        let mut traits = NativeTraits::empty();
        if is_copy {
            traits |= NativeTraits::COPY;
        }
        if std::mem::needs_drop::<T>() {
            traits |= NativeTraits::NEEDS_DROP;
        }
        traits
    }

    /// Plain data: bitwise copyable with no drop glue.
    pub fn is_plain_data(self) -> bool {
        self.contains(NativeTraits::COPY) && !self.contains(NativeTraits::NEEDS_DROP)
    }
}

/// Structural detail for composite descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// No component types.
    Scalar,
    /// `len` consecutive elements.
    Array { element: TypeRef, len: usize },
    /// `width` bits starting at bit `shift` of `storage`.
    BitField { storage: TypeRef, shift: u32, width: u32 },
}

/// Immutable description of one native type's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    size: usize,
    align: usize,
    kind: TypeKind,
    type_hash: TypeHash,
    traits: NativeTraits,
    shape: TypeShape,
}

impl TypeDescriptor {
    fn scalar<T: 'static>(name: &str, kind: TypeKind, is_copy: bool) -> Self {
        Self {
            name: name.to_string(),
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
            kind,
            type_hash: TypeHash::from_name(name),
            traits: NativeTraits::of::<T>(is_copy),
            shape: TypeShape::Scalar,
        }
    }

    /// Describe a `#[repr(C)]` struct. Used by `#[derive(Bind)]`.
    pub fn structure<T: 'static>(name: &str, is_copy: bool) -> Self {
        Self::scalar::<T>(name, TypeKind::Struct, is_copy)
    }

    /// Describe a field-less enum with a primitive representation. Used by `#[derive(Bind)]`.
    pub fn enumeration<T: 'static>(name: &str, is_copy: bool) -> Self {
        Self::scalar::<T>(name, TypeKind::Enum, is_copy)
    }

    /// Script-visible name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes, as laid out by the compiler.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alignment in bytes, as laid out by the compiler.
    pub fn align(&self) -> usize {
        self.align
    }

    /// Semantic kind.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Deterministic identity hash.
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Compiler-derived traits.
    pub fn traits(&self) -> NativeTraits {
        self.traits
    }

    /// Component structure for arrays and bit fields.
    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    /// Check if the native type implements `Copy`.
    pub fn is_copy(&self) -> bool {
        self.traits.contains(NativeTraits::COPY)
    }

    /// Check if the native type has drop glue.
    pub fn needs_drop(&self) -> bool {
        self.traits.contains(NativeTraits::NEEDS_DROP)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, size {}, align {})",
            self.name, self.kind, self.size, self.align
        )
    }
}

/// Handle to an interned [`TypeDescriptor`].
///
/// Equality is identity: two handles are equal when they refer to the same
/// interned descriptor.
#[derive(Clone, Copy)]
pub struct TypeRef(&'static TypeDescriptor);

impl TypeRef {
    /// Borrow the interned descriptor for the rest of the process.
    pub fn get(self) -> &'static TypeDescriptor {
        self.0
    }

    /// The innermost element type, looking through arrays.
    pub fn leaf(self) -> TypeRef {
        match self.0.shape {
            TypeShape::Array { element, .. } => element.leaf(),
            _ => self,
        }
    }

    /// Build (or fetch) the descriptor of a `len`-element array of `element`.
    ///
    /// Prefer [`describe::<[T; N]>()`](describe) when the native type is at
    /// hand; this form exists for descriptors assembled at load time.
    pub fn array_of(element: TypeRef, len: usize) -> BindResult<TypeRef> {
        let size = element.size.checked_mul(len).ok_or_else(|| BindError::InvalidLayout {
            type_name: format!("{}[{}]", element.name, len),
            reason: "array size overflows usize".to_string(),
        })?;
        let type_hash = TypeHash::from_array(element.type_hash, len);
        let shape = TypeShape::Array { element, len };
        Ok(intern_composite(shape, || TypeDescriptor {
            name: format!("{}[{}]", element.name, len),
            size,
            align: element.align,
            kind: TypeKind::Array,
            type_hash,
            traits: element.traits,
            shape,
        }))
    }

    /// Build (or fetch) the descriptor of a `width`-bit field at bit `shift` of `storage`.
    pub fn bit_field(storage: TypeRef, shift: u32, width: u32) -> BindResult<TypeRef> {
        let name = format!("{}:{}@{}", storage.name, width, shift);
        if !storage.kind.is_integer() {
            return Err(BindError::InvalidLayout {
                type_name: name,
                reason: format!("bit field storage must be an integer, found {}", storage.kind),
            });
        }
        let storage_bits = storage.size as u64 * 8;
        if width == 0 || u64::from(shift) + u64::from(width) > storage_bits {
            return Err(BindError::InvalidLayout {
                type_name: name,
                reason: format!(
                    "bits {}..{} do not fit in {}-bit storage",
                    shift,
                    u64::from(shift) + u64::from(width),
                    storage_bits
                ),
            });
        }
        let type_hash = TypeHash::from_bit_field(storage.type_hash, shift, width);
        let shape = TypeShape::BitField { storage, shift, width };
        Ok(intern_composite(shape, || TypeDescriptor {
            name,
            size: storage.size,
            align: storage.align,
            kind: TypeKind::BitField,
            type_hash,
            traits: storage.traits,
            shape,
        }))
    }

    /// Describe native type `T` as an opaque handle named `name`.
    ///
    /// Size and alignment come from `T`. Each native type has one canonical
    /// opaque descriptor, so describing the same `T` under another name is
    /// an error. Opaque descriptors are kept apart from those returned by
    /// [`describe`].
    pub fn opaque<T: Copy + 'static>(name: &str) -> BindResult<TypeRef> {
        let id = TypeId::of::<T>();
        let interned = {
            let mut interner = INTERNER.write();
            *interner.opaque_by_type_id.entry(id).or_insert_with(|| {
                let mut descriptor = TypeDescriptor::scalar::<T>(name, TypeKind::Opaque, true);
                descriptor.type_hash = TypeHash::from_opaque(name);
                TypeRef(Box::leak(Box::new(descriptor)))
            })
        };
        if interned.name != name {
            return Err(BindError::InvalidLayout {
                type_name: name.to_string(),
                reason: format!("native type is already described as opaque '{}'", interned.name),
            });
        }
        Ok(interned)
    }
}

impl Deref for TypeRef {
    type Target = TypeDescriptor;

    fn deref(&self) -> &TypeDescriptor {
        self.0
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.type_hash.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

#[derive(Default)]
struct Interner {
    by_type_id: FxHashMap<TypeId, TypeRef>,
    /// Runtime arrays and bit fields, keyed by component identity.
    composites: FxHashMap<TypeShape, TypeRef>,
    opaque_by_type_id: FxHashMap<TypeId, TypeRef>,
}

lazy_static! {
    static ref INTERNER: RwLock<Interner> = RwLock::new(Interner::default());
}

/// Intern the descriptor of native type `T`, building it on first use.
///
/// `build` runs without the interner lock held, so it may describe component
/// types. If two threads race, the first descriptor published wins and the
/// other is discarded.
pub fn intern<T: 'static>(build: impl FnOnce() -> TypeDescriptor) -> TypeRef {
    let id = TypeId::of::<T>();
    if let Some(found) = INTERNER.read().by_type_id.get(&id) {
        return *found;
    }
    let descriptor = build();
    let mut interner = INTERNER.write();
    if let Some(found) = interner.by_type_id.get(&id) {
        return *found;
    }
    let interned = TypeRef(Box::leak(Box::new(descriptor)));
    interner.by_type_id.insert(id, interned);
    interned
}

fn intern_composite(shape: TypeShape, build: impl FnOnce() -> TypeDescriptor) -> TypeRef {
    if let Some(found) = INTERNER.read().composites.get(&shape) {
        return *found;
    }
    let descriptor = build();
    *INTERNER
        .write()
        .composites
        .entry(shape)
        .or_insert_with(|| TypeRef(Box::leak(Box::new(descriptor))))
}

/// A native type with a canonical [`TypeDescriptor`].
///
/// Implemented for the primitive scalars, for fixed-length arrays of
/// describable types, and by `#[derive(Bind)]` for `#[repr(C)]` structs and
/// primitive-repr enums. Types without an implementation cannot be described,
/// which turns "unsupported kind" into a compile error.
pub trait Describe: 'static {
    /// The interned descriptor for `Self`.
    fn describe() -> TypeRef;
}

/// The interned descriptor for `T`.
pub fn describe<T: Describe>() -> TypeRef {
    T::describe()
}

macro_rules! describe_primitive {
    ($($ty:ty => $name:literal, $kind:ident;)*) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeRef {
                    intern::<$ty>(|| TypeDescriptor::scalar::<$ty>($name, TypeKind::$kind, true))
                }
            }
        )*
    };
}

describe_primitive! {
    bool => "bool", Bool;
    i32 => "int", Int32;
    u32 => "uint", UInt32;
    f32 => "float", Float32;
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeRef {
        intern::<[T; N]>(|| {
            let element = T::describe();
            TypeDescriptor {
                name: format!("{}[{}]", element.name, N),
                size: std::mem::size_of::<[T; N]>(),
                align: std::mem::align_of::<[T; N]>(),
                kind: TypeKind::Array,
                type_hash: TypeHash::from_array(element.type_hash, N),
                traits: NativeTraits::of::<[T; N]>(element.is_copy()),
                shape: TypeShape::Array { element, len: N },
            }
        })
    }
}
