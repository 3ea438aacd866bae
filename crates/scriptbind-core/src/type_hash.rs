//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash computed from a type's canonical name. Two
//! descriptors built for the same native type always carry the same hash, so
//! hashes can be computed before a type is registered and compared across
//! modules without consulting any registry.
//!
//! Composite descriptors (arrays, bit fields) mix the hash of their component
//! with a domain constant so that `int[4]` never collides with a type that
//! happens to be named `int[4]` by a binding author.
//!
//! # Examples
//!
//! ```
//! use scriptbind_core::TypeHash;
//!
//! let int_hash = TypeHash::from_name("int");
//! assert_eq!(int_hash, TypeHash::from_name("int"));
//!
//! let ints = TypeHash::from_array(int_hash, 10);
//! assert_ne!(ints, TypeHash::from_array(int_hash, 11));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant used when folding components together.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for named types.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for fixed-length arrays.
    pub const ARRAY: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for bit fields carved out of an integer storage unit.
    pub const BIT_FIELD: u64 = 0x3e9f5d2a8c7b1403;

    /// Domain marker for opaque (handle-like) types.
    pub const OPAQUE: u64 = 0x9a7f3d5e2b8c4601;
}

/// A deterministic 64-bit hash identifying a bound type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a type name as exposed to scripts.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create the hash of a fixed-length array of `element`.
    ///
    /// Length matters: `int[4]` and `int[5]` are distinct types.
    #[inline]
    pub fn from_array(element: TypeHash, len: usize) -> Self {
        let len_hash = xxh64(&(len as u64).to_le_bytes(), 0);
        TypeHash(
            (hash_constants::ARRAY ^ element.0)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(len_hash),
        )
    }

    /// Create the hash of a `width`-bit field starting at bit `shift` of `storage`.
    #[inline]
    pub fn from_bit_field(storage: TypeHash, shift: u32, width: u32) -> Self {
        let layout = (u64::from(shift) << 32) | u64::from(width);
        TypeHash(
            (hash_constants::BIT_FIELD ^ storage.0)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(xxh64(&layout.to_le_bytes(), 0)),
        )
    }

    /// Create the hash of an opaque type.
    ///
    /// Opaque types live in their own domain so that an opaque `Handle`
    /// never aliases a struct that is later bound under the same name.
    #[inline]
    pub fn from_opaque(name: &str) -> Self {
        TypeHash(hash_constants::OPAQUE ^ xxh64(name.as_bytes(), 0))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
