//! Value-semantics capability flags for bound structs.

use bitflags::bitflags;

use crate::{BindError, BindResult, TypeRef};

bitflags! {
    /// How the script runtime may pass instances of a bound struct by value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Instances may live in script locals (stack-allocated by the runtime).
        const LOCAL_ONLY = 1 << 0;
        /// Instances may be duplicated bitwise.
        const COPYABLE = 1 << 1;
        /// Instances may be relocated bitwise.
        const MOVABLE = 1 << 2;
    }
}

impl Capabilities {
    /// Build from the three flags in declaration order.
    pub fn new(is_local_only: bool, is_copyable: bool, is_movable: bool) -> Self {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::LOCAL_ONLY, is_local_only);
        caps.set(Capabilities::COPYABLE, is_copyable);
        caps.set(Capabilities::MOVABLE, is_movable);
        caps
    }

    /// The binder's defaults: local and movable, copyable when the native type is `Copy`.
    pub fn defaults_for(native: TypeRef) -> Self {
        Capabilities::new(true, native.is_copy(), true)
    }

    pub fn is_local_only(self) -> bool {
        self.contains(Capabilities::LOCAL_ONLY)
    }

    pub fn is_copyable(self) -> bool {
        self.contains(Capabilities::COPYABLE)
    }

    pub fn is_movable(self) -> bool {
        self.contains(Capabilities::MOVABLE)
    }

    /// Reject claims the native type cannot honour.
    ///
    /// Claiming fewer capabilities than the type supports is always allowed.
    pub fn check(self, module: &str, type_name: &str, native: TypeRef) -> BindResult<()> {
        let mismatch = |reason: String| BindError::CapabilityMismatch {
            module: module.to_string(),
            type_name: type_name.to_string(),
            reason,
        };

        if self.is_copyable() && !native.is_copy() {
            return Err(mismatch(format!(
                "declared copyable but native type '{}' does not implement Copy",
                native.name()
            )));
        }
        if self.is_copyable() && !self.is_movable() {
            return Err(mismatch("declared copyable but not movable".to_string()));
        }
        if self.is_local_only() && native.needs_drop() {
            return Err(mismatch(format!(
                "declared local but native type '{}' has drop glue",
                native.name()
            )));
        }
        Ok(())
    }
}
