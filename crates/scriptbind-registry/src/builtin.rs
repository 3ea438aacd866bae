//! The built-in baseline module.
//!
//! Every script runtime starts with a module named `$` that publishes the
//! primitive scalar types. Modules created with
//! [`ModuleLibrary::create_with_builtin`](crate::ModuleLibrary::create_with_builtin)
//! list it as their first dependency.

use scriptbind_core::{describe, TypeRef};

use crate::module::{ModuleId, ModuleRegistry};

/// Name of the built-in module.
pub const BUILTIN_MODULE_NAME: &str = "$";

/// Primitive descriptors published by the built-in module, in publication order.
pub fn primitive_types() -> [TypeRef; 4] {
    [
        describe::<bool>(),
        describe::<i32>(),
        describe::<u32>(),
        describe::<f32>(),
    ]
}

/// Build the frozen built-in module under `id`.
pub(crate) fn builtin_module(id: ModuleId) -> ModuleRegistry {
    let mut module = ModuleRegistry::new(id, BUILTIN_MODULE_NAME.to_string());
    for ty in primitive_types() {
        module.insert_type(ty);
    }
    module.freeze();
    module
}
