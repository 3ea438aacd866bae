//! ScriptBind
//!
//! Describe native Rust structs and enums once, with layouts taken from the
//! compiler, and hand the result to an embedded script runtime as named,
//! dependency-ordered modules.
//!
//! # Example
//!
//! ```
//! use scriptbind::prelude::*;
//!
//! #[derive(Bind, Clone, Copy)]
//! #[repr(C)]
//! struct FirstStruct {
//!     bool_field: bool,
//!     int_field: i32,
//!     float_field: f32,
//! }
//!
//! #[derive(Bind, Clone, Copy)]
//! #[repr(i32)]
//! enum FirstEnum {
//!     #[bind(name = "zero")]
//!     Zero,
//!     #[bind(name = "one")]
//!     One,
//! }
//!
//! let mut library = ModuleLibrary::with_builtin();
//! let module = library.create_with_builtin("generatedBindings")?;
//! library.bind_enum::<FirstEnum>(module)?;
//! library.bind_struct::<FirstStruct>(module)?;
//! library.freeze(module)?;
//!
//! let symbols = Linker::new(&library).link(module)?;
//! let first = symbols.get("FirstStruct").unwrap().item().as_struct().unwrap();
//! assert_eq!(first.field("float_field").unwrap().offset(), 8);
//! # Ok::<(), BindError>(())
//! ```

pub use scriptbind_macros::Bind;

pub use scriptbind_core::{
    describe, intern, AccessMode, BindEnum, BindError, BindErrorKind, BindResult, BindStruct,
    Capabilities, Describe, EnumBinding, EnumMeta, EnumValue, FieldBinding, FieldMeta,
    NameScope, NativeTraits, OpaqueMeta, StructAnnotation, StructMeta, TypeDescriptor, TypeHash,
    TypeKind, TypeRef, TypeShape,
};
pub use scriptbind_registry::{
    BindingConfig, DefaultConfig, EnumBuilder, LinkOptions, Linker, ModuleId, ModuleLibrary,
    ModuleRegistry, ModuleState, ModuleView, StructBuilder, Symbol, SymbolKind, SymbolRef,
    SymbolTable, BUILTIN_MODULE_NAME,
};

/// Everything needed to declare and register bindings.
pub mod prelude {
    pub use crate::Bind;
    pub use scriptbind_core::{
        describe, AccessMode, BindError, BindResult, Capabilities, Describe, TypeRef,
    };
    pub use scriptbind_core::{BindEnum, BindStruct};
    pub use scriptbind_registry::{
        BindingConfig, LinkOptions, Linker, ModuleId, ModuleLibrary, SymbolTable,
    };
}
