//! Module registries for ScriptBind.
//!
//! This crate groups bindings into named modules and resolves them for a
//! script runtime:
//!
//! - [`ModuleLibrary`] - owns every module, keeps names unique and rejects dependency cycles
//! - [`ModuleRegistry`] / [`ModuleView`] - one module and read access to it once frozen
//! - [`StructBuilder`] / [`EnumBuilder`] - incremental, validated registration
//! - [`BindingConfig`] - hooks that rename, adjust or ignore derived bindings
//! - [`Linker`] / [`SymbolTable`] - dependency-ordered flattening into one namespace
//!
//! # Lifecycle
//!
//! Registration is a single-threaded phase: create modules, declare
//! dependencies, register bindings, then freeze. Frozen modules are
//! immutable and the library can be shared freely between threads.

mod builtin;
mod config;
mod enum_builder;
mod library;
mod linker;
mod module;
mod struct_builder;

pub use builtin::{primitive_types, BUILTIN_MODULE_NAME};
pub use config::{BindingConfig, DefaultConfig};
pub use enum_builder::EnumBuilder;
pub use library::ModuleLibrary;
pub use linker::{LinkOptions, Linker, Symbol, SymbolTable};
pub use module::{ModuleId, ModuleRegistry, ModuleState, ModuleView, SymbolKind, SymbolRef};
pub use struct_builder::StructBuilder;
