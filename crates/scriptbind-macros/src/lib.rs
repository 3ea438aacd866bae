//! ScriptBind Proc Macros
//!
//! `#[derive(Bind)]` describes a native type to the binding registry. Sizes,
//! alignments and field offsets are taken from the compiler
//! (`size_of`, `align_of`, `offset_of!`), never written by hand.
//!
//! # Example
//!
//! ```ignore
//! use scriptbind::Bind;
//!
//! #[derive(Bind, Clone, Copy)]
//! #[repr(C)]
//! pub struct FirstStruct {
//!     pub bool_field: bool,
//!     pub int_field: i32,
//!     pub float_field: f32,
//! }
//!
//! #[derive(Bind, Clone, Copy)]
//! #[repr(i32)]
//! pub enum FirstEnum {
//!     #[bind(name = "zero")]
//!     Zero,
//!     #[bind(name = "one")]
//!     One,
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_bind;

/// Derive `Describe` plus `BindStruct` or `BindEnum` for a type.
///
/// Structs must be `#[repr(C)]` with named fields; every bound field type must
/// implement `Describe`. Enums must be field-less with `#[repr(i32)]` or
/// `#[repr(u32)]`. Generic types and unions are rejected.
///
/// # Type Attributes
///
/// - `#[bind(name = "...")]` - Override the script-visible name
/// - `#[bind(not_local)]` - Instances may not live in script locals
/// - `#[bind(no_copy)]` - Instances may not be copied
/// - `#[bind(no_move)]` - Instances may neither be moved nor copied
///
/// # Field and Variant Attributes
///
/// - `#[bind(name = "...")]` - Override the script-visible name
/// - `#[bind(skip)]` - Leave the field or variant out
/// - `#[bind(read_only)]` - Expose the field read-only (fields only)
///
/// # Example
///
/// ```ignore
/// #[derive(Bind, Clone, Copy)]
/// #[repr(C)]
/// #[bind(name = "Particle", not_local)]
/// pub struct Particle {
///     pub position: [f32; 3],
///     #[bind(read_only)]
///     pub id: u32,
///     #[bind(skip)]
///     pub cache_slot: u32,
/// }
/// ```
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    derive_bind::derive_bind_impl(input)
}
