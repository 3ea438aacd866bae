//! Registration errors.
//!
//! Every error is raised synchronously while bindings are being assembled and
//! carries the module, type and member names needed to find the offending
//! declaration. None of them can occur once a module is frozen.
//!
//! ```text
//! BindError
//! ├── DuplicateName       - module, type, field or enum value name collides in its scope
//! ├── LayoutOverflow      - field offset + size exceeds the owning struct
//! ├── UnknownType         - field refers to a type not bound in the module or its dependencies
//! ├── CapabilityMismatch  - copy/move/local flags contradict the native type
//! ├── CyclicDependency    - module dependency graph would contain a cycle
//! ├── FrozenViolation     - mutation after freeze
//! ├── NotFrozen           - lookup or link before freeze
//! ├── NotPlainData        - native type has drop glue
//! ├── InvalidLayout       - malformed descriptor or enum value out of range
//! ├── EmptyEnum           - enum finished without values
//! ├── UnknownEnumValue    - enum value name lookup failed
//! ├── UnknownModule       - module name or id not in the library
//! └── ResolutionConflict  - two linked modules publish the same symbol
//! ```

use std::fmt;

use thiserror::Error;

/// Result alias for binding operations.
pub type BindResult<T> = Result<T, BindError>;

/// Namespace a duplicate name was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameScope {
    /// Module names across a library.
    Module,
    /// Struct, enum and opaque type names within a module.
    Type,
    /// Field names within a struct.
    Field,
    /// Value names within an enum.
    EnumValue,
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameScope::Module => "module",
            NameScope::Type => "type",
            NameScope::Field => "field",
            NameScope::EnumValue => "enum value",
        })
    }
}

/// Errors raised while describing, registering and linking bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("duplicate {scope} name '{name}' in {location}")]
    DuplicateName {
        scope: NameScope,
        name: String,
        /// Where the collision happened, e.g. `module 'math'` or `struct 'Vec3' of module 'math'`.
        location: String,
    },

    #[error(
        "field '{field}' of struct '{owner}' in module '{module}' spans {size} bytes at offset {offset} but the struct is {owner_size} bytes"
    )]
    LayoutOverflow {
        module: String,
        owner: String,
        field: String,
        offset: usize,
        size: usize,
        owner_size: usize,
    },

    #[error("'{owner}.{member}' in module '{module}' refers to type '{type_name}' which is not yet bound")]
    UnknownType {
        module: String,
        owner: String,
        member: String,
        type_name: String,
    },

    #[error("capability mismatch on '{type_name}' in module '{module}': {reason}")]
    CapabilityMismatch {
        module: String,
        type_name: String,
        reason: String,
    },

    #[error("module '{module}' cannot depend on '{dependency}': cycle {}", .cycle.join(" -> "))]
    CyclicDependency {
        module: String,
        dependency: String,
        /// The offending path, starting and ending at `module`.
        cycle: Vec<String>,
    },

    #[error("cannot {operation} in module '{module}': module is frozen")]
    FrozenViolation {
        module: String,
        operation: &'static str,
    },

    #[error("cannot {operation} in module '{module}': module is not frozen")]
    NotFrozen {
        module: String,
        operation: &'static str,
    },

    #[error("type '{type_name}' is not plain data: it has drop glue")]
    NotPlainData { type_name: String },

    #[error("invalid layout for '{type_name}': {reason}")]
    InvalidLayout { type_name: String, reason: String },

    #[error("enum '{enum_name}' in module '{module}' has no values")]
    EmptyEnum { module: String, enum_name: String },

    #[error("unknown enum value name '{value_name}' in enum '{enum_name}'")]
    UnknownEnumValue {
        enum_name: String,
        value_name: String,
    },

    #[error("unknown module '{name}'")]
    UnknownModule { name: String },

    #[error("symbol '{symbol}' is published by both module '{first}' and module '{second}'")]
    ResolutionConflict {
        symbol: String,
        first: String,
        second: String,
    },
}

/// Field-less discriminant of [`BindError`], for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindErrorKind {
    DuplicateName,
    LayoutOverflow,
    UnknownType,
    CapabilityMismatch,
    CyclicDependency,
    FrozenViolation,
    NotFrozen,
    NotPlainData,
    InvalidLayout,
    EmptyEnum,
    UnknownEnumValue,
    UnknownModule,
    ResolutionConflict,
}

impl BindError {
    /// Get the kind of this error.
    pub fn kind(&self) -> BindErrorKind {
        match self {
            BindError::DuplicateName { .. } => BindErrorKind::DuplicateName,
            BindError::LayoutOverflow { .. } => BindErrorKind::LayoutOverflow,
            BindError::UnknownType { .. } => BindErrorKind::UnknownType,
            BindError::CapabilityMismatch { .. } => BindErrorKind::CapabilityMismatch,
            BindError::CyclicDependency { .. } => BindErrorKind::CyclicDependency,
            BindError::FrozenViolation { .. } => BindErrorKind::FrozenViolation,
            BindError::NotFrozen { .. } => BindErrorKind::NotFrozen,
            BindError::NotPlainData { .. } => BindErrorKind::NotPlainData,
            BindError::InvalidLayout { .. } => BindErrorKind::InvalidLayout,
            BindError::EmptyEnum { .. } => BindErrorKind::EmptyEnum,
            BindError::UnknownEnumValue { .. } => BindErrorKind::UnknownEnumValue,
            BindError::UnknownModule { .. } => BindErrorKind::UnknownModule,
            BindError::ResolutionConflict { .. } => BindErrorKind::ResolutionConflict,
        }
    }

    /// A module name that is already taken.
    pub fn duplicate_module(name: impl Into<String>) -> Self {
        BindError::DuplicateName {
            scope: NameScope::Module,
            name: name.into(),
            location: "module library".to_string(),
        }
    }

    /// A struct, enum or opaque type name that is already registered in `module`.
    pub fn duplicate_type(module: &str, name: impl Into<String>) -> Self {
        BindError::DuplicateName {
            scope: NameScope::Type,
            name: name.into(),
            location: format!("module '{}'", module),
        }
    }

    /// A field name repeated within struct `owner`.
    pub fn duplicate_field(module: &str, owner: &str, name: impl Into<String>) -> Self {
        BindError::DuplicateName {
            scope: NameScope::Field,
            name: name.into(),
            location: format!("struct '{}' of module '{}'", owner, module),
        }
    }

    /// A value name repeated within enum `owner`.
    pub fn duplicate_enum_value(module: &str, owner: &str, name: impl Into<String>) -> Self {
        BindError::DuplicateName {
            scope: NameScope::EnumValue,
            name: name.into(),
            location: format!("enum '{}' of module '{}'", owner, module),
        }
    }
}
