//! Module registries.
//!
//! A [`ModuleRegistry`] is a named collection of struct annotations, enum
//! bindings and opaque types, plus the ordered list of modules it depends on.
//! Registries move through two states:
//!
//! ```text
//! Open ──freeze──▶ Frozen
//! ```
//!
//! Mutation is only possible while `Open` and goes through
//! [`ModuleLibrary`](crate::ModuleLibrary). Lookups are only possible once
//! `Frozen`, through a [`ModuleView`].

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use scriptbind_core::{
    BindError, BindResult, EnumBinding, StructAnnotation, TypeHash, TypeRef,
};

/// Index of a module in its [`ModuleLibrary`](crate::ModuleLibrary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle stage of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleState {
    Open,
    Frozen,
}

/// Which per-module map a symbol lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Struct,
    Enum,
    Type,
}

/// A borrowed symbol published by a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRef<'a> {
    Struct(&'a StructAnnotation),
    Enum(&'a EnumBinding),
    Type(TypeRef),
}

impl<'a> SymbolRef<'a> {
    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolRef::Struct(_) => SymbolKind::Struct,
            SymbolRef::Enum(_) => SymbolKind::Enum,
            SymbolRef::Type(_) => SymbolKind::Type,
        }
    }

    /// Script-visible name.
    pub fn name(&self) -> &'a str {
        match *self {
            SymbolRef::Struct(s) => s.name(),
            SymbolRef::Enum(e) => e.name(),
            SymbolRef::Type(t) => t.get().name(),
        }
    }

    /// Hash of the script-visible type.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            SymbolRef::Struct(s) => s.type_hash(),
            SymbolRef::Enum(e) => e.type_hash(),
            SymbolRef::Type(t) => t.type_hash(),
        }
    }

    /// Native descriptor backing this symbol. Enums bound without one have none.
    pub fn native(&self) -> Option<TypeRef> {
        match self {
            SymbolRef::Struct(s) => Some(s.native()),
            SymbolRef::Enum(e) => e.native(),
            SymbolRef::Type(t) => Some(*t),
        }
    }

    pub fn as_struct(&self) -> Option<&'a StructAnnotation> {
        match *self {
            SymbolRef::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&'a EnumBinding> {
        match *self {
            SymbolRef::Enum(e) => Some(e),
            _ => None,
        }
    }
}

/// The bindings of one logical unit.
///
/// Owns its annotations and bindings; dependencies are stored as
/// [`ModuleId`]s into the owning library, never as owned registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRegistry {
    id: ModuleId,
    name: String,
    state: ModuleState,
    structs: FxHashMap<String, StructAnnotation>,
    enums: FxHashMap<String, EnumBinding>,
    types: FxHashMap<String, TypeRef>,
    /// Symbol names in registration order.
    order: Vec<(SymbolKind, String)>,
    /// Type hash -> name of the symbol providing it.
    provided: FxHashMap<TypeHash, String>,
    /// Native descriptors backing registered symbols.
    natives: FxHashSet<TypeRef>,
    dependencies: Vec<ModuleId>,
}

impl ModuleRegistry {
    pub(crate) fn new(id: ModuleId, name: String) -> Self {
        Self {
            id,
            name,
            state: ModuleState::Open,
            structs: FxHashMap::default(),
            enums: FxHashMap::default(),
            types: FxHashMap::default(),
            order: Vec::new(),
            provided: FxHashMap::default(),
            natives: FxHashSet::default(),
            dependencies: Vec::new(),
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == ModuleState::Frozen
    }

    /// Number of registered symbols.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Read access to a frozen module.
    pub fn view(&self) -> BindResult<ModuleView<'_>> {
        if !self.is_frozen() {
            return Err(BindError::NotFrozen {
                module: self.name.clone(),
                operation: "look up symbols",
            });
        }
        Ok(ModuleView { module: self })
    }

    // === Registration (crate-internal, state checked by the library) ===

    pub(crate) fn ensure_open(&self, operation: &'static str) -> BindResult<()> {
        match self.state {
            ModuleState::Open => Ok(()),
            ModuleState::Frozen => Err(BindError::FrozenViolation {
                module: self.name.clone(),
                operation,
            }),
        }
    }

    pub(crate) fn ensure_name_free(&self, name: &str) -> BindResult<()> {
        if self.contains(name) {
            return Err(BindError::duplicate_type(&self.name, name));
        }
        Ok(())
    }

    pub(crate) fn has_struct(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
            || self.enums.contains_key(name)
            || self.types.contains_key(name)
    }

    /// Whether a registered symbol is backed by exactly this native descriptor.
    pub(crate) fn provides(&self, ty: TypeRef) -> bool {
        self.natives.contains(&ty)
    }

    pub(crate) fn dependency_ids(&self) -> &[ModuleId] {
        &self.dependencies
    }

    /// Callers check [`ensure_name_free`](Self::ensure_name_free) first.
    pub(crate) fn insert_struct(&mut self, annotation: StructAnnotation) -> &StructAnnotation {
        let name = annotation.name().to_string();
        self.provided.entry(annotation.type_hash()).or_insert_with(|| name.clone());
        self.natives.insert(annotation.native());
        self.order.push((SymbolKind::Struct, name.clone()));
        self.structs.entry(name).or_insert(annotation)
    }

    pub(crate) fn insert_enum(&mut self, binding: EnumBinding) -> &EnumBinding {
        let name = binding.name().to_string();
        self.provided.entry(binding.type_hash()).or_insert_with(|| name.clone());
        self.natives.extend(binding.native());
        self.order.push((SymbolKind::Enum, name.clone()));
        self.enums.entry(name).or_insert(binding)
    }

    pub(crate) fn insert_type(&mut self, ty: TypeRef) {
        let name = ty.get().name().to_string();
        self.provided.entry(ty.type_hash()).or_insert_with(|| name.clone());
        self.natives.insert(ty);
        self.order.push((SymbolKind::Type, name.clone()));
        self.types.insert(name, ty);
    }

    pub(crate) fn push_dependency(&mut self, dependency: ModuleId) -> bool {
        if self.dependencies.contains(&dependency) {
            return false;
        }
        self.dependencies.push(dependency);
        true
    }

    /// Returns `true` on the first call.
    pub(crate) fn freeze(&mut self) -> bool {
        let was_open = self.state == ModuleState::Open;
        self.state = ModuleState::Frozen;
        was_open
    }
}

/// Lookups on a frozen [`ModuleRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct ModuleView<'a> {
    module: &'a ModuleRegistry,
}

impl<'a> ModuleView<'a> {
    pub fn name(&self) -> &'a str {
        &self.module.name
    }

    pub fn get_struct(&self, name: &str) -> Option<&'a StructAnnotation> {
        self.module.structs.get(name)
    }

    pub fn get_enum(&self, name: &str) -> Option<&'a EnumBinding> {
        self.module.enums.get(name)
    }

    pub fn get_type(&self, name: &str) -> Option<TypeRef> {
        self.module.types.get(name).copied()
    }

    /// Any symbol named `name`.
    pub fn get(&self, name: &str) -> Option<SymbolRef<'a>> {
        self.get_struct(name)
            .map(SymbolRef::Struct)
            .or_else(|| self.get_enum(name).map(SymbolRef::Enum))
            .or_else(|| self.get_type(name).map(SymbolRef::Type))
    }

    /// Find the symbol providing `hash`.
    pub fn by_hash(&self, hash: TypeHash) -> Option<SymbolRef<'a>> {
        self.module.provided.get(&hash).and_then(|name| self.get(name))
    }

    /// All symbols in registration order.
    pub fn symbols(self) -> impl Iterator<Item = SymbolRef<'a>> {
        let module = self.module;
        module.order.iter().filter_map(move |(kind, name)| match kind {
            SymbolKind::Struct => module.structs.get(name).map(SymbolRef::Struct),
            SymbolKind::Enum => module.enums.get(name).map(SymbolRef::Enum),
            SymbolKind::Type => module.types.get(name).copied().map(SymbolRef::Type),
        })
    }

    /// Struct annotations in registration order.
    pub fn structs(self) -> impl Iterator<Item = &'a StructAnnotation> {
        self.symbols().filter_map(|s| s.as_struct())
    }

    /// Enum bindings in registration order.
    pub fn enums(self) -> impl Iterator<Item = &'a EnumBinding> {
        self.symbols().filter_map(|s| s.as_enum())
    }

    /// Opaque and primitive types in registration order.
    pub fn types(self) -> impl Iterator<Item = TypeRef> {
        self.symbols().filter_map(|s| match s {
            SymbolRef::Type(t) => Some(t),
            _ => None,
        })
    }

    /// Declared dependencies, in declaration order.
    pub fn dependencies(&self) -> &'a [ModuleId] {
        &self.module.dependencies
    }
}
