//! The module library.
//!
//! A [`ModuleLibrary`] owns every [`ModuleRegistry`] of one script runtime,
//! keeps module names unique, and records the dependency graph between
//! modules. It is the only way to mutate a module.
//!
//! The library is caller-owned. Bindings are assembled during a
//! single-threaded registration phase; once every module is frozen the
//! library is read-only and may be shared across threads (e.g. in an `Arc`).
//!
//! # Example
//!
//! ```
//! use scriptbind_core::{describe, AccessMode};
//! use scriptbind_registry::ModuleLibrary;
//!
//! #[repr(C)]
//! #[derive(Clone, Copy)]
//! struct Pair {
//!     a: i32,
//!     b: f32,
//! }
//!
//! # fn pair_descriptor() -> scriptbind_core::TypeRef {
//! #     scriptbind_core::intern::<Pair>(|| {
//! #         scriptbind_core::TypeDescriptor::structure::<Pair>("Pair", true)
//! #     })
//! # }
//! let mut library = ModuleLibrary::with_builtin();
//! let math = library.create_with_builtin("math")?;
//!
//! let mut pair = library.begin_struct(math, "Pair", pair_descriptor())?;
//! pair.field("a", std::mem::offset_of!(Pair, a), describe::<i32>(), AccessMode::ReadWrite)?
//!     .field("b", std::mem::offset_of!(Pair, b), describe::<f32>(), AccessMode::ReadOnly)?;
//! pair.finish()?;
//!
//! library.freeze(math)?;
//! let view = library.module(math)?.view()?;
//! assert_eq!(view.get_struct("Pair").unwrap().fields().len(), 2);
//! # Ok::<(), scriptbind_core::BindError>(())
//! ```

use petgraph::algo::{all_simple_paths, has_path_connecting};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use rustc_hash::FxHashMap;
use scriptbind_core::{
    BindEnum, BindError, BindResult, BindStruct, EnumBinding, EnumMeta, OpaqueMeta,
    StructAnnotation, StructMeta, TypeRef, TypeShape,
};
use tracing::{debug, trace};

use crate::builtin::{self, BUILTIN_MODULE_NAME};
use crate::config::{BindingConfig, DefaultConfig};
use crate::enum_builder::EnumBuilder;
use crate::module::{ModuleId, ModuleRegistry};
use crate::struct_builder::StructBuilder;

/// Every module of one script runtime plus their dependency graph.
#[derive(Debug, Clone, Default)]
pub struct ModuleLibrary {
    modules: Vec<ModuleRegistry>,
    by_name: FxHashMap<String, ModuleId>,
    /// Edge `a -> b` means `a` depends on `b`. Node index == module index.
    graph: DiGraph<ModuleId, ()>,
    builtin: Option<ModuleId>,
}

impl ModuleLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library holding only the frozen built-in module `$`.
    pub fn with_builtin() -> Self {
        let mut library = Self::new();
        let id = library.push_module(BUILTIN_MODULE_NAME, builtin::builtin_module);
        library.builtin = Some(id);
        library
    }

    // === Modules ===

    /// Create an open module.
    ///
    /// Fails with `DuplicateName` if a module of that name already exists in
    /// this library.
    pub fn create(&mut self, name: impl Into<String>) -> BindResult<ModuleId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(BindError::duplicate_module(name));
        }
        let id = self.push_module(&name, |id| ModuleRegistry::new(id, name.clone()));
        debug!(module = %name, %id, "created module");
        Ok(id)
    }

    /// Create an open module whose first dependency is the built-in module.
    ///
    /// Installs the built-in module if the library does not have it yet.
    pub fn create_with_builtin(&mut self, name: impl Into<String>) -> BindResult<ModuleId> {
        let name = name.into();
        if name == BUILTIN_MODULE_NAME || self.by_name.contains_key(&name) {
            return Err(BindError::duplicate_module(name));
        }
        let builtin = self.ensure_builtin()?;
        let id = self.create(name)?;
        self.add_dependency(id, builtin)?;
        Ok(id)
    }

    /// The built-in module, if installed.
    pub fn builtin(&self) -> Option<ModuleId> {
        self.builtin
    }

    /// Install the built-in module if it is missing.
    pub fn ensure_builtin(&mut self) -> BindResult<ModuleId> {
        if let Some(id) = self.builtin {
            return Ok(id);
        }
        if self.by_name.contains_key(BUILTIN_MODULE_NAME) {
            return Err(BindError::duplicate_module(BUILTIN_MODULE_NAME));
        }
        let id = self.push_module(BUILTIN_MODULE_NAME, builtin::builtin_module);
        self.builtin = Some(id);
        debug!(%id, "installed built-in module");
        Ok(id)
    }

    fn push_module(
        &mut self,
        name: &str,
        build: impl FnOnce(ModuleId) -> ModuleRegistry,
    ) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        let node = self.graph.add_node(id);
        debug_assert_eq!(node.index(), id.index());
        self.modules.push(build(id));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Find a module by name.
    pub fn find(&self, name: &str) -> Option<ModuleId> {
        self.by_name.get(name).copied()
    }

    /// Borrow a module.
    pub fn module(&self, id: ModuleId) -> BindResult<&ModuleRegistry> {
        self.modules.get(id.index()).ok_or_else(|| unknown_module(id))
    }

    fn module_mut(&mut self, id: ModuleId) -> BindResult<&mut ModuleRegistry> {
        self.modules.get_mut(id.index()).ok_or_else(|| unknown_module(id))
    }

    /// Borrow a module by name.
    pub fn module_named(&self, name: &str) -> BindResult<&ModuleRegistry> {
        self.find(name)
            .and_then(|id| self.modules.get(id.index()))
            .ok_or_else(|| BindError::UnknownModule {
                name: name.to_string(),
            })
    }

    /// All modules in creation order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleRegistry> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    // === Dependencies ===

    /// Record that `module` requires the symbols of `dependency`.
    ///
    /// Rejects self-dependencies and any edge that would close a cycle. Adding
    /// an edge that already exists is a no-op.
    pub fn add_dependency(&mut self, module: ModuleId, dependency: ModuleId) -> BindResult<()> {
        let module_name = self.module(module)?.name().to_string();
        let dependency_name = self.module(dependency)?.name().to_string();
        self.module(module)?.ensure_open("add dependency")?;

        let from = node(module);
        let to = node(dependency);
        if module == dependency || has_path_connecting(&self.graph, to, from, None) {
            let cycle = self.cycle_through(module, dependency);
            return Err(BindError::CyclicDependency {
                module: module_name,
                dependency: dependency_name,
                cycle,
            });
        }

        if !self.module_mut(module)?.push_dependency(dependency) {
            trace!(
                module = %module_name,
                dependency = %dependency_name,
                "dependency already declared"
            );
            return Ok(());
        }
        self.graph.add_edge(from, to, ());
        debug!(module = %module_name, dependency = %dependency_name, "added dependency");
        Ok(())
    }

    /// Names along the cycle `module -> dependency -> ... -> module`.
    fn cycle_through(&self, module: ModuleId, dependency: ModuleId) -> Vec<String> {
        let path: Vec<NodeIndex> = if module == dependency {
            vec![node(module)]
        } else {
            all_simple_paths::<Vec<NodeIndex>, _>(
                &self.graph,
                node(dependency),
                node(module),
                0,
                None,
            )
            .next()
                .unwrap_or_else(|| vec![node(dependency), node(module)])
        };
        std::iter::once(node(module))
            .chain(path)
            .filter_map(|n| self.modules.get(n.index()))
            .map(|m| m.name().to_string())
            .collect()
    }

    // === Registration ===

    /// Start building a struct annotation in `module`.
    ///
    /// Fails if the module is frozen, if `name` is already registered in it,
    /// or if `native` is not a plain-data struct descriptor.
    pub fn begin_struct(
        &mut self,
        module: ModuleId,
        name: impl Into<String>,
        native: TypeRef,
    ) -> BindResult<StructBuilder<'_>> {
        let name = name.into();
        let registry = self.module(module)?;
        registry.ensure_open("begin struct")?;
        registry.ensure_name_free(&name)?;
        StructAnnotation::check_native(registry.name(), &name, native)?;
        trace!(module = %registry.name(), name = %name, "begin struct");
        Ok(StructBuilder::new(self, module, StructAnnotation::new(name, native)))
    }

    /// Start building an enum binding in `module`.
    pub fn begin_enum(
        &mut self,
        module: ModuleId,
        name: impl Into<String>,
        underlying: TypeRef,
    ) -> BindResult<EnumBuilder<'_>> {
        let name = name.into();
        let registry = self.module(module)?;
        registry.ensure_open("begin enum")?;
        registry.ensure_name_free(&name)?;
        if !underlying.kind().is_integer() {
            return Err(BindError::InvalidLayout {
                type_name: name,
                reason: format!("underlying type '{}' is not an integer", underlying.name()),
            });
        }
        trace!(module = %registry.name(), name = %name, "begin enum");
        Ok(EnumBuilder::new(self, module, EnumBinding::new(name, underlying)))
    }

    /// Register a fully assembled struct annotation.
    pub fn register_struct(
        &mut self,
        module: ModuleId,
        annotation: StructAnnotation,
    ) -> BindResult<&StructAnnotation> {
        let registry = self.module(module)?;
        registry.ensure_open("register struct")?;
        registry.ensure_name_free(annotation.name())?;
        annotation.validate(registry.name())?;
        for field in annotation.fields() {
            self.check_bound(module, annotation.name(), field.name(), field.ty())?;
        }

        let registry = self.module_mut(module)?;
        debug!(
            module = %registry.name(),
            name = %annotation.name(),
            fields = annotation.fields().len(),
            size = annotation.size(),
            "registered struct"
        );
        Ok(registry.insert_struct(annotation))
    }

    /// Register a fully assembled enum binding.
    pub fn register_enum(
        &mut self,
        module: ModuleId,
        binding: EnumBinding,
    ) -> BindResult<&EnumBinding> {
        let registry = self.module(module)?;
        registry.ensure_open("register enum")?;
        registry.ensure_name_free(binding.name())?;
        binding.validate(registry.name())?;

        let registry = self.module_mut(module)?;
        debug!(
            module = %registry.name(),
            name = %binding.name(),
            values = binding.len(),
            "registered enum"
        );
        Ok(registry.insert_enum(binding))
    }

    /// Register native type `T` as a handle-like type whose contents scripts
    /// cannot see. Size and alignment are those of `T`.
    pub fn register_opaque<T: Copy + 'static>(
        &mut self,
        module: ModuleId,
        name: &str,
    ) -> BindResult<TypeRef> {
        let registry = self.module(module)?;
        registry.ensure_open("register opaque type")?;
        registry.ensure_name_free(name)?;
        let ty = TypeRef::opaque::<T>(name)?;

        let registry = self.module_mut(module)?;
        registry.insert_type(ty);
        debug!(
            module = %registry.name(),
            name,
            size = ty.size(),
            align = ty.align(),
            "registered opaque type"
        );
        Ok(ty)
    }

    /// Register an opaque type, letting `config` rename or ignore it first.
    ///
    /// Returns `Ok(None)` when the configuration ignores the type, or when
    /// the module already binds a struct of that name.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn register_opaque_with<T: Copy + 'static, C: BindingConfig + ?Sized>(
        &mut self,
        module: ModuleId,
        name: &str,
        config: &C,
    ) -> BindResult<Option<TypeRef>> {
        let mut meta = OpaqueMeta::new(name);
        config.configure_opaque(&mut meta);
        if meta.is_ignored() {
            debug!(name = %meta.name, "opaque type ignored by configuration");
            return Ok(None);
        }
        if self.module(module)?.has_struct(&meta.name) {
            debug!(name = %meta.name, "opaque type skipped, struct already bound");
            return Ok(None);
        }
        self.register_opaque::<T>(module, &meta.name).map(Some)
    }

    /// Bind a `#[derive(Bind)]` struct as derived.
    pub fn bind_struct<T: BindStruct>(
        &mut self,
        module: ModuleId,
    ) -> BindResult<&StructAnnotation> {
        self.build_struct(module, T::struct_meta(), &DefaultConfig)
    }

    /// Bind a `#[derive(Bind)]` struct, letting `config` adjust it first.
    ///
    /// Returns `Ok(None)` when the configuration ignores the struct.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind_struct_with<T: BindStruct, C: BindingConfig + ?Sized>(
        &mut self,
        module: ModuleId,
        config: &C,
    ) -> BindResult<Option<&StructAnnotation>> {
        let mut meta = T::struct_meta();
        config.configure_struct(&mut meta);
        if meta.is_ignored() {
            debug!(name = %meta.name, "struct ignored by configuration");
            return Ok(None);
        }
        self.build_struct(module, meta, config).map(Some)
    }

    fn build_struct<C: BindingConfig + ?Sized>(
        &mut self,
        module: ModuleId,
        meta: StructMeta,
        config: &C,
    ) -> BindResult<&StructAnnotation> {
        let struct_name = meta.name;
        let mut builder = self.begin_struct(module, struct_name.clone(), meta.native)?;
        for mut field in meta.fields {
            config.configure_field(&struct_name, &mut field);
            if field.is_ignored() {
                debug!(owner = %struct_name, field = %field.name, "field ignored by configuration");
                continue;
            }
            builder.field(&field.name, field.offset, field.ty, field.mode)?;
        }
        builder.capabilities(meta.capabilities)?;
        builder.finish()
    }

    /// Bind a `#[derive(Bind)]` enum as derived.
    pub fn bind_enum<T: BindEnum>(&mut self, module: ModuleId) -> BindResult<&EnumBinding> {
        self.build_enum(module, T::enum_meta())
    }

    /// Bind a `#[derive(Bind)]` enum, letting `config` adjust it first.
    ///
    /// Returns `Ok(None)` when the configuration ignores the enum.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind_enum_with<T: BindEnum, C: BindingConfig + ?Sized>(
        &mut self,
        module: ModuleId,
        config: &C,
    ) -> BindResult<Option<&EnumBinding>> {
        let mut meta = T::enum_meta();
        config.configure_enum(&mut meta);
        if meta.is_ignored() {
            debug!(name = %meta.name, "enum ignored by configuration");
            return Ok(None);
        }
        self.build_enum(module, meta).map(Some)
    }

    fn build_enum(&mut self, module: ModuleId, meta: EnumMeta) -> BindResult<&EnumBinding> {
        let mut builder = self.begin_enum(module, meta.name, meta.underlying)?;
        builder.native(meta.native)?;
        for (name, value) in &meta.values {
            builder.value(name, *value)?;
        }
        builder.finish()
    }

    // === Lifecycle ===

    /// Freeze `module`. Freezing a frozen module is a no-op.
    pub fn freeze(&mut self, module: ModuleId) -> BindResult<()> {
        let registry = self.module_mut(module)?;
        if registry.freeze() {
            debug!(module = %registry.name(), symbols = registry.len(), "froze module");
        }
        Ok(())
    }

    /// Freeze every module.
    pub fn freeze_all(&mut self) {
        for registry in &mut self.modules {
            if registry.freeze() {
                debug!(module = %registry.name(), symbols = registry.len(), "froze module");
            }
        }
    }

    /// Check whether every module is frozen.
    pub fn is_frozen(&self) -> bool {
        self.modules.iter().all(ModuleRegistry::is_frozen)
    }

    // === Resolution ===

    /// Check whether a field of type `ty` can be declared in `module`.
    ///
    /// Primitives are always bound. Enum, struct and opaque types (looking
    /// through arrays and bit fields) must be registered in `module` or one
    /// of its transitive dependencies under this exact descriptor; another
    /// native type that shares the script name does not count.
    pub fn is_bound(&self, module: ModuleId, ty: TypeRef) -> BindResult<bool> {
        self.module(module)?;
        let leaf = match ty.leaf().shape() {
            TypeShape::BitField { storage, .. } => storage,
            _ => ty.leaf(),
        };
        if !leaf.kind().requires_binding() {
            return Ok(true);
        }

        let mut dfs = Dfs::new(&self.graph, node(module));
        while let Some(next) = dfs.next(&self.graph) {
            if self.module(self.graph[next])?.provides(leaf) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Fail with `UnknownType` unless [`is_bound`](Self::is_bound).
    pub(crate) fn check_bound(
        &self,
        module: ModuleId,
        owner: &str,
        member: &str,
        ty: TypeRef,
    ) -> BindResult<()> {
        if self.is_bound(module, ty)? {
            return Ok(());
        }
        Err(BindError::UnknownType {
            module: self.module(module)?.name().to_string(),
            owner: owner.to_string(),
            member: member.to_string(),
            type_name: ty.leaf().name().to_string(),
        })
    }
}

fn node(id: ModuleId) -> NodeIndex {
    NodeIndex::new(id.index())
}

fn unknown_module(id: ModuleId) -> BindError {
    BindError::UnknownModule {
        name: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scriptbind_core::{
        describe, intern, AccessMode, BindErrorKind, Capabilities, FieldBinding, NameScope,
        TypeDescriptor,
    };

    #[repr(C)]
    #[derive(Clone, Copy)]
    #[allow(dead_code)]
    struct FirstStruct {
        bool_field: bool,
        int_field: i32,
        float_field: f32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    #[allow(dead_code)]
    struct Holder {
        inner: FirstStruct,
        count: u32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    #[allow(dead_code)]
    struct LibraryHandle {
        raw: u64,
    }

    mod wide {
        /// Same script name as the outer `FirstStruct`, different layout.
        #[repr(C)]
        #[derive(Clone, Copy)]
        #[allow(dead_code)]
        pub struct FirstStruct {
            pub values: [f64; 4],
        }
    }

    #[repr(i32)]
    #[derive(Clone, Copy)]
    #[allow(dead_code)]
    enum FirstEnum {
        Zero,
        One,
    }

    fn first_struct() -> TypeRef {
        intern::<FirstStruct>(|| TypeDescriptor::structure::<FirstStruct>("FirstStruct", true))
    }

    fn holder() -> TypeRef {
        intern::<Holder>(|| TypeDescriptor::structure::<Holder>("Holder", true))
    }

    fn first_enum() -> TypeRef {
        intern::<FirstEnum>(|| TypeDescriptor::enumeration::<FirstEnum>("FirstEnum", true))
    }

    fn first_struct_annotation() -> StructAnnotation {
        StructAnnotation::new("FirstStruct", first_struct())
            .with_field(FieldBinding::new(
                "bool_field",
                std::mem::offset_of!(FirstStruct, bool_field),
                describe::<bool>(),
                AccessMode::ReadWrite,
            ))
            .with_field(FieldBinding::new(
                "int_field",
                std::mem::offset_of!(FirstStruct, int_field),
                describe::<i32>(),
                AccessMode::ReadWrite,
            ))
            .with_field(FieldBinding::new(
                "float_field",
                std::mem::offset_of!(FirstStruct, float_field),
                describe::<f32>(),
                AccessMode::ReadWrite,
            ))
    }

    fn numbers() -> EnumBinding {
        EnumBinding::new("Numbers", describe::<i32>())
            .with_value("zero", 0)
            .with_value("one", 1)
            .with_value("two", 2)
    }

    #[test]
    fn create_rejects_duplicate_module_names() {
        let mut library = ModuleLibrary::new();
        library.create("generatedBindings").unwrap();
        let err = library.create("generatedBindings").unwrap_err();
        assert_eq!(err, BindError::duplicate_module("generatedBindings"));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn find_and_module_named() {
        let mut library = ModuleLibrary::new();
        let id = library.create("m").unwrap();
        assert_eq!(library.find("m"), Some(id));
        assert_eq!(library.module_named("m").unwrap().id(), id);
        assert_eq!(
            library.module_named("missing").unwrap_err().kind(),
            BindErrorKind::UnknownModule
        );
        assert!(library.module(ModuleId(9)).is_err());
    }

    #[test]
    fn with_builtin_installs_frozen_baseline() {
        let mut library = ModuleLibrary::with_builtin();
        let builtin = library.builtin().unwrap();
        assert_eq!(library.module(builtin).unwrap().name(), "$");
        assert!(library.module(builtin).unwrap().is_frozen());

        let m = library.create_with_builtin("m").unwrap();
        library.freeze(m).unwrap();
        let deps = library.module(m).unwrap().view().unwrap().dependencies().to_vec();
        assert_eq!(deps, vec![builtin]);
        assert_eq!(library.ensure_builtin().unwrap(), builtin);
    }

    #[test]
    fn create_with_builtin_installs_on_demand() {
        let mut library = ModuleLibrary::new();
        let m = library.create_with_builtin("m").unwrap();
        assert!(library.builtin().is_some());
        assert_eq!(library.len(), 2);
        assert_eq!(library.module(m).unwrap().dependency_ids(), &[library.builtin().unwrap()]);
    }

    #[test]
    fn builtin_name_taken_by_user_module() {
        let mut library = ModuleLibrary::new();
        library.create("$").unwrap();
        assert_eq!(
            library.create_with_builtin("m").unwrap_err(),
            BindError::duplicate_module("$")
        );
        assert!(library.find("m").is_none());
    }

    #[test]
    fn self_dependency_is_cyclic() {
        let mut library = ModuleLibrary::new();
        let a = library.create("a").unwrap();
        let err = library.add_dependency(a, a).unwrap_err();
        assert_eq!(
            err,
            BindError::CyclicDependency {
                module: "a".to_string(),
                dependency: "a".to_string(),
                cycle: vec!["a".to_string(), "a".to_string()],
            }
        );
    }

    #[test]
    fn cycle_rejected_at_second_edge() {
        let mut library = ModuleLibrary::new();
        let a = library.create("a").unwrap();
        let b = library.create("b").unwrap();
        library.add_dependency(a, b).unwrap();
        let err = library.add_dependency(b, a).unwrap_err();
        assert_eq!(err.kind(), BindErrorKind::CyclicDependency);
        assert_eq!(err.to_string(), "module 'b' cannot depend on 'a': cycle b -> a -> b");
        assert!(library.module(b).unwrap().dependency_ids().is_empty());
    }

    #[test]
    fn longer_cycle_reports_path() {
        let mut library = ModuleLibrary::new();
        let a = library.create("a").unwrap();
        let b = library.create("b").unwrap();
        let c = library.create("c").unwrap();
        library.add_dependency(a, b).unwrap();
        library.add_dependency(b, c).unwrap();
        match library.add_dependency(c, a).unwrap_err() {
            BindError::CyclicDependency { cycle, .. } => {
                assert_eq!(cycle, vec!["c", "a", "b", "c"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_dependency_is_noop() {
        let mut library = ModuleLibrary::new();
        let a = library.create("a").unwrap();
        let b = library.create("b").unwrap();
        library.add_dependency(a, b).unwrap();
        library.add_dependency(a, b).unwrap();
        assert_eq!(library.module(a).unwrap().dependency_ids(), &[b]);
    }

    #[test]
    fn frozen_module_rejects_dependencies() {
        let mut library = ModuleLibrary::new();
        let a = library.create("a").unwrap();
        let b = library.create("b").unwrap();
        library.freeze(a).unwrap();
        assert_eq!(
            library.add_dependency(a, b).unwrap_err().kind(),
            BindErrorKind::FrozenViolation
        );
        // Depending on a frozen module is fine.
        library.add_dependency(b, a).unwrap();
    }

    #[test]
    fn register_struct_reports_offsets() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        library.register_struct(m, first_struct_annotation()).unwrap();
        library.freeze(m).unwrap();

        let view = library.module(m).unwrap().view().unwrap();
        let ann = view.get_struct("FirstStruct").unwrap();
        let offsets: Vec<_> = ann.fields().iter().map(FieldBinding::offset).collect();
        assert_eq!(offsets, vec![0, 4, 8]);
        assert_eq!(ann.size(), 12);
        for field in ann.fields() {
            assert!(field.offset() + field.ty().size() <= ann.size());
        }
    }

    #[test]
    fn same_struct_name_in_two_modules() {
        let mut library = ModuleLibrary::new();
        let a = library.create("a").unwrap();
        let b = library.create("b").unwrap();
        library.register_struct(a, first_struct_annotation()).unwrap();
        library.register_struct(b, first_struct_annotation()).unwrap();

        let err = library.register_struct(a, first_struct_annotation()).unwrap_err();
        assert_eq!(err, BindError::duplicate_type("a", "FirstStruct"));
    }

    #[test]
    fn struct_enum_and_opaque_share_namespace() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        library.register_enum(m, numbers()).unwrap();
        let err = library.register_opaque::<LibraryHandle>(m, "Numbers").unwrap_err();
        match err {
            BindError::DuplicateName { scope, .. } => assert_eq!(scope, NameScope::Type),
            other => panic!("unexpected error: {other}"),
        }
        assert!(library.begin_struct(m, "Numbers", first_struct()).is_err());
    }

    #[test]
    fn enum_registered_twice_fails() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        library.register_enum(m, numbers()).unwrap();
        let err = library.register_enum(m, numbers()).unwrap_err();
        assert_eq!(err.kind(), BindErrorKind::DuplicateName);

        library.freeze(m).unwrap();
        let view = library.module(m).unwrap().view().unwrap();
        let e = view.get_enum("Numbers").unwrap();
        assert_eq!(e.value_of("one"), Ok(1));
        assert_eq!(e.name_of(1), Some("one"));
    }

    #[test]
    fn frozen_register_leaves_module_unchanged() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        library.register_enum(m, numbers()).unwrap();
        library.freeze(m).unwrap();
        let before = library.module(m).unwrap().clone();

        let err = library.register_struct(m, first_struct_annotation()).unwrap_err();
        assert_eq!(
            err,
            BindError::FrozenViolation {
                module: "m".to_string(),
                operation: "register struct"
            }
        );
        assert!(library.register_enum(m, numbers()).is_err());
        assert!(library.register_opaque::<LibraryHandle>(m, "Handle").is_err());
        assert!(library.begin_struct(m, "Other", first_struct()).is_err());
        assert!(library.begin_enum(m, "Other", describe::<i32>()).is_err());
        assert_eq!(&before, library.module(m).unwrap());
    }

    #[test]
    fn freeze_is_idempotent() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        library.freeze(m).unwrap();
        library.freeze(m).unwrap();
        assert!(library.is_frozen());
    }

    #[test]
    fn unbound_struct_field_is_rejected() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        let ann = StructAnnotation::new("Holder", holder()).with_field(FieldBinding::new(
            "inner",
            0,
            first_struct(),
            AccessMode::ReadWrite,
        ));
        let err = library.register_struct(m, ann.clone()).unwrap_err();
        assert_eq!(
            err,
            BindError::UnknownType {
                module: "m".to_string(),
                owner: "Holder".to_string(),
                member: "inner".to_string(),
                type_name: "FirstStruct".to_string(),
            }
        );
        assert!(library.module(m).unwrap().is_empty());

        library.register_struct(m, first_struct_annotation()).unwrap();
        library.register_struct(m, ann).unwrap();
    }

    #[test]
    fn field_types_resolve_through_dependencies() {
        let mut library = ModuleLibrary::new();
        let base = library.create("base").unwrap();
        let mid = library.create("mid").unwrap();
        let top = library.create("top").unwrap();
        library.add_dependency(top, mid).unwrap();
        library.add_dependency(mid, base).unwrap();
        library.register_struct(base, first_struct_annotation()).unwrap();

        assert!(library.is_bound(top, first_struct()).unwrap());
        assert!(!library.is_bound(base, first_enum()).unwrap());
        assert!(library.is_bound(base, describe::<f32>()).unwrap());
    }

    #[test]
    fn array_of_unbound_type_is_unbound() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        let arr = TypeRef::array_of(first_struct(), 2).unwrap();
        assert!(!library.is_bound(m, arr).unwrap());
        library.register_struct(m, first_struct_annotation()).unwrap();
        assert!(library.is_bound(m, arr).unwrap());
    }

    #[test]
    fn enum_fields_resolve_by_native_hash() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        let binding = EnumBinding::new("ScriptEnum", describe::<i32>())
            .with_native(first_enum())
            .with_value("Zero", 0);
        assert!(!library.is_bound(m, first_enum()).unwrap());
        library.register_enum(m, binding).unwrap();
        assert!(library.is_bound(m, first_enum()).unwrap());
    }

    #[test]
    fn opaque_fields_resolve() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        let handle = library.register_opaque::<LibraryHandle>(m, "LibraryHandle").unwrap();
        assert_eq!(handle.size(), std::mem::size_of::<LibraryHandle>());
        assert_eq!(handle.align(), std::mem::align_of::<LibraryHandle>());
        assert!(library.is_bound(m, handle).unwrap());

        let other = library.create("other").unwrap();
        assert!(!library.is_bound(other, handle).unwrap());
    }

    #[test]
    fn same_name_different_native_is_unbound() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        library.register_struct(m, first_struct_annotation()).unwrap();

        let wide = intern::<wide::FirstStruct>(|| {
            TypeDescriptor::structure::<wide::FirstStruct>("FirstStruct", true)
        });
        assert_eq!(wide.type_hash(), first_struct().type_hash());
        assert_ne!(wide.size(), first_struct().size());
        assert!(library.is_bound(m, first_struct()).unwrap());
        assert!(!library.is_bound(m, wide).unwrap());
        assert!(!library.is_bound(m, TypeRef::array_of(wide, 2).unwrap()).unwrap());
    }

    #[test]
    fn failed_create_with_builtin_adds_nothing() {
        let mut library = ModuleLibrary::new();
        library.create("m").unwrap();
        assert_eq!(
            library.create_with_builtin("m").unwrap_err(),
            BindError::duplicate_module("m")
        );
        assert_eq!(library.len(), 1);
        assert!(library.builtin().is_none());

        assert_eq!(
            library.create_with_builtin("$").unwrap_err(),
            BindError::duplicate_module("$")
        );
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn opaque_with_config_skips_bound_struct_names() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        library.register_struct(m, first_struct_annotation()).unwrap();

        let skipped = library
            .register_opaque_with::<LibraryHandle, _>(m, "FirstStruct", &DefaultConfig)
            .unwrap();
        assert!(skipped.is_none());
        assert_eq!(library.module(m).unwrap().len(), 1);
    }

    #[test]
    fn capability_mismatch_on_register() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        let ann = first_struct_annotation()
            .with_capabilities(Capabilities::LOCAL_ONLY | Capabilities::COPYABLE);
        assert_eq!(
            library.register_struct(m, ann).unwrap_err().kind(),
            BindErrorKind::CapabilityMismatch
        );
    }

    #[test]
    fn begin_enum_requires_integer_underlying() {
        let mut library = ModuleLibrary::new();
        let m = library.create("m").unwrap();
        assert_eq!(
            library.begin_enum(m, "E", describe::<f32>()).unwrap_err().kind(),
            BindErrorKind::InvalidLayout
        );
    }

    #[test]
    fn library_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModuleLibrary>();
    }
}
