//! Linker - flattens a module and its dependencies into one symbol table.
//!
//! ## Algorithm
//!
//! 1. Walk the dependency graph depth-first from the root, visiting each
//!    module's dependencies in declaration order before the module itself
//!    (post-order). Shared dependencies are visited once.
//! 2. Publish the symbols of each module in that load order, each module's
//!    symbols in registration order.
//! 3. A name published twice is a resolution error. With
//!    [`LinkOptions::allow_shadowing`] the first publication wins instead.
//!
//! ## Example
//!
//! ```text
//! app ──▶ math ──▶ $
//!   └───▶ io ────▶ $
//!
//! load order: $, math, io, app
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use scriptbind_core::{BindError, BindResult, TypeHash, TypeRef};
use tracing::{debug, trace, warn};

use crate::library::ModuleLibrary;
use crate::module::{ModuleId, ModuleRegistry, SymbolRef};

/// Linker settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// Let the first-published symbol win on a name collision instead of failing.
    pub allow_shadowing: bool,
}

/// A symbol in the flattened namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol<'a> {
    module: &'a str,
    item: SymbolRef<'a>,
}

impl<'a> Symbol<'a> {
    pub fn name(&self) -> &'a str {
        self.item.name()
    }

    /// Name of the module that published this symbol.
    pub fn module(&self) -> &'a str {
        self.module
    }

    pub fn item(&self) -> SymbolRef<'a> {
        self.item
    }
}

/// The flattened namespace visible to scripts.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable<'a> {
    modules: Vec<&'a ModuleRegistry>,
    symbols: Vec<Symbol<'a>>,
    by_name: FxHashMap<&'a str, usize>,
    by_hash: FxHashMap<TypeHash, usize>,
    by_native: FxHashMap<TypeRef, usize>,
}

impl<'a> SymbolTable<'a> {
    /// Modules in load order, dependencies first.
    pub fn modules(&self) -> impl Iterator<Item = &'a ModuleRegistry> + '_ {
        self.modules.iter().copied()
    }

    /// Module names in load order.
    pub fn load_order(&self) -> Vec<&'a str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol<'a>> {
        self.by_name.get(name).map(|&index| &self.symbols[index])
    }

    /// Find the first symbol published under the script type hash `hash`.
    pub fn by_hash(&self, hash: TypeHash) -> Option<&Symbol<'a>> {
        self.by_hash.get(&hash).map(|&index| &self.symbols[index])
    }

    /// Find the symbol backed by the native descriptor `ty`, e.g. to resolve
    /// a field type. Only the exact descriptor matches.
    pub fn by_type(&self, ty: TypeRef) -> Option<&Symbol<'a>> {
        self.by_native.get(&ty).map(|&index| &self.symbols[index])
    }

    /// Symbols in publication order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol<'a>> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn publish(&mut self, symbol: Symbol<'a>, options: LinkOptions) -> BindResult<()> {
        let name = symbol.name();
        if let Some(&index) = self.by_name.get(name) {
            let first = self.symbols[index].module;
            if !options.allow_shadowing {
                return Err(BindError::ResolutionConflict {
                    symbol: name.to_string(),
                    first: first.to_string(),
                    second: symbol.module.to_string(),
                });
            }
            warn!(symbol = name, first, second = symbol.module, "symbol shadowed");
            return Ok(());
        }

        trace!(symbol = name, module = symbol.module, "publish");
        let index = self.symbols.len();
        self.by_name.insert(name, index);
        self.by_hash.entry(symbol.item.type_hash()).or_insert(index);
        if let Some(native) = symbol.item.native() {
            self.by_native.entry(native).or_insert(index);
        }
        self.symbols.push(symbol);
        Ok(())
    }
}

/// Resolves module dependencies into a [`SymbolTable`].
#[derive(Debug, Clone, Copy)]
pub struct Linker<'a> {
    library: &'a ModuleLibrary,
    options: LinkOptions,
}

impl<'a> Linker<'a> {
    pub fn new(library: &'a ModuleLibrary) -> Self {
        Self {
            library,
            options: LinkOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LinkOptions) -> Self {
        self.options = options;
        self
    }

    /// Link `root` and everything it depends on.
    ///
    /// Every reachable module must be frozen.
    #[tracing::instrument(level = "debug", skip_all, fields(root = %root))]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn link(&self, root: ModuleId) -> BindResult<SymbolTable<'a>> {
        let order = self.load_order(root)?;
        let mut table = SymbolTable::default();
        for module in order {
            let view = module.view()?;
            for item in view.symbols() {
                table.publish(
                    Symbol {
                        module: view.name(),
                        item,
                    },
                    self.options,
                )?;
            }
            table.modules.push(module);
        }
        debug!(modules = table.modules.len(), symbols = table.len(), "linked");
        Ok(table)
    }

    /// Modules reachable from `root`, dependencies first.
    pub fn load_order(&self, root: ModuleId) -> BindResult<Vec<&'a ModuleRegistry>> {
        let mut visited = FxHashSet::default();
        let mut order = Vec::new();
        self.visit(root, &mut visited, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        id: ModuleId,
        visited: &mut FxHashSet<ModuleId>,
        order: &mut Vec<&'a ModuleRegistry>,
    ) -> BindResult<()> {
        if !visited.insert(id) {
            return Ok(());
        }
        let module = self.library.module(id)?;
        if !module.is_frozen() {
            return Err(BindError::NotFrozen {
                module: module.name().to_string(),
                operation: "link",
            });
        }
        for &dependency in module.dependency_ids() {
            self.visit(dependency, visited, order)?;
        }
        order.push(module);
        Ok(())
    }
}
