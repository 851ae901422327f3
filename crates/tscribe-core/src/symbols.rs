//! Deferred naming of declarations.
//!
//! Every declaration and every reference to it carries a [`Symbol`] rather
//! than a name. Names are only fixed once, after all passes ran, by
//! [`SymbolTable::resolve_names`]. That call consumes the table, so once
//! names exist no new symbols can be allocated.

use std::collections::{BTreeMap, HashMap};

use crate::error::CompileError;
use crate::naming;
use crate::settings::NamingPolicy;

/// Identity of a not-yet-named declaration
///
/// Two symbols are the same declaration exactly when they are equal; the id
/// is only meaningful for the table that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

/// What a symbol was allocated for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolOrigin {
    /// A source entity, optionally with a rendered suffix (`Union`, `Client`)
    Entity { name: String, suffix: String },
    /// A compiler generated declaration with no source entity
    Synthetic { name: String },
}

impl SymbolOrigin {
    fn temporary_name(&self) -> String {
        match self {
            SymbolOrigin::Entity { name, suffix } => {
                format!("${}${}$", name.replace('.', "$"), suffix)
            }
            SymbolOrigin::Synthetic { name } => name.clone(),
        }
    }

    /// Source entity with its suffix, or the generated name
    fn describe(&self) -> String {
        match self {
            SymbolOrigin::Entity { name, suffix } => format!("{}{}", name, suffix),
            SymbolOrigin::Synthetic { name } => format!("{} (generated)", name),
        }
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    origins: Vec<SymbolOrigin>,
    index: HashMap<SymbolOrigin, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, origin: SymbolOrigin) -> Symbol {
        if let Some(symbol) = self.index.get(&origin) {
            return *symbol;
        }
        let symbol = Symbol(self.origins.len() as u32);
        tracing::trace!("allocated symbol {:?} for {}", symbol, origin.temporary_name());
        self.origins.push(origin.clone());
        self.index.insert(origin, symbol);
        symbol
    }

    /// Symbol of a source entity; the same entity always yields the same symbol
    pub fn get_symbol(&mut self, entity: &str) -> Symbol {
        self.get_symbol_with_suffix(entity, "")
    }

    pub fn get_symbol_with_suffix(&mut self, entity: &str, suffix: &str) -> Symbol {
        self.intern(SymbolOrigin::Entity {
            name: entity.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Look up an entity symbol without allocating one
    pub fn find_symbol(&self, entity: &str, suffix: &str) -> Option<Symbol> {
        self.index
            .get(&SymbolOrigin::Entity {
                name: entity.to_string(),
                suffix: suffix.to_string(),
            })
            .copied()
    }

    /// Symbol of a compiler generated declaration, keyed by `name + suffix`
    pub fn get_synthetic_symbol(&mut self, name: &str, suffix: Option<&str>) -> Symbol {
        let full = format!("{}{}", name, suffix.unwrap_or(""));
        self.intern(SymbolOrigin::Synthetic { name: full })
    }

    /// Symbol with the same origin and an additional rendered suffix
    pub fn add_suffix_to_symbol(&mut self, symbol: Symbol, suffix: &str) -> Symbol {
        match self.origin(symbol).cloned() {
            Some(SymbolOrigin::Entity {
                name,
                suffix: existing,
            }) => self.get_symbol_with_suffix(&name, &format!("{}{}", existing, suffix)),
            Some(SymbolOrigin::Synthetic { name }) => {
                self.get_synthetic_symbol(&name, Some(suffix))
            }
            None => self.get_synthetic_symbol(&format!("$unknown{}$", symbol.0), Some(suffix)),
        }
    }

    pub fn origin(&self, symbol: Symbol) -> Option<&SymbolOrigin> {
        self.origins.get(symbol.0 as usize)
    }

    /// Source entity a symbol stands for, whatever its suffix
    pub fn entity_of(&self, symbol: Symbol) -> Option<&str> {
        match self.origin(symbol)? {
            SymbolOrigin::Entity { name, .. } => Some(name),
            SymbolOrigin::Synthetic { .. } => None,
        }
    }

    /// Placeholder used in logs before names are resolved
    pub fn temporary_name(&self, symbol: Symbol) -> String {
        self.origin(symbol)
            .map(SymbolOrigin::temporary_name)
            .unwrap_or_else(|| format!("$unknown{}$", symbol.0))
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Fix the final name of every symbol.
    ///
    /// Entity symbols go through the naming policy and get their suffix
    /// appended; synthetic symbols keep their name. Two distinct entity
    /// symbols resolving to the same name are a fatal conflict.
    pub fn resolve_names(self, policy: &NamingPolicy) -> Result<ResolvedSymbols, CompileError> {
        let mut names = Vec::with_capacity(self.origins.len());
        let mut claimed: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for origin in &self.origins {
            let full_name = match origin {
                SymbolOrigin::Entity { name, suffix } => {
                    let full = format!("{}{}", naming::apply_policy(name, policy), suffix);
                    claimed
                        .entry(full.clone())
                        .or_default()
                        .push(format!("{}{}", name, suffix));
                    full
                }
                SymbolOrigin::Synthetic { name } => name.clone(),
            };
            names.push(ResolvedName::from_full_name(&full_name));
        }

        if let Some((name, entities)) = claimed.into_iter().find(|(_, e)| e.len() > 1) {
            tracing::error!(
                "Multiple entities are mapped to '{}' name: {}",
                name,
                entities.join(", ")
            );
            return Err(CompileError::NameConflict { name, entities });
        }

        tracing::debug!("resolved {} symbol names", names.len());
        Ok(ResolvedSymbols {
            names,
            origins: self.origins,
        })
    }
}

/// Final name of a symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub namespace: Option<String>,
    pub simple: String,
}

impl ResolvedName {
    fn from_full_name(full_name: &str) -> Self {
        let (namespace, simple) = naming::split_namespace(full_name);
        Self {
            namespace: namespace.map(str::to_string),
            simple: simple.to_string(),
        }
    }

    /// Name used at reference sites (`ns.Simple` or `Simple`)
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}.{}", namespace, self.simple),
            None => self.simple.clone(),
        }
    }
}

/// Read-only view of the symbol table after name resolution
#[derive(Debug, Clone)]
pub struct ResolvedSymbols {
    names: Vec<ResolvedName>,
    origins: Vec<SymbolOrigin>,
}

impl ResolvedSymbols {
    pub fn name(&self, symbol: Symbol) -> Option<&ResolvedName> {
        self.names.get(symbol.0 as usize)
    }

    pub fn full_name(&self, symbol: Symbol) -> Option<String> {
        self.name(symbol).map(ResolvedName::full_name)
    }

    pub fn origin(&self, symbol: Symbol) -> Option<&SymbolOrigin> {
        self.origins.get(symbol.0 as usize)
    }

    /// Fail when two distinct declared symbols got the same name.
    ///
    /// Generated names are not checked by [`SymbolTable::resolve_names`]
    /// since most synthetic symbols are never declared; here only the
    /// symbols that end up as declarations take part.
    pub fn check_unique<I>(&self, declared: I) -> Result<(), CompileError>
    where
        I: IntoIterator<Item = Symbol>,
    {
        let mut claimed: BTreeMap<String, Vec<Symbol>> = BTreeMap::new();
        for symbol in declared {
            if let Some(name) = self.full_name(symbol) {
                let owners = claimed.entry(name).or_default();
                if !owners.contains(&symbol) {
                    owners.push(symbol);
                }
            }
        }
        let Some((name, mut owners)) = claimed.into_iter().find(|(_, owners)| owners.len() > 1)
        else {
            return Ok(());
        };
        owners.sort();
        let entities: Vec<String> = owners
            .iter()
            .filter_map(|symbol| self.origin(*symbol))
            .map(SymbolOrigin::describe)
            .collect();
        tracing::error!(
            "Multiple declarations are named '{}': {}",
            name,
            entities.join(", ")
        );
        Err(CompileError::NameConflict { name, entities })
    }
}
