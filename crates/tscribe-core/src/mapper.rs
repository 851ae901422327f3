//! Source type -> target type expression mapping
//!
//! A chain of independent resolvers. Each one recognises some shapes of
//! source type; the first that recognises a type decides the result, later
//! resolvers are not consulted. Custom resolvers can be registered ahead of
//! the built-in ones.

use std::collections::{BTreeMap, HashSet};

use crate::settings::{KnownTypes, Settings};
use crate::source::{SourceGraph, SourceType};
use crate::symbols::SymbolTable;
use crate::types::{PrimitiveKind, TypeExpr};

/// A source type no resolver could map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// Rendering of the innermost unmappable source type
    pub source: String,
}

pub type MapResult = Result<TypeExpr, Unresolved>;

/// Mutable state a resolver may touch while mapping
pub struct MapContext<'a> {
    pub symbols: &'a mut SymbolTable,
}

/// One strategy of the mapping chain
pub trait TypeResolver: Send + Sync {
    /// Human-readable name, for logs
    fn name(&self) -> &str;

    /// `None` when the shape is not recognised; `Some(Err(_))` when it is
    /// recognised but a component cannot be mapped
    fn resolve(
        &self,
        source: &SourceType,
        mapper: &TypeMapper,
        ctx: &mut MapContext<'_>,
    ) -> Option<MapResult>;
}

pub struct TypeMapper {
    resolvers: Vec<Box<dyn TypeResolver>>,
}

impl TypeMapper {
    /// Mapper with no resolvers; everything is unresolved
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Built-in chain for the given settings and declared types
    pub fn new(settings: &Settings, graph: &SourceGraph) -> Self {
        let mut mapper = Self::empty();
        mapper.register(Box::new(CustomMappingResolver::new(
            settings.custom_type_mappings.clone(),
        )));
        mapper.register(Box::new(PrimitiveResolver::new(&settings.known_types)));
        mapper.register(Box::new(OptionalResolver::new(&settings.known_types)));
        mapper.register(Box::new(WrapperResolver::new(&settings.known_types)));
        mapper.register(Box::new(ContainerResolver::new(&settings.known_types)));
        mapper.register(Box::new(ArrayResolver));
        mapper.register(Box::new(VariableResolver));
        mapper.register(Box::new(UnionResolver));
        mapper.register(Box::new(DeclaredTypeResolver::from_graph(graph)));
        mapper
    }

    /// Append a resolver at the end of the chain
    pub fn register(&mut self, resolver: Box<dyn TypeResolver>) {
        self.resolvers.push(resolver);
    }

    /// Insert a resolver ahead of every existing one
    pub fn register_first(&mut self, resolver: Box<dyn TypeResolver>) {
        self.resolvers.insert(0, resolver);
    }

    pub fn map_type(&self, source: &SourceType, ctx: &mut MapContext<'_>) -> MapResult {
        for resolver in &self.resolvers {
            if let Some(result) = resolver.resolve(source, self, ctx) {
                tracing::trace!("{} resolved '{}'", resolver.name(), source);
                return result;
            }
        }
        tracing::trace!("no resolver handled '{}'", source);
        Err(Unresolved {
            source: source.to_string(),
        })
    }

    /// Map each type argument; absent arguments (raw types) become `any`
    fn map_arg(
        &self,
        args: &[SourceType],
        index: usize,
        ctx: &mut MapContext<'_>,
    ) -> MapResult {
        match args.get(index) {
            Some(arg) => self.map_type(arg, ctx),
            None => Ok(TypeExpr::Any),
        }
    }
}

fn to_set(names: &[String]) -> HashSet<String> {
    names.iter().cloned().collect()
}

/// Configured source name -> verbatim target type
pub struct CustomMappingResolver {
    mappings: BTreeMap<String, String>,
}

impl CustomMappingResolver {
    pub fn new(mappings: BTreeMap<String, String>) -> Self {
        Self { mappings }
    }
}

impl TypeResolver for CustomMappingResolver {
    fn name(&self) -> &str {
        "custom"
    }

    fn resolve(
        &self,
        source: &SourceType,
        _: &TypeMapper,
        _: &mut MapContext<'_>,
    ) -> Option<MapResult> {
        let target = self.mappings.get(source.name()?)?;
        Some(Ok(TypeExpr::Verbatim(target.clone())))
    }
}

/// Strings, numbers, booleans, dates, voids and `any`, boxed or not
pub struct PrimitiveResolver {
    strings: HashSet<String>,
    numbers: HashSet<String>,
    booleans: HashSet<String>,
    dates: HashSet<String>,
    voids: HashSet<String>,
    any: HashSet<String>,
}

impl PrimitiveResolver {
    pub fn new(known: &KnownTypes) -> Self {
        Self {
            strings: to_set(&known.strings),
            numbers: to_set(&known.numbers),
            booleans: to_set(&known.booleans),
            dates: to_set(&known.dates),
            voids: to_set(&known.voids),
            any: to_set(&known.any),
        }
    }
}

impl TypeResolver for PrimitiveResolver {
    fn name(&self) -> &str {
        "primitive"
    }

    fn resolve(
        &self,
        source: &SourceType,
        _: &TypeMapper,
        _: &mut MapContext<'_>,
    ) -> Option<MapResult> {
        let name = source.name()?;
        let kind = if self.strings.contains(name) {
            PrimitiveKind::String
        } else if self.numbers.contains(name) {
            PrimitiveKind::Number
        } else if self.booleans.contains(name) {
            PrimitiveKind::Boolean
        } else if self.dates.contains(name) {
            PrimitiveKind::Temporal
        } else if self.voids.contains(name) {
            PrimitiveKind::Void
        } else if self.any.contains(name) {
            return Some(Ok(TypeExpr::Any));
        } else {
            return None;
        };
        Some(Ok(TypeExpr::Primitive(kind)))
    }
}

/// `Optional<T>` wrappers and nullable types
pub struct OptionalResolver {
    optionals: HashSet<String>,
}

impl OptionalResolver {
    pub fn new(known: &KnownTypes) -> Self {
        Self {
            optionals: to_set(&known.optionals),
        }
    }
}

impl TypeResolver for OptionalResolver {
    fn name(&self) -> &str {
        "optional"
    }

    fn resolve(
        &self,
        source: &SourceType,
        mapper: &TypeMapper,
        ctx: &mut MapContext<'_>,
    ) -> Option<MapResult> {
        match source {
            SourceType::Nullable { inner } => {
                Some(mapper.map_type(inner, ctx).map(TypeExpr::optional))
            }
            SourceType::Named { name, args } if self.optionals.contains(name) => {
                Some(mapper.map_arg(args, 0, ctx).map(TypeExpr::optional))
            }
            _ => None,
        }
    }
}

/// Single-argument containers that serialize as their content
pub struct WrapperResolver {
    wrappers: HashSet<String>,
}

impl WrapperResolver {
    pub fn new(known: &KnownTypes) -> Self {
        Self {
            wrappers: to_set(&known.wrappers),
        }
    }
}

impl TypeResolver for WrapperResolver {
    fn name(&self) -> &str {
        "wrapper"
    }

    fn resolve(
        &self,
        source: &SourceType,
        mapper: &TypeMapper,
        ctx: &mut MapContext<'_>,
    ) -> Option<MapResult> {
        match source {
            SourceType::Named { name, args } if self.wrappers.contains(name) => {
                Some(mapper.map_arg(args, 0, ctx))
            }
            _ => None,
        }
    }
}

/// Sequences become arrays, maps become string-indexed maps
pub struct ContainerResolver {
    sequences: HashSet<String>,
    maps: HashSet<String>,
}

impl ContainerResolver {
    pub fn new(known: &KnownTypes) -> Self {
        Self {
            sequences: to_set(&known.sequences),
            maps: to_set(&known.maps),
        }
    }
}

impl TypeResolver for ContainerResolver {
    fn name(&self) -> &str {
        "container"
    }

    fn resolve(
        &self,
        source: &SourceType,
        mapper: &TypeMapper,
        ctx: &mut MapContext<'_>,
    ) -> Option<MapResult> {
        let SourceType::Named { name, args } = source else {
            return None;
        };
        if self.sequences.contains(name) {
            Some(mapper.map_arg(args, 0, ctx).map(TypeExpr::array))
        } else if self.maps.contains(name) {
            Some(mapper.map_arg(args, 1, ctx).map(TypeExpr::string_map))
        } else {
            None
        }
    }
}

pub struct ArrayResolver;

impl TypeResolver for ArrayResolver {
    fn name(&self) -> &str {
        "array"
    }

    fn resolve(
        &self,
        source: &SourceType,
        mapper: &TypeMapper,
        ctx: &mut MapContext<'_>,
    ) -> Option<MapResult> {
        match source {
            SourceType::Array { element } => {
                Some(mapper.map_type(element, ctx).map(TypeExpr::array))
            }
            _ => None,
        }
    }
}

pub struct VariableResolver;

impl TypeResolver for VariableResolver {
    fn name(&self) -> &str {
        "variable"
    }

    fn resolve(
        &self,
        source: &SourceType,
        _: &TypeMapper,
        _: &mut MapContext<'_>,
    ) -> Option<MapResult> {
        match source {
            SourceType::Variable { name } => Some(Ok(TypeExpr::GenericVariable(name.clone()))),
            _ => None,
        }
    }
}

pub struct UnionResolver;

impl TypeResolver for UnionResolver {
    fn name(&self) -> &str {
        "union"
    }

    fn resolve(
        &self,
        source: &SourceType,
        mapper: &TypeMapper,
        ctx: &mut MapContext<'_>,
    ) -> Option<MapResult> {
        let SourceType::Union { types } = source else {
            return None;
        };
        let mapped: Result<Vec<TypeExpr>, Unresolved> =
            types.iter().map(|ty| mapper.map_type(ty, ctx)).collect();
        Some(mapped.map(TypeExpr::Union))
    }
}

/// Classes, interfaces and enums declared in the source graph
pub struct DeclaredTypeResolver {
    declared: HashSet<String>,
}

impl DeclaredTypeResolver {
    pub fn from_graph(graph: &SourceGraph) -> Self {
        let declared = graph
            .classes
            .iter()
            .map(|c| c.name.clone())
            .chain(graph.enums.iter().map(|e| e.name.clone()))
            .collect();
        Self { declared }
    }
}

impl TypeResolver for DeclaredTypeResolver {
    fn name(&self) -> &str {
        "declared"
    }

    fn resolve(
        &self,
        source: &SourceType,
        mapper: &TypeMapper,
        ctx: &mut MapContext<'_>,
    ) -> Option<MapResult> {
        let SourceType::Named { name, args } = source else {
            return None;
        };
        if !self.declared.contains(name) {
            return None;
        }
        let mapped: Result<Vec<TypeExpr>, Unresolved> =
            args.iter().map(|arg| mapper.map_type(arg, ctx)).collect();
        Some(mapped.map(|type_args| {
            let symbol = ctx.symbols.get_symbol(name);
            TypeExpr::generic_reference(symbol, type_args)
        }))
    }
}
