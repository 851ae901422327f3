//! Initial target model from the source graph.

use std::collections::{HashMap, HashSet};

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::diagnostics::{Diagnostics, Warning, WarningCategory, WarningLocation};
use crate::error::CompileError;
use crate::ir::{
    DataDeclaration, DeclarationCategory, EnumDeclaration, EnumKind, EnumMember,
    EnumRepresentation, Modifiers, Property, TargetModel,
};
use crate::mapper::{MapContext, TypeMapper};
use crate::settings::Settings;
use crate::source::{SourceClass, SourceEnum, SourceGraph, SourceProperty, SourceType};
use crate::symbols::SymbolTable;
use crate::types::{LiteralValue, TypeExpr};

/// Direct subtypes and implementers of every source class, by entity name
#[derive(Debug, Clone, Default)]
pub struct AncestorIndex {
    children: HashMap<String, Vec<String>>,
}

impl AncestorIndex {
    pub fn from_graph(graph: &SourceGraph) -> Self {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for class in &graph.classes {
            let supertypes = class.parent.iter().chain(class.interfaces.iter());
            for supertype in supertypes.filter_map(SourceType::name) {
                let entry = children.entry(supertype.to_string()).or_default();
                if !entry.contains(&class.name) {
                    entry.push(class.name.clone());
                }
            }
        }
        Self { children }
    }

    pub fn children(&self, entity: &str) -> &[String] {
        self.children.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `entity` followed by all its transitive descendants, depth first.
    /// Each entity appears once even in diamond or cyclic hierarchies.
    pub fn self_and_descendants(&self, entity: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut ordered = Vec::new();
        let mut stack = vec![entity.to_string()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for child in self.children(&current).iter().rev() {
                if !visited.contains(child) {
                    stack.push(child.clone());
                }
            }
            ordered.push(current);
        }
        ordered
    }
}

/// Pull-properties relation between classes
#[derive(Debug, Default)]
struct PullGraph<'a> {
    graph: DiGraph<&'a str, &'a str>,
    indices: HashMap<&'a str, NodeIndex>,
}

impl<'a> PullGraph<'a> {
    fn from_graph(source: &'a SourceGraph) -> Self {
        let mut pulls = Self::default();
        for class in &source.classes {
            let index = pulls.graph.add_node(class.name.as_str());
            pulls.indices.insert(class.name.as_str(), index);
        }
        for class in &source.classes {
            for property in class.properties.iter().filter(|p| p.pull.is_some()) {
                if let Some(target) = pulled_class_name(&property.ty) {
                    pulls.add_pull(&class.name, target, &property.name);
                }
            }
        }
        pulls
    }

    fn add_pull(&mut self, from: &str, to: &str, property: &'a str) {
        if let (Some(&from_idx), Some(&to_idx)) = (self.indices.get(from), self.indices.get(to)) {
            self.graph.add_edge(from_idx, to_idx, property);
        }
    }

    fn check_acyclic(&self) -> Result<(), CompileError> {
        let Err(cycle) = toposort(&self.graph, None) else {
            return Ok(());
        };
        let start = cycle.node_id();
        let component = kosaraju_scc(&self.graph)
            .into_iter()
            .find(|scc| scc.contains(&start))
            .unwrap_or_else(|| vec![start]);

        // Walk the cycle from the reported node to name it in order
        let mut names = vec![self.graph[start].to_string()];
        let mut property = String::new();
        let mut current = start;
        let mut seen = HashSet::from([start]);
        while let Some(edge) = self
            .graph
            .edges(current)
            .find(|e| component.contains(&e.target()))
        {
            if property.is_empty() {
                property = edge.weight().to_string();
            }
            names.push(self.graph[edge.target()].to_string());
            if !seen.insert(edge.target()) {
                break;
            }
            current = edge.target();
        }

        Err(CompileError::PullPropertiesCycle {
            declaration: self.graph[start].to_string(),
            property,
            cycle: names,
        })
    }
}

fn pulled_class_name(ty: &SourceType) -> Option<&str> {
    match ty {
        SourceType::Nullable { inner } => pulled_class_name(inner),
        other => other.name(),
    }
}

/// Walks the source graph once and produces the initial model
pub struct DeclarationBuilder<'a> {
    graph: &'a SourceGraph,
    settings: &'a Settings,
    mapper: &'a TypeMapper,
    index: AncestorIndex,
}

impl<'a> DeclarationBuilder<'a> {
    pub fn new(graph: &'a SourceGraph, settings: &'a Settings, mapper: &'a TypeMapper) -> Self {
        Self {
            graph,
            settings,
            mapper,
            index: AncestorIndex::from_graph(graph),
        }
    }

    #[tracing::instrument(
        skip_all,
        fields(classes = self.graph.classes.len(), enums = self.graph.enums.len())
    )]
    pub fn build(
        self,
        symbols: &mut SymbolTable,
        diagnostics: &mut Diagnostics,
    ) -> Result<(TargetModel, AncestorIndex), CompileError> {
        PullGraph::from_graph(self.graph).check_acyclic()?;

        let mut model = TargetModel::default();
        for class in &self.graph.classes {
            model.data.push(self.build_class(class, symbols, diagnostics));
        }
        for source_enum in &self.graph.enums {
            model.enums.push(self.build_enum(source_enum, symbols));
        }
        tracing::debug!(
            "built {} data and {} enum declarations",
            model.data.len(),
            model.enums.len()
        );
        Ok((model, self.index))
    }

    fn is_class_like(&self, class: &SourceClass) -> bool {
        self.settings.classes_as_classes() && !class.is_interface()
    }

    fn build_class(
        &self,
        class: &SourceClass,
        symbols: &mut SymbolTable,
        diagnostics: &mut Diagnostics,
    ) -> DataDeclaration {
        let mut declaration =
            DataDeclaration::new(symbols.get_symbol(&class.name), DeclarationCategory::Data);
        declaration.origin = Some(class.name.clone());
        declaration.is_class = self.is_class_like(class);
        declaration.type_parameters = class.type_parameters.clone();
        declaration.comments = class.comments.clone();
        declaration.discriminant_property = class.discriminant_property.clone();
        declaration.discriminant_literal = class.discriminant_literal.clone();
        declaration.tagged_union_members = class.tagged_union_members.clone();

        if let Some(parent) = &class.parent {
            if let Some(mapped) = self.map_supertype(parent, symbols) {
                let parent_is_class = parent
                    .name()
                    .and_then(|name| self.graph.find_class(name))
                    .is_some_and(|p| self.is_class_like(p));
                if declaration.is_class && !parent_is_class {
                    declaration.interfaces.push(mapped);
                } else {
                    declaration.parent = Some(mapped);
                }
            }
        }
        for interface in &class.interfaces {
            if let Some(mapped) = self.map_supertype(interface, symbols) {
                declaration.interfaces.push(mapped);
            }
        }

        for property in &class.properties {
            self.build_property(
                class,
                property,
                "",
                "",
                symbols,
                diagnostics,
                &mut declaration.properties,
            );
        }

        if let Some(discriminant) = &class.discriminant_property {
            if declaration.property(discriminant).is_none() {
                let literals: Vec<String> = self
                    .index
                    .self_and_descendants(&class.name)
                    .iter()
                    .filter_map(|entity| self.graph.find_class(entity))
                    .filter_map(|c| c.discriminant_literal.clone())
                    .fold(Vec::new(), |mut acc, literal| {
                        if !acc.contains(&literal) {
                            acc.push(literal);
                        }
                        acc
                    });
                let ty = if literals.is_empty() {
                    TypeExpr::string()
                } else {
                    TypeExpr::literal_union(literals)
                };
                let modifiers = Modifiers {
                    readonly: self.settings.declare_properties_as_readonly,
                    is_static: false,
                };
                let property = Property::new(discriminant.clone(), ty)
                    .own()
                    .with_modifiers(modifiers);
                declaration.properties.insert(0, property);
            }
        }

        declaration
    }

    /// Supertypes that degenerate to `any` (or cannot be mapped) are dropped
    fn map_supertype(&self, ty: &SourceType, symbols: &mut SymbolTable) -> Option<TypeExpr> {
        let mut ctx = MapContext { symbols };
        match self.mapper.map_type(ty, &mut ctx) {
            Ok(TypeExpr::Any) | Err(_) => {
                tracing::trace!("dropping supertype '{}'", ty);
                None
            }
            Ok(mapped) => Some(mapped),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_property(
        &self,
        class: &SourceClass,
        property: &SourceProperty,
        prefix: &str,
        suffix: &str,
        symbols: &mut SymbolTable,
        diagnostics: &mut Diagnostics,
        properties: &mut Vec<Property>,
    ) {
        if let Some(pull) = &property.pull {
            let target =
                pulled_class_name(&property.ty).and_then(|name| self.graph.find_class(name));
            let Some(target) = target else {
                diagnostics.warn(
                    Warning::new(
                        WarningCategory::MissingDeclaration,
                        format!(
                            "Cannot pull properties of '{}' into '{}.{}': type is not declared",
                            property.ty, class.name, property.name
                        ),
                    )
                    .at(WarningLocation::new()
                        .in_declaration(&class.name)
                        .in_property(&property.name)),
                );
                return;
            };
            let inner_prefix = format!("{}{}", prefix, pull.prefix);
            let inner_suffix = format!("{}{}", pull.suffix, suffix);
            for pulled in &target.properties {
                self.build_property(
                    target,
                    pulled,
                    &inner_prefix,
                    &inner_suffix,
                    symbols,
                    diagnostics,
                    properties,
                );
            }
            return;
        }

        let mut ctx = MapContext { symbols };
        let ty = match self.mapper.map_type(&property.ty, &mut ctx) {
            Ok(ty) => ty,
            Err(unresolved) => {
                diagnostics.warn(Warning::unresolved_type(
                    &unresolved.source,
                    &class.name,
                    &property.name,
                ));
                TypeExpr::Any
            }
        };
        let ty = if property.optional { ty.optional() } else { ty };
        let modifiers = Modifiers {
            readonly: self.settings.declare_properties_as_readonly,
            is_static: false,
        };
        properties.push(
            Property::new(format!("{}{}{}", prefix, property.name, suffix), ty)
                .with_modifiers(modifiers)
                .with_comments(property.comments.clone()),
        );
    }

    fn build_enum(&self, source_enum: &SourceEnum, symbols: &mut SymbolTable) -> EnumDeclaration {
        let number_based = !source_enum.members.is_empty()
            && source_enum
                .members
                .iter()
                .all(|m| matches!(m.value, Some(LiteralValue::Number(_))));
        let kind = if number_based {
            EnumKind::NumberBased
        } else {
            EnumKind::StringBased
        };
        let members = source_enum
            .members
            .iter()
            .map(|member| EnumMember {
                name: member.name.clone(),
                value: match (kind, &member.value) {
                    (EnumKind::StringBased, Some(LiteralValue::String(s))) => {
                        Some(LiteralValue::String(s.clone()))
                    }
                    (EnumKind::StringBased, _) => Some(LiteralValue::String(member.name.clone())),
                    (EnumKind::NumberBased, value) => value.clone(),
                },
                comments: member.comments.clone(),
            })
            .collect();
        EnumDeclaration {
            origin: source_enum.name.clone(),
            symbol: symbols.get_symbol(&source_enum.name),
            kind,
            members,
            representation: EnumRepresentation::Pending,
            comments: source_enum.comments.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceEnumMember;

    fn build(
        graph: &SourceGraph,
        settings: &Settings,
    ) -> (TargetModel, SymbolTable, Diagnostics) {
        let mapper = TypeMapper::new(settings, graph);
        let mut symbols = SymbolTable::new();
        let mut diagnostics = Diagnostics::new();
        let (model, _) = DeclarationBuilder::new(graph, settings, &mapper)
            .build(&mut symbols, &mut diagnostics)
            .unwrap();
        (model, symbols, diagnostics)
    }

    #[test]
    fn test_self_reference_terminates() {
        let graph = SourceGraph::new().with_class(
            SourceClass::new("A").property(SourceProperty::new("field", SourceType::named("A"))),
        );
        let (model, mut symbols, _) = build(&graph, &Settings::default());
        let a = symbols.get_symbol("A");
        assert_eq!(model.data.len(), 1);
        assert_eq!(model.data[0].properties[0].ty, TypeExpr::reference(a));
    }

    #[test]
    fn test_unresolved_property_becomes_any_with_warning() {
        let graph = SourceGraph::new().with_class(
            SourceClass::new("com.example.Person")
                .property(SourceProperty::new("photo", SourceType::named("java.io.File"))),
        );
        let (model, _, diagnostics) = build(&graph, &Settings::default());
        assert_eq!(model.data[0].properties[0].ty, TypeExpr::Any);
        assert_eq!(diagnostics.count(), 1);
        let warning = &diagnostics.warnings()[0];
        assert_eq!(warning.category, WarningCategory::UnresolvedType);
        assert_eq!(warning.location.declaration.as_deref(), Some("com.example.Person"));
        assert_eq!(warning.location.property.as_deref(), Some("photo"));
    }

    #[test]
    fn test_pulled_properties_get_prefix_and_suffix() {
        let graph = SourceGraph::new()
            .with_class(
                SourceClass::new("Person")
                    .property(SourceProperty::new("name", SourceType::named("java.lang.String")))
                    .property(
                        SourceProperty::new("address", SourceType::named("Address"))
                            .pulled("home", "Part"),
                    ),
            )
            .with_class(
                SourceClass::new("Address")
                    .property(SourceProperty::new("street", SourceType::named("java.lang.String")))
                    .property(
                        SourceProperty::new("geo", SourceType::named("Geo")).pulled("", "Geo"),
                    ),
            )
            .with_class(
                SourceClass::new("Geo")
                    .property(SourceProperty::new("lat", SourceType::named("double"))),
            );
        let (model, _, _) = build(&graph, &Settings::default());
        let names: Vec<&str> = model.data[0]
            .properties
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "homestreetPart", "homelatGeoPart"]);
    }

    #[test]
    fn test_pull_cycle_is_fatal() {
        let graph = SourceGraph::new()
            .with_class(
                SourceClass::new("A")
                    .property(SourceProperty::new("b", SourceType::named("B")).pulled("", "")),
            )
            .with_class(
                SourceClass::new("B")
                    .property(SourceProperty::new("a", SourceType::named("A")).pulled("", "")),
            );
        let settings = Settings::default();
        let mapper = TypeMapper::new(&settings, &graph);
        let mut symbols = SymbolTable::new();
        let mut diagnostics = Diagnostics::new();
        let err = DeclarationBuilder::new(&graph, &settings, &mapper)
            .build(&mut symbols, &mut diagnostics)
            .unwrap_err();
        match err {
            CompileError::PullPropertiesCycle {
                declaration,
                property,
                cycle,
            } => {
                assert!(declaration == "A" || declaration == "B");
                assert!(property == "a" || property == "b");
                assert_eq!(cycle.len(), 3);
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_discriminant_synthesized_from_descendants() {
        let graph = SourceGraph::new()
            .with_class(SourceClass::new("Shape").discriminant("kind", None))
            .with_class(
                SourceClass::new("Circle")
                    .extends(SourceType::named("Shape"))
                    .discriminant("kind", Some("circle")),
            )
            .with_class(
                SourceClass::new("Square")
                    .extends(SourceType::named("Shape"))
                    .discriminant("kind", Some("square")),
            )
            .with_class(SourceClass::new("Blob").discriminant("type", None));
        let (model, _, _) = build(&graph, &Settings::default());

        let shape = &model.data[0];
        assert_eq!(shape.properties[0].name, "kind");
        assert!(shape.properties[0].own);
        assert_eq!(
            shape.properties[0].ty,
            TypeExpr::literal_union(["circle", "square"])
        );
        assert_eq!(
            model.data[1].properties[0].ty,
            TypeExpr::string_literal("circle")
        );
        assert_eq!(model.data[3].properties[0].ty, TypeExpr::string());
    }

    #[test]
    fn test_class_parent_split_between_extends_and_implements() {
        let settings = Settings {
            class_mapping: crate::settings::ClassMapping::AsClasses,
            ..Default::default()
        };
        let graph = SourceGraph::new()
            .with_class(SourceClass::new("Base"))
            .with_class(SourceClass::interface("Named"))
            .with_class(
                SourceClass::new("Child")
                    .extends(SourceType::named("Base"))
                    .implements(SourceType::named("Named"))
                    .implements(SourceType::named("java.lang.Object")),
            )
            .with_class(
                SourceClass::new("Orphan").extends(SourceType::named("com.external.Thing")),
            );
        let (model, mut symbols, diagnostics) = build(&graph, &settings);
        let child = &model.data[2];
        assert!(child.is_class);
        assert_eq!(
            child.parent,
            Some(TypeExpr::reference(symbols.get_symbol("Base")))
        );
        assert_eq!(
            child.interfaces,
            vec![TypeExpr::reference(symbols.get_symbol("Named"))]
        );
        assert!(!model.data[1].is_class);
        assert_eq!(model.data[3].parent, None);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_enum_members_keep_order_and_kind() {
        let graph = SourceGraph::new()
            .with_enum(SourceEnum::of_names("Color", &["RED", "GREEN", "BLUE"]))
            .with_enum(SourceEnum {
                name: "Level".into(),
                members: vec![
                    SourceEnumMember {
                        name: "LOW".into(),
                        value: Some(LiteralValue::Number(1.0)),
                        comments: vec![],
                    },
                    SourceEnumMember {
                        name: "HIGH".into(),
                        value: Some(LiteralValue::Number(9.0)),
                        comments: vec![],
                    },
                ],
                comments: vec![],
            });
        let (model, _, _) = build(&graph, &Settings::default());
        let color = &model.enums[0];
        assert_eq!(color.kind, EnumKind::StringBased);
        let names: Vec<&str> = color.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["RED", "GREEN", "BLUE"]);
        assert_eq!(
            color.members[0].value,
            Some(LiteralValue::String("RED".into()))
        );
        assert_eq!(color.representation, EnumRepresentation::Pending);
        assert_eq!(model.enums[1].kind, EnumKind::NumberBased);
    }

    #[test]
    fn test_descendants_are_cycle_safe() {
        let graph = SourceGraph::new()
            .with_class(SourceClass::interface("A").implements(SourceType::named("B")))
            .with_class(SourceClass::interface("B").implements(SourceType::named("A")));
        let index = AncestorIndex::from_graph(&graph);
        assert_eq!(index.self_and_descendants("A"), vec!["A", "B"]);
    }
}
