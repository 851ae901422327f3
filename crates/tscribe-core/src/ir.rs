//! Target declaration model
//!
//! The model is what every pass consumes and returns. Declarations refer to
//! each other only through [`Symbol`]s inside [`TypeExpr::Reference`], so
//! self- and mutually-referential graphs are plain values.

use std::collections::BTreeMap;

use crate::code::Statement;
use crate::symbols::Symbol;
use crate::types::{LiteralValue, TypeExpr};

/// Emission category of a data declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclarationCategory {
    /// Mapped from a source class or interface
    Data,
    /// Declarations REST declarations depend on (e.g. `HttpClient`)
    ServicePrerequisite,
    /// REST surface interfaces and clients
    Service,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub readonly: bool,
    pub is_static: bool,
}

impl Modifiers {
    pub fn readonly() -> Self {
        Self {
            readonly: true,
            is_static: false,
        }
    }

    pub fn static_() -> Self {
        Self {
            readonly: false,
            is_static: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TypeExpr,
    pub modifiers: Modifiers,
    /// Declared by this declaration itself and never removed as inherited
    pub own: bool,
    pub comments: Vec<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::default(),
            own: false,
            comments: Vec::new(),
        }
    }

    pub fn own(mut self) -> Self {
        self.own = true;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeExpr,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorParameter {
    pub name: String,
    pub ty: TypeExpr,
    /// Parameter property (`constructor(protected client: HttpClient)`)
    pub accessibility: Option<Accessibility>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub parameters: Vec<ConstructorParameter>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeExpr,
    /// `None` for declared-only methods (interfaces)
    pub body: Option<Vec<Statement>>,
    pub comments: Vec<String>,
}

impl Method {
    pub fn declared(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: TypeExpr,
    ) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::default(),
            type_parameters: Vec::new(),
            parameters,
            return_type,
            body: None,
            comments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataDeclaration {
    /// Source entity; `None` for compiler generated declarations
    pub origin: Option<String>,
    pub symbol: Symbol,
    pub category: DeclarationCategory,
    /// Rendered as a class rather than an interface
    pub is_class: bool,
    pub type_parameters: Vec<String>,
    /// Single supertype (`extends`)
    pub parent: Option<TypeExpr>,
    /// Implemented interfaces for classes, additional supertypes for interfaces
    pub interfaces: Vec<TypeExpr>,
    pub properties: Vec<Property>,
    pub constructor: Option<Constructor>,
    pub methods: Vec<Method>,
    pub comments: Vec<String>,
    pub discriminant_property: Option<String>,
    pub discriminant_literal: Option<String>,
    /// Leaf entity names of the tagged union rooted here
    pub tagged_union_members: Vec<String>,
    /// Alias synthesized for the tagged union, once created
    pub tagged_union_alias: Option<Symbol>,
}

impl DataDeclaration {
    pub fn new(symbol: Symbol, category: DeclarationCategory) -> Self {
        Self {
            origin: None,
            symbol,
            category,
            is_class: false,
            type_parameters: Vec::new(),
            parent: None,
            interfaces: Vec::new(),
            properties: Vec::new(),
            constructor: None,
            methods: Vec::new(),
            comments: Vec::new(),
            discriminant_property: None,
            discriminant_literal: None,
            tagged_union_members: Vec::new(),
            tagged_union_alias: None,
        }
    }

    /// Parent followed by interfaces
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeExpr> {
        self.parent.iter().chain(self.interfaces.iter())
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Concrete data class (revive functions are generated for these)
    pub fn is_data_class(&self) -> bool {
        self.is_class && self.category == DeclarationCategory::Data
    }

    /// Rewrite every type of properties, parameters and return types
    pub fn transform_types<F>(mut self, f: &mut F) -> Self
    where
        F: FnMut(TypeExpr) -> TypeExpr,
    {
        self.properties = self
            .properties
            .into_iter()
            .map(|mut property| {
                property.ty = property.ty.transform(f);
                property
            })
            .collect();
        self.methods = self
            .methods
            .into_iter()
            .map(|mut method| {
                method.parameters = method
                    .parameters
                    .into_iter()
                    .map(|mut parameter| {
                        parameter.ty = parameter.ty.transform(f);
                        parameter
                    })
                    .collect();
                method.return_type = method.return_type.transform(f);
                method
            })
            .collect();
        if let Some(mut constructor) = self.constructor.take() {
            constructor.parameters = constructor
                .parameters
                .into_iter()
                .map(|mut parameter| {
                    parameter.ty = parameter.ty.transform(f);
                    parameter
                })
                .collect();
            self.constructor = Some(constructor);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDeclaration {
    pub origin: Option<String>,
    pub symbol: Symbol,
    pub type_parameters: Vec<String>,
    pub definition: TypeExpr,
    pub comments: Vec<String>,
}

impl AliasDeclaration {
    pub fn new(symbol: Symbol, definition: TypeExpr) -> Self {
        Self {
            origin: None,
            symbol,
            type_parameters: Vec::new(),
            definition,
            comments: Vec::new(),
        }
    }
}

/// Whether member values are text or numbers in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    StringBased,
    NumberBased,
}

/// Representation chosen by the enum pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRepresentation {
    /// Not yet decided
    Pending,
    /// Members with their literal values
    Valued,
    /// Members without values
    NumericPlaceholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<LiteralValue>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub origin: String,
    pub symbol: Symbol,
    pub kind: EnumKind,
    pub members: Vec<EnumMember>,
    pub representation: EnumRepresentation,
    pub comments: Vec<String>,
}

/// Runtime code snippets some declarations depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Helper {
    /// `__getCopyArrayFn`, `__copyArray`, `__getCopyObjectFn`, `__copyObject`, `__identity`
    CopyFunctions,
    /// `uriEncoding` tagged template
    UriEncoding,
}

impl Helper {
    pub fn source(self) -> &'static str {
        match self {
            Helper::CopyFunctions => include_str!("helpers/copy_functions.ts"),
            Helper::UriEncoding => include_str!("helpers/uri_encoding.ts"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetModel {
    pub data: Vec<DataDeclaration>,
    pub aliases: Vec<AliasDeclaration>,
    pub enums: Vec<EnumDeclaration>,
    pub helpers: Vec<Helper>,
    /// Definitions substituted for inlined enum aliases, by alias symbol
    pub inlined_enums: BTreeMap<Symbol, TypeExpr>,
}

impl TargetModel {
    pub fn find_data(&self, symbol: Symbol) -> Option<&DataDeclaration> {
        self.data.iter().find(|d| d.symbol == symbol)
    }

    pub fn find_data_by_origin(&self, origin: &str) -> Option<&DataDeclaration> {
        self.data
            .iter()
            .find(|d| d.origin.as_deref() == Some(origin))
    }

    pub fn find_alias(&self, symbol: Symbol) -> Option<&AliasDeclaration> {
        self.aliases.iter().find(|a| a.symbol == symbol)
    }

    pub fn find_enum(&self, symbol: Symbol) -> Option<&EnumDeclaration> {
        self.enums.iter().find(|e| e.symbol == symbol)
    }

    pub fn with_helper(mut self, helper: Helper) -> Self {
        if !self.helpers.contains(&helper) {
            self.helpers.push(helper);
        }
        self
    }

    /// Rewrite types of every data declaration accepted by `filter`
    pub fn transform_data_types<P, F>(mut self, filter: P, f: &mut F) -> Self
    where
        P: Fn(&DataDeclaration) -> bool,
        F: FnMut(TypeExpr) -> TypeExpr,
    {
        self.data = self
            .data
            .into_iter()
            .map(|declaration| {
                if filter(&declaration) {
                    declaration.transform_types(f)
                } else {
                    declaration
                }
            })
            .collect();
        self
    }
}

/// Declaration in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Data(DataDeclaration),
    Alias(AliasDeclaration),
    Enum(EnumDeclaration),
}

impl Declaration {
    pub fn symbol(&self) -> Symbol {
        match self {
            Declaration::Data(d) => d.symbol,
            Declaration::Alias(a) => a.symbol,
            Declaration::Enum(e) => e.symbol,
        }
    }
}

/// Final model handed to an emitter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedModel {
    pub declarations: Vec<Declaration>,
    pub helpers: Vec<Helper>,
}

impl SortedModel {
    pub fn data(&self) -> impl Iterator<Item = &DataDeclaration> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Data(data) => Some(data),
            _ => None,
        })
    }

    pub fn aliases(&self) -> impl Iterator<Item = &AliasDeclaration> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Alias(alias) => Some(alias),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDeclaration> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Enum(e) => Some(e),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    #[test]
    fn test_helpers_are_deduplicated() {
        let model = TargetModel::default()
            .with_helper(Helper::CopyFunctions)
            .with_helper(Helper::UriEncoding)
            .with_helper(Helper::CopyFunctions);
        assert_eq!(model.helpers, vec![Helper::CopyFunctions, Helper::UriEncoding]);
        assert!(Helper::UriEncoding.source().contains("encodeURIComponent"));
        assert!(Helper::CopyFunctions.source().contains("function __identity"));
    }

    #[test]
    fn test_transform_types_reaches_methods() {
        let mut symbols = SymbolTable::new();
        let symbol = symbols.get_symbol("Api");
        let mut declaration = DataDeclaration::new(symbol, DeclarationCategory::Service);
        declaration.properties.push(Property::new("a", TypeExpr::Any));
        declaration.methods.push(Method::declared(
            "get",
            vec![Parameter::new("p", TypeExpr::Any)],
            TypeExpr::Any,
        ));

        let rewritten = declaration.transform_types(&mut |t| match t {
            TypeExpr::Any => TypeExpr::string(),
            other => other,
        });
        assert_eq!(rewritten.properties[0].ty, TypeExpr::string());
        assert_eq!(rewritten.methods[0].parameters[0].ty, TypeExpr::string());
        assert_eq!(rewritten.methods[0].return_type, TypeExpr::string());
    }
}
