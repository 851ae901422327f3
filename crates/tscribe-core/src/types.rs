//! Target type expressions
//!
//! A closed algebraic type. Expressions are values: passes never mutate an
//! expression they did not build, they rebuild it through [`TypeExpr::transform`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Literal value of a literal type or enum member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl LiteralValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Number(n) => write!(f, "{}", n),
            LiteralValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Void,
    Null,
    Undefined,
    /// Placeholder for date/time values; the date pass decides its final form
    Temporal,
}

/// Field of an object shape (`{ name?: T }`)
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeField {
    pub name: String,
    pub ty: TypeExpr,
}

/// Parameter of a function type (`(data: T) => T`)
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub name: String,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Reference to a declaration, with positional type arguments
    Reference {
        symbol: Symbol,
        type_args: Vec<TypeExpr>,
    },
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    /// Value that may be absent; rendered as `name?:` at property/parameter sites
    Optional(Box<TypeExpr>),
    Array(Box<TypeExpr>),
    IndexedMap {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    ObjectShape(Vec<ShapeField>),
    Function {
        params: Vec<FunctionParam>,
        ret: Box<TypeExpr>,
    },
    Literal(LiteralValue),
    GenericVariable(String),
    Primitive(PrimitiveKind),
    /// Target type text supplied by configuration
    Verbatim(String),
    Any,
}

impl TypeExpr {
    pub fn reference(symbol: Symbol) -> Self {
        TypeExpr::Reference {
            symbol,
            type_args: Vec::new(),
        }
    }

    pub fn generic_reference(symbol: Symbol, type_args: Vec<TypeExpr>) -> Self {
        TypeExpr::Reference { symbol, type_args }
    }

    pub fn array(element: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(element))
    }

    pub fn string_map(value: TypeExpr) -> Self {
        TypeExpr::IndexedMap {
            key: Box::new(TypeExpr::string()),
            value: Box::new(value),
        }
    }

    /// Wrap in `Optional`, without nesting optionals
    pub fn optional(self) -> Self {
        match self {
            TypeExpr::Optional(_) => self,
            other => TypeExpr::Optional(Box::new(other)),
        }
    }

    pub fn string() -> Self {
        TypeExpr::Primitive(PrimitiveKind::String)
    }

    pub fn number() -> Self {
        TypeExpr::Primitive(PrimitiveKind::Number)
    }

    pub fn boolean() -> Self {
        TypeExpr::Primitive(PrimitiveKind::Boolean)
    }

    pub fn void() -> Self {
        TypeExpr::Primitive(PrimitiveKind::Void)
    }

    pub fn string_literal(value: impl Into<String>) -> Self {
        TypeExpr::Literal(LiteralValue::String(value.into()))
    }

    pub fn function(params: Vec<FunctionParam>, ret: TypeExpr) -> Self {
        TypeExpr::Function {
            params,
            ret: Box::new(ret),
        }
    }

    /// Union of string literals, or a single literal when there is only one
    pub fn literal_union<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut literals: Vec<TypeExpr> =
            values.into_iter().map(TypeExpr::string_literal).collect();
        if literals.len() == 1 {
            literals.remove(0)
        } else {
            TypeExpr::Union(literals)
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeExpr::Optional(_))
    }

    /// The expression without an outer `Optional`
    pub fn unwrap_optional(&self) -> &TypeExpr {
        match self {
            TypeExpr::Optional(inner) => inner,
            other => other,
        }
    }

    /// Reference without type arguments to `symbol`
    pub fn is_bare_reference_to(&self, symbol: Symbol) -> bool {
        matches!(
            self,
            TypeExpr::Reference { symbol: s, type_args } if *s == symbol && type_args.is_empty()
        )
    }

    pub fn referenced_symbol(&self) -> Option<Symbol> {
        match self {
            TypeExpr::Reference { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }

    /// Rebuild the expression bottom-up: children first, then `f` on the
    /// rebuilt node.
    pub fn transform<F>(self, f: &mut F) -> TypeExpr
    where
        F: FnMut(TypeExpr) -> TypeExpr,
    {
        let rebuilt = match self {
            TypeExpr::Reference { symbol, type_args } => TypeExpr::Reference {
                symbol,
                type_args: type_args.into_iter().map(|t| t.transform(f)).collect(),
            },
            TypeExpr::Union(types) => {
                TypeExpr::Union(types.into_iter().map(|t| t.transform(f)).collect())
            }
            TypeExpr::Intersection(types) => {
                TypeExpr::Intersection(types.into_iter().map(|t| t.transform(f)).collect())
            }
            TypeExpr::Optional(inner) => TypeExpr::Optional(Box::new(inner.transform(f))),
            TypeExpr::Array(element) => TypeExpr::Array(Box::new(element.transform(f))),
            TypeExpr::IndexedMap { key, value } => TypeExpr::IndexedMap {
                key: Box::new(key.transform(f)),
                value: Box::new(value.transform(f)),
            },
            TypeExpr::ObjectShape(fields) => TypeExpr::ObjectShape(
                fields
                    .into_iter()
                    .map(|field| ShapeField {
                        name: field.name,
                        ty: field.ty.transform(f),
                    })
                    .collect(),
            ),
            TypeExpr::Function { params, ret } => TypeExpr::Function {
                params: params
                    .into_iter()
                    .map(|param| FunctionParam {
                        name: param.name,
                        ty: param.ty.transform(f),
                    })
                    .collect(),
                ret: Box::new(ret.transform(f)),
            },
            leaf => leaf,
        };
        f(rebuilt)
    }

    /// Visit every node, parents before children
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&TypeExpr),
    {
        f(self);
        match self {
            TypeExpr::Reference { type_args: types, .. }
            | TypeExpr::Union(types)
            | TypeExpr::Intersection(types) => {
                for ty in types {
                    ty.visit(f);
                }
            }
            TypeExpr::Optional(inner) | TypeExpr::Array(inner) => inner.visit(f),
            TypeExpr::IndexedMap { key, value } => {
                key.visit(f);
                value.visit(f);
            }
            TypeExpr::ObjectShape(fields) => {
                for field in fields {
                    field.ty.visit(f);
                }
            }
            TypeExpr::Function { params, ret } => {
                for param in params {
                    param.ty.visit(f);
                }
                ret.visit(f);
            }
            TypeExpr::Literal(_)
            | TypeExpr::GenericVariable(_)
            | TypeExpr::Primitive(_)
            | TypeExpr::Verbatim(_)
            | TypeExpr::Any => {}
        }
    }

    pub fn contains(&self, mut predicate: impl FnMut(&TypeExpr) -> bool) -> bool {
        let mut found = false;
        self.visit(&mut |node| {
            if !found && predicate(node) {
                found = true;
            }
        });
        found
    }
}
