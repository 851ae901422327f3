//! Statements and expressions of synthesized method bodies
//!
//! Only the constructs that revive functions and REST clients need. Type
//! positions hold [`TypeExpr`] so symbols are rendered with their final names.

use crate::types::TypeExpr;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Return(Option<Expression>),
    If {
        condition: Expression,
        then: Vec<Statement>,
    },
    /// `const name = value;`
    Const { name: String, value: Expression },
    Expression(Expression),
    Switch {
        discriminant: Expression,
        cases: Vec<SwitchCase>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowParameter {
    pub name: String,
    pub ty: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Literal(String),
    Substitution(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    /// A declaration used as a value (`Address` in `Address.fromData`)
    TypeReference(TypeExpr),
    This,
    Super,
    Undefined,
    StringLiteral(String),
    Member {
        object: Box<Expression>,
        property: String,
    },
    Call {
        callee: Box<Expression>,
        type_args: Vec<TypeExpr>,
        args: Vec<Expression>,
    },
    /// `new Class<T>()`
    New {
        class: TypeExpr,
        args: Vec<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
    Assign {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Arrow {
        params: Vec<ArrowParameter>,
        body: Box<Expression>,
    },
    /// `{ key: value, ... }`; a `None` value is written in shorthand form
    Object(Vec<(String, Option<Expression>)>),
    /// `` tag`literal${substitution}` ``
    TaggedTemplate {
        tag: Box<Expression>,
        parts: Vec<TemplatePart>,
    },
}

impl Expression {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn member(self, property: impl Into<String>) -> Self {
        Expression::Member {
            object: Box::new(self),
            property: property.into(),
        }
    }

    pub fn call(self, args: Vec<Expression>) -> Self {
        Expression::Call {
            callee: Box::new(self),
            type_args: Vec::new(),
            args,
        }
    }

    pub fn call_generic(self, type_args: Vec<TypeExpr>, args: Vec<Expression>) -> Self {
        Expression::Call {
            callee: Box::new(self),
            type_args,
            args,
        }
    }

    pub fn or(self, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(self),
            op: BinaryOperator::Or,
            right: Box::new(right),
        }
    }

    pub fn not(self) -> Self {
        Expression::Not(Box::new(self))
    }

    pub fn assign(self, value: Expression) -> Self {
        Expression::Assign {
            target: Box::new(self),
            value: Box::new(value),
        }
    }

    /// Call of a free function by name (`__identity<T>()`)
    pub fn is_call_of(&self, function: &str) -> bool {
        match self {
            Expression::Call { callee, .. } => {
                matches!(callee.as_ref(), Expression::Identifier(name) if name == function)
            }
            _ => false,
        }
    }
}

impl Statement {
    /// `if (!name) { return name; }`
    pub fn return_if_falsy(name: &str) -> Self {
        Statement::If {
            condition: Expression::identifier(name).not(),
            then: vec![Statement::Return(Some(Expression::identifier(name)))],
        }
    }
}
