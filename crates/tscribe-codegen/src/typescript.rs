//! TypeScript code generator
//!
//! Renders a sorted declaration model as TypeScript source. Declaration
//! order, property order and the chosen representations are taken as they
//! are; this module only decides syntax.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use tscribe_core::code::{ArrowParameter, BinaryOperator, Expression, Statement, TemplatePart};
use tscribe_core::ir::{
    Accessibility, AliasDeclaration, Constructor, DataDeclaration, Declaration, EnumDeclaration,
    EnumRepresentation, Method, Modifiers, Parameter, Property,
};
use tscribe_core::naming::is_valid_identifier;
use tscribe_core::types::{FunctionParam, LiteralValue, PrimitiveKind, ShapeField, TypeExpr};
use tscribe_core::{ResolvedSymbols, SortedModel, Symbol};

use crate::{Codegen, CodegenError};

/// Output options, read from the `[output]` table of the CLI config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// One level of indentation
    pub indent: String,
    /// Prefix top-level declarations with `export`
    pub export_declarations: bool,
    /// Written as a block comment at the top of the file
    pub file_comment: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            export_declarations: true,
            file_comment: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeScriptCodegen {
    options: EmitOptions,
}

impl TypeScriptCodegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EmitOptions) -> Self {
        Self { options }
    }
}

impl Codegen for TypeScriptCodegen {
    #[instrument(skip_all, fields(declarations = model.declarations.len()))]
    fn generate(
        &mut self,
        model: &SortedModel,
        symbols: &ResolvedSymbols,
    ) -> Result<String, CodegenError> {
        let mut emitter = Emitter {
            options: &self.options,
            symbols,
            output: String::new(),
        };

        if let Some(comment) = &self.options.file_comment {
            writeln!(emitter.output, "/* {} */", comment.replace("*/", "*\\/"))?;
            emitter.output.push('\n');
        }

        let namespaces = model
            .declarations
            .iter()
            .map(|d| emitter.namespace_of(d.symbol()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut start = 0;
        while start < model.declarations.len() {
            let namespace = &namespaces[start];
            let end = start
                + namespaces[start..]
                    .iter()
                    .take_while(|n| *n == namespace)
                    .count();
            let run = &model.declarations[start..end];
            match namespace {
                Some(namespace) => {
                    let keyword = if self.options.export_declarations {
                        "export namespace"
                    } else {
                        "namespace"
                    };
                    emitter.line(0, &format!("{} {} {{", keyword, namespace))?;
                    emitter.output.push('\n');
                    for declaration in run {
                        emitter.declaration(1, declaration, true)?;
                    }
                    emitter.line(0, "}")?;
                    emitter.output.push('\n');
                }
                None => {
                    for declaration in run {
                        emitter.declaration(0, declaration, self.options.export_declarations)?;
                    }
                }
            }
            start = end;
        }

        for helper in &model.helpers {
            emitter.output.push_str(helper.source().trim_end());
            emitter.output.push_str("\n\n");
        }

        let mut output = emitter.output;
        let trimmed = output.trim_end().len();
        output.truncate(trimmed);
        output.push('\n');
        debug!("emitted {} bytes", output.len());
        Ok(output)
    }
}

/// Quote text as a string literal
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Property, member or object key, quoted when it is not an identifier
fn property_name(name: &str) -> String {
    if is_valid_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::String(s) => quote(s),
        LiteralValue::Number(n) => n.to_string(),
        LiteralValue::Boolean(b) => b.to_string(),
    }
}

fn modifiers_prefix(modifiers: &Modifiers) -> String {
    let mut prefix = String::new();
    if modifiers.is_static {
        prefix.push_str("static ");
    }
    if modifiers.readonly {
        prefix.push_str("readonly ");
    }
    prefix
}

fn type_parameter_list(parameters: &[String]) -> String {
    if parameters.is_empty() {
        String::new()
    } else {
        format!("<{}>", parameters.join(", "))
    }
}

/// `name: T` or `name?: T` for optional types
fn optional_marker(ty: &TypeExpr) -> (&'static str, &TypeExpr) {
    if ty.is_optional() {
        ("?", ty.unwrap_optional())
    } else {
        ("", ty)
    }
}

fn needs_parens_in_array(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Union(types) => types.len() > 1,
        TypeExpr::Intersection(types) => types.len() > 1,
        TypeExpr::Function { .. } | TypeExpr::Optional(_) => true,
        _ => false,
    }
}

fn needs_parens_in_intersection(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Union(types) => types.len() > 1,
        TypeExpr::Function { .. } | TypeExpr::Optional(_) => true,
        _ => false,
    }
}

/// Expression that must be parenthesized when used as an operand
fn is_compound(expression: &Expression) -> bool {
    matches!(
        expression,
        Expression::Binary { .. }
            | Expression::Assign { .. }
            | Expression::Arrow { .. }
            | Expression::Not(_)
    )
}

fn template_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}

struct Emitter<'a> {
    options: &'a EmitOptions,
    symbols: &'a ResolvedSymbols,
    output: String,
}

impl Emitter<'_> {
    fn indent(&self, level: usize) -> String {
        self.options.indent.repeat(level)
    }

    fn line(&mut self, level: usize, text: &str) -> Result<(), CodegenError> {
        let indent = self.indent(level);
        writeln!(self.output, "{}{}", indent, text)?;
        Ok(())
    }

    fn full_name(&self, symbol: Symbol) -> Result<String, CodegenError> {
        self.symbols
            .full_name(symbol)
            .ok_or_else(|| CodegenError::UnresolvedSymbol(format!("{:?}", symbol)))
    }

    fn simple_name(&self, symbol: Symbol) -> Result<String, CodegenError> {
        self.symbols
            .name(symbol)
            .map(|name| name.simple.clone())
            .ok_or_else(|| CodegenError::UnresolvedSymbol(format!("{:?}", symbol)))
    }

    fn namespace_of(&self, symbol: Symbol) -> Result<Option<String>, CodegenError> {
        self.symbols
            .name(symbol)
            .map(|name| name.namespace.clone())
            .ok_or_else(|| CodegenError::UnresolvedSymbol(format!("{:?}", symbol)))
    }

    fn comments(&mut self, level: usize, comments: &[String]) -> Result<(), CodegenError> {
        if comments.is_empty() {
            return Ok(());
        }
        self.line(level, "/**")?;
        for comment in comments.iter().flat_map(|c| c.lines()) {
            let comment = comment.replace("*/", "*\\/");
            if comment.is_empty() {
                self.line(level, " *")?;
            } else {
                self.line(level, &format!(" * {}", comment))?;
            }
        }
        self.line(level, " */")
    }

    fn declaration(
        &mut self,
        level: usize,
        declaration: &Declaration,
        export: bool,
    ) -> Result<(), CodegenError> {
        match declaration {
            Declaration::Data(data) => self.data(level, data, export)?,
            Declaration::Alias(alias) => self.alias(level, alias, export)?,
            Declaration::Enum(declaration) => self.enumeration(level, declaration, export)?,
        }
        self.output.push('\n');
        Ok(())
    }

    fn data(
        &mut self,
        level: usize,
        declaration: &DataDeclaration,
        export: bool,
    ) -> Result<(), CodegenError> {
        self.comments(level, &declaration.comments)?;

        let mut header = String::new();
        if export {
            header.push_str("export ");
        }
        header.push_str(if declaration.is_class { "class " } else { "interface " });
        header.push_str(&self.simple_name(declaration.symbol)?);
        header.push_str(&type_parameter_list(&declaration.type_parameters));

        if declaration.is_class {
            if let Some(parent) = &declaration.parent {
                write!(header, " extends {}", self.type_text(parent)?)?;
            }
            if !declaration.interfaces.is_empty() {
                write!(header, " implements {}", self.type_list(&declaration.interfaces)?)?;
            }
        } else {
            let supertypes: Vec<TypeExpr> = declaration.supertypes().cloned().collect();
            if !supertypes.is_empty() {
                write!(header, " extends {}", self.type_list(&supertypes)?)?;
            }
        }
        header.push_str(" {");
        self.line(level, &header)?;

        let inner = level + 1;
        for property in &declaration.properties {
            self.property(inner, property)?;
        }
        let mut separate = !declaration.properties.is_empty();
        if declaration.is_class {
            if let Some(constructor) = &declaration.constructor {
                if separate {
                    self.output.push('\n');
                }
                self.constructor(inner, constructor)?;
                separate = true;
            }
        }
        for method in &declaration.methods {
            if declaration.is_class && separate {
                self.output.push('\n');
            }
            self.method(inner, method, declaration.is_class)?;
            separate = true;
        }
        self.line(level, "}")
    }

    fn property(&mut self, level: usize, property: &Property) -> Result<(), CodegenError> {
        self.comments(level, &property.comments)?;
        let (marker, ty) = optional_marker(&property.ty);
        let text = format!(
            "{}{}{}: {};",
            modifiers_prefix(&property.modifiers),
            property_name(&property.name),
            marker,
            self.type_text(ty)?
        );
        self.line(level, &text)
    }

    fn constructor(&mut self, level: usize, constructor: &Constructor) -> Result<(), CodegenError> {
        let parameters = constructor
            .parameters
            .iter()
            .map(|parameter| {
                let accessibility = match parameter.accessibility {
                    Some(Accessibility::Public) => "public ",
                    Some(Accessibility::Protected) => "protected ",
                    Some(Accessibility::Private) => "private ",
                    None => "",
                };
                let (marker, ty) = optional_marker(&parameter.ty);
                Ok(format!(
                    "{}{}{}: {}",
                    accessibility,
                    parameter.name,
                    marker,
                    self.type_text(ty)?
                ))
            })
            .collect::<Result<Vec<_>, CodegenError>>()?;
        self.line(level, &format!("constructor({}) {{", parameters.join(", ")))?;
        self.statements(level + 1, &constructor.body)?;
        self.line(level, "}")
    }

    fn parameters(&self, parameters: &[Parameter]) -> Result<String, CodegenError> {
        let rendered = parameters
            .iter()
            .map(|parameter| {
                let (marker, ty) = optional_marker(&parameter.ty);
                Ok(format!("{}{}: {}", parameter.name, marker, self.type_text(ty)?))
            })
            .collect::<Result<Vec<_>, CodegenError>>()?;
        Ok(rendered.join(", "))
    }

    fn method(
        &mut self,
        level: usize,
        method: &Method,
        implemented: bool,
    ) -> Result<(), CodegenError> {
        self.comments(level, &method.comments)?;
        let signature = format!(
            "{}{}{}({}): {}",
            modifiers_prefix(&method.modifiers),
            property_name(&method.name),
            type_parameter_list(&method.type_parameters),
            self.parameters(&method.parameters)?,
            self.type_text(&method.return_type)?
        );
        match (&method.body, implemented) {
            (Some(body), true) => {
                self.line(level, &format!("{} {{", signature))?;
                self.statements(level + 1, body)?;
                self.line(level, "}")
            }
            _ => self.line(level, &format!("{};", signature)),
        }
    }

    fn alias(
        &mut self,
        level: usize,
        alias: &AliasDeclaration,
        export: bool,
    ) -> Result<(), CodegenError> {
        self.comments(level, &alias.comments)?;
        let text = format!(
            "{}type {}{} = {};",
            if export { "export " } else { "" },
            self.simple_name(alias.symbol)?,
            type_parameter_list(&alias.type_parameters),
            self.type_text(&alias.definition)?
        );
        self.line(level, &text)
    }

    fn enumeration(
        &mut self,
        level: usize,
        declaration: &EnumDeclaration,
        export: bool,
    ) -> Result<(), CodegenError> {
        self.comments(level, &declaration.comments)?;
        let header = format!(
            "{}const enum {} {{",
            if export { "export " } else { "" },
            self.simple_name(declaration.symbol)?
        );
        self.line(level, &header)?;
        for member in &declaration.members {
            self.comments(level + 1, &member.comments)?;
            let name = property_name(&member.name);
            let text = match (&member.value, declaration.representation) {
                (_, EnumRepresentation::NumericPlaceholder) | (None, _) => format!("{},", name),
                (Some(value), _) => format!("{} = {},", name, literal(value)),
            };
            self.line(level + 1, &text)?;
        }
        self.line(level, "}")
    }

    fn type_list(&self, types: &[TypeExpr]) -> Result<String, CodegenError> {
        let rendered = types
            .iter()
            .map(|ty| self.type_text(ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join(", "))
    }

    fn wrapped_type(&self, ty: &TypeExpr, parenthesize: bool) -> Result<String, CodegenError> {
        let text = self.type_text(ty)?;
        Ok(if parenthesize { format!("({})", text) } else { text })
    }

    fn type_text(&self, ty: &TypeExpr) -> Result<String, CodegenError> {
        let text = match ty {
            TypeExpr::Reference { symbol, type_args } => {
                let name = self.full_name(*symbol)?;
                if type_args.is_empty() {
                    name
                } else {
                    format!("{}<{}>", name, self.type_list(type_args)?)
                }
            }
            TypeExpr::Union(types) => match types.as_slice() {
                [] => "never".to_string(),
                [single] => self.type_text(single)?,
                _ => types
                    .iter()
                    .map(|t| self.wrapped_type(t, matches!(t, TypeExpr::Function { .. })))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(" | "),
            },
            TypeExpr::Intersection(types) => match types.as_slice() {
                [] => "unknown".to_string(),
                [single] => self.type_text(single)?,
                _ => types
                    .iter()
                    .map(|t| self.wrapped_type(t, needs_parens_in_intersection(t)))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(" & "),
            },
            TypeExpr::Optional(inner) => format!(
                "{} | undefined",
                self.wrapped_type(inner, matches!(inner.as_ref(), TypeExpr::Function { .. }))?
            ),
            TypeExpr::Array(element) => format!(
                "{}[]",
                self.wrapped_type(element, needs_parens_in_array(element))?
            ),
            TypeExpr::IndexedMap { key, value } => {
                format!("{{ [index: {}]: {} }}", self.type_text(key)?, self.type_text(value)?)
            }
            TypeExpr::ObjectShape(fields) => self.object_shape(fields)?,
            TypeExpr::Function { params, ret } => {
                format!("({}) => {}", self.function_params(params)?, self.type_text(ret)?)
            }
            TypeExpr::Literal(value) => literal(value),
            TypeExpr::GenericVariable(name) => name.clone(),
            TypeExpr::Primitive(kind) => match kind {
                PrimitiveKind::String => "string",
                PrimitiveKind::Number => "number",
                PrimitiveKind::Boolean => "boolean",
                PrimitiveKind::Void => "void",
                PrimitiveKind::Null => "null",
                PrimitiveKind::Undefined => "undefined",
                PrimitiveKind::Temporal => "Date",
            }
            .to_string(),
            TypeExpr::Verbatim(text) => text.clone(),
            TypeExpr::Any => "any".to_string(),
        };
        Ok(text)
    }

    fn object_shape(&self, fields: &[ShapeField]) -> Result<String, CodegenError> {
        if fields.is_empty() {
            return Ok("{}".to_string());
        }
        let rendered = fields
            .iter()
            .map(|field| {
                let (marker, ty) = optional_marker(&field.ty);
                Ok(format!("{}{}: {}", property_name(&field.name), marker, self.type_text(ty)?))
            })
            .collect::<Result<Vec<_>, CodegenError>>()?;
        Ok(format!("{{ {} }}", rendered.join(", ")))
    }

    fn function_params(&self, params: &[FunctionParam]) -> Result<String, CodegenError> {
        let rendered = params
            .iter()
            .map(|param| {
                let (marker, ty) = optional_marker(&param.ty);
                Ok(format!("{}{}: {}", param.name, marker, self.type_text(ty)?))
            })
            .collect::<Result<Vec<_>, CodegenError>>()?;
        Ok(rendered.join(", "))
    }

    fn statements(&mut self, level: usize, statements: &[Statement]) -> Result<(), CodegenError> {
        for statement in statements {
            self.statement(level, statement)?;
        }
        Ok(())
    }

    fn statement(&mut self, level: usize, statement: &Statement) -> Result<(), CodegenError> {
        match statement {
            Statement::Return(None) => self.line(level, "return;"),
            Statement::Return(Some(value)) => {
                let text = format!("return {};", self.expression(value)?);
                self.line(level, &text)
            }
            Statement::If { condition, then } => {
                let text = format!("if ({}) {{", self.expression(condition)?);
                self.line(level, &text)?;
                self.statements(level + 1, then)?;
                self.line(level, "}")
            }
            Statement::Const { name, value } => {
                let text = format!("const {} = {};", name, self.expression(value)?);
                self.line(level, &text)
            }
            Statement::Expression(expression) => {
                let text = format!("{};", self.expression(expression)?);
                self.line(level, &text)
            }
            Statement::Switch { discriminant, cases } => {
                let text = format!("switch ({}) {{", self.expression(discriminant)?);
                self.line(level, &text)?;
                for case in cases {
                    let text = format!("case {}:", self.expression(&case.test)?);
                    self.line(level + 1, &text)?;
                    self.statements(level + 2, &case.body)?;
                }
                self.line(level, "}")
            }
        }
    }

    fn operand(&self, expression: &Expression) -> Result<String, CodegenError> {
        let text = self.expression(expression)?;
        Ok(if is_compound(expression) { format!("({})", text) } else { text })
    }

    fn arguments(&self, args: &[Expression]) -> Result<String, CodegenError> {
        let rendered = args
            .iter()
            .map(|arg| self.expression(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join(", "))
    }

    fn arrow_parameters(&self, params: &[ArrowParameter]) -> Result<String, CodegenError> {
        let rendered = params
            .iter()
            .map(|param| match &param.ty {
                Some(ty) => Ok(format!("{}: {}", param.name, self.type_text(ty)?)),
                None => Ok(param.name.clone()),
            })
            .collect::<Result<Vec<_>, CodegenError>>()?;
        Ok(rendered.join(", "))
    }

    fn expression(&self, expression: &Expression) -> Result<String, CodegenError> {
        let text = match expression {
            Expression::Identifier(name) => name.clone(),
            Expression::TypeReference(ty) => match ty {
                TypeExpr::Reference { symbol, .. } => self.full_name(*symbol)?,
                other => self.type_text(other)?,
            },
            Expression::This => "this".to_string(),
            Expression::Super => "super".to_string(),
            Expression::Undefined => "undefined".to_string(),
            Expression::StringLiteral(value) => quote(value),
            Expression::Member { object, property } => {
                let object = self.operand(object)?;
                if is_valid_identifier(property) {
                    format!("{}.{}", object, property)
                } else {
                    format!("{}[{}]", object, quote(property))
                }
            }
            Expression::Call { callee, type_args, args } => {
                let type_args = if type_args.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", self.type_list(type_args)?)
                };
                format!("{}{}({})", self.operand(callee)?, type_args, self.arguments(args)?)
            }
            Expression::New { class, args } => {
                format!("new {}({})", self.type_text(class)?, self.arguments(args)?)
            }
            Expression::Binary { left, op, right } => {
                let op = match op {
                    BinaryOperator::Or => "||",
                };
                let left_text = match left.as_ref() {
                    Expression::Assign { .. } | Expression::Arrow { .. } => {
                        format!("({})", self.expression(left)?)
                    }
                    _ => self.expression(left)?,
                };
                let right_text = match right.as_ref() {
                    Expression::Assign { .. } | Expression::Arrow { .. } => {
                        format!("({})", self.expression(right)?)
                    }
                    _ => self.expression(right)?,
                };
                format!("{} {} {}", left_text, op, right_text)
            }
            Expression::Not(inner) => format!("!{}", self.operand(inner)?),
            Expression::Assign { target, value } => {
                format!("{} = {}", self.expression(target)?, self.expression(value)?)
            }
            Expression::Arrow { params, body } => {
                let body_text = self.expression(body)?;
                let body_text = if matches!(body.as_ref(), Expression::Object(_)) {
                    format!("({})", body_text)
                } else {
                    body_text
                };
                format!("({}) => {}", self.arrow_parameters(params)?, body_text)
            }
            Expression::Object(entries) => {
                if entries.is_empty() {
                    "{}".to_string()
                } else {
                    let rendered = entries
                        .iter()
                        .map(|(key, value)| match value {
                            Some(value) => {
                                Ok(format!("{}: {}", property_name(key), self.expression(value)?))
                            }
                            None => Ok(key.clone()),
                        })
                        .collect::<Result<Vec<_>, CodegenError>>()?;
                    format!("{{ {} }}", rendered.join(", "))
                }
            }
            Expression::TaggedTemplate { tag, parts } => {
                let mut text = self.operand(tag)?;
                text.push('`');
                for part in parts {
                    match part {
                        TemplatePart::Literal(literal) => text.push_str(&template_literal(literal)),
                        TemplatePart::Substitution(expression) => {
                            write!(text, "${{{}}}", self.expression(expression)?)?;
                        }
                    }
                }
                text.push('`');
                text
            }
        };
        Ok(text)
    }
}
