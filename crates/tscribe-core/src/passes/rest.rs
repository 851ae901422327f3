//! REST endpoint grouping and codegen
//!
//! Endpoints are grouped into one surface interface and/or one client class
//! per group. Clients forward every call to the single `request` operation
//! of an injected `HttpClient`.

use std::collections::HashMap;

use crate::code::{Expression, Statement, TemplatePart};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::CompileError;
use crate::ir::{
    Accessibility, AliasDeclaration, Constructor, ConstructorParameter, DataDeclaration,
    DeclarationCategory, Helper, Method, Parameter, Property, TargetModel,
};
use crate::mapper::{MapContext, TypeMapper};
use crate::naming::{is_valid_identifier, simple_name, to_valid_identifier};
use crate::passes::dates::transform_dates_in;
use crate::passes::enums::substitute_inlined_enums;
use crate::passes::path_template::{join_path, PathPart, PathTemplate, PathTemplateParser};
use crate::passes::revive::copy_function;
use crate::passes::tagged_unions::use_tagged_unions_in;
use crate::settings::{RestGrouping, Settings};
use crate::source::{RestApplication, RestMethod, RestQueryParam, SourceClass, SourceType};
use crate::symbols::{Symbol, SymbolTable};
use crate::types::{FunctionParam, PrimitiveKind, ShapeField, TypeExpr};

const DEFAULT_APPLICATION_NAME: &str = "RestApplication";
const CLIENT_SUFFIX: &str = "Client";
const QUERY_PARAMS_SUFFIX: &str = "QueryParams";

/// What a group of endpoints is named after
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Resource(String),
    Synthetic(String),
}

impl GroupKey {
    fn symbol(&self, symbols: &mut SymbolTable, suffix: Option<&str>) -> Symbol {
        match self {
            GroupKey::Resource(entity) => {
                symbols.get_symbol_with_suffix(entity, suffix.unwrap_or(""))
            }
            GroupKey::Synthetic(name) => symbols.get_synthetic_symbol(name, suffix),
        }
    }
}

/// Endpoints of one group, in path order
struct Group<'g> {
    key: GroupKey,
    methods: Vec<&'g RestMethod>,
}

pub fn create_rest_declarations(
    symbols: &mut SymbolTable,
    model: TargetModel,
    application: &RestApplication,
    settings: &Settings,
    mapper: &TypeMapper,
    diagnostics: &mut Diagnostics,
) -> Result<TargetModel, CompileError> {
    let codegen = settings.rest_codegen;
    if !codegen.surface() && !codegen.client() {
        return Ok(model);
    }

    let mut compiler = RestCompiler {
        settings,
        mapper,
        parser: PathTemplateParser::new()?,
        application,
        response: symbols.get_synthetic_symbol("RestResponse", None),
        query_beans: Vec::new(),
        diagnostics,
    };
    let mut model = compiler.declare_response_alias(symbols, model);
    let groups = compiler.group_methods(settings.rest_grouping);
    tracing::debug!(
        "compiling {} REST method(s) in {} group(s)",
        application.methods.len(),
        groups.len()
    );

    let type_parameters = compiler.options_type_parameters();
    if codegen.surface() {
        for group in &groups {
            let symbol = group.key.symbol(symbols, None);
            let mut declaration = DataDeclaration::new(symbol, DeclarationCategory::Service);
            declaration.type_parameters = type_parameters.clone();
            declaration.methods = compiler.compile_group(symbols, group, false);
            model.data.push(declaration);
        }
    }
    if codegen.client() {
        let http_client = compiler.http_client(symbols);
        let http_client_type = compiler.with_options_args(http_client.symbol);
        model.data.push(http_client);
        for group in &groups {
            let (symbol, interfaces) = if codegen.surface() {
                let surface = group.key.symbol(symbols, None);
                (
                    symbols.add_suffix_to_symbol(surface, CLIENT_SUFFIX),
                    vec![compiler.with_options_args(surface)],
                )
            } else {
                (group.key.symbol(symbols, Some(CLIENT_SUFFIX)), Vec::new())
            };
            let mut declaration = DataDeclaration::new(symbol, DeclarationCategory::Service);
            declaration.is_class = true;
            declaration.type_parameters = type_parameters.clone();
            declaration.interfaces = interfaces;
            declaration.constructor = Some(Constructor {
                parameters: vec![ConstructorParameter {
                    name: "httpClient".into(),
                    ty: http_client_type.clone(),
                    accessibility: Some(Accessibility::Protected),
                }],
                body: Vec::new(),
            });
            declaration.methods = compiler.compile_group(symbols, group, true);
            model.data.push(declaration);
        }
        model = model.with_helper(Helper::UriEncoding);
    }
    let query_beans: Vec<Symbol> = compiler.query_beans.iter().map(|d| d.symbol).collect();
    model.data.append(&mut compiler.query_beans);

    let model = reapply_representations(symbols, model, settings, &query_beans);
    if settings.deserialization_functions && codegen.client() {
        return Ok(add_copy_functions(model, compiler.response));
    }
    Ok(model)
}

/// REST types are mapped after the earlier passes ran, so their rewrites are
/// applied again to the declarations created here.
fn reapply_representations(
    symbols: &mut SymbolTable,
    model: TargetModel,
    settings: &Settings,
    query_beans: &[Symbol],
) -> TargetModel {
    let created_here = |d: &DataDeclaration| {
        d.category != DeclarationCategory::Data || query_beans.contains(&d.symbol)
    };
    let model = transform_dates_in(symbols, model, settings.date_mapping, created_here);
    let inlined = model.inlined_enums.clone();
    let model = substitute_inlined_enums(model, &inlined, created_here);
    if settings.tagged_unions {
        use_tagged_unions_in(model, created_here)
    } else {
        model
    }
}

struct RestCompiler<'a> {
    settings: &'a Settings,
    mapper: &'a TypeMapper,
    parser: PathTemplateParser,
    application: &'a RestApplication,
    response: Symbol,
    /// `<Bean>QueryParams` interfaces, one per distinct query bean
    query_beans: Vec<DataDeclaration>,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> RestCompiler<'a> {
    /// `type RestResponse<R> = Promise<R>` or the configured verbatim type
    fn declare_response_alias(&self, symbols: &mut SymbolTable, model: TargetModel) -> TargetModel {
        if model.find_alias(self.response).is_some() {
            return model;
        }
        let definition = match &self.settings.rest_response_type {
            Some(verbatim) => TypeExpr::Verbatim(verbatim.clone()),
            None => TypeExpr::generic_reference(
                symbols.get_synthetic_symbol("Promise", None),
                vec![TypeExpr::GenericVariable("R".into())],
            ),
        };
        let mut model = model;
        model.aliases.push(AliasDeclaration {
            type_parameters: vec!["R".into()],
            ..AliasDeclaration::new(self.response, definition)
        });
        model
    }

    fn default_group_name(&self) -> String {
        self.application
            .name
            .as_deref()
            .map(simple_name)
            .unwrap_or(DEFAULT_APPLICATION_NAME)
            .to_string()
    }

    fn group_key(&mut self, grouping: RestGrouping, method: &RestMethod) -> GroupKey {
        match grouping {
            RestGrouping::PerResource => GroupKey::Resource(method.resource.clone()),
            RestGrouping::ByAnnotation => match &method.group_annotation {
                Some(value) if is_valid_identifier(value) => GroupKey::Synthetic(value.clone()),
                Some(value) => {
                    let fallback = self.default_group_name();
                    self.diagnostics.warn(Warning::invalid_identifier(
                        value,
                        &format!("{}.{}", method.resource, method.name),
                        &fallback,
                    ));
                    GroupKey::Synthetic(fallback)
                }
                None => GroupKey::Synthetic(self.default_group_name()),
            },
            RestGrouping::SingleApplication => GroupKey::Synthetic(self.default_group_name()),
        }
    }

    /// Groups in order of first appearance; methods sorted by path
    fn group_methods(&mut self, grouping: RestGrouping) -> Vec<Group<'a>> {
        let application = self.application;
        let mut groups: Vec<Group<'a>> = Vec::new();
        let mut positions: HashMap<GroupKey, usize> = HashMap::new();
        for method in &application.methods {
            let key = self.group_key(grouping, method);
            match positions.get(&key) {
                Some(&position) => groups[position].methods.push(method),
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push(Group {
                        key,
                        methods: vec![method],
                    });
                }
            }
        }
        for group in &mut groups {
            group.methods.sort_by(|a, b| a.path.cmp(&b.path));
        }
        groups
    }

    fn options_type_parameters(&self) -> Vec<String> {
        match (&self.settings.rest_options_type, self.settings.rest_options_type_is_generic) {
            (Some(options), true) => vec![options.clone()],
            _ => Vec::new(),
        }
    }

    fn options_type(&self) -> Option<TypeExpr> {
        let options = self.settings.rest_options_type.clone()?;
        if self.settings.rest_options_type_is_generic {
            Some(TypeExpr::GenericVariable(options))
        } else {
            Some(TypeExpr::Verbatim(options))
        }
    }

    /// Reference to a REST declaration, passing the options type parameter on
    fn with_options_args(&self, symbol: Symbol) -> TypeExpr {
        let args = self
            .options_type_parameters()
            .into_iter()
            .map(TypeExpr::GenericVariable)
            .collect();
        TypeExpr::generic_reference(symbol, args)
    }

    /// `HttpClient` interface with its single `request<R>` operation
    fn http_client(&self, symbols: &mut SymbolTable) -> DataDeclaration {
        let r = TypeExpr::GenericVariable("R".into());
        let mut fields = vec![
            ShapeField {
                name: "method".into(),
                ty: TypeExpr::string(),
            },
            ShapeField {
                name: "url".into(),
                ty: TypeExpr::string(),
            },
            ShapeField {
                name: "queryParams".into(),
                ty: TypeExpr::Any.optional(),
            },
            ShapeField {
                name: "data".into(),
                ty: TypeExpr::Any.optional(),
            },
            ShapeField {
                name: "copyFn".into(),
                ty: TypeExpr::function(
                    vec![FunctionParam {
                        name: "data".into(),
                        ty: r.clone(),
                    }],
                    r.clone(),
                )
                .optional(),
            },
        ];
        if let Some(options) = self.options_type() {
            fields.push(ShapeField {
                name: "options".into(),
                ty: options.optional(),
            });
        }

        let mut request = Method::declared(
            "request",
            vec![Parameter::new("requestConfig", TypeExpr::ObjectShape(fields))],
            TypeExpr::generic_reference(self.response, vec![r]),
        );
        request.type_parameters = vec!["R".into()];

        let mut declaration = DataDeclaration::new(
            symbols.get_synthetic_symbol("HttpClient", None),
            DeclarationCategory::ServicePrerequisite,
        );
        declaration.type_parameters = self.options_type_parameters();
        declaration.methods = vec![request];
        declaration
    }

    fn compile_group(
        &mut self,
        symbols: &mut SymbolTable,
        group: &Group<'_>,
        implement: bool,
    ) -> Vec<Method> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for method in &group.methods {
            *counts.entry(method.name.as_str()).or_default() += 1;
        }
        group
            .methods
            .iter()
            .map(|method| {
                let long_name = counts.get(method.name.as_str()).copied().unwrap_or(0) > 1;
                self.compile_method(symbols, method, long_name, implement)
            })
            .collect()
    }

    fn map_type(
        &mut self,
        symbols: &mut SymbolTable,
        ty: &SourceType,
        method: &RestMethod,
    ) -> TypeExpr {
        let mut ctx = MapContext { symbols };
        match self.mapper.map_type(ty, &mut ctx) {
            Ok(mapped) => mapped,
            Err(unresolved) => {
                self.diagnostics.warn(Warning::unresolved_type(
                    &unresolved.source,
                    &method.resource,
                    &method.name,
                ));
                TypeExpr::Any
            }
        }
    }

    /// Runs of single parameters become object shapes, beans become references
    /// to their `<Bean>QueryParams` interface; all of them are intersected.
    fn query_params_type(&mut self, symbols: &mut SymbolTable, method: &RestMethod) -> TypeExpr {
        let mut types = Vec::new();
        let mut singles = Vec::new();
        for param in &method.query_params {
            match param {
                RestQueryParam::Single(param) => singles.push(ShapeField {
                    name: param.name.clone(),
                    ty: self.map_type(symbols, &param.ty, method).optional(),
                }),
                RestQueryParam::Bean { bean } => {
                    if !singles.is_empty() {
                        types.push(TypeExpr::ObjectShape(std::mem::take(&mut singles)));
                    }
                    let symbol = self.query_bean(symbols, bean, method);
                    types.push(TypeExpr::reference(symbol));
                }
            }
        }
        if !singles.is_empty() {
            types.push(TypeExpr::ObjectShape(singles));
        }
        if types.len() == 1 {
            types.remove(0)
        } else {
            TypeExpr::Intersection(types)
        }
    }

    fn query_bean(
        &mut self,
        symbols: &mut SymbolTable,
        bean: &SourceClass,
        method: &RestMethod,
    ) -> Symbol {
        let symbol = symbols.get_symbol_with_suffix(&bean.name, QUERY_PARAMS_SUFFIX);
        if self.query_beans.iter().any(|d| d.symbol == symbol) {
            return symbol;
        }
        let mut declaration = DataDeclaration::new(symbol, DeclarationCategory::Data);
        declaration.comments = bean.comments.clone();
        for property in &bean.properties {
            let ty = self.map_type(symbols, &property.ty, method);
            let ty = if property.optional { ty.optional() } else { ty };
            declaration.properties.push(
                Property::new(property.name.clone(), ty).with_comments(property.comments.clone()),
            );
        }
        tracing::debug!("declaring query parameters of '{}'", bean.name);
        self.query_beans.push(declaration);
        symbol
    }

    fn compile_method(
        &mut self,
        symbols: &mut SymbolTable,
        method: &RestMethod,
        long_name: bool,
        implement: bool,
    ) -> Method {
        let path = join_path(self.application.path.as_deref(), &method.path);
        let template = self.parser.parse(&path);

        let mut parameters = Vec::new();
        for param in &method.path_params {
            let ty = self.map_type(symbols, &param.ty, method);
            parameters.push(Parameter::new(to_valid_identifier(&param.name), ty));
        }
        if let Some(entity) = &method.entity {
            let ty = self.map_type(symbols, &entity.ty, method);
            parameters.push(Parameter::new(entity.name.clone(), ty));
        }
        let has_query = !method.query_params.is_empty();
        if has_query {
            let query_type = self.query_params_type(symbols, method);
            parameters.push(Parameter::new("queryParams", query_type.optional()));
        }
        let options = self.options_type();
        if let Some(options) = &options {
            parameters.push(Parameter::new("options", options.clone().optional()));
        }

        let returned = match &method.return_type {
            Some(ty) => self.map_type(symbols, ty, method),
            None => TypeExpr::void(),
        };
        let return_type = TypeExpr::generic_reference(self.response, vec![returned]);

        let name = if long_name {
            format!("{}${}${}", method.name, method.http_method, sanitize_path(&template))
        } else {
            method.name.clone()
        };

        let mut comments = method.comments.clone();
        comments.push(format!("HTTP {} /{}", method.http_method, path));
        comments.push(format!("Source method: {}.{}", method.resource, method.name));

        let body = implement.then(|| {
            let mut request = vec![
                ("method".to_string(), Some(Expression::StringLiteral(method.http_method.clone()))),
                ("url".to_string(), Some(uri_template(&template))),
            ];
            if has_query {
                request.push(("queryParams".into(), Some(Expression::identifier("queryParams"))));
            }
            if let Some(entity) = &method.entity {
                request.push(("data".into(), Some(Expression::identifier(&entity.name))));
            }
            if options.is_some() {
                request.push(("options".into(), Some(Expression::identifier("options"))));
            }
            vec![Statement::Return(Some(
                Expression::This
                    .member("httpClient")
                    .member("request")
                    .call(vec![Expression::Object(request)]),
            ))]
        });

        Method {
            body,
            comments,
            ..Method::declared(name, parameters, return_type)
        }
    }
}

/// Path rendered into a method name suffix (`people/{id}` -> `people_id`)
fn sanitize_path(template: &PathTemplate) -> String {
    template
        .format("", "", false)
        .replace('/', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// `` uriEncoding`people/${id}` ``
fn uri_template(template: &PathTemplate) -> Expression {
    let parts = template
        .parts
        .iter()
        .map(|part| match part {
            PathPart::Literal(literal) => TemplatePart::Literal(literal.clone()),
            PathPart::Parameter { .. } => TemplatePart::Substitution(Expression::identifier(
                part.valid_name().unwrap_or_default(),
            )),
        })
        .collect();
    Expression::TaggedTemplate {
        tag: Box::new(Expression::identifier("uriEncoding")),
        parts,
    }
}

/// Pass a `copyFn` reviving the response body to every client request
fn add_copy_functions(model: TargetModel, response: Symbol) -> TargetModel {
    let clients: Vec<DataDeclaration> = model
        .data
        .iter()
        .map(|declaration| {
            if !(declaration.is_class && declaration.category == DeclarationCategory::Service) {
                return declaration.clone();
            }
            let methods = declaration
                .methods
                .iter()
                .map(|method| with_copy_function(&model, method, response))
                .collect();
            DataDeclaration {
                methods,
                ..declaration.clone()
            }
        })
        .collect();
    TargetModel {
        data: clients,
        ..model
    }
}

fn with_copy_function(model: &TargetModel, method: &Method, response: Symbol) -> Method {
    let returned = match &method.return_type {
        TypeExpr::Reference { symbol, type_args }
            if *symbol == response && type_args.len() == 1 =>
        {
            &type_args[0]
        }
        _ => return method.clone(),
    };
    let copy = if *returned == TypeExpr::Primitive(PrimitiveKind::Void) {
        Expression::Undefined
    } else {
        copy_function(model, returned)
    };

    let mut method = method.clone();
    if let Some([Statement::Return(Some(Expression::Call { args, .. }))]) =
        method.body.as_deref_mut()
    {
        if let Some(Expression::Object(entries)) = args.first_mut() {
            let position = entries
                .iter()
                .position(|(key, _)| key == "options")
                .unwrap_or(entries.len());
            entries.insert(position, ("copyFn".into(), Some(copy)));
        }
    }
    method
}
