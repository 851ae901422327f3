//! Deserialization ("revive") functions for data classes
//!
//! Every concrete data class gets a static `fromData` that rebuilds a typed
//! instance from plain parsed JSON. Generic classes additionally get
//! `fromDataFn`, tagged union bases get `fromDataUnion`.

use crate::code::{ArrowParameter, Expression, Statement, SwitchCase};
use crate::ir::{DataDeclaration, Helper, Method, Modifiers, Parameter, TargetModel};
use crate::passes::inheritance::inherited_properties;
use crate::symbols::Symbol;
use crate::types::{FunctionParam, TypeExpr};

const IDENTITY: &str = "__identity";

pub fn create_revive_functions(model: TargetModel) -> TargetModel {
    let model = model.with_helper(Helper::CopyFunctions);
    let data = model
        .data
        .iter()
        .map(|declaration| {
            if !declaration.is_data_class() {
                return declaration.clone();
            }
            let mut methods = declaration.methods.clone();
            methods.insert(0, from_data(&model, declaration));
            if !declaration.type_parameters.is_empty() {
                methods.insert(0, from_data_fn(declaration));
            }
            if declaration.tagged_union_alias.is_some() {
                methods.insert(1, from_data_union(&model, declaration));
            }
            DataDeclaration {
                methods,
                ..declaration.clone()
            }
        })
        .collect();
    TargetModel { data, ..model }
}

fn type_variables(declaration: &DataDeclaration) -> Vec<TypeExpr> {
    declaration
        .type_parameters
        .iter()
        .map(|name| TypeExpr::GenericVariable(name.clone()))
        .collect()
}

/// `X` or `X<T, ...>` over the declaration's own type parameters
fn self_type(declaration: &DataDeclaration) -> TypeExpr {
    TypeExpr::generic_reference(declaration.symbol, type_variables(declaration))
}

fn constructor_fn_name(type_parameter: &str) -> String {
    format!("constructorFnOf{}", type_parameter)
}

/// `constructorFnOfT: (data: T) => T` for every type parameter
fn constructor_fn_parameters(declaration: &DataDeclaration) -> Vec<Parameter> {
    declaration
        .type_parameters
        .iter()
        .map(|name| {
            let variable = TypeExpr::GenericVariable(name.clone());
            Parameter::new(
                constructor_fn_name(name),
                TypeExpr::function(
                    vec![FunctionParam {
                        name: "data".into(),
                        ty: variable.clone(),
                    }],
                    variable,
                ),
            )
        })
        .collect()
}

fn static_method(
    name: &str,
    declaration: &DataDeclaration,
    parameters: Vec<Parameter>,
    return_type: TypeExpr,
    body: Vec<Statement>,
) -> Method {
    Method {
        name: name.into(),
        modifiers: Modifiers::static_(),
        type_parameters: declaration.type_parameters.clone(),
        parameters,
        return_type,
        body: Some(body),
        comments: Vec::new(),
    }
}

fn from_data(model: &TargetModel, declaration: &DataDeclaration) -> Method {
    let data_type = self_type(declaration);
    let mut parameters = vec![Parameter::new("data", data_type.clone())];
    parameters.extend(constructor_fn_parameters(declaration));
    parameters.push(Parameter::new("target", data_type.clone().optional()));

    let mut body = vec![
        Statement::return_if_falsy("data"),
        Statement::Const {
            name: "instance".into(),
            value: Expression::identifier("target").or(Expression::New {
                class: data_type.clone(),
                args: Vec::new(),
            }),
        },
    ];
    if declaration.parent.is_some() {
        body.push(Statement::Expression(Expression::Super.member("fromData").call(vec![
            Expression::identifier("data"),
            Expression::identifier("instance"),
        ])));
    }
    let inherited = inherited_properties(model, declaration.parent.iter());
    for property in &declaration.properties {
        if inherited.contains_key(&property.name) {
            continue;
        }
        let source = Expression::identifier("data").member(&property.name);
        let copy = copy_function(model, &property.ty);
        let value = if copy.is_call_of(IDENTITY) {
            source
        } else {
            copy.call(vec![source])
        };
        body.push(Statement::Expression(
            Expression::identifier("instance").member(&property.name).assign(value),
        ));
    }
    body.push(Statement::Return(Some(Expression::identifier("instance"))));

    static_method("fromData", declaration, parameters, data_type, body)
}

fn from_data_fn(declaration: &DataDeclaration) -> Method {
    let data_type = self_type(declaration);
    let parameters = constructor_fn_parameters(declaration);

    let mut args = vec![Expression::identifier("data")];
    args.extend(parameters.iter().map(|p| Expression::identifier(&p.name)));
    let arrow = Expression::Arrow {
        params: vec![ArrowParameter {
            name: "data".into(),
            ty: None,
        }],
        body: Box::new(
            Expression::TypeReference(TypeExpr::reference(declaration.symbol))
                .member("fromData")
                .call(args),
        ),
    };
    let return_type = TypeExpr::function(
        vec![FunctionParam {
            name: "data".into(),
            ty: data_type.clone(),
        }],
        data_type,
    );
    let body = vec![Statement::Return(Some(arrow))];
    static_method("fromDataFn", declaration, parameters, return_type, body)
}

fn from_data_union(model: &TargetModel, declaration: &DataDeclaration) -> Method {
    let union_type = declaration
        .tagged_union_alias
        .map(TypeExpr::reference)
        .unwrap_or(TypeExpr::Any);
    let discriminant = declaration.discriminant_property.clone().unwrap_or_default();

    let cases = declaration
        .tagged_union_members
        .iter()
        .filter_map(|entity| model.find_data_by_origin(entity))
        .filter_map(|member| {
            let literal = member.discriminant_literal.clone()?;
            Some(SwitchCase {
                test: Expression::StringLiteral(literal),
                body: vec![Statement::Return(Some(
                    Expression::TypeReference(TypeExpr::reference(member.symbol))
                        .member("fromData")
                        .call(vec![Expression::identifier("data")]),
                ))],
            })
        })
        .collect();
    let body = vec![
        Statement::return_if_falsy("data"),
        Statement::Switch {
            discriminant: Expression::identifier("data").member(discriminant),
            cases,
        },
    ];
    Method {
        type_parameters: Vec::new(),
        ..static_method(
            "fromDataUnion",
            declaration,
            vec![Parameter::new("data", union_type.clone())],
            union_type,
            body,
        )
    }
}

/// Expression evaluating to a function that copies a value of type `ty`
pub fn copy_function(model: &TargetModel, ty: &TypeExpr) -> Expression {
    match ty {
        TypeExpr::Reference { symbol, type_args } if !type_args.is_empty() => {
            let generic_class = find_revivable(model, *symbol)
                .filter(|d| d.symbol == *symbol && !d.type_parameters.is_empty());
            match generic_class {
                Some(referenced) => {
                    let args = type_args.iter().map(|arg| copy_function(model, arg)).collect();
                    Expression::TypeReference(TypeExpr::reference(referenced.symbol))
                        .member("fromDataFn")
                        .call_generic(type_args.clone(), args)
                }
                None => identity(ty),
            }
        }
        TypeExpr::Reference { symbol, .. } => match find_revivable(model, *symbol) {
            Some(referenced) => {
                let method = if referenced.tagged_union_alias.is_some() {
                    "fromDataUnion"
                } else {
                    "fromData"
                };
                Expression::TypeReference(TypeExpr::reference(referenced.symbol)).member(method)
            }
            _ => identity(ty),
        },
        TypeExpr::Array(element) => {
            Expression::identifier("__getCopyArrayFn").call(vec![copy_function(model, element)])
        }
        TypeExpr::IndexedMap { value, .. } => {
            Expression::identifier("__getCopyObjectFn").call(vec![copy_function(model, value)])
        }
        TypeExpr::GenericVariable(name) => Expression::identifier(constructor_fn_name(name)),
        TypeExpr::Optional(inner) => copy_function(model, inner),
        _ => identity(ty),
    }
}

/// Class declared for `symbol`, either directly or through its tagged union alias
fn find_revivable(model: &TargetModel, symbol: Symbol) -> Option<&DataDeclaration> {
    model
        .data
        .iter()
        .find(|d| d.symbol == symbol || d.tagged_union_alias == Some(symbol))
        .filter(|d| d.is_class)
}

fn identity(ty: &TypeExpr) -> Expression {
    Expression::identifier(IDENTITY).call_generic(vec![ty.clone()], Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DeclarationCategory, Property};
    use crate::symbols::SymbolTable;

    fn class(symbols: &mut SymbolTable, name: &str) -> DataDeclaration {
        let mut declaration =
            DataDeclaration::new(symbols.get_symbol(name), DeclarationCategory::Data);
        declaration.origin = Some(name.into());
        declaration.is_class = true;
        declaration
    }

    fn assignment(method: &Method, property: &str) -> Option<Expression> {
        method.body.iter().flatten().find_map(|statement| match statement {
            Statement::Expression(Expression::Assign { target, value })
                if **target == Expression::identifier("instance").member(property) =>
            {
                Some((**value).clone())
            }
            _ => None,
        })
    }

    #[test]
    fn test_from_data_copies_own_properties() {
        let mut symbols = SymbolTable::new();
        let mut base = class(&mut symbols, "Base");
        base.properties.push(Property::new("id", TypeExpr::string()));
        let mut address = class(&mut symbols, "Address");
        address.properties.push(Property::new("street", TypeExpr::string()));
        let mut person = class(&mut symbols, "Person");
        person.parent = Some(TypeExpr::reference(base.symbol));
        person.properties = vec![
            Property::new("id", TypeExpr::string()),
            Property::new("name", TypeExpr::string()),
            Property::new("home", TypeExpr::reference(address.symbol).optional()),
            Property::new("past", TypeExpr::array(TypeExpr::reference(address.symbol))),
        ];
        let model = create_revive_functions(TargetModel {
            data: vec![base, address, person],
            ..Default::default()
        });

        assert_eq!(model.helpers, vec![Helper::CopyFunctions]);
        let from_data = &model.data[2].methods[0];
        assert_eq!(from_data.name, "fromData");
        assert!(from_data.modifiers.is_static);
        assert!(assignment(from_data, "id").is_none());
        assert_eq!(
            assignment(from_data, "name"),
            Some(Expression::identifier("data").member("name"))
        );
        let address = TypeExpr::reference(symbols.get_symbol("Address"));
        let address_from_data = Expression::TypeReference(address).member("fromData");
        assert_eq!(
            assignment(from_data, "home"),
            Some(
                address_from_data
                    .clone()
                    .call(vec![Expression::identifier("data").member("home")])
            )
        );
        assert_eq!(
            assignment(from_data, "past"),
            Some(
                Expression::identifier("__getCopyArrayFn")
                    .call(vec![address_from_data])
                    .call(vec![Expression::identifier("data").member("past")])
            )
        );
        let calls_super = from_data.body.iter().flatten().any(|s| {
            matches!(s, Statement::Expression(Expression::Call { callee, .. })
                if **callee == Expression::Super.member("fromData"))
        });
        assert!(calls_super);
    }

    #[test]
    fn test_generic_class_gets_from_data_fn() {
        let mut symbols = SymbolTable::new();
        let mut boxed = class(&mut symbols, "Box");
        boxed.type_parameters = vec!["T".into()];
        boxed
            .properties
            .push(Property::new("items", TypeExpr::array(TypeExpr::GenericVariable("T".into()))));
        let model = create_revive_functions(TargetModel {
            data: vec![boxed],
            ..Default::default()
        });

        let methods = &model.data[0].methods;
        assert_eq!(methods[0].name, "fromDataFn");
        assert_eq!(methods[1].name, "fromData");
        assert_eq!(methods[1].parameters[1].name, "constructorFnOfT");
        assert_eq!(
            assignment(&methods[1], "items"),
            Some(
                Expression::identifier("__getCopyArrayFn")
                    .call(vec![Expression::identifier("constructorFnOfT")])
                    .call(vec![Expression::identifier("data").member("items")])
            )
        );
    }

    #[test]
    fn test_tagged_union_base_gets_dispatch() {
        let mut symbols = SymbolTable::new();
        let mut shape = class(&mut symbols, "Shape");
        shape.discriminant_property = Some("kind".into());
        shape.tagged_union_members = vec!["Circle".into(), "Square".into()];
        shape.tagged_union_alias = Some(symbols.get_symbol_with_suffix("Shape", "Union"));
        let mut circle = class(&mut symbols, "Circle");
        circle.discriminant_literal = Some("circle".into());
        let mut square = class(&mut symbols, "Square");
        square.discriminant_literal = Some("square".into());
        let mut drawing = class(&mut symbols, "Drawing");
        drawing.properties.push(Property::new("main", TypeExpr::reference(shape.symbol)));
        let union_alias = symbols.get_symbol_with_suffix("Shape", "Union");
        drawing.properties.push(Property::new("other", TypeExpr::reference(union_alias)));

        let model = create_revive_functions(TargetModel {
            data: vec![shape, circle, square, drawing],
            ..Default::default()
        });
        let methods = &model.data[0].methods;
        assert_eq!(methods[1].name, "fromDataUnion");
        let Some(Statement::Switch { cases, .. }) = methods[1].body.as_ref().and_then(|b| b.get(1))
        else {
            panic!("expected a switch statement");
        };
        let tests: Vec<_> = cases.iter().map(|c| c.test.clone()).collect();
        assert_eq!(
            tests,
            vec![
                Expression::StringLiteral("circle".into()),
                Expression::StringLiteral("square".into())
            ]
        );

        let shape = TypeExpr::reference(symbols.get_symbol("Shape"));
        let from_data_union = Expression::TypeReference(shape).member("fromDataUnion");
        let from_data = &model.data[3].methods[0];
        assert_eq!(
            assignment(from_data, "main"),
            Some(
                from_data_union
                    .clone()
                    .call(vec![Expression::identifier("data").member("main")])
            )
        );
        assert_eq!(
            assignment(from_data, "other"),
            Some(from_data_union.call(vec![Expression::identifier("data").member("other")]))
        );
    }

    #[test]
    fn test_generic_interface_is_copied_by_identity() {
        let mut symbols = SymbolTable::new();
        let mut page = class(&mut symbols, "Page");
        page.is_class = false;
        page.type_parameters = vec!["T".into()];
        let foo = class(&mut symbols, "Foo");
        let mut holder = class(&mut symbols, "Holder");
        let page_of_foo =
            TypeExpr::generic_reference(page.symbol, vec![TypeExpr::reference(foo.symbol)]);
        holder.properties.push(Property::new("page", page_of_foo));

        let model = create_revive_functions(TargetModel {
            data: vec![page, foo, holder],
            ..Default::default()
        });
        assert!(model.data[0].methods.is_empty());
        assert_eq!(
            assignment(&model.data[2].methods[0], "page"),
            Some(Expression::identifier("data").member("page"))
        );
    }

    #[test]
    fn test_interfaces_are_skipped() {
        let mut symbols = SymbolTable::new();
        let mut named = class(&mut symbols, "Named");
        named.is_class = false;
        let model = create_revive_functions(TargetModel {
            data: vec![named],
            ..Default::default()
        });
        assert!(model.data[0].methods.is_empty());
    }
}
