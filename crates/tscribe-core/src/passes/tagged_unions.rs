//! Tagged union synthesis

use std::collections::HashMap;

use crate::ir::{AliasDeclaration, DataDeclaration, TargetModel};
use crate::symbols::{Symbol, SymbolTable};
use crate::types::TypeExpr;

/// Declare a `<Base>Union` alias for every declaration with a discriminant
/// and tagged union members, then use it in place of bare references to the
/// base.
pub fn create_tagged_unions(symbols: &mut SymbolTable, model: TargetModel) -> TargetModel {
    let TargetModel {
        data,
        mut aliases,
        enums,
        helpers,
        inlined_enums,
    } = model;

    let members_by_base: Vec<(Symbol, Vec<TypeExpr>)> = data
        .iter()
        .filter(|d| d.discriminant_property.is_some() && !d.tagged_union_members.is_empty())
        .map(|base| {
            let members = base
                .tagged_union_members
                .iter()
                .filter_map(|entity| {
                    let member = data.iter().find(|d| d.origin.as_deref() == Some(entity.as_str()));
                    if member.is_none() {
                        tracing::debug!("tagged union member '{}' is not declared", entity);
                    }
                    member.map(|m| TypeExpr::reference(m.symbol))
                })
                .collect();
            (base.symbol, members)
        })
        .collect();

    let mut union_of: HashMap<Symbol, Symbol> = HashMap::new();
    for (base, members) in members_by_base {
        let alias = symbols.add_suffix_to_symbol(base, "Union");
        let origin = data.iter().find(|d| d.symbol == base).and_then(|d| d.origin.clone());
        aliases.push(AliasDeclaration {
            origin,
            ..AliasDeclaration::new(alias, TypeExpr::Union(members))
        });
        union_of.insert(base, alias);
    }

    let data = data
        .into_iter()
        .map(|declaration| match union_of.get(&declaration.symbol) {
            Some(alias) => DataDeclaration {
                tagged_union_alias: Some(*alias),
                ..declaration
            },
            None => declaration,
        })
        .collect();

    let model = TargetModel {
        data,
        aliases,
        enums,
        helpers,
        inlined_enums,
    };
    use_tagged_unions_in(model, |_| true)
}

/// Replace bare references to tagged union bases with their union alias in
/// `filter`ed declarations. Generic references are left untouched since the
/// alias takes no type parameters.
pub fn use_tagged_unions_in<P>(model: TargetModel, filter: P) -> TargetModel
where
    P: Fn(&DataDeclaration) -> bool,
{
    let union_of: HashMap<Symbol, Symbol> = model
        .data
        .iter()
        .filter_map(|d| d.tagged_union_alias.map(|alias| (d.symbol, alias)))
        .collect();
    if union_of.is_empty() {
        return model;
    }
    model.transform_data_types(filter, &mut |ty| match &ty {
        TypeExpr::Reference { symbol, type_args } if type_args.is_empty() => {
            match union_of.get(symbol) {
                Some(alias) => TypeExpr::reference(*alias),
                None => ty,
            }
        }
        _ => ty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DeclarationCategory, Property};

    fn shapes(symbols: &mut SymbolTable) -> TargetModel {
        let data = ["Shape", "Circle", "Square", "Drawing"]
            .iter()
            .map(|name| {
                let mut declaration =
                    DataDeclaration::new(symbols.get_symbol(name), DeclarationCategory::Data);
                declaration.origin = Some(name.to_string());
                declaration
            })
            .collect::<Vec<_>>();
        let mut model = TargetModel {
            data,
            ..Default::default()
        };
        let shape = symbols.get_symbol("Shape");
        model.data[0].discriminant_property = Some("kind".into());
        model.data[0].tagged_union_members =
            vec!["Circle".into(), "Square".into(), "Hexagon".into()];
        model.data[3].properties = vec![
            Property::new("main", TypeExpr::reference(shape)),
            Property::new("all", TypeExpr::array(TypeExpr::reference(shape))),
            Property::new("boxed", TypeExpr::generic_reference(shape, vec![TypeExpr::string()])),
        ];
        model
    }

    #[test]
    fn test_union_contains_declared_members() {
        let mut symbols = SymbolTable::new();
        let model = shapes(&mut symbols);
        let model = create_tagged_unions(&mut symbols, model);
        let alias = symbols.get_symbol_with_suffix("Shape", "Union");

        assert_eq!(model.aliases.len(), 1);
        assert_eq!(model.aliases[0].symbol, alias);
        assert_eq!(
            model.aliases[0].definition,
            TypeExpr::Union(vec![
                TypeExpr::reference(symbols.get_symbol("Circle")),
                TypeExpr::reference(symbols.get_symbol("Square")),
            ])
        );
        assert_eq!(model.data[0].tagged_union_alias, Some(alias));
    }

    #[test]
    fn test_only_bare_references_are_rewritten() {
        let mut symbols = SymbolTable::new();
        let model = shapes(&mut symbols);
        let model = create_tagged_unions(&mut symbols, model);
        let shape = symbols.get_symbol("Shape");
        let alias = symbols.get_symbol_with_suffix("Shape", "Union");

        let drawing = &model.data[3];
        assert_eq!(drawing.properties[0].ty, TypeExpr::reference(alias));
        assert_eq!(drawing.properties[1].ty, TypeExpr::array(TypeExpr::reference(alias)));
        assert_eq!(
            drawing.properties[2].ty,
            TypeExpr::generic_reference(shape, vec![TypeExpr::string()])
        );
    }

    #[test]
    fn test_no_discriminant_no_union() {
        let mut symbols = SymbolTable::new();
        let mut model = shapes(&mut symbols);
        model.data[0].discriminant_property = None;
        let model = create_tagged_unions(&mut symbols, model);
        assert!(model.aliases.is_empty());
        assert!(model.data[0].tagged_union_alias.is_none());
    }
}
