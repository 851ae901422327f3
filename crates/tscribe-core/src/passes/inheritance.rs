//! Property reconciliation along the inheritance graph

use std::collections::{HashMap, HashSet};

use crate::ir::{DataDeclaration, Property, TargetModel};
use crate::symbols::Symbol;
use crate::types::TypeExpr;

/// Properties (name -> type) a declaration inherits through `supertypes`.
///
/// Ancestors are visited before the supertype itself, so the nearest
/// declaration of a name wins. Supertypes missing from the model contribute
/// nothing.
pub fn inherited_properties<'a>(
    model: &TargetModel,
    supertypes: impl IntoIterator<Item = &'a TypeExpr>,
) -> HashMap<String, TypeExpr> {
    let mut inherited = HashMap::new();
    collect_inherited(model, supertypes, &mut HashSet::new(), &mut inherited);
    inherited
}

/// Properties inherited by `declaration` through all its supertypes
pub fn inherited_properties_of(
    model: &TargetModel,
    declaration: &DataDeclaration,
) -> HashMap<String, TypeExpr> {
    let mut inherited = HashMap::new();
    let mut path = HashSet::from([declaration.symbol]);
    collect_inherited(model, declaration.supertypes(), &mut path, &mut inherited);
    inherited
}

fn collect_inherited<'a>(
    model: &TargetModel,
    supertypes: impl IntoIterator<Item = &'a TypeExpr>,
    path: &mut HashSet<Symbol>,
    inherited: &mut HashMap<String, TypeExpr>,
) {
    for supertype in supertypes {
        let Some(declaration) = supertype.referenced_symbol().and_then(|s| model.find_data(s))
        else {
            continue;
        };
        if !path.insert(declaration.symbol) {
            continue;
        }
        collect_inherited(model, declaration.supertypes(), path, inherited);
        for property in &declaration.properties {
            inherited.insert(property.name.clone(), property.ty.clone());
        }
        path.remove(&declaration.symbol);
    }
}

/// Drop properties that restate an inherited property with the same type.
/// Properties marked `own` are always kept.
pub fn remove_inherited_properties(model: TargetModel) -> TargetModel {
    let data = model
        .data
        .iter()
        .map(|declaration| {
            let inherited = inherited_properties_of(&model, declaration);
            let properties = declaration
                .properties
                .iter()
                .filter(|property| {
                    let keep = property.own || inherited.get(&property.name) != Some(&property.ty);
                    if !keep {
                        tracing::trace!("removing inherited property '{}'", property.name);
                    }
                    keep
                })
                .cloned()
                .collect();
            DataDeclaration {
                properties,
                ..declaration.clone()
            }
        })
        .collect();
    TargetModel { data, ..model }
}

fn implemented_properties<'a>(
    model: &TargetModel,
    interfaces: impl IntoIterator<Item = &'a TypeExpr>,
    path: &mut HashSet<Symbol>,
    properties: &mut Vec<Property>,
) {
    for interface in interfaces {
        let Some(declaration) = interface.referenced_symbol().and_then(|s| model.find_data(s))
        else {
            continue;
        };
        if !path.insert(declaration.symbol) {
            continue;
        }
        implemented_properties(model, declaration.supertypes(), path, properties);
        properties.extend(declaration.properties.iter().cloned());
        path.remove(&declaration.symbol);
    }
}

/// Copy properties of implemented interfaces into class-like declarations,
/// which cannot inherit them. Names already present (own or inherited from
/// the parent) are skipped; for duplicated names the last interface wins.
pub fn add_implemented_properties(model: TargetModel) -> TargetModel {
    let data = model
        .data
        .iter()
        .map(|declaration| {
            if !declaration.is_class {
                return declaration.clone();
            }
            let mut present: HashSet<String> = declaration
                .properties
                .iter()
                .map(|p| p.name.clone())
                .collect();
            present.extend(inherited_properties(&model, declaration.parent.iter()).into_keys());

            let mut implemented = Vec::new();
            implemented_properties(
                &model,
                &declaration.interfaces,
                &mut HashSet::new(),
                &mut implemented,
            );

            let mut properties = declaration.properties.clone();
            for property in implemented.into_iter().rev() {
                if present.insert(property.name.clone()) {
                    properties.insert(0, Property { own: false, ..property });
                }
            }
            DataDeclaration {
                properties,
                ..declaration.clone()
            }
        })
        .collect();
    TargetModel { data, ..model }
}
