//! Property-based tests for inherited property removal

use std::collections::HashSet;

use proptest::prelude::*;
use tscribe_core::ir::{DataDeclaration, DeclarationCategory, Property, TargetModel};
use tscribe_core::passes::remove_inherited_properties;
use tscribe_core::{SymbolTable, TypeExpr};

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

fn type_of(index: usize) -> TypeExpr {
    match index {
        0 => TypeExpr::string(),
        1 => TypeExpr::number(),
        _ => TypeExpr::array(TypeExpr::boolean()),
    }
}

type DeclarationShape = (Option<usize>, Vec<usize>, Vec<(usize, usize, bool)>);

// Parent, interfaces and properties of one declaration. Supertype indices
// are taken modulo the declaration's position so the hierarchy is acyclic;
// property names are unique within a declaration.
fn declaration_shape() -> impl Strategy<Value = DeclarationShape> {
    (
        proptest::option::of(0usize..8),
        prop::collection::vec(0usize..8, 0..3),
        prop::collection::vec((0usize..NAMES.len(), 0usize..3, any::<bool>()), 0..5),
    )
}

fn build_model(shapes: Vec<DeclarationShape>) -> TargetModel {
    let mut table = SymbolTable::new();
    let symbols: Vec<_> = (0..shapes.len())
        .map(|i| table.get_symbol(&format!("com.example.D{i}")))
        .collect();

    let data = shapes
        .into_iter()
        .enumerate()
        .map(|(i, (parent, interfaces, properties))| {
            let mut declaration = DataDeclaration::new(symbols[i], DeclarationCategory::Data);
            if i > 0 {
                declaration.parent = parent.map(|p| TypeExpr::reference(symbols[p % i]));
                declaration.interfaces = interfaces
                    .into_iter()
                    .map(|p| TypeExpr::reference(symbols[p % i]))
                    .collect();
            }
            let mut seen = HashSet::new();
            declaration.properties = properties
                .into_iter()
                .filter(|(name, _, _)| seen.insert(*name))
                .map(|(name, ty, own)| {
                    let property = Property::new(NAMES[name], type_of(ty));
                    if own {
                        property.own()
                    } else {
                        property
                    }
                })
                .collect();
            declaration
        })
        .collect();

    TargetModel {
        data,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn removal_is_idempotent(shapes in prop::collection::vec(declaration_shape(), 1..7)) {
        let once = remove_inherited_properties(build_model(shapes));
        let twice = remove_inherited_properties(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn own_properties_survive(shapes in prop::collection::vec(declaration_shape(), 1..7)) {
        let model = build_model(shapes);
        let own_before: usize = model
            .data
            .iter()
            .flat_map(|d| &d.properties)
            .filter(|p| p.own)
            .count();
        let removed = remove_inherited_properties(model);
        let own_after: usize = removed
            .data
            .iter()
            .flat_map(|d| &d.properties)
            .filter(|p| p.own)
            .count();
        prop_assert_eq!(own_before, own_after);
    }

    #[test]
    fn roots_are_untouched(shapes in prop::collection::vec(declaration_shape(), 1..7)) {
        let model = build_model(shapes);
        let root = model.data[0].clone();
        let removed = remove_inherited_properties(model);
        prop_assert_eq!(&removed.data[0], &root);
    }
}
