//! Final declaration order

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::ir::{DataDeclaration, Declaration, SortedModel, TargetModel};
use crate::settings::SortMode;
use crate::symbols::{ResolvedSymbols, Symbol};

/// Names compare lexically; unnamed symbols sort last
fn compare_names(a: Option<String>, b: Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_name(symbols: &ResolvedSymbols, a: Symbol, b: Symbol) -> Ordering {
    compare_names(symbols.full_name(a), symbols.full_name(b))
}

/// Order the model for emission: data declarations (each after its parent),
/// then aliases, then enums.
pub fn sort_declarations(
    model: TargetModel,
    symbols: &ResolvedSymbols,
    mode: SortMode,
) -> SortedModel {
    let TargetModel {
        mut data,
        mut aliases,
        mut enums,
        helpers,
        ..
    } = model;

    if matches!(mode, SortMode::PropertiesOnly | SortMode::Full) {
        for declaration in &mut data {
            declaration.properties.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }
    if mode == SortMode::Full {
        data.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| by_name(symbols, a.symbol, b.symbol))
        });
        aliases.sort_by(|a, b| by_name(symbols, a.symbol, b.symbol));
        enums.sort_by(|a, b| by_name(symbols, a.symbol, b.symbol));
    }

    let mut ordered: Vec<usize> = Vec::with_capacity(data.len());
    let mut visited = HashSet::new();
    for index in 0..data.len() {
        add_parent_first(&data, index, &mut visited, &mut ordered);
    }
    tracing::debug!("ordered {} data declarations parent-first", ordered.len());

    let mut slots: Vec<Option<DataDeclaration>> = data.into_iter().map(Some).collect();
    let mut declarations: Vec<Declaration> = ordered
        .into_iter()
        .filter_map(|index| slots[index].take())
        .map(Declaration::Data)
        .collect();
    declarations.extend(aliases.into_iter().map(Declaration::Alias));
    declarations.extend(enums.into_iter().map(Declaration::Enum));

    SortedModel { declarations, helpers }
}

fn add_parent_first(
    data: &[DataDeclaration],
    index: usize,
    visited: &mut HashSet<usize>,
    ordered: &mut Vec<usize>,
) {
    if !visited.insert(index) {
        return;
    }
    let parent = data[index]
        .parent
        .as_ref()
        .and_then(|p| p.referenced_symbol())
        .and_then(|symbol| data.iter().position(|d| d.symbol == symbol));
    if let Some(parent) = parent {
        add_parent_first(data, parent, visited, ordered);
    }
    ordered.push(index);
}
