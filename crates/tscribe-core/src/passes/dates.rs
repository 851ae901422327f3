//! Date representation

use crate::ir::{AliasDeclaration, DataDeclaration, TargetModel};
use crate::settings::DateMapping;
use crate::symbols::SymbolTable;
use crate::types::{PrimitiveKind, TypeExpr};

const TEMPORAL: TypeExpr = TypeExpr::Primitive(PrimitiveKind::Temporal);

/// Name and definition of the alias standing in for dates
fn date_alias(mapping: DateMapping) -> Option<(&'static str, TypeExpr)> {
    match mapping {
        DateMapping::Unmodified => None,
        DateMapping::AsNumber => Some(("DateAsNumber", TypeExpr::number())),
        DateMapping::AsString => Some(("DateAsString", TypeExpr::string())),
    }
}

/// Replace the temporal placeholder in every type of `filter`ed declarations
/// with a reference to the date alias. The alias is declared only when at
/// least one occurrence was replaced.
pub fn transform_dates_in<P>(
    symbols: &mut SymbolTable,
    model: TargetModel,
    mapping: DateMapping,
    filter: P,
) -> TargetModel
where
    P: Fn(&DataDeclaration) -> bool,
{
    let Some((name, definition)) = date_alias(mapping) else {
        return model;
    };

    let mut alias = None;
    let mut replaced = 0usize;
    let mut model = model.transform_data_types(filter, &mut |ty| {
        if ty == TEMPORAL {
            replaced += 1;
            let symbol = *alias.get_or_insert_with(|| symbols.get_synthetic_symbol(name, None));
            TypeExpr::reference(symbol)
        } else {
            ty
        }
    });

    if let Some(alias) = alias {
        if model.find_alias(alias).is_none() {
            tracing::debug!("declaring {} for {} date occurrence(s)", name, replaced);
            model.aliases.push(AliasDeclaration::new(alias, definition));
        }
    }
    model
}

pub fn transform_dates(
    symbols: &mut SymbolTable,
    model: TargetModel,
    mapping: DateMapping,
) -> TargetModel {
    transform_dates_in(symbols, model, mapping, |_| true)
}
