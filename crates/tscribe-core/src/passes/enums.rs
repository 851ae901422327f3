//! Enum representation

use std::collections::BTreeMap;

use crate::ir::{AliasDeclaration, DataDeclaration, EnumKind, EnumRepresentation, TargetModel};
use crate::settings::EnumMapping;
use crate::symbols::Symbol;
use crate::types::TypeExpr;

/// Apply the configured enum representation. Exactly one mode applies.
pub fn transform_enums(model: TargetModel, mapping: EnumMapping) -> TargetModel {
    match mapping {
        EnumMapping::LiteralUnion => enums_to_literal_unions(model).0,
        EnumMapping::InlinedLiteralUnion => {
            let (model, converted) = enums_to_literal_unions(model);
            inline_literal_unions(model, &converted)
        }
        EnumMapping::NumericPlaceholder => enums_to_numeric_placeholders(model),
        EnumMapping::Unmodified => with_representation(model, EnumRepresentation::Valued),
    }
}

fn with_representation(mut model: TargetModel, representation: EnumRepresentation) -> TargetModel {
    model.enums = model
        .enums
        .into_iter()
        .map(|mut declaration| {
            declaration.representation = representation;
            declaration
        })
        .collect();
    model
}

/// String-based enums become aliases of the union of their literal values.
/// Number-based enums keep their values. Returns the converted symbols.
fn enums_to_literal_unions(model: TargetModel) -> (TargetModel, Vec<Symbol>) {
    let TargetModel {
        data,
        mut aliases,
        enums,
        helpers,
        inlined_enums,
    } = model;

    let mut remaining = Vec::new();
    let mut converted = Vec::new();
    for declaration in enums {
        if declaration.kind != EnumKind::StringBased {
            remaining.push(declaration);
            continue;
        }
        converted.push(declaration.symbol);
        let values: Vec<String> = declaration
            .members
            .iter()
            .map(|member| {
                member
                    .value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or(&member.name)
                    .to_string()
            })
            .collect();
        aliases.push(AliasDeclaration {
            origin: Some(declaration.origin),
            symbol: declaration.symbol,
            type_parameters: Vec::new(),
            definition: TypeExpr::literal_union(values),
            comments: declaration.comments,
        });
    }

    let model = with_representation(
        TargetModel {
            data,
            aliases,
            enums: remaining,
            helpers,
            inlined_enums,
        },
        EnumRepresentation::Valued,
    );
    (model, converted)
}

/// Substitute references to enum aliases by their definition and drop the
/// aliases. The substituted definitions are remembered on the model so
/// declarations created later can be rewritten the same way.
fn inline_literal_unions(mut model: TargetModel, converted: &[Symbol]) -> TargetModel {
    let (inlined, kept): (Vec<AliasDeclaration>, Vec<AliasDeclaration>) = model
        .aliases
        .into_iter()
        .partition(|alias| converted.contains(&alias.symbol));
    model.aliases = kept;
    model
        .inlined_enums
        .extend(inlined.into_iter().map(|alias| (alias.symbol, alias.definition)));

    let definitions = model.inlined_enums.clone();
    substitute_inlined_enums(model, &definitions, |_| true)
}

/// Replace bare references to inlined enum aliases in `filter`ed declarations
pub fn substitute_inlined_enums<P>(
    model: TargetModel,
    definitions: &BTreeMap<Symbol, TypeExpr>,
    filter: P,
) -> TargetModel
where
    P: Fn(&DataDeclaration) -> bool,
{
    if definitions.is_empty() {
        return model;
    }
    model.transform_data_types(filter, &mut |ty| match &ty {
        TypeExpr::Reference { symbol, type_args } if type_args.is_empty() => {
            definitions.get(symbol).cloned().unwrap_or(ty)
        }
        _ => ty,
    })
}

/// Members keep their names but lose their values
fn enums_to_numeric_placeholders(mut model: TargetModel) -> TargetModel {
    model.enums = model
        .enums
        .into_iter()
        .map(|mut declaration| {
            if declaration.kind == EnumKind::StringBased {
                for member in &mut declaration.members {
                    member.value = None;
                }
                declaration.representation = EnumRepresentation::NumericPlaceholder;
            } else {
                declaration.representation = EnumRepresentation::Valued;
            }
            declaration
        })
        .collect();
    model
}
