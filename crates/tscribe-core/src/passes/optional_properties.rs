//! Declaration form of optional data properties

use crate::ir::{DataDeclaration, DeclarationCategory, Property, TargetModel};
use crate::settings::OptionalPropertiesDeclaration;
use crate::types::{PrimitiveKind, TypeExpr};

/// Rewrite `name?: T` of data declarations into the configured form.
/// Service declarations keep their optional parameters and properties.
pub fn declare_optional_properties(
    model: TargetModel,
    declaration: OptionalPropertiesDeclaration,
) -> TargetModel {
    if declaration == OptionalPropertiesDeclaration::QuestionMark {
        return model;
    }
    let data = model
        .data
        .into_iter()
        .map(|d| {
            if d.category != DeclarationCategory::Data {
                return d;
            }
            let properties = d
                .properties
                .into_iter()
                .map(|p| rewrite(p, declaration))
                .collect();
            DataDeclaration { properties, ..d }
        })
        .collect();
    TargetModel { data, ..model }
}

fn rewrite(property: Property, declaration: OptionalPropertiesDeclaration) -> Property {
    let inner = match property.ty {
        TypeExpr::Optional(inner) => *inner,
        _ => return property,
    };
    let ty = match declaration {
        OptionalPropertiesDeclaration::QuestionMark => inner.optional(),
        OptionalPropertiesDeclaration::Nullable => union_with(inner, &[PrimitiveKind::Null]),
        OptionalPropertiesDeclaration::QuestionMarkAndNullable => {
            union_with(inner, &[PrimitiveKind::Null]).optional()
        }
        OptionalPropertiesDeclaration::Undefinable => {
            union_with(inner, &[PrimitiveKind::Undefined])
        }
        OptionalPropertiesDeclaration::NullableAndUndefinable => {
            union_with(inner, &[PrimitiveKind::Null, PrimitiveKind::Undefined])
        }
    };
    Property { ty, ..property }
}

/// `T | extra...`, flattening a union `T`
fn union_with(ty: TypeExpr, extra: &[PrimitiveKind]) -> TypeExpr {
    let mut members = match ty {
        TypeExpr::Union(members) => members,
        other => vec![other],
    };
    for kind in extra {
        let member = TypeExpr::Primitive(*kind);
        if !members.contains(&member) {
            members.push(member);
        }
    }
    TypeExpr::Union(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    const NULL: TypeExpr = TypeExpr::Primitive(PrimitiveKind::Null);
    const UNDEFINED: TypeExpr = TypeExpr::Primitive(PrimitiveKind::Undefined);

    fn model(symbols: &mut SymbolTable, category: DeclarationCategory) -> TargetModel {
        let mut declaration = DataDeclaration::new(symbols.get_symbol("Person"), category);
        declaration.properties = vec![
            Property::new("name", TypeExpr::string()),
            Property::new("nickname", TypeExpr::string().optional()),
            Property::new(
                "id",
                TypeExpr::Union(vec![TypeExpr::string(), TypeExpr::number()]).optional(),
            ),
        ];
        TargetModel {
            data: vec![declaration],
            ..Default::default()
        }
    }

    fn types(model: &TargetModel) -> Vec<TypeExpr> {
        model.data[0].properties.iter().map(|p| p.ty.clone()).collect()
    }

    #[test]
    fn test_question_mark_is_unchanged() {
        let mut symbols = SymbolTable::new();
        let before = model(&mut symbols, DeclarationCategory::Data);
        let after = declare_optional_properties(
            before.clone(),
            OptionalPropertiesDeclaration::QuestionMark,
        );
        assert_eq!(after, before);
    }

    #[test]
    fn test_nullable() {
        let mut symbols = SymbolTable::new();
        let model = declare_optional_properties(
            model(&mut symbols, DeclarationCategory::Data),
            OptionalPropertiesDeclaration::Nullable,
        );
        assert_eq!(
            types(&model),
            vec![
                TypeExpr::string(),
                TypeExpr::Union(vec![TypeExpr::string(), NULL]),
                TypeExpr::Union(vec![TypeExpr::string(), TypeExpr::number(), NULL]),
            ]
        );
    }

    #[test]
    fn test_question_mark_and_nullable_stays_optional() {
        let mut symbols = SymbolTable::new();
        let model = declare_optional_properties(
            model(&mut symbols, DeclarationCategory::Data),
            OptionalPropertiesDeclaration::QuestionMarkAndNullable,
        );
        assert_eq!(
            types(&model)[1],
            TypeExpr::Union(vec![TypeExpr::string(), NULL]).optional()
        );
    }

    #[test]
    fn test_undefinable_variants() {
        let mut symbols = SymbolTable::new();
        let undefinable = declare_optional_properties(
            model(&mut symbols, DeclarationCategory::Data),
            OptionalPropertiesDeclaration::Undefinable,
        );
        assert_eq!(
            types(&undefinable)[1],
            TypeExpr::Union(vec![TypeExpr::string(), UNDEFINED])
        );

        let both = declare_optional_properties(
            model(&mut symbols, DeclarationCategory::Data),
            OptionalPropertiesDeclaration::NullableAndUndefinable,
        );
        assert_eq!(
            types(&both)[1],
            TypeExpr::Union(vec![TypeExpr::string(), NULL, UNDEFINED])
        );
    }

    #[test]
    fn test_service_declarations_are_skipped() {
        let mut symbols = SymbolTable::new();
        let before = model(&mut symbols, DeclarationCategory::Service);
        let after = declare_optional_properties(
            before.clone(),
            OptionalPropertiesDeclaration::Nullable,
        );
        assert_eq!(after, before);
    }
}
