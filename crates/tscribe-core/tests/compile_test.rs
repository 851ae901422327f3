//! End-to-end compilation of the shared fixture graphs

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use tscribe_core::ir::{DataDeclaration, EnumRepresentation};
use tscribe_core::settings::{DateMapping, EnumMapping, RestCodegen, SortMode};
use tscribe_core::{compile, CompileError, CompileOutput, Settings, SourceGraph, Symbol, TypeExpr};
use tscribe_test_fixtures as fixtures;

fn graph(value: serde_json::Value) -> SourceGraph {
    serde_json::from_value(value).expect("fixture should deserialize")
}

fn compile_fixture(value: serde_json::Value, settings: &Settings) -> CompileOutput {
    compile(&graph(value), settings).expect("fixture should compile")
}

fn symbol(output: &CompileOutput, name: &str) -> Symbol {
    output
        .model
        .declarations
        .iter()
        .map(|d| d.symbol())
        .find(|s| output.symbols.full_name(*s).as_deref() == Some(name))
        .unwrap_or_else(|| panic!("no declaration named {name}"))
}

fn data<'a>(output: &'a CompileOutput, name: &str) -> &'a DataDeclaration {
    let symbol = symbol(output, name);
    output
        .model
        .data()
        .find(|d| d.symbol == symbol)
        .unwrap_or_else(|| panic!("{name} is not a data declaration"))
}

/// Property name -> referenced declaration name, for every declaration
fn reference_graph(output: &CompileOutput) -> BTreeMap<String, Vec<(String, Option<String>)>> {
    output
        .model
        .data()
        .map(|declaration| {
            let properties = declaration
                .properties
                .iter()
                .map(|p| {
                    let target = p.ty.referenced_symbol().and_then(|s| output.symbols.full_name(s));
                    (p.name.clone(), target)
                })
                .collect();
            (output.symbols.full_name(declaration.symbol).unwrap_or_default(), properties)
        })
        .collect()
}

#[test]
fn test_self_reference_terminates() {
    let output = compile_fixture(fixtures::self_cycle(), &Settings::default());
    let a = symbol(&output, "A");
    let declaration = data(&output, "A");

    assert_eq!(output.model.declarations.len(), 1);
    assert_eq!(declaration.properties.len(), 1);
    assert_eq!(declaration.properties[0].ty, TypeExpr::reference(a));
}

#[test]
fn test_mutual_references_are_order_independent() {
    let settings = Settings {
        sort_mode: SortMode::Full,
        ..Default::default()
    };
    let a_first = compile_fixture(fixtures::mutual_cycle(false), &settings);
    let b_first = compile_fixture(fixtures::mutual_cycle(true), &settings);

    let expected: BTreeMap<String, Vec<(String, Option<String>)>> = BTreeMap::from([
        ("A".to_string(), vec![("b".to_string(), Some("B".to_string()))]),
        ("B".to_string(), vec![("a".to_string(), Some("A".to_string()))]),
    ]);
    assert_eq!(reference_graph(&a_first), expected);
    assert_eq!(reference_graph(&b_first), expected);
}

#[test]
fn test_generic_use_site_substitutes_positionally() {
    let output = compile_fixture(fixtures::generic_box(), &Settings::default());
    let boxed = data(&output, "Box");
    let foo = symbol(&output, "Foo");

    assert_eq!(boxed.type_parameters, vec!["T"]);
    assert_eq!(
        boxed.properties[0].ty,
        TypeExpr::array(TypeExpr::GenericVariable("T".into()))
    );
    assert_eq!(
        data(&output, "Holder").properties[0].ty,
        TypeExpr::generic_reference(boxed.symbol, vec![TypeExpr::reference(foo)])
    );
}

#[test]
fn test_tagged_union_contains_exactly_its_members() {
    let output = compile_fixture(fixtures::shapes(), &Settings::default());
    let union = symbol(&output, "ShapeUnion");
    let alias = output.model.aliases().find(|a| a.symbol == union).unwrap();

    assert_eq!(
        alias.definition,
        TypeExpr::Union(vec![
            TypeExpr::reference(symbol(&output, "Circle")),
            TypeExpr::reference(symbol(&output, "Square")),
        ])
    );

    let drawing = data(&output, "Drawing");
    assert_eq!(
        drawing.property("main").unwrap().ty,
        TypeExpr::reference(union)
    );
    assert_eq!(
        drawing.property("shapes").unwrap().ty,
        TypeExpr::array(TypeExpr::reference(union))
    );
    // Subtypes still extend the base declaration
    assert_eq!(
        data(&output, "Circle").parent,
        Some(TypeExpr::reference(symbol(&output, "Shape")))
    );
}

#[test]
fn test_discriminant_literals_collected_on_base() {
    let output = compile_fixture(fixtures::shapes(), &Settings::default());
    assert_eq!(
        data(&output, "Shape").property("kind").unwrap().ty,
        TypeExpr::literal_union(["circle", "square"])
    );
    assert_eq!(
        data(&output, "Circle").property("kind").unwrap().ty,
        TypeExpr::string_literal("circle")
    );
}

#[test]
fn test_disabled_tagged_unions_keep_base_references() {
    let settings = Settings {
        tagged_unions: false,
        ..Default::default()
    };
    let output = compile_fixture(fixtures::shapes(), &settings);
    let shape = symbol(&output, "Shape");

    assert_eq!(output.model.aliases().count(), 0);
    assert_eq!(
        data(&output, "Drawing").property("main").unwrap().ty,
        TypeExpr::reference(shape)
    );
}

#[test]
fn test_literal_union_replaces_enum() {
    let output = compile_fixture(fixtures::colors(), &Settings::default());
    let color = symbol(&output, "Color");

    assert_eq!(output.model.enums().count(), 0);
    let alias = output.model.aliases().find(|a| a.symbol == color).unwrap();
    assert_eq!(
        alias.definition,
        TypeExpr::literal_union(["RED", "GREEN", "BLUE"])
    );
    assert_eq!(
        data(&output, "Palette").property("primary").unwrap().ty,
        TypeExpr::reference(color)
    );
}

#[test]
fn test_numeric_placeholder_drops_values() {
    let settings = Settings {
        enum_mapping: EnumMapping::NumericPlaceholder,
        ..Default::default()
    };
    let output = compile_fixture(fixtures::colors(), &settings);
    let color = output.model.enums().next().unwrap();

    assert_eq!(output.model.aliases().count(), 0);
    assert_eq!(color.representation, EnumRepresentation::NumericPlaceholder);
    assert!(color.members.iter().all(|m| m.value.is_none()));
}

#[test]
fn test_inlined_literal_union_leaves_no_alias() {
    let settings = Settings {
        enum_mapping: EnumMapping::InlinedLiteralUnion,
        ..Default::default()
    };
    let output = compile_fixture(fixtures::colors(), &settings);
    let union = TypeExpr::literal_union(["RED", "GREEN", "BLUE"]);
    let palette = data(&output, "Palette");

    assert_eq!(output.model.aliases().count(), 0);
    assert_eq!(output.model.enums().count(), 0);
    assert_eq!(palette.property("primary").unwrap().ty, union);
    assert_eq!(palette.property("all").unwrap().ty, TypeExpr::array(union));
}

#[test]
fn test_rest_name_disambiguation() {
    let settings = Settings {
        rest_codegen: RestCodegen::SurfaceOnly,
        ..Default::default()
    };
    let output = compile_fixture(fixtures::people_api(), &settings);
    let service = data(&output, "PeopleApplication");
    let mut names: Vec<&str> = service.methods.iter().map(|m| m.name.as_str()).collect();
    names.sort_unstable();

    assert_eq!(
        names,
        vec!["create", "get$GET$api_people_all", "get$GET$api_people_id", "list"]
    );
}

#[test]
fn test_rest_types_share_date_representation() {
    let settings = Settings {
        rest_codegen: RestCodegen::Both,
        date_mapping: DateMapping::AsString,
        ..Default::default()
    };
    let output = compile_fixture(fixtures::people_api(), &settings);
    let date = symbol(&output, "DateAsString");

    assert_eq!(
        data(&output, "Person").property("born").unwrap().ty,
        TypeExpr::reference(date)
    );
    assert!(data(&output, "PeopleApplicationClient")
        .interfaces
        .iter()
        .any(|i| i.referenced_symbol() == Some(symbol(&output, "PeopleApplication"))));
    assert!(data(&output, "HttpClient").methods.iter().any(|m| m.name == "request"));
}

#[test]
fn test_pull_cycle_is_fatal() {
    let err = compile(&graph(fixtures::pull_cycle()), &Settings::default()).unwrap_err();
    match err {
        CompileError::PullPropertiesCycle { cycle, .. } => {
            assert!(cycle.contains(&"com.example.A".to_string()));
            assert!(cycle.contains(&"com.example.B".to_string()));
        }
        other => panic!("expected a pull cycle error, got {other}"),
    }
}

#[test]
fn test_revive_functions_for_classes() {
    let settings = Settings::from_toml_str(
        r#"
        class_mapping = "as_classes"
        deserialization_functions = true
        "#,
    )
    .unwrap();
    let output = compile_fixture(fixtures::shapes(), &settings);

    let circle = data(&output, "Circle");
    assert!(circle.is_class);
    assert_eq!(circle.methods[0].name, "fromData");
    let shape = data(&output, "Shape");
    assert!(shape.methods.iter().any(|m| m.name == "fromDataUnion"));
    assert!(!output.model.helpers.is_empty());
}

#[test]
fn test_source_class_clashing_with_generated_client_is_fatal() {
    let mut value = fixtures::people_api();
    value["classes"]
        .as_array_mut()
        .expect("fixture has classes")
        .push(serde_json::json!({ "name": "com.example.HttpClient", "properties": [] }));
    let settings = Settings {
        rest_codegen: RestCodegen::ClientOnly,
        ..Default::default()
    };

    let err = compile(&graph(value), &settings).unwrap_err();
    match err {
        CompileError::NameConflict { name, entities } => {
            assert_eq!(name, "HttpClient");
            assert_eq!(
                entities,
                vec!["com.example.HttpClient", "HttpClient (generated)"]
            );
        }
        other => panic!("expected a name conflict, got {other}"),
    }
}
