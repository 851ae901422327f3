//! Emitting compiled fixture graphs

use pretty_assertions::assert_eq;
use tscribe_codegen::{Codegen, EmitOptions, TypeScriptCodegen};
use serde_json::json;
use tscribe_core::settings::{ClassMapping, OptionalPropertiesDeclaration, RestCodegen};
use tscribe_core::{compile, Settings, SourceGraph};
use tscribe_test_fixtures::{self as fixtures, generic, list_of, named, property, variable};

fn emit(value: serde_json::Value, settings: &Settings) -> String {
    let graph: SourceGraph = serde_json::from_value(value).expect("fixture should deserialize");
    let output = compile(&graph, settings).expect("fixture should compile");
    TypeScriptCodegen::new()
        .generate(&output.model, &output.symbols)
        .expect("model should emit")
}

#[test]
fn test_self_reference() {
    let expected = "export interface A {\n    field: A;\n}\n";
    assert_eq!(emit(fixtures::self_cycle(), &Settings::default()), expected);
}

#[test]
fn test_generic_box() {
    let output = emit(fixtures::generic_box(), &Settings::default());
    assert!(output.contains("export interface Box<T> {\n    items: T[];\n}"));
    assert!(output.contains("    box: Box<Foo>;"));
}

#[test]
fn test_literal_union_enum() {
    let output = emit(fixtures::colors(), &Settings::default());
    assert!(output.contains(r#"export type Color = "RED" | "GREEN" | "BLUE";"#));
    assert!(output.contains("    all: Color[];"));
    assert!(!output.contains("enum"));
}

#[test]
fn test_revive_functions() {
    let settings = Settings {
        class_mapping: ClassMapping::AsClasses,
        deserialization_functions: true,
        ..Default::default()
    };
    let output = emit(fixtures::shapes(), &settings);

    assert!(output.contains("export class Circle extends Shape {"));
    assert!(output.contains("export type ShapeUnion = Circle | Square;"));
    let circle_from_data = r#"    static fromData(data: Circle, target?: Circle): Circle {
        if (!data) {
            return data;
        }
        const instance = target || new Circle();
        super.fromData(data, instance);
        instance.radius = data.radius;
        return instance;
    }"#;
    assert!(output.contains(circle_from_data), "{output}");
    assert!(output.contains("        instance.main = Shape.fromDataUnion(data.main);"));
    assert!(output.contains(
        "        instance.shapes = __getCopyArrayFn(Shape.fromDataUnion)(data.shapes);"
    ));
    assert!(output.contains(
        "            case \"circle\":\n                return Circle.fromData(data);"
    ));
    assert!(output.contains("function __identity<T>()"));
}

#[test]
fn test_rest_surface_and_client() {
    let settings = Settings {
        rest_codegen: RestCodegen::Both,
        ..Default::default()
    };
    let output = emit(fixtures::people_api(), &settings);

    assert!(output.contains("export type RestResponse<R> = Promise<R>;"));
    assert!(output.contains("export interface HttpClient {"));
    assert!(output.contains("export interface PeopleApplication {"));
    assert!(output.contains("    get$GET$api_people_id(id: number): RestResponse<Person>;"));
    assert!(output.contains("    list(queryParams?: { limit?: number }): RestResponse<Person[]>;"));
    assert!(output.contains("export class PeopleApplicationClient implements PeopleApplication {"));
    assert!(output.contains("    constructor(protected httpClient: HttpClient) {"));
    assert!(output.contains(concat!(
        "        return this.httpClient.request(",
        "{ method: \"GET\", url: uriEncoding`api/people/${id}` });"
    )));
    assert!(output.contains("     * HTTP POST /api/people"));
    assert!(output.trim_end().ends_with('}'));
    assert!(output.contains("function uriEncoding("));
}

#[test]
fn test_without_exports() {
    let settings = Settings::default();
    let graph: SourceGraph = serde_json::from_value(fixtures::self_cycle()).unwrap();
    let output = compile(&graph, &settings).unwrap();
    let text = TypeScriptCodegen::with_options(EmitOptions {
        indent: "  ".into(),
        export_declarations: false,
        file_comment: None,
    })
    .generate(&output.model, &output.symbols)
    .unwrap();
    assert_eq!(text, "interface A {\n  field: A;\n}\n");
}

#[test]
fn test_generic_interface_use_site_is_not_revived() {
    let graph = json!({
        "classes": [
            {
                "name": "com.example.Page",
                "kind": "interface",
                "type_parameters": ["T"],
                "properties": [property("items", list_of(variable("T")))]
            },
            {
                "name": "com.example.Foo",
                "properties": [property("name", named(fixtures::STRING))]
            },
            {
                "name": "com.example.Holder",
                "properties": [
                    property("page", generic("com.example.Page", vec![named("com.example.Foo")]))
                ]
            }
        ]
    });
    let settings = Settings {
        class_mapping: ClassMapping::AsClasses,
        deserialization_functions: true,
        ..Default::default()
    };
    let output = emit(graph, &settings);

    assert!(output.contains("export interface Page<T> {"));
    assert!(!output.contains("Page.fromDataFn"), "{output}");
    assert!(output.contains("        instance.page = data.page;"));
}

#[test]
fn test_query_bean_parameters() {
    let graph = json!({
        "classes": [],
        "rest": {
            "name": "com.example.SearchApplication",
            "methods": [
                {
                    "name": "search",
                    "http_method": "GET",
                    "path": "people",
                    "resource": "com.example.PersonResource",
                    "query_params": [
                        property("limit", named(fixtures::INT)),
                        {
                            "bean": {
                                "name": "com.example.PersonFilter",
                                "properties": [
                                    {
                                        "name": "city",
                                        "type": named(fixtures::STRING),
                                        "optional": true
                                    }
                                ]
                            }
                        }
                    ],
                    "return_type": list_of(named(fixtures::STRING))
                }
            ]
        }
    });
    let settings = Settings {
        rest_codegen: RestCodegen::SurfaceOnly,
        ..Default::default()
    };
    let output = emit(graph, &settings);

    assert!(output.contains("export interface PersonFilterQueryParams {\n    city?: string;\n}"));
    assert!(output.contains(concat!(
        "    search(queryParams?: { limit?: number } & PersonFilterQueryParams)",
        ": RestResponse<string[]>;"
    )));
}

#[test]
fn test_nullable_optional_properties() {
    let graph = json!({
        "classes": [
            {
                "name": "com.example.Person",
                "properties": [
                    property("name", named(fixtures::STRING)),
                    { "name": "nickname", "type": named(fixtures::STRING), "optional": true }
                ]
            }
        ]
    });
    let settings = Settings {
        optional_properties: OptionalPropertiesDeclaration::QuestionMarkAndNullable,
        ..Default::default()
    };
    let expected =
        "export interface Person {\n    name: string;\n    nickname?: string | null;\n}\n";
    assert_eq!(emit(graph, &settings), expected);
}
