//! Test fixtures for tscribe
//!
//! Small source graphs in the JSON form the introspection layer hands over.
//! Tests deserialize them into `tscribe_core::SourceGraph`, or write them to
//! a temporary directory for the CLI.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const STRING: &str = "java.lang.String";
pub const LONG: &str = "long";
pub const INT: &str = "int";
pub const DOUBLE: &str = "double";
pub const LIST: &str = "java.util.List";
pub const LOCAL_DATE: &str = "java.time.LocalDate";

/// `{ "kind": "named", "name": .. }`
pub fn named(name: &str) -> Value {
    json!({ "kind": "named", "name": name })
}

/// Named type with type arguments
pub fn generic(name: &str, args: Vec<Value>) -> Value {
    json!({ "kind": "named", "name": name, "args": args })
}

pub fn variable(name: &str) -> Value {
    json!({ "kind": "variable", "name": name })
}

pub fn list_of(element: Value) -> Value {
    generic(LIST, vec![element])
}

pub fn property(name: &str, ty: Value) -> Value {
    json!({ "name": name, "type": ty })
}

/// Sealed `Shape` hierarchy discriminated by `kind`, plus a `Drawing` using it
pub fn shapes() -> Value {
    json!({
        "classes": [
            {
                "name": "com.example.Shape",
                "properties": [property("name", named(STRING))],
                "discriminant_property": "kind",
                "tagged_union_members": ["com.example.Circle", "com.example.Square"]
            },
            {
                "name": "com.example.Circle",
                "parent": named("com.example.Shape"),
                "properties": [property("radius", named(DOUBLE))],
                "discriminant_property": "kind",
                "discriminant_literal": "circle"
            },
            {
                "name": "com.example.Square",
                "parent": named("com.example.Shape"),
                "properties": [property("side", named(DOUBLE))],
                "discriminant_property": "kind",
                "discriminant_literal": "square"
            },
            {
                "name": "com.example.Drawing",
                "properties": [
                    property("main", named("com.example.Shape")),
                    property("shapes", list_of(named("com.example.Shape")))
                ]
            }
        ]
    })
}

/// Generic `Box<T>` and a use site `Box<Foo>`
pub fn generic_box() -> Value {
    json!({
        "classes": [
            {
                "name": "com.example.Box",
                "type_parameters": ["T"],
                "properties": [property("items", list_of(variable("T")))]
            },
            {
                "name": "com.example.Foo",
                "properties": [property("name", named(STRING))]
            },
            {
                "name": "com.example.Holder",
                "properties": [
                    property("box", generic("com.example.Box", vec![named("com.example.Foo")]))
                ]
            }
        ]
    })
}

/// `A { field: A }`
pub fn self_cycle() -> Value {
    json!({
        "classes": [
            {
                "name": "com.example.A",
                "properties": [property("field", named("com.example.A"))]
            }
        ]
    })
}

/// `A { b: B }` and `B { a: A }`, declared in either order
pub fn mutual_cycle(b_first: bool) -> Value {
    let a = json!({
        "name": "com.example.A",
        "properties": [property("b", named("com.example.B"))]
    });
    let b = json!({
        "name": "com.example.B",
        "properties": [property("a", named("com.example.A"))]
    });
    let classes = if b_first { vec![b, a] } else { vec![a, b] };
    json!({ "classes": classes })
}

/// `A` pulls the properties of `B`, which pulls the properties of `A`
pub fn pull_cycle() -> Value {
    json!({
        "classes": [
            {
                "name": "com.example.A",
                "properties": [
                    { "name": "b", "type": named("com.example.B"), "pull": { "prefix": "b" } }
                ]
            },
            {
                "name": "com.example.B",
                "properties": [
                    { "name": "a", "type": named("com.example.A"), "pull": { "prefix": "a" } }
                ]
            }
        ]
    })
}

/// `enum Color { RED, GREEN, BLUE }` and a class using it
pub fn colors() -> Value {
    json!({
        "classes": [
            {
                "name": "com.example.Palette",
                "properties": [
                    property("primary", named("com.example.Color")),
                    property("all", list_of(named("com.example.Color")))
                ]
            }
        ],
        "enums": [
            {
                "name": "com.example.Color",
                "members": [{ "name": "RED" }, { "name": "GREEN" }, { "name": "BLUE" }]
            }
        ]
    })
}

/// `Person` plus a REST resource with two `get` endpoints, `list` and `create`
pub fn people_api() -> Value {
    let person = named("com.example.Person");
    json!({
        "classes": [
            {
                "name": "com.example.Person",
                "properties": [
                    property("id", named(LONG)),
                    property("name", named(STRING)),
                    property("born", named(LOCAL_DATE))
                ]
            }
        ],
        "rest": {
            "name": "com.example.PeopleApplication",
            "path": "api",
            "methods": [
                {
                    "name": "get",
                    "http_method": "GET",
                    "path": "people/{id}",
                    "resource": "com.example.PersonResource",
                    "path_params": [property("id", named(LONG))],
                    "return_type": person
                },
                {
                    "name": "get",
                    "http_method": "GET",
                    "path": "people/all",
                    "resource": "com.example.PersonResource",
                    "return_type": list_of(person.clone())
                },
                {
                    "name": "list",
                    "http_method": "GET",
                    "path": "people",
                    "resource": "com.example.PersonResource",
                    "query_params": [property("limit", named(INT))],
                    "return_type": list_of(person.clone())
                },
                {
                    "name": "create",
                    "http_method": "POST",
                    "path": "people",
                    "resource": "com.example.PersonResource",
                    "entity": property("person", person.clone()),
                    "return_type": person.clone()
                }
            ]
        }
    })
}

/// Temporary directory holding fixture files
pub struct TestFixtures {
    temp_dir: tempfile::TempDir,
}

impl TestFixtures {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `graph` as pretty JSON under `name`
    pub fn write_graph(&self, name: &str, graph: &Value) -> std::io::Result<PathBuf> {
        let path = self.path().join(name);
        let content = serde_json::to_string_pretty(graph)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn write_file(&self, name: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_valid() {
        let all = [
            shapes(),
            generic_box(),
            self_cycle(),
            mutual_cycle(true),
            colors(),
            people_api(),
        ];
        for fixture in all {
            assert!(fixture["classes"].is_array());
        }
        assert_eq!(people_api()["rest"]["methods"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn test_write_graph() {
        let fixtures = TestFixtures::new().unwrap();
        let path = fixtures.write_graph("graph.json", &self_cycle()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("com.example.A"));
    }
}
