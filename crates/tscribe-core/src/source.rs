//! Source type graph handed over by the introspection layer.
//!
//! The graph is a plain value: classes, enums and an optional REST
//! application, all referring to each other by fully-qualified entity name.
//! It is usually read from JSON:
//!
//! ```json
//! {
//!   "classes": [
//!     { "name": "com.example.Person",
//!       "properties": [
//!         { "name": "name", "type": { "kind": "named", "name": "java.lang.String" } },
//!         { "name": "friends", "type": { "kind": "named", "name": "java.util.List",
//!             "args": [ { "kind": "named", "name": "com.example.Person" } ] } }
//!       ] }
//!   ]
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::LiteralValue;

/// Type reference as seen by the introspection layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceType {
    /// Named type, possibly parameterized (`java.util.List<java.lang.String>`)
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<SourceType>,
    },
    /// Type variable (`T`)
    Variable { name: String },
    /// Native array (`String[]`)
    Array { element: Box<SourceType> },
    /// Union-like construct
    Union { types: Vec<SourceType> },
    /// Explicitly nullable type
    Nullable { inner: Box<SourceType> },
}

impl SourceType {
    pub fn named(name: impl Into<String>) -> Self {
        SourceType::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<SourceType>) -> Self {
        SourceType::Named {
            name: name.into(),
            args,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        SourceType::Variable { name: name.into() }
    }

    pub fn array(element: SourceType) -> Self {
        SourceType::Array {
            element: Box::new(element),
        }
    }

    pub fn nullable(inner: SourceType) -> Self {
        SourceType::Nullable {
            inner: Box::new(inner),
        }
    }

    /// Entity name of a named type
    pub fn name(&self) -> Option<&str> {
        match self {
            SourceType::Named { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            SourceType::Variable { name } => write!(f, "{}", name),
            SourceType::Array { element } => write!(f, "{}[]", element),
            SourceType::Union { types } => {
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                Ok(())
            }
            SourceType::Nullable { inner } => write!(f, "{}?", inner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
}

/// Replace a property by the properties of the type it points to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullProperties {
    pub prefix: String,
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SourceType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull: Option<PullProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl SourceProperty {
    pub fn new(name: impl Into<String>, ty: SourceType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            pull: None,
            comments: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn pulled(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.pull = Some(PullProperties {
            prefix: prefix.into(),
            suffix: suffix.into(),
        });
        self
    }
}

/// Class or interface descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceClass {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<SourceType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<SourceType>,
    #[serde(default)]
    pub properties: Vec<SourceProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminant_property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminant_literal: Option<String>,
    /// Leaf entity names of the sealed hierarchy rooted here
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tagged_union_members: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl SourceClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            type_parameters: Vec::new(),
            parent: None,
            interfaces: Vec::new(),
            properties: Vec::new(),
            discriminant_property: None,
            discriminant_literal: None,
            tagged_union_members: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Interface,
            ..Self::new(name)
        }
    }

    pub fn with_type_parameters(mut self, params: &[&str]) -> Self {
        self.type_parameters = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn extends(mut self, parent: SourceType) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn implements(mut self, interface: SourceType) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn property(mut self, property: SourceProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn discriminant(mut self, property: impl Into<String>, literal: Option<&str>) -> Self {
        self.discriminant_property = Some(property.into());
        self.discriminant_literal = literal.map(str::to_string);
        self
    }

    pub fn tagged_union(mut self, members: &[&str]) -> Self {
        self.tagged_union_members = members.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEnumMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<LiteralValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEnum {
    pub name: String,
    pub members: Vec<SourceEnumMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl SourceEnum {
    /// Enum whose members are serialized by name
    pub fn of_names(name: impl Into<String>, members: &[&str]) -> Self {
        Self {
            name: name.into(),
            members: members
                .iter()
                .map(|m| SourceEnumMember {
                    name: m.to_string(),
                    value: None,
                    comments: Vec::new(),
                })
                .collect(),
            comments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SourceType,
}

impl RestParam {
    pub fn new(name: impl Into<String>, ty: SourceType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Query parameter of a REST method.
///
/// Either a single named value or a bean whose properties are all query
/// parameters, written as `{ "bean": { "name": .., "properties": [..] } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RestQueryParam {
    Single(RestParam),
    Bean { bean: SourceClass },
}

/// One endpoint of a REST application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestMethod {
    /// Source method name (e.g. `getPerson`)
    pub name: String,
    /// HTTP verb (e.g. `GET`)
    pub http_method: String,
    /// Full path template relative to the application root (e.g. `people/{id}`)
    pub path: String,
    /// Entity name of the originating resource type
    pub resource: String,
    /// Value of the grouping marker annotation, if present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_params: Vec<RestParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<RestQueryParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<RestParam>,
    /// Response entity type; `None` for no content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<SourceType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl RestMethod {
    pub fn new(
        name: impl Into<String>,
        http_method: impl Into<String>,
        path: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            http_method: http_method.into(),
            path: path.into(),
            resource: resource.into(),
            group_annotation: None,
            path_params: Vec::new(),
            query_params: Vec::new(),
            entity: None,
            return_type: None,
            comments: Vec::new(),
        }
    }

    pub fn returns(mut self, ty: SourceType) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn path_param(mut self, name: impl Into<String>, ty: SourceType) -> Self {
        self.path_params.push(RestParam::new(name, ty));
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, ty: SourceType) -> Self {
        self.query_params
            .push(RestQueryParam::Single(RestParam::new(name, ty)));
        self
    }

    pub fn query_bean(mut self, bean: SourceClass) -> Self {
        self.query_params.push(RestQueryParam::Bean { bean });
        self
    }

    pub fn with_entity(mut self, name: impl Into<String>, ty: SourceType) -> Self {
        self.entity = Some(RestParam::new(name, ty));
        self
    }

    pub fn grouped_as(mut self, value: impl Into<String>) -> Self {
        self.group_annotation = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestApplication {
    /// Entity name of the application; names the default group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Prefix joined in front of every method path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub methods: Vec<RestMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceGraph {
    #[serde(default)]
    pub classes: Vec<SourceClass>,
    #[serde(default)]
    pub enums: Vec<SourceEnum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<RestApplication>,
}

impl SourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: SourceClass) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_enum(mut self, source_enum: SourceEnum) -> Self {
        self.enums.push(source_enum);
        self
    }

    pub fn with_rest(mut self, application: RestApplication) -> Self {
        self.rest = Some(application);
        self
    }

    pub fn find_class(&self, name: &str) -> Option<&SourceClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&SourceEnum> {
        self.enums.iter().find(|e| e.name == name)
    }
}
