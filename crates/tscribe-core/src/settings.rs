//! Compiler configuration.
//!
//! Loaded from TOML. Every field has a default so a config file only needs
//! to name what it changes:
//!
//! ```toml
//! enum_mapping = "inlined_literal_union"
//! date_mapping = "as_string"
//! rest_codegen = "both"
//!
//! [naming]
//! remove_suffix = "Dto"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// How source enums are represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumMapping {
    /// Alias of the union of member string literals
    #[default]
    LiteralUnion,
    /// Literal union substituted at every use site
    InlinedLiteralUnion,
    /// Enumeration whose members carry no literal values
    NumericPlaceholder,
    /// Enumeration with the member values as declared
    Unmodified,
}

/// How temporal values are represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMapping {
    #[default]
    Unmodified,
    AsNumber,
    AsString,
}

/// How REST endpoints are grouped into interfaces/clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestGrouping {
    PerResource,
    ByAnnotation,
    #[default]
    SingleApplication,
}

/// Which REST declarations are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestCodegen {
    SurfaceOnly,
    ClientOnly,
    Both,
    #[default]
    Neither,
}

impl RestCodegen {
    pub fn surface(self) -> bool {
        matches!(self, RestCodegen::SurfaceOnly | RestCodegen::Both)
    }

    pub fn client(self) -> bool {
        matches!(self, RestCodegen::ClientOnly | RestCodegen::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    None,
    /// Sort properties within each declaration by name
    PropertiesOnly,
    /// Sort properties, and declarations by category then name
    Full,
}

/// Whether concrete source classes become class-like declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassMapping {
    #[default]
    AsInterfaces,
    AsClasses,
}

/// How optional properties of data declarations are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalPropertiesDeclaration {
    /// `name?: T`
    #[default]
    QuestionMark,
    /// `name: T | null`
    Nullable,
    /// `name?: T | null`
    QuestionMarkAndNullable,
    /// `name: T | undefined`
    Undefinable,
    /// `name: T | null | undefined`
    NullableAndUndefinable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingPolicy {
    pub add_prefix: Option<String>,
    pub add_suffix: Option<String>,
    pub remove_prefix: Option<String>,
    pub remove_suffix: Option<String>,
    /// Source entity name -> target name (may be dotted to pick a namespace)
    pub custom: BTreeMap<String, String>,
    pub map_packages_to_namespaces: bool,
}

/// Source type names the mapper recognises without a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnownTypes {
    pub strings: Vec<String>,
    pub numbers: Vec<String>,
    pub booleans: Vec<String>,
    pub dates: Vec<String>,
    pub voids: Vec<String>,
    pub any: Vec<String>,
    pub sequences: Vec<String>,
    pub maps: Vec<String>,
    pub optionals: Vec<String>,
    /// Single-argument containers that are transparent on the wire
    pub wrappers: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KnownTypes {
    fn default() -> Self {
        Self {
            strings: names(&[
                "java.lang.String",
                "char",
                "java.lang.Character",
                "java.util.UUID",
                "java.net.URI",
                "java.net.URL",
            ]),
            numbers: names(&[
                "byte",
                "short",
                "int",
                "long",
                "float",
                "double",
                "java.lang.Byte",
                "java.lang.Short",
                "java.lang.Integer",
                "java.lang.Long",
                "java.lang.Float",
                "java.lang.Double",
                "java.math.BigDecimal",
                "java.math.BigInteger",
            ]),
            booleans: names(&["boolean", "java.lang.Boolean"]),
            dates: names(&[
                "java.util.Date",
                "java.util.Calendar",
                "java.time.Instant",
                "java.time.LocalDate",
                "java.time.LocalDateTime",
                "java.time.OffsetDateTime",
                "java.time.ZonedDateTime",
                "org.joda.time.DateTime",
            ]),
            voids: names(&["void", "java.lang.Void"]),
            any: names(&["java.lang.Object", "com.fasterxml.jackson.databind.JsonNode"]),
            sequences: names(&[
                "java.lang.Iterable",
                "java.util.Collection",
                "java.util.List",
                "java.util.ArrayList",
                "java.util.LinkedList",
                "java.util.Set",
                "java.util.HashSet",
                "java.util.LinkedHashSet",
                "java.util.SortedSet",
                "java.util.TreeSet",
            ]),
            maps: names(&[
                "java.util.Map",
                "java.util.HashMap",
                "java.util.LinkedHashMap",
                "java.util.SortedMap",
                "java.util.TreeMap",
                "java.util.concurrent.ConcurrentHashMap",
            ]),
            optionals: names(&["java.util.Optional"]),
            wrappers: names(&[
                "javax.xml.bind.JAXBElement",
                "java.util.concurrent.CompletableFuture",
                "java.util.concurrent.CompletionStage",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enum_mapping: EnumMapping,
    pub tagged_unions: bool,
    pub deserialization_functions: bool,
    pub date_mapping: DateMapping,
    pub rest_grouping: RestGrouping,
    pub rest_codegen: RestCodegen,
    /// Verbatim definition of the `RestResponse<R>` alias; defaults to `Promise<R>`
    pub rest_response_type: Option<String>,
    /// Type of the trailing `options` parameter of REST methods
    pub rest_options_type: Option<String>,
    /// Make the options type a type parameter of REST interfaces/clients
    pub rest_options_type_is_generic: bool,
    pub sort_mode: SortMode,
    pub class_mapping: ClassMapping,
    pub declare_properties_as_readonly: bool,
    pub optional_properties: OptionalPropertiesDeclaration,
    pub naming: NamingPolicy,
    pub known_types: KnownTypes,
    /// Source type name -> verbatim target type
    pub custom_type_mappings: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enum_mapping: EnumMapping::default(),
            tagged_unions: true,
            deserialization_functions: false,
            date_mapping: DateMapping::default(),
            rest_grouping: RestGrouping::default(),
            rest_codegen: RestCodegen::default(),
            rest_response_type: None,
            rest_options_type: None,
            rest_options_type_is_generic: false,
            sort_mode: SortMode::default(),
            class_mapping: ClassMapping::default(),
            declare_properties_as_readonly: false,
            optional_properties: OptionalPropertiesDeclaration::default(),
            naming: NamingPolicy::default(),
            known_types: KnownTypes::default(),
            custom_type_mappings: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, CompileError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, CompileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject combinations of options that cannot produce valid output
    pub fn validate(&self) -> Result<(), CompileError> {
        if self.deserialization_functions && self.class_mapping != ClassMapping::AsClasses {
            return Err(CompileError::InvalidConfiguration(
                "'deserialization_functions' requires 'class_mapping = \"as_classes\"'".into(),
            ));
        }
        if self.rest_options_type_is_generic && self.rest_options_type.is_none() {
            return Err(CompileError::InvalidConfiguration(
                "'rest_options_type_is_generic' requires 'rest_options_type'".into(),
            ));
        }
        if let Some(response) = &self.rest_response_type {
            if response.trim().is_empty() {
                return Err(CompileError::InvalidConfiguration(
                    "'rest_response_type' must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn classes_as_classes(&self) -> bool {
        self.class_mapping == ClassMapping::AsClasses
    }
}
