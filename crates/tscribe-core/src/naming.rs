//! Identifier rules and naming policy application.
//!
//! Source entity names are dotted, fully-qualified names where `$` separates
//! nested classes (e.g. `com.example.Outer$Inner`). Target names are plain
//! identifiers, optionally placed in a dotted namespace.

use crate::settings::NamingPolicy;

/// Target language reserved words that cannot be used as namespace segments
const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "implements", "interface", "let",
    "package", "private", "protected", "public", "static", "yield",
];

pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '$' || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '$' || c == '_' || c == '\u{200C}' || c == '\u{200D}'
}

/// Whether `name` can be used verbatim as an identifier
///
/// # Examples
/// ```
/// use tscribe_core::naming::is_valid_identifier;
/// assert!(is_valid_identifier("people"));
/// assert!(is_valid_identifier("$ref"));
/// assert!(!is_valid_identifier("my-group"));
/// assert!(!is_valid_identifier("1st"));
/// assert!(!is_valid_identifier(""));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => false,
        Some(first) => is_identifier_start(first) && chars.all(is_identifier_part),
    }
}

/// Turn an arbitrary name into an identifier: dashes followed by a character
/// become camel-case humps, then every invalid character is dropped.
///
/// # Examples
/// ```
/// use tscribe_core::naming::to_valid_identifier;
/// assert_eq!(to_valid_identifier("user-id"), "userId");
/// assert_eq!(to_valid_identifier("a.b"), "ab");
/// assert_eq!(to_valid_identifier("9lives"), "lives");
/// ```
pub fn to_valid_identifier(name: &str) -> String {
    let mut camel = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('-', Some(&next)) if next != '-' => {
                camel.extend(next.to_uppercase());
                chars.next();
            }
            _ => camel.push(c),
        }
    }

    let mut result = String::with_capacity(camel.len());
    for c in camel.chars() {
        let valid = if result.is_empty() {
            is_identifier_start(c)
        } else {
            is_identifier_part(c)
        };
        if valid {
            result.push(c);
        }
    }
    result
}

/// Simple name of a source entity (`com.example.Outer$Inner` -> `Inner`)
pub fn simple_name(entity: &str) -> &str {
    let last_segment = entity.rsplit('.').next().unwrap_or(entity);
    last_segment.rsplit('$').next().unwrap_or(last_segment)
}

/// Package segments of a source entity, including enclosing classes
/// (`com.example.Outer$Inner` -> `["com", "example", "Outer"]`)
pub fn package_segments(entity: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = entity.split(['.', '$']).collect();
    segments.pop();
    segments
}

/// Apply the naming policy to a source entity, producing its dotted,
/// possibly namespaced, target name (without any symbol suffix).
pub fn apply_policy(entity: &str, policy: &NamingPolicy) -> String {
    if let Some(custom) = policy.custom.get(entity) {
        return custom.clone();
    }

    let mut name = simple_name(entity).to_string();
    if let Some(prefix) = policy.remove_prefix.as_deref() {
        if let Some(stripped) = name.strip_prefix(prefix) {
            name = stripped.to_string();
        }
    }
    if let Some(suffix) = policy.remove_suffix.as_deref() {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_string();
        }
    }
    if let Some(prefix) = policy.add_prefix.as_deref() {
        name = format!("{}{}", prefix, name);
    }
    if let Some(suffix) = policy.add_suffix.as_deref() {
        name.push_str(suffix);
    }

    if policy.map_packages_to_namespaces {
        let mut parts: Vec<String> = package_segments(entity)
            .into_iter()
            .map(|part| {
                if is_reserved_word(part) {
                    format!("_{}", part)
                } else {
                    part.to_string()
                }
            })
            .collect();
        parts.push(name);
        parts.join(".")
    } else {
        name
    }
}

/// Split a dotted name into (namespace, simple name)
pub fn split_namespace(full_name: &str) -> (Option<&str>, &str) {
    match full_name.rsplit_once('.') {
        Some((namespace, simple)) => (Some(namespace), simple),
        None => (None, full_name),
    }
}
