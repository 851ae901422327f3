//! Route path templates (`people/{id}/photos/{ size : \d{2,3} }`)

use regex::Regex;

use crate::naming::to_valid_identifier;

const PARAMETER_PATTERN: &str =
    r"\{\s*(?<name>\w[\w\.-]*)\s*(:\s*(?<regex>[^{}\s]+(\{[^{}]*\}[^{}]*)*)\s*)?\}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPart {
    Literal(String),
    Parameter {
        name: String,
        /// Constraint written after `:`, if any
        regex: Option<String>,
    },
}

impl PathPart {
    /// Parameter name usable as an identifier
    pub fn valid_name(&self) -> Option<String> {
        match self {
            PathPart::Parameter { name, .. } => Some(to_valid_identifier(name)),
            PathPart::Literal(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    pub parts: Vec<PathPart>,
}

impl PathTemplate {
    /// Render with parameters between the given delimiters
    pub fn format(&self, left: &str, right: &str, include_regex: bool) -> String {
        let mut formatted = String::new();
        for part in &self.parts {
            match part {
                PathPart::Literal(literal) => formatted.push_str(literal),
                PathPart::Parameter { name, regex } => {
                    formatted.push_str(left);
                    formatted.push_str(&to_valid_identifier(name));
                    if let (true, Some(regex)) = (include_regex, regex) {
                        formatted.push(':');
                        formatted.push_str(regex);
                    }
                    formatted.push_str(right);
                }
            }
        }
        formatted
    }
}

pub struct PathTemplateParser {
    pattern: Regex,
}

impl PathTemplateParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(PARAMETER_PATTERN)?,
        })
    }

    pub fn parse(&self, path: &str) -> PathTemplate {
        let mut parts = Vec::new();
        let mut index = 0;
        for captures in self.pattern.captures_iter(path) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if whole.start() > index {
                parts.push(PathPart::Literal(path[index..whole.start()].to_string()));
            }
            parts.push(PathPart::Parameter {
                name: captures["name"].to_string(),
                regex: captures.name("regex").map(|m| m.as_str().to_string()),
            });
            index = whole.end();
        }
        if index < path.len() {
            parts.push(PathPart::Literal(path[index..].to_string()));
        }
        PathTemplate { parts }
    }
}

/// Join an application path and a method path with a single `/`
pub fn join_path(prefix: Option<&str>, path: &str) -> String {
    let prefix = prefix.map(|p| p.trim_matches('/')).unwrap_or_default();
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, path),
    }
}
