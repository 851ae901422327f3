//! Recoverable compilation problems
//!
//! Warnings are collected during a compilation instead of aborting it. Each
//! pushed warning is also logged through `tracing` so a caller that never
//! looks at the collected list still sees it.

use std::collections::BTreeMap;
use std::fmt;

/// Where a warning was raised
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningLocation {
    /// Declaring source entity (e.g., "com.example.Person")
    pub declaration: Option<String>,
    /// Property name (e.g., "address")
    pub property: Option<String>,
    /// REST method (e.g., "PersonResource.getPerson")
    pub method: Option<String>,
}

impl WarningLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = Some(declaration.into());
        self
    }

    pub fn in_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn in_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

impl fmt::Display for WarningLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.declaration, &self.property, &self.method) {
            (Some(d), Some(p), _) => write!(f, "{}.{}", d, p),
            (Some(d), None, None) => write!(f, "{}", d),
            (_, _, Some(m)) => write!(f, "{}", m),
            (None, Some(p), None) => write!(f, "::{}", p),
            (None, None, None) => write!(f, "<unknown location>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WarningCategory {
    /// No resolver recognised a source type; `any` was used instead
    UnresolvedType,
    /// A derived identifier was rejected and a fallback was used
    InvalidIdentifier,
    /// A referenced declaration is not part of the model
    MissingDeclaration,
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningCategory::UnresolvedType => write!(f, "UNRESOLVED_TYPE"),
            WarningCategory::InvalidIdentifier => write!(f, "INVALID_IDENTIFIER"),
            WarningCategory::MissingDeclaration => write!(f, "MISSING_DECLARATION"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub category: WarningCategory,
    pub location: WarningLocation,
    pub message: String,
}

impl Warning {
    pub fn new(category: WarningCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            location: WarningLocation::new(),
            message: message.into(),
        }
    }

    pub fn at(mut self, location: WarningLocation) -> Self {
        self.location = location;
        self
    }

    pub fn unresolved_type(type_name: &str, declaration: &str, property: &str) -> Self {
        Self::new(
            WarningCategory::UnresolvedType,
            format!(
                "Unsupported type '{}' used in '{}.{}'",
                type_name, declaration, property
            ),
        )
        .at(WarningLocation::new()
            .in_declaration(declaration)
            .in_property(property))
    }

    pub fn invalid_identifier(value: &str, method: &str, fallback: &str) -> Self {
        Self::new(
            WarningCategory::InvalidIdentifier,
            format!(
                "Grouping value '{}' of method '{}' is not a valid identifier, using '{}' instead",
                value, method, fallback
            ),
        )
        .at(WarningLocation::new().in_method(method))
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] at {}: {}", self.category, self.location, self.message)
    }
}

/// Warning collector threaded through one compilation
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn by_category(&self, category: WarningCategory) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.category == category)
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Format warnings grouped by category
    pub fn format_summary(&self) -> String {
        if self.warnings.is_empty() {
            return "No warnings".to_string();
        }

        let mut by_category: BTreeMap<WarningCategory, Vec<&Warning>> = BTreeMap::new();
        for warning in &self.warnings {
            by_category.entry(warning.category).or_default().push(warning);
        }

        let mut lines = vec![format!("Found {} warning(s):", self.warnings.len())];
        for (category, warnings) in by_category {
            lines.push(format!("## {} ({}):", category, warnings.len()));
            for warning in warnings.iter().take(10) {
                lines.push(format!("  - {}", warning));
            }
            if warnings.len() > 10 {
                lines.push(format!("  ... and {} more", warnings.len() - 10));
            }
        }
        lines.join("\n")
    }
}
